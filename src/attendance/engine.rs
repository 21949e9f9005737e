use chrono::{NaiveDateTime, Timelike};
use derive_more::Display;
use tracing::info;

use crate::attendance::classify::{self, CHECK_OUT_OPENS_HOUR};
use crate::attendance::store::{AttendanceStore, CheckOutUpdate, NewCheckIn, StoreError};
use crate::model::attendance::{Attendance, AttendanceCategory, CheckInStatus, CheckOutStatus};

/// Why a scan was turned away without touching attendance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RejectReason {
    #[display(fmt = "too early to check out")]
    TooEarlyToCheckOut,
    #[display(fmt = "check-out must use the device that checked in")]
    DeviceMismatch,
    #[display(fmt = "attendance already completed for today")]
    AlreadyCompleted,
}

/// Why the gateway refused the originating device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DeviceRejectReason {
    #[display(fmt = "device not registered")]
    NotFound,
    #[display(fmt = "device is inactive")]
    Inactive,
}

/// Structured result of a scan event. The relay expects an answer for every
/// scan, so lookup misses are outcomes here rather than errors; only
/// persistence failures travel the `Err` path.
#[derive(Debug, PartialEq)]
pub enum ScanOutcome {
    CheckedIn {
        id: u64,
        status: CheckInStatus,
    },
    CheckedOut {
        status: CheckOutStatus,
        category: AttendanceCategory,
    },
    Rejected(RejectReason),
    EmployeeNotFound,
    UnknownSerial {
        serial_id: String,
    },
    DeviceRejected(DeviceRejectReason),
}

/// Decides check-in versus check-out for each incoming event and owns every
/// write to the attendance table.
pub struct AttendanceEngine<S> {
    store: S,
    enforce_device_consistency: bool,
}

impl<S: AttendanceStore> AttendanceEngine<S> {
    pub fn new(store: S, enforce_device_consistency: bool) -> Self {
        Self {
            store,
            enforce_device_consistency,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Record a scan for an already-resolved employee.
    ///
    /// No record today opens the day; an open record closes it (or is
    /// rejected); a completed record rejects everything. The insert races
    /// with concurrent first scans: the unique key turns the loser's insert
    /// into a `Conflict`, which is retried once as the check-out path.
    pub async fn record_event(
        &self,
        employee_id: u64,
        at: NaiveDateTime,
        device_code: &str,
    ) -> Result<ScanOutcome, StoreError> {
        let day = at.date();

        match self.store.find_for_day(employee_id, day).await? {
            None => match self.open_day(employee_id, at, device_code).await {
                Err(StoreError::Conflict) => {
                    // Lost the first-scan race. The winner's row must exist
                    // now, so re-read and continue as a closing scan.
                    match self.store.find_for_day(employee_id, day).await? {
                        Some(record) => self.close_day(record, at, device_code).await,
                        None => Err(StoreError::Conflict),
                    }
                }
                other => other,
            },
            Some(record) => self.close_day(record, at, device_code).await,
        }
    }

    async fn open_day(
        &self,
        employee_id: u64,
        at: NaiveDateTime,
        device_code: &str,
    ) -> Result<ScanOutcome, StoreError> {
        let status = classify::check_in_status(at);
        let id = self
            .store
            .insert_check_in(NewCheckIn {
                employee_id,
                device_code: Some(device_code),
                at,
                status,
            })
            .await?;

        info!(employee_id, id, %status, "attendance opened");
        Ok(ScanOutcome::CheckedIn { id, status })
    }

    async fn close_day(
        &self,
        record: Attendance,
        at: NaiveDateTime,
        device_code: &str,
    ) -> Result<ScanOutcome, StoreError> {
        if record.is_completed() {
            return Ok(ScanOutcome::Rejected(RejectReason::AlreadyCompleted));
        }

        if self.enforce_device_consistency {
            if let Some(opened_on) = record.device_code.as_deref() {
                if opened_on != device_code {
                    return Ok(ScanOutcome::Rejected(RejectReason::DeviceMismatch));
                }
            }
        }

        if at.hour() < CHECK_OUT_OPENS_HOUR {
            return Ok(ScanOutcome::Rejected(RejectReason::TooEarlyToCheckOut));
        }

        let status = classify::check_out_status(at);
        let category = classify::category(record.status_check_in, status);

        let updated = self
            .store
            .complete_check_out(
                record.employee_id,
                record.check_in.date(),
                CheckOutUpdate {
                    at,
                    status,
                    category,
                },
            )
            .await?;

        if !updated {
            // Another scan closed the record between our read and the update.
            return Ok(ScanOutcome::Rejected(RejectReason::AlreadyCompleted));
        }

        info!(employee_id = record.employee_id, %status, %category, "attendance closed");
        Ok(ScanOutcome::CheckedOut { status, category })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    pub(crate) fn ts(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    /// Vec-backed store mirroring the unique employee/day key.
    #[derive(Default)]
    pub(crate) struct MemStore {
        rows: Mutex<Vec<Attendance>>,
    }

    impl MemStore {
        pub(crate) fn row(&self, employee_id: u64, day: NaiveDate) -> Option<Attendance> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.employee_id == employee_id && r.check_in.date() == day)
                .cloned()
        }

        pub(crate) fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    impl AttendanceStore for MemStore {
        async fn find_for_day(
            &self,
            employee_id: u64,
            day: NaiveDate,
        ) -> Result<Option<Attendance>, StoreError> {
            Ok(self.row(employee_id, day))
        }

        async fn insert_check_in(&self, check_in: NewCheckIn<'_>) -> Result<u64, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            if rows
                .iter()
                .any(|r| r.employee_id == check_in.employee_id && r.check_in.date() == check_in.at.date())
            {
                return Err(StoreError::Conflict);
            }
            let id = rows.len() as u64 + 1;
            rows.push(Attendance {
                id,
                employee_id: check_in.employee_id,
                device_code: check_in.device_code.map(str::to_owned),
                check_in: check_in.at,
                check_out: None,
                status_check_in: check_in.status,
                status_check_out: None,
                category: None,
            });
            Ok(id)
        }

        async fn complete_check_out(
            &self,
            employee_id: u64,
            day: NaiveDate,
            update: CheckOutUpdate,
        ) -> Result<bool, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|r| {
                r.employee_id == employee_id && r.check_in.date() == day && r.check_out.is_none()
            }) else {
                return Ok(false);
            };
            row.check_out = Some(update.at);
            row.status_check_out = Some(update.status);
            row.category = Some(update.category);
            Ok(true)
        }
    }

    /// First insert loses the race: a competitor row appears and the insert
    /// reports Conflict.
    struct RacingStore {
        inner: MemStore,
        raced: AtomicBool,
    }

    impl AttendanceStore for RacingStore {
        async fn find_for_day(
            &self,
            employee_id: u64,
            day: NaiveDate,
        ) -> Result<Option<Attendance>, StoreError> {
            self.inner.find_for_day(employee_id, day).await
        }

        async fn insert_check_in(&self, check_in: NewCheckIn<'_>) -> Result<u64, StoreError> {
            if !self.raced.swap(true, Ordering::SeqCst) {
                self.inner
                    .insert_check_in(NewCheckIn {
                        device_code: Some("GATE-02"),
                        ..check_in
                    })
                    .await?;
                return Err(StoreError::Conflict);
            }
            self.inner.insert_check_in(check_in).await
        }

        async fn complete_check_out(
            &self,
            employee_id: u64,
            day: NaiveDate,
            update: CheckOutUpdate,
        ) -> Result<bool, StoreError> {
            self.inner.complete_check_out(employee_id, day, update).await
        }
    }

    fn engine(store: MemStore) -> AttendanceEngine<MemStore> {
        AttendanceEngine::new(store, false)
    }

    #[actix_web::test]
    async fn first_scan_opens_the_day_on_time() {
        let engine = engine(MemStore::default());
        let outcome = engine.record_event(42, ts(3, 8, 10), "GATE-01").await.unwrap();

        assert_eq!(
            outcome,
            ScanOutcome::CheckedIn {
                id: 1,
                status: CheckInStatus::OnTime
            }
        );
    }

    #[actix_web::test]
    async fn first_scan_after_grace_is_late() {
        let engine = engine(MemStore::default());
        let outcome = engine.record_event(42, ts(3, 8, 20), "GATE-01").await.unwrap();

        assert_eq!(
            outcome,
            ScanOutcome::CheckedIn {
                id: 1,
                status: CheckInStatus::Late
            }
        );
    }

    #[actix_web::test]
    async fn second_scan_before_three_pm_is_rejected_without_mutation() {
        let engine = engine(MemStore::default());
        engine.record_event(42, ts(3, 8, 10), "GATE-01").await.unwrap();

        let outcome = engine.record_event(42, ts(3, 14, 59), "GATE-01").await.unwrap();
        assert_eq!(outcome, ScanOutcome::Rejected(RejectReason::TooEarlyToCheckOut));

        let row = engine.store.row(42, ts(3, 0, 0).date()).unwrap();
        assert_eq!(row.check_in, ts(3, 8, 10));
        assert!(row.check_out.is_none());
    }

    #[actix_web::test]
    async fn on_time_pair_is_disciplined() {
        let engine = engine(MemStore::default());
        engine.record_event(42, ts(3, 7, 50), "GATE-01").await.unwrap();

        let outcome = engine.record_event(42, ts(3, 17, 10), "GATE-01").await.unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::CheckedOut {
                status: CheckOutStatus::OnTime,
                category: AttendanceCategory::Discipline
            }
        );
    }

    #[actix_web::test]
    async fn early_departure_after_late_arrival_is_undisciplined() {
        let engine = engine(MemStore::default());
        engine.record_event(42, ts(3, 8, 20), "GATE-01").await.unwrap();

        let outcome = engine.record_event(42, ts(3, 16, 0), "GATE-01").await.unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::CheckedOut {
                status: CheckOutStatus::Early,
                category: AttendanceCategory::Undiscipline
            }
        );
    }

    #[actix_web::test]
    async fn evening_departure_after_on_time_arrival_is_overtime() {
        let engine = engine(MemStore::default());
        engine.record_event(42, ts(3, 7, 0), "GATE-01").await.unwrap();

        let outcome = engine.record_event(42, ts(3, 18, 30), "GATE-01").await.unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::CheckedOut {
                status: CheckOutStatus::Late,
                category: AttendanceCategory::Overtime
            }
        );
    }

    #[actix_web::test]
    async fn completed_day_rejects_further_scans() {
        let engine = engine(MemStore::default());
        engine.record_event(42, ts(3, 7, 50), "GATE-01").await.unwrap();
        engine.record_event(42, ts(3, 17, 5), "GATE-01").await.unwrap();

        let outcome = engine.record_event(42, ts(3, 18, 0), "GATE-01").await.unwrap();
        assert_eq!(outcome, ScanOutcome::Rejected(RejectReason::AlreadyCompleted));

        let row = engine.store.row(42, ts(3, 0, 0).date()).unwrap();
        assert_eq!(row.check_out, Some(ts(3, 17, 5)));
        assert_eq!(row.category, Some(AttendanceCategory::Discipline));
    }

    #[actix_web::test]
    async fn separate_days_get_separate_records() {
        let engine = engine(MemStore::default());
        engine.record_event(42, ts(3, 8, 0), "GATE-01").await.unwrap();
        engine.record_event(42, ts(3, 17, 0), "GATE-01").await.unwrap();

        let outcome = engine.record_event(42, ts(4, 8, 0), "GATE-01").await.unwrap();
        assert!(matches!(outcome, ScanOutcome::CheckedIn { .. }));
        assert_eq!(engine.store.len(), 2);
    }

    #[actix_web::test]
    async fn check_out_from_other_device_rejected_when_enforced() {
        let engine = AttendanceEngine::new(MemStore::default(), true);
        engine.record_event(42, ts(3, 8, 0), "GATE-01").await.unwrap();

        let outcome = engine.record_event(42, ts(3, 17, 5), "GATE-02").await.unwrap();
        assert_eq!(outcome, ScanOutcome::Rejected(RejectReason::DeviceMismatch));

        let row = engine.store.row(42, ts(3, 0, 0).date()).unwrap();
        assert!(row.check_out.is_none());
    }

    #[actix_web::test]
    async fn check_out_from_other_device_allowed_by_default() {
        let engine = engine(MemStore::default());
        engine.record_event(42, ts(3, 8, 0), "GATE-01").await.unwrap();

        let outcome = engine.record_event(42, ts(3, 17, 5), "GATE-02").await.unwrap();
        assert!(matches!(outcome, ScanOutcome::CheckedOut { .. }));
    }

    #[actix_web::test]
    async fn lost_insert_race_retries_as_check_out_path() {
        let store = RacingStore {
            inner: MemStore::default(),
            raced: AtomicBool::new(false),
        };
        let engine = AttendanceEngine::new(store, false);

        // Both scans race at 08:10; this caller loses the insert and must
        // not create a second row nor mutate the winner's check-in.
        let outcome = engine.record_event(42, ts(3, 8, 10), "GATE-01").await.unwrap();
        assert_eq!(outcome, ScanOutcome::Rejected(RejectReason::TooEarlyToCheckOut));
        assert_eq!(engine.store.inner.len(), 1);
    }
}
