use chrono::NaiveDateTime;
use sqlx::MySqlPool;
use tracing::{info, instrument};

use crate::attendance::clock::{Clock, SystemClock};
use crate::attendance::engine::{AttendanceEngine, DeviceRejectReason, ScanOutcome};
use crate::attendance::store::{MySqlAttendanceStore, StoreError};
use crate::model::device::{Device, DeviceStatus};
use crate::model::employee::Employee;
use crate::utils::{serial_cache, serial_filter};

/// Serial-to-employee resolution, owned by employee management.
pub trait Directory {
    async fn find_by_serial(&self, serial_id: &str) -> Result<Option<Employee>, StoreError>;
    async fn employee_exists(&self, employee_id: u64) -> Result<bool, StoreError>;
}

/// Read-only view of the registered scan devices.
pub trait DeviceRegistry {
    async fn find_by_code(&self, device_code: &str) -> Result<Option<Device>, StoreError>;
}

/// Queue of badge serials nobody recognizes, kept for administrative review.
/// Registration is idempotent: at most one pending row per serial.
pub trait UnknownSerialRegistry {
    async fn has_pending(&self, serial_id: &str) -> Result<bool, StoreError>;
    async fn create_pending(&self, serial_id: &str, note: &str) -> Result<(), StoreError>;
}

/// Entry point for decoded scan events: resolves the device and the badge,
/// then hands the event to the engine. Every miss is a structured outcome so
/// the relay always gets a deterministic acknowledgment.
pub struct ScanGateway<C, D, R, U, S> {
    clock: C,
    directory: D,
    devices: R,
    unknown_serials: U,
    engine: AttendanceEngine<S>,
}

impl<C, D, R, U, S> ScanGateway<C, D, R, U, S>
where
    C: Clock,
    D: Directory,
    R: DeviceRegistry,
    U: UnknownSerialRegistry,
    S: crate::attendance::store::AttendanceStore,
{
    pub fn new(
        clock: C,
        directory: D,
        devices: R,
        unknown_serials: U,
        engine: AttendanceEngine<S>,
    ) -> Self {
        Self {
            clock,
            directory,
            devices,
            unknown_serials,
            engine,
        }
    }

    /// Handle one badge scan. `recorded_at` is the device-supplied local
    /// timestamp; the clock fills in when the event carries none.
    #[instrument(skip(self))]
    pub async fn handle_scan_event(
        &self,
        serial_id: &str,
        recorded_at: Option<NaiveDateTime>,
        device_code: &str,
    ) -> Result<ScanOutcome, StoreError> {
        let device = match self.devices.find_by_code(device_code).await? {
            Some(device) => device,
            None => return Ok(ScanOutcome::DeviceRejected(DeviceRejectReason::NotFound)),
        };
        if device.status != DeviceStatus::Active {
            return Ok(ScanOutcome::DeviceRejected(DeviceRejectReason::Inactive));
        }

        let at = recorded_at.unwrap_or_else(|| self.clock.now());

        match self.directory.find_by_serial(serial_id).await? {
            Some(employee) => self.engine.record_event(employee.id, at, device_code).await,
            None => {
                if !self.unknown_serials.has_pending(serial_id).await? {
                    let note = format!("first seen at {}", device_code);
                    match self.unknown_serials.create_pending(serial_id, &note).await {
                        Ok(()) => {
                            info!(serial_id, device_code, "unknown serial queued for review")
                        }
                        // Concurrent scans of the same badge: someone else
                        // queued it first, which is the state we wanted.
                        Err(StoreError::Conflict) => {}
                        Err(e) => return Err(e),
                    }
                }
                Ok(ScanOutcome::UnknownSerial {
                    serial_id: serial_id.to_owned(),
                })
            }
        }
    }

    /// Administrative replay of an event for a known employee id.
    pub async fn record_for_employee(
        &self,
        employee_id: u64,
        recorded_at: Option<NaiveDateTime>,
        device_code: &str,
    ) -> Result<ScanOutcome, StoreError> {
        if !self.directory.employee_exists(employee_id).await? {
            return Ok(ScanOutcome::EmployeeNotFound);
        }
        let at = recorded_at.unwrap_or_else(|| self.clock.now());
        self.engine.record_event(employee_id, at, device_code).await
    }
}

pub struct MySqlDirectory {
    pool: MySqlPool,
}

impl MySqlDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl Directory for MySqlDirectory {
    async fn find_by_serial(&self, serial_id: &str) -> Result<Option<Employee>, StoreError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, serial_id, office_id, division_id, supervisor_id,
                   full_name, position, email, phone, is_active
            FROM employees
            WHERE serial_id = ?
            "#,
        )
        .bind(serial_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn employee_exists(&self, employee_id: u64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ? LIMIT 1)",
        )
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

pub struct MySqlDeviceRegistry {
    pool: MySqlPool,
}

impl MySqlDeviceRegistry {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl DeviceRegistry for MySqlDeviceRegistry {
    async fn find_by_code(&self, device_code: &str) -> Result<Option<Device>, StoreError> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            SELECT device_code, device_name, status, location, created_at
            FROM devices
            WHERE device_code = ?
            "#,
        )
        .bind(device_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(device)
    }
}

/// Unknown-serial queue with the in-memory fast path in front of the table:
/// the cuckoo filter short-circuits badges never seen before, the moka cache
/// answers repeat offenders without a round trip. Scan storms from one
/// unregistered badge hit the database once.
pub struct MySqlUnknownSerialRegistry {
    pool: MySqlPool,
}

impl MySqlUnknownSerialRegistry {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl UnknownSerialRegistry for MySqlUnknownSerialRegistry {
    async fn has_pending(&self, serial_id: &str) -> Result<bool, StoreError> {
        // filter says "definitely never queued" with no false negatives
        if !serial_filter::might_be_queued(serial_id) {
            return Ok(false);
        }
        if serial_cache::is_queued(serial_id).await {
            return Ok(true);
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM unknown_serial_ids WHERE serial_id = ? AND status = 'pending' LIMIT 1)",
        )
        .bind(serial_id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            serial_cache::mark_queued(serial_id).await;
        }
        Ok(exists)
    }

    async fn create_pending(&self, serial_id: &str, note: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO unknown_serial_ids (serial_id, status, note, detected_at)
            VALUES (?, 'pending', ?, NOW())
            "#,
        )
        .bind(serial_id)
        .bind(note)
        .execute(&self.pool)
        .await?;

        serial_filter::insert(serial_id);
        serial_cache::mark_queued(serial_id).await;
        Ok(())
    }
}

/// Production wiring over one shared pool.
pub type LiveScanGateway = ScanGateway<
    SystemClock,
    MySqlDirectory,
    MySqlDeviceRegistry,
    MySqlUnknownSerialRegistry,
    MySqlAttendanceStore,
>;

pub fn live_gateway(pool: &MySqlPool, enforce_device_consistency: bool) -> LiveScanGateway {
    ScanGateway::new(
        SystemClock,
        MySqlDirectory::new(pool.clone()),
        MySqlDeviceRegistry::new(pool.clone()),
        MySqlUnknownSerialRegistry::new(pool.clone()),
        AttendanceEngine::new(
            MySqlAttendanceStore::new(pool.clone()),
            enforce_device_consistency,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::clock::fixed::FixedClock;
    use crate::attendance::engine::tests::{MemStore, ts};
    use crate::model::attendance::CheckInStatus;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubDirectory {
        employees: Vec<Employee>,
    }

    impl Directory for StubDirectory {
        async fn find_by_serial(&self, serial_id: &str) -> Result<Option<Employee>, StoreError> {
            Ok(self
                .employees
                .iter()
                .find(|e| e.serial_id == serial_id)
                .cloned())
        }

        async fn employee_exists(&self, employee_id: u64) -> Result<bool, StoreError> {
            Ok(self.employees.iter().any(|e| e.id == employee_id))
        }
    }

    struct StubDevices {
        devices: Vec<Device>,
    }

    impl DeviceRegistry for StubDevices {
        async fn find_by_code(&self, device_code: &str) -> Result<Option<Device>, StoreError> {
            Ok(self
                .devices
                .iter()
                .find(|d| d.device_code == device_code)
                .cloned())
        }
    }

    #[derive(Default)]
    struct StubUnknownSerials {
        pending: Mutex<Vec<String>>,
        created: AtomicUsize,
    }

    impl UnknownSerialRegistry for StubUnknownSerials {
        async fn has_pending(&self, serial_id: &str) -> Result<bool, StoreError> {
            Ok(self
                .pending
                .lock()
                .unwrap()
                .iter()
                .any(|s| s == serial_id))
        }

        async fn create_pending(&self, serial_id: &str, _note: &str) -> Result<(), StoreError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            self.pending.lock().unwrap().push(serial_id.to_owned());
            Ok(())
        }
    }

    fn employee(id: u64, serial_id: &str) -> Employee {
        Employee {
            id,
            serial_id: serial_id.to_owned(),
            office_id: 1,
            division_id: Some(1),
            supervisor_id: None,
            full_name: "Jane Doe".to_owned(),
            position: "Engineer".to_owned(),
            email: "jane@company.com".to_owned(),
            phone: None,
            is_active: "active".to_owned(),
        }
    }

    fn device(code: &str, status: DeviceStatus) -> Device {
        Device {
            device_code: code.to_owned(),
            device_name: format!("reader {}", code),
            status,
            location: "lobby".to_owned(),
            created_at: None,
        }
    }

    fn gateway(
        employees: Vec<Employee>,
        devices: Vec<Device>,
    ) -> ScanGateway<FixedClock, StubDirectory, StubDevices, StubUnknownSerials, MemStore> {
        ScanGateway::new(
            FixedClock(ts(3, 8, 10)),
            StubDirectory { employees },
            StubDevices { devices },
            StubUnknownSerials::default(),
            AttendanceEngine::new(MemStore::default(), false),
        )
    }

    #[actix_web::test]
    async fn unregistered_device_is_rejected() {
        let gw = gateway(vec![employee(42, "BADGE-42")], vec![]);

        let outcome = gw
            .handle_scan_event("BADGE-42", Some(ts(3, 8, 10)), "GATE-09")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::DeviceRejected(DeviceRejectReason::NotFound)
        );
    }

    #[actix_web::test]
    async fn inactive_device_is_rejected_before_attendance() {
        let gw = gateway(
            vec![employee(42, "BADGE-42")],
            vec![device("GATE-01", DeviceStatus::Inactive)],
        );

        let outcome = gw
            .handle_scan_event("BADGE-42", Some(ts(3, 8, 10)), "GATE-01")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::DeviceRejected(DeviceRejectReason::Inactive)
        );
    }

    #[actix_web::test]
    async fn resolved_serial_records_attendance() {
        let gw = gateway(
            vec![employee(42, "BADGE-42")],
            vec![device("GATE-01", DeviceStatus::Active)],
        );

        let outcome = gw
            .handle_scan_event("BADGE-42", Some(ts(3, 8, 10)), "GATE-01")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::CheckedIn {
                id: 1,
                status: CheckInStatus::OnTime
            }
        );
    }

    #[actix_web::test]
    async fn unknown_serial_is_queued_exactly_once() {
        let gw = gateway(vec![], vec![device("GATE-01", DeviceStatus::Active)]);

        let first = gw
            .handle_scan_event("BADGE-XYZ", Some(ts(3, 8, 10)), "GATE-01")
            .await
            .unwrap();
        let second = gw
            .handle_scan_event("BADGE-XYZ", Some(ts(3, 8, 11)), "GATE-01")
            .await
            .unwrap();

        assert_eq!(
            first,
            ScanOutcome::UnknownSerial {
                serial_id: "BADGE-XYZ".to_owned()
            }
        );
        assert_eq!(second, first);
        assert_eq!(gw.unknown_serials.created.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn missing_timestamp_falls_back_to_the_clock() {
        let gw = gateway(
            vec![employee(42, "BADGE-42")],
            vec![device("GATE-01", DeviceStatus::Active)],
        );

        gw.handle_scan_event("BADGE-42", None, "GATE-01")
            .await
            .unwrap();

        let row = gw.engine_store_row(42);
        assert_eq!(row.check_in, ts(3, 8, 10));
    }

    #[actix_web::test]
    async fn replay_for_unknown_employee_id() {
        let gw = gateway(
            vec![employee(42, "BADGE-42")],
            vec![device("GATE-01", DeviceStatus::Active)],
        );

        let outcome = gw
            .record_for_employee(99, Some(ts(3, 8, 10)), "GATE-01")
            .await
            .unwrap();
        assert_eq!(outcome, ScanOutcome::EmployeeNotFound);
    }

    impl ScanGateway<FixedClock, StubDirectory, StubDevices, StubUnknownSerials, MemStore> {
        fn engine_store_row(&self, employee_id: u64) -> crate::model::attendance::Attendance {
            self.engine
                .store()
                .row(employee_id, ts(3, 0, 0).date())
                .unwrap()
        }
    }
}
