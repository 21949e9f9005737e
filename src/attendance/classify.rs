//! Pure punctuality rules. No I/O, no clock access: callers hand in the
//! event timestamp in local wall-clock time.

use chrono::{NaiveDateTime, Timelike};

use crate::model::attendance::{AttendanceCategory, CheckInStatus, CheckOutStatus};

/// Scans before this hour can never close the day; the engine rejects them
/// outright instead of classifying. Independent of the 17:00 early/on-time
/// boundary below.
pub const CHECK_OUT_OPENS_HOUR: u32 = 15;

/// On time until 08:15 inclusive, late from 08:16.
pub fn check_in_status(at: NaiveDateTime) -> CheckInStatus {
    let (hour, minute) = (at.hour(), at.minute());
    if hour < 8 || (hour == 8 && minute <= 15) {
        CheckInStatus::OnTime
    } else {
        CheckInStatus::Late
    }
}

/// Early before 17:00, on time until 17:15 inclusive, late after.
///
/// Only reachable for timestamps at or past [`CHECK_OUT_OPENS_HOUR`]; the
/// engine filters earlier scans before consulting this.
pub fn check_out_status(at: NaiveDateTime) -> CheckOutStatus {
    let (hour, minute) = (at.hour(), at.minute());
    if hour < 17 {
        CheckOutStatus::Early
    } else if hour == 17 && minute <= 15 {
        CheckOutStatus::OnTime
    } else {
        CheckOutStatus::Late
    }
}

/// Combine both scan statuses into the daily category.
///
/// The match is exhaustive over both enums, so every combination maps to a
/// category: leaving late on an on-time day counts as overtime, and any day
/// with a late arrival or an early departure is undisciplined.
pub fn category(check_in: CheckInStatus, check_out: CheckOutStatus) -> AttendanceCategory {
    match (check_in, check_out) {
        (CheckInStatus::OnTime, CheckOutStatus::OnTime) => AttendanceCategory::Discipline,
        (CheckInStatus::Late, _) | (_, CheckOutStatus::Early) => AttendanceCategory::Undiscipline,
        (CheckInStatus::OnTime, CheckOutStatus::Late) => AttendanceCategory::Overtime,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 3)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn check_in_on_time_before_eight() {
        assert_eq!(check_in_status(at(6, 45)), CheckInStatus::OnTime);
        assert_eq!(check_in_status(at(7, 59)), CheckInStatus::OnTime);
    }

    #[test]
    fn check_in_grace_period_ends_at_eight_fifteen() {
        assert_eq!(check_in_status(at(8, 0)), CheckInStatus::OnTime);
        assert_eq!(check_in_status(at(8, 15)), CheckInStatus::OnTime);
        assert_eq!(check_in_status(at(8, 16)), CheckInStatus::Late);
    }

    #[test]
    fn check_in_late_after_grace() {
        assert_eq!(check_in_status(at(9, 0)), CheckInStatus::Late);
        assert_eq!(check_in_status(at(13, 30)), CheckInStatus::Late);
    }

    #[test]
    fn check_out_early_before_five() {
        assert_eq!(check_out_status(at(15, 0)), CheckOutStatus::Early);
        assert_eq!(check_out_status(at(16, 59)), CheckOutStatus::Early);
    }

    #[test]
    fn check_out_grace_period_ends_at_five_fifteen() {
        assert_eq!(check_out_status(at(17, 0)), CheckOutStatus::OnTime);
        assert_eq!(check_out_status(at(17, 15)), CheckOutStatus::OnTime);
        assert_eq!(check_out_status(at(17, 16)), CheckOutStatus::Late);
    }

    #[test]
    fn check_out_late_in_the_evening() {
        assert_eq!(check_out_status(at(18, 0)), CheckOutStatus::Late);
        assert_eq!(check_out_status(at(22, 30)), CheckOutStatus::Late);
    }

    #[test]
    fn category_table() {
        use AttendanceCategory::*;
        use CheckInStatus as In;
        use CheckOutStatus as Out;

        assert_eq!(category(In::OnTime, Out::OnTime), Discipline);
        assert_eq!(category(In::OnTime, Out::Early), Undiscipline);
        assert_eq!(category(In::OnTime, Out::Late), Overtime);
        assert_eq!(category(In::Late, Out::Early), Undiscipline);
        assert_eq!(category(In::Late, Out::OnTime), Undiscipline);
        assert_eq!(category(In::Late, Out::Late), Undiscipline);
    }
}
