use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::api::monitor::scan_ack;
use crate::attendance::gateway::LiveScanGateway;
use crate::auth::auth::AuthUser;
use crate::model::attendance::{Attendance, AttendanceCategory, CheckInStatus};
use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct RecordScan {
    #[schema(example = "04A1B2C3D4")]
    pub serial_id: String,
    #[schema(example = "GATE-01")]
    pub device_code: String,
    #[schema(example = "2026-02-03T08:10:00", value_type = String, format = "date-time", nullable = true)]
    pub recorded_at: Option<NaiveDateTime>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReplayScan {
    #[schema(example = 42)]
    pub employee_id: u64,
    #[schema(example = "GATE-01")]
    pub device_code: String,
    #[schema(example = "2026-02-03T17:05:00", value_type = String, format = "date-time", nullable = true)]
    pub recorded_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    /// Filter by employee ID
    #[schema(example = 42)]
    pub employee_id: Option<u64>,
    /// Filter by derived category
    #[schema(example = "discipline")]
    pub category: Option<String>,
    /// Filter by check-in status
    #[schema(example = "late")]
    pub status_check_in: Option<String>,
    /// Earliest check-in date (inclusive)
    #[param(value_type = String, format = "date", example = "2026-02-01")]
    #[schema(value_type = String, format = "date", example = "2026-02-01")]
    pub from: Option<NaiveDate>,
    /// Latest check-in date (inclusive)
    #[param(value_type = String, format = "date", example = "2026-02-28")]
    #[schema(value_type = String, format = "date", example = "2026-02-28")]
    pub to: Option<NaiveDate>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<Attendance>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 57)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
    Date(NaiveDate),
}

/// Record a badge scan by serial
#[utoipa::path(
    post,
    path = "/api/v1/attendances",
    request_body = RecordScan,
    responses(
        (status = 201, description = "Checked in"),
        (status = 200, description = "Checked out"),
        (status = 202, description = "Unknown serial queued for review"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden or device inactive"),
        (status = 404, description = "Device not found"),
        (status = 409, description = "Scan rejected")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn record_scan(
    auth: AuthUser,
    gateway: web::Data<LiveScanGateway>,
    payload: web::Json<RecordScan>,
) -> actix_web::Result<impl Responder> {
    auth.require_system_or_admin()?;

    let outcome = gateway
        .handle_scan_event(
            &payload.serial_id,
            payload.recorded_at,
            &payload.device_code,
        )
        .await
        .map_err(|e| {
            error!(error = %e, serial_id = %payload.serial_id, "scan recording failed");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(scan_ack(outcome))
}

/// Replay a scan event for a known employee
#[utoipa::path(
    post,
    path = "/api/v1/attendances/replay",
    request_body = ReplayScan,
    responses(
        (status = 201, description = "Checked in"),
        (status = 200, description = "Checked out"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Scan rejected")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn replay_scan(
    auth: AuthUser,
    gateway: web::Data<LiveScanGateway>,
    payload: web::Json<ReplayScan>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let outcome = gateway
        .record_for_employee(
            payload.employee_id,
            payload.recorded_at,
            &payload.device_code,
        )
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = payload.employee_id, "scan replay failed");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(scan_ack(outcome))
}

/// Paginated attendance list
#[utoipa::path(
    get,
    path = "/api/v1/attendances",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 400, description = "Invalid filter value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;

    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(employee_id));
    }

    if let Some(category) = query.category.as_deref() {
        // validate against the enum before it goes anywhere near SQL
        let category: AttendanceCategory = category
            .parse()
            .map_err(|_| actix_web::error::ErrorBadRequest("Invalid category"))?;
        where_sql.push_str(" AND category = ?");
        args.push(FilterValue::Str(category.to_string()));
    }

    if let Some(status) = query.status_check_in.as_deref() {
        let status: CheckInStatus = status
            .parse()
            .map_err(|_| actix_web::error::ErrorBadRequest("Invalid check-in status"))?;
        where_sql.push_str(" AND status_check_in = ?");
        args.push(FilterValue::Str(status.to_string()));
    }

    if let Some(from) = query.from {
        where_sql.push_str(" AND DATE(check_in) >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = query.to {
        where_sql.push_str(" AND DATE(check_in) <= ?");
        args.push(FilterValue::Date(to));
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s.clone()),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count attendance records");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, device_code, check_in, check_out,
               status_check_in, status_check_out, category
        FROM attendance
        {}
        ORDER BY check_in DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Attendance>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let records = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch attendance list");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page,
        per_page,
        total,
    }))
}

/// Today's record for one employee
#[utoipa::path(
    get,
    path = "/api/v1/attendances/today/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Today's record", body = Attendance),
        (status = 404, description = "No record today"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    // employees may only look at themselves
    if auth.role == Role::Employee && auth.employee_id != Some(employee_id) {
        return Err(actix_web::error::ErrorForbidden("Not your record"));
    }

    let record = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, device_code, check_in, check_out,
               status_check_in, status_check_out, category
        FROM attendance
        WHERE employee_id = ? AND DATE(check_in) = CURDATE()
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch today's attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match record {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "No attendance record today"
        }))),
    }
}

/// Attendance record by ID
#[utoipa::path(
    get,
    path = "/api/v1/attendances/{attendance_id}",
    params(
        ("attendance_id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Record found", body = Attendance),
        (status = 404, description = "Record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;

    let attendance_id = path.into_inner();

    let record = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, device_code, check_in, check_out,
               status_check_in, status_check_out, category
        FROM attendance
        WHERE id = ?
        "#,
    )
    .bind(attendance_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, attendance_id, "Failed to fetch attendance record");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match record {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Attendance record not found"
        }))),
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct IndividualReportQuery {
    #[schema(example = 42)]
    pub employee_id: Option<u64>,
    /// Month in YYYY-MM form
    #[schema(example = "2026-02")]
    pub month: String,
}

#[derive(Default, Serialize, ToSchema)]
pub struct ReportSummary {
    #[schema(example = 15)]
    pub on_time_check_ins: u32,
    #[schema(example = 3)]
    pub late_check_ins: u32,
    #[schema(example = 2)]
    pub early_check_outs: u32,
    #[schema(example = 12)]
    pub discipline_days: u32,
    #[schema(example = 4)]
    pub undiscipline_days: u32,
    #[schema(example = 2)]
    pub overtime_days: u32,
}

#[derive(Serialize, ToSchema)]
pub struct IndividualReport {
    #[schema(example = 42)]
    pub employee_id: u64,
    #[schema(example = "2026-02")]
    pub month: String,
    pub summary: ReportSummary,
    pub data: Vec<Attendance>,
}

/// Monthly report for one employee
#[utoipa::path(
    get,
    path = "/api/v1/attendances/report/individual",
    params(IndividualReportQuery),
    responses(
        (status = 200, description = "Monthly attendance report", body = IndividualReport),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn individual_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<IndividualReportQuery>,
) -> actix_web::Result<impl Responder> {
    // employees always get their own report; supervisors and admins pick one
    let employee_id = if auth.role == Role::Employee {
        auth.employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?
    } else {
        query
            .employee_id
            .ok_or_else(|| actix_web::error::ErrorBadRequest("employee_id required"))?
    };

    let month_start = NaiveDate::parse_from_str(&format!("{}-01", query.month), "%Y-%m-%d")
        .map_err(|_| actix_web::error::ErrorBadRequest("month must be YYYY-MM"))?;
    let month_end = month_start + Months::new(1);

    let records = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, device_code, check_in, check_out,
               status_check_in, status_check_out, category
        FROM attendance
        WHERE employee_id = ? AND check_in >= ? AND check_in < ?
        ORDER BY check_in
        "#,
    )
    .bind(employee_id)
    .bind(month_start)
    .bind(month_end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch individual report");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let mut summary = ReportSummary::default();
    for record in &records {
        match record.status_check_in {
            CheckInStatus::OnTime => summary.on_time_check_ins += 1,
            CheckInStatus::Late => summary.late_check_ins += 1,
        }
        if record.status_check_out == Some(crate::model::attendance::CheckOutStatus::Early) {
            summary.early_check_outs += 1;
        }
        match record.category {
            Some(AttendanceCategory::Discipline) => summary.discipline_days += 1,
            Some(AttendanceCategory::Undiscipline) => summary.undiscipline_days += 1,
            Some(AttendanceCategory::Overtime) => summary.overtime_days += 1,
            None => {}
        }
    }

    Ok(HttpResponse::Ok().json(IndividualReport {
        employee_id,
        month: query.month.clone(),
        summary,
        data: records,
    }))
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct RankRow {
    #[schema(example = 42)]
    pub employee_id: u64,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    #[schema(example = 21)]
    pub discipline_days: i64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RankQuery {
    #[schema(example = 10)]
    pub limit: Option<u32>,
}

/// Discipline ranking
#[utoipa::path(
    get,
    path = "/api/v1/attendances/rank",
    params(RankQuery),
    responses(
        (status = 200, description = "Employees ranked by disciplined days", body = [RankRow]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn rank_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RankQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;

    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let rows = sqlx::query_as::<_, RankRow>(
        r#"
        SELECT a.employee_id, e.full_name, COUNT(*) AS discipline_days
        FROM attendance a
        INNER JOIN employees e ON a.employee_id = e.id
        WHERE a.category = 'discipline'
        GROUP BY a.employee_id, e.full_name
        ORDER BY discipline_days DESC
        LIMIT ?
        "#,
    )
    .bind(limit as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch attendance ranking");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(rows))
}
