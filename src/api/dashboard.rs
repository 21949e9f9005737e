use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;

#[derive(Serialize, ToSchema)]
pub struct DashboardPercentages {
    #[schema(example = 12.5)]
    pub absent: f64,
    #[schema(example = 62.5)]
    pub on_time: f64,
    #[schema(example = 18.75)]
    pub late: f64,
    #[schema(example = 6.25)]
    pub on_leave: f64,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardSummary {
    #[schema(example = 128)]
    pub employee_count: i64,
    #[schema(example = 16)]
    pub absent_count: i64,
    #[schema(example = 80)]
    pub on_time_count: i64,
    #[schema(example = 24)]
    pub late_count: i64,
    #[schema(example = 8)]
    pub on_leave_count: i64,
    pub percentages: DashboardPercentages,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct ChartPoint {
    #[schema(example = "2026-02-03", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 104)]
    pub total: i64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Today's headcount summary
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Attendance summary for today", body = DashboardSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;

    let employee_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count employees");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let on_time_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE status_check_in = 'on_time' AND DATE(check_in) = CURDATE()",
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to count on-time check-ins");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let late_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE status_check_in = 'late' AND DATE(check_in) = CURDATE()",
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to count late check-ins");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let on_leave_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT employee_id) FROM on_leave WHERE CURDATE() BETWEEN start_date AND end_date",
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to count employees on leave");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let present = on_time_count + late_count;
    let absent_count = (employee_count - present - on_leave_count).max(0);
    let total_sum = absent_count + present + on_leave_count;

    let percentages = if total_sum == 0 {
        DashboardPercentages {
            absent: 0.0,
            on_time: 0.0,
            late: 0.0,
            on_leave: 0.0,
        }
    } else {
        let total = total_sum as f64;
        let mut absent = absent_count as f64 / total * 100.0;
        let mut on_time = on_time_count as f64 / total * 100.0;
        let mut late = late_count as f64 / total * 100.0;
        let on_leave = on_leave_count as f64 / total * 100.0;

        // pin the largest share so the four always sum to 100
        let adjustment = 100.0 - (absent + on_time + late + on_leave);
        if absent >= on_time && absent >= late {
            absent += adjustment;
        } else if on_time >= late {
            on_time += adjustment;
        } else {
            late += adjustment;
        }

        DashboardPercentages {
            absent: round2(absent),
            on_time: round2(on_time),
            late: round2(late),
            on_leave: round2(on_leave),
        }
    };

    Ok(HttpResponse::Ok().json(DashboardSummary {
        employee_count,
        absent_count,
        on_time_count,
        late_count,
        on_leave_count,
        percentages,
    }))
}

/// Per-day attendance totals for the current month
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/chart",
    responses(
        (status = 200, description = "Daily totals for charting", body = [ChartPoint]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn chart(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;

    let points = sqlx::query_as::<_, ChartPoint>(
        r#"
        SELECT DATE(check_in) AS day, COUNT(*) AS total
        FROM attendance
        WHERE MONTH(check_in) = MONTH(CURDATE()) AND YEAR(check_in) = YEAR(CURDATE())
        GROUP BY DATE(check_in)
        ORDER BY day
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch attendance chart");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(points))
}
