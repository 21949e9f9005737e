use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::on_leave::OnLeave;

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Maternity,
    Other,
}

impl LeaveType {
    fn as_str(&self) -> &str {
        match self {
            LeaveType::Annual => "annual",
            LeaveType::Sick => "sick",
            LeaveType::Maternity => "maternity",
            LeaveType::Other => "other",
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 42)]
    pub employee_id: u64,
    #[schema(example = "2026-02-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-02-12", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "annual")]
    pub leave_type: LeaveType,
    #[schema(example = "Family matters", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LeaveQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Filter by employee ID
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<OnLeave>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: i64,
}

/// Record a leave period
#[utoipa::path(
    post,
    path = "/api/v1/on-leave",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave recorded", body = Object, example = json!({ "id": 10 })),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "OnLeave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO on_leave (employee_id, start_date, end_date, leave_type, reason, created_at)
        VALUES (?, ?, ?, ?, ?, NOW())
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type.as_str())
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to record leave");
        ErrorInternalServerError("Internal Server Error")
    })?;

    // keep the employee flag in sync for leaves starting today
    let _ = sqlx::query(
        r#"
        UPDATE employees SET is_active = 'on_leave'
        WHERE id = ? AND CURDATE() BETWEEN ? AND ?
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .execute(pool.get_ref())
    .await;

    Ok(HttpResponse::Created().json(json!({ "id": result.last_insert_id() })))
}

/// Paginated leave list
#[utoipa::path(
    get,
    path = "/api/v1/on-leave",
    params(LeaveQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "OnLeave"
)]
pub async fn list_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::new();
    if query.employee_id.is_some() {
        where_sql.push_str(" WHERE employee_id = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM on_leave{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(employee_id) = query.employee_id {
        count_q = count_q.bind(employee_id);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count leaves");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, start_date, end_date, leave_type, reason
        FROM on_leave
        {}
        ORDER BY start_date DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, OnLeave>(&data_sql);
    if let Some(employee_id) = query.employee_id {
        data_q = data_q.bind(employee_id);
    }

    let leaves = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leaves");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    }))
}

/// Get leave record by ID
#[utoipa::path(
    get,
    path = "/api/v1/on-leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "Leave record ID")
    ),
    responses(
        (status = 200, description = "Leave record found", body = OnLeave),
        (status = 404, description = "Leave record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "OnLeave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;

    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, OnLeave>(
        "SELECT id, employee_id, start_date, end_date, leave_type, reason FROM on_leave WHERE id = ?",
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to fetch leave record");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match leave {
        Some(leave) => Ok(HttpResponse::Ok().json(leave)),
        None => Ok(HttpResponse::NotFound().json(json!({ "message": "Leave record not found" }))),
    }
}

/// Delete leave record
#[utoipa::path(
    delete,
    path = "/api/v1/on-leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "Leave record ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Leave record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "OnLeave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_id = path.into_inner();

    let result = sqlx::query("DELETE FROM on_leave WHERE id = ?")
        .bind(leave_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, leave_id, "Failed to delete leave record");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Leave record not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
