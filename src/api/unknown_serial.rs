use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::unknown_serial::{UnknownSerial, UnknownSerialStatus};
use crate::utils::{serial_cache, serial_filter};

#[derive(Deserialize, ToSchema)]
pub struct UpdateUnknownSerial {
    #[schema(example = "accepted")]
    pub status: UnknownSerialStatus,
    #[schema(example = "assigned to new hire", nullable = true)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UnknownSerialQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Filter by review status
    #[schema(example = "pending")]
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UnknownSerialListResponse {
    pub data: Vec<UnknownSerial>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 2)]
    pub total: i64,
}

/// Paginated unknown-serial queue
#[utoipa::path(
    get,
    path = "/api/v1/unknown-serials",
    params(UnknownSerialQuery),
    responses(
        (status = 200, description = "Paginated unknown-serial list", body = UnknownSerialListResponse),
        (status = 400, description = "Invalid status filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "UnknownSerial"
)]
pub async fn list_unknown_serials(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UnknownSerialQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::new();
    let mut status_bind: Option<String> = None;

    if let Some(status) = query.status.as_deref() {
        let status: UnknownSerialStatus = status
            .parse()
            .map_err(|_| actix_web::error::ErrorBadRequest("Invalid status"))?;
        where_sql.push_str(" WHERE status = ?");
        status_bind = Some(status.to_string());
    }

    let count_sql = format!("SELECT COUNT(*) FROM unknown_serial_ids{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(status) = &status_bind {
        count_q = count_q.bind(status.clone());
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count unknown serials");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, serial_id, status, note, detected_at
        FROM unknown_serial_ids
        {}
        ORDER BY detected_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, UnknownSerial>(&data_sql);
    if let Some(status) = &status_bind {
        data_q = data_q.bind(status.clone());
    }

    let records = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch unknown serials");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(UnknownSerialListResponse {
        data: records,
        page,
        per_page,
        total,
    }))
}

/// Unknown-serial entry by serial
#[utoipa::path(
    get,
    path = "/api/v1/unknown-serials/by-serial/{serial_id}",
    params(
        ("serial_id" = String, Path, description = "Badge serial")
    ),
    responses(
        (status = 200, description = "Entry found", body = UnknownSerial),
        (status = 404, description = "Entry not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "UnknownSerial"
)]
pub async fn get_unknown_serial(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let serial_id = path.into_inner();

    let record = sqlx::query_as::<_, UnknownSerial>(
        "SELECT id, serial_id, status, note, detected_at FROM unknown_serial_ids WHERE serial_id = ?",
    )
    .bind(&serial_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, serial_id, "Failed to fetch unknown serial");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match record {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(HttpResponse::NotFound().json(json!({ "message": "Record not found" }))),
    }
}

/// Resolve an unknown-serial entry
#[utoipa::path(
    put,
    path = "/api/v1/unknown-serials/{id}",
    params(
        ("id" = u64, Path, description = "Entry ID")
    ),
    request_body = UpdateUnknownSerial,
    responses(
        (status = 200, description = "Record updated successfully"),
        (status = 404, description = "Record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "UnknownSerial"
)]
pub async fn update_unknown_serial(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateUnknownSerial>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();

    let serial_id = sqlx::query_scalar::<_, String>(
        "SELECT serial_id FROM unknown_serial_ids WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to fetch unknown serial for update");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(serial_id) = serial_id else {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Record not found" })));
    };

    sqlx::query("UPDATE unknown_serial_ids SET status = ?, note = ? WHERE id = ?")
        .bind(payload.status)
        .bind(&payload.note)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to update unknown serial");
            ErrorInternalServerError("Internal Server Error")
        })?;

    // the entry left the pending queue; the fast path must forget it
    if payload.status != UnknownSerialStatus::Pending {
        serial_filter::remove(&serial_id);
        serial_cache::evict(&serial_id).await;
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Record updated successfully" })))
}

/// Delete an unknown-serial entry
#[utoipa::path(
    delete,
    path = "/api/v1/unknown-serials/{id}",
    params(
        ("id" = u64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Record deleted successfully"),
        (status = 404, description = "Record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "UnknownSerial"
)]
pub async fn delete_unknown_serial(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();

    let serial_id = sqlx::query_scalar::<_, String>(
        "SELECT serial_id FROM unknown_serial_ids WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to fetch unknown serial for delete");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(serial_id) = serial_id else {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Record not found" })));
    };

    sqlx::query("DELETE FROM unknown_serial_ids WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to delete unknown serial");
            ErrorInternalServerError("Internal Server Error")
        })?;

    serial_filter::remove(&serial_id);
    serial_cache::evict(&serial_id).await;

    Ok(HttpResponse::Ok().json(json!({ "message": "Record deleted successfully" })))
}
