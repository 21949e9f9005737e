use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::device::{Device, DeviceStatus};

#[derive(Deserialize, ToSchema)]
pub struct CreateDevice {
    #[schema(example = "GATE-01")]
    pub device_code: String,
    #[schema(example = "Main gate reader")]
    pub device_name: String,
    #[schema(example = "active")]
    pub status: DeviceStatus,
    #[schema(example = "Head Office lobby")]
    pub location: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateDevice {
    #[schema(example = "Main gate reader", nullable = true)]
    pub device_name: Option<String>,
    #[schema(example = "inactive", nullable = true)]
    pub status: Option<DeviceStatus>,
    #[schema(example = "Warehouse entrance", nullable = true)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DeviceQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Search by device name or location
    pub key: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DeviceListResponse {
    pub data: Vec<Device>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 6)]
    pub total: i64,
}

/// Register a scan device
#[utoipa::path(
    post,
    path = "/api/v1/devices",
    request_body = CreateDevice,
    responses(
        (status = 201, description = "Device registered", body = Object, example = json!({ "device_code": "GATE-01" })),
        (status = 409, description = "Device already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Device"
)]
pub async fn create_device(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDevice>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query(
        r#"
        INSERT INTO devices (device_code, device_name, status, location, created_at)
        VALUES (?, ?, ?, ?, NOW())
        "#,
    )
    .bind(&payload.device_code)
    .bind(&payload.device_name)
    .bind(payload.status)
    .bind(&payload.location)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({ "device_code": payload.device_code }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Device already exists"
                    })));
                }
            }

            error!(error = %e, "Failed to register device");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// Paginated device list
#[utoipa::path(
    get,
    path = "/api/v1/devices",
    params(DeviceQuery),
    responses(
        (status = 200, description = "Paginated device list", body = DeviceListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Device"
)]
pub async fn list_devices(
    pool: web::Data<MySqlPool>,
    query: web::Query<DeviceQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::new();
    let mut like: Option<String> = None;

    if let Some(key) = &query.key {
        where_sql.push_str(" WHERE device_name LIKE ? OR location LIKE ?");
        like = Some(format!("%{}%", key));
    }

    let count_sql = format!("SELECT COUNT(*) FROM devices{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(like) = &like {
        count_q = count_q.bind(like.clone()).bind(like.clone());
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count devices");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT device_code, device_name, status, location, created_at
        FROM devices
        {}
        ORDER BY device_code
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Device>(&data_sql);
    if let Some(like) = &like {
        data_q = data_q.bind(like.clone()).bind(like.clone());
    }

    let devices = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch devices");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(DeviceListResponse {
        data: devices,
        page,
        per_page,
        total,
    }))
}

/// Get Device by code
#[utoipa::path(
    get,
    path = "/api/v1/devices/{device_code}",
    params(
        ("device_code" = String, Path, description = "Device code")
    ),
    responses(
        (status = 200, description = "Device found", body = Device),
        (status = 404, description = "Device not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Device"
)]
pub async fn get_device(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let device_code = path.into_inner();

    let device = sqlx::query_as::<_, Device>(
        r#"
        SELECT device_code, device_name, status, location, created_at
        FROM devices
        WHERE device_code = ?
        "#,
    )
    .bind(&device_code)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, device_code, "Failed to fetch device");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match device {
        Some(device) => Ok(HttpResponse::Ok().json(device)),
        None => Ok(HttpResponse::NotFound().json(json!({ "message": "Device not found" }))),
    }
}

/// Update Device
#[utoipa::path(
    put,
    path = "/api/v1/devices/{device_code}",
    params(
        ("device_code" = String, Path, description = "Device code")
    ),
    request_body = UpdateDevice,
    responses(
        (status = 200, description = "Device updated successfully"),
        (status = 404, description = "Device not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Device"
)]
pub async fn update_device(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<UpdateDevice>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let device_code = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE devices
        SET device_name = COALESCE(?, device_name),
            status = COALESCE(?, status),
            location = COALESCE(?, location)
        WHERE device_code = ?
        "#,
    )
    .bind(&payload.device_name)
    .bind(payload.status)
    .bind(&payload.location)
    .bind(&device_code)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, device_code, "Failed to update device");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Device not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Device updated successfully" })))
}

/// Delete Device
#[utoipa::path(
    delete,
    path = "/api/v1/devices/{device_code}",
    params(
        ("device_code" = String, Path, description = "Device code")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Device not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Device"
)]
pub async fn delete_device(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let device_code = path.into_inner();

    let result = sqlx::query("DELETE FROM devices WHERE device_code = ?")
        .bind(&device_code)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, device_code, "Failed to delete device");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Device not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
