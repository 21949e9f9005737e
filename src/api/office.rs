use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::office::Office;
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};

#[derive(Deserialize, ToSchema)]
pub struct CreateOffice {
    #[schema(example = "Head Office")]
    pub name: String,
    #[schema(example = "Jakarta")]
    pub city: String,
    #[schema(example = "Jl. Sudirman No. 1")]
    pub address: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct OfficeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct OfficeListResponse {
    pub data: Vec<Office>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 4)]
    pub total: i64,
}

const OFFICE_UPDATE_COLUMNS: &[&str] = &["name", "city", "address"];

/// Create Office
#[utoipa::path(
    post,
    path = "/api/v1/offices",
    request_body = CreateOffice,
    responses(
        (status = 201, description = "Office created", body = Object, example = json!({ "id": 1 })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn create_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateOffice>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query("INSERT INTO offices (name, city, address) VALUES (?, ?, ?)")
        .bind(&payload.name)
        .bind(&payload.city)
        .bind(&payload.address)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create office");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(json!({ "id": result.last_insert_id() })))
}

/// Paginated office list
#[utoipa::path(
    get,
    path = "/api/v1/offices",
    params(OfficeQuery),
    responses(
        (status = 200, description = "Paginated office list", body = OfficeListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn list_offices(
    pool: web::Data<MySqlPool>,
    query: web::Query<OfficeQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM offices")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count offices");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let offices = sqlx::query_as::<_, Office>(
        "SELECT id, name, city, address FROM offices ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch offices");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(OfficeListResponse {
        data: offices,
        page,
        per_page,
        total,
    }))
}

/// Get Office by ID
#[utoipa::path(
    get,
    path = "/api/v1/offices/{office_id}",
    params(
        ("office_id" = u64, Path, description = "Office ID")
    ),
    responses(
        (status = 200, description = "Office found", body = Office),
        (status = 404, description = "Office not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn get_office(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let office_id = path.into_inner();

    let office =
        sqlx::query_as::<_, Office>("SELECT id, name, city, address FROM offices WHERE id = ?")
            .bind(office_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, office_id, "Failed to fetch office");
                ErrorInternalServerError("Internal Server Error")
            })?;

    match office {
        Some(office) => Ok(HttpResponse::Ok().json(office)),
        None => Ok(HttpResponse::NotFound().json(json!({ "message": "Office not found" }))),
    }
}

/// Update Office
#[utoipa::path(
    put,
    path = "/api/v1/offices/{office_id}",
    params(
        ("office_id" = u64, Path, description = "Office ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Office updated successfully"),
        (status = 400, description = "Unknown field in payload"),
        (status = 404, description = "Office not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn update_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let office_id = path.into_inner();

    let update = build_update_sql(
        "offices",
        &body,
        OFFICE_UPDATE_COLUMNS,
        "id",
        SqlValue::I64(office_id),
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Office not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Office updated successfully" })))
}

/// Delete Office
#[utoipa::path(
    delete,
    path = "/api/v1/offices/{office_id}",
    params(
        ("office_id" = u64, Path, description = "Office ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Office not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Office"
)]
pub async fn delete_office(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let office_id = path.into_inner();

    let result = sqlx::query("DELETE FROM offices WHERE id = ?")
        .bind(office_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, office_id, "Failed to delete office");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Office not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
