use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::division::{Division, DivisionWithOffice};
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};

#[derive(Deserialize, ToSchema)]
pub struct CreateDivision {
    #[schema(example = 1)]
    pub office_id: u64,
    #[schema(example = "Engineering")]
    pub name: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DivisionQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Search by division or office name
    pub key: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DivisionListResponse {
    pub data: Vec<DivisionWithOffice>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 12)]
    pub total: i64,
}

const DIVISION_UPDATE_COLUMNS: &[&str] = &["office_id", "name"];

/// Create Division
#[utoipa::path(
    post,
    path = "/api/v1/divisions",
    request_body = CreateDivision,
    responses(
        (status = 201, description = "Division created", body = Object, example = json!({ "id": 3 })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn create_division(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDivision>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query("INSERT INTO divisions (office_id, name) VALUES (?, ?)")
        .bind(payload.office_id)
        .bind(&payload.name)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create division");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(json!({ "id": result.last_insert_id() })))
}

/// Paginated division list
#[utoipa::path(
    get,
    path = "/api/v1/divisions",
    params(DivisionQuery),
    responses(
        (status = 200, description = "Paginated division list", body = DivisionListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn list_divisions(
    pool: web::Data<MySqlPool>,
    query: web::Query<DivisionQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::new();
    let mut like: Option<String> = None;

    if let Some(key) = &query.key {
        where_sql.push_str(" WHERE d.name LIKE ? OR o.name LIKE ?");
        like = Some(format!("%{}%", key));
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM divisions d INNER JOIN offices o ON d.office_id = o.id{}",
        where_sql
    );

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(like) = &like {
        count_q = count_q.bind(like.clone()).bind(like.clone());
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count divisions");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT d.id, d.office_id, d.name, o.name AS office_name, o.address AS office_address
        FROM divisions d
        INNER JOIN offices o ON d.office_id = o.id
        {}
        ORDER BY d.id
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, DivisionWithOffice>(&data_sql);
    if let Some(like) = &like {
        data_q = data_q.bind(like.clone()).bind(like.clone());
    }

    let divisions = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch divisions");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(DivisionListResponse {
        data: divisions,
        page,
        per_page,
        total,
    }))
}

/// Get Division by ID
#[utoipa::path(
    get,
    path = "/api/v1/divisions/{division_id}",
    params(
        ("division_id" = u64, Path, description = "Division ID")
    ),
    responses(
        (status = 200, description = "Division found", body = Division),
        (status = 404, description = "Division not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn get_division(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let division_id = path.into_inner();

    let division =
        sqlx::query_as::<_, Division>("SELECT id, office_id, name FROM divisions WHERE id = ?")
            .bind(division_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, division_id, "Failed to fetch division");
                ErrorInternalServerError("Internal Server Error")
            })?;

    match division {
        Some(division) => Ok(HttpResponse::Ok().json(division)),
        None => Ok(HttpResponse::NotFound().json(json!({ "message": "Division not found" }))),
    }
}

/// Divisions of an office
#[utoipa::path(
    get,
    path = "/api/v1/offices/{office_id}/divisions",
    params(
        ("office_id" = u64, Path, description = "Office ID")
    ),
    responses(
        (status = 200, description = "Divisions of the office", body = [Division]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn divisions_by_office(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let office_id = path.into_inner();

    let divisions = sqlx::query_as::<_, Division>(
        "SELECT id, office_id, name FROM divisions WHERE office_id = ? ORDER BY name",
    )
    .bind(office_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, office_id, "Failed to fetch office divisions");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(divisions))
}

/// Update Division
#[utoipa::path(
    put,
    path = "/api/v1/divisions/{division_id}",
    params(
        ("division_id" = u64, Path, description = "Division ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Division updated successfully"),
        (status = 400, description = "Unknown field in payload"),
        (status = 404, description = "Division not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn update_division(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let division_id = path.into_inner();

    let update = build_update_sql(
        "divisions",
        &body,
        DIVISION_UPDATE_COLUMNS,
        "id",
        SqlValue::I64(division_id),
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Division not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Division updated successfully" })))
}

/// Delete Division
#[utoipa::path(
    delete,
    path = "/api/v1/divisions/{division_id}",
    params(
        ("division_id" = u64, Path, description = "Division ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Division not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Division"
)]
pub async fn delete_division(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let division_id = path.into_inner();

    let result = sqlx::query("DELETE FROM divisions WHERE id = ?")
        .bind(division_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, division_id, "Failed to delete division");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Division not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
