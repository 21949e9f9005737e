use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::employee::Employee;
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "04A1B2C3D4")]
    pub serial_id: String,
    #[schema(example = 1)]
    pub office_id: u64,
    #[schema(example = 3, nullable = true)]
    pub division_id: Option<u64>,
    #[schema(example = 7, nullable = true)]
    pub supervisor_id: Option<u64>,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    #[schema(example = "Field Engineer")]
    pub position: String,
    #[schema(example = "jane.doe@company.com", format = "email")]
    pub email: String,
    #[schema(example = "+628123456789", nullable = true)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Filter by office
    pub office_id: Option<u64>,
    /// Filter by division
    pub division_id: Option<u64>,
    /// Search by employee or office name
    pub key: Option<String>,
}

/// List row joined with office and division names.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeListRow {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    #[schema(example = "04A1B2C3D4")]
    pub serial_id: String,
    #[schema(example = "Field Engineer")]
    pub position: String,
    #[schema(example = "Engineering", nullable = true)]
    pub division_name: Option<String>,
    #[schema(example = "Head Office")]
    pub office_name: String,
    #[schema(example = "Jakarta")]
    pub office_city: String,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<EmployeeListRow>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 128)]
    pub total: i64,
}

enum FilterValue {
    U64(u64),
    Str(String),
}

// Only these columns may be touched through the JSON update payload.
const EMPLOYEE_UPDATE_COLUMNS: &[&str] = &[
    "serial_id",
    "office_id",
    "division_id",
    "supervisor_id",
    "full_name",
    "position",
    "email",
    "phone",
    "is_active",
];

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({ "id": 42 })),
        (status = 409, description = "Serial already assigned"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (serial_id, office_id, division_id, supervisor_id, full_name, position, email, phone, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, NOW())
        "#,
    )
    .bind(&payload.serial_id)
    .bind(payload.office_id)
    .bind(payload.division_id)
    .bind(payload.supervisor_id)
    .bind(&payload.full_name)
    .bind(&payload.position)
    .bind(&payload.email)
    .bind(&payload.phone)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => Ok(HttpResponse::Created().json(json!({ "id": res.last_insert_id() }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Serial already assigned to another employee"
                    })));
                }
            }

            error!(error = %e, "Failed to create employee");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, Contact with system admin"
            })))
        }
    }
}

/// Paginated employee list
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions: Vec<&str> = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(office_id) = query.office_id {
        conditions.push("o.id = ?");
        bindings.push(FilterValue::U64(office_id));
    }

    if let Some(division_id) = query.division_id {
        conditions.push("d.id = ?");
        bindings.push(FilterValue::U64(division_id));
    }

    if let Some(key) = &query.key {
        conditions.push("(e.full_name LIKE ? OR o.name LIKE ?)");
        let like = format!("%{}%", key);
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let from_clause = r#"
        FROM employees e
        INNER JOIN offices o ON e.office_id = o.id
        LEFT JOIN divisions d ON e.division_id = d.id
    "#;

    let count_sql = format!("SELECT COUNT(*) {} {}", from_clause, where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_q = match b {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s.clone()),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        r#"
        SELECT e.id, e.full_name, e.serial_id, e.position,
               d.name AS division_name, o.name AS office_name, o.city AS office_city
        {} {}
        ORDER BY e.id DESC
        LIMIT ? OFFSET ?
        "#,
        from_clause, where_clause
    );

    let mut data_q = sqlx::query_as::<_, EmployeeListRow>(&data_sql);
    for b in &bindings {
        data_q = match b {
            FilterValue::U64(v) => data_q.bind(*v),
            FilterValue::Str(s) => data_q.bind(s.clone()),
        };
    }

    let employees = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employees");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Employees reporting to a supervisor
#[utoipa::path(
    get,
    path = "/api/v1/employees/supervised",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Employees under the calling supervisor", body = [Employee]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn supervised_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;

    let supervisor_id = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let employees = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, serial_id, office_id, division_id, supervisor_id,
               full_name, position, email, phone, is_active
        FROM employees
        WHERE supervisor_id = ?
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(supervisor_id)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, supervisor_id, "Failed to fetch supervised employees");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(employees))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, serial_id, office_id, division_id, supervisor_id,
               full_name, position, email, phone, is_active
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated successfully"),
        (status = 400, description = "Unknown field in payload"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let update = build_update_sql(
        "employees",
        &body,
        EMPLOYEE_UPDATE_COLUMNS,
        "id",
        SqlValue::I64(employee_id),
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Employee not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Employee updated successfully" })))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Employee not found"
                })));
            }

            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }

        Err(e) => {
            error!(error = %e, employee_id, "Failed to delete employee");

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}
