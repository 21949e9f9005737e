use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    models::{LoginReqDto, RegisterReq, TokenType, UserSql},
};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::model::role::Role;

// auth end points

/// true  => username AVAILABLE
/// false => username TAKEN
pub async fn is_username_available(username: &str, pool: &MySqlPool) -> bool {
    let username = username.to_lowercase();

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
    )
    .bind(&username)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

/// User registration handler
pub async fn register(user: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let username = user.username.trim();
    let password = &user.password;

    if username.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Username and password must not be empty"
        }));
    }

    if Role::from_id(user.role_id).is_none() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Invalid role"
        }));
    }

    if !is_username_available(username, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "error": "Username already taken"
        }));
    }

    let hashed = hash_password(password);

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password, role_id, employee_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(user.email.trim())
    .bind(hashed)
    .bind(user.role_id)
    .bind(user.employee_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => HttpResponse::Created().json(json!({
            "message": "User registered successfully"
        })),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return HttpResponse::Conflict().json(json!({
                        "error": "Username already exists"
                    }));
                }
            }

            error!(error = %e, "Failed to register user");
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }))
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    debug!("Fetching user from database");

    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, username, password, role_id, employee_id
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(&user.username)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!("Verifying password");

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Generating access token");

    let access_token = generate_access_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    debug!("Generating refresh token");

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    debug!("Updating last_login_at");

    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE username = ?")
        .bind(&user.username)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
        // intentionally not failing login
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

#[get("/protected")]
pub async fn protected(req: HttpRequest) -> impl Responder {
    match req.extensions().get::<crate::auth::auth::AuthUser>() {
        Some(user) => HttpResponse::Ok().body(user.username.clone()),
        None => HttpResponse::Unauthorized().body("No user"),
    }
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    // find refresh token in DB
    let record = match sqlx::query_as::<_, (u64, u64, i8)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (record_id, record_user_id) = match record {
        Some((id, user_id, revoked)) if revoked == 0 => (id, user_id),
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // revoke old refresh token
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // issue new refresh token
    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(record_user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // new access token
    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // revoke refresh token (idempotent)
    let _ = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = 1
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .execute(pool.get_ref())
    .await;

    // success (even if token didn't exist)
    HttpResponse::NoContent().finish()
}
