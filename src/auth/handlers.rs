use crate::{
    auth::{
        jwt::{issue_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    models::{EmployeeCredentials, LoginReq, RegisterReq, TokenType},
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

fn valid_name(name: &str) -> bool {
    !name.trim().is_empty() && name.chars().all(|c| c.is_ascii_alphabetic())
}

/// Employee registration handler
pub async fn register(payload: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let email = payload.email.trim().to_lowercase();

    if email.is_empty() || payload.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Email and password must not be empty"
        }));
    }

    if payload.password != payload.password2 {
        return HttpResponse::BadRequest().json(json!({
            "error": "Password fields didn't match"
        }));
    }

    if !valid_name(&payload.first_name) || !valid_name(&payload.last_name) {
        return HttpResponse::BadRequest().json(json!({
            "error": "Names must be non-empty and contain only alphabetic characters"
        }));
    }

    let hashed = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register employee"
            }));
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO employees (email, password, first_name, last_name, is_manager)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&email)
    .bind(&hashed)
    .bind(payload.first_name.trim())
    .bind(payload.last_name.trim())
    .bind(payload.is_manager)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => HttpResponse::Created().json(json!({
            "message": "Employee registered successfully"
        })),
        Err(e) => {
            // 23000 = unique key violation on email
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return HttpResponse::Conflict().json(json!({
                        "error": "Email already registered"
                    }));
                }
            }

            error!(error = %e, "Failed to register employee");
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register employee"
            }))
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    employee_id: u64,
    email: String,
    is_manager: bool,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, payload),
    fields(email = %payload.email)
)]
pub async fn login(
    payload: web::Json<LoginReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email or password required");
    }

    debug!("Fetching employee from database");

    let employee = match sqlx::query_as::<_, EmployeeCredentials>(
        r#"
        SELECT id, email, password, is_manager, is_active
        FROM employees
        WHERE email = ?
        "#,
    )
    .bind(payload.email.trim().to_lowercase())
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(emp)) => {
            debug!(employee_id = emp.id, "Employee found");
            emp
        }
        Ok(None) => {
            info!("Invalid credentials: employee not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching employee");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !employee.is_active {
        info!(employee_id = employee.id, "Login rejected: inactive account");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    if let Err(e) = verify_password(&payload.password, &employee.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified, issuing tokens");

    let access_token = issue_token(
        employee.id,
        &employee.email,
        employee.is_manager,
        TokenType::Access,
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let refresh_token = issue_token(
        employee.id,
        &employee.email,
        employee.is_manager,
        TokenType::Refresh,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    let (access_token, refresh_token) = match (access_token, refresh_token) {
        (Ok(a), Ok(r)) => (a, r),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Token generation failed");
            return HttpResponse::InternalServerError().finish();
        }
    };

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
        employee_id: employee.id,
        email: employee.email,
        is_manager: employee.is_manager,
    })
}

/// Exchange a refresh token for a fresh access/refresh pair. Stateless: the
/// token itself carries everything needed.
pub async fn refresh_token(req: HttpRequest, config: web::Data<Config>) -> impl Responder {
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

    let access = issue_token(
        claims.employee_id,
        &claims.sub,
        claims.is_manager,
        TokenType::Access,
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let refresh = issue_token(
        claims.employee_id,
        &claims.sub,
        claims.is_manager,
        TokenType::Refresh,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    match (access, refresh) {
        (Ok(access_token), Ok(refresh_token)) => HttpResponse::Ok().json(json!({
            "access_token": access_token,
            "refresh_token": refresh_token
        })),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Token generation failed");
            HttpResponse::InternalServerError().finish()
        }
    }
}
