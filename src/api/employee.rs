use crate::auth::auth::AuthUser;
use crate::model::employee::Employee;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct AssignManager {
    /// New manager for the employee; null clears the assignment.
    #[schema(example = 7, nullable = true)]
    pub manager_id: Option<u64>,
}

/// Current authenticated employee.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Authenticated employee profile", body = Object, example = json!({
            "email": "jane.doe@company.com",
            "first_name": "Jane",
            "last_name": "Doe",
            "is_manager": false,
            "manager_id": 7
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn current_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let row: Option<(String, String, String, bool, Option<u64>)> = sqlx::query_as(
        r#"
        SELECT email, first_name, last_name, is_manager, manager_id
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(auth.employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = auth.employee_id, "Failed to fetch employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match row {
        Some((email, first_name, last_name, is_manager, manager_id)) => {
            Ok(HttpResponse::Ok().json(json!({
                "email": email,
                "first_name": first_name,
                "last_name": last_name,
                "is_manager": is_manager,
                "manager_id": manager_id,
            })))
        }
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Direct subordinates of the authenticated manager.
#[utoipa::path(
    get,
    path = "/api/employees/subordinates",
    responses(
        (status = 200, description = "Direct subordinates", body = [Employee]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn list_subordinates(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let subordinates = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, email, first_name, last_name, is_manager, manager_id, is_active, date_created
        FROM employees
        WHERE manager_id = ?
        ORDER BY id
        "#,
    )
    .bind(auth.employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, manager_id = auth.employee_id, "Failed to fetch subordinates");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(subordinates))
}

// Walk the manager chain upward from `from`; true if `target` appears.
// Bounded so a corrupt chain cannot spin forever.
async fn chain_reaches(
    pool: &MySqlPool,
    from: u64,
    target: u64,
) -> Result<bool, sqlx::Error> {
    let mut current = Some(from);
    for _ in 0..100 {
        let id = match current {
            Some(id) => id,
            None => return Ok(false),
        };
        if id == target {
            return Ok(true);
        }
        current = sqlx::query_scalar::<_, Option<u64>>(
            "SELECT manager_id FROM employees WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .flatten();
    }
    Ok(false)
}

/// Assign or clear an employee's manager.
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}/manager",
    params(
        ("employee_id" = u64, Path, description = "Employee whose manager changes")
    ),
    request_body = AssignManager,
    responses(
        (status = 200, description = "Manager assigned", body = Object, example = json!({
            "message": "Manager assigned"
        })),
        (status = 400, description = "Invalid assignment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn assign_manager(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<AssignManager>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let employee_id = path.into_inner();

    let exists: Option<u64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    if exists.is_none() {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    if let Some(manager_id) = payload.manager_id {
        if manager_id == employee_id {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "An employee cannot manage themselves"
            })));
        }

        let is_manager: Option<bool> =
            sqlx::query_scalar("SELECT is_manager FROM employees WHERE id = ?")
                .bind(manager_id)
                .fetch_optional(pool.get_ref())
                .await
                .map_err(|e| {
                    error!(error = %e, manager_id, "Failed to fetch manager");
                    actix_web::error::ErrorInternalServerError("Internal Server Error")
                })?;

        match is_manager {
            Some(true) => {}
            Some(false) => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "Assigned manager must have the manager role"
                })));
            }
            None => {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Manager not found"
                })));
            }
        }

        // Assigning someone from the employee's own reporting chain would
        // close a loop.
        let cyclic = chain_reaches(pool.get_ref(), manager_id, employee_id)
            .await
            .map_err(|e| {
                error!(error = %e, employee_id, manager_id, "Failed to walk manager chain");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
        if cyclic {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Assignment would create a management cycle"
            })));
        }
    }

    sqlx::query("UPDATE employees SET manager_id = ? WHERE id = ?")
        .bind(payload.manager_id)
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to assign manager");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Manager assigned"
    })))
}
