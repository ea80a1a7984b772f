use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::leave::error::LeaveError;
use crate::leave::lifecycle::{self, Decision};
use crate::leave::quota::used_days;
use crate::leave::validator::{self, LeaveSubmission};
use crate::leave::calendar::holidays_between;
use crate::model::leave_request::{LeaveStatus, LeaveType};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use sqlx::prelude::FromRow;
use std::collections::HashSet;
use std::str::FromStr;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ApplyLeave {
    #[schema(example = "annual")]
    pub leave_type: LeaveType,
    #[schema(example = "2024-02-01", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2024-02-05", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Family trip")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DecideLeave {
    #[schema(example = "approve")]
    pub action: Decision,
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "Jane Doe")]
    pub employee_name: String,
    #[schema(example = "annual", value_type = String)]
    pub leave_type: String,
    #[schema(example = "2024-02-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-02-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: String,
    #[schema(example = "pending", value_type = String)]
    pub status: String,
    #[schema(example = 5)]
    pub working_days: u32,
    #[schema(example = "2024-01-20T09:00:00Z", format = "date-time", value_type = String)]
    pub submission_date: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveTypeInfo {
    #[schema(example = "annual")]
    pub value: String,
    #[schema(example = "Annual Leave")]
    pub label: String,
    #[schema(example = 20)]
    pub max_days: u32,
}

/// Render a core leave error as the HTTP response the client sees.
///
/// The core never touches status codes; the mapping lives here only.
fn leave_error_response(err: &LeaveError) -> HttpResponse {
    match err {
        LeaveError::QuotaExceeded {
            used,
            limit,
            remaining,
        } => HttpResponse::BadRequest().json(json!({
            "message": err.to_string(),
            "used": used,
            "limit": limit,
            "remaining": remaining,
        })),
        LeaveError::Forbidden => HttpResponse::Forbidden().json(json!({
            "message": err.to_string()
        })),
        LeaveError::NotFound => HttpResponse::NotFound().json(json!({
            "message": err.to_string()
        })),
        _ => HttpResponse::BadRequest().json(json!({
            "message": err.to_string()
        })),
    }
}

const LEAVE_SELECT: &str = r#"
    SELECT
        lr.id,
        lr.employee_id,
        CONCAT(e.first_name, ' ', e.last_name) AS employee_name,
        lr.leave_type,
        lr.start_date,
        lr.end_date,
        lr.reason,
        lr.status,
        lr.working_days,
        lr.submission_date
    FROM leave_requests lr
    JOIN employees e ON e.id = lr.employee_id
"#;

/* =========================
Apply for leave
========================= */
#[utoipa::path(
    post,
    path = "/api/leave/apply",
    request_body(
        content = ApplyLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = Object, example = json!({
            "message": "Leave request submitted successfully",
            "id": 42,
            "working_days": 5,
            "status": "pending"
        })),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<ApplyLeave>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let submission = LeaveSubmission {
        leave_type: payload.leave_type,
        start_date: payload.start_date,
        end_date: payload.end_date,
        reason: payload.reason,
    };

    // Overlap check, quota check, and insert run inside one transaction;
    // the FOR UPDATE in active_ranges serializes concurrent submissions
    // for the same employee.
    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let existing = validator::active_ranges(&mut tx, auth.employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = auth.employee_id, "Failed to load active requests");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // Holiday snapshot only makes sense once both dates are usable; with a
    // broken range the validator fails before the calendar is consulted.
    let holidays = match (submission.start_date, submission.end_date) {
        (Some(start), Some(end)) if start <= end => holidays_between(&mut tx, start, end)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to load holidays");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?,
        _ => HashSet::new(),
    };

    let year = Utc::now().year();
    let used = used_days(&mut tx, auth.employee_id, submission.leave_type, year)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = auth.employee_id, "Failed to sum used leave days");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let working_days = match validator::validate(
        &submission,
        &existing,
        &holidays,
        used,
        &config.leave_policy,
    ) {
        Ok(days) => days,
        Err(err) => return Ok(leave_error_response(&err)),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type, start_date, end_date, reason, status, working_days, submission_date)
        VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)
        "#,
    )
    .bind(auth.employee_id)
    .bind(submission.leave_type.to_string())
    .bind(submission.start_date)
    .bind(submission.end_date)
    .bind(submission.reason.trim())
    .bind(working_days)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id = auth.employee_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Leave request submitted successfully",
        "id": result.last_insert_id(),
        "working_days": working_days,
        "status": "pending"
    })))
}

/* =========================
Approve / decline (manager)
========================= */
#[utoipa::path(
    patch,
    path = "/api/leave/requests/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to decide")
    ),
    request_body = DecideLeave,
    responses(
        (status = 200, description = "Decision applied", body = Object, example = json!({
            "message": "Leave request approved"
        })),
        (status = 400, description = "Request is not pending"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Actor is not the employee's manager"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DecideLeave>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let row: Option<(u64, String, Option<u64>)> = sqlx::query_as(
        r#"
        SELECT lr.employee_id, lr.status, e.manager_id
        FROM leave_requests lr
        JOIN employees e ON e.id = lr.employee_id
        WHERE lr.id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (_, status, manager_id) = match row {
        Some(r) => r,
        None => return Ok(leave_error_response(&LeaveError::NotFound)),
    };

    if let Err(err) = lifecycle::authorize_decision(auth.employee_id, auth.is_manager, manager_id) {
        return Ok(leave_error_response(&err));
    }

    let current = LeaveStatus::from_str(&status).map_err(|_| {
        tracing::error!(leave_id, status, "Unrecognized status in storage");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let next = match lifecycle::decide(current, payload.action) {
        Ok(next) => next,
        Err(err) => return Ok(leave_error_response(&err)),
    };

    // Status guard in the WHERE clause keeps two concurrent decisions from
    // both succeeding.
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(next.to_string())
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to update leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Leave request already processed"
        })));
    }

    let message = match payload.action {
        Decision::Approve => "Leave request approved",
        Decision::Decline => "Leave request declined",
    };

    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

/* =========================
Cancel own request
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/requests/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 200, description = "Leave request cancelled", body = Object, example = json!({
            "message": "Leave request cancelled"
        })),
        (status = 400, description = "Request already settled"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Actor does not own the request"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let row: Option<(u64, String)> = sqlx::query_as(
        r#"
        SELECT employee_id, status
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (owner_id, status) = match row {
        Some(r) => r,
        None => return Ok(leave_error_response(&LeaveError::NotFound)),
    };

    if let Err(err) = lifecycle::authorize_cancel(auth.employee_id, owner_id) {
        return Ok(leave_error_response(&err));
    }

    let current = LeaveStatus::from_str(&status).map_err(|_| {
        tracing::error!(leave_id, status, "Unrecognized status in storage");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if let Err(err) = lifecycle::cancel(current) {
        return Ok(leave_error_response(&err));
    }

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'cancelled'
        WHERE id = ?
        AND status = ?
        "#,
    )
    .bind(leave_id)
    .bind(current.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to cancel leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Leave request already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave request cancelled"
    })))
}

/* =========================
Read-only projections
========================= */

/// Own leave history, newest submission first.
#[utoipa::path(
    get,
    path = "/api/leave/history",
    responses(
        (status = 200, description = "Leave history", body = [LeaveResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let sql = format!(
        "{LEAVE_SELECT} WHERE lr.employee_id = ? ORDER BY lr.submission_date DESC, lr.id"
    );

    let requests = sqlx::query_as::<_, LeaveResponse>(&sql)
        .bind(auth.employee_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = auth.employee_id, "Failed to fetch leave history");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(requests))
}

/// Pending requests from the manager's direct subordinates.
#[utoipa::path(
    get,
    path = "/api/leave/requests",
    responses(
        (status = 200, description = "Pending subordinate requests", body = [LeaveResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let sql = format!(
        "{LEAVE_SELECT} WHERE e.manager_id = ? AND lr.status = 'pending' ORDER BY lr.submission_date DESC, lr.id"
    );

    let requests = sqlx::query_as::<_, LeaveResponse>(&sql)
        .bind(auth.employee_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, manager_id = auth.employee_id, "Failed to fetch pending requests");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(requests))
}

/// All requests from the manager's direct subordinates.
#[utoipa::path(
    get,
    path = "/api/leave/manager-history",
    responses(
        (status = 200, description = "Subordinate leave history", body = [LeaveResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn manager_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let sql = format!(
        "{LEAVE_SELECT} WHERE e.manager_id = ? ORDER BY lr.submission_date DESC, lr.id"
    );

    let requests = sqlx::query_as::<_, LeaveResponse>(&sql)
        .bind(auth.employee_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, manager_id = auth.employee_id, "Failed to fetch manager history");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(requests))
}

/// Subordinate leave report for the manager.
#[utoipa::path(
    get,
    path = "/api/leave/manager/report",
    responses(
        (status = 200, description = "Leave report", body = Object, example = json!({
            "report": []
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn manager_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let sql = format!(
        "{LEAVE_SELECT} WHERE e.manager_id = ? ORDER BY lr.submission_date DESC, lr.id"
    );

    let requests = sqlx::query_as::<_, LeaveResponse>(&sql)
        .bind(auth.employee_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, manager_id = auth.employee_id, "Failed to build manager report");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "report": requests })))
}

/// Own leave report.
#[utoipa::path(
    get,
    path = "/api/leave/employee/report",
    responses(
        (status = 200, description = "Leave report", body = Object, example = json!({
            "report": []
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn employee_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let sql = format!(
        "{LEAVE_SELECT} WHERE lr.employee_id = ? ORDER BY lr.submission_date DESC, lr.id"
    );

    let requests = sqlx::query_as::<_, LeaveResponse>(&sql)
        .bind(auth.employee_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = auth.employee_id, "Failed to build employee report");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "report": requests })))
}

/// Leave types with their annual caps.
#[utoipa::path(
    get,
    path = "/api/leave/types",
    responses(
        (status = 200, description = "Available leave types", body = [LeaveTypeInfo]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_types(config: web::Data<Config>) -> impl Responder {
    let types: Vec<LeaveTypeInfo> = LeaveType::iter()
        .map(|lt| LeaveTypeInfo {
            value: lt.to_string(),
            label: lt.label().to_string(),
            max_days: config.leave_policy.cap(lt),
        })
        .collect();

    HttpResponse::Ok().json(types)
}
