use crate::auth::auth::AuthUser;
use crate::model::holiday::Holiday;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "2024-01-03", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "New Year holiday")]
    pub description: String,
}

/// Registered holidays, soonest first.
#[utoipa::path(
    get,
    path = "/api/holidays",
    responses(
        (status = 200, description = "Holiday registry", body = [Holiday]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn list_holidays(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let holidays = sqlx::query_as::<_, Holiday>(
        r#"
        SELECT id, date, description
        FROM holidays
        ORDER BY date
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch holidays");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(holidays))
}

/// Register a holiday date.
#[utoipa::path(
    post,
    path = "/api/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 201, description = "Holiday registered", body = Object, example = json!({
            "message": "Holiday registered"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager only"),
        (status = 409, description = "Date already registered", body = Object, example = json!({
            "message": "A holiday already exists on that date"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let result = sqlx::query(
        r#"
        INSERT INTO holidays (date, description)
        VALUES (?, ?)
        "#,
    )
    .bind(payload.date)
    .bind(payload.description.trim())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Holiday registered"
        }))),
        Err(e) => {
            // Unique key on date: one holiday per calendar day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "A holiday already exists on that date"
                    })));
                }
            }

            tracing::error!(error = %e, "Failed to register holiday");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}
