use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "email": "jane.doe@company.com",
        "first_name": "Jane",
        "last_name": "Doe",
        "is_manager": false,
        "manager_id": 7,
        "is_active": true,
        "date_created": "2024-01-01T00:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "jane.doe@company.com")]
    pub email: String,

    #[schema(example = "Jane")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    pub is_manager: bool,

    /// At most one manager; NULL for the top of a reporting chain.
    #[schema(example = 7, nullable = true)]
    pub manager_id: Option<u64>,

    pub is_active: bool,

    #[schema(example = "2024-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub date_created: DateTime<Utc>,
}
