use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Holiday {
    pub id: u64,
    /// Unique; at most one holiday per calendar date.
    #[schema(example = "2024-01-03", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "New Year holiday")]
    pub description: String,
}
