use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "jane.doe@company.com", format = "email", value_type = String)]
    pub email: String,
    pub password: String,
    /// Must match `password`.
    pub password2: String,
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[serde(default)]
    pub is_manager: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "jane.doe@company.com", format = "email", value_type = String)]
    pub email: String,
    pub password: String,
}

/// Credential row fetched at login.
#[derive(FromRow)]
pub struct EmployeeCredentials {
    pub id: u64,
    pub email: String,
    pub password: String,
    pub is_manager: bool,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated employee.
    pub employee_id: u64,
    /// Employee email.
    pub sub: String,
    pub is_manager: bool,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
