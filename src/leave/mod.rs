pub mod calendar;
pub mod error;
pub mod lifecycle;
pub mod quota;
pub mod validator;
