use crate::model::leave_request::LeaveStatus;

/// Caller-visible outcomes of leave validation and lifecycle transitions.
///
/// None of these represent an internal defect; the api layer maps them to
/// HTTP status codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaveError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("End date cannot be before start date")]
    InvalidRange,
    #[error("A leave request already exists for the selected dates")]
    OverlappingRequest,
    #[error("The selected dates contain no working days")]
    NoWorkingDays,
    #[error("Leave quota exceeded: {used} of {limit} days already used, {remaining} remaining")]
    QuotaExceeded { used: u32, limit: u32, remaining: u32 },
    #[error("Request is {from} and cannot be updated")]
    InvalidTransition { from: LeaveStatus },
    #[error("Not allowed to act on this leave request")]
    Forbidden,
    #[error("Leave request not found")]
    NotFound,
}
