use crate::leave::error::LeaveError;
use crate::model::leave_request::LeaveStatus;
use serde::Deserialize;
use utoipa::ToSchema;

/// Manager verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Decline,
}

/// Resolve a manager decision against the request's current status.
///
/// Only pending requests can move; re-approving an already-approved request
/// fails rather than silently succeeding.
pub fn decide(current: LeaveStatus, decision: Decision) -> Result<LeaveStatus, LeaveError> {
    if current != LeaveStatus::Pending {
        return Err(LeaveError::InvalidTransition { from: current });
    }
    Ok(match decision {
        Decision::Approve => LeaveStatus::Approved,
        Decision::Decline => LeaveStatus::Rejected,
    })
}

/// Resolve an owner-initiated cancellation.
///
/// Restricted to pending/approved requests; a rejected or already-cancelled
/// request stays where it is.
pub fn cancel(current: LeaveStatus) -> Result<LeaveStatus, LeaveError> {
    if !current.is_active() {
        return Err(LeaveError::InvalidTransition { from: current });
    }
    Ok(LeaveStatus::Cancelled)
}

/// Approve/decline is reserved for the owning employee's manager.
pub fn authorize_decision(
    actor_id: u64,
    actor_is_manager: bool,
    owner_manager_id: Option<u64>,
) -> Result<(), LeaveError> {
    if actor_is_manager && owner_manager_id == Some(actor_id) {
        Ok(())
    } else {
        Err(LeaveError::Forbidden)
    }
}

/// Cancellation is reserved for the owning employee.
pub fn authorize_cancel(actor_id: u64, owner_id: u64) -> Result<(), LeaveError> {
    if actor_id == owner_id {
        Ok(())
    } else {
        Err(LeaveError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_request_can_be_approved_or_declined() {
        assert_eq!(
            decide(LeaveStatus::Pending, Decision::Approve),
            Ok(LeaveStatus::Approved)
        );
        assert_eq!(
            decide(LeaveStatus::Pending, Decision::Decline),
            Ok(LeaveStatus::Rejected)
        );
    }

    #[test]
    fn deciding_a_non_pending_request_fails() {
        for status in [
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
            LeaveStatus::Cancelled,
        ] {
            assert_eq!(
                decide(status, Decision::Approve),
                Err(LeaveError::InvalidTransition { from: status })
            );
            assert_eq!(
                decide(status, Decision::Decline),
                Err(LeaveError::InvalidTransition { from: status })
            );
        }
    }

    #[test]
    fn active_requests_can_be_cancelled() {
        assert_eq!(cancel(LeaveStatus::Pending), Ok(LeaveStatus::Cancelled));
        assert_eq!(cancel(LeaveStatus::Approved), Ok(LeaveStatus::Cancelled));
    }

    #[test]
    fn settled_requests_cannot_be_cancelled() {
        assert_eq!(
            cancel(LeaveStatus::Rejected),
            Err(LeaveError::InvalidTransition {
                from: LeaveStatus::Rejected
            })
        );
        assert_eq!(
            cancel(LeaveStatus::Cancelled),
            Err(LeaveError::InvalidTransition {
                from: LeaveStatus::Cancelled
            })
        );
    }

    #[test]
    fn only_the_owners_manager_may_decide() {
        // Manager 2 manages the owner; manager 9 does not.
        assert!(authorize_decision(2, true, Some(2)).is_ok());
        assert_eq!(authorize_decision(9, true, Some(2)), Err(LeaveError::Forbidden));
    }

    #[test]
    fn non_manager_actor_is_forbidden_even_when_assigned() {
        assert_eq!(authorize_decision(2, false, Some(2)), Err(LeaveError::Forbidden));
    }

    #[test]
    fn owner_without_manager_cannot_be_decided() {
        assert_eq!(authorize_decision(2, true, None), Err(LeaveError::Forbidden));
    }

    #[test]
    fn only_the_owner_may_cancel() {
        assert!(authorize_cancel(5, 5).is_ok());
        assert_eq!(authorize_cancel(5, 6), Err(LeaveError::Forbidden));
    }
}
