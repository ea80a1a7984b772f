use crate::leave::calendar;
use crate::leave::error::LeaveError;
use crate::leave::quota::LeavePolicy;
use crate::model::leave_request::LeaveType;
use chrono::NaiveDate;
use sqlx::MySqlConnection;
use std::collections::HashSet;

/// A prospective leave request, before any dates have been checked.
#[derive(Debug)]
pub struct LeaveSubmission {
    pub leave_type: LeaveType,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: String,
}

/// Inclusive date range of an existing pending/approved request.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Validate a prospective request, fail-fast with no side effects.
///
/// Checks run in order: required fields, date ordering, overlap against the
/// employee's active requests, at least one working day, and the annual quota
/// for the leave type. On success returns the computed working-day count for
/// the caller to persist with the new request.
pub fn validate(
    submission: &LeaveSubmission,
    existing: &[DateRange],
    holidays: &HashSet<NaiveDate>,
    used: u32,
    policy: &LeavePolicy,
) -> Result<u32, LeaveError> {
    let start = submission
        .start_date
        .ok_or(LeaveError::MissingField("start_date"))?;
    let end = submission
        .end_date
        .ok_or(LeaveError::MissingField("end_date"))?;
    if submission.reason.trim().is_empty() {
        return Err(LeaveError::MissingField("reason"));
    }

    if start > end {
        return Err(LeaveError::InvalidRange);
    }

    if existing.iter().any(|range| overlaps(range, start, end)) {
        return Err(LeaveError::OverlappingRequest);
    }

    let working_days = calendar::working_days(start, end, holidays);
    if working_days == 0 {
        return Err(LeaveError::NoWorkingDays);
    }

    let limit = policy.cap(submission.leave_type);
    if used + working_days > limit {
        return Err(LeaveError::QuotaExceeded {
            used,
            limit,
            remaining: limit.saturating_sub(used),
        });
    }

    Ok(working_days)
}

// Half-open overlap test: existing.start < new.end AND existing.end >= new.start.
fn overlaps(existing: &DateRange, start: NaiveDate, end: NaiveDate) -> bool {
    existing.start_date < end && existing.end_date >= start
}

/// Date ranges of this employee's pending/approved requests, locked for the
/// duration of the enclosing transaction so concurrent submissions serialize.
pub async fn active_ranges(
    conn: &mut MySqlConnection,
    employee_id: u64,
) -> Result<Vec<DateRange>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT start_date, end_date
        FROM leave_requests
        WHERE employee_id = ?
        AND status IN ('pending', 'approved')
        FOR UPDATE
        "#,
    )
    .bind(employee_id)
    .fetch_all(conn)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn submission(start: &str, end: &str) -> LeaveSubmission {
        LeaveSubmission {
            leave_type: LeaveType::Annual,
            start_date: Some(d(start)),
            end_date: Some(d(end)),
            reason: "family trip".into(),
        }
    }

    fn check(sub: &LeaveSubmission, existing: &[DateRange], used: u32) -> Result<u32, LeaveError> {
        validate(sub, existing, &HashSet::new(), used, &LeavePolicy::default())
    }

    #[test]
    fn accepts_clean_working_week() {
        let result = check(&submission("2024-01-01", "2024-01-05"), &[], 0);
        assert_eq!(result, Ok(5));
    }

    #[test]
    fn missing_start_date_fails_first() {
        let mut sub = submission("2024-01-01", "2024-01-05");
        sub.start_date = None;
        assert_eq!(
            check(&sub, &[], 0),
            Err(LeaveError::MissingField("start_date"))
        );
    }

    #[test]
    fn missing_end_date_is_reported() {
        let mut sub = submission("2024-01-01", "2024-01-05");
        sub.end_date = None;
        assert_eq!(check(&sub, &[], 0), Err(LeaveError::MissingField("end_date")));
    }

    #[test]
    fn blank_reason_is_rejected() {
        let mut sub = submission("2024-01-01", "2024-01-05");
        sub.reason = "   ".into();
        assert_eq!(check(&sub, &[], 0), Err(LeaveError::MissingField("reason")));
    }

    #[test]
    fn start_after_end_is_invalid_range() {
        let sub = submission("2024-01-05", "2024-01-01");
        assert_eq!(check(&sub, &[], 0), Err(LeaveError::InvalidRange));
    }

    #[test]
    fn overlapping_pending_request_is_rejected() {
        // Existing [2024-02-01, 2024-02-05], new [2024-02-04, 2024-02-06]
        let existing = [DateRange {
            start_date: d("2024-02-01"),
            end_date: d("2024-02-05"),
        }];
        let sub = submission("2024-02-04", "2024-02-06");
        assert_eq!(check(&sub, &existing, 0), Err(LeaveError::OverlappingRequest));
    }

    #[test]
    fn adjacent_range_after_existing_is_accepted() {
        let existing = [DateRange {
            start_date: d("2024-02-05"), // Mon
            end_date: d("2024-02-07"),
        }];
        // Starts the day after the existing range ends
        let sub = submission("2024-02-08", "2024-02-09");
        assert!(check(&sub, &existing, 0).is_ok());
    }

    #[test]
    fn range_ending_before_existing_starts_is_accepted() {
        let existing = [DateRange {
            start_date: d("2024-02-12"),
            end_date: d("2024-02-16"),
        }];
        let sub = submission("2024-02-05", "2024-02-09");
        assert!(check(&sub, &existing, 0).is_ok());
    }

    #[test]
    fn weekend_only_range_has_no_working_days() {
        // Sat-Sun
        let sub = submission("2024-01-06", "2024-01-07");
        assert_eq!(check(&sub, &[], 0), Err(LeaveError::NoWorkingDays));
    }

    #[test]
    fn holiday_only_single_day_has_no_working_days() {
        let holidays: HashSet<_> = [d("2024-01-02")].into_iter().collect();
        let sub = submission("2024-01-02", "2024-01-02");
        let result = validate(&sub, &[], &holidays, 0, &LeavePolicy::default());
        assert_eq!(result, Err(LeaveError::NoWorkingDays));
    }

    #[test]
    fn quota_exhaustion_reports_remaining_days() {
        // 18 of 20 annual days used, asking for 3 more
        let sub = submission("2024-03-04", "2024-03-06"); // Mon-Wed, 3 working days
        assert_eq!(
            check(&sub, &[], 18),
            Err(LeaveError::QuotaExceeded {
                used: 18,
                limit: 20,
                remaining: 2,
            })
        );
    }

    #[test]
    fn remaining_never_goes_negative() {
        let sub = submission("2024-03-04", "2024-03-06");
        assert_eq!(
            check(&sub, &[], 25),
            Err(LeaveError::QuotaExceeded {
                used: 25,
                limit: 20,
                remaining: 0,
            })
        );
    }

    #[test]
    fn request_exactly_at_cap_is_accepted() {
        let sub = submission("2024-03-04", "2024-03-05"); // 2 working days
        assert_eq!(check(&sub, &[], 18), Ok(2));
    }

    #[test]
    fn quota_respects_injected_policy() {
        let policy = LeavePolicy::default().with_cap(LeaveType::Annual, 2);
        let sub = submission("2024-03-04", "2024-03-06");
        let result = validate(&sub, &[], &HashSet::new(), 0, &policy);
        assert_eq!(
            result,
            Err(LeaveError::QuotaExceeded {
                used: 0,
                limit: 2,
                remaining: 2,
            })
        );
    }

    #[test]
    fn holidays_reduce_the_persisted_day_count() {
        let holidays: HashSet<_> = [d("2024-01-03")].into_iter().collect();
        let sub = submission("2024-01-01", "2024-01-05");
        let result = validate(&sub, &[], &holidays, 0, &LeavePolicy::default());
        assert_eq!(result, Ok(4));
    }

    #[test]
    fn overlap_is_checked_before_quota() {
        // Both overlap and quota would fail; overlap must win.
        let existing = [DateRange {
            start_date: d("2024-02-01"),
            end_date: d("2024-02-05"),
        }];
        let sub = submission("2024-02-04", "2024-02-06");
        assert_eq!(
            check(&sub, &existing, 100),
            Err(LeaveError::OverlappingRequest)
        );
    }
}
