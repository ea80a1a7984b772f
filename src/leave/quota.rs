use crate::model::leave_request::LeaveType;
use sqlx::MySqlConnection;
use std::collections::HashMap;
use std::env;

/// Annual caps per leave type, in working days.
///
/// Injected into the validator rather than read at call sites so tests can
/// run with alternate policies.
#[derive(Debug, Clone)]
pub struct LeavePolicy {
    caps: HashMap<LeaveType, u32>,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            caps: HashMap::from([
                (LeaveType::Annual, 20),
                (LeaveType::Sick, 6),
                (LeaveType::Casual, 10),
                (LeaveType::Maternity, 90),
            ]),
        }
    }
}

impl LeavePolicy {
    /// Caps taken from LEAVE_CAP_* env vars, falling back to the defaults.
    pub fn from_env() -> Self {
        let mut policy = Self::default();
        for (leave_type, var) in [
            (LeaveType::Annual, "LEAVE_CAP_ANNUAL"),
            (LeaveType::Sick, "LEAVE_CAP_SICK"),
            (LeaveType::Casual, "LEAVE_CAP_CASUAL"),
            (LeaveType::Maternity, "LEAVE_CAP_MATERNITY"),
        ] {
            if let Ok(value) = env::var(var) {
                if let Ok(cap) = value.parse() {
                    policy.caps.insert(leave_type, cap);
                }
            }
        }
        policy
    }

    pub fn with_cap(mut self, leave_type: LeaveType, cap: u32) -> Self {
        self.caps.insert(leave_type, cap);
        self
    }

    pub fn cap(&self, leave_type: LeaveType) -> u32 {
        self.caps.get(&leave_type).copied().unwrap_or(0)
    }
}

/// Working days already consumed by this employee's pending/approved requests
/// of the given type starting in `year`.
///
/// Rejected and cancelled requests never count. No matching rows is 0, not an
/// error.
pub async fn used_days(
    conn: &mut MySqlConnection,
    employee_id: u64,
    leave_type: LeaveType,
    year: i32,
) -> Result<u32, sqlx::Error> {
    let used: i64 = sqlx::query_scalar(
        r#"
        SELECT CAST(COALESCE(SUM(working_days), 0) AS SIGNED)
        FROM leave_requests
        WHERE employee_id = ?
        AND leave_type = ?
        AND YEAR(start_date) = ?
        AND status IN ('pending', 'approved')
        "#,
    )
    .bind(employee_id)
    .bind(leave_type.to_string())
    .bind(year)
    .fetch_one(conn)
    .await?;

    Ok(used as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_caps_match_policy() {
        let policy = LeavePolicy::default();
        assert_eq!(policy.cap(LeaveType::Annual), 20);
        assert_eq!(policy.cap(LeaveType::Sick), 6);
        assert_eq!(policy.cap(LeaveType::Casual), 10);
        assert_eq!(policy.cap(LeaveType::Maternity), 90);
    }

    #[test]
    fn with_cap_overrides_single_type() {
        let policy = LeavePolicy::default().with_cap(LeaveType::Annual, 25);
        assert_eq!(policy.cap(LeaveType::Annual), 25);
        assert_eq!(policy.cap(LeaveType::Sick), 6);
    }
}
