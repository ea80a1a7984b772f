use chrono::{Datelike, NaiveDate, Weekday};
use sqlx::MySqlConnection;
use std::collections::HashSet;

/// Count of working days in `[start, end]` inclusive.
///
/// A working day is Monday–Friday and not present in the holiday set.
pub fn working_days(start: NaiveDate, end: NaiveDate, holidays: &HashSet<NaiveDate>) -> u32 {
    let mut count = 0;
    let mut day = start;
    while day <= end {
        let weekend = matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
        if !weekend && !holidays.contains(&day) {
            count += 1;
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break, // end of chrono's calendar
        };
    }
    count
}

/// Snapshot of the holiday registry restricted to `[start, end]`.
pub async fn holidays_between(
    conn: &mut MySqlConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HashSet<NaiveDate>, sqlx::Error> {
    let dates: Vec<NaiveDate> = sqlx::query_scalar(
        r#"
        SELECT date
        FROM holidays
        WHERE date BETWEEN ? AND ?
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(conn)
    .await?;

    Ok(dates.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn full_week_without_holidays() {
        // Mon 2024-01-01 .. Fri 2024-01-05
        let days = working_days(d("2024-01-01"), d("2024-01-05"), &HashSet::new());
        assert_eq!(days, 5);
    }

    #[test]
    fn holiday_inside_range_is_excluded() {
        let holidays: HashSet<_> = [d("2024-01-03")].into_iter().collect();
        let days = working_days(d("2024-01-01"), d("2024-01-05"), &holidays);
        assert_eq!(days, 4);
    }

    #[test]
    fn weekend_only_range_yields_zero() {
        // Sat 2024-01-06 .. Sun 2024-01-07
        let days = working_days(d("2024-01-06"), d("2024-01-07"), &HashSet::new());
        assert_eq!(days, 0);
    }

    #[test]
    fn single_day_on_holiday_yields_zero() {
        let holidays: HashSet<_> = [d("2024-01-02")].into_iter().collect();
        assert_eq!(working_days(d("2024-01-02"), d("2024-01-02"), &holidays), 0);
    }

    #[test]
    fn single_working_day() {
        assert_eq!(working_days(d("2024-01-02"), d("2024-01-02"), &HashSet::new()), 1);
    }

    #[test]
    fn intervening_weekend_is_skipped() {
        // Mon 2024-01-01 .. Fri 2024-01-12 contains one weekend
        let days = working_days(d("2024-01-01"), d("2024-01-12"), &HashSet::new());
        assert_eq!(days, 10);
    }
}
