pub mod activity_log;
pub mod duplicates;
pub mod order_status;
pub mod orders;
pub mod productivity;

use chrono::{DateTime, Local, NaiveTime, Utc};

/// Local midnight of the day containing `now`, expressed in UTC.
///
/// "Today" follows the facility's wall clock, so the boundary is computed
/// in the system's local offset. On the rare day a DST jump removes
/// midnight the boundary degrades to `now`, which only narrows the window.
pub(crate) fn start_of_local_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let local_midnight = now.with_timezone(&Local).date_naive().and_time(NaiveTime::MIN);
    local_midnight
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn start_of_day_is_at_most_a_day_behind_now() {
        let now = Utc::now();
        let start = start_of_local_day(now);
        assert!(start <= now);
        assert!(now - start < Duration::days(1) + Duration::hours(1));
    }

    #[test]
    fn instants_two_days_apart_never_share_a_day() {
        let now = Utc::now();
        let start = start_of_local_day(now);
        assert!(now - Duration::days(2) < start);
    }
}
