use time::{Duration, OffsetDateTime};

/// Completed or removed to-dos and shopping items stay visible in listings
/// for this many days. This is a display rule, not a storage rule: the rows
/// themselves are kept.
pub const DISPLAY_RETENTION_DAYS: i64 = 7;

/// Whether a soft-completed/soft-removed row should still appear in a
/// listing. Rows without the marker always show; marked rows only within
/// the retention window.
pub fn still_listed(marked_on: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    match marked_on {
        None => true,
        Some(ts) => ts > now - Duration::days(DISPLAY_RETENTION_DAYS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmarked_rows_always_show() {
        assert!(still_listed(None, OffsetDateTime::now_utc()));
    }

    #[test]
    fn marked_six_days_ago_still_shows() {
        let now = OffsetDateTime::now_utc();
        assert!(still_listed(Some(now - Duration::days(6)), now));
    }

    #[test]
    fn marked_eight_days_ago_is_gone() {
        let now = OffsetDateTime::now_utc();
        assert!(!still_listed(Some(now - Duration::days(8)), now));
    }

    #[test]
    fn window_closes_at_exactly_seven_days() {
        let now = OffsetDateTime::now_utc();
        assert!(still_listed(
            Some(now - Duration::days(7) + Duration::seconds(1)),
            now
        ));
        assert!(!still_listed(Some(now - Duration::days(7)), now));
    }
}
