use chrono::{DateTime, Utc};

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

/// Elapsed hours from `from` to `to`, negative when `to` is earlier.
pub fn hours_between(
    from: &DateTime<Utc>,
    to: &DateTime<Utc>,
) -> f64 {
    let delta = *to - *from;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / MICROS_PER_HOUR,
        None => delta.num_seconds() as f64 / 3600.0,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::hours_between;

    #[test]
    fn test_hours_between() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(hours_between(&t0, &(t0 + Duration::hours(2))), 2.0);
        assert_eq!(hours_between(&t0, &(t0 + Duration::minutes(90))), 1.5);
        assert_eq!(hours_between(&(t0 + Duration::hours(1)), &t0), -1.0);
    }
}
