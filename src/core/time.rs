use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};

pub(crate) fn format_offset(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_else(|_| value.to_string())
}

/// Whole milliseconds, the unit every duration field uses on the wire.
pub(crate) fn duration_millis(value: Duration) -> i64 {
    i64::try_from(value.whole_milliseconds()).unwrap_or(i64::MAX)
}

/// Saturates instead of overflowing for absurd minute counts.
pub(crate) fn minutes(value: u64) -> Duration {
    let max = i64::MAX / 60;
    Duration::minutes(i64::try_from(value).map_or(max, |value| value.min(max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, PrimitiveDateTime, Time, UtcOffset};

    #[test]
    fn format_offset_outputs_rfc3339() {
        let date = Date::from_calendar_date(2025, time::Month::March, 4).unwrap();
        let time = Time::from_hms(8, 5, 0).unwrap();
        let utc = PrimitiveDateTime::new(date, time).assume_utc();
        assert_eq!(format_offset(utc), "2025-03-04T08:05:00Z");

        let shifted = utc.to_offset(UtcOffset::from_hms(3, 0, 0).unwrap());
        assert_eq!(format_offset(shifted), "2025-03-04T11:05:00+03:00");
    }

    #[test]
    fn duration_millis_truncates_sub_millisecond_part() {
        assert_eq!(duration_millis(Duration::minutes(30)), 1_800_000);
        assert_eq!(duration_millis(Duration::microseconds(2_999)), 2);
        assert_eq!(duration_millis(Duration::ZERO), 0);
    }

    #[test]
    fn minutes_converts_form_value() {
        assert_eq!(minutes(45), Duration::minutes(45));
    }
}
