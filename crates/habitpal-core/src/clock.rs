//! Local/UTC wall-time conversion for IANA timezones.
//!
//! A zone's UTC offset is date-dependent (daylight saving), so both
//! directions take a reference date, defaulting to "today" in the
//! respective calendar. Conversions are pure given their inputs and
//! round-trip for any wall time that is not inside a DST transition
//! gap or overlap.

use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::HabitError;
use crate::habit::validate_schedule;

/// Parse an IANA zone identifier.
pub fn parse_zone(zone: &str) -> Result<Tz, HabitError> {
    zone.parse()
        .map_err(|_| HabitError::UnknownZone(zone.to_string()))
}

/// Convert a local wall time in `zone` to the UTC wall time on
/// `reference_date` (default: today in that zone).
pub fn to_utc(
    local_hour: u32,
    local_minute: u32,
    zone: &str,
    reference_date: Option<NaiveDate>,
) -> Result<(u32, u32), HabitError> {
    validate_schedule(local_hour, local_minute)?;
    let tz = parse_zone(zone)?;
    let date = reference_date.unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());

    let naive = date.and_time(chrono::NaiveTime::MIN)
        + Duration::hours(i64::from(local_hour))
        + Duration::minutes(i64::from(local_minute));
    let utc = resolve_local(&tz, naive).with_timezone(&Utc);
    Ok((utc.hour(), utc.minute()))
}

/// Convert a UTC wall time to the local wall time in `zone` on
/// `reference_date` (default: today, UTC).
pub fn to_local(
    utc_hour: u32,
    utc_minute: u32,
    zone: &str,
    reference_date: Option<NaiveDate>,
) -> Result<(u32, u32), HabitError> {
    validate_schedule(utc_hour, utc_minute)?;
    let tz = parse_zone(zone)?;
    let date = reference_date.unwrap_or_else(|| Utc::now().date_naive());

    let naive = date.and_time(chrono::NaiveTime::MIN)
        + Duration::hours(i64::from(utc_hour))
        + Duration::minutes(i64::from(utc_minute));
    let local = Utc.from_utc_datetime(&naive).with_timezone(&tz);
    Ok((local.hour(), local.minute()))
}

/// Resolve a local wall time to an instant.
///
/// DST fold picks the earlier instant; a DST gap is shifted forward until
/// the wall time exists again (gaps are at most two hours).
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> chrono::DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(earliest, _) => earliest,
        chrono::LocalResult::None => {
            let mut probe = naive;
            loop {
                probe += Duration::minutes(30);
                if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
                    return dt;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bogota_is_fixed_utc_minus_5() {
        let d = Some(date(2026, 8, 27));
        assert_eq!(to_utc(9, 0, "America/Bogota", d).unwrap(), (14, 0));
        assert_eq!(to_local(14, 0, "America/Bogota", d).unwrap(), (9, 0));
    }

    #[test]
    fn berlin_offset_depends_on_date() {
        // CET in winter (+1), CEST in summer (+2).
        assert_eq!(to_utc(9, 0, "Europe/Berlin", Some(date(2026, 1, 15))).unwrap(), (8, 0));
        assert_eq!(to_utc(9, 0, "Europe/Berlin", Some(date(2026, 7, 15))).unwrap(), (7, 0));
    }

    #[test]
    fn half_hour_zone() {
        // Asia/Kolkata is UTC+5:30 year-round.
        let d = Some(date(2026, 8, 27));
        assert_eq!(to_utc(9, 0, "Asia/Kolkata", d).unwrap(), (3, 30));
        assert_eq!(to_local(3, 30, "Asia/Kolkata", d).unwrap(), (9, 0));
    }

    #[test]
    fn unknown_zone_is_rejected() {
        assert_eq!(
            to_utc(9, 0, "Mars/Olympus_Mons", None),
            Err(HabitError::UnknownZone("Mars/Olympus_Mons".into()))
        );
        assert!(to_local(9, 0, "not a zone", None).is_err());
    }

    #[test]
    fn out_of_range_time_is_rejected() {
        assert!(matches!(
            to_utc(24, 0, "America/Bogota", None),
            Err(HabitError::InvalidSchedule { .. })
        ));
        assert!(to_local(0, 60, "America/Bogota", None).is_err());
    }

    #[test]
    fn dst_gap_resolves_forward() {
        // Europe/Berlin 2026-03-29: 02:00-03:00 local does not exist.
        let (h, _m) = to_utc(2, 30, "Europe/Berlin", Some(date(2026, 3, 29))).unwrap();
        // Shifted into CEST, so the instant lands at 01:00 UTC or later.
        assert!(h >= 1);
    }

    proptest! {
        // Round trip through a fixed-offset zone holds for every wall time.
        #[test]
        fn bogota_round_trip(h in 0u32..24, m in 0u32..60) {
            let d = Some(date(2026, 8, 27));
            let (uh, um) = to_utc(h, m, "America/Bogota", d).unwrap();
            prop_assert_eq!(to_local(uh, um, "America/Bogota", d).unwrap(), (h, m));
        }
    }
}
