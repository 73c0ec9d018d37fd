//! Spanish date helpers. All computations are in UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

pub use domains::time::{format_date, format_date_time, relative_time};

const WEEKDAYS: [&str; 7] = [
    "Domingo",
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
];

const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

pub fn is_today(ts: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
    ts.date_naive() == now.date_naive()
}

/// Weeks start on Sunday at midnight.
pub fn is_this_week(ts: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
    let days_since_sunday = i64::from(now.weekday().num_days_from_sunday());
    let start = (now.date_naive() - Duration::days(days_since_sunday))
        .and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive));
    start.is_some_and(|start| *ts >= start)
}

pub fn weekday_name(ts: &DateTime<Utc>) -> &'static str {
    WEEKDAYS[ts.weekday().num_days_from_sunday() as usize]
}

pub fn month_name(ts: &DateTime<Utc>) -> &'static str {
    MONTHS[ts.month0() as usize]
}

/// Completed years between `birth` and `today`.
pub fn age_in_years(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

fn count(n: u64, unit: &str) -> String {
    if n > 1 {
        format!("{n} {unit}s")
    } else {
        format!("{n} {unit}")
    }
}

/// Largest whole unit of a millisecond span, e.g. `"3 horas"`.
pub fn format_duration(millis: u64) -> String {
    let seconds = millis / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        count(days, "día")
    } else if hours > 0 {
        count(hours, "hora")
    } else if minutes > 0 {
        count(minutes, "minuto")
    } else {
        count(seconds, "segundo")
    }
}

pub fn format_range(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    if start.date_naive() == end.date_naive() {
        format_date(start)
    } else {
        format!("{} - {}", format_date(start), format_date(end))
    }
}

/// Accepts RFC 3339, a bare `yyyy-mm-dd` (midnight UTC) or epoch milliseconds.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Sunday, 10 August 2025
    fn sunday_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn names() {
        let ts = sunday_noon();
        assert_eq!(weekday_name(&ts), "Domingo");
        assert_eq!(month_name(&ts), "Agosto");
        assert_eq!(weekday_name(&(ts + Duration::days(3))), "Miércoles");
    }

    #[test]
    fn week_starts_on_sunday_midnight() {
        let wednesday = sunday_noon() + Duration::days(3);
        assert!(is_this_week(&sunday_noon(), &wednesday));
        assert!(is_this_week(
            &Utc.with_ymd_and_hms(2025, 8, 10, 0, 0, 0).unwrap(),
            &wednesday
        ));
        assert!(!is_this_week(&(sunday_noon() - Duration::days(1)), &wednesday));
        assert!(is_today(&sunday_noon(), &(sunday_noon() + Duration::hours(2))));
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(500), "0 segundo");
        assert_eq!(format_duration(1_000), "1 segundo");
        assert_eq!(format_duration(90_000), "1 minuto");
        assert_eq!(format_duration(3 * 3_600_000), "3 horas");
        assert_eq!(format_duration(2 * 86_400_000), "2 días");
    }

    #[test]
    fn ranges() {
        let start = sunday_noon();
        assert_eq!(format_range(&start, &(start + Duration::hours(1))), "10/08/2025");
        assert_eq!(
            format_range(&start, &(start + Duration::days(2))),
            "10/08/2025 - 12/08/2025"
        );
    }

    #[test]
    fn parsing() {
        let expected = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2025-08-01"), Some(expected));
        assert_eq!(parse_date("2025-08-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_date(&expected.timestamp_millis().to_string()), Some(expected));
        assert_eq!(parse_date("ayer"), None);
    }

    #[test]
    fn ages() {
        let birth = NaiveDate::from_ymd_opt(1990, 8, 11).unwrap();
        assert_eq!(age_in_years(birth, NaiveDate::from_ymd_opt(2025, 8, 10).unwrap()), 34);
        assert_eq!(age_in_years(birth, NaiveDate::from_ymd_opt(2025, 8, 11).unwrap()), 35);
    }
}
