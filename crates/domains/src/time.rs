//! Spanish date rendering used by the models and the presentation helpers.

use chrono::{DateTime, Utc};

/// `dd/mm/yyyy`
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%d/%m/%Y").to_string()
}

/// `dd/mm/yyyy hh:mm`
pub fn format_date_time(ts: &DateTime<Utc>) -> String {
    ts.format("%d/%m/%Y %H:%M").to_string()
}

fn plural(n: i64, unit: &str, plural_unit: &str) -> String {
    if n > 1 {
        format!("Hace {n} {plural_unit}")
    } else {
        format!("Hace {n} {unit}")
    }
}

/// Relative age of `ts` as seen from `now`.
///
/// Falls back to [`format_date`] once the timestamp is a week old. Future
/// timestamps read as "Hace un momento".
pub fn relative_time(ts: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let minutes = (*now - *ts).num_minutes();
    match minutes {
        m if m < 1 => "Hace un momento".to_string(),
        m if m < 60 => plural(m, "minuto", "minutos"),
        m if m < 1440 => plural(m / 60, "hora", "horas"),
        m if m < 10080 => plural(m / 1440, "día", "días"),
        _ => format_date(ts),
    }
}
