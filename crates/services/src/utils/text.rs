//! Text helpers for rendering complaints and comments.
//!
//! Lengths are counted in characters, not bytes.

use std::borrow::Cow;
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

pub use domains::is_valid_email;
use domains::validation::length_within;

const FALLBACK_COLOR: &str = "#64748b";

const PALETTE: [&str; 8] = [
    "#ef4444", "#f59e0b", "#10b981", "#3b82f6", "#8b5cf6", "#06b6d4", "#84cc16", "#f97316",
];

const STOP_WORDS: [&str; 29] = [
    "el", "la", "de", "que", "y", "a", "en", "un", "es", "se", "no", "te", "lo", "le", "da", "su",
    "por", "son", "con", "para", "al", "me", "una", "todo", "pero", "más", "hacer", "o", "puede",
];

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("static punctuation pattern compiles"));

/// Cuts `text` to `limit` characters, trims the cut and appends `suffix`.
pub fn truncate(text: &str, limit: usize, suffix: &str) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit).collect();
    format!("{}{suffix}", cut.trim())
}

/// Trims and collapses inner whitespace runs to a single space.
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spanish grouping: `.` for thousands (from five digits on), `,` for decimals.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let grouped = if int_part.len() > 4 {
        let digits: Vec<char> = int_part.chars().collect();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, d) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(*d);
        }
        out
    } else {
        int_part.to_string()
    };

    let sign = if value < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped},{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `999`, `1.2K`, `3.4M`.
pub fn format_likes(likes: u64) -> String {
    if likes < 1_000 {
        likes.to_string()
    } else if likes < 1_000_000 {
        format!("{:.1}K", likes as f64 / 1_000.0)
    } else {
        format!("{:.1}M", likes as f64 / 1_000_000.0)
    }
}

/// Up to two uppercase initials.
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Deterministic palette pick, stable across runs.
pub fn color_for_text(text: &str) -> &'static str {
    if text.is_empty() {
        return FALLBACK_COLOR;
    }
    let hash = text.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });
    PALETTE[hash.unsigned_abs() as usize % PALETTE.len()]
}

pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_safe(text)
}

/// Trimmed length within `min..=max`.
pub fn validate_length(text: &str, min: usize, max: usize) -> bool {
    length_within(text, min, max)
}

/// Distinct lowercase words longer than three characters, stop words
/// removed, in order of first appearance.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    let mut seen = HashSet::new();
    stripped
        .split_whitespace()
        .filter(|w| w.chars().count() > 3 && !STOP_WORDS.contains(w))
        .filter(|w| seen.insert(*w))
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Lowercase, accents folded, punctuation removed, trimmed.
pub fn normalize_for_search(text: &str) -> String {
    let folded: String = text.to_lowercase().chars().map(fold_accent).collect();
    PUNCTUATION.replace_all(&folded, "").trim().to_string()
}

/// Wraps every case-insensitive occurrence of `term` in `<mark>`.
pub fn highlight(text: &str, term: &str) -> String {
    if term.is_empty() {
        return text.to_string();
    }
    match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.replace_all(text, "<mark>$0</mark>").into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Black or white, whichever reads better on `hex` (`#rrggbb`).
pub fn contrast_color(hex: &str) -> &'static str {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .map(f64::from)
    };
    match (channel(1..3), channel(3..5), channel(5..7)) {
        (Some(r), Some(g), Some(b)) if (0.299 * r + 0.587 * g + 0.114 * b) / 255.0 > 0.5 => {
            "#000000"
        }
        _ => "#ffffff",
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[exponent])
}

/// Upload checks; an empty `allowed` list accepts any type.
pub fn validate_file(mime: &str, size: u64, allowed: &[&str], max_size: u64) -> Vec<String> {
    let mut errors = Vec::new();
    if !allowed.is_empty() && !allowed.contains(&mime) {
        errors.push("Tipo de archivo no permitido".to_string());
    }
    if size > max_size {
        errors.push(format!(
            "El archivo excede el tamaño máximo de {}",
            format_file_size(max_size)
        ));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation() {
        assert_eq!(truncate("corto", 10, "..."), "corto");
        assert_eq!(truncate("Semáforo dañado en la vía", 9, "..."), "Semáforo...");
    }

    #[test]
    fn cleaning_and_capitalization() {
        assert_eq!(clean("  hola \n  mundo  "), "hola mundo");
        assert_eq!(capitalize_first("sEMÁFORO"), "Semáforo");
        assert_eq!(capitalize_words("avenida central norte"), "Avenida Central Norte");
        assert_eq!(initials("vecino preocupado del barrio"), "VP");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn numbers() {
        assert_eq!(format_number(1234.0, 0), "1234");
        assert_eq!(format_number(12345.0, 0), "12.345");
        assert_eq!(format_number(1234567.891, 2), "1.234.567,89");
        assert_eq!(format_number(-12345.0, 0), "-12.345");
        assert_eq!(format_number(f64::NAN, 0), "0");
        assert_eq!(format_likes(999), "999");
        assert_eq!(format_likes(1_200), "1.2K");
        assert_eq!(format_likes(3_400_000), "3.4M");
    }

    #[test]
    fn colors() {
        assert_eq!(color_for_text(""), FALLBACK_COLOR);
        let color = color_for_text("vecino_preocupado");
        assert!(PALETTE.contains(&color));
        assert_eq!(color, color_for_text("vecino_preocupado"));
        assert_eq!(contrast_color("#ffffff"), "#000000");
        assert_eq!(contrast_color("#1e293b"), "#ffffff");
        assert_eq!(contrast_color("nope"), "#ffffff");
    }

    #[test]
    fn escaping_and_highlighting() {
        assert_eq!(
            escape_html("a < b & \"c\""),
            "a &lt; b &amp; &quot;c&quot;"
        );
        assert_eq!(
            highlight("El Parque y el parque", "parque"),
            "El <mark>Parque</mark> y el <mark>parque</mark>"
        );
        assert_eq!(highlight("precio (USD)", "(usd)"), "precio <mark>(USD)</mark>");
        assert_eq!(highlight("sin cambios", ""), "sin cambios");
    }

    #[test]
    fn keywords_and_search_normalization() {
        let keywords = extract_keywords(
            "El semáforo de la avenida no funciona; el semáforo parpadea.",
            3,
        );
        assert_eq!(keywords, ["semáforo", "avenida", "funciona"]);
        assert_eq!(normalize_for_search("  ¡Iluminación, Pública!  "), "iluminacion publica");
    }

    #[test]
    fn lengths_and_sizes() {
        assert!(validate_length("  hola  ", 1, 4));
        assert!(!validate_length("   ", 1, 10));
        assert!(validate_length("", 0, 10));
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(
            validate_file("image/gif", 6 * 1024 * 1024, &["image/png"], 5 * 1024 * 1024).len(),
            2
        );
    }
}
