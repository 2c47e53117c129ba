use crate::dataset::DatasetKind;
use crate::dates::format_date;
use crate::prefs::UiPrefs;
use crate::record::{Field, FieldType, Record, Value, is_absolute_url};

const COMPACT_UNITS: &[(f64, &str)] = &[(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `1234` -> `1.2K`, `3_400_000` -> `3.4M`. At most one fraction digit.
pub fn format_compact(n: i64) -> String {
    let abs = n.unsigned_abs() as f64;
    let Some(mut unit) = COMPACT_UNITS.iter().rposition(|(scale, _)| abs >= *scale) else {
        return n.to_string();
    };
    let mut value = round_tenths(abs / COMPACT_UNITS[unit].0);
    // 999_950 rounds to 1000K, show it as 1M instead
    if value >= 1000.0 && unit + 1 < COMPACT_UNITS.len() {
        unit += 1;
        value = round_tenths(abs / COMPACT_UNITS[unit].0);
    }
    let sign = if n < 0 { "-" } else { "" };
    let suffix = COMPACT_UNITS[unit].1;
    if value.fract() == 0.0 {
        format!("{sign}{value:.0}{suffix}")
    } else {
        format!("{sign}{value:.1}{suffix}")
    }
}

/// Thousands grouped with commas: `1234567` -> `1,234,567`.
pub fn format_grouped(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Two-letter country code or `""`. `UK` is an alias for `GB`.
pub fn to_iso2(code: &str) -> String {
    let s = code.trim().to_ascii_uppercase();
    if s == "UK" {
        return "GB".to_string();
    }
    if s.len() == 2 && s.bytes().all(|b| b.is_ascii_uppercase()) {
        s
    } else {
        String::new()
    }
}

/// Regional indicator pair for an ISO-2 code.
pub fn flag_emoji(iso2: &str) -> String {
    const REGIONAL_A: u32 = 0x1F1E6;
    if iso2.len() != 2 {
        return String::new();
    }
    iso2.bytes()
        .filter_map(|b| char::from_u32(REGIONAL_A + u32::from(b.saturating_sub(b'A'))))
        .collect()
}

/// `US 🇺🇸` for known codes, the raw text otherwise.
pub fn country_label(raw: &str) -> String {
    let cc = to_iso2(raw);
    if cc.is_empty() {
        raw.trim().to_string()
    } else {
        format!("{cc} {}", flag_emoji(&cc))
    }
}

/// Only the `@handle` of a channel URL, else the path without the host.
pub fn custom_url_label(url: &str) -> String {
    let s = url.trim();
    if let Some(at) = s.find('@') {
        let handle: String = s[at + 1..]
            .chars()
            .take_while(|c| !matches!(c, '/' | '?' | '#'))
            .collect();
        if !handle.is_empty() {
            return format!("@{handle}");
        }
    }
    let lower = s.to_ascii_lowercase();
    let rest = [
        "https://www.youtube.com/",
        "http://www.youtube.com/",
        "https://youtube.com/",
        "http://youtube.com/",
    ]
    .iter()
    .find(|prefix| lower.starts_with(*prefix))
    .map(|prefix| &s[prefix.len()..])
    .unwrap_or(s);
    rest.trim_start_matches('/').to_string()
}

/// Link target for data taken from the sheet: only `http(s)` URLs, `#` for
/// anything else.
pub fn safe_href(url: &str) -> &str {
    let url = url.trim();
    if is_absolute_url(url) { url } else { "#" }
}

/// Where a channel name links to: its custom URL, else its channel page.
pub fn channel_href(record: &Record) -> String {
    let custom = record.text(Field::CustomUrl).trim();
    let id = record.text(Field::ChannelId).trim();
    if is_absolute_url(custom) {
        custom.to_string()
    } else if !id.is_empty() {
        format!("https://www.youtube.com/channel/{id}")
    } else {
        "#".to_string()
    }
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cell text as it is shown to the user, independent of the output target.
pub fn display_text(kind: DatasetKind, record: &Record, field: Field) -> String {
    match (field, record.get(field)) {
        (_, None) => String::new(),
        (Field::Country, Some(v)) => country_label(v.as_text()),
        (Field::CustomUrl, Some(v)) => custom_url_label(v.as_text()),
        (Field::Featured, Some(Value::Flag(true))) => "★".to_string(),
        (_, Some(Value::Number(n))) => match kind {
            DatasetKind::Channels => format_compact(*n),
            _ => format_grouped(*n),
        },
        (_, Some(Value::Date { at: Some(at), .. })) => format_date(at),
        (_, Some(_)) if field.field_type() == FieldType::Flag => String::new(),
        (_, Some(v)) => v.as_text().to_string(),
    }
}

/// Columns of `kind` that the current preferences leave visible.
pub fn visible_columns(kind: DatasetKind, prefs: &UiPrefs) -> Vec<Field> {
    kind.columns()
        .iter()
        .copied()
        .filter(|f| prefs.show_thumbs || *f != kind.image_field())
        .filter(|f| prefs.show_description() || *f != Field::Description)
        .collect()
}
