use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use url::Url;

/// Canonical field names shared by every dataset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    // channels
    ChannelName,
    ChannelId,
    CustomUrl,
    Subscribers,
    Views,
    Videos,
    ChannelType,
    Country,
    Created,
    Description,
    ProfileImage,
    FallbackImageUrl,
    // videos
    Title,
    Channel,
    Thumbnail,
    FallbackThumbnail,
    Duration,
    UploadDate,
    Url,
    // artwork
    Artist,
    Link,
    Image,
    ArtworkType,
    VideoUrl,
    EmbedUrl,
    Featured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Number,
    Date,
    Duration,
    Url,
    Flag,
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Field::ChannelName => "channel_name",
            Field::ChannelId => "channel_id",
            Field::CustomUrl => "custom_url",
            Field::Subscribers => "subscribers",
            Field::Views => "views",
            Field::Videos => "videos",
            Field::ChannelType => "channel_type",
            Field::Country => "country",
            Field::Created => "created",
            Field::Description => "description",
            Field::ProfileImage => "profile_image",
            Field::FallbackImageUrl => "fallback_image_url",
            Field::Title => "title",
            Field::Channel => "channel",
            Field::Thumbnail => "thumbnail",
            Field::FallbackThumbnail => "fallback_thumbnail",
            Field::Duration => "duration",
            Field::UploadDate => "upload_date",
            Field::Url => "url",
            Field::Artist => "artist",
            Field::Link => "link",
            Field::Image => "image",
            Field::ArtworkType => "type",
            Field::VideoUrl => "video",
            Field::EmbedUrl => "embed_url",
            Field::Featured => "featured",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::ChannelName => "Channel Name",
            Field::ChannelId => "Channel Id",
            Field::CustomUrl => "Visit Channel",
            Field::Subscribers => "Subscribers",
            Field::Views => "Views",
            Field::Videos => "Videos",
            Field::ChannelType => "Channel Type",
            Field::Country => "Country",
            Field::Created => "Created",
            Field::Description => "Description",
            Field::ProfileImage => "Profile",
            Field::FallbackImageUrl => "Fallback Image",
            Field::Title => "Title",
            Field::Channel => "Channel",
            Field::Thumbnail => "Thumbnail",
            Field::FallbackThumbnail => "Fallback Thumbnail",
            Field::Duration => "Duration",
            Field::UploadDate => "Upload Date",
            Field::Url => "Watch",
            Field::Artist => "Artist",
            Field::Link => "Link",
            Field::Image => "Image",
            Field::ArtworkType => "Type",
            Field::VideoUrl => "Video",
            Field::EmbedUrl => "Embed",
            Field::Featured => "Featured",
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Field::Subscribers | Field::Views | Field::Videos => FieldType::Number,
            Field::Created | Field::UploadDate => FieldType::Date,
            Field::Duration => FieldType::Duration,
            Field::CustomUrl
            | Field::ProfileImage
            | Field::FallbackImageUrl
            | Field::Thumbnail
            | Field::FallbackThumbnail
            | Field::Url
            | Field::Link
            | Field::Image
            | Field::VideoUrl
            | Field::EmbedUrl => FieldType::Url,
            Field::Featured => FieldType::Flag,
            _ => FieldType::Text,
        }
    }
}

/// A typed cell. Dates and durations keep the raw text for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(i64),
    Date {
        at: Option<NaiveDateTime>,
        raw: String,
    },
    Duration {
        seconds: u64,
        raw: String,
    },
    Url(String),
    Flag(bool),
}

impl Value {
    /// Key used for ordering. Absent dates sort as the epoch.
    fn sort_key(&self) -> SortKey<'_> {
        match self {
            Value::Text(s) => SortKey::Text(s.to_lowercase()),
            Value::Number(n) => SortKey::Int(*n),
            Value::Date { at, .. } => {
                SortKey::Int(at.map(|d| d.and_utc().timestamp_millis()).unwrap_or(0))
            }
            Value::Duration { seconds, .. } => SortKey::Int(*seconds as i64),
            Value::Url(s) => SortKey::Raw(s),
            Value::Flag(b) => SortKey::Int(*b as i64),
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Value::Text(s) | Value::Url(s) => s,
            Value::Date { raw, .. } | Value::Duration { raw, .. } => raw,
            Value::Number(_) | Value::Flag(_) => "",
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey<'a> {
    Int(i64),
    Text(String),
    Raw(&'a str),
}

fn field_key(field: Field, value: Option<&Value>) -> SortKey<'_> {
    match value {
        Some(v) => v.sort_key(),
        None => match field.field_type() {
            FieldType::Text => SortKey::Text(String::new()),
            FieldType::Url => SortKey::Raw(""),
            _ => SortKey::Int(0),
        },
    }
}

/// Type-aware ordering of two records on one field. Missing cells compare
/// as the type's zero value.
pub fn compare_field(field: Field, a: &Record, b: &Record) -> Ordering {
    field_key(field, a.get(field)).cmp(&field_key(field, b.get(field)))
}

/// One normalized row. Built once, never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<Field, Value>,
}

impl Record {
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values.get(&field)
    }

    /// Text view of any field; numbers and flags render as `""`.
    pub fn text(&self, field: Field) -> &str {
        self.get(field).map(Value::as_text).unwrap_or("")
    }

    pub fn number(&self, field: Field) -> i64 {
        match self.get(field) {
            Some(Value::Number(n)) => *n,
            Some(Value::Duration { seconds, .. }) => *seconds as i64,
            _ => 0,
        }
    }

    pub fn date(&self, field: Field) -> Option<NaiveDateTime> {
        match self.get(field) {
            Some(Value::Date { at, .. }) => *at,
            _ => None,
        }
    }

    pub fn seconds(&self, field: Field) -> u64 {
        match self.get(field) {
            Some(Value::Duration { seconds, .. }) => *seconds,
            _ => 0,
        }
    }

    pub fn flag(&self, field: Field) -> bool {
        matches!(self.get(field), Some(Value::Flag(true)))
    }
}

#[derive(Debug, Default)]
pub struct RecordBuilder {
    values: BTreeMap<Field, Value>,
}

impl RecordBuilder {
    pub fn text(mut self, field: Field, value: impl Into<String>) -> Self {
        self.values.insert(field, Value::Text(value.into()));
        self
    }

    pub fn number(mut self, field: Field, value: i64) -> Self {
        self.values.insert(field, Value::Number(value));
        self
    }

    pub fn date(mut self, field: Field, at: Option<NaiveDateTime>, raw: impl Into<String>) -> Self {
        self.values.insert(
            field,
            Value::Date {
                at,
                raw: raw.into(),
            },
        );
        self
    }

    pub fn duration(mut self, field: Field, seconds: u64, raw: impl Into<String>) -> Self {
        self.values.insert(
            field,
            Value::Duration {
                seconds,
                raw: raw.into(),
            },
        );
        self
    }

    pub fn url(mut self, field: Field, value: impl Into<String>) -> Self {
        self.values.insert(field, Value::Url(value.into()));
        self
    }

    pub fn flag(mut self, field: Field, value: bool) -> Self {
        self.values.insert(field, Value::Flag(value));
        self
    }

    pub fn build(self) -> Record {
        Record {
            values: self.values,
        }
    }
}

/// Strip thousands separators and whitespace, then parse. Anything
/// unparseable is 0.
pub fn to_number(value: &str) -> i64 {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return 0;
    }
    if let Ok(n) = cleaned.parse::<i64>() {
        return n;
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() => f.trunc() as i64,
        _ => 0,
    }
}

pub fn is_absolute_url(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Bare filenames resolve against `asset_dir`. Absolute URLs and paths that
/// already name a directory pass through.
pub fn resolve_asset(value: &str, asset_dir: &str) -> String {
    let s = value.trim();
    if s.is_empty() {
        return String::new();
    }
    if is_absolute_url(s) || s.contains('/') {
        return s.to_string();
    }
    format!("{}/{}", asset_dir.trim_end_matches('/'), s)
}

/// Percent-encode a path the way browsers encode a URI component, keeping `/`.
pub fn encode_path(value: &str) -> String {
    const KEEP: &[u8] = b"-_.!~*'()/";
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || KEEP.contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

pub const IMAGE_EXTS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".avif"];

pub fn has_image_ext(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTS.iter().any(|ext| lower.ends_with(ext))
}

/// Convert a YouTube or Vimeo page URL into an autoplaying embed URL.
pub fn to_embed_url(value: &str) -> Option<String> {
    let url = Url::parse(value.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let path = url.path();

    match host {
        "youtu.be" => {
            let id = path.trim_start_matches('/');
            (!id.is_empty()).then(|| youtube_embed(id))
        }
        "youtube.com" | "m.youtube.com" => {
            if path.starts_with("/watch") {
                url.query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.to_string())
                    .filter(|v| !v.is_empty())
                    .map(|id| youtube_embed(&id))
            } else if let Some(rest) = path.strip_prefix("/shorts/") {
                let id = rest.split('/').next().unwrap_or("");
                (!id.is_empty()).then(|| youtube_embed(id))
            } else if path.starts_with("/embed/") {
                Some(format!(
                    "{}{}?autoplay=1&rel=0",
                    url.origin().ascii_serialization(),
                    path
                ))
            } else {
                None
            }
        }
        "vimeo.com" | "player.vimeo.com" => {
            let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
            let id = if host == "vimeo.com" {
                parts.first().copied()
            } else if parts.first() == Some(&"video") {
                parts.get(1).copied()
            } else {
                None
            };
            id.map(|id| {
                format!("https://player.vimeo.com/video/{id}?autoplay=1&title=0&byline=0&portrait=0")
            })
        }
        _ => None,
    }
}

fn youtube_embed(id: &str) -> String {
    format!("https://www.youtube.com/embed/{id}?autoplay=1&rel=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_mdy_strict;

    #[test]
    fn numbers_strip_separators() {
        assert_eq!(to_number("1,234,567"), 1_234_567);
        assert_eq!(to_number(" 12 345 "), 12_345);
        assert_eq!(to_number("12.9"), 12);
        assert_eq!(to_number("n/a"), 0);
        assert_eq!(to_number(""), 0);
        assert_eq!(to_number("1.2K"), 0);
    }

    #[test]
    fn assets_resolve_against_directory() {
        assert_eq!(resolve_asset("sunset.jpg", "artwork"), "artwork/sunset.jpg");
        assert_eq!(resolve_asset("a.png", "Profile_Images/"), "Profile_Images/a.png");
        assert_eq!(
            resolve_asset("HTTPS://cdn.example.com/a.png", "artwork"),
            "HTTPS://cdn.example.com/a.png"
        );
        assert_eq!(resolve_asset("  ", "artwork"), "");
        assert_eq!(resolve_asset("thumbs/abc.jpg", "thumbs"), "thumbs/abc.jpg");
        assert_eq!(resolve_asset("/static/a.png", "artwork"), "/static/a.png");
    }

    #[test]
    fn paths_are_percent_encoded() {
        assert_eq!(encode_path("my art/sun set.jpg"), "my%20art/sun%20set.jpg");
        assert_eq!(encode_path("a&b.png"), "a%26b.png");
    }

    #[test]
    fn image_extensions() {
        assert!(has_image_ext("Sunset.JPG"));
        assert!(has_image_ext("x.avif"));
        assert!(!has_image_ext("notes.txt"));
    }

    #[test]
    fn embed_urls() {
        let yt = "https://www.youtube.com/embed/abc123?autoplay=1&rel=0";
        assert_eq!(to_embed_url("https://youtu.be/abc123").as_deref(), Some(yt));
        assert_eq!(
            to_embed_url("https://www.youtube.com/watch?v=abc123&t=10").as_deref(),
            Some(yt)
        );
        assert_eq!(
            to_embed_url("https://m.youtube.com/shorts/abc123").as_deref(),
            Some(yt)
        );
        assert_eq!(
            to_embed_url("https://vimeo.com/76979871").as_deref(),
            Some("https://player.vimeo.com/video/76979871?autoplay=1&title=0&byline=0&portrait=0")
        );
        assert_eq!(
            to_embed_url("https://player.vimeo.com/video/42").as_deref(),
            Some("https://player.vimeo.com/video/42?autoplay=1&title=0&byline=0&portrait=0")
        );
        assert_eq!(to_embed_url("https://example.com/watch?v=1"), None);
        assert_eq!(to_embed_url("https://youtube.com/watch"), None);
        assert_eq!(to_embed_url("not a url"), None);
    }

    #[test]
    fn fields_compare_by_type() {
        let small = Record::builder().number(Field::Views, 9).text(Field::Title, "apple").build();
        let big = Record::builder().number(Field::Views, 10).text(Field::Title, "Banana").build();
        assert_eq!(compare_field(Field::Views, &small, &big), Ordering::Less);
        assert_eq!(compare_field(Field::Title, &small, &big), Ordering::Less);

        let dated = Record::builder()
            .date(Field::Created, parse_mdy_strict("1/1/2020"), "1/1/2020")
            .build();
        let undated = Record::builder().date(Field::Created, None, "whenever").build();
        let missing = Record::default();
        assert_eq!(compare_field(Field::Created, &undated, &dated), Ordering::Less);
        assert_eq!(compare_field(Field::Created, &missing, &undated), Ordering::Equal);
        assert_eq!(compare_field(Field::Views, &missing, &small), Ordering::Less);
    }

    #[test]
    fn record_accessors_default() {
        let r = Record::builder()
            .text(Field::Title, "Sunset")
            .number(Field::Views, 5)
            .build();
        assert_eq!(r.text(Field::Title), "Sunset");
        assert_eq!(r.text(Field::Artist), "");
        assert_eq!(r.number(Field::Views), 5);
        assert_eq!(r.number(Field::Videos), 0);
        assert_eq!(r.date(Field::Created), None);
        assert!(!r.flag(Field::Featured));
    }
}
