use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde_json::Value as Json;
use tracing::{debug, error, info, warn};
use tracing_error::SpanTrace;

use crate::dates::{duration_to_seconds, parse_date, parse_date_loose};
use crate::domain::{CatConfig, CatError};
use crate::headers::{ARTWORK_SYNONYMS, CHANNEL_SYNONYMS, HeaderMap};
use crate::record::{
    Field, Record, compare_field, encode_path, has_image_ext, is_absolute_url, resolve_asset,
    to_embed_url, to_number,
};
use crate::source::{LastUpdated, SourceFormat, fetch, fetch_commit_date};
use crate::tabular::{is_blank_row, parse_csv, parse_gviz};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DatasetKind {
    Channels,
    Videos,
    Artwork,
}

const CHANNEL_COLUMNS: &[Field] = &[
    Field::ProfileImage,
    Field::ChannelName,
    Field::Subscribers,
    Field::Views,
    Field::Videos,
    Field::ChannelType,
    Field::Country,
    Field::Created,
    Field::Description,
    Field::CustomUrl,
];

const VIDEO_COLUMNS: &[Field] = &[
    Field::Thumbnail,
    Field::Title,
    Field::Channel,
    Field::Views,
    Field::Duration,
    Field::UploadDate,
    Field::Url,
];

const ARTWORK_COLUMNS: &[Field] = &[
    Field::Image,
    Field::Title,
    Field::Artist,
    Field::Link,
    Field::ArtworkType,
    Field::Featured,
];

impl DatasetKind {
    pub fn default_threshold(&self) -> f64 {
        match self {
            DatasetKind::Channels => 0.32,
            DatasetKind::Videos | DatasetKind::Artwork => 0.3,
        }
    }

    /// Directory bare image filenames are resolved against.
    pub fn asset_dir(&self) -> &'static str {
        match self {
            DatasetKind::Channels => "Profile_Images",
            DatasetKind::Videos => "thumbs",
            DatasetKind::Artwork => "artwork",
        }
    }

    pub fn primary_field(&self) -> Field {
        match self {
            DatasetKind::Channels => Field::ChannelName,
            DatasetKind::Videos | DatasetKind::Artwork => Field::Title,
        }
    }

    /// Display order of the table columns.
    pub fn columns(&self) -> &'static [Field] {
        match self {
            DatasetKind::Channels => CHANNEL_COLUMNS,
            DatasetKind::Videos => VIDEO_COLUMNS,
            DatasetKind::Artwork => ARTWORK_COLUMNS,
        }
    }

    pub fn image_field(&self) -> Field {
        match self {
            DatasetKind::Channels => Field::ProfileImage,
            DatasetKind::Videos => Field::Thumbnail,
            DatasetKind::Artwork => Field::Image,
        }
    }

    pub fn search_fields(&self) -> &'static [Field] {
        match self {
            DatasetKind::Channels => &[
                Field::ChannelName,
                Field::Description,
                Field::ChannelType,
                Field::CustomUrl,
            ],
            DatasetKind::Videos => &[Field::Title, Field::Channel, Field::UploadDate],
            DatasetKind::Artwork => &[Field::Title, Field::Artist, Field::Link],
        }
    }

    pub fn views_field(&self) -> Option<Field> {
        match self {
            DatasetKind::Channels | DatasetKind::Videos => Some(Field::Views),
            DatasetKind::Artwork => None,
        }
    }

    /// Second minimum threshold: video count for channels, duration for videos.
    pub fn secondary_field(&self) -> Option<Field> {
        match self {
            DatasetKind::Channels => Some(Field::Videos),
            DatasetKind::Videos => Some(Field::Duration),
            DatasetKind::Artwork => None,
        }
    }

    pub fn category_field(&self) -> Option<Field> {
        match self {
            DatasetKind::Channels => Some(Field::ChannelType),
            DatasetKind::Artwork => Some(Field::ArtworkType),
            DatasetKind::Videos => None,
        }
    }

    fn synonyms(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            DatasetKind::Channels => CHANNEL_SYNONYMS,
            DatasetKind::Artwork => ARTWORK_SYNONYMS,
            DatasetKind::Videos => &[],
        }
    }

    fn header_looks_ok(&self, map: &HeaderMap) -> bool {
        match self {
            DatasetKind::Channels => map.contains("channel_name"),
            DatasetKind::Artwork => ["title", "artist", "link", "image"]
                .iter()
                .all(|k| map.contains(k)),
            DatasetKind::Videos => map.contains("title"),
        }
    }
}

/// The loaded snapshot. Cheap to clone, never mutated after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    kind: DatasetKind,
    records: Arc<Vec<Record>>,
}

impl Dataset {
    pub fn new(kind: DatasetKind, records: Vec<Record>) -> Self {
        Dataset {
            kind,
            records: Arc::new(records),
        }
    }

    pub fn empty(kind: DatasetKind) -> Self {
        Dataset::new(kind, Vec::new())
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&Record> {
        self.records.get(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-empty categories, sorted. Artwork adds the `featured`
    /// pseudo category when any record is featured.
    pub fn category_options(&self) -> Vec<String> {
        let Some(field) = self.kind.category_field() else {
            return Vec::new();
        };
        let mut options: BTreeSet<String> = self
            .records
            .iter()
            .map(|r| r.text(field).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.kind == DatasetKind::Artwork && self.records.iter().any(|r| r.flag(Field::Featured))
        {
            options.insert(FEATURED_CATEGORY.to_string());
        }
        options.into_iter().collect()
    }

    /// Counts per artwork type: (all, images, videos).
    pub fn type_counts(&self) -> (usize, usize, usize) {
        let videos = self
            .records
            .iter()
            .filter(|r| r.text(Field::ArtworkType) == "video")
            .count();
        let images = self
            .records
            .iter()
            .filter(|r| r.text(Field::ArtworkType) == "image")
            .count();
        (self.len(), images, videos)
    }
}

pub const FEATURED_CATEGORY: &str = "featured";

/// Shown in place of the rows when the source could not be loaded.
pub const LOAD_ERROR: &str = "Could not load data";

/// Turn raw text into a dataset of the given kind.
pub fn parse_dataset(
    kind: DatasetKind,
    format: SourceFormat,
    body: &str,
    asset_dir: &str,
) -> Result<Dataset, CatError> {
    let start_time = Instant::now();
    let records = match (kind, format) {
        (DatasetKind::Videos, SourceFormat::Json) => build_videos(body, asset_dir)?,
        (DatasetKind::Channels | DatasetKind::Artwork, SourceFormat::Csv) => {
            build_from_rows(kind, parse_csv(body), asset_dir)
        }
        (DatasetKind::Channels | DatasetKind::Artwork, SourceFormat::Gviz) => {
            let table = parse_gviz(body)?;
            let mut rows = table.rows;
            let first_is_header = rows
                .first()
                .map(|r| kind.header_looks_ok(&HeaderMap::from_headers(r, kind.synonyms())))
                .unwrap_or(false);
            if !first_is_header {
                rows.insert(0, table.labels);
            }
            build_from_rows(kind, rows, asset_dir)
        }
        _ => return Err(CatError::UnknownFormat),
    };
    info!(
        "Building {} {:?} records took {}ms ...",
        records.len(),
        kind,
        start_time.elapsed().as_millis()
    );
    Ok(Dataset::new(kind, records))
}

/// Header row first, then data rows. Blank rows never produce a record.
pub fn build_from_rows(kind: DatasetKind, rows: Vec<Vec<String>>, asset_dir: &str) -> Vec<Record> {
    let mut rows = rows.into_iter();
    let Some(headers) = rows.next() else {
        return Vec::new();
    };
    let map = HeaderMap::from_headers(&headers, kind.synonyms());
    let data: Vec<Vec<String>> = rows.filter(|r| !is_blank_row(r)).collect();

    let records: Vec<Record> = data
        .par_iter()
        .filter_map(|row| match kind {
            DatasetKind::Channels => build_channel(&map, row, asset_dir),
            DatasetKind::Artwork => build_artwork(&map, row, asset_dir),
            DatasetKind::Videos => None,
        })
        .collect();
    debug!("Kept {} of {} data rows", records.len(), data.len());
    records
}

fn build_channel(map: &HeaderMap, row: &[String], asset_dir: &str) -> Option<Record> {
    let name = map.get(row, "channel_name");
    if name.trim().is_empty() {
        return None;
    }
    let created_raw = map.get(row, "created");
    Some(
        Record::builder()
            .text(Field::ChannelName, name)
            .text(Field::ChannelId, map.get(row, "channel_id").trim())
            .url(Field::CustomUrl, map.get(row, "custom_url").trim())
            .number(Field::Subscribers, to_number(map.get(row, "subscribers")))
            .number(Field::Views, to_number(map.get(row, "views")))
            .number(Field::Videos, to_number(map.get(row, "videos")))
            .text(Field::ChannelType, map.get(row, "channel_type"))
            .text(Field::Country, map.get(row, "country"))
            .date(Field::Created, parse_date(created_raw), created_raw)
            .text(Field::Description, map.get(row, "description"))
            .url(
                Field::ProfileImage,
                resolve_asset(map.get(row, "profile_image"), asset_dir),
            )
            .url(
                Field::FallbackImageUrl,
                map.get(row, "fallback_image_url").trim(),
            )
            .build(),
    )
}

fn build_artwork(map: &HeaderMap, row: &[String], asset_dir: &str) -> Option<Record> {
    let name = map.get(row, "image").trim();
    let is_video = map.get(row, "type").trim().eq_ignore_ascii_case("video");
    let video_url = map.get(row, "video").trim();
    let embed = to_embed_url(video_url);

    if is_video && embed.is_none() {
        return None;
    }
    if !is_video && (name.is_empty() || !has_image_ext(name)) {
        return None;
    }

    let src = if name.is_empty() || is_absolute_url(name) {
        name.to_string()
    } else {
        resolve_asset(&encode_path(name), asset_dir)
    };
    let title = map.get(row, "title").trim();
    let title = if !title.is_empty() {
        title
    } else if !name.is_empty() {
        name
    } else {
        "Video"
    };

    Some(
        Record::builder()
            .text(Field::Title, title)
            .text(Field::Artist, map.get(row, "artist").trim())
            .url(Field::Link, map.get(row, "link").trim())
            .url(Field::Image, src)
            .text(Field::ArtworkType, if is_video { "video" } else { "image" })
            .url(Field::VideoUrl, video_url)
            .url(Field::EmbedUrl, embed.unwrap_or_default())
            .flag(
                Field::Featured,
                map.get(row, "featured").trim().eq_ignore_ascii_case("yes"),
            )
            .build(),
    )
}

fn json_text(obj: &serde_json::Map<String, Json>, key: &str) -> String {
    match obj.get(key) {
        Some(Json::String(s)) => s.trim().to_string(),
        Some(Json::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn json_number(obj: &serde_json::Map<String, Json>, key: &str) -> i64 {
    match obj.get(key) {
        Some(Json::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Json::String(s)) => to_number(s),
        _ => 0,
    }
}

/// Videos arrive as a JSON array of loosely typed objects. Newest first.
pub fn build_videos(body: &str, asset_dir: &str) -> Result<Vec<Record>, CatError> {
    let items: Vec<Json> = serde_json::from_str(body)?;
    let mut records: Vec<Record> = items
        .par_iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let title = json_text(obj, "title");
            if title.is_empty() {
                return None;
            }
            let duration = json_text(obj, "duration");
            let uploaded = json_text(obj, "upload_date");
            Some(
                Record::builder()
                    .text(Field::Title, title)
                    .text(Field::Channel, json_text(obj, "channel"))
                    .url(
                        Field::Thumbnail,
                        resolve_asset(&json_text(obj, "thumbnail"), asset_dir),
                    )
                    .url(
                        Field::FallbackThumbnail,
                        resolve_asset(&json_text(obj, "fallback_thumbnail"), asset_dir),
                    )
                    .duration(Field::Duration, duration_to_seconds(&duration), duration)
                    .date(Field::UploadDate, parse_date_loose(&uploaded), uploaded)
                    .number(Field::Views, json_number(obj, "views"))
                    .url(Field::Url, json_text(obj, "url"))
                    .build(),
            )
        })
        .collect();
    records.sort_by(|a, b| compare_field(Field::UploadDate, b, a));
    Ok(records)
}

/// Result of the one-shot load. Never an error: failures leave an empty
/// dataset and a message for the error row.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: Dataset,
    pub last_updated: LastUpdated,
    pub error: Option<String>,
}

pub fn load(config: &CatConfig) -> Loaded {
    let commit_date = config
        .commits_url
        .as_deref()
        .map(fetch_commit_date)
        .unwrap_or_default();

    let result = fetch(&config.source).and_then(|fetched| {
        let format = config
            .format
            .unwrap_or_else(|| SourceFormat::detect(&fetched.body));
        debug!("Parsing {} as {:?}", config.source.name(), format);
        let dataset = parse_dataset(config.kind, format, &fetched.body, config.asset_dir())?;
        Ok((dataset, fetched.last_updated))
    });
    if let Err(e) = &result {
        error!("Failed to load {}: {e}", config.source.name());
        debug!("{}", SpanTrace::capture());
    }
    settle(config.kind, result, commit_date)
}

/// The commit history date wins over the source's own timestamp, and is kept
/// even when the data itself could not be loaded.
fn settle(
    kind: DatasetKind,
    result: Result<(Dataset, LastUpdated), CatError>,
    commit_date: LastUpdated,
) -> Loaded {
    match result {
        Ok((dataset, last_updated)) => Loaded {
            dataset,
            last_updated: commit_date.or(last_updated),
            error: None,
        },
        Err(_) => {
            if commit_date == LastUpdated::Unknown {
                warn!("Last updated time is unknown");
            }
            Loaded {
                dataset: Dataset::empty(kind),
                last_updated: commit_date,
                error: Some(LOAD_ERROR.to_string()),
            }
        }
    }
}
