use std::collections::HashMap;

use tracing::{debug, trace};

/// Synonyms shared by the channel exports. Keys are normalized headers.
pub const CHANNEL_SYNONYMS: &[(&str, &str)] = &[
    ("channelname", "channel_name"),
    ("channelid", "channel_id"),
    ("customurl", "custom_url"),
    ("customurl.", "custom_url"),
    ("subscribers", "subscribers"),
    ("views", "views"),
    ("videos", "videos"),
    ("channeltype", "channel_type"),
    ("country", "country"),
    ("created", "created"),
    ("description", "description"),
    ("descroption", "description"),
    ("profileimage", "profile_image"),
    ("fallbackimageurl", "fallback_image_url"),
];

pub const ARTWORK_SYNONYMS: &[(&str, &str)] = &[
    ("title", "title"),
    ("artist", "artist"),
    ("artists", "artist"),
    ("aritsts", "artist"),
    ("link", "link"),
    ("imagefile", "image"),
    ("image", "image"),
    ("artworktype", "type"),
    ("type", "type"),
    ("videourl", "video"),
    ("video", "video"),
    ("featured", "featured"),
];

/// Lower-case a raw header and drop all whitespace and underscores.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical field key to column index for one parsed header row.
#[derive(Debug, Default, Clone)]
pub struct HeaderMap {
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn from_headers(headers: &[String], synonyms: &[(&str, &str)]) -> Self {
        let mut columns = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let norm = normalize_header(header);
            let key = synonyms
                .iter()
                .find(|(from, _)| *from == norm)
                .map(|(_, to)| to.to_string())
                .unwrap_or(norm);
            trace!("Header {idx} \"{header}\" => {key}");
            // Later duplicates win.
            columns.insert(key, idx);
        }
        debug!("Mapped {} header columns", columns.len());
        HeaderMap { columns }
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.columns.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    /// Raw cell for `key`; unmapped keys and short rows give `""`.
    pub fn get<'a>(&self, row: &'a [String], key: &str) -> &'a str {
        self.index_of(key)
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }
}
