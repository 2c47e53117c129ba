use std::fmt::Write;

use crate::dataset::{Dataset, DatasetKind, Loaded};
use crate::domain::CatConfig;
use crate::format::{
    channel_href, custom_url_label, display_text, escape_html, safe_href, visible_columns,
};
use crate::prefs::{Layout, Theme, UiPrefs};
use crate::record::{Field, Record};
use crate::render::{IncrementalRenderer, Progress, RenderTarget};
use crate::search::SearchIndex;
use crate::source::LastUpdated;
use crate::view::{SortState, ViewState};

pub const DEFAULT_THUMBNAIL: &str = "thumbs/default.jpg";

const IMG_FALLBACK: &str =
    "if(this.dataset.fallback&&this.src!==this.dataset.fallback){this.src=this.dataset.fallback}";

/// Writes a standalone HTML document: a table for channels and videos, a
/// gallery of cards for artwork.
#[derive(Debug)]
pub struct HtmlTarget {
    kind: DatasetKind,
    prefs: UiPrefs,
    sort: Option<SortState>,
    last_updated: LastUpdated,
    columns: Vec<Field>,
    body: String,
    progress: Progress,
    type_counts: (usize, usize, usize),
}

impl HtmlTarget {
    pub fn new(kind: DatasetKind, prefs: UiPrefs) -> Self {
        HtmlTarget {
            kind,
            prefs,
            sort: None,
            last_updated: LastUpdated::Unknown,
            columns: visible_columns(kind, &prefs),
            body: String::new(),
            progress: Progress::default(),
            type_counts: (0, 0, 0),
        }
    }

    pub fn with_sort(mut self, sort: Option<SortState>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_last_updated(mut self, last_updated: LastUpdated) -> Self {
        self.last_updated = last_updated;
        self
    }

    fn is_gallery(&self) -> bool {
        self.kind == DatasetKind::Artwork
    }

    fn header_row(&self) -> String {
        let mut out = String::from("<tr id=\"header-row\">");
        for field in &self.columns {
            let arrow = match self.sort {
                Some(s) if s.field == *field => format!(" {}", s.direction.arrow()),
                _ => String::new(),
            };
            let _ = write!(
                out,
                "<th class=\"col-{key}\" data-key=\"{key}\">{}{arrow}</th>",
                escape_html(field.label()),
                key = field.key(),
            );
        }
        out.push_str("</tr>");
        out
    }

    fn image_cell(&self, src: &str, fallback: &str, alt: &str, field: Field) -> String {
        let src = if src.is_empty() { fallback } else { src };
        let fallback_attr = if fallback.is_empty() {
            String::new()
        } else {
            format!(
                " data-fallback=\"{}\" onerror=\"{IMG_FALLBACK}\"",
                escape_html(fallback)
            )
        };
        format!(
            "<td class=\"thumbnail-cell col-{}\"><img src=\"{}\" alt=\"{alt}\" loading=\"lazy\" referrerpolicy=\"no-referrer\"{fallback_attr}></td>",
            field.key(),
            escape_html(src),
        )
    }

    fn channel_cell(&self, record: &Record, field: Field) -> String {
        let key = field.key();
        match field {
            Field::ProfileImage => self.image_cell(
                record.text(Field::ProfileImage),
                record.text(Field::FallbackImageUrl),
                "Profile",
                field,
            ),
            Field::ChannelName => format!(
                "<td class=\"col-{key}\"><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></td>",
                escape_html(&channel_href(record)),
                escape_html(record.text(field)),
            ),
            Field::CustomUrl => {
                let url = record.text(field).trim();
                if url.is_empty() {
                    format!("<td class=\"col-{key}\"></td>")
                } else {
                    format!(
                        "<td class=\"col-{key}\"><a href=\"{}\" title=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></td>",
                        escape_html(safe_href(url)),
                        escape_html(url),
                        escape_html(&custom_url_label(url)),
                    )
                }
            }
            Field::Country => {
                let raw = record.text(field).trim();
                format!(
                    "<td class=\"col-{key}\" title=\"{}\">{}</td>",
                    escape_html(raw),
                    escape_html(&display_text(self.kind, record, field)),
                )
            }
            _ => format!(
                "<td class=\"col-{key}\">{}</td>",
                escape_html(&display_text(self.kind, record, field))
            ),
        }
    }

    fn video_cell(&self, record: &Record, field: Field) -> String {
        let key = field.key();
        match field {
            Field::Thumbnail => {
                let fallback = record.text(Field::FallbackThumbnail);
                let fallback = if fallback.is_empty() {
                    DEFAULT_THUMBNAIL
                } else {
                    fallback
                };
                self.image_cell(record.text(field), fallback, "Thumbnail", field)
            }
            Field::Url => {
                format!(
                    "<td class=\"col-{key}\"><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Watch</a></td>",
                    escape_html(safe_href(record.text(field)))
                )
            }
            _ => format!(
                "<td class=\"col-{key}\">{}</td>",
                escape_html(&display_text(self.kind, record, field))
            ),
        }
    }

    fn artwork_card(&self, record: &Record) -> String {
        let is_video = record.text(Field::ArtworkType) == "video";
        let featured = record.flag(Field::Featured);
        let title = record.text(Field::Title);

        let mut classes = String::from("card");
        if is_video {
            classes.push_str(" is-video");
        }
        if featured {
            classes.push_str(" is-featured");
        }
        let embed = if is_video {
            format!(
                " data-embed=\"{}\"",
                escape_html(record.text(Field::EmbedUrl))
            )
        } else {
            String::new()
        };

        let mut out = format!("<figure class=\"{classes}\"{embed}>");
        if self.prefs.show_thumbs {
            let _ = write!(
                out,
                "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                escape_html(record.text(Field::Image)),
                escape_html(title),
            );
        }
        let _ = write!(
            out,
            "<figcaption class=\"caption\"><span class=\"title\">{}</span>",
            escape_html(title)
        );
        let artist = record.text(Field::Artist);
        if !artist.is_empty() {
            let _ = write!(out, " <span class=\"artist\">| {}</span>", escape_html(artist));
        }
        let link = safe_href(record.text(Field::Link));
        if link != "#" {
            let _ = write!(
                out,
                " <span class=\"ext\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\" aria-label=\"External link\">↗</a></span>",
                escape_html(link)
            );
        }
        let _ = write!(
            out,
            " <span class=\"badge\">{}</span></figcaption>",
            if is_video { "Video" } else { "Image" }
        );
        if is_video {
            out.push_str("<span class=\"corner-icon video-icon\">▶<span class=\"sr-only\">Video</span></span>");
        }
        if featured {
            out.push_str("<span class=\"corner-icon star-icon\">★<span class=\"sr-only\">Featured</span></span>");
        }
        out.push_str("</figure>");
        out
    }

    fn body_classes(&self) -> String {
        let mut classes = Vec::new();
        if self.prefs.theme == Theme::Dark {
            classes.push("dark");
        }
        if self.prefs.layout == Layout::Narrow {
            classes.push("narrow-layout");
        }
        if !self.prefs.show_thumbs {
            classes.push("hide-thumbnails");
        }
        classes.join(" ")
    }

    /// The finished page.
    pub fn into_document(self) -> String {
        let title = page_title(self.kind);
        let mut out = String::new();
        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{title}</title>\n</head>\n<body class=\"{}\">\n<header>\n<h1>{title}</h1>\n\
             <p id=\"last-updated\">{}</p>\n<p id=\"video-count\">{}<br>{}</p>\n",
            self.body_classes(),
            escape_html(&self.last_updated.to_string()),
            escape_html(&self.progress.total_line()),
            escape_html(&self.progress.showing_line()),
        );
        if self.is_gallery() {
            let (all, images, videos) = self.type_counts;
            let _ = writeln!(
                out,
                "<p id=\"type-counts\">All <span id=\"total-all\">{all}</span> · Images <span id=\"total-images\">{images}</span> · Videos <span id=\"total-videos\">{videos}</span></p>"
            );
        }
        out.push_str("</header>\n<main>\n");

        if self.is_gallery() {
            if self.body.is_empty() {
                out.push_str("<p class=\"empty\">No items match this filter.</p>\n");
            } else {
                let _ = writeln!(out, "<div id=\"gallery\" class=\"gallery\">{}</div>", self.body);
            }
        } else {
            let _ = writeln!(
                out,
                "<table>\n<thead>{}</thead>\n<tbody id=\"table-body\">\n{}</tbody>\n</table>",
                self.header_row(),
                self.body
            );
        }
        out.push_str("</main>\n</body>\n</html>\n");
        out
    }
}

impl RenderTarget for HtmlTarget {
    fn begin(&mut self, dataset: &Dataset, _matched: usize) {
        self.body.clear();
        self.type_counts = dataset.type_counts();
    }

    fn paint_row(&mut self, _dataset: &Dataset, _idx: usize, record: &Record) {
        let row = match self.kind {
            DatasetKind::Artwork => self.artwork_card(record),
            DatasetKind::Channels => {
                let cells: String = self
                    .columns
                    .iter()
                    .map(|f| self.channel_cell(record, *f))
                    .collect();
                format!("<tr>{cells}</tr>")
            }
            DatasetKind::Videos => {
                let cells: String = self
                    .columns
                    .iter()
                    .map(|f| self.video_cell(record, *f))
                    .collect();
                format!("<tr>{cells}</tr>")
            }
        };
        self.body.push_str(&row);
        self.body.push('\n');
    }

    fn progress(&mut self, progress: Progress) {
        self.progress = progress;
    }

    fn error_row(&mut self, message: &str) {
        self.body = if self.is_gallery() {
            format!("<p class=\"error-row\">{}</p>", escape_html(message))
        } else {
            format!(
                "<tr class=\"error-row\"><td colspan=\"{}\">{}</td></tr>\n",
                self.columns.len().max(1),
                escape_html(message)
            )
        };
    }
}

pub fn page_title(kind: DatasetKind) -> &'static str {
    match kind {
        DatasetKind::Channels => "Channels",
        DatasetKind::Videos => "Videos",
        DatasetKind::Artwork => "Artwork",
    }
}

/// Run the whole pipeline once and return the page.
pub fn render_document(
    loaded: &Loaded,
    view: &ViewState,
    prefs: UiPrefs,
    config: &CatConfig,
) -> String {
    let dataset = &loaded.dataset;
    let mut target = HtmlTarget::new(dataset.kind(), prefs)
        .with_sort(view.sort)
        .with_last_updated(loaded.last_updated);
    let mut renderer = IncrementalRenderer::new(config.batch_size);

    match &loaded.error {
        Some(message) => renderer.show_error(message, dataset, &mut target),
        None => {
            let index = SearchIndex::build(dataset, config.threshold());
            renderer.run_to_completion(view.active_rows(dataset, &index), dataset, &mut target);
        }
    }
    target.into_document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_mdy_strict;
    use crate::view::SortDirection;

    fn channels() -> Dataset {
        Dataset::new(
            DatasetKind::Channels,
            vec![
                Record::builder()
                    .text(Field::ChannelName, "Tom & Jerry")
                    .text(Field::ChannelId, "UC42")
                    .number(Field::Views, 1_234_567)
                    .text(Field::Country, "uk")
                    .date(Field::Created, parse_mdy_strict("8/9/2025"), "8/9/2025")
                    .text(Field::Description, "cartoons")
                    .url(Field::ProfileImage, "Profile_Images/tj.png")
                    .url(Field::FallbackImageUrl, "https://cdn/tj.png")
                    .build(),
            ],
        )
    }

    #[test]
    fn channel_rows_are_escaped_and_formatted() {
        let ds = channels();
        let mut target = HtmlTarget::new(DatasetKind::Channels, UiPrefs::default()).with_sort(
            Some(SortState {
                field: Field::Views,
                direction: SortDirection::Desc,
            }),
        );
        IncrementalRenderer::default().run_to_completion(vec![0], &ds, &mut target);
        let html = target.into_document();

        assert!(html.contains("Tom &amp; Jerry"));
        assert!(html.contains("href=\"https://www.youtube.com/channel/UC42\""));
        assert!(html.contains(">1.2M<"));
        assert!(html.contains("GB 🇬🇧"));
        assert!(html.contains("09 Aug 2025"));
        assert!(html.contains("referrerpolicy=\"no-referrer\""));
        assert!(html.contains("data-fallback=\"https://cdn/tj.png\""));
        assert!(html.contains("Views ↓</th>"));
        assert!(html.contains("<body class=\"dark\">"));
        assert!(html.contains("Total Rows: 1<br>Showing 1 of 1"));
    }

    #[test]
    fn narrow_layout_hides_description() {
        let ds = channels();
        let prefs = UiPrefs {
            layout: Layout::Narrow,
            ..UiPrefs::default()
        };
        let mut target = HtmlTarget::new(DatasetKind::Channels, prefs);
        IncrementalRenderer::default().run_to_completion(vec![0], &ds, &mut target);
        let html = target.into_document();
        assert!(!html.contains("cartoons"));
        assert!(html.contains("narrow-layout"));
    }

    #[test]
    fn error_row_spans_table() {
        let ds = Dataset::empty(DatasetKind::Channels);
        let mut target = HtmlTarget::new(DatasetKind::Channels, UiPrefs::default());
        IncrementalRenderer::default().show_error("Could not load data", &ds, &mut target);
        let html = target.into_document();
        assert!(html.contains("<td colspan=\"10\">Could not load data</td>"));
        assert!(html.contains("Total Rows: 0<br>Showing 0 of 0"));
    }

    #[test]
    fn artwork_cards() {
        let ds = Dataset::new(
            DatasetKind::Artwork,
            vec![
                Record::builder()
                    .text(Field::Title, "Sunset")
                    .text(Field::Artist, "Jane Doe")
                    .url(Field::Image, "artwork/sunset.jpg")
                    .text(Field::ArtworkType, "image")
                    .flag(Field::Featured, true)
                    .build(),
                Record::builder()
                    .text(Field::Title, "Clip")
                    .text(Field::ArtworkType, "video")
                    .url(Field::EmbedUrl, "https://www.youtube.com/embed/abc?autoplay=1&rel=0")
                    .build(),
            ],
        );
        let mut target = HtmlTarget::new(DatasetKind::Artwork, UiPrefs::default());
        IncrementalRenderer::default().run_to_completion(vec![0, 1], &ds, &mut target);
        let html = target.into_document();

        assert!(html.contains("<figure class=\"card is-featured\">"));
        assert!(html.contains("<span class=\"artist\">| Jane Doe</span>"));
        assert!(html.contains("data-embed=\"https://www.youtube.com/embed/abc?autoplay=1&amp;rel=0\""));
        assert!(html.contains("<span id=\"total-images\">1</span>"));
        assert!(html.contains("<span id=\"total-videos\">1</span>"));
    }

    #[test]
    fn script_urls_never_become_links() {
        let channels = Dataset::new(
            DatasetKind::Channels,
            vec![
                Record::builder()
                    .text(Field::ChannelName, "Sneaky")
                    .url(Field::CustomUrl, "javascript:alert(1)")
                    .build(),
            ],
        );
        let mut target = HtmlTarget::new(DatasetKind::Channels, UiPrefs::default());
        IncrementalRenderer::default().run_to_completion(vec![0], &channels, &mut target);
        let html = target.into_document();
        assert!(!html.contains("href=\"javascript:"));
        assert!(html.contains("<a href=\"#\" title=\"javascript:alert(1)\""));

        let videos = Dataset::new(
            DatasetKind::Videos,
            vec![
                Record::builder()
                    .text(Field::Title, "Clip")
                    .url(Field::Url, "javascript:alert(1)")
                    .build(),
            ],
        );
        let mut target = HtmlTarget::new(DatasetKind::Videos, UiPrefs::default());
        IncrementalRenderer::default().run_to_completion(vec![0], &videos, &mut target);
        let html = target.into_document();
        assert!(!html.contains("href=\"javascript:"));
        assert!(html.contains("<a href=\"#\" target=\"_blank\" rel=\"noopener noreferrer\">Watch</a>"));

        let artwork = Dataset::new(
            DatasetKind::Artwork,
            vec![
                Record::builder()
                    .text(Field::Title, "Sunset")
                    .url(Field::Link, "javascript:alert(1)")
                    .url(Field::Image, "artwork/sunset.jpg")
                    .text(Field::ArtworkType, "image")
                    .build(),
            ],
        );
        let mut target = HtmlTarget::new(DatasetKind::Artwork, UiPrefs::default());
        IncrementalRenderer::default().run_to_completion(vec![0], &artwork, &mut target);
        let html = target.into_document();
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("class=\"ext\""));
    }

    #[test]
    fn empty_gallery_message() {
        let ds = Dataset::empty(DatasetKind::Artwork);
        let mut target = HtmlTarget::new(DatasetKind::Artwork, UiPrefs::default());
        IncrementalRenderer::default().run_to_completion(Vec::new(), &ds, &mut target);
        assert!(target.into_document().contains("No items match this filter."));
    }
}
