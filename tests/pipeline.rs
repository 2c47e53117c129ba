use std::path::PathBuf;

use catview::dataset::{DatasetKind, Loaded, load, parse_dataset};
use catview::domain::CatConfig;
use catview::html::render_document;
use catview::prefs::UiPrefs;
use catview::record::Field;
use catview::render::{IncrementalRenderer, Progress, RenderTarget};
use catview::search::SearchIndex;
use catview::source::{LastUpdated, Source, SourceFormat};
use catview::view::{SortDirection, SortState, ViewState};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn config(name: &str, kind: DatasetKind) -> CatConfig {
    CatConfig::new(Source::parse(&fixture(name).to_string_lossy()), kind)
}

fn load_fixture(name: &str, kind: DatasetKind) -> Loaded {
    let loaded = load(&config(name, kind));
    assert_eq!(loaded.error, None, "loading {name}");
    loaded
}

#[test]
fn artwork_csv_end_to_end() {
    let body = "Title,Artist,Link,Image File\n\"Sunset\",\"Jane Doe\",\"https://example.com\",\"sunset.jpg\"\n";
    let ds = parse_dataset(DatasetKind::Artwork, SourceFormat::Csv, body, "artwork").unwrap();
    assert_eq!(ds.len(), 1);
    let art = &ds.records()[0];
    assert_eq!(art.text(Field::Title), "Sunset");
    assert_eq!(art.text(Field::Artist), "Jane Doe");
    assert_eq!(art.text(Field::Image), "artwork/sunset.jpg");
}

#[test]
fn local_channels_skip_blank_rows() {
    let loaded = load_fixture("channels.csv", DatasetKind::Channels);
    let ds = &loaded.dataset;
    assert_eq!(ds.len(), 3);
    assert!(matches!(loaded.last_updated, LastUpdated::Known(_)));

    let guru = &ds.records()[0];
    assert_eq!(guru.number(Field::Subscribers), 1_200_000);
    assert_eq!(guru.text(Field::Description), "Donuts & <3D>");
    assert_eq!(guru.text(Field::ProfileImage), "Profile_Images/guru.jpg");
    assert!(guru.date(Field::Created).is_some());
    assert!(ds.records()[2].date(Field::Created).is_none());
}

#[test]
fn videos_are_newest_first_with_durations() {
    let loaded = load_fixture("videos.json", DatasetKind::Videos);
    let titles: Vec<&str> = loaded
        .dataset
        .records()
        .iter()
        .map(|r| r.text(Field::Title))
        .collect();
    assert_eq!(titles, vec!["Intro to Nodes", "Quick Tip"]);
    assert_eq!(loaded.dataset.records()[0].seconds(Field::Duration), 3723);
    assert_eq!(loaded.dataset.records()[0].number(Field::Views), 12_345);
    assert_eq!(loaded.dataset.records()[1].seconds(Field::Duration), 245);
}

#[test]
fn gviz_artwork_restores_header_row() {
    let loaded = load_fixture("artwork_gviz.txt", DatasetKind::Artwork);
    let ds = &loaded.dataset;
    assert_eq!(ds.len(), 2);
    assert!(ds.records()[0].flag(Field::Featured));
    assert_eq!(ds.records()[1].text(Field::ArtworkType), "video");
    assert!(!ds.records()[1].text(Field::EmbedUrl).is_empty());
    assert_eq!(ds.type_counts(), (2, 1, 1));
}

#[test]
fn search_filter_and_sort_compose() {
    let loaded = load_fixture("channels.csv", DatasetKind::Channels);
    let index = SearchIndex::build(&loaded.dataset, DatasetKind::Channels.default_threshold());

    let mut view = ViewState {
        min_views: 100_000,
        sort: Some(SortState {
            field: Field::Views,
            direction: SortDirection::Asc,
        }),
        ..ViewState::default()
    };
    assert_eq!(view.active_rows(&loaded.dataset, &index), vec![1, 0]);

    view.query = "sculpt".into();
    assert_eq!(view.active_rows(&loaded.dataset, &index), vec![1]);
}

#[derive(Default)]
struct Counter {
    begins: usize,
    rows: Vec<usize>,
    last: Progress,
}

impl RenderTarget for Counter {
    fn begin(&mut self, _dataset: &catview::dataset::Dataset, _matched: usize) {
        self.begins += 1;
        self.rows.clear();
    }

    fn paint_row(
        &mut self,
        _dataset: &catview::dataset::Dataset,
        idx: usize,
        _record: &catview::record::Record,
    ) {
        self.rows.push(idx);
    }

    fn progress(&mut self, progress: Progress) {
        self.last = progress;
    }

    fn error_row(&mut self, _message: &str) {}
}

#[test]
fn incremental_paint_over_loaded_data() {
    let loaded = load_fixture("channels.csv", DatasetKind::Channels);
    let mut renderer = IncrementalRenderer::new(2);
    let mut target = Counter::default();
    let progress = renderer.run_to_completion(vec![2, 0, 1], &loaded.dataset, &mut target);
    assert_eq!(target.begins, 1);
    assert_eq!(target.rows, vec![2, 0, 1]);
    assert!(progress.is_complete());
    assert_eq!(target.last.to_string(), "Total Rows: 3 | Showing 3 of 3");
}

#[test]
fn html_document_for_channels() {
    let cfg = config("channels.csv", DatasetKind::Channels);
    let loaded = load(&cfg);
    let view = ViewState {
        query: "blender".into(),
        ..ViewState::default()
    };
    let html = render_document(&loaded, &view, UiPrefs::default(), &cfg);
    assert!(html.contains("Blender Guru"));
    assert!(!html.contains("Cooking Daily"));
    assert!(html.contains("Donuts &amp; &lt;3D&gt;"));
    assert!(html.contains("Total Rows: 3<br>Showing 1 of 1"));
}

#[test]
fn html_gallery_for_artwork() {
    let cfg = config("artwork.csv", DatasetKind::Artwork);
    let loaded = load(&cfg);
    let html = render_document(&loaded, &ViewState::default(), UiPrefs::default(), &cfg);
    assert!(html.contains("artwork/sunset.jpg"));
    assert!(!html.contains("notes.txt"));
}

#[test]
fn missing_file_renders_error_row() {
    let cfg = config("does-not-exist.csv", DatasetKind::Channels);
    let loaded = load(&cfg);
    assert!(loaded.dataset.is_empty());
    assert_eq!(loaded.last_updated, LastUpdated::Unknown);
    let message = loaded.error.clone().unwrap();
    assert_eq!(message, "Could not load data");

    let html = render_document(&loaded, &ViewState::default(), UiPrefs::default(), &cfg);
    assert!(html.contains("<td colspan=\"10\">Could not load data</td>"));
    assert!(html.contains("Total Rows: 0<br>Showing 0 of 0"));
}
