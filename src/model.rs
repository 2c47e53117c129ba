use std::time::Instant;

use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace, warn};

use crate::dataset::{Dataset, DatasetKind, Loaded};
use crate::domain::{CMDMode, CatConfig, CatError, HELP_TEXT, Message};
use crate::format::{display_text, visible_columns};
use crate::inputter::{InputResult, Inputter};
use crate::prefs::{PrefStore, Theme, UiPrefs};
use crate::record::{Field, Record};
use crate::render::{BatchQueue, IncrementalRenderer, Progress, RenderTarget};
use crate::search::SearchIndex;
use crate::source::LastUpdated;
use crate::ui::{CMDLINE_HEIGH, STATUSLINE_HEIGHT, TABLE_BORDER, TABLE_HEADER_HEIGHT};
use crate::view::ViewState;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaintedRow {
    pub idx: usize,
    pub cells: Vec<String>,
}

/// Terminal render target: the rows of the current pass as display strings.
#[derive(Debug, Default)]
pub struct PaintedRows {
    columns: Vec<Field>,
    rows: Vec<PaintedRow>,
    progress: Progress,
    error: Option<String>,
}

impl PaintedRows {
    pub fn new(columns: Vec<Field>) -> Self {
        PaintedRows {
            columns,
            ..PaintedRows::default()
        }
    }

    pub fn columns(&self) -> &[Field] {
        &self.columns
    }

    pub fn rows(&self) -> &[PaintedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn set_columns(&mut self, columns: Vec<Field>) {
        self.columns = columns;
    }
}

impl RenderTarget for PaintedRows {
    fn begin(&mut self, _dataset: &Dataset, matched: usize) {
        self.rows.clear();
        self.rows.reserve(matched);
        self.error = None;
    }

    fn paint_row(&mut self, dataset: &Dataset, idx: usize, record: &Record) {
        let kind = dataset.kind();
        let cells = self
            .columns
            .iter()
            .map(|f| display_text(kind, record, *f).replace('\n', " "))
            .collect();
        self.rows.push(PaintedRow { idx, cells });
    }

    fn progress(&mut self, progress: Progress) {
        self.progress = progress;
    }

    fn error_row(&mut self, message: &str) {
        self.rows.clear();
        self.error = Some(message.to_string());
    }
}

pub struct UIData {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub widths: Vec<u16>,
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub error: Option<String>,
    pub progress: Progress,
    pub last_updated: LastUpdated,
    pub filters: String,
    pub theme: Theme,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            header: Vec::new(),
            rows: Vec::new(),
            widths: Vec::new(),
            selected_row: 0,
            selected_column: 0,
            abs_selected_row: 0,
            error: None,
            progress: Progress::default(),
            last_updated: LastUpdated::Unknown,
            filters: String::new(),
            theme: Theme::Dark,
            show_popup: false,
            popup_message: String::new(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
            last_update: Instant::now(),
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let chrome = CMDLINE_HEIGH + STATUSLINE_HEIGHT + TABLE_HEADER_HEIGHT + 2 * TABLE_BORDER;
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_height: ui_height.saturating_sub(chrome).max(1),
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    config: CatConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    dataset: Dataset,
    index: SearchIndex,
    last_updated: LastUpdated,
    load_error: Option<String>,
    view: ViewState,
    saved_query: String,
    categories: Vec<String>,
    renderer: IncrementalRenderer,
    queue: BatchQueue,
    painted: PaintedRows,
    prefs: UiPrefs,
    store: Box<dyn PrefStore>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    curser_row: usize,
    curser_column: usize,
    offset_row: usize,
    uilayout: UILayout,
    uidata: UIData,
    status_message: String,
}

impl Model {
    pub fn init(
        config: &CatConfig,
        loaded: Loaded,
        mut store: Box<dyn PrefStore>,
        ui_width: usize,
        ui_height: usize,
    ) -> Self {
        let start_time = Instant::now();
        let prefs = UiPrefs::load(store.as_mut());
        let index = SearchIndex::build(&loaded.dataset, config.threshold());
        let categories = loaded.dataset.category_options();
        let kind = loaded.dataset.kind();
        info!(
            "Preparing {} records took {}ms ...",
            loaded.dataset.len(),
            start_time.elapsed().as_millis()
        );

        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            dataset: loaded.dataset,
            index,
            last_updated: loaded.last_updated,
            load_error: loaded.error,
            view: ViewState::default(),
            saved_query: String::new(),
            categories,
            renderer: IncrementalRenderer::new(config.batch_size),
            queue: BatchQueue::default(),
            painted: PaintedRows::new(visible_columns(kind, &prefs)),
            prefs,
            store,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            curser_row: 0,
            curser_column: 0,
            offset_row: 0,
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            status_message: "Press ? for help".to_string(),
        };
        model.refresh();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn painted(&self) -> &PaintedRows {
        &self.painted
    }

    pub fn prefs(&self) -> UiPrefs {
        self.prefs
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    /// Painting still has batches queued.
    pub fn is_rendering(&self) -> bool {
        !self.queue.is_idle()
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        trace!("Status: {}", self.status_message);
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.select_row(self.offset_row + self.curser_row);
    }

    /// `None` means the user is idle: paint the next pending batch.
    pub fn update(&mut self, message: Option<Message>) -> Result<(), CatError> {
        let Some(msg) = message else {
            self.tick();
            return Ok(());
        };

        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_selection_down(1),
                Message::MoveUp => self.move_selection_up(1),
                Message::MoveLeft => self.move_selection_left(),
                Message::MoveRight => self.move_selection_right(),
                Message::MovePageUp => self.move_selection_up(self.uilayout.table_height),
                Message::MovePageDown => self.move_selection_down(self.uilayout.table_height),
                Message::MoveBeginning => self.select_row(0),
                Message::MoveEnd => self.select_row(self.painted.len().saturating_sub(1)),
                Message::Search => self.enter_cmd_mode(CMDMode::Search),
                Message::MinViews => self.enter_cmd_mode(CMDMode::MinViews),
                Message::MinSecondary => self.enter_cmd_mode(CMDMode::MinSecondary),
                Message::CycleCategory => self.cycle_category(),
                Message::SortSelected => self.sort_selected_column(),
                Message::ToggleThumbs => {
                    self.prefs.show_thumbs = !self.prefs.show_thumbs;
                    self.apply_columns();
                }
                Message::ToggleLayout => {
                    self.prefs.layout = self.prefs.layout.toggled();
                    self.apply_columns();
                }
                Message::ToggleTheme => {
                    self.prefs.theme = self.prefs.theme.toggled();
                    self.save_prefs();
                }
                Message::Help => self.show_help(),
                Message::Exit => self.reset_filters(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::RawKey(_) => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::Exit | Message::Help => self.close_popup(),
                _ => (),
            },
            Modus::CMDINPUT => match msg {
                Message::RawKey(key) => self.raw_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
        }
        self.update_uidata();
        Ok(())
    }

    /// Paint one pending batch, if any.
    pub fn tick(&mut self) -> bool {
        let painted = self
            .queue
            .tick(&mut self.renderer, &self.dataset, &mut self.painted);
        if painted {
            self.update_uidata();
        }
        painted
    }

    /// Recompute the visible rows and start a new paint. The first batch is
    /// painted right away, the rest on idle ticks.
    fn refresh(&mut self) {
        self.curser_row = 0;
        self.offset_row = 0;
        if let Some(message) = &self.load_error {
            self.renderer
                .show_error(message, &self.dataset, &mut self.painted);
            self.queue = BatchQueue::default();
        } else {
            let start_time = Instant::now();
            let rows = self.view.active_rows(&self.dataset, &self.index);
            debug!(
                "Updating view took {}ms ({} rows)",
                start_time.elapsed().as_millis(),
                rows.len()
            );
            let ticket = self.renderer.restart(rows);
            self.queue.schedule(ticket);
            self.tick();
        }
        self.update_uidata();
    }

    fn kind(&self) -> DatasetKind {
        self.dataset.kind()
    }

    // -------------------- Control handling functions ---------------------- //

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.uidata.show_popup = false;
    }

    fn reset_filters(&mut self) {
        let cleared = ViewState {
            sort: self.view.sort,
            ..ViewState::default()
        };
        if cleared != self.view {
            self.view = cleared;
            self.set_status_message("Filters cleared");
            self.refresh();
        }
    }

    fn cycle_category(&mut self) {
        if self.categories.is_empty() {
            self.set_status_message("No categories for this dataset");
            return;
        }
        self.view.cycle_category(&self.categories);
        let label = self
            .view
            .category
            .clone()
            .unwrap_or_else(|| "all".to_string());
        self.set_status_message(format!("Category: {label}"));
        self.refresh();
    }

    fn sort_selected_column(&mut self) {
        let Some(field) = self.painted.columns().get(self.curser_column).copied() else {
            return;
        };
        self.view.toggle_sort(field);
        if let Some(sort) = self.view.sort {
            self.set_status_message(format!("Sorted by {} {}", field.label(), sort.direction.arrow()));
        }
        self.refresh();
    }

    fn apply_columns(&mut self) {
        let columns = visible_columns(self.kind(), &self.prefs);
        self.curser_column = self.curser_column.min(columns.len().saturating_sub(1));
        self.painted.set_columns(columns);
        self.save_prefs();
        self.refresh();
    }

    fn save_prefs(&mut self) {
        if let Err(e) = self.prefs.save(self.store.as_mut()) {
            warn!("Could not save preferences: {e}");
            self.set_status_message("Could not save preferences");
        }
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if !self.active_cmdinput {
            return;
        }
        self.last_input = self.input.read(key);
        if self.cmd_mode == Some(CMDMode::Search)
            && self.last_input.changed
            && !self.last_input.canceled
        {
            self.view.query = self.last_input.input.clone();
            self.refresh();
        }
        if self.last_input.finished {
            self.handle_cmd_input();
        }
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        let available = match mode {
            CMDMode::Search => true,
            CMDMode::MinViews => self.kind().views_field().is_some(),
            CMDMode::MinSecondary => self.kind().secondary_field().is_some(),
        };
        if !available {
            self.set_status_message("Not available for this dataset");
            return;
        }

        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);
        self.active_cmdinput = true;
        self.input.clear();
        match mode {
            CMDMode::Search => {
                self.saved_query = self.view.query.clone();
                self.input.set(&self.view.query);
            }
            CMDMode::MinViews if self.view.min_views > 0 => {
                self.input.set(&self.view.min_views.to_string())
            }
            CMDMode::MinSecondary if self.view.min_secondary > 0 => {
                self.input.set(&self.view.min_secondary.to_string())
            }
            _ => {}
        }
        self.last_input = self.input.get();
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {}", self.last_input.input);

        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;

        let cmd_input = self.last_input.input.clone();
        let canceled = self.last_input.canceled;
        match self.cmd_mode {
            Some(CMDMode::Search) => {
                if canceled && self.view.query != self.saved_query {
                    self.view.query = std::mem::take(&mut self.saved_query);
                    self.refresh();
                }
            }
            Some(CMDMode::MinViews) if !canceled => {
                self.view.min_views = parse_minimum(&cmd_input);
                self.refresh();
            }
            Some(CMDMode::MinSecondary) if !canceled => {
                self.view.min_secondary = parse_minimum(&cmd_input);
                self.refresh();
            }
            _ => {}
        }
        self.cmd_mode = None;
    }

    fn select_row(&mut self, row: usize) {
        let nrows = self.painted.len();
        let height = self.uilayout.table_height.max(1);
        let row = row.min(nrows.saturating_sub(1));
        if row < self.offset_row {
            self.offset_row = row;
        } else if row >= self.offset_row + height {
            self.offset_row = row + 1 - height;
        }
        self.curser_row = row - self.offset_row;
    }

    fn move_selection_up(&mut self, size: usize) {
        self.select_row((self.offset_row + self.curser_row).saturating_sub(size));
    }

    fn move_selection_down(&mut self, size: usize) {
        self.select_row(self.offset_row + self.curser_row + size);
    }

    fn move_selection_left(&mut self) {
        self.curser_column = self.curser_column.saturating_sub(1);
    }

    fn move_selection_right(&mut self) {
        if self.curser_column + 1 < self.painted.columns().len() {
            self.curser_column += 1;
        }
    }

    fn filters_line(&self) -> String {
        let kind = self.kind();
        let mut parts = Vec::new();
        if self.view.has_query() {
            parts.push(format!("search \"{}\"", self.view.query.trim()));
        }
        if let Some(field) = kind.views_field()
            && self.view.min_views > 0
        {
            parts.push(format!("{} >= {}", field.label(), self.view.min_views));
        }
        if let Some(field) = kind.secondary_field()
            && self.view.min_secondary > 0
        {
            parts.push(format!("{} >= {}", field.label(), self.view.min_secondary));
        }
        if let Some(category) = &self.view.category {
            parts.push(format!("category {category}"));
        }
        if let Some(sort) = self.view.sort {
            parts.push(format!("sort {} {}", sort.field.label(), sort.direction.arrow()));
        }
        parts.join(" | ")
    }

    fn update_uidata(&mut self) {
        let filters = self.filters_line();
        let columns = self.painted.columns();
        let rbegin = self.offset_row.min(self.painted.len());
        let rend = (rbegin + self.uilayout.table_height).min(self.painted.len());
        let window = &self.painted.rows()[rbegin..rend];

        let header: Vec<String> = columns
            .iter()
            .map(|f| match self.view.sort {
                Some(s) if s.field == *f => format!("{} {}", f.label(), s.direction.arrow()),
                _ => f.label().to_string(),
            })
            .collect();
        let widths: Vec<u16> = header
            .iter()
            .enumerate()
            .map(|(c, label)| {
                let widest = window
                    .iter()
                    .filter_map(|r| r.cells.get(c))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(label.chars().count());
                widest.min(self.config.max_column_width) as u16
            })
            .collect();

        let ui = &mut self.uidata;
        ui.name = format!("{} ({})", self.config.source.name(), kind_name(self.dataset.kind()));
        ui.rows = window.iter().map(|r| r.cells.clone()).collect();
        ui.header = header;
        ui.widths = widths;
        ui.selected_row = self.curser_row;
        ui.selected_column = self.curser_column;
        ui.abs_selected_row = self.offset_row + self.curser_row;
        ui.error = self.painted.error().map(str::to_string);
        ui.progress = self.painted.progress();
        ui.last_updated = self.last_updated;
        ui.theme = self.prefs.theme;
        ui.cmdinput = self.last_input.clone();
        ui.cmd_mode = self.cmd_mode;
        ui.active_cmdinput = self.active_cmdinput;
        ui.status_message = self.status_message.clone();
        ui.filters = filters;
        ui.last_update = Instant::now();
    }
}

fn kind_name(kind: DatasetKind) -> &'static str {
    match kind {
        DatasetKind::Channels => "channels",
        DatasetKind::Videos => "videos",
        DatasetKind::Artwork => "artwork",
    }
}

/// Leading digits of the input; anything else is 0.
fn parse_minimum(input: &str) -> i64 {
    let digits: String = input
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{Layout, MemoryPrefStore};
    use crate::source::Source;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn channel(name: &str, views: i64, kind: &str) -> Record {
        Record::builder()
            .text(Field::ChannelName, name)
            .number(Field::Views, views)
            .number(Field::Videos, 1)
            .text(Field::ChannelType, kind)
            .build()
    }

    fn loaded() -> Loaded {
        Loaded {
            dataset: Dataset::new(
                DatasetKind::Channels,
                vec![
                    channel("Blender Guru", 5_000, "Tutorials"),
                    channel("Cooking Daily", 800, "Food"),
                    channel("Octane Tips", 2_000, "Tutorials"),
                    channel("Paint Club", 1_500, "Art"),
                    channel("Sculpt Lab", 300, "Art"),
                ],
            ),
            last_updated: LastUpdated::Unknown,
            error: None,
        }
    }

    fn model_with(loaded: Loaded, batch_size: usize) -> Model {
        let config = CatConfig::new(Source::parse("channels.csv"), DatasetKind::Channels)
            .with_batch_size(batch_size);
        Model::init(&config, loaded, Box::new(MemoryPrefStore::default()), 120, 40)
    }

    fn send(model: &mut Model, msg: Message) {
        model.update(Some(msg)).unwrap();
    }

    fn key(model: &mut Model, code: KeyCode) {
        send(model, Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn drain(model: &mut Model) {
        while model.is_rendering() {
            model.update(None).unwrap();
        }
    }

    fn names(model: &Model) -> Vec<usize> {
        model.painted().rows().iter().map(|r| r.idx).collect()
    }

    #[test]
    fn idle_ticks_paint_remaining_batches() {
        let mut model = model_with(loaded(), 2);
        assert_eq!(model.painted().len(), 2);
        assert!(model.is_rendering());
        assert!(model.get_uidata().progress.showing_line().contains("rendering"));
        drain(&mut model);
        assert_eq!(names(&model), vec![0, 1, 2, 3, 4]);
        assert_eq!(model.get_uidata().progress.showing_line(), "Showing 5 of 5");
    }

    #[test]
    fn live_search_restarts_paint() {
        let mut model = model_with(loaded(), 2);
        send(&mut model, Message::Search);
        assert!(model.raw_keyevents());
        for c in "tutorials".chars() {
            key(&mut model, KeyCode::Char(c));
        }
        drain(&mut model);
        assert_eq!(names(&model), vec![0, 2]);

        // escape restores the query from before the prompt
        key(&mut model, KeyCode::Esc);
        assert!(!model.raw_keyevents());
        drain(&mut model);
        assert_eq!(model.view().query, "");
        assert_eq!(model.painted().len(), 5);
    }

    #[test]
    fn minimum_views_and_category() {
        let mut model = model_with(loaded(), 500);
        send(&mut model, Message::MinViews);
        for c in "1000".chars() {
            key(&mut model, KeyCode::Char(c));
        }
        key(&mut model, KeyCode::Enter);
        assert_eq!(names(&model), vec![0, 2, 3]);

        send(&mut model, Message::CycleCategory);
        assert_eq!(model.view().category.as_deref(), Some("Art"));
        assert_eq!(names(&model), vec![3]);

        send(&mut model, Message::Exit);
        assert_eq!(model.painted().len(), 5);
    }

    #[test]
    fn sort_follows_selected_column() {
        let mut model = model_with(loaded(), 500);
        // profile, name, subscribers, views
        for _ in 0..3 {
            send(&mut model, Message::MoveRight);
        }
        send(&mut model, Message::SortSelected);
        assert_eq!(names(&model), vec![4, 1, 3, 2, 0]);
        send(&mut model, Message::SortSelected);
        assert_eq!(names(&model), vec![0, 2, 3, 1, 4]);
        assert_eq!(model.get_uidata().header[3], "Views ↓");
    }

    #[test]
    fn toggles_change_columns_and_prefs() {
        let mut model = model_with(loaded(), 500);
        let before = model.painted().columns().len();
        send(&mut model, Message::ToggleThumbs);
        assert_eq!(model.painted().columns().len(), before - 1);
        send(&mut model, Message::ToggleLayout);
        assert_eq!(model.prefs().layout, Layout::Narrow);
        assert!(!model.painted().columns().contains(&Field::Description));
        send(&mut model, Message::ToggleTheme);
        assert_eq!(model.get_uidata().theme, Theme::Light);
    }

    #[test]
    fn load_error_shows_error_row() {
        let failed = Loaded {
            dataset: Dataset::empty(DatasetKind::Channels),
            last_updated: LastUpdated::Unknown,
            error: Some("Could not load channels.csv".into()),
        };
        let model = model_with(failed, 500);
        let ui = model.get_uidata();
        assert_eq!(ui.error.as_deref(), Some("Could not load channels.csv"));
        assert_eq!(ui.progress, Progress::default());
        assert!(ui.rows.is_empty());
    }

    #[test]
    fn selection_scrolls_window() {
        let config = CatConfig::new(Source::parse("c.csv"), DatasetKind::Channels);
        let mut model = Model::init(&config, loaded(), Box::new(MemoryPrefStore::default()), 80, 10);
        let height = model.uilayout.table_height;
        send(&mut model, Message::MoveEnd);
        assert_eq!(model.get_uidata().abs_selected_row, 4);
        assert!(model.get_uidata().rows.len() <= height);
        send(&mut model, Message::MoveBeginning);
        assert_eq!(model.get_uidata().abs_selected_row, 0);
    }

    #[test]
    fn minimum_parsing() {
        assert_eq!(parse_minimum(" 1500 "), 1500);
        assert_eq!(parse_minimum("12abc"), 12);
        assert_eq!(parse_minimum("abc"), 0);
        assert_eq!(parse_minimum(""), 0);
    }
}
