use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::model::{Model, UIData};
use crate::prefs::Theme;

pub const CMDLINE_HEIGH: usize = 1;
pub const STATUSLINE_HEIGHT: usize = 2;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const TABLE_BORDER: usize = 1;

const POPUP_WIDTH: u16 = 64;

struct Palette {
    base: Style,
    header: Style,
    selected_header: Style,
    cursor: Style,
    row_highlight: Style,
    status: Style,
    error: Style,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                base: Style::new().fg(Color::Gray).bg(Color::Black),
                header: Style::new().fg(Color::White).add_modifier(Modifier::BOLD),
                selected_header: Style::new().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
                cursor: Style::new().fg(Color::Black).bg(Color::Yellow),
                row_highlight: Style::new().bg(Color::DarkGray),
                status: Style::new().fg(Color::Cyan),
                error: Style::new().fg(Color::LightRed).add_modifier(Modifier::BOLD),
            },
            Theme::Light => Palette {
                base: Style::new().fg(Color::Black).bg(Color::White),
                header: Style::new().fg(Color::Black).add_modifier(Modifier::BOLD),
                selected_header: Style::new().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD),
                cursor: Style::new().fg(Color::White).bg(Color::Blue),
                row_highlight: Style::new().bg(Color::Gray),
                status: Style::new().fg(Color::Blue),
                error: Style::new().fg(Color::Red).add_modifier(Modifier::BOLD),
            },
        }
    }
}

#[derive(Default)]
pub struct TableUI {
    table_state: TableState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let ui = model.get_uidata();
        let palette = Palette::for_theme(ui.theme);
        let [table_area, status_area, cmd_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
            Constraint::Length(CMDLINE_HEIGH as u16),
        ])
        .areas(frame.area());

        self.draw_table(ui, &palette, table_area, frame);
        draw_statusline(ui, &palette, status_area, frame);
        draw_cmdline(ui, &palette, cmd_area, frame);
        if ui.show_popup {
            draw_popup(ui, &palette, frame);
        }
    }

    fn draw_table(&mut self, ui: &UIData, palette: &Palette, area: Rect, frame: &mut Frame) {
        let block = Block::bordered()
            .title(Line::from(format!(" {} ", ui.name)).bold())
            .title_bottom(Line::from(format!(" {} ", ui.last_updated)).right_aligned())
            .style(palette.base);

        if let Some(error) = &ui.error {
            let paragraph = Paragraph::new(error.as_str())
                .style(palette.error)
                .centered()
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(ui.header.iter().enumerate().map(|(c, label)| {
            let style = if c == ui.selected_column {
                palette.selected_header
            } else {
                palette.header
            };
            Cell::from(label.as_str()).style(style)
        }));
        let rows = ui.rows.iter().enumerate().map(|(r, cells)| {
            Row::new(cells.iter().enumerate().map(|(c, value)| {
                let cell = Cell::from(value.as_str());
                if r == ui.selected_row && c == ui.selected_column {
                    cell.style(palette.cursor)
                } else {
                    cell
                }
            }))
        });
        let widths = ui.widths.iter().map(|w| Constraint::Length(*w));
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .block(block)
            .row_highlight_style(palette.row_highlight);

        // rows are already windowed by the model
        *self.table_state.offset_mut() = 0;
        self.table_state
            .select((!ui.rows.is_empty()).then_some(ui.selected_row));
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }
}

fn draw_statusline(ui: &UIData, palette: &Palette, area: Rect, frame: &mut Frame) {
    let counts = Line::from(vec![
        Span::raw(ui.progress.total_line()),
        Span::raw("  "),
        Span::raw(ui.progress.showing_line()),
    ]);
    let mut second = Vec::new();
    if !ui.filters.is_empty() {
        second.push(Span::styled(ui.filters.clone(), palette.status));
        second.push(Span::raw("  "));
    }
    second.push(Span::raw(ui.status_message.clone()).italic());
    let paragraph = Paragraph::new(vec![counts, Line::from(second)]).style(palette.base);
    frame.render_widget(paragraph, area);
}

fn draw_cmdline(ui: &UIData, palette: &Palette, area: Rect, frame: &mut Frame) {
    match (ui.active_cmdinput, ui.cmd_mode) {
        (true, Some(mode)) => {
            let prompt = mode.prompt();
            let line = Line::from(vec![
                Span::styled(prompt, palette.header),
                Span::raw(ui.cmdinput.input.as_str()),
            ]);
            frame.render_widget(Paragraph::new(line).style(palette.base), area);
            let x = area.x + (prompt.chars().count() + ui.cmdinput.curser_pos) as u16;
            frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
        }
        _ => {
            let hint = Line::from(vec![
                " Search ".into(),
                "</>".blue().bold(),
                " Sort ".into(),
                "<s>".blue().bold(),
                " Help ".into(),
                "<?>".blue().bold(),
                " Quit ".into(),
                "<q> ".blue().bold(),
            ]);
            frame.render_widget(Paragraph::new(hint).style(palette.base), area);
        }
    }
}

fn draw_popup(ui: &UIData, palette: &Palette, frame: &mut Frame) {
    let lines = ui.popup_message.lines().count() as u16 + 2;
    let area = centered(frame.area(), POPUP_WIDTH, lines);
    let popup = Paragraph::new(ui.popup_message.as_str())
        .wrap(Wrap { trim: false })
        .block(Block::bordered().title(" Help ".bold()))
        .style(palette.base);
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, DatasetKind, Loaded};
    use crate::domain::{CatConfig, Message};
    use crate::prefs::MemoryPrefStore;
    use crate::record::{Field, Record};
    use crate::source::{LastUpdated, Source};
    use ratatui::{Terminal, backend::TestBackend};

    fn screen(model: &Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        let mut ui = TableUI::new();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn model(error: Option<String>) -> Model {
        let loaded = Loaded {
            dataset: Dataset::new(
                DatasetKind::Videos,
                vec![
                    Record::builder()
                        .text(Field::Title, "Intro to Nodes")
                        .text(Field::Channel, "Blender Guru")
                        .number(Field::Views, 1_234_567)
                        .build(),
                ],
            ),
            last_updated: LastUpdated::Unknown,
            error,
        };
        let config = CatConfig::new(Source::parse("videos.json"), DatasetKind::Videos);
        Model::init(&config, loaded, Box::new(MemoryPrefStore::default()), 100, 20)
    }

    #[test]
    fn draws_rows_and_counts() {
        let text = screen(&model(None));
        assert!(text.contains("Intro to Nodes"));
        assert!(text.contains("1,234,567"));
        assert!(text.contains("Total Rows: 1"));
        assert!(text.contains("Last Updated: unknown"));
    }

    #[test]
    fn draws_error_instead_of_table() {
        let text = screen(&model(Some("Could not load videos.json".into())));
        assert!(text.contains("Could not load videos.json"));
        assert!(text.contains("Showing 0 of 0"));
    }

    #[test]
    fn help_popup() {
        let mut m = model(None);
        m.update(Some(Message::Help)).unwrap();
        assert!(screen(&m).contains("first/last row"));
    }
}
