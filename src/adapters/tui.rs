//! Interactive terminal dashboard.
//!
//! The sidebar holds the filters (day, regions, auto refresh); the main area
//! shows whatever [`Panel`] the last fetch produced. Fetching is awaited
//! inline: the busy panel is drawn, the request completes, then input is
//! read again. Keys pressed meanwhile are handled afterwards.

use crate::config::Settings;
use crate::core::dashboard::{Dashboard, Panel, BUSY_MESSAGE, SUCCESS_MESSAGE};
use crate::core::render::{self, MeetingCard, RUNNER_COLUMNS};
use crate::domain::model::{Day, RaceQuery, RacecardsView};
use crate::domain::ports::RacecardSource;
use crate::utils::error::Result;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap};
use ratatui::{DefaultTerminal, Frame};

const HINT: &str = "Tip: Use the sidebar to adjust day/regions.";
const KEY_HELP: &str = "↑↓ move  space toggle  f fetch  PgUp/PgDn scroll  q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Fetch,
    Quit,
}

/// 介面狀態：目前的篩選與結果
#[derive(Debug)]
pub struct App {
    pub day: Day,
    pub region_options: Vec<String>,
    /// 依勾選順序排列，送出時原樣使用
    pub selected: Vec<String>,
    pub auto_refresh: bool,
    pub focus: usize,
    pub panel: Panel,
    pub scroll: u16,
}

impl App {
    pub fn new(settings: &Settings) -> Self {
        Self {
            day: settings.day,
            region_options: settings.region_options.clone(),
            selected: settings.regions.clone(),
            auto_refresh: settings.auto_refresh,
            focus: 0,
            panel: Panel::Idle,
            scroll: 0,
        }
    }

    /// 觸發時把目前的篩選複製成不可變的查詢
    pub fn query(&self) -> RaceQuery {
        RaceQuery::new(self.day, self.selected.clone())
    }

    // 0 = day, 1..=n = regions, n+1 = auto refresh
    fn focus_count(&self) -> usize {
        self.region_options.len() + 2
    }

    fn auto_refresh_index(&self) -> usize {
        self.region_options.len() + 1
    }

    fn toggle_region(&mut self, region: &str) {
        if let Some(pos) = self.selected.iter().position(|r| r == region) {
            self.selected.remove(pos);
        } else {
            self.selected.push(region.to_string());
        }
    }

    /// 改變目前焦點所在的篩選，回傳是否需要自動抓取
    fn change_focused(&mut self) -> Action {
        if self.focus == 0 {
            self.day = self.day.toggled();
        } else if self.focus == self.auto_refresh_index() {
            self.auto_refresh = !self.auto_refresh;
        } else {
            let region = self.region_options[self.focus - 1].clone();
            self.toggle_region(&region);
        }

        if self.auto_refresh {
            Action::Fetch
        } else {
            Action::None
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('f') | KeyCode::Char('r') => Action::Fetch,
            KeyCode::Up => {
                self.focus = (self.focus + self.focus_count() - 1) % self.focus_count();
                Action::None
            }
            KeyCode::Down => {
                self.focus = (self.focus + 1) % self.focus_count();
                Action::None
            }
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Left | KeyCode::Right => {
                self.change_focused()
            }
            KeyCode::PageDown | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                Action::None
            }
            KeyCode::PageUp | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                Action::None
            }
            KeyCode::Home => {
                self.scroll = 0;
                Action::None
            }
            _ => Action::None,
        }
    }
}

pub async fn run<S: RacecardSource>(dashboard: &Dashboard<S>, settings: &Settings) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, dashboard, App::new(settings)).await;
    ratatui::restore();
    result
}

async fn event_loop<S: RacecardSource>(
    terminal: &mut DefaultTerminal,
    dashboard: &Dashboard<S>,
    mut app: App,
) -> Result<()> {
    if app.auto_refresh {
        fetch(terminal, dashboard, &mut app).await?;
    }

    loop {
        terminal.draw(|frame| draw(frame, &app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.on_key(key) {
                Action::Quit => return Ok(()),
                Action::Fetch => fetch(terminal, dashboard, &mut app).await?,
                Action::None => {}
            }
        }
    }
}

async fn fetch<S: RacecardSource>(
    terminal: &mut DefaultTerminal,
    dashboard: &Dashboard<S>,
    app: &mut App,
) -> Result<()> {
    let query = app.query();
    app.panel = Panel::Busy;
    app.scroll = 0;
    terminal.draw(|frame| draw(frame, app))?;

    app.panel = dashboard.refresh(&query).await;
    Ok(())
}

pub fn draw(frame: &mut Frame, app: &App) {
    let [title_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new("🏇 Racecards: Britain & Ireland")
            .style(Style::default().add_modifier(Modifier::BOLD)),
        title_area,
    );

    let [sidebar_area, main_area] =
        Layout::horizontal([Constraint::Length(28), Constraint::Min(20)]).areas(body_area);
    draw_sidebar(frame, sidebar_area, app);
    draw_main(frame, main_area, app);

    let last = match &app.panel {
        Panel::Ready { fetched_at, .. } => format!("Last fetch: {}", fetched_at.format("%H:%M:%S")),
        _ => "Last fetch: -".to_string(),
    };
    frame.render_widget(
        Paragraph::new(format!("{} | {}", last, KEY_HELP))
            .style(Style::default().fg(Color::DarkGray)),
        footer_area,
    );
}

fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let focused = Style::default().add_modifier(Modifier::REVERSED);
    let style_for = |index: usize| {
        if app.focus == index {
            focused
        } else {
            Style::default()
        }
    };

    let mut lines = vec![
        Line::styled(format!("Day: < {} >", app.day), style_for(0)),
        Line::from(""),
        Line::from("Regions:"),
    ];
    for (i, region) in app.region_options.iter().enumerate() {
        let mark = if app.selected.contains(region) { "x" } else { " " };
        lines.push(Line::styled(format!("  [{}] {}", mark, region), style_for(i + 1)));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        format!(
            "Auto refresh: {}",
            if app.auto_refresh { "on" } else { "off" }
        ),
        style_for(app.auto_refresh_index()),
    ));
    lines.push(Line::from(""));
    lines.push(Line::styled(
        format!("day={} regions={}", app.day, app.selected.join(",")),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Filters")),
        area,
    );
}

fn draw_main(frame: &mut Frame, area: Rect, app: &App) {
    let [action_area, status_area, content_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                " f: Fetch racecards ",
                Style::default().fg(Color::Black).bg(Color::Red),
            ),
            Span::raw("  "),
            Span::styled(HINT, Style::default().fg(Color::DarkGray)),
        ])),
        action_area,
    );

    let error = Style::default().fg(Color::Red);
    let warning = Style::default().fg(Color::Yellow);
    match &app.panel {
        Panel::Idle => frame.render_widget(
            Paragraph::new("Press f to fetch racecards."),
            status_area,
        ),
        Panel::Busy => frame.render_widget(
            Paragraph::new(format!("⏳ {}", BUSY_MESSAGE)).style(warning),
            status_area,
        ),
        Panel::Warning(message) => frame.render_widget(
            Paragraph::new(format!("⚠ {}", message))
                .style(warning)
                .wrap(Wrap { trim: false }),
            status_area.union(content_area),
        ),
        Panel::HttpFailure { message, body } => {
            frame.render_widget(Paragraph::new(message.as_str()).style(error), status_area);
            frame.render_widget(
                Paragraph::new(body.to_display())
                    .scroll((app.scroll, 0))
                    .block(Block::default().borders(Borders::ALL).title("Response body")),
                content_area,
            );
        }
        Panel::NetworkFailure(message) | Panel::Failure(message) => frame.render_widget(
            Paragraph::new(message.as_str())
                .style(error)
                .wrap(Wrap { trim: false }),
            status_area.union(content_area),
        ),
        Panel::Ready { view, .. } => {
            frame.render_widget(
                Paragraph::new(SUCCESS_MESSAGE).style(Style::default().fg(Color::Green)),
                status_area,
            );
            draw_view(frame, content_area, view, app.scroll);
        }
    }
}

fn draw_view(frame: &mut Frame, area: Rect, view: &RacecardsView, scroll: u16) {
    match view {
        RacecardsView::Empty(reason) => frame.render_widget(
            Paragraph::new(render::empty_message(*reason)).style(Style::default().fg(Color::Cyan)),
            area,
        ),
        RacecardsView::Raw(value) => frame.render_widget(
            Paragraph::new(render::pretty_json(value))
                .scroll((scroll, 0))
                .block(Block::default().borders(Borders::ALL).title("Raw response")),
            area,
        ),
        RacecardsView::Cards(meetings) => {
            let [heading_area, grid_area] =
                Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
            frame.render_widget(
                Paragraph::new(render::results_heading(meetings.len()))
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                heading_area,
            );
            draw_grid(frame, grid_area, &render::cards(meetings), scroll as usize);
        }
    }
}

fn card_height(card: &MeetingCard) -> u16 {
    let text = card.race_name.iter().count() + card.captions.len();
    let table = if card.runners.is_empty() {
        0
    } else {
        card.runners.len() + 1
    };
    (2 + text + table).max(3) as u16
}

/// 兩欄排列，以終端機行數為單位捲動整個卡片區。
///
/// 每一列卡片先畫進自己的暫存 buffer，再把落在可視範圍內的行複製到畫面，
/// 所以比畫面還高的卡片也能捲到最後一位出賽馬。
fn draw_grid(frame: &mut Frame, area: Rect, cards: &[MeetingCard], scroll: usize) {
    let heights: Vec<u16> = cards
        .chunks(2)
        .map(|pair| pair.iter().map(card_height).max().unwrap_or(3))
        .collect();
    let total: usize = heights.iter().map(|h| *h as usize).sum();
    let scroll = scroll.min(total.saturating_sub(area.height as usize));
    let visible = scroll..scroll + area.height as usize;

    let mut top = 0usize;
    for (pair, height) in cards.chunks(2).zip(heights) {
        let bottom = top + height as usize;
        if top >= visible.end {
            break;
        }
        if bottom > visible.start {
            let row_area = Rect::new(0, 0, area.width, height);
            let mut row = Buffer::empty(row_area);
            let columns = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(row_area);
            for (card, column) in pair.iter().zip(columns.iter()) {
                draw_card(&mut row, *column, card);
            }
            copy_visible_lines(frame.buffer_mut(), area, &row, top, &visible);
        }
        top = bottom;
    }
}

/// 把 row（位於整個卡片區第 top 行）中可見的行複製到畫面
fn copy_visible_lines(
    screen: &mut Buffer,
    area: Rect,
    row: &Buffer,
    top: usize,
    visible: &std::ops::Range<usize>,
) {
    for line in 0..row.area.height {
        let grid_y = top + line as usize;
        if !visible.contains(&grid_y) {
            continue;
        }
        let y = area.y + (grid_y - visible.start) as u16;
        for x in 0..area.width.min(row.area.width) {
            screen[(area.x + x, y)] = row[(x, line)].clone();
        }
    }
}

fn draw_card(buf: &mut Buffer, area: Rect, card: &MeetingCard) {
    let mut title = vec![Span::styled(
        card.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(region) = &card.region {
        title.push(Span::raw(" "));
        title.push(Span::styled(
            format!(" {} ", region),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
    }

    let block = Block::default().borders(Borders::ALL).title(Line::from(title));
    let inner = block.inner(area);
    Widget::render(block, area, buf);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(race_name) = &card.race_name {
        lines.push(Line::from(race_name.as_str()));
    }
    let caption = Style::default().fg(Color::DarkGray);
    for line in &card.captions {
        lines.push(Line::styled(line.as_str(), caption));
    }

    let [text_area, table_area] =
        Layout::vertical([Constraint::Length(lines.len() as u16), Constraint::Min(0)])
            .areas(inner);
    Widget::render(Paragraph::new(lines), text_area, buf);

    if card.runners.is_empty() {
        return;
    }

    let widths: Vec<Constraint> = RUNNER_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let widest = card
                .runners
                .iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count());
            Constraint::Length(widest as u16)
        })
        .collect();

    let header = Row::new(RUNNER_COLUMNS).style(Style::default().add_modifier(Modifier::BOLD));
    let rows = card
        .runners
        .iter()
        .map(|row| Row::new(row.iter().map(|cell| Cell::from(cell.as_str()))));
    Widget::render(
        Table::new(rows, widths).header(header).column_spacing(1),
        table_area,
        buf,
    );
}
