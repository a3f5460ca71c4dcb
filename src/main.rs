use std::io;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::warn;

use race_standings::config::Config;
use race_standings::feed::{self, FeedSource};
use race_standings::logging;
use race_standings::parse::Field;
use race_standings::render::{PlanEntry, PlanRow};
use race_standings::state::{apply_delta, AppState, Delta, ProviderCommand};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    source: FeedSource,
    poll_interval: Duration,
    last_fetch: Option<Instant>,
}

impl App {
    fn new(config: &Config, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            source: config.source.clone(),
            poll_interval: config.poll_interval,
            last_fetch: None,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                self.state.click_header(idx);
            }
            KeyCode::Char('0') => self.state.click_header(9),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('r') => self.request_fetch(true),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        match mouse.kind {
            // The help overlay covers the table header.
            MouseEventKind::Down(MouseButton::Left) if self.state.help_overlay => {}
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(idx) = header_hit(area, mouse.column, mouse.row) {
                    self.state.click_header(idx);
                }
            }
            MouseEventKind::ScrollDown => self.state.scroll_down(),
            MouseEventKind::ScrollUp => self.state.scroll_up(),
            _ => {}
        }
    }

    fn request_fetch(&mut self, announce: bool) {
        self.last_fetch = Some(Instant::now());
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Feed fetch unavailable");
            }
            return;
        };
        let cmd = self.state.tick();
        if tx.send(cmd).is_err() {
            warn!("provider channel closed, feed request dropped");
        } else if announce {
            self.state.push_log("[INFO] Feed refresh requested");
        }
    }

    fn maybe_refresh(&mut self) {
        let due = self
            .last_fetch
            .map(|t| t.elapsed() >= self.poll_interval)
            .unwrap_or(true);
        if due {
            self.request_fetch(false);
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    let log_error = config
        .log_file
        .as_deref()
        .and_then(|path| logging::init_file(path).err());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(config.source.clone(), config.request_timeout, tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx));
    if let Some(err) = log_error {
        app.state.push_log(format!("[WARN] Logging disabled: {err:#}"));
    }
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_refresh();

        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    app.on_mouse(mouse, size);
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

struct Regions {
    header: Rect,
    columns: Rect,
    body: Rect,
    console: Rect,
    footer: Rect,
}

fn regions(area: Rect) -> Regions {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(area);
    Regions {
        header: chunks[0],
        columns: chunks[1],
        body: chunks[2],
        console: chunks[3],
        footer: chunks[4],
    }
}

fn table_columns() -> [Constraint; 10] {
    [
        Constraint::Min(16),
        Constraint::Length(12),
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(7),
    ]
}

fn column_cells(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(table_columns())
        .split(area)
}

fn header_hit(area: Rect, x: u16, y: u16) -> Option<usize> {
    let columns = regions(area).columns;
    if y != columns.y {
        return None;
    }
    column_cells(columns)
        .iter()
        .position(|cell| x >= cell.x && x < cell.x + cell.width)
}

fn ui(frame: &mut Frame, app: &App) {
    let regions = regions(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, regions.header);

    render_column_header(frame, regions.columns, &app.state);
    render_body(frame, regions.body, &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, regions.console);

    let footer = Paragraph::new(
        "click header / 1-9,0 Sort | j/k/↑/↓ Scroll | r Refresh | ? Help | q Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, regions.footer);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let state = &app.state;
    let line1 = format!(
        "  RACE STANDINGS | Sort: {} | Source: {}",
        state.sort.label(),
        app.source.describe()
    );
    let updated = state
        .updated_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "waiting for feed".to_string());
    let rows = state.snapshot.as_ref().map(|s| s.len()).unwrap_or(0);
    let feed_no = state
        .applied_seq
        .map(|seq| format!("#{seq}"))
        .unwrap_or_else(|| "-".to_string());
    let line2 = format!("  Updated {updated} | Cars {rows} | Feed {feed_no}");
    format!("{line1}\n{line2}")
}

fn render_column_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let cells = column_cells(area);
    let sorted = state.sort.field();
    for (field, cell) in Field::ALL.iter().zip(cells.iter()) {
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        let mut title = field.header().to_string();
        if sorted == Some(*field) {
            title.push(if state.sort.ascending { '▲' } else { '▼' });
            style = style.fg(Color::Cyan);
        }
        frame.render_widget(Paragraph::new(title).style(style), *cell);
    }
}

fn render_body(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.plan.is_empty() {
        let text = if state.snapshot.is_some() {
            "No cars on track"
        } else {
            "Waiting for standings feed..."
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let start = state.scroll as usize;
    for (i, entry) in state
        .plan
        .entries
        .iter()
        .skip(start)
        .take(area.height as usize)
        .enumerate()
    {
        let line = Rect {
            x: area.x,
            y: area.y + i as u16,
            width: area.width,
            height: 1,
        };
        match entry {
            PlanEntry::GroupHeader {
                display_name,
                class_order,
                ..
            } => {
                let style = Style::default()
                    .fg(Color::Black)
                    .bg(class_color(*class_order))
                    .add_modifier(Modifier::BOLD);
                frame.render_widget(Paragraph::new(format!(" {display_name}")).style(style), line);
            }
            PlanEntry::Row(row) => render_row(frame, line, row),
        }
    }
}

fn render_row(frame: &mut Frame, area: Rect, row: &PlanRow) {
    let mut style = Style::default();
    if row.leader {
        style = style.add_modifier(Modifier::BOLD);
    }
    let cells = column_cells(area);
    for ((field, text), cell) in Field::ALL.iter().zip(row.cells.iter()).zip(cells.iter()) {
        let paragraph = if *field == Field::Class {
            let label = match row.class_icon {
                Some(icon) => format!("{icon}{text}"),
                None => text.clone(),
            };
            Paragraph::new(label).style(style.fg(class_color(row.class_order)))
        } else {
            Paragraph::new(text.as_str()).style(style)
        };
        frame.render_widget(paragraph, *cell);
    }
}

fn class_color(class_order: i32) -> Color {
    match class_order {
        1 => Color::Red,
        2 => Color::Blue,
        3 => Color::Green,
        _ => Color::Gray,
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Race Standings - Help",
        "",
        "Sorting:",
        "  click header   Sort by column (again to reverse)",
        "  1-9, 0         Same as clicking columns 1-10",
        "",
        "  Until a column is chosen, classes are grouped",
        "  by whichever class currently leads overall.",
        "",
        "Other:",
        "  j/k or ↑/↓     Scroll",
        "  r              Refresh now",
        "  ?              Toggle help",
        "  q              Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
