use std::{collections::VecDeque, time::Duration};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyEventKind,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::{stream::BoxStream, FutureExt, StreamExt};
use lapse_catalog::CatalogClient;
use lapse_timeline::{
    DayRequest, DayResponse, Dispatch, KeyPress, NavInput, NavigationController, ViewModel,
};
use lapse_types::{
    capture::{AvailableDates, DateKey},
    events::{EventPayload, ViewEvent},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use tokio::{runtime::Handle, sync::mpsc};

const MAX_LOG_ENTRIES: usize = 60;
const CELL_WIDTH: u16 = 10;

/// Results delivered back to the UI thread by catalog fetches.
enum Inbound {
    Dates(AvailableDates),
    Day(DayResponse),
}

/// Cursor inside the open date picker.
#[derive(Default)]
struct PickerCursor {
    index: Option<usize>,
}

impl PickerCursor {
    /// Starts on the current date each time the picker opens; forgets the
    /// position whenever the picker is closed, including by a day render.
    fn sync(&mut self, open: bool, dates: &AvailableDates, current: &DateKey) {
        if !open {
            self.index = None;
        } else if self.index.is_none() {
            self.index = dates
                .position(current)
                .or_else(|| dates.len().checked_sub(1));
        }
    }
}

/// Filmstrip geometry from the last draw, used for mouse hit-testing.
#[derive(Default, Clone, Copy)]
struct FilmstripLayout {
    inner: Rect,
    offset: usize,
}

type Controller = NavigationController<ViewModel>;

pub fn run(
    mut controller: Controller,
    dates: Option<AvailableDates>,
    handle: Handle,
    summary: String,
) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    match dates {
        Some(dates) => controller.apply_available_dates(dates),
        None => {
            let catalog = controller.catalog().clone();
            let tx = tx.clone();
            handle.spawn(async move {
                let dates = catalog.fetch_available_dates().await;
                let _ = tx.send(Inbound::Dates(dates));
            });
        }
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let res = run_loop(&mut terminal, &mut controller, rx, tx, &handle, &summary);

    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    res
}

fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    controller: &mut Controller,
    mut rx: mpsc::UnboundedReceiver<Inbound>,
    tx: mpsc::UnboundedSender<Inbound>,
    handle: &Handle,
    summary: &str,
) -> Result<()> {
    let mut events: BoxStream<'static, ViewEvent> = controller.journal().subscribe();
    let mut logs: VecDeque<String> = controller
        .journal()
        .snapshot()
        .iter()
        .rev()
        .take(MAX_LOG_ENTRIES)
        .rev()
        .map(format_event)
        .collect();
    let mut picker = PickerCursor::default();
    let mut layout = FilmstripLayout::default();

    loop {
        while let Ok(message) = rx.try_recv() {
            match message {
                Inbound::Dates(dates) => controller.apply_available_dates(dates),
                Inbound::Day(response) => {
                    controller.complete(response);
                }
            }
        }

        while let Some(Some(event)) = events.next().now_or_never() {
            if logs.len() == MAX_LOG_ENTRIES {
                logs.pop_front();
            }
            logs.push_back(format_event(&event));
        }

        let state = controller.state();
        picker.sync(
            controller.view().picker_open,
            state.available_dates(),
            state.current_date(),
        );

        terminal.draw(|f| {
            layout = draw(f, controller, &picker, &logs, summary);
        })?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                if controller.view().picker_open {
                    handle_picker_key(key.code, controller, &mut picker, &tx, handle);
                    continue;
                }
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
                if let Some(input) = key_press(key.code).and_then(NavInput::from_key) {
                    submit(controller, input, &tx, handle);
                }
            }
            CEvent::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let len = controller.view().thumbnails.len();
                if let Some(index) = hit_test(&layout, mouse.column, mouse.row, len) {
                    submit(controller, NavInput::SelectIndex(index), &tx, handle);
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn handle_picker_key(
    code: KeyCode,
    controller: &mut Controller,
    picker: &mut PickerCursor,
    tx: &mpsc::UnboundedSender<Inbound>,
    handle: &Handle,
) {
    let count = controller.state().available_dates().len();
    match code {
        KeyCode::Up => {
            picker.index = picker.index.map(|i| i.saturating_sub(1));
        }
        KeyCode::Down => {
            picker.index = picker
                .index
                .map(|i| (i + 1).min(count.saturating_sub(1)));
        }
        KeyCode::Enter => {
            let chosen = picker
                .index
                .and_then(|i| controller.state().available_dates().as_slice().get(i))
                .cloned();
            close_picker(controller, picker);
            if let Some(date) = chosen {
                submit(controller, NavInput::JumpToDate(date), tx, handle);
            }
        }
        KeyCode::Esc | KeyCode::Char('q') => close_picker(controller, picker),
        _ => {}
    }
}

fn close_picker(controller: &mut Controller, picker: &mut PickerCursor) {
    controller.view_mut().close_date_picker();
    picker.index = None;
}

/// Runs the synchronous part of an input and hands any day fetch to the runtime.
fn submit(
    controller: &mut Controller,
    input: NavInput,
    tx: &mpsc::UnboundedSender<Inbound>,
    handle: &Handle,
) {
    if let Dispatch::Pending(request) = controller.handle(input) {
        spawn_fetch(controller.catalog().clone(), request, tx.clone(), handle);
    }
}

fn spawn_fetch(
    catalog: CatalogClient,
    request: DayRequest,
    tx: mpsc::UnboundedSender<Inbound>,
    handle: &Handle,
) {
    handle.spawn(async move {
        let response = request.resolve(&catalog).await;
        let _ = tx.send(Inbound::Day(response));
    });
}

fn key_press(code: KeyCode) -> Option<KeyPress> {
    match code {
        KeyCode::Left => Some(KeyPress::Left),
        KeyCode::Right => Some(KeyPress::Right),
        KeyCode::Up => Some(KeyPress::Up),
        KeyCode::Down => Some(KeyPress::Down),
        KeyCode::Char(c) => Some(KeyPress::Char(c)),
        _ => None,
    }
}

fn draw(
    f: &mut Frame,
    controller: &Controller,
    picker: &PickerCursor,
    logs: &VecDeque<String>,
    summary: &str,
) -> FilmstripLayout {
    let view = controller.view();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(4),
                Constraint::Length(8),
            ]
            .as_ref(),
        )
        .split(f.size());

    let mut header_spans = vec![
        Span::styled(
            "Timeline",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(view.date_display.clone(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::raw(summary),
        Span::raw("  "),
        Span::styled("←/→", Style::default().fg(Color::Magenta)),
        Span::raw(" image "),
        Span::styled("↑/↓", Style::default().fg(Color::Magenta)),
        Span::raw(" day "),
        Span::styled("d", Style::default().fg(Color::Magenta)),
        Span::raw(" date "),
        Span::styled("q", Style::default().fg(Color::Magenta)),
        Span::raw(" quit"),
    ];
    if let Some(notice) = &view.notice {
        header_spans.push(Span::raw("  "));
        header_spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Red)));
    }
    let header = Paragraph::new(Line::from(header_spans))
        .block(Block::default().borders(Borders::ALL).title("Lapse"));
    f.render_widget(header, chunks[0]);

    let label = Style::default().fg(Color::DarkGray);
    let main_lines = match &view.main_src {
        Some(src) => vec![
            Line::from(vec![Span::styled("image ", label), Span::raw(src.clone())]),
            Line::from(vec![Span::styled("alt   ", label), Span::raw(view.main_alt.clone())]),
        ],
        None => vec![Line::from("No captures for this day")],
    };
    let main = Paragraph::new(main_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Capture")
            .title(Title::from(view.timestamp.clone()).alignment(Alignment::Right)),
    );
    f.render_widget(main, chunks[1]);

    let layout = draw_filmstrip(f, view, chunks[2]);

    let items: Vec<ListItem> = logs
        .iter()
        .rev()
        .map(|entry| ListItem::new(entry.clone()))
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Events"));
    f.render_widget(list, chunks[3]);

    if view.picker_open {
        draw_picker(f, controller.state().available_dates(), picker);
    }
    layout
}

fn draw_filmstrip(f: &mut Frame, view: &ViewModel, area: Rect) -> FilmstripLayout {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Filmstrip ({})", view.thumbnails.len()))
        .border_style(if view.filmstrip_focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });
    let inner = block.inner(area);
    f.render_widget(block, area);

    let visible = usize::from(inner.width / CELL_WIDTH).max(1);
    let offset = window_offset(view.thumbnails.len(), view.scrolled_to, visible);

    let spans: Vec<Span> = view
        .thumbnails
        .iter()
        .skip(offset)
        .take(visible)
        .map(|thumb| {
            let label = format!("{:^width$}", thumb.time, width = usize::from(CELL_WIDTH));
            if thumb.selected {
                Span::styled(
                    label,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(label)
            }
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)), inner);

    FilmstripLayout { inner, offset }
}

fn draw_picker(f: &mut Frame, dates: &AvailableDates, picker: &PickerCursor) {
    let area = centered(f.size(), 24, 12);
    let items: Vec<ListItem> = dates
        .iter()
        .map(|date| ListItem::new(date.to_string()))
        .collect();
    let title = if dates.is_empty() {
        "No dates"
    } else {
        "Jump to date"
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow));
    let mut state = ListState::default();
    state.select(picker.index);
    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
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

/// First visible thumbnail, keeping the selected one centred where possible.
fn window_offset(len: usize, selected: Option<usize>, visible: usize) -> usize {
    let Some(selected) = selected else {
        return 0;
    };
    let max_offset = len.saturating_sub(visible);
    selected.saturating_sub(visible / 2).min(max_offset)
}

fn hit_test(layout: &FilmstripLayout, column: u16, row: u16, len: usize) -> Option<usize> {
    let inner = layout.inner;
    if row < inner.y || row >= inner.y + inner.height {
        return None;
    }
    if column < inner.x || column >= inner.x + inner.width {
        return None;
    }
    let index = layout.offset + usize::from((column - inner.x) / CELL_WIDTH);
    (index < len).then_some(index)
}

fn format_event(event: &ViewEvent) -> String {
    let timestamp = event.timestamp.format("%H:%M:%S");
    match &event.payload {
        EventPayload::Lifecycle(phase) => format!("[{}] Lifecycle::{:?}", timestamp, phase),
        EventPayload::DatesLoaded { count } => {
            format!("[{}] {} capture days available", timestamp, count)
        }
        EventPayload::IndexSelected { date, index } => {
            format!("[{}] {} #{}", timestamp, date, index)
        }
        EventPayload::DaySwitched {
            date, image_count, ..
        } => format!("[{}] Day {} ({} captures)", timestamp, date, image_count),
        EventPayload::SwitchRejected { date, .. } => {
            format!("[{}] Nothing to show for {}", timestamp, date)
        }
        EventPayload::StaleResponseDiscarded { date, token, latest } => format!(
            "[{}] Dropped late response for {} (#{} < #{})",
            timestamp, date, token, latest
        ),
    }
}
