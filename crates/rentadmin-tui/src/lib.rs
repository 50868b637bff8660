// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod screen;
pub mod table;
pub mod views;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs};
use rentadmin_app::{
    AppCommand, AppEvent, AppMode, AppState, DashboardSnapshot, EntityBackend, Lease,
    LeaseFormInput, Payment, PaymentFormInput, Property, PropertyFormInput, TabKind, Tenant,
    TenantFormInput, format_money,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::{Date, OffsetDateTime};

use crate::screen::{Dispatch, Screen};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Everything the UI needs from the outside world. Backends are asked for
/// once, when the screens are built.
pub trait AppRuntime {
    fn property_backend(&mut self) -> EntityBackend<Property, PropertyFormInput>;
    fn tenant_backend(&mut self) -> EntityBackend<Tenant, TenantFormInput>;
    fn lease_backend(&mut self) -> EntityBackend<Lease, LeaseFormInput>;
    fn payment_backend(&mut self) -> EntityBackend<Payment, PaymentFormInput>;
    fn load_dashboard(&mut self, today: Date) -> Result<DashboardSnapshot>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

struct ViewData {
    screens: Vec<Box<dyn Screen>>,
    dashboard: Option<DashboardSnapshot>,
    dashboard_error: Option<String>,
    today: Date,
    status_token: u64,
}

impl ViewData {
    fn new<R: AppRuntime>(runtime: &mut R, dispatch: Dispatch, today: Date) -> Self {
        let screens: Vec<Box<dyn Screen>> = vec![
            Box::new(views::property_screen(runtime.property_backend()).with_dispatch(dispatch)),
            Box::new(views::tenant_screen(runtime.tenant_backend()).with_dispatch(dispatch)),
            Box::new(views::lease_screen(runtime.lease_backend()).with_dispatch(dispatch)),
            Box::new(views::payment_screen(runtime.payment_backend()).with_dispatch(dispatch)),
        ];
        Self {
            screens,
            dashboard: None,
            dashboard_error: None,
            today,
            status_token: 0,
        }
    }

    fn screen(&self, tab: TabKind) -> Option<&dyn Screen> {
        self.screens
            .iter()
            .find(|screen| screen.tab() == tab)
            .map(|screen| &**screen)
    }

    fn screen_mut(&mut self, tab: TabKind) -> Option<&mut Box<dyn Screen>> {
        self.screens.iter_mut().find(|screen| screen.tab() == tab)
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let today = OffsetDateTime::now_utc().date();
    let mut view_data = ViewData::new(runtime, Dispatch::Threaded, today);
    let (internal_tx, internal_rx) = mpsc::channel();
    activate_tab(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);
        poll_screens(state, &mut view_data, &internal_tx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(anyhow::Error::from(error).context("draw frame"));
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

/// Drain worker completions for every screen, not just the visible one.
fn poll_screens(state: &mut AppState, view_data: &mut ViewData, tx: &Sender<InternalEvent>) {
    let mut latest = None;
    for screen in &mut view_data.screens {
        if let Some(message) = screen.poll().pop() {
            latest = Some(message);
        }
    }
    if let Some(message) = latest {
        emit_status(state, view_data, tx, message);
    }
    sync_mode(state, view_data);
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn sync_mode(state: &mut AppState, view_data: &ViewData) {
    let mode = view_data
        .screen(state.active_tab)
        .map_or(AppMode::Nav, |screen| screen.mode());
    state.dispatch(AppCommand::SetMode(mode));
}

fn activate_tab<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state.active_tab == TabKind::Dashboard {
        reload_dashboard(state, runtime, view_data, internal_tx);
        return;
    }
    let status = view_data
        .screen_mut(state.active_tab)
        .and_then(|screen| screen.activate());
    if let Some(status) = status {
        emit_status(state, view_data, internal_tx, status);
    }
    sync_mode(state, view_data);
}

fn reload_dashboard<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.load_dashboard(view_data.today) {
        Ok(snapshot) => {
            view_data.dashboard = Some(snapshot);
            view_data.dashboard_error = None;
        }
        Err(error) => {
            let detail = format!("{error:#}");
            tracing::warn!(%detail, "dashboard load failed");
            view_data.dashboard_error = Some(detail);
            emit_status(
                state,
                view_data,
                internal_tx,
                "dashboard load failed -- press r to retry",
            );
        }
    }
}

fn switch_tab<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::TabChanged(_)))
    {
        activate_tab(state, runtime, view_data, internal_tx);
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            state.dispatch(AppCommand::ToggleHelp);
        }
        return false;
    }

    if state.mode == AppMode::Nav {
        let tab_command = match key.code {
            KeyCode::Tab | KeyCode::Char(']') => Some(AppCommand::NextTab),
            KeyCode::BackTab | KeyCode::Char('[') => Some(AppCommand::PrevTab),
            KeyCode::Char(digit @ '1'..='9') => {
                let index = digit as usize - '1' as usize;
                TabKind::ALL.get(index).copied().map(AppCommand::SelectTab)
            }
            _ => None,
        };
        if let Some(command) = tab_command {
            switch_tab(state, runtime, view_data, internal_tx, command);
            return false;
        }
        if key.code == KeyCode::Char('?') {
            state.dispatch(AppCommand::ToggleHelp);
            return false;
        }
    }

    if state.active_tab == TabKind::Dashboard {
        if key.code == KeyCode::Char('r') {
            reload_dashboard(state, runtime, view_data, internal_tx);
        }
        return false;
    }

    let outcome = match view_data.screen_mut(state.active_tab) {
        Some(screen) => screen.handle_key(key),
        None => return false,
    };
    if let Some(status) = outcome.status {
        emit_status(state, view_data, internal_tx, status);
    }
    sync_mode(state, view_data);
    false
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let titles = TabKind::ALL
        .iter()
        .map(|tab| tab_title(*tab, view_data))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("rentadmin").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match view_data.screen(state.active_tab) {
        Some(screen) => screen.render(frame, layout[1]),
        None => {
            let body = Paragraph::new(render_dashboard_text(
                view_data.dashboard.as_ref(),
                view_data.dashboard_error.as_deref(),
            ))
            .block(Block::default().borders(Borders::ALL).title("dashboard"));
            frame.render_widget(body, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if state.show_help {
        let area = centered_rect(72, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn tab_title(tab: TabKind, view_data: &ViewData) -> String {
    let loading = view_data
        .screen(tab)
        .is_some_and(|screen| screen.loading());
    if loading {
        format!("{}*", tab.label())
    } else {
        tab.label().to_owned()
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
tabs: tab/shift+tab or ]/[ next/prev | 1-5 jump\n\
nav: j/k rows | h/l columns | g/G first/last | s sort | c columns | m row menu\n\
nav: enter/v view | a add | e edit | d delete | space select | A select all\n\
nav: / search | r reload | x dismiss error\n\
search: type to filter | ctrl+u clear | enter/esc done\n\
form: tab/shift+tab field | left/right choices | ctrl+u clear field | ctrl+s save | esc cancel\n\
detail: e edit | esc close\n\
confirm: y delete | n keep\n\
dashboard: r reload"
}

fn mode_hints(mode: AppMode) -> &'static str {
    match mode {
        AppMode::Nav => "j/k h/l | / search | a add | enter view | e edit | d del | m menu | ? help",
        AppMode::Search => "type to filter | enter/esc done",
        AppMode::Form => "tab field | ctrl+s save | esc cancel",
        AppMode::Detail => "e edit | esc close",
        AppMode::Confirm => "y delete | n keep",
        AppMode::Columns => "j/k move | space toggle | esc close",
        AppMode::RowMenu => "j/k move | enter choose | esc close",
    }
}

fn status_text(state: &AppState) -> String {
    let mode = state.mode.label();
    let hints = mode_hints(state.mode);
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn render_dashboard_text(snapshot: Option<&DashboardSnapshot>, error: Option<&str>) -> String {
    if let Some(error) = error {
        return format!("dashboard unavailable: {error}\n\npress r to retry");
    }
    let Some(snapshot) = snapshot else {
        return "loading dashboard".to_owned();
    };

    let mut lines = vec![
        format!(
            "properties  {} total · {} available · {} rented · {} maintenance",
            snapshot.properties_total,
            snapshot.properties_available,
            snapshot.properties_rented,
            snapshot.properties_maintenance
        ),
        format!("tenants     {}", snapshot.tenants_total),
        format!("leases      {} active", snapshot.active_leases),
        format!(
            "payments    {} pending · {} late",
            snapshot.pending_payments, snapshot.late_payments
        ),
        String::new(),
        format!(
            "paid income, last {} months: {}",
            snapshot.income.len(),
            format_money(snapshot.income_total_cents())
        ),
    ];
    for bucket in &snapshot.income {
        let noun = if bucket.count == 1 {
            "payment"
        } else {
            "payments"
        };
        lines.push(format!(
            "  {}  {:>12}  {} {noun}",
            bucket.label(),
            format_money(bucket.total_cents),
            bucket.count
        ));
    }
    lines.join("\n")
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
