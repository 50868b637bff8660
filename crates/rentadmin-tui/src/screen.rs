// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use rentadmin_app::{
    AppMode, Completion, EditableForm, EntityCommand, EntityController, EntityEvent,
    EntityFailure, FailureKind, FieldKind, Overlay, TabKind,
};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::centered_rect;
use crate::table::{
    EntityTable, RowActionSpec, TableCommand, TableContext, TableIntent, TableUiState,
};

/// A row action that rewrites the entity's form and submits it directly.
pub struct CustomAction<T, F> {
    pub spec: RowActionSpec,
    pub apply: fn(&T) -> F,
}

/// How entity requests leave the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// One worker thread per request; completions arrive on a channel.
    Threaded,
    /// Requests run on the calling thread before the key handler returns.
    Inline,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenOutcome {
    pub consumed: bool,
    pub status: Option<String>,
}

impl ScreenOutcome {
    fn consumed(status: Option<String>) -> Self {
        Self {
            consumed: true,
            status,
        }
    }

    fn ignored() -> Self {
        Self::default()
    }
}

/// A tab body the app loop can drive without knowing its entity type.
pub trait Screen {
    fn tab(&self) -> TabKind;
    fn mode(&self) -> AppMode;
    fn loading(&self) -> bool;
    /// Load on first activation; later activations keep the cached rows.
    fn activate(&mut self) -> Option<String>;
    fn refresh(&mut self) -> Option<String>;
    /// Apply completions that arrived from worker threads.
    fn poll(&mut self) -> Vec<String>;
    fn handle_key(&mut self, key: KeyEvent) -> ScreenOutcome;
    fn render(&self, frame: &mut ratatui::Frame<'_>, area: Rect);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FormUi {
    field: usize,
    buffer: String,
    error: Option<String>,
}

pub struct ResourceScreen<T, F> {
    tab: TabKind,
    controller: EntityController<T, F>,
    table: EntityTable<T>,
    table_ui: TableUiState,
    detail: fn(&T) -> Vec<(&'static str, String)>,
    actions: Vec<CustomAction<T, F>>,
    dispatch: Dispatch,
    searching: bool,
    form_ui: FormUi,
    mounted: bool,
    /// Set by a save or delete; the reload that follows stays quiet.
    quiet_reload: bool,
    tx: Sender<Completion<T>>,
    rx: Receiver<Completion<T>>,
}

impl<T, F> ResourceScreen<T, F>
where
    T: Clone + Send + 'static,
    F: EditableForm + Send + 'static,
{
    pub fn new(
        tab: TabKind,
        controller: EntityController<T, F>,
        table: EntityTable<T>,
        detail: fn(&T) -> Vec<(&'static str, String)>,
    ) -> Self {
        let table_ui = table.ui_state();
        let (tx, rx) = mpsc::channel();
        Self {
            tab,
            controller,
            table,
            table_ui,
            detail,
            actions: Vec::new(),
            dispatch: Dispatch::Threaded,
            searching: false,
            form_ui: FormUi::default(),
            mounted: false,
            quiet_reload: false,
            tx,
            rx,
        }
    }

    pub fn with_actions(mut self, actions: Vec<CustomAction<T, F>>) -> Self {
        let specs = actions.iter().map(|action| action.spec).collect();
        self.table = self.table.with_actions(specs);
        self.actions = actions;
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn controller(&self) -> &EntityController<T, F> {
        &self.controller
    }

    pub fn table_ui(&self) -> &TableUiState {
        &self.table_ui
    }

    pub fn searching(&self) -> bool {
        self.searching
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_ui.error.as_deref()
    }

    pub fn form_field(&self) -> usize {
        self.form_ui.field
    }

    pub fn table_text(&self) -> Vec<String> {
        self.table.render_text(&self.table_ui, &table_context(&self.controller))
    }

    fn resource(&self) -> &'static str {
        self.controller.hooks().resource
    }

    /// Dispatch `command` and route every request it produces. Returns the
    /// first user-facing message among the resulting events. The reload
    /// after a save or delete produces no message, so the confirmation
    /// stays on the status line even when completions arrive separately.
    fn send(&mut self, command: EntityCommand<T, F>) -> Option<String> {
        let mut queue = VecDeque::from([command]);
        let mut status = None;
        while let Some(command) = queue.pop_front() {
            for event in self.controller.dispatch(command) {
                if let EntityEvent::Request(request) = event {
                    match self.dispatch {
                        Dispatch::Inline => {
                            let completion = self.controller.backend().execute(&request);
                            queue.push_back(EntityCommand::Completed(completion));
                        }
                        Dispatch::Threaded => {
                            let backend = self.controller.backend().clone();
                            let tx = self.tx.clone();
                            let resource = self.resource();
                            thread::spawn(move || {
                                let completion = backend.execute(&request);
                                if tx.send(completion).is_err() {
                                    tracing::debug!(resource, "screen gone before completion");
                                }
                            });
                        }
                    }
                    continue;
                }
                match event {
                    EntityEvent::Saved { .. } | EntityEvent::Deleted { .. } => {
                        self.quiet_reload = true;
                    }
                    EntityEvent::Loaded { .. } if self.quiet_reload => {
                        self.quiet_reload = false;
                        continue;
                    }
                    EntityEvent::Loaded { .. } | EntityEvent::Failed(_) => {
                        self.quiet_reload = false;
                    }
                    _ => {}
                }
                if status.is_none() {
                    status = self.describe(&event);
                }
            }
        }
        status
    }

    fn describe(&self, event: &EntityEvent<F>) -> Option<String> {
        let resource = self.resource();
        match event {
            EntityEvent::Loaded { count } => Some(format!("loaded {count} {}", self.tab.label())),
            EntityEvent::Saved { id } => Some(format!("saved {resource} {id}")),
            EntityEvent::Deleted { id } => Some(format!("deleted {resource} {id}")),
            EntityEvent::Failed(failure) => Some(failure_text(failure)),
            EntityEvent::ConfirmRequested { prompt } => Some(format!("{prompt} (y/n)")),
            EntityEvent::Rejected { reason } => Some(reason.clone()),
            EntityEvent::SelectionChanged { selected } => Some(format!("{selected} selected")),
            EntityEvent::Request(_)
            | EntityEvent::FilterChanged { .. }
            | EntityEvent::StaleDropped { .. } => None,
        }
    }

    fn reset_form_ui(&mut self) {
        self.form_ui = FormUi {
            field: 0,
            buffer: self.controller.state().form().field_text(0),
            error: None,
        };
    }

    fn apply_intent(&mut self, intent: TableIntent) -> Option<String> {
        match intent {
            TableIntent::View(id) => {
                let entity = self.controller.find(id)?.clone();
                self.send(EntityCommand::View(entity))
            }
            TableIntent::Edit(id) => {
                let entity = self.controller.find(id)?.clone();
                let status = self.send(EntityCommand::BeginEdit { entity, form: None });
                self.reset_form_ui();
                status
            }
            TableIntent::Delete { id, name } => self.send(EntityCommand::Remove { id, name }),
            TableIntent::Custom { action, id } => {
                let apply = self
                    .actions
                    .iter()
                    .find(|custom| custom.spec.action == action)?
                    .apply;
                let entity = self.controller.find(id)?.clone();
                let form = apply(&entity);
                self.send(EntityCommand::BeginEdit {
                    entity,
                    form: Some(form),
                });
                self.reset_form_ui();
                self.send(EntityCommand::Submit)
            }
            TableIntent::ToggleOne(id) => self.send(EntityCommand::ToggleOne(id)),
            TableIntent::ToggleAll(checked) => self.send(EntityCommand::ToggleAll(checked)),
        }
    }

    fn table_command(&mut self, command: TableCommand) -> ScreenOutcome {
        let outcome = {
            let ctx = table_context(&self.controller);
            self.table.apply(&mut self.table_ui, &ctx, command)
        };
        let mut status = outcome.status.map(|status| status.message());
        if let Some(intent) = outcome.intent {
            if let Some(message) = self.apply_intent(intent) {
                status = Some(message);
            }
        }
        ScreenOutcome::consumed(status)
    }

    /// Write the buffer into the current field. Parse failures stay on the
    /// field and are shown under the form.
    fn commit_field(&mut self) -> bool {
        let mut form = self.controller.state().form().clone();
        match form.set_field(self.form_ui.field, &self.form_ui.buffer) {
            Ok(()) => {
                self.form_ui.error = None;
                self.send(EntityCommand::EditForm(form));
                true
            }
            Err(error) => {
                self.form_ui.error = Some(format!("{error:#}"));
                false
            }
        }
    }

    fn move_field(&mut self, delta: isize) {
        if !self.commit_field() {
            return;
        }
        let count = F::fields().len() as isize;
        let next = (self.form_ui.field as isize + delta).rem_euclid(count.max(1)) as usize;
        self.form_ui.field = next;
        self.form_ui.buffer = self.controller.state().form().field_text(next);
    }

    fn cycle_choice(&mut self, delta: isize) {
        let Some(spec) = F::fields().get(self.form_ui.field) else {
            return;
        };
        let FieldKind::Choice(options) = spec.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let current = options
            .iter()
            .position(|option| *option == self.form_ui.buffer.trim())
            .unwrap_or(0) as isize;
        let len = options.len() as isize;
        self.form_ui.buffer = options[(current + delta).rem_euclid(len) as usize].to_owned();
    }

    fn submit_form(&mut self) -> Option<String> {
        if !self.commit_field() {
            return self.form_ui.error.clone();
        }
        if let Err(error) = self.controller.state().form().validate() {
            let message = format!("{error:#}");
            self.form_ui.error = Some(message.clone());
            return Some(message);
        }
        self.send(EntityCommand::Submit)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> ScreenOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let status = match key.code {
            KeyCode::Esc => {
                self.send(EntityCommand::Cancel);
                self.form_ui = FormUi::default();
                Some("discarded changes".to_owned())
            }
            KeyCode::Char('s') if ctrl => self.submit_form(),
            KeyCode::Tab | KeyCode::Down | KeyCode::Enter => {
                self.move_field(1);
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_field(-1);
                None
            }
            KeyCode::Left => {
                self.cycle_choice(-1);
                None
            }
            KeyCode::Right => {
                self.cycle_choice(1);
                None
            }
            KeyCode::Backspace => {
                self.form_ui.buffer.pop();
                None
            }
            KeyCode::Char('u') if ctrl => {
                self.form_ui.buffer.clear();
                None
            }
            KeyCode::Char(ch) if !ctrl => {
                self.form_ui.buffer.push(ch);
                None
            }
            _ => return ScreenOutcome::ignored(),
        };
        ScreenOutcome::consumed(status)
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> ScreenOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let mut term = self.controller.state().search().to_owned();
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.searching = false;
                return ScreenOutcome::consumed(None);
            }
            KeyCode::Backspace => {
                term.pop();
            }
            KeyCode::Char('u') if ctrl => term.clear(),
            KeyCode::Char(ch) if !ctrl => term.push(ch),
            _ => return ScreenOutcome::ignored(),
        }
        let status = self.send(EntityCommand::Search(term));
        ScreenOutcome::consumed(status)
    }

    fn handle_nav_key(&mut self, key: KeyEvent) -> ScreenOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return ScreenOutcome::ignored();
        }
        let command = match key.code {
            KeyCode::Char('j') | KeyCode::Down => TableCommand::MoveRow(1),
            KeyCode::Char('k') | KeyCode::Up => TableCommand::MoveRow(-1),
            KeyCode::Char('g') | KeyCode::Home => TableCommand::JumpFirstRow,
            KeyCode::Char('G') | KeyCode::End => TableCommand::JumpLastRow,
            KeyCode::Char('h') | KeyCode::Left => TableCommand::MoveColumn(-1),
            KeyCode::Char('l') | KeyCode::Right => TableCommand::MoveColumn(1),
            KeyCode::Char('s') => TableCommand::CycleSort,
            KeyCode::Char(' ') => TableCommand::ToggleRow,
            KeyCode::Char('A') => TableCommand::ToggleAll,
            KeyCode::Enter | KeyCode::Char('v') => TableCommand::ViewRow,
            KeyCode::Char('e') => TableCommand::EditRow,
            KeyCode::Char('d') => TableCommand::DeleteRow,
            KeyCode::Char('m') => TableCommand::ToggleMenu,
            KeyCode::Char('c') => TableCommand::ToggleColumnPanel,
            KeyCode::Char('/') => {
                self.searching = true;
                return ScreenOutcome::consumed(None);
            }
            KeyCode::Char('a') => {
                self.send(EntityCommand::OpenCreate);
                self.reset_form_ui();
                return ScreenOutcome::consumed(Some(format!("new {}", self.resource())));
            }
            KeyCode::Char('r') => return ScreenOutcome::consumed(self.refresh()),
            KeyCode::Char('x') => {
                self.send(EntityCommand::ClearError);
                return ScreenOutcome::consumed(None);
            }
            _ => return ScreenOutcome::ignored(),
        };
        self.table_command(command)
    }

    fn render_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.controller.state().overlay() {
            Overlay::EditForm(entity) => format!(
                "edit {} {}",
                self.resource(),
                self.controller.name_of(entity)
            ),
            _ => format!("new {}", self.resource()),
        };
        let form = self.controller.state().form();
        let mut lines: Vec<Line<'static>> = F::fields()
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let active = index == self.form_ui.field;
                let value = if active {
                    format!("{}_", self.form_ui.buffer)
                } else {
                    form.field_text(index)
                };
                let hint = match spec.kind {
                    FieldKind::Choice(options) if active => format!("  ({})", options.join("/")),
                    FieldKind::Date | FieldKind::OptionalDate if active => {
                        "  (YYYY-MM-DD)".to_owned()
                    }
                    _ => String::new(),
                };
                let label_style = if active {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                Line::from(vec![
                    Span::styled(format!("{:>14}: ", spec.label), label_style),
                    Span::raw(value),
                    Span::styled(hint, Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();
        lines.push(Line::default());
        if let Some(error) = &self.form_ui.error {
            lines.push(Line::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ));
        }
        lines.push(Line::styled(
            "tab next · shift-tab prev · ←/→ choices · ctrl+s save · esc cancel",
            Style::default().fg(Color::DarkGray),
        ));

        let popup = centered_rect(70, 80, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title(title)),
            popup,
        );
    }

    fn render_detail(&self, frame: &mut ratatui::Frame<'_>, area: Rect, entity: &T) {
        let mut lines: Vec<Line<'static>> = (self.detail)(entity)
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{label:>14}: "), Style::default().fg(Color::Gray)),
                    Span::raw(value),
                ])
            })
            .collect();
        lines.push(Line::default());
        lines.push(Line::styled(
            "e edit · esc close",
            Style::default().fg(Color::DarkGray),
        ));
        let title = format!("{} {}", self.resource(), self.controller.name_of(entity));
        let popup = centered_rect(60, 70, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title(title)),
            popup,
        );
    }
}

impl<T, F> Screen for ResourceScreen<T, F>
where
    T: Clone + Send + 'static,
    F: EditableForm + Send + 'static,
{
    fn tab(&self) -> TabKind {
        self.tab
    }

    fn mode(&self) -> AppMode {
        let state = self.controller.state();
        if state.pending_delete().is_some() {
            return AppMode::Confirm;
        }
        match state.overlay() {
            Overlay::CreateForm | Overlay::EditForm(_) => AppMode::Form,
            Overlay::Detail(_) => AppMode::Detail,
            Overlay::Closed if self.table_ui.open_menu().is_some() => AppMode::RowMenu,
            Overlay::Closed if self.table_ui.columns_open() => AppMode::Columns,
            Overlay::Closed if self.searching => AppMode::Search,
            Overlay::Closed => AppMode::Nav,
        }
    }

    fn loading(&self) -> bool {
        self.controller.state().loading()
    }

    fn activate(&mut self) -> Option<String> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        self.refresh()
    }

    fn refresh(&mut self) -> Option<String> {
        self.send(EntityCommand::Refresh)
            .or_else(|| Some(format!("loading {}", self.tab.label())))
    }

    fn poll(&mut self) -> Vec<String> {
        let mut messages = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            if let Some(message) = self.send(EntityCommand::Completed(completion)) {
                messages.push(message);
            }
        }
        messages
    }

    fn handle_key(&mut self, key: KeyEvent) -> ScreenOutcome {
        match self.mode() {
            AppMode::Confirm => {
                let status = match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => {
                        self.send(EntityCommand::ConfirmRemove)
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        self.send(EntityCommand::DismissRemove);
                        Some("delete cancelled".to_owned())
                    }
                    _ => return ScreenOutcome::consumed(None),
                };
                ScreenOutcome::consumed(status)
            }
            AppMode::Form => self.handle_form_key(key),
            AppMode::Detail => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                    self.send(EntityCommand::CloseView);
                    ScreenOutcome::consumed(None)
                }
                KeyCode::Char('e') => {
                    let Some(entity) = self.controller.state().viewing().cloned() else {
                        return ScreenOutcome::consumed(None);
                    };
                    self.send(EntityCommand::BeginEdit { entity, form: None });
                    self.reset_form_ui();
                    ScreenOutcome::consumed(None)
                }
                _ => ScreenOutcome::consumed(None),
            },
            AppMode::RowMenu => {
                let command = match key.code {
                    KeyCode::Char('j') | KeyCode::Down => TableCommand::MoveMenu(1),
                    KeyCode::Char('k') | KeyCode::Up => TableCommand::MoveMenu(-1),
                    KeyCode::Enter => TableCommand::ChooseMenu,
                    KeyCode::Esc | KeyCode::Char('m') => TableCommand::DismissOverlays,
                    _ => return ScreenOutcome::consumed(None),
                };
                self.table_command(command)
            }
            AppMode::Columns => {
                let command = match key.code {
                    KeyCode::Char('j') | KeyCode::Down => TableCommand::MoveColumnCursor(1),
                    KeyCode::Char('k') | KeyCode::Up => TableCommand::MoveColumnCursor(-1),
                    KeyCode::Char(' ') | KeyCode::Enter => TableCommand::ToggleColumn,
                    KeyCode::Esc | KeyCode::Char('c') => TableCommand::DismissOverlays,
                    _ => return ScreenOutcome::consumed(None),
                };
                self.table_command(command)
            }
            AppMode::Search => self.handle_search_key(key),
            AppMode::Nav => self.handle_nav_key(key),
        }
    }

    fn render(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let state = self.controller.state();
        let show_search = self.searching || !state.search().is_empty();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(u16::from(show_search)),
                Constraint::Length(u16::from(state.error().is_some())),
                Constraint::Min(3),
            ])
            .split(area);

        if show_search {
            let cursor = if self.searching { "_" } else { "" };
            let search = Paragraph::new(format!("/{}{cursor}", state.search()))
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(search, chunks[0]);
        }
        if let Some(error) = state.error() {
            let banner = Paragraph::new(format!("{} (x to dismiss)", failure_text(error)))
                .style(Style::default().fg(Color::Red));
            frame.render_widget(banner, chunks[1]);
        }

        let ctx = table_context(&self.controller);
        self.table
            .render(frame, chunks[2], &self.table_ui, &ctx, self.tab.label());

        match state.overlay() {
            Overlay::CreateForm | Overlay::EditForm(_) => self.render_form(frame, area),
            Overlay::Detail(entity) => self.render_detail(frame, area, entity),
            Overlay::Closed => {}
        }
        if let Some(pending) = state.pending_delete() {
            let popup = centered_rect(50, 20, area);
            frame.render_widget(Clear, popup);
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(pending.prompt.clone()),
                    Line::default(),
                    Line::styled("y delete · n keep", Style::default().fg(Color::DarkGray)),
                ])
                .block(Block::default().borders(Borders::ALL).title("confirm")),
                popup,
            );
        }
    }
}

pub fn failure_text(failure: &EntityFailure) -> String {
    match failure.kind {
        FailureKind::Transport => format!(
            "{} -- the server did not answer, press r to retry",
            failure.message
        ),
        FailureKind::Business => failure.message.clone(),
    }
}

fn table_context<T: Clone, F: Clone>(
    controller: &EntityController<T, F>,
) -> TableContext<'_, T> {
    let state = controller.state();
    TableContext {
        rows: state.filtered(),
        total: state.items().len(),
        selection: state.selection(),
        all_selected: state.all_selected(),
        indeterminate: state.indeterminate(),
        loading: state.loading(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Dispatch, ResourceScreen, Screen};
    use crate::views::{payment_screen, property_screen};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rentadmin_app::{
        AppMode, CollaboratorError, Overlay, Payment, PaymentStatus, Property, PropertyFormInput,
        ResourceKind,
    };
    use rentadmin_testkit::{MemoryStore, demo_store};
    use time::macros::date;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_text(screen: &mut dyn Screen, text: &str) {
        for ch in text.chars() {
            screen.handle_key(key(KeyCode::Char(ch)));
        }
    }

    fn properties(store: &MemoryStore) -> ResourceScreen<Property, PropertyFormInput> {
        let mut screen = property_screen(store.backend::<Property>()).with_dispatch(Dispatch::Inline);
        screen.activate();
        screen
    }

    #[test]
    fn activation_loads_once() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = properties(&store);
        assert_eq!(screen.controller().state().items().len(), 6);
        assert!(screen.activate().is_none());
        assert_eq!(store.call_count(ResourceKind::Properties, "list"), 1);
        assert_eq!(screen.mode(), AppMode::Nav);
    }

    #[test]
    fn search_mode_filters_as_you_type() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = properties(&store);
        screen.handle_key(key(KeyCode::Char('/')));
        assert_eq!(screen.mode(), AppMode::Search);
        type_text(&mut screen, "casa");
        assert_eq!(screen.controller().state().search(), "casa");
        assert!(screen.controller().state().filtered_len() >= 2);

        screen.handle_key(ctrl('u'));
        type_text(&mut screen, "Calle GRAU");
        let text = screen.table_text();
        assert_eq!(text.len(), 2);
        assert!(text[1].contains("Casa B"));

        screen.handle_key(key(KeyCode::Esc));
        assert_eq!(screen.mode(), AppMode::Nav);
        assert_eq!(screen.controller().state().search(), "Calle GRAU");
    }

    #[test]
    fn add_form_validates_before_submitting() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = properties(&store);
        screen.handle_key(key(KeyCode::Char('a')));
        assert_eq!(screen.mode(), AppMode::Form);

        let outcome = screen.handle_key(ctrl('s'));
        assert!(
            outcome
                .status
                .as_deref()
                .is_some_and(|status| status.contains("name is required"))
        );
        assert_eq!(store.call_count(ResourceKind::Properties, "create"), 0);

        type_text(&mut screen, "Casa Nueva");
        screen.handle_key(key(KeyCode::Tab));
        type_text(&mut screen, "Jr. Lampa 300");
        for _ in 0..4 {
            screen.handle_key(key(KeyCode::Tab));
        }
        assert_eq!(screen.form_field(), 5);
        screen.handle_key(ctrl('u'));
        type_text(&mut screen, "950.00");
        let outcome = screen.handle_key(ctrl('s'));
        assert_eq!(outcome.status.as_deref(), Some("saved property 7"));

        assert_eq!(screen.mode(), AppMode::Nav);
        let stored = store.all::<Property>();
        assert_eq!(stored.len(), 7);
        assert_eq!(stored[6].name, "Casa Nueva");
        assert_eq!(stored[6].monthly_rent_cents, 95_000);
    }

    #[test]
    fn bad_field_input_stays_on_the_field() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = properties(&store);
        screen.handle_key(key(KeyCode::Char('a')));
        for _ in 0..5 {
            screen.handle_key(key(KeyCode::Tab));
        }
        type_text(&mut screen, "abc");
        screen.handle_key(key(KeyCode::Tab));
        assert_eq!(screen.form_field(), 5);
        assert!(screen.form_error().is_some());

        screen.handle_key(key(KeyCode::Esc));
        assert_eq!(screen.mode(), AppMode::Nav);
        assert_eq!(
            screen.controller().state().form(),
            &PropertyFormInput::blank()
        );
    }

    #[test]
    fn choice_fields_cycle_with_arrows() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = properties(&store);
        screen.handle_key(key(KeyCode::Char('a')));
        for _ in 0..3 {
            screen.handle_key(key(KeyCode::Tab));
        }
        screen.handle_key(key(KeyCode::Right));
        screen.handle_key(key(KeyCode::Tab));
        assert_eq!(screen.form_field(), 4);
        assert_eq!(
            screen.controller().state().form().kind,
            rentadmin_app::PropertyKind::Apartment
        );
    }

    #[test]
    fn delete_asks_for_confirmation_and_reports_refusal() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = properties(&store);

        let outcome = screen.handle_key(key(KeyCode::Char('d')));
        assert_eq!(outcome.status.as_deref(), Some("delete property \"Casa A\"? (y/n)"));
        assert_eq!(screen.mode(), AppMode::Confirm);

        screen.handle_key(key(KeyCode::Char('n')));
        assert_eq!(screen.mode(), AppMode::Nav);
        assert_eq!(store.call_count(ResourceKind::Properties, "delete"), 0);

        screen.handle_key(key(KeyCode::Char('d')));
        let outcome = screen.handle_key(key(KeyCode::Char('y')));
        assert_eq!(outcome.status.as_deref(), Some("failed to delete property"));
        assert_eq!(store.all::<Property>().len(), 6);

        screen.handle_key(key(KeyCode::Char('G')));
        screen.handle_key(key(KeyCode::Char('d')));
        screen.handle_key(key(KeyCode::Char('y')));
        assert_eq!(store.all::<Property>().len(), 5);
        assert!(screen.controller().state().error().is_none());
    }

    #[test]
    fn load_failure_is_retryable_from_nav() {
        let store = demo_store(date!(2026 - 03 - 15));
        store.fail_next(
            ResourceKind::Properties,
            CollaboratorError::Transport("connection refused".to_owned()),
        );
        let mut screen = property_screen(store.backend::<Property>()).with_dispatch(Dispatch::Inline);
        let status = screen.activate();
        assert!(status.is_some_and(|status| status.contains("press r to retry")));
        assert!(screen.controller().state().error().is_some());

        screen.handle_key(key(KeyCode::Char('r')));
        assert!(screen.controller().state().error().is_none());
        assert_eq!(screen.controller().state().items().len(), 6);
    }

    #[test]
    fn detail_view_opens_and_switches_to_edit() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = properties(&store);
        screen.handle_key(key(KeyCode::Enter));
        assert_eq!(screen.mode(), AppMode::Detail);

        screen.handle_key(key(KeyCode::Char('e')));
        assert_eq!(screen.mode(), AppMode::Form);
        assert!(matches!(
            screen.controller().state().overlay(),
            Overlay::EditForm(property) if property.name == "Casa A"
        ));
        assert_eq!(screen.controller().state().form().name, "Casa A");
    }

    #[test]
    fn menu_and_column_panel_drive_modes() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = properties(&store);
        screen.handle_key(key(KeyCode::Char('m')));
        assert_eq!(screen.mode(), AppMode::RowMenu);
        screen.handle_key(key(KeyCode::Enter));
        assert_eq!(screen.mode(), AppMode::Detail);
        screen.handle_key(key(KeyCode::Esc));

        screen.handle_key(key(KeyCode::Char('c')));
        assert_eq!(screen.mode(), AppMode::Columns);
        screen.handle_key(key(KeyCode::Char(' ')));
        assert!(!screen.table_ui().is_visible("name"));
        screen.handle_key(key(KeyCode::Esc));
        assert_eq!(screen.mode(), AppMode::Nav);
    }

    #[test]
    fn selection_survives_until_search_hides_rows() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = properties(&store);
        screen.handle_key(key(KeyCode::Char('A')));
        assert!(screen.controller().state().all_selected());
        assert!(screen.table_text()[0].starts_with("[x]"));

        screen.handle_key(key(KeyCode::Char('/')));
        type_text(&mut screen, "calle");
        assert_eq!(screen.controller().state().selection().len(), 1);
        assert!(screen.controller().state().all_selected());
    }

    #[test]
    fn mark_paid_action_submits_an_update() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = payment_screen(store.backend::<Payment>()).with_dispatch(Dispatch::Inline);
        screen.activate();

        let pending = store
            .all::<Payment>()
            .into_iter()
            .position(|payment| payment.status == PaymentStatus::Pending)
            .expect("demo data has a pending payment");
        for _ in 0..pending {
            screen.handle_key(key(KeyCode::Char('j')));
        }
        screen.handle_key(key(KeyCode::Char('m')));
        let outcome = screen.handle_key(key(KeyCode::Enter));
        assert!(outcome.status.is_some());

        let payments = store.all::<Payment>();
        assert_eq!(payments[pending].status, PaymentStatus::Paid);
        assert_eq!(screen.mode(), AppMode::Nav);
        assert_eq!(store.call_count(ResourceKind::Payments, "update"), 1);
    }

    #[test]
    fn threaded_dispatch_reports_through_poll() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = property_screen(store.backend::<Property>());
        assert_eq!(screen.activate().as_deref(), Some("loading properties"));
        assert!(screen.loading());

        let mut messages = Vec::new();
        for _ in 0..200 {
            messages.extend(screen.poll());
            if !screen.loading() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(!screen.loading());
        assert_eq!(messages, vec!["loaded 6 properties".to_owned()]);
    }

    fn drain(screen: &mut dyn Screen) -> Vec<String> {
        let mut messages = Vec::new();
        for _ in 0..200 {
            messages.extend(screen.poll());
            if !screen.loading() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        messages
    }

    #[test]
    fn threaded_save_confirmation_is_not_replaced_by_reload() {
        let store = demo_store(date!(2026 - 03 - 15));
        let mut screen = property_screen(store.backend::<Property>());
        screen.activate();
        assert_eq!(drain(&mut screen), vec!["loaded 6 properties".to_owned()]);

        screen.handle_key(key(KeyCode::Char('a')));
        type_text(&mut screen, "Casa Nueva");
        screen.handle_key(key(KeyCode::Tab));
        type_text(&mut screen, "Jr. Lampa 300");
        for _ in 0..4 {
            screen.handle_key(key(KeyCode::Tab));
        }
        screen.handle_key(ctrl('u'));
        type_text(&mut screen, "950.00");
        screen.handle_key(ctrl('s'));

        let messages = drain(&mut screen);
        assert!(!screen.loading());
        assert_eq!(messages, vec!["saved property 7".to_owned()]);
        assert_eq!(screen.controller().state().items().len(), 7);
        assert_eq!(store.call_count(ResourceKind::Properties, "list"), 2);

        screen.refresh();
        assert_eq!(drain(&mut screen), vec!["loaded 7 properties".to_owned()]);
    }
}
