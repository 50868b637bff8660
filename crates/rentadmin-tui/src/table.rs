// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Generic entity table: column visibility, per-row action menus, a
//! tri-state select-all header and single-column sorting. The table never
//! touches the entity state directly; it reports intents for the screen to
//! forward to its controller.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use rentadmin_app::truncate_text;
use std::cmp::Ordering;
use std::collections::BTreeSet;

const CHECKED: &str = "[x]";
const UNCHECKED: &str = "[ ]";
const PARTIAL: &str = "[-]";
const MENU_GLYPH: &str = "⋯";
const CURSOR_MARK: &str = "> ";

/// Rendered content of one cell. `Styled` cells bypass truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Styled(Line<'static>),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn plain(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Styled(line) => line
                .spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect(),
        }
    }
}

pub struct Column<T> {
    pub key: &'static str,
    pub label: &'static str,
    pub render: fn(&T) -> CellValue,
    pub sortable: bool,
    pub max_len: Option<usize>,
    /// Numeric ordering for columns whose text does not sort naturally.
    pub sort_by: Option<fn(&T) -> i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Number(i64),
    Text(String),
}

impl<T> Column<T> {
    pub fn new(key: &'static str, label: &'static str, render: fn(&T) -> CellValue) -> Self {
        Self {
            key,
            label,
            render,
            sortable: true,
            max_len: None,
            sort_by: None,
        }
    }

    pub fn sorted_by(mut self, key: fn(&T) -> i64) -> Self {
        self.sort_by = Some(key);
        self
    }

    pub fn truncated(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn cell(&self, entity: &T) -> CellValue {
        match ((self.render)(entity), self.max_len) {
            (CellValue::Text(value), Some(max_len)) => {
                CellValue::Text(truncate_text(&value, max_len))
            }
            (value, _) => value,
        }
    }

    fn sort_key(&self, entity: &T) -> SortKey {
        match self.sort_by {
            Some(key) => SortKey::Number(key(entity)),
            None => SortKey::Text(self.cell(entity).plain().to_lowercase()),
        }
    }
}

/// A resource-specific row action listed ahead of View, Edit and Delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowActionSpec {
    pub action: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Custom(usize),
    View,
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: &'static str,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    Empty,
    NoMatches,
    Rows,
}

/// What the table needs to know about the entity state for one frame.
pub struct TableContext<'a, T> {
    pub rows: Vec<&'a T>,
    pub total: usize,
    pub selection: &'a BTreeSet<i64>,
    pub all_selected: bool,
    pub indeterminate: bool,
    pub loading: bool,
}

impl<T> TableContext<'_, T> {
    pub fn body_state(&self) -> BodyState {
        if !self.rows.is_empty() {
            BodyState::Rows
        } else if self.total == 0 {
            BodyState::Empty
        } else {
            BodyState::NoMatches
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableUiState {
    visible: BTreeSet<&'static str>,
    cursor: usize,
    column: usize,
    sort: Option<SortSpec>,
    open_menu: Option<i64>,
    menu_cursor: usize,
    columns_open: bool,
    column_cursor: usize,
}

impl TableUiState {
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn open_menu(&self) -> Option<i64> {
        self.open_menu
    }

    pub fn menu_cursor(&self) -> usize {
        self.menu_cursor
    }

    pub fn columns_open(&self) -> bool {
        self.columns_open
    }

    pub fn column_cursor(&self) -> usize {
        self.column_cursor
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.visible.contains(key)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn has_popup(&self) -> bool {
        self.open_menu.is_some() || self.columns_open
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCommand {
    MoveRow(isize),
    JumpFirstRow,
    JumpLastRow,
    MoveColumn(isize),
    CycleSort,
    ToggleRow,
    ToggleAll,
    ViewRow,
    EditRow,
    DeleteRow,
    ToggleMenu,
    MoveMenu(isize),
    ChooseMenu,
    ToggleColumnPanel,
    MoveColumnCursor(isize),
    ToggleColumn,
    DismissOverlays,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableIntent {
    View(i64),
    Edit(i64),
    Delete { id: i64, name: String },
    Custom { action: &'static str, id: i64 },
    ToggleOne(i64),
    ToggleAll(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    SortAsc(&'static str),
    SortDesc(&'static str),
    SortCleared,
    SortUnavailable(&'static str),
    ColumnShown(&'static str),
    ColumnHidden(&'static str),
    NoRows,
}

impl TableStatus {
    pub fn message(self) -> String {
        match self {
            Self::SortAsc(label) => format!("sorted by {label} ascending"),
            Self::SortDesc(label) => format!("sorted by {label} descending"),
            Self::SortCleared => "sort cleared".to_owned(),
            Self::SortUnavailable(label) => format!("{label} is not sortable"),
            Self::ColumnShown(label) => format!("showing {label}"),
            Self::ColumnHidden(label) => format!("hid {label}"),
            Self::NoRows => "no rows".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOutcome {
    pub intent: Option<TableIntent>,
    pub status: Option<TableStatus>,
}

impl TableOutcome {
    fn intent(intent: TableIntent) -> Self {
        Self {
            intent: Some(intent),
            status: None,
        }
    }

    fn status(status: TableStatus) -> Self {
        Self {
            intent: None,
            status: Some(status),
        }
    }
}

pub struct EntityTable<T> {
    columns: Vec<Column<T>>,
    actions: Vec<RowActionSpec>,
    id: fn(&T) -> i64,
    name: fn(&T) -> String,
}

impl<T> EntityTable<T> {
    pub fn new(columns: Vec<Column<T>>, id: fn(&T) -> i64, name: fn(&T) -> String) -> Self {
        Self {
            columns,
            actions: Vec::new(),
            id,
            name,
        }
    }

    pub fn with_actions(mut self, actions: Vec<RowActionSpec>) -> Self {
        self.actions = actions;
        self
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Fresh UI state with every column visible.
    pub fn ui_state(&self) -> TableUiState {
        TableUiState {
            visible: self.columns.iter().map(|column| column.key).collect(),
            cursor: 0,
            column: 0,
            sort: None,
            open_menu: None,
            menu_cursor: 0,
            columns_open: false,
            column_cursor: 0,
        }
    }

    pub fn visible_columns<'a>(&'a self, ui: &TableUiState) -> Vec<&'a Column<T>> {
        self.columns
            .iter()
            .filter(|column| ui.visible.contains(column.key))
            .collect()
    }

    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        (0..self.actions.len())
            .map(MenuEntry::Custom)
            .chain([MenuEntry::View, MenuEntry::Edit, MenuEntry::Delete])
            .collect()
    }

    pub fn menu_label(&self, entry: MenuEntry) -> &'static str {
        match entry {
            MenuEntry::Custom(index) => self
                .actions
                .get(index)
                .map(|action| action.label)
                .unwrap_or("?"),
            MenuEntry::View => "View",
            MenuEntry::Edit => "Edit",
            MenuEntry::Delete => "Delete",
        }
    }

    /// Rows in display order. Sorting compares rendered text
    /// case-insensitively unless the column has a numeric key, and is stable
    /// so ties keep filter order.
    pub fn ordered<'a>(&self, ui: &TableUiState, rows: &[&'a T]) -> Vec<&'a T> {
        let Some(sort) = ui.sort else {
            return rows.to_vec();
        };
        let Some(column) = self.columns.iter().find(|column| column.key == sort.key) else {
            return rows.to_vec();
        };
        let mut keyed: Vec<(SortKey, &'a T)> = rows
            .iter()
            .map(|row| (column.sort_key(row), *row))
            .collect();
        keyed.sort_by(|left, right| {
            let ordering: Ordering = left.0.cmp(&right.0);
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        keyed.into_iter().map(|(_, row)| row).collect()
    }

    pub fn apply(
        &self,
        ui: &mut TableUiState,
        ctx: &TableContext<'_, T>,
        command: TableCommand,
    ) -> TableOutcome {
        let rows = self.ordered(ui, &ctx.rows);
        self.sync(ui, &rows);
        let current = rows.get(ui.cursor).copied();

        match command {
            TableCommand::MoveRow(delta) => {
                ui.cursor = step(ui.cursor, delta, rows.len());
                TableOutcome::default()
            }
            TableCommand::JumpFirstRow => {
                ui.cursor = 0;
                TableOutcome::default()
            }
            TableCommand::JumpLastRow => {
                ui.cursor = rows.len().saturating_sub(1);
                TableOutcome::default()
            }
            TableCommand::MoveColumn(delta) => {
                ui.column = step(ui.column, delta, ui.visible.len());
                TableOutcome::default()
            }
            TableCommand::CycleSort => self.cycle_sort(ui),
            TableCommand::ToggleRow => match current {
                Some(row) => TableOutcome::intent(TableIntent::ToggleOne((self.id)(row))),
                None => TableOutcome::status(TableStatus::NoRows),
            },
            TableCommand::ToggleAll => {
                TableOutcome::intent(TableIntent::ToggleAll(!ctx.all_selected))
            }
            TableCommand::ViewRow => self.row_intent(current, MenuEntry::View),
            TableCommand::EditRow => self.row_intent(current, MenuEntry::Edit),
            TableCommand::DeleteRow => self.row_intent(current, MenuEntry::Delete),
            TableCommand::ToggleMenu => {
                let Some(row) = current else {
                    return TableOutcome::status(TableStatus::NoRows);
                };
                let id = (self.id)(row);
                if ui.open_menu == Some(id) {
                    ui.open_menu = None;
                } else {
                    ui.open_menu = Some(id);
                    ui.menu_cursor = 0;
                    ui.columns_open = false;
                }
                TableOutcome::default()
            }
            TableCommand::MoveMenu(delta) => {
                ui.menu_cursor = step(ui.menu_cursor, delta, self.menu_entries().len());
                TableOutcome::default()
            }
            TableCommand::ChooseMenu => {
                let Some(id) = ui.open_menu.take() else {
                    return TableOutcome::default();
                };
                let row = rows.iter().copied().find(|row| (self.id)(row) == id);
                match self.menu_entries().get(ui.menu_cursor) {
                    Some(entry) => self.row_intent(row, *entry),
                    None => TableOutcome::default(),
                }
            }
            TableCommand::ToggleColumnPanel => {
                ui.columns_open = !ui.columns_open;
                if ui.columns_open {
                    ui.open_menu = None;
                }
                TableOutcome::default()
            }
            TableCommand::MoveColumnCursor(delta) => {
                ui.column_cursor = step(ui.column_cursor, delta, self.columns.len());
                TableOutcome::default()
            }
            TableCommand::ToggleColumn => match self.columns.get(ui.column_cursor) {
                Some(column) => self.toggle_column(ui, column.key),
                None => TableOutcome::default(),
            },
            TableCommand::DismissOverlays => {
                ui.open_menu = None;
                ui.columns_open = false;
                TableOutcome::default()
            }
        }
    }

    /// Show or hide a column by key. Hiding the last visible column is a
    /// silent no-op; the panel shows that checkbox as locked.
    pub fn toggle_column(&self, ui: &mut TableUiState, key: &'static str) -> TableOutcome {
        let Some(column) = self.columns.iter().find(|column| column.key == key) else {
            return TableOutcome::default();
        };
        if ui.visible.contains(key) {
            if ui.visible.len() == 1 {
                return TableOutcome::default();
            }
            ui.visible.remove(key);
            ui.column = ui.column.min(ui.visible.len().saturating_sub(1));
            TableOutcome::status(TableStatus::ColumnHidden(column.label))
        } else {
            ui.visible.insert(key);
            TableOutcome::status(TableStatus::ColumnShown(column.label))
        }
    }

    fn cycle_sort(&self, ui: &mut TableUiState) -> TableOutcome {
        let visible = self.visible_columns(ui);
        let Some(column) = visible.get(ui.column) else {
            return TableOutcome::default();
        };
        if !column.sortable {
            return TableOutcome::status(TableStatus::SortUnavailable(column.label));
        }
        let (sort, status) = match ui.sort {
            Some(SortSpec {
                key,
                direction: SortDirection::Asc,
            }) if key == column.key => (
                Some(SortSpec {
                    key,
                    direction: SortDirection::Desc,
                }),
                TableStatus::SortDesc(column.label),
            ),
            Some(SortSpec {
                key,
                direction: SortDirection::Desc,
            }) if key == column.key => (None, TableStatus::SortCleared),
            _ => (
                Some(SortSpec {
                    key: column.key,
                    direction: SortDirection::Asc,
                }),
                TableStatus::SortAsc(column.label),
            ),
        };
        ui.sort = sort;
        TableOutcome::status(status)
    }

    fn row_intent(&self, row: Option<&T>, entry: MenuEntry) -> TableOutcome {
        let Some(row) = row else {
            return TableOutcome::status(TableStatus::NoRows);
        };
        let id = (self.id)(row);
        let intent = match entry {
            MenuEntry::Custom(index) => match self.actions.get(index) {
                Some(action) => TableIntent::Custom {
                    action: action.action,
                    id,
                },
                None => return TableOutcome::default(),
            },
            MenuEntry::View => TableIntent::View(id),
            MenuEntry::Edit => TableIntent::Edit(id),
            MenuEntry::Delete => TableIntent::Delete {
                id,
                name: (self.name)(row),
            },
        };
        TableOutcome::intent(intent)
    }

    /// Clamp the cursor and close a menu whose row is gone.
    fn sync(&self, ui: &mut TableUiState, rows: &[&T]) {
        ui.cursor = ui.cursor.min(rows.len().saturating_sub(1));
        if let Some(id) = ui.open_menu {
            if !rows.iter().any(|row| (self.id)(row) == id) {
                ui.open_menu = None;
            }
        }
    }

    pub fn header_checkbox(ctx: &TableContext<'_, T>) -> &'static str {
        if ctx.all_selected {
            CHECKED
        } else if ctx.indeterminate {
            PARTIAL
        } else {
            UNCHECKED
        }
    }

    pub fn header_labels(&self, ui: &TableUiState) -> Vec<String> {
        self.visible_columns(ui)
            .into_iter()
            .map(|column| {
                let mut label = column.label.to_owned();
                match ui.sort {
                    Some(sort) if sort.key == column.key => {
                        label.push_str(match sort.direction {
                            SortDirection::Asc => " ↑",
                            SortDirection::Desc => " ↓",
                        });
                    }
                    _ => {}
                }
                label
            })
            .collect()
    }

    /// Plain-text rendering of the header and body, one string per line.
    pub fn render_text(&self, ui: &TableUiState, ctx: &TableContext<'_, T>) -> Vec<String> {
        let mut header = vec![Self::header_checkbox(ctx).to_owned()];
        header.extend(self.header_labels(ui));
        header.push(MENU_GLYPH.to_owned());
        let mut lines = vec![header.join(" | ")];

        match ctx.body_state() {
            BodyState::Empty => lines.push(empty_text(BodyState::Empty).to_owned()),
            BodyState::NoMatches => lines.push(empty_text(BodyState::NoMatches).to_owned()),
            BodyState::Rows => {
                let visible = self.visible_columns(ui);
                for row in self.ordered(ui, &ctx.rows) {
                    let mark = if ctx.selection.contains(&(self.id)(row)) {
                        CHECKED
                    } else {
                        UNCHECKED
                    };
                    let mut cells = vec![mark.to_owned()];
                    cells.extend(visible.iter().map(|column| column.cell(row).plain()));
                    cells.push(MENU_GLYPH.to_owned());
                    lines.push(cells.join(" | "));
                }
            }
        }
        lines
    }

    pub fn render_menu_text(&self, ui: &TableUiState) -> Vec<String> {
        self.menu_entries()
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let mark = if index == ui.menu_cursor {
                    CURSOR_MARK
                } else {
                    "  "
                };
                format!("{mark}{}", self.menu_label(entry))
            })
            .collect()
    }

    /// The last visible column is shown locked: it cannot be unchecked.
    pub fn render_column_panel_text(&self, ui: &TableUiState) -> Vec<String> {
        let last_visible = ui.visible.len() == 1;
        self.columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let mark = if index == ui.column_cursor {
                    CURSOR_MARK
                } else {
                    "  "
                };
                let visible = ui.visible.contains(column.key);
                let checkbox = if visible { CHECKED } else { UNCHECKED };
                let lock = if visible && last_visible {
                    " (locked)"
                } else {
                    ""
                };
                format!("{mark}{checkbox} {}{lock}", column.label)
            })
            .collect()
    }

    pub fn render(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        ui: &TableUiState,
        ctx: &TableContext<'_, T>,
        title: &str,
    ) {
        let title = if ctx.loading {
            format!("{title} (loading)")
        } else {
            format!("{title} ({}/{})", ctx.rows.len(), ctx.total)
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        let state = ctx.body_state();
        if state != BodyState::Rows {
            let empty = Paragraph::new(empty_text(state))
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let visible = self.visible_columns(ui);
        let mut widths = vec![Constraint::Length(3)];
        widths.extend(visible.iter().map(|_| Constraint::Min(6)));
        widths.push(Constraint::Length(1));

        let bold = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let mut header_cells = vec![Cell::from(Self::header_checkbox(ctx)).style(bold)];
        header_cells.extend(
            self.header_labels(ui)
                .into_iter()
                .enumerate()
                .map(|(index, label)| {
                    let style = if index == ui.column {
                        bold.fg(Color::Cyan)
                    } else {
                        bold
                    };
                    Cell::from(label).style(style)
                }),
        );
        header_cells.push(Cell::from(MENU_GLYPH).style(bold));

        let rows = self.ordered(ui, &ctx.rows);
        let body = rows.iter().map(|row| {
            let id = (self.id)(row);
            let mark = if ctx.selection.contains(&id) {
                CHECKED
            } else {
                UNCHECKED
            };
            let mut cells = vec![Cell::from(mark)];
            cells.extend(visible.iter().map(|column| match column.cell(row) {
                CellValue::Text(value) => Cell::from(value),
                CellValue::Styled(line) => Cell::from(line),
            }));
            let menu_style = if ui.open_menu == Some(id) {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            cells.push(Cell::from(MENU_GLYPH).style(menu_style));
            Row::new(cells)
        });

        let table = Table::new(body, widths)
            .header(Row::new(header_cells))
            .column_spacing(1)
            .row_highlight_style(Style::default().bg(Color::DarkGray))
            .block(block);
        let mut table_state = TableState::default().with_selected(Some(ui.cursor));
        frame.render_stateful_widget(table, area, &mut table_state);

        if ui.open_menu.is_some() {
            render_popup(frame, area, "actions", self.render_menu_text(ui));
        } else if ui.columns_open {
            render_popup(frame, area, "columns", self.render_column_panel_text(ui));
        }
    }
}

fn empty_text(state: BodyState) -> &'static str {
    match state {
        BodyState::Empty => "no entities",
        BodyState::NoMatches => "no search results",
        BodyState::Rows => "",
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len as isize - 1;
    (current as isize + delta).clamp(0, max) as usize
}

fn render_popup(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, lines: Vec<String>) {
    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
        .max(title.len()) as u16
        + 4;
    let height = lines.len() as u16 + 2;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 2,
        width: width.min(area.width),
        height: height.min(area.height.saturating_sub(2)),
    };
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines.join("\n")).block(Block::default().borders(Borders::ALL).title(title)),
        popup,
    );
}
