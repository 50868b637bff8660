// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::TabKind;

/// Where keyboard input goes on the active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Search,
    Form,
    Detail,
    Confirm,
    Columns,
    RowMenu,
}

impl AppMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nav => "NAV",
            Self::Search => "SEARCH",
            Self::Form => "FORM",
            Self::Detail => "DETAIL",
            Self::Confirm => "CONFIRM",
            Self::Columns => "COLUMNS",
            Self::RowMenu => "MENU",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub mode: AppMode,
    pub active_tab: TabKind,
    pub show_help: bool,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_tab: TabKind::Dashboard,
            show_help: false,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    SelectTab(TabKind),
    SetMode(AppMode),
    ToggleHelp,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppEvent {
    ModeChanged(AppMode),
    TabChanged(TabKind),
    HelpChanged(bool),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn with_tab(tab: TabKind) -> Self {
        Self {
            active_tab: tab,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::SelectTab(tab) => {
                if tab == self.active_tab {
                    return Vec::new();
                }
                self.switch_to(tab)
            }
            AppCommand::SetMode(mode) => {
                if mode == self.mode {
                    return Vec::new();
                }
                self.mode = mode;
                vec![AppEvent::ModeChanged(mode)]
            }
            AppCommand::ToggleHelp => {
                self.show_help = !self.show_help;
                vec![AppEvent::HelpChanged(self.show_help)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.switch_to(tabs[next])
    }

    /// Changing tabs always lands in nav mode; overlays belong to the screen
    /// being left.
    fn switch_to(&mut self, tab: TabKind) -> Vec<AppEvent> {
        self.active_tab = tab;
        let mut events = vec![AppEvent::TabChanged(tab)];
        if self.mode != AppMode::Nav {
            self.mode = AppMode::Nav;
            events.push(AppEvent::ModeChanged(AppMode::Nav));
        }
        events
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
