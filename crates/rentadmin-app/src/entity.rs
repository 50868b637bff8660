// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Generic entity-management engine.
//!
//! Each resource screen configures one [`EntityController`] with pure
//! [`EntityHooks`] and an I/O [`EntityBackend`]. All state changes go through
//! [`EntityState::apply`]; network work leaves the reducer as
//! [`EntityEvent::Request`] and comes back as [`EntityCommand::Completed`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use crate::filter::{filter_indices, normalize_term};
use crate::{CollaboratorError, FailureKind, Page};

pub type LoadFn<T> = Arc<dyn Fn() -> Result<Page<T>, CollaboratorError> + Send + Sync>;
pub type CreateFn<T, F> = Arc<dyn Fn(&F) -> Result<T, CollaboratorError> + Send + Sync>;
pub type UpdateFn<T, F> = Arc<dyn Fn(i64, &F) -> Result<T, CollaboratorError> + Send + Sync>;
pub type DeleteFn = Arc<dyn Fn(i64) -> Result<(), CollaboratorError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMessages {
    pub load: &'static str,
    pub save: &'static str,
    pub delete: &'static str,
}

/// Pure, per-resource configuration. Immutable for the controller's lifetime.
#[derive(Debug, Clone)]
pub struct EntityHooks<T, F> {
    /// Singular label used in prompts and logs, e.g. `tenant`.
    pub resource: &'static str,
    pub id: fn(&T) -> i64,
    pub name: fn(&T) -> String,
    /// Receives the already normalized (trimmed, lower-cased) term.
    pub filter: fn(&T, &str) -> bool,
    pub to_form: fn(&T) -> F,
    pub initial_form: F,
    pub messages: ErrorMessages,
}

pub struct EntityBackend<T, F> {
    pub load: LoadFn<T>,
    pub create: CreateFn<T, F>,
    pub update: UpdateFn<T, F>,
    pub delete: DeleteFn,
}

impl<T, F> Clone for EntityBackend<T, F> {
    fn clone(&self) -> Self {
        Self {
            load: Arc::clone(&self.load),
            create: Arc::clone(&self.create),
            update: Arc::clone(&self.update),
            delete: Arc::clone(&self.delete),
        }
    }
}

impl<T, F> EntityBackend<T, F> {
    /// Perform one request against the collaborator. Blocks until it answers.
    pub fn execute(&self, request: &EntityRequest<F>) -> Completion<T> {
        match request {
            EntityRequest::Load { token } => Completion::Loaded {
                token: *token,
                result: (self.load)(),
            },
            EntityRequest::Create { token, form } => Completion::Saved {
                token: *token,
                result: (self.create)(form),
            },
            EntityRequest::Update { token, id, form } => Completion::Saved {
                token: *token,
                result: (self.update)(*id, form),
            },
            EntityRequest::Delete { token, id } => Completion::Removed {
                token: *token,
                result: (self.delete)(*id),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRequest<F> {
    Load { token: u64 },
    Create { token: u64, form: F },
    Update { token: u64, id: i64, form: F },
    Delete { token: u64, id: i64 },
}

impl<F> EntityRequest<F> {
    pub fn token(&self) -> u64 {
        match self {
            Self::Load { token }
            | Self::Create { token, .. }
            | Self::Update { token, .. }
            | Self::Delete { token, .. } => *token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion<T> {
    Loaded {
        token: u64,
        result: Result<Page<T>, CollaboratorError>,
    },
    Saved {
        token: u64,
        result: Result<T, CollaboratorError>,
    },
    Removed {
        token: u64,
        result: Result<(), CollaboratorError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityCommand<T, F> {
    Refresh,
    Search(String),
    OpenCreate,
    /// `form: None` maps the entity with [`EntityHooks::to_form`].
    BeginEdit {
        entity: T,
        form: Option<F>,
    },
    EditForm(F),
    Submit,
    Cancel,
    View(T),
    CloseView,
    Remove {
        id: i64,
        name: String,
    },
    ConfirmRemove,
    DismissRemove,
    ToggleAll(bool),
    ToggleOne(i64),
    ClearError,
    Completed(Completion<T>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityEvent<F> {
    Request(EntityRequest<F>),
    Loaded { count: usize },
    Saved { id: i64 },
    Deleted { id: i64 },
    Failed(EntityFailure),
    ConfirmRequested { prompt: String },
    FilterChanged { matches: usize },
    SelectionChanged { selected: usize },
    Rejected { reason: String },
    StaleDropped { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorScope {
    Load,
    Save,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFailure {
    pub scope: ErrorScope,
    pub message: String,
    pub kind: FailureKind,
}

/// The single modal surface. Variants are exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlay<T> {
    Closed,
    CreateForm,
    EditForm(T),
    Detail(T),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDelete {
    pub id: i64,
    pub name: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveTarget {
    Create,
    Update(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum InFlight {
    Load,
    Save(SaveTarget),
    Delete(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState<T, F> {
    items: Vec<T>,
    search: String,
    term: String,
    filtered: Vec<usize>,
    visible_ids: BTreeSet<i64>,
    selection: BTreeSet<i64>,
    overlay: Overlay<T>,
    form: F,
    pending_delete: Option<PendingDelete>,
    error: Option<EntityFailure>,
    in_flight: BTreeMap<u64, InFlight>,
    next_token: u64,
    latest_load: Option<u64>,
}

impl<T: Clone, F: Clone> EntityState<T, F> {
    pub fn new(initial_form: F) -> Self {
        Self {
            items: Vec::new(),
            search: String::new(),
            term: String::new(),
            filtered: Vec::new(),
            visible_ids: BTreeSet::new(),
            selection: BTreeSet::new(),
            overlay: Overlay::Closed,
            form: initial_form,
            pending_delete: None,
            error: None,
            in_flight: BTreeMap::new(),
            next_token: 1,
            latest_load: None,
        }
    }

    pub fn apply(
        &mut self,
        hooks: &EntityHooks<T, F>,
        command: EntityCommand<T, F>,
    ) -> Vec<EntityEvent<F>> {
        match command {
            EntityCommand::Refresh => vec![self.request_load(hooks)],
            EntityCommand::Search(raw) => {
                self.term = normalize_term(&raw);
                self.search = raw;
                let mut events = Vec::new();
                self.recompute_view(hooks, &mut events);
                events.insert(
                    0,
                    EntityEvent::FilterChanged {
                        matches: self.filtered.len(),
                    },
                );
                events
            }
            EntityCommand::OpenCreate => {
                if !matches!(self.overlay, Overlay::CreateForm) {
                    self.form = hooks.initial_form.clone();
                }
                self.overlay = Overlay::CreateForm;
                Vec::new()
            }
            EntityCommand::BeginEdit { entity, form } => {
                self.form = form.unwrap_or_else(|| (hooks.to_form)(&entity));
                self.overlay = Overlay::EditForm(entity);
                Vec::new()
            }
            EntityCommand::EditForm(form) => {
                self.form = form;
                Vec::new()
            }
            EntityCommand::Submit => self.submit(hooks),
            EntityCommand::Cancel => {
                if matches!(self.overlay, Overlay::CreateForm | Overlay::EditForm(_)) {
                    self.overlay = Overlay::Closed;
                }
                self.form = hooks.initial_form.clone();
                Vec::new()
            }
            EntityCommand::View(entity) => {
                self.overlay = Overlay::Detail(entity);
                Vec::new()
            }
            EntityCommand::CloseView => {
                if matches!(self.overlay, Overlay::Detail(_)) {
                    self.overlay = Overlay::Closed;
                }
                Vec::new()
            }
            EntityCommand::Remove { id, name } => {
                let prompt = format!("delete {} \"{}\"?", hooks.resource, name);
                self.pending_delete = Some(PendingDelete {
                    id,
                    name,
                    prompt: prompt.clone(),
                });
                vec![EntityEvent::ConfirmRequested { prompt }]
            }
            EntityCommand::ConfirmRemove => self.confirm_remove(hooks),
            EntityCommand::DismissRemove => {
                self.pending_delete = None;
                Vec::new()
            }
            EntityCommand::ToggleAll(checked) => {
                self.selection = if checked {
                    self.visible_ids.clone()
                } else {
                    BTreeSet::new()
                };
                vec![self.selection_changed()]
            }
            EntityCommand::ToggleOne(id) => {
                if !self.visible_ids.contains(&id) {
                    return Vec::new();
                }
                if !self.selection.remove(&id) {
                    self.selection.insert(id);
                }
                vec![self.selection_changed()]
            }
            EntityCommand::ClearError => {
                self.error = None;
                Vec::new()
            }
            EntityCommand::Completed(completion) => self.complete(hooks, completion),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn filtered(&self) -> Vec<&T> {
        self.filtered
            .iter()
            .filter_map(|index| self.items.get(*index))
            .collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn error(&self) -> Option<&EntityFailure> {
        self.error.as_ref()
    }

    pub fn overlay(&self) -> &Overlay<T> {
        &self.overlay
    }

    pub fn editing(&self) -> Option<&T> {
        match &self.overlay {
            Overlay::EditForm(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn viewing(&self) -> Option<&T> {
        match &self.overlay {
            Overlay::Detail(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn selection(&self) -> &BTreeSet<i64> {
        &self.selection
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selection.contains(&id)
    }

    pub fn all_selected(&self) -> bool {
        !self.visible_ids.is_empty() && self.selection.is_superset(&self.visible_ids)
    }

    pub fn indeterminate(&self) -> bool {
        !self.selection.is_empty()
            && self.selection.is_subset(&self.visible_ids)
            && self.selection.len() < self.visible_ids.len()
    }

    fn issue_token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token = self.next_token.saturating_add(1);
        token
    }

    fn request_load(&mut self, hooks: &EntityHooks<T, F>) -> EntityEvent<F> {
        let token = self.issue_token();
        self.in_flight.insert(token, InFlight::Load);
        self.latest_load = Some(token);
        tracing::debug!(resource = hooks.resource, token, "load requested");
        EntityEvent::Request(EntityRequest::Load { token })
    }

    fn mutation_in_flight(&self, id: Option<i64>) -> bool {
        self.in_flight.values().any(|op| match (op, id) {
            (InFlight::Save(SaveTarget::Create), None) => true,
            (InFlight::Save(SaveTarget::Update(busy)), Some(id))
            | (InFlight::Delete(busy), Some(id)) => *busy == id,
            _ => false,
        })
    }

    fn submit(&mut self, hooks: &EntityHooks<T, F>) -> Vec<EntityEvent<F>> {
        let target = match &self.overlay {
            Overlay::EditForm(entity) => SaveTarget::Update((hooks.id)(entity)),
            _ => SaveTarget::Create,
        };
        let busy_id = match target {
            SaveTarget::Create => None,
            SaveTarget::Update(id) => Some(id),
        };
        if self.mutation_in_flight(busy_id) {
            let reason = match target {
                SaveTarget::Create => format!("a new {} is already being saved", hooks.resource),
                SaveTarget::Update(id) => {
                    format!("{} {id} already has a change in flight", hooks.resource)
                }
            };
            tracing::info!(resource = hooks.resource, %reason, "submit rejected");
            return vec![EntityEvent::Rejected { reason }];
        }

        let token = self.issue_token();
        self.in_flight.insert(token, InFlight::Save(target));
        let form = self.form.clone();
        let request = match target {
            SaveTarget::Create => EntityRequest::Create { token, form },
            SaveTarget::Update(id) => EntityRequest::Update { token, id, form },
        };
        tracing::debug!(resource = hooks.resource, token, ?target, "save requested");
        vec![EntityEvent::Request(request)]
    }

    fn confirm_remove(&mut self, hooks: &EntityHooks<T, F>) -> Vec<EntityEvent<F>> {
        let Some(pending) = self.pending_delete.take() else {
            return Vec::new();
        };
        if self.mutation_in_flight(Some(pending.id)) {
            let reason = format!("{} {} already has a change in flight", hooks.resource, pending.id);
            tracing::info!(resource = hooks.resource, %reason, "delete rejected");
            return vec![EntityEvent::Rejected { reason }];
        }

        let token = self.issue_token();
        self.in_flight.insert(token, InFlight::Delete(pending.id));
        tracing::debug!(resource = hooks.resource, token, id = pending.id, "delete requested");
        vec![EntityEvent::Request(EntityRequest::Delete {
            token,
            id: pending.id,
        })]
    }

    fn complete(
        &mut self,
        hooks: &EntityHooks<T, F>,
        completion: Completion<T>,
    ) -> Vec<EntityEvent<F>> {
        match completion {
            Completion::Loaded { token, result } => {
                if self.in_flight.remove(&token).is_none() {
                    return Vec::new();
                }
                if self.latest_load != Some(token) {
                    tracing::debug!(resource = hooks.resource, token, "stale load dropped");
                    return vec![EntityEvent::StaleDropped { token }];
                }
                match result {
                    Ok(page) => {
                        self.replace_items(hooks, page.items);
                        if self.error.as_ref().map(|error| error.scope) == Some(ErrorScope::Load) {
                            self.error = None;
                        }
                        let mut events = vec![EntityEvent::Loaded {
                            count: self.items.len(),
                        }];
                        self.recompute_view(hooks, &mut events);
                        events
                    }
                    Err(error) => vec![self.fail(hooks, ErrorScope::Load, &error)],
                }
            }
            Completion::Saved { token, result } => {
                let Some(InFlight::Save(target)) = self.in_flight.remove(&token) else {
                    return Vec::new();
                };
                match result {
                    Ok(saved) => {
                        let id = (hooks.id)(&saved);
                        let bound = match (&self.overlay, target) {
                            (Overlay::CreateForm, SaveTarget::Create) => true,
                            (Overlay::EditForm(entity), SaveTarget::Update(target_id)) => {
                                (hooks.id)(entity) == target_id
                            }
                            _ => false,
                        };
                        if bound {
                            self.overlay = Overlay::Closed;
                            self.form = hooks.initial_form.clone();
                        }
                        if self.error.as_ref().map(|error| error.scope) == Some(ErrorScope::Save) {
                            self.error = None;
                        }
                        tracing::info!(resource = hooks.resource, id, "saved");
                        vec![EntityEvent::Saved { id }, self.request_load(hooks)]
                    }
                    Err(error) => vec![self.fail(hooks, ErrorScope::Save, &error)],
                }
            }
            Completion::Removed { token, result } => {
                let Some(InFlight::Delete(id)) = self.in_flight.remove(&token) else {
                    return Vec::new();
                };
                match result {
                    Ok(()) => {
                        self.selection.remove(&id);
                        if self.error.as_ref().map(|error| error.scope) == Some(ErrorScope::Delete)
                        {
                            self.error = None;
                        }
                        tracing::info!(resource = hooks.resource, id, "deleted");
                        vec![EntityEvent::Deleted { id }, self.request_load(hooks)]
                    }
                    Err(error) => vec![self.fail(hooks, ErrorScope::Delete, &error)],
                }
            }
        }
    }

    fn fail(
        &mut self,
        hooks: &EntityHooks<T, F>,
        scope: ErrorScope,
        error: &CollaboratorError,
    ) -> EntityEvent<F> {
        let message = match scope {
            ErrorScope::Load => hooks.messages.load,
            ErrorScope::Save => hooks.messages.save,
            ErrorScope::Delete => hooks.messages.delete,
        };
        tracing::warn!(resource = hooks.resource, ?scope, %error, "request failed");
        let failure = EntityFailure {
            scope,
            message: message.to_owned(),
            kind: error.kind(),
        };
        self.error = Some(failure.clone());
        EntityEvent::Failed(failure)
    }

    fn replace_items(&mut self, hooks: &EntityHooks<T, F>, mut items: Vec<T>) {
        let received = items.len();
        let mut seen = BTreeSet::new();
        items.retain(|item| seen.insert((hooks.id)(item)));
        if items.len() < received {
            tracing::warn!(
                resource = hooks.resource,
                dropped = received - items.len(),
                "duplicate ids in list response"
            );
        }
        self.items = items;
    }

    /// Recompute the filtered projection and drop selected ids it no longer
    /// contains.
    fn recompute_view(&mut self, hooks: &EntityHooks<T, F>, events: &mut Vec<EntityEvent<F>>) {
        self.filtered = filter_indices(&self.items, &self.term, hooks.filter);
        self.visible_ids = self
            .filtered
            .iter()
            .filter_map(|index| self.items.get(*index))
            .map(hooks.id)
            .collect();

        let before = self.selection.len();
        let visible = &self.visible_ids;
        self.selection.retain(|id| visible.contains(id));
        if self.selection.len() != before {
            events.push(self.selection_changed());
        }
    }

    fn selection_changed(&self) -> EntityEvent<F> {
        EntityEvent::SelectionChanged {
            selected: self.selection.len(),
        }
    }
}

pub struct EntityController<T, F> {
    hooks: EntityHooks<T, F>,
    backend: EntityBackend<T, F>,
    state: EntityState<T, F>,
}

impl<T: Clone, F: Clone> EntityController<T, F> {
    pub fn new(hooks: EntityHooks<T, F>, backend: EntityBackend<T, F>) -> Self {
        let state = EntityState::new(hooks.initial_form.clone());
        Self {
            hooks,
            backend,
            state,
        }
    }

    pub fn hooks(&self) -> &EntityHooks<T, F> {
        &self.hooks
    }

    pub fn backend(&self) -> &EntityBackend<T, F> {
        &self.backend
    }

    pub fn state(&self) -> &EntityState<T, F> {
        &self.state
    }

    pub fn dispatch(&mut self, command: EntityCommand<T, F>) -> Vec<EntityEvent<F>> {
        self.state.apply(&self.hooks, command)
    }

    /// Dispatch `command` and execute every request it causes on the calling
    /// thread until the controller is idle.
    pub fn run(&mut self, command: EntityCommand<T, F>) -> Vec<EntityEvent<F>> {
        let mut queue = VecDeque::from([command]);
        let mut events = Vec::new();
        while let Some(command) = queue.pop_front() {
            for event in self.dispatch(command) {
                if let EntityEvent::Request(request) = &event {
                    queue.push_back(EntityCommand::Completed(self.backend.execute(request)));
                }
                events.push(event);
            }
        }
        events
    }

    pub fn refresh(&mut self) -> Vec<EntityEvent<F>> {
        self.dispatch(EntityCommand::Refresh)
    }

    pub fn submit(&mut self) -> Vec<EntityEvent<F>> {
        self.dispatch(EntityCommand::Submit)
    }

    pub fn begin_edit(&mut self, entity: T, mapper: Option<fn(&T) -> F>) -> Vec<EntityEvent<F>> {
        let form = mapper.map(|mapper| mapper(&entity));
        self.dispatch(EntityCommand::BeginEdit { entity, form })
    }

    pub fn remove(&mut self, id: i64, display_name: impl Into<String>) -> Vec<EntityEvent<F>> {
        self.dispatch(EntityCommand::Remove {
            id,
            name: display_name.into(),
        })
    }

    pub fn cancel(&mut self) -> Vec<EntityEvent<F>> {
        self.dispatch(EntityCommand::Cancel)
    }

    pub fn view(&mut self, entity: T) -> Vec<EntityEvent<F>> {
        self.dispatch(EntityCommand::View(entity))
    }

    pub fn search(&mut self, term: impl Into<String>) -> Vec<EntityEvent<F>> {
        self.dispatch(EntityCommand::Search(term.into()))
    }

    pub fn toggle_all(&mut self, checked: bool) -> Vec<EntityEvent<F>> {
        self.dispatch(EntityCommand::ToggleAll(checked))
    }

    pub fn toggle_one(&mut self, id: i64) -> Vec<EntityEvent<F>> {
        self.dispatch(EntityCommand::ToggleOne(id))
    }

    pub fn id_of(&self, entity: &T) -> i64 {
        (self.hooks.id)(entity)
    }

    pub fn name_of(&self, entity: &T) -> String {
        (self.hooks.name)(entity)
    }

    pub fn find(&self, id: i64) -> Option<&T> {
        self.state
            .items()
            .iter()
            .find(|entity| (self.hooks.id)(entity) == id)
    }
}
