//! Session state: panels, editor, cache and list snapshot for one running instance.
//!
//! Every user action goes through [`Session::dispatch`] (or the matching
//! method), which checks the action against the active panel before doing
//! anything. Handlers take `&self`, so a pending save does not block other
//! actions; internal state is only locked between await points.

mod editor;
mod view;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::cache::NoteCache;
use crate::config::CachePolicy;
use crate::error::{Error, Result};
use crate::models::{
    filter_identifier_input, validate_content, Identifier, ListRow, ListSnapshot, NoteRecord,
};
use crate::store::NoteStore;

pub use editor::{EditorState, SaveGuard, EDIT_LABEL, SAVE_LABEL};
pub use view::{ActionKind, ListState, Navigation, Origin, Panel, PanelKind};

/// A user action with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Home input changed; the buffer keeps only digits
    Input(String),
    /// Enter pressed on Home with this raw value
    SubmitIdentifier(String),
    /// List row clicked
    SelectRow(Identifier),
    ShowList,
    RefreshList,
    /// List scrolled to this row offset
    Scroll(usize),
    Back,
    Home,
    /// Edit/Save control: begins editing, or commits when already editing
    ToggleEdit,
    BeginEdit,
    EditDraft(String),
    CancelEdit,
    Commit,
    /// Load the current note from the store, bypassing the cache
    Reload,
}

impl Action {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Input(_) => ActionKind::Input,
            Self::SubmitIdentifier(_) => ActionKind::SubmitIdentifier,
            Self::SelectRow(_) => ActionKind::SelectRow,
            Self::ShowList => ActionKind::ShowList,
            Self::RefreshList => ActionKind::RefreshList,
            Self::Scroll(_) => ActionKind::Scroll,
            Self::Back => ActionKind::Back,
            Self::Home => ActionKind::Home,
            Self::ToggleEdit => ActionKind::ToggleEdit,
            Self::BeginEdit => ActionKind::BeginEdit,
            Self::EditDraft(_) => ActionKind::EditDraft,
            Self::CancelEdit => ActionKind::CancelEdit,
            Self::Commit => ActionKind::Commit,
            Self::Reload => ActionKind::Reload,
        }
    }
}

/// Owned rendering of the active panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home { input: String },
    Detail(DetailView),
    List(ListView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub identifier: Identifier,
    pub origin: Origin,
    pub content: String,
    pub editing: bool,
    pub saving: bool,
    pub last_modified: Option<DateTime<Utc>>,
    pub action_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub rows: Vec<ListRow>,
    /// Inline error from the last failed scan
    pub error: Option<String>,
    pub scroll_offset: usize,
}

#[derive(Debug, Default)]
struct SessionState {
    navigation: Navigation,
    editor: EditorState,
    list: ListState,
    cache: NoteCache,
}

/// One running instance of the note tool.
pub struct Session<S> {
    store: S,
    cache_policy: CachePolicy,
    state: Mutex<SessionState>,
    saving: AtomicBool,
}

impl<S: NoteStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self::with_cache_policy(store, CachePolicy::default())
    }

    pub fn with_cache_policy(store: S, cache_policy: CachePolicy) -> Self {
        Self {
            store,
            cache_policy,
            state: Mutex::new(SessionState::default()),
            saving: AtomicBool::new(false),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn panel(&self) -> Panel {
        self.state().navigation.panel().clone()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Cached content for `identifier`, if any
    pub fn cached(&self, identifier: &Identifier) -> Option<NoteRecord> {
        self.state().cache.record(identifier)
    }

    pub fn list_snapshot(&self) -> Option<ListSnapshot> {
        self.state().list.snapshot().cloned()
    }

    /// Render the active panel.
    pub fn view(&self) -> View {
        let state = self.state();
        match state.navigation.panel() {
            Panel::Home => View::Home {
                input: state.navigation.input().to_string(),
            },
            Panel::Detail { identifier, origin } => View::Detail(DetailView {
                identifier: identifier.clone(),
                origin: *origin,
                content: state.editor.displayed().to_string(),
                editing: state.editor.is_editing(),
                saving: self.is_saving(),
                last_modified: state.editor.last_modified(),
                action_label: state.editor.action_label(),
            }),
            Panel::List => {
                let (rows, error) = match &state.list {
                    ListState::Loaded(snapshot) => (snapshot.rows().to_vec(), None),
                    ListState::Failed(message) => (Vec::new(), Some(message.clone())),
                    ListState::NotLoaded => (Vec::new(), None),
                };
                View::List(ListView {
                    rows,
                    error,
                    scroll_offset: state.navigation.scroll_offset(),
                })
            }
        }
    }

    /// Run the handler registered for `action`.
    pub async fn dispatch(&self, action: Action) -> Result<()> {
        match action {
            Action::Input(raw) => self.input(&raw).map(drop),
            Action::SubmitIdentifier(raw) => self.submit_identifier(&raw).await,
            Action::SelectRow(identifier) => self.select_row(&identifier).await,
            Action::ShowList => self.show_list().await,
            Action::RefreshList => self.refresh_list().await,
            Action::Scroll(offset) => self.scroll_list(offset),
            Action::Back => self.back().await,
            Action::Home => {
                self.go_home();
                Ok(())
            }
            Action::ToggleEdit => self.toggle_edit().await,
            Action::BeginEdit => self.begin_edit(),
            Action::EditDraft(text) => self.set_draft(text),
            Action::CancelEdit => self.cancel_edit().await,
            Action::Commit => self.commit().await.map(drop),
            Action::Reload => self.reload().await,
        }
    }

    fn ensure_allowed(&self, action: ActionKind) -> Result<()> {
        let panel = self.state().navigation.panel().kind();
        if panel.allows(action) {
            Ok(())
        } else if action.needs_identifier() {
            Err(Error::NoIdentifier)
        } else {
            Err(Error::ActionUnavailable { action, panel })
        }
    }

    fn current_identifier(&self) -> Result<Identifier> {
        self.state()
            .navigation
            .panel()
            .identifier()
            .cloned()
            .ok_or(Error::NoIdentifier)
    }

    // ----------------------------------------------------------------------
    // Home
    // ----------------------------------------------------------------------

    /// Update the Home input, dropping non-digit characters. Returns the buffer.
    pub fn input(&self, raw: &str) -> Result<String> {
        self.ensure_allowed(ActionKind::Input)?;
        let filtered = filter_identifier_input(raw);
        self.state().navigation.set_input(filtered.clone());
        Ok(filtered)
    }

    /// Validate `raw` and open its Detail panel (Home → Detail).
    pub async fn submit_identifier(&self, raw: &str) -> Result<()> {
        self.ensure_allowed(ActionKind::SubmitIdentifier)?;
        let identifier = Identifier::parse(raw)?;

        {
            let mut state = self.state();
            state.navigation.enter_detail(identifier.clone(), Origin::Home);
            state.editor.reset();
        }
        tracing::debug!(%identifier, "Opened note from home");
        self.load(&identifier, false).await
    }

    /// Return to Home from any panel, clearing all transient state.
    pub fn go_home(&self) {
        let mut state = self.state();
        state.navigation.enter_home();
        state.editor.reset();
    }

    // ----------------------------------------------------------------------
    // List
    // ----------------------------------------------------------------------

    /// Open the list (Home/Detail → List), scanning only if no snapshot exists.
    pub async fn show_list(&self) -> Result<()> {
        self.ensure_allowed(ActionKind::ShowList)?;
        let has_snapshot = {
            let mut state = self.state();
            state.navigation.enter_list(false);
            state.editor.reset();
            state.list.snapshot().is_some()
        };

        if has_snapshot {
            Ok(())
        } else {
            self.scan().await
        }
    }

    /// Scan again while the list is shown.
    pub async fn refresh_list(&self) -> Result<()> {
        self.ensure_allowed(ActionKind::RefreshList)?;
        self.scan().await
    }

    pub fn scroll_list(&self, offset: usize) -> Result<()> {
        self.ensure_allowed(ActionKind::Scroll)?;
        self.state().navigation.set_scroll_offset(offset);
        Ok(())
    }

    /// Open the Detail panel for a list row (List → Detail), remembering the scroll offset.
    pub async fn select_row(&self, identifier: &Identifier) -> Result<()> {
        self.ensure_allowed(ActionKind::SelectRow)?;
        {
            let mut state = self.state();
            let known = state
                .list
                .snapshot()
                .is_some_and(|snapshot| snapshot.row(identifier).is_some());
            if !known {
                return Err(Error::UnknownRow(identifier.clone()));
            }
            state.navigation.enter_detail(identifier.clone(), Origin::List);
            state.editor.reset();
        }
        tracing::debug!(%identifier, "Opened note from list");
        self.load(identifier, false).await
    }

    async fn scan(&self) -> Result<()> {
        match self.store.scan().await {
            Ok(records) => {
                let snapshot = ListSnapshot::from_records(records);
                tracing::debug!(rows = snapshot.len(), "Scanned notes");
                self.state().list = ListState::Loaded(snapshot);
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Failed to scan notes: {}", error);
                self.state().list = ListState::Failed(error.to_string());
                Err(error.into())
            }
        }
    }

    // ----------------------------------------------------------------------
    // Back
    // ----------------------------------------------------------------------

    /// Go back one level: Detail returns to its origin, List returns Home.
    pub async fn back(&self) -> Result<()> {
        self.ensure_allowed(ActionKind::Back)?;
        let needs_scan = {
            let mut state = self.state();
            match state.navigation.panel().clone() {
                Panel::Detail {
                    origin: Origin::List,
                    ..
                } => {
                    state.navigation.enter_list(true);
                    state.editor.reset();
                    state.list.snapshot().is_none()
                }
                Panel::Detail {
                    origin: Origin::Home,
                    ..
                }
                | Panel::List
                | Panel::Home => {
                    state.navigation.enter_home();
                    state.editor.reset();
                    false
                }
            }
        };

        if needs_scan {
            self.scan().await
        } else {
            Ok(())
        }
    }

    // ----------------------------------------------------------------------
    // Editor
    // ----------------------------------------------------------------------

    /// Show the note for `identifier` in the editor.
    ///
    /// With [`CachePolicy::PreferCache`] a cached note is shown without a
    /// remote call unless `bypass_cache` is set. A missing row loads as an
    /// empty note. On failure the editor is left empty.
    pub async fn load(&self, identifier: &Identifier, bypass_cache: bool) -> Result<()> {
        if !bypass_cache && self.cache_policy == CachePolicy::PreferCache {
            let cached = self.state().cache.record(identifier);
            if let Some(record) = cached {
                tracing::debug!(%identifier, "Cache hit");
                let mut state = self.state();
                if state.navigation.is_detail_for(identifier) {
                    state.editor.show(&record);
                }
                return Ok(());
            }
        }

        match self.store.fetch(identifier).await {
            Ok(found) => {
                let record = found.unwrap_or_else(|| NoteRecord::unset(identifier.clone()));
                let mut state = self.state();
                state.cache.insert(&record);
                if state.navigation.is_detail_for(identifier) {
                    state.editor.show(&record);
                }
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%identifier, "Failed to load note: {}", error);
                let mut state = self.state();
                if state.navigation.is_detail_for(identifier) && !state.editor.is_editing() {
                    state.editor.reset();
                }
                Err(error.into())
            }
        }
    }

    /// Reload the current note from the store and leave edit mode.
    pub async fn reload(&self) -> Result<()> {
        self.ensure_allowed(ActionKind::Reload)?;
        let identifier = self.current_identifier()?;
        self.state().editor.end_edit();
        self.load(&identifier, true).await
    }

    /// Edit when read-only, save when editing.
    pub async fn toggle_edit(&self) -> Result<()> {
        self.ensure_allowed(ActionKind::ToggleEdit)?;
        let editing = self.state().editor.is_editing();
        if editing {
            self.commit().await.map(drop)
        } else {
            self.begin_edit()
        }
    }

    pub fn begin_edit(&self) -> Result<()> {
        self.ensure_allowed(ActionKind::BeginEdit)?;
        self.state().editor.begin_edit();
        Ok(())
    }

    /// Replace the draft text; only while editing.
    pub fn set_draft(&self, text: String) -> Result<()> {
        self.ensure_allowed(ActionKind::EditDraft)?;
        let mut state = self.state();
        if !state.editor.is_editing() {
            return Err(Error::NotEditing);
        }
        state.editor.set_draft(text);
        Ok(())
    }

    /// Discard the draft and show the stored note again.
    pub async fn cancel_edit(&self) -> Result<()> {
        self.ensure_allowed(ActionKind::CancelEdit)?;
        let identifier = self.current_identifier()?;
        {
            let mut state = self.state();
            if !state.editor.is_editing() {
                return Ok(());
            }
            state.editor.end_edit();
        }
        self.load(&identifier, false).await
    }

    /// Save the draft for the current identifier.
    ///
    /// Rejected without a remote call when another save is pending or the
    /// draft is over the length limit. On failure the editor stays in edit
    /// mode with the draft intact, and so does a draft edited while the save
    /// was pending.
    pub async fn commit(&self) -> Result<NoteRecord> {
        self.ensure_allowed(ActionKind::Commit)?;
        let (identifier, draft) = {
            let state = self.state();
            let identifier = state
                .navigation
                .panel()
                .identifier()
                .cloned()
                .ok_or(Error::NoIdentifier)?;
            if !state.editor.is_editing() {
                return Err(Error::NotEditing);
            }
            (identifier, state.editor.draft().to_string())
        };

        let _guard = SaveGuard::claim(&self.saving).ok_or(Error::SaveInProgress)?;
        validate_content(&draft)?;

        match self.store.upsert(&identifier, &draft).await {
            Ok(record) => {
                let mut state = self.state();
                state.cache.insert(&record);
                if let ListState::Loaded(snapshot) = &mut state.list {
                    snapshot.patch(&record);
                }
                if state.navigation.is_detail_for(&identifier) {
                    state.editor.saved(&record, &draft);
                }
                tracing::info!(%identifier, "Saved note");
                Ok(record)
            }
            Err(error) => {
                tracing::warn!(%identifier, "Failed to save note: {}", error);
                Err(error.into())
            }
        }
    }
}
