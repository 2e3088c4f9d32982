//! Panel state machine and navigation memory.

use std::fmt;

use crate::models::{Identifier, ListSnapshot};

/// Where a Detail panel was opened from; decides where "back" goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Home,
    List,
}

/// The active panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Home,
    Detail {
        identifier: Identifier,
        origin: Origin,
    },
    List,
}

impl Panel {
    #[must_use]
    pub const fn kind(&self) -> PanelKind {
        match self {
            Self::Home => PanelKind::Home,
            Self::Detail { .. } => PanelKind::Detail,
            Self::List => PanelKind::List,
        }
    }

    /// Identifier shown by the Detail panel, if that is the active panel
    #[must_use]
    pub const fn identifier(&self) -> Option<&Identifier> {
        match self {
            Self::Detail { identifier, .. } => Some(identifier),
            Self::Home | Self::List => None,
        }
    }
}

/// Panel without its payload, for permission checks and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Home,
    Detail,
    List,
}

impl PanelKind {
    /// Whether `action` may be issued while this panel is active.
    #[must_use]
    pub const fn allows(self, action: ActionKind) -> bool {
        use ActionKind as A;
        match self {
            Self::Home => matches!(
                action,
                A::Input | A::SubmitIdentifier | A::ShowList | A::Back | A::Home
            ),
            Self::Detail => matches!(
                action,
                A::ShowList
                    | A::Back
                    | A::Home
                    | A::ToggleEdit
                    | A::BeginEdit
                    | A::EditDraft
                    | A::CancelEdit
                    | A::Commit
                    | A::Reload
            ),
            Self::List => matches!(
                action,
                A::SelectRow | A::RefreshList | A::Scroll | A::Back | A::Home
            ),
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Home => "home",
            Self::Detail => "detail",
            Self::List => "list",
        })
    }
}

/// Named user actions, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Input,
    SubmitIdentifier,
    SelectRow,
    ShowList,
    RefreshList,
    Scroll,
    Back,
    Home,
    ToggleEdit,
    BeginEdit,
    EditDraft,
    CancelEdit,
    Commit,
    Reload,
}

impl ActionKind {
    /// Actions that operate on the note editor and need a loaded identifier.
    #[must_use]
    pub const fn needs_identifier(self) -> bool {
        matches!(
            self,
            Self::ToggleEdit
                | Self::BeginEdit
                | Self::EditDraft
                | Self::CancelEdit
                | Self::Commit
                | Self::Reload
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::SubmitIdentifier => "submit",
            Self::SelectRow => "open",
            Self::ShowList => "list",
            Self::RefreshList => "refresh",
            Self::Scroll => "scroll",
            Self::Back => "back",
            Self::Home => "home",
            Self::ToggleEdit => "toggle edit",
            Self::BeginEdit => "edit",
            Self::EditDraft => "draft",
            Self::CancelEdit => "cancel",
            Self::Commit => "save",
            Self::Reload => "reload",
        })
    }
}

/// Outcome of the last scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListState {
    /// No scan has completed yet
    #[default]
    NotLoaded,
    Loaded(ListSnapshot),
    /// Last scan failed; the next List entry scans again
    Failed(String),
}

impl ListState {
    #[must_use]
    pub const fn snapshot(&self) -> Option<&ListSnapshot> {
        match self {
            Self::Loaded(snapshot) => Some(snapshot),
            Self::NotLoaded | Self::Failed(_) => None,
        }
    }
}

/// Transient navigation state, reset whenever Home is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    panel: Panel,
    input: String,
    scroll_offset: usize,
    saved_scroll_offset: Option<usize>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            panel: Panel::Home,
            input: String::new(),
            scroll_offset: 0,
            saved_scroll_offset: None,
        }
    }
}

impl Navigation {
    #[must_use]
    pub const fn panel(&self) -> &Panel {
        &self.panel
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Whether the Detail panel for `identifier` is active
    #[must_use]
    pub fn is_detail_for(&self, identifier: &Identifier) -> bool {
        self.panel.identifier() == Some(identifier)
    }

    pub fn set_input(&mut self, filtered: String) {
        self.input = filtered;
    }

    pub fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll_offset = offset;
    }

    pub fn enter_home(&mut self) {
        *self = Self::default();
    }

    /// Open Detail; coming from the list remembers the current scroll offset.
    pub fn enter_detail(&mut self, identifier: Identifier, origin: Origin) {
        if origin == Origin::List {
            self.saved_scroll_offset = Some(self.scroll_offset);
        }
        self.panel = Panel::Detail { identifier, origin };
    }

    /// Open the list, either fresh at the top or restoring the saved offset.
    pub fn enter_list(&mut self, restore_scroll: bool) {
        self.scroll_offset = if restore_scroll {
            self.saved_scroll_offset.take().unwrap_or(0)
        } else {
            self.saved_scroll_offset = None;
            0
        };
        self.panel = Panel::List;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> Identifier {
        Identifier::parse(raw).unwrap()
    }

    #[test]
    fn test_enter_home_resets_everything() {
        let mut nav = Navigation::default();
        nav.set_input("123".to_string());
        nav.enter_list(false);
        nav.set_scroll_offset(9);
        nav.enter_detail(id("1"), Origin::List);

        nav.enter_home();
        assert_eq!(nav, Navigation::default());
    }

    #[test]
    fn test_detail_from_list_restores_scroll() {
        let mut nav = Navigation::default();
        nav.enter_list(false);
        nav.set_scroll_offset(14);
        nav.enter_detail(id("7"), Origin::List);
        assert!(nav.is_detail_for(&id("7")));

        nav.enter_list(true);
        assert_eq!(nav.scroll_offset(), 14);
        assert_eq!(nav.panel(), &Panel::List);
    }

    #[test]
    fn test_fresh_list_starts_at_top() {
        let mut nav = Navigation::default();
        nav.enter_list(false);
        nav.set_scroll_offset(5);
        nav.enter_detail(id("7"), Origin::List);
        nav.enter_list(false);
        assert_eq!(nav.scroll_offset(), 0);
    }

    #[test]
    fn test_panel_permissions() {
        assert!(PanelKind::Home.allows(ActionKind::SubmitIdentifier));
        assert!(!PanelKind::Home.allows(ActionKind::Commit));
        assert!(!PanelKind::List.allows(ActionKind::SubmitIdentifier));
        assert!(PanelKind::List.allows(ActionKind::SelectRow));
        assert!(PanelKind::Detail.allows(ActionKind::ShowList));
        assert!(!PanelKind::Detail.allows(ActionKind::SelectRow));
    }
}
