//! Line-oriented interactive shell over a [`Session`].
//!
//! Each input line is parsed against the current panel into a
//! [`ShellCommand`], executed, and the panel is redrawn.

use std::io::{self, BufRead, Write};

use idnote_core::models::MAX_CONTENT_CHARS;
use idnote_core::session::{DetailView, ListView, Origin};
use idnote_core::{Action, Identifier, NoteStore, Session, View};

use crate::commands::common::{capture_editor_input_with_initial, format_last_modified};
use crate::error::CliError;

/// Rows shown per list page.
pub const PAGE_SIZE: usize = 20;

const HELP: &str = "\
home:    <digits> open note   list | l   quit | q
detail:  edit | e   editor | v   reload | r   list | l   back | b   home | h
editing: type lines to append   :w save   :q cancel   :clear   :e editor   ::text literal
list:    <n> open row n   open <id>   next | n   prev | p   top   refresh | r   back | b";

/// Input handling mode derived from the active panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Home,
    Reading,
    Editing,
    List,
}

impl Mode {
    #[must_use]
    pub fn of(view: &View) -> Self {
        match view {
            View::Home { .. } => Self::Home,
            View::Detail(detail) if detail.editing => Self::Editing,
            View::Detail(_) => Self::Reading,
            View::List(_) => Self::List,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Dispatch(Action),
    /// Raw Home input, filtered to digits then submitted
    Submit(String),
    /// 1-based row number on the list
    SelectNumber(usize),
    /// Identifier typed after `open`
    Open(String),
    ScrollBy(isize),
    AppendDraft(String),
    OpenEditor,
    Help,
    Quit,
    Noop,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Redraw,
    Quiet,
    Quit,
}

#[allow(clippy::cast_possible_wrap)]
const PAGE_STEP: isize = PAGE_SIZE as isize;

pub fn parse_command(mode: Mode, line: &str) -> ShellCommand {
    let raw = line.trim_end_matches(['\n', '\r']);
    if mode == Mode::Editing {
        return parse_editing(raw);
    }

    let trimmed = raw.trim();
    match trimmed {
        "" => return ShellCommand::Noop,
        "help" | "?" => return ShellCommand::Help,
        "quit" | "q" | "exit" => return ShellCommand::Quit,
        "home" | "h" => return ShellCommand::Dispatch(Action::Home),
        "back" | "b" => return ShellCommand::Dispatch(Action::Back),
        _ => {}
    }

    match (mode, trimmed) {
        (Mode::Home | Mode::Reading, "list" | "l") => ShellCommand::Dispatch(Action::ShowList),
        (Mode::Home, _) => ShellCommand::Submit(trimmed.to_string()),
        (Mode::Reading, "edit" | "e") => ShellCommand::Dispatch(Action::ToggleEdit),
        (Mode::Reading, "editor" | "v") => ShellCommand::OpenEditor,
        (Mode::Reading, "reload" | "r") => ShellCommand::Dispatch(Action::Reload),
        (Mode::List, _) => parse_list(trimmed),
        (Mode::Reading | Mode::Editing, other) => ShellCommand::Unknown(other.to_string()),
    }
}

fn parse_editing(raw: &str) -> ShellCommand {
    if let Some(literal) = raw.strip_prefix("::") {
        return ShellCommand::AppendDraft(format!(":{literal}"));
    }
    if !raw.starts_with(':') {
        return ShellCommand::AppendDraft(raw.to_string());
    }

    match raw.trim() {
        ":w" | ":save" => ShellCommand::Dispatch(Action::ToggleEdit),
        ":q" | ":cancel" => ShellCommand::Dispatch(Action::CancelEdit),
        ":clear" => ShellCommand::Dispatch(Action::EditDraft(String::new())),
        ":e" | ":editor" => ShellCommand::OpenEditor,
        ":reload" => ShellCommand::Dispatch(Action::Reload),
        ":back" => ShellCommand::Dispatch(Action::Back),
        ":home" => ShellCommand::Dispatch(Action::Home),
        ":help" => ShellCommand::Help,
        ":quit" => ShellCommand::Quit,
        other => ShellCommand::Unknown(other.to_string()),
    }
}

fn parse_list(trimmed: &str) -> ShellCommand {
    match trimmed {
        "next" | "n" => return ShellCommand::ScrollBy(PAGE_STEP),
        "prev" | "p" => return ShellCommand::ScrollBy(-PAGE_STEP),
        "top" => return ShellCommand::Dispatch(Action::Scroll(0)),
        "refresh" | "r" => return ShellCommand::Dispatch(Action::RefreshList),
        _ => {}
    }
    if let Some(identifier) = trimmed.strip_prefix("open ") {
        return ShellCommand::Open(identifier.trim().to_string());
    }
    trimmed.parse::<usize>().map_or_else(
        |_| ShellCommand::Unknown(trimmed.to_string()),
        ShellCommand::SelectNumber,
    )
}

pub async fn execute<S: NoteStore>(
    session: &Session<S>,
    command: ShellCommand,
    out: &mut impl Write,
) -> Result<Flow, CliError> {
    match command {
        ShellCommand::Dispatch(action) => session.dispatch(action).await?,
        ShellCommand::Submit(raw) => {
            let buffer = session.input(&raw)?;
            session.submit_identifier(&buffer).await?;
        }
        ShellCommand::SelectNumber(number) => {
            let View::List(list) = session.view() else {
                return Err(CliError::UnknownCommand(number.to_string()));
            };
            let row = number
                .checked_sub(1)
                .and_then(|index| list.rows.get(index))
                .ok_or(CliError::RowOutOfRange(number))?;
            session.select_row(&row.identifier).await?;
        }
        ShellCommand::Open(raw) => {
            let identifier = Identifier::parse(&raw)?;
            session.select_row(&identifier).await?;
        }
        ShellCommand::ScrollBy(delta) => {
            let View::List(list) = session.view() else {
                return Ok(Flow::Quiet);
            };
            let last = list.rows.len().saturating_sub(1);
            let offset = list.scroll_offset.saturating_add_signed(delta).min(last);
            session.scroll_list(offset)?;
        }
        ShellCommand::AppendDraft(text) => {
            let View::Detail(detail) = session.view() else {
                return Ok(Flow::Quiet);
            };
            let draft = if detail.content.is_empty() {
                text
            } else {
                format!("{}\n{}", detail.content, text)
            };
            session.set_draft(draft)?;
            return Ok(Flow::Quiet);
        }
        ShellCommand::OpenEditor => {
            let View::Detail(detail) = session.view() else {
                return Ok(Flow::Quiet);
            };
            session.begin_edit()?;
            let edited = capture_editor_input_with_initial(&detail.content)?;
            session.set_draft(edited)?;
        }
        ShellCommand::Help => {
            writeln!(out, "{HELP}")?;
            return Ok(Flow::Quiet);
        }
        ShellCommand::Quit => return Ok(Flow::Quit),
        ShellCommand::Noop => return Ok(Flow::Quiet),
        ShellCommand::Unknown(input) => return Err(CliError::UnknownCommand(input)),
    }
    Ok(Flow::Redraw)
}

pub fn prompt(view: &View) -> String {
    match view {
        View::Home { .. } => "idnote> ".to_string(),
        View::Detail(detail) if detail.editing => format!("{} edit> ", detail.identifier),
        View::Detail(detail) => format!("{}> ", detail.identifier),
        View::List(_) => "list> ".to_string(),
    }
}

pub fn render(view: &View) -> String {
    match view {
        View::Home { .. } => {
            "Enter an identifier to open its note, or `list`. Type `help` for commands."
                .to_string()
        }
        View::Detail(detail) => render_detail(detail),
        View::List(list) => render_list(list),
    }
}

fn render_detail(detail: &DetailView) -> String {
    let mut lines = Vec::new();
    let origin = match detail.origin {
        Origin::Home => "",
        Origin::List => "  (from list)",
    };
    lines.push(format!("# {}{origin}", detail.identifier));
    if detail.content.is_empty() {
        lines.push("(empty)".to_string());
    } else {
        lines.push(detail.content.clone());
    }
    lines.push(format!(
        "last modified: {}",
        format_last_modified(detail.last_modified)
    ));

    let status = if detail.saving { "  saving..." } else { "" };
    if detail.editing {
        lines.push(format!(
            "[{}] :w   cancel :q   {}/{MAX_CONTENT_CHARS} chars{status}",
            detail.action_label,
            detail.content.chars().count()
        ));
    } else {
        lines.push(format!(
            "[{}] e   reload r   list l   back b   home h{status}",
            detail.action_label
        ));
    }
    lines.join("\n")
}

fn render_list(list: &ListView) -> String {
    if let Some(error) = &list.error {
        return format!("Could not load notes: {error}\nType `refresh` to retry.");
    }
    if list.rows.is_empty() {
        return "No notes yet.".to_string();
    }

    let start = list.scroll_offset.min(list.rows.len());
    let end = (start + PAGE_SIZE).min(list.rows.len());
    let width = list.rows[start..end]
        .iter()
        .map(|row| row.identifier.as_str().len())
        .max()
        .unwrap_or(0);

    let mut lines = vec![format!("Notes ({})", list.rows.len())];
    for (index, row) in list.rows[start..end].iter().enumerate() {
        lines.push(format!(
            "{:>4}. {:<width$}  {}",
            start + index + 1,
            row.identifier,
            row.preview()
        ));
    }
    lines.push(format!(
        "rows {}-{} of {}   <n> open   next n   prev p",
        start + 1,
        end,
        list.rows.len()
    ));
    lines.join("\n")
}

pub async fn run_shell<S: NoteStore>(session: &Session<S>) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", render(&session.view()))?;

    let mut line = String::new();
    loop {
        write!(stdout, "{}", prompt(&session.view()))?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }

        let command = parse_command(Mode::of(&session.view()), &line);
        match execute(session, command, &mut stdout).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Quiet) => {}
            Ok(Flow::Redraw) => writeln!(stdout, "{}", render(&session.view()))?,
            Err(error) => {
                writeln!(stdout, "! {error}")?;
                writeln!(stdout, "{}", render(&session.view()))?;
            }
        }
    }

    Ok(())
}
