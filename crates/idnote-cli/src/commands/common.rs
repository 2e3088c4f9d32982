use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use idnote_core::models::{note_preview, ListRow};
use idnote_core::session::DetailView;
use idnote_core::{
    CachePolicy, NoteRecord, NoteStore, Session, StoreConfig, SupabaseNoteStore, View,
};
use serde::Serialize;

use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// Where note commands read and write.
pub enum Backend {
    Remote {
        store: SupabaseNoteStore,
        cache_policy: CachePolicy,
    },
    Ephemeral,
}

#[derive(Debug, Serialize)]
pub struct NoteItem {
    pub identifier: String,
    pub content: String,
    pub preview: String,
    pub last_modified: Option<String>,
}

impl From<&NoteRecord> for NoteItem {
    fn from(record: &NoteRecord) -> Self {
        Self {
            identifier: record.identifier.to_string(),
            content: record.content.clone(),
            preview: note_preview(&record.content),
            last_modified: record.last_modified.map(|time| time.to_rfc3339()),
        }
    }
}

impl From<&ListRow> for NoteItem {
    fn from(row: &ListRow) -> Self {
        Self {
            identifier: row.identifier.to_string(),
            content: row.content.clone(),
            preview: row.preview(),
            last_modified: row.last_modified.map(|time| time.to_rfc3339()),
        }
    }
}

pub fn resolve_backend(ephemeral: bool, profile_name: Option<&str>) -> Result<Backend, CliError> {
    if ephemeral {
        tracing::info!("Using ephemeral in-process store");
        return Ok(Backend::Ephemeral);
    }

    let env_config = StoreConfig::from_env()?;
    let profiles = CliProfilesConfig::load()?;
    let resolved_name = profiles.resolve_profile_name(profile_name);
    let config = select_store_config(env_config, profiles.profile(&resolved_name))?
        .ok_or(CliError::StoreNotConfigured)?;

    let store = SupabaseNoteStore::new(&config).map_err(idnote_core::Error::from)?;
    tracing::debug!(profile = %resolved_name, table = %config.table, "Resolved remote store");
    Ok(Backend::Remote {
        store,
        cache_policy: config.cache_policy,
    })
}

/// Environment settings win over the profile; `None` when neither is configured.
pub fn select_store_config(
    env_config: Option<StoreConfig>,
    profile: Option<&CliProfile>,
) -> Result<Option<StoreConfig>, CliError> {
    if let Some(config) = env_config {
        let cache_policy = profile.map_or_else(CachePolicy::default, |profile| {
            profile.cache_policy
        });
        return Ok(Some(StoreConfig {
            cache_policy,
            ..config
        }));
    }
    match profile {
        Some(profile) => profile.store_config(),
        None => Ok(None),
    }
}

/// Open the Detail panel for `id` from Home and return what it shows.
pub async fn open_detail<S: NoteStore>(
    session: &Session<S>,
    id: &str,
) -> Result<DetailView, CliError> {
    session.submit_identifier(id).await?;
    match session.view() {
        View::Detail(detail) => Ok(detail),
        View::Home { .. } | View::List(_) => Err(idnote_core::Error::NoIdentifier.into()),
    }
}

/// Replace the open note's content through the editor and save it.
pub async fn save_content<S: NoteStore>(
    session: &Session<S>,
    content: String,
) -> Result<NoteRecord, CliError> {
    session.begin_edit()?;
    session.set_draft(content)?;
    Ok(session.commit().await?)
}

pub fn format_row_lines(rows: &[ListRow]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|row| row.identifier.as_str().len())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|row| format!("{:<width$}  {}", row.identifier, row.preview()))
        .collect()
}

pub fn format_last_modified(last_modified: Option<DateTime<Utc>>) -> String {
    last_modified.map_or_else(
        || "never".to_string(),
        |time| {
            format!(
                "{} ({})",
                time.format("%Y-%m-%d %H:%M:%S UTC"),
                format_relative_time(time.timestamp_millis(), Utc::now().timestamp_millis())
            )
        },
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Content from arguments when any were given, otherwise from piped stdin.
///
/// An explicit empty argument clears the note.
pub fn resolve_set_content(content_parts: &[String]) -> Result<String, CliError> {
    if !content_parts.is_empty() {
        return Ok(content_parts.join(" "));
    }

    read_piped_stdin()?.ok_or(CliError::EmptyContent)
}

pub fn strip_trailing_newlines(content: &str) -> String {
    content.trim_end_matches(['\n', '\r']).to_string()
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(Some(strip_trailing_newlines(&buffer)))
}

pub fn capture_editor_input_with_initial(initial_content: &str) -> Result<String, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(strip_trailing_newlines(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("idnote-{}-{now}.txt", std::process::id()))
}
