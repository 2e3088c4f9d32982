use idnote_core::{NoteRecord, NoteStore, Session};

use crate::commands::common::{format_last_modified, open_detail, NoteItem};
use crate::error::CliError;

pub async fn run_show<S: NoteStore>(
    session: &Session<S>,
    id: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let detail = open_detail(session, id).await?;

    if as_json {
        let record = NoteRecord {
            identifier: detail.identifier,
            content: detail.content,
            last_modified: detail.last_modified,
        };
        println!("{}", serde_json::to_string_pretty(&NoteItem::from(&record))?);
    } else {
        if detail.content.is_empty() {
            eprintln!("{} has no note", detail.identifier);
        } else {
            println!("{}", detail.content);
        }
        tracing::debug!(
            identifier = %detail.identifier,
            last_modified = %format_last_modified(detail.last_modified),
            "Shown note"
        );
    }

    Ok(())
}
