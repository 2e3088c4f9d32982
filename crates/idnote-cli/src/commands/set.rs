use idnote_core::{NoteStore, Session};

use crate::commands::common::{open_detail, resolve_set_content, save_content};
use crate::error::CliError;

pub async fn run_set<S: NoteStore>(
    session: &Session<S>,
    id: &str,
    content_parts: &[String],
) -> Result<(), CliError> {
    let content = resolve_set_content(content_parts)?;

    open_detail(session, id).await?;
    let record = save_content(session, content).await?;

    println!("{}", record.identifier);
    Ok(())
}
