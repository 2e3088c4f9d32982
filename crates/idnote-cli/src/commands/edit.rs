use idnote_core::{NoteStore, Session};

use crate::commands::common::{capture_editor_input_with_initial, open_detail, save_content};
use crate::error::CliError;

pub async fn run_edit<S: NoteStore>(session: &Session<S>, id: &str) -> Result<(), CliError> {
    let detail = open_detail(session, id).await?;

    let edited_content = capture_editor_input_with_initial(&detail.content)?;
    if edited_content == detail.content {
        println!("{}", detail.identifier);
        return Ok(());
    }

    let record = save_content(session, edited_content).await?;
    println!("{}", record.identifier);
    Ok(())
}
