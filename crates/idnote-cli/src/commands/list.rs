use idnote_core::{NoteStore, Session, View};

use crate::commands::common::{format_row_lines, NoteItem};
use crate::error::CliError;

pub async fn run_list<S: NoteStore>(session: &Session<S>, as_json: bool) -> Result<(), CliError> {
    session.show_list().await?;
    let View::List(list) = session.view() else {
        return Ok(());
    };

    if as_json {
        let json_items = list.rows.iter().map(NoteItem::from).collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if list.rows.is_empty() {
        eprintln!("No notes yet");
    } else {
        for line in format_row_lines(&list.rows) {
            println!("{line}");
        }
    }

    Ok(())
}
