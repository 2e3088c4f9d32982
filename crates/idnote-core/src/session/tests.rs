use std::sync::atomic::{AtomicBool, Ordering};

use pretty_assertions::assert_eq;
use tokio::sync::Notify;

use super::*;
use crate::models::{MAX_CONTENT_CHARS, PREVIEW_ELLIPSIS};
use crate::store::{MemoryNoteStore, StoreError, StoreResult, StoreStats};

fn id(raw: &str) -> Identifier {
    Identifier::parse(raw).unwrap()
}

fn seeded(rows: &[(&str, &str)]) -> MemoryNoteStore {
    MemoryNoteStore::with_records(
        rows.iter()
            .map(|(raw, content)| NoteRecord::new(id(raw), *content)),
    )
}

fn detail<S: NoteStore>(session: &Session<S>) -> DetailView {
    match session.view() {
        View::Detail(detail) => detail,
        other => panic!("expected detail view, got {other:?}"),
    }
}

fn list<S: NoteStore>(session: &Session<S>) -> ListView {
    match session.view() {
        View::List(list) => list,
        other => panic!("expected list view, got {other:?}"),
    }
}

/// Store whose calls fail while `failing` is set.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryNoteStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Api("service unavailable (503)".to_string()))
        } else {
            Ok(())
        }
    }
}

impl NoteStore for FlakyStore {
    async fn fetch(&self, identifier: &Identifier) -> StoreResult<Option<NoteRecord>> {
        self.check()?;
        self.inner.fetch(identifier).await
    }

    async fn upsert(&self, identifier: &Identifier, content: &str) -> StoreResult<NoteRecord> {
        self.check()?;
        self.inner.upsert(identifier, content).await
    }

    async fn scan(&self) -> StoreResult<Vec<NoteRecord>> {
        self.check()?;
        self.inner.scan().await
    }
}

/// Store whose upserts stay pending until the gate is opened.
#[derive(Default)]
struct GatedStore {
    inner: MemoryNoteStore,
    gate: Notify,
}

impl NoteStore for GatedStore {
    async fn fetch(&self, identifier: &Identifier) -> StoreResult<Option<NoteRecord>> {
        self.inner.fetch(identifier).await
    }

    async fn upsert(&self, identifier: &Identifier, content: &str) -> StoreResult<NoteRecord> {
        self.gate.notified().await;
        self.inner.upsert(identifier, content).await
    }

    async fn scan(&self) -> StoreResult<Vec<NoteRecord>> {
        self.inner.scan().await
    }
}

async fn edit_and_commit<S: NoteStore>(session: &Session<S>, content: &str) -> Result<NoteRecord> {
    session.begin_edit()?;
    session.set_draft(content.to_string())?;
    session.commit().await
}

// --------------------------------------------------------------------------
// Identifier submission
// --------------------------------------------------------------------------

#[tokio::test(flavor = "current_thread")]
async fn digit_identifiers_open_detail() {
    for raw in ["0", "12345", " 42 ", "123456789012345678901234567890"] {
        let session = Session::new(MemoryNoteStore::new());
        session.submit_identifier(raw).await.unwrap();

        let detail = detail(&session);
        assert_eq!(detail.identifier.as_str(), raw.trim());
        assert_eq!(detail.origin, Origin::Home);
        assert!(!detail.editing);
    }
}

#[tokio::test(flavor = "current_thread")]
async fn non_digit_identifiers_stay_home() {
    for raw in ["abc", "12a", "1 2", "-5", "3.14"] {
        let session = Session::new(MemoryNoteStore::new());
        let error = session.submit_identifier(raw).await.unwrap_err();

        assert!(matches!(error, Error::InvalidIdentifier(_)), "{raw:?}");
        assert_eq!(session.panel(), Panel::Home);
        assert_eq!(session.store().stats(), StoreStats::default());
    }
}

#[tokio::test(flavor = "current_thread")]
async fn blank_identifier_is_rejected() {
    let session = Session::new(MemoryNoteStore::new());
    let error = session.submit_identifier("   ").await.unwrap_err();
    assert!(matches!(error, Error::EmptyIdentifier));
    assert_eq!(session.panel(), Panel::Home);
}

#[tokio::test(flavor = "current_thread")]
async fn input_is_filtered_to_digits() {
    let session = Session::new(MemoryNoteStore::new());
    assert_eq!(session.input("12ab34").unwrap(), "1234");
    assert_eq!(
        session.view(),
        View::Home {
            input: "1234".to_string()
        }
    );

    session
        .dispatch(Action::SubmitIdentifier("1234".to_string()))
        .await
        .unwrap();
    assert_eq!(session.panel().identifier(), Some(&id("1234")));
}

// --------------------------------------------------------------------------
// Load and commit
// --------------------------------------------------------------------------

#[tokio::test(flavor = "current_thread")]
async fn unset_note_loads_empty_then_saves() {
    let session = Session::new(MemoryNoteStore::new());
    session.submit_identifier("12345").await.unwrap();

    let view = detail(&session);
    assert_eq!(view.content, "");
    assert!(view.last_modified.is_none());

    edit_and_commit(&session, "hello").await.unwrap();
    session.load(&id("12345"), true).await.unwrap();

    let view = detail(&session);
    assert_eq!(view.content, "hello");
    assert!(view.last_modified.is_some());
    assert!(!view.editing);
}

#[tokio::test(flavor = "current_thread")]
async fn commit_then_uncached_load_round_trips() {
    let content = "line one\nline two — with unicode ✓";
    let session = Session::new(seeded(&[("7", "old")]));
    session.submit_identifier("7").await.unwrap();

    edit_and_commit(&session, content).await.unwrap();
    let fetches_before = session.store().stats().fetches;
    session.load(&id("7"), true).await.unwrap();

    assert_eq!(session.store().stats().fetches, fetches_before + 1);
    assert_eq!(detail(&session).content, content);
    assert_eq!(session.cached(&id("7")).unwrap().content, content);
}

#[tokio::test(flavor = "current_thread")]
async fn committing_same_content_twice_is_idempotent() {
    let session = Session::new(MemoryNoteStore::new());
    session.submit_identifier("99").await.unwrap();

    edit_and_commit(&session, "same").await.unwrap();
    edit_and_commit(&session, "same").await.unwrap();

    let stored = session.store().fetch(&id("99")).await.unwrap().unwrap();
    assert_eq!(stored.content, "same");
    assert_eq!(session.store().stats().upserts, 2);
}

#[tokio::test(flavor = "current_thread")]
async fn content_length_boundary() {
    let session = Session::new(MemoryNoteStore::new());
    session.submit_identifier("1").await.unwrap();

    let too_long = "x".repeat(MAX_CONTENT_CHARS + 1);
    let error = edit_and_commit(&session, &too_long).await.unwrap_err();
    assert!(matches!(error, Error::ContentTooLong { length: 501, .. }));
    assert_eq!(session.store().stats().upserts, 0);

    // Rejected draft stays in the editor
    let view = detail(&session);
    assert!(view.editing);
    assert_eq!(view.content, too_long);
    assert!(!session.is_saving());

    let exact = "x".repeat(MAX_CONTENT_CHARS);
    session.set_draft(exact.clone()).unwrap();
    session.commit().await.unwrap();
    assert_eq!(session.store().stats().upserts, 1);
    assert_eq!(detail(&session).content, exact);
}

#[tokio::test(flavor = "current_thread")]
async fn second_commit_while_pending_is_rejected() {
    let session = Session::new(GatedStore::default());
    session.submit_identifier("12345").await.unwrap();
    session.begin_edit().unwrap();
    session.set_draft("first".to_string()).unwrap();

    let first = session.commit();
    let second = async {
        assert!(session.is_saving());
        assert!(detail(&session).saving);
        let result = session.commit().await;
        session.store().gate.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.unwrap().content, "first");
    assert!(matches!(second, Err(Error::SaveInProgress)));
    assert_eq!(session.store().inner.stats().upserts, 1);
    assert!(!session.is_saving());
}

#[tokio::test(flavor = "current_thread")]
async fn draft_typed_during_pending_save_survives() {
    let session = Session::new(GatedStore::default());
    session.submit_identifier("12345").await.unwrap();
    session.begin_edit().unwrap();
    session.set_draft("first".to_string()).unwrap();

    let first = session.commit();
    let typing = async {
        session
            .set_draft("first plus more typing".to_string())
            .unwrap();
        session.store().gate.notify_one();
    };
    let (first, ()) = tokio::join!(first, typing);
    assert_eq!(first.unwrap().content, "first");

    let view = detail(&session);
    assert!(view.editing);
    assert_eq!(view.content, "first plus more typing");
    assert_eq!(session.cached(&id("12345")).unwrap().content, "first");

    session.store().gate.notify_one();
    let second = session.commit().await.unwrap();
    assert_eq!(second.content, "first plus more typing");
    assert!(!detail(&session).editing);
}

#[tokio::test(flavor = "current_thread")]
async fn dropped_commit_releases_save_flag() {
    let session = Session::new(GatedStore::default());
    session.submit_identifier("5").await.unwrap();
    session.begin_edit().unwrap();

    tokio::select! {
        biased;
        _ = session.commit() => panic!("upsert should still be pending"),
        () = std::future::ready(()) => {}
    }

    assert!(!session.is_saving());
    assert!(detail(&session).editing);
}

#[tokio::test(flavor = "current_thread")]
async fn failed_save_keeps_draft_and_edit_mode() {
    let session = Session::new(FlakyStore::default());
    session.submit_identifier("314").await.unwrap();
    session.begin_edit().unwrap();
    session.set_draft("unsaved".to_string()).unwrap();

    session.store().set_failing(true);
    let error = session.commit().await.unwrap_err();
    assert!(matches!(error, Error::Store(StoreError::Api(_))));

    let view = detail(&session);
    assert!(view.editing);
    assert_eq!(view.content, "unsaved");
    assert_eq!(view.action_label, SAVE_LABEL);
    assert!(!session.is_saving());
    assert!(session.cached(&id("314")).unwrap().content.is_empty());

    // User retries once the store recovers
    session.store().set_failing(false);
    session.commit().await.unwrap();
    assert_eq!(detail(&session).content, "unsaved");
}

#[tokio::test(flavor = "current_thread")]
async fn failed_load_leaves_editor_empty() {
    let store = FlakyStore::default();
    store.inner.upsert(&id("8"), "hidden").await.unwrap();
    store.set_failing(true);
    let session = Session::new(store);

    let error = session.submit_identifier("8").await.unwrap_err();
    assert!(matches!(error, Error::Store(_)));

    let view = detail(&session);
    assert_eq!(view.identifier, id("8"));
    assert_eq!(view.content, "");
    assert!(session.cached(&id("8")).is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn cached_note_skips_remote_read() {
    let session = Session::new(seeded(&[("11", "cached")]));
    session.submit_identifier("11").await.unwrap();
    session.go_home();
    session.submit_identifier("11").await.unwrap();

    assert_eq!(session.store().stats().fetches, 1);
    assert_eq!(detail(&session).content, "cached");
}

#[tokio::test(flavor = "current_thread")]
async fn remote_policy_always_reads() {
    let session = Session::with_cache_policy(seeded(&[("11", "fresh")]), CachePolicy::Remote);
    session.submit_identifier("11").await.unwrap();
    session.go_home();
    session.submit_identifier("11").await.unwrap();

    assert_eq!(session.store().stats().fetches, 2);
}

#[tokio::test(flavor = "current_thread")]
async fn cancel_edit_restores_stored_content() {
    let session = Session::new(seeded(&[("21", "original")]));
    session.submit_identifier("21").await.unwrap();
    session.begin_edit().unwrap();
    session.set_draft("scratch".to_string()).unwrap();

    session.cancel_edit().await.unwrap();

    let view = detail(&session);
    assert!(!view.editing);
    assert_eq!(view.content, "original");
    assert_eq!(view.action_label, EDIT_LABEL);
}

#[tokio::test(flavor = "current_thread")]
async fn toggle_edit_begins_then_saves() {
    let session = Session::new(MemoryNoteStore::new());
    session.submit_identifier("3").await.unwrap();

    session.dispatch(Action::ToggleEdit).await.unwrap();
    assert!(detail(&session).editing);

    session
        .dispatch(Action::EditDraft("toggled".to_string()))
        .await
        .unwrap();
    session.dispatch(Action::ToggleEdit).await.unwrap();

    let view = detail(&session);
    assert!(!view.editing);
    assert_eq!(view.content, "toggled");
}

#[tokio::test(flavor = "current_thread")]
async fn editor_actions_need_identifier() {
    let session = Session::new(MemoryNoteStore::new());
    assert!(matches!(session.begin_edit(), Err(Error::NoIdentifier)));
    assert!(matches!(session.commit().await, Err(Error::NoIdentifier)));

    session.submit_identifier("4").await.unwrap();
    assert!(matches!(
        session.set_draft("x".to_string()),
        Err(Error::NotEditing)
    ));
    assert!(matches!(session.commit().await, Err(Error::NotEditing)));
}

// --------------------------------------------------------------------------
// Navigation and list
// --------------------------------------------------------------------------

#[tokio::test(flavor = "current_thread")]
async fn list_rows_render_previews() {
    let long = "a".repeat(40);
    let session = Session::new(seeded(&[("12345", long.as_str()), ("2", "")]));
    session.show_list().await.unwrap();

    let view = list(&session);
    let previews: Vec<(String, String)> = view
        .rows
        .iter()
        .map(|row| (row.identifier.to_string(), row.preview()))
        .collect();
    assert_eq!(
        previews,
        vec![
            ("2".to_string(), "(empty)".to_string()),
            (
                "12345".to_string(),
                format!("{}{PREVIEW_ELLIPSIS}", "a".repeat(30))
            ),
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn back_from_detail_restores_list_scroll() {
    let rows: Vec<(String, String)> = (1..=40)
        .map(|n| (n.to_string(), format!("note {n}")))
        .collect();
    let refs: Vec<(&str, &str)> = rows
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    let session = Session::new(seeded(&refs));

    session.show_list().await.unwrap();
    session.scroll_list(23).unwrap();
    session.select_row(&id("30")).await.unwrap();
    assert_eq!(detail(&session).origin, Origin::List);

    session.back().await.unwrap();

    let view = list(&session);
    assert_eq!(view.scroll_offset, 23);
    assert_eq!(session.store().stats().scans, 1);
}

#[tokio::test(flavor = "current_thread")]
async fn back_from_home_origin_returns_home() {
    let session = Session::new(MemoryNoteStore::new());
    session.input("77").unwrap();
    session.submit_identifier("77").await.unwrap();

    session.back().await.unwrap();
    assert_eq!(
        session.view(),
        View::Home {
            input: String::new()
        }
    );
}

#[tokio::test(flavor = "current_thread")]
async fn show_list_reuses_snapshot() {
    let session = Session::new(seeded(&[("1", "a")]));
    session.show_list().await.unwrap();
    session.go_home();
    session.show_list().await.unwrap();
    assert_eq!(session.store().stats().scans, 1);

    session.refresh_list().await.unwrap();
    assert_eq!(session.store().stats().scans, 2);
}

#[tokio::test(flavor = "current_thread")]
async fn failed_scan_shows_error_and_retries() {
    let store = FlakyStore::default();
    store.set_failing(true);
    let session = Session::new(store);

    assert!(session.show_list().await.is_err());
    let view = list(&session);
    assert!(view.rows.is_empty());
    assert!(view.error.unwrap().contains("503"));
    assert!(session.list_snapshot().is_none());

    session.store().set_failing(false);
    session.go_home();
    session.show_list().await.unwrap();
    assert!(list(&session).error.is_none());
    assert!(session.list_snapshot().is_some());
}

#[tokio::test(flavor = "current_thread")]
async fn save_patches_list_snapshot() {
    let session = Session::new(seeded(&[("10", "before"), ("20", "other")]));
    session.show_list().await.unwrap();
    session.select_row(&id("10")).await.unwrap();

    edit_and_commit(&session, "after").await.unwrap();
    session.back().await.unwrap();

    let view = list(&session);
    assert_eq!(view.rows[0].content, "after");
    assert_eq!(view.rows[1].content, "other");
    assert_eq!(session.store().stats().scans, 1);
}

#[tokio::test(flavor = "current_thread")]
async fn save_for_unlisted_identifier_leaves_snapshot() {
    let session = Session::new(seeded(&[("10", "listed")]));
    session.show_list().await.unwrap();
    session.go_home();
    session.submit_identifier("55").await.unwrap();
    edit_and_commit(&session, "new").await.unwrap();

    assert_eq!(session.list_snapshot().unwrap().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn entering_detail_resets_edit_mode() {
    let session = Session::new(seeded(&[("1", "one"), ("2", "two")]));
    session.show_list().await.unwrap();
    session.select_row(&id("1")).await.unwrap();
    session.begin_edit().unwrap();
    session.back().await.unwrap();
    session.select_row(&id("2")).await.unwrap();

    let view = detail(&session);
    assert!(!view.editing);
    assert_eq!(view.content, "two");
}

#[tokio::test(flavor = "current_thread")]
async fn unavailable_actions_are_rejected() {
    let session = Session::new(seeded(&[("1", "one")]));
    let error = session.scroll_list(3).unwrap_err();
    assert!(matches!(
        error,
        Error::ActionUnavailable {
            action: ActionKind::Scroll,
            panel: PanelKind::Home
        }
    ));

    session.show_list().await.unwrap();
    assert!(matches!(
        session.submit_identifier("1").await,
        Err(Error::ActionUnavailable { .. })
    ));
    assert!(matches!(
        session.select_row(&id("404")).await,
        Err(Error::UnknownRow(_))
    ));
    assert_eq!(session.panel(), Panel::List);
}

#[tokio::test(flavor = "current_thread")]
async fn home_clears_navigation_state() {
    let session = Session::new(seeded(&[("1", "one")]));
    session.show_list().await.unwrap();
    session.scroll_list(4).unwrap();
    session.select_row(&id("1")).await.unwrap();
    session.begin_edit().unwrap();

    session.dispatch(Action::Home).await.unwrap();

    assert_eq!(
        session.view(),
        View::Home {
            input: String::new()
        }
    );
    // Snapshot and cache survive
    assert!(session.list_snapshot().is_some());
    assert!(session.cached(&id("1")).is_some());

    session.show_list().await.unwrap();
    assert_eq!(list(&session).scroll_offset, 0);
}
