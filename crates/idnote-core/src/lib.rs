//! idnote-core - Core library for idnote
//!
//! This crate contains the note models, the remote store client, and the
//! session state machine shared by idnote front-ends.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod util;

pub use config::{CachePolicy, StoreConfig};
pub use error::{Error, Result};
pub use models::{Identifier, NoteRecord};
pub use session::{Action, Session, View};
pub use store::{MemoryNoteStore, NoteStore, StoreError, SupabaseNoteStore};
