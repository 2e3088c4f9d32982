pub mod common;
pub mod completions;
pub mod config;
pub mod edit;
pub mod list;
pub mod set;
pub mod shell;
pub mod show;
