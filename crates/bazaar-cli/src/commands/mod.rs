pub mod common;
pub mod completions;
pub mod delete;
pub mod list;
pub mod publish;
pub mod search;
pub mod sync;
