//! Storage is organized through [content_storage::ContentStorageImpl].
//! The basic idea is:
//!  - There is a directory with one subdirectory per user.
//!  - Each day of content is a single JSON document named after the UTC day.
//!  - A document holds everything the user produced that day: the journal
//!    entry, the habit completion map and the todo items.

pub mod content_storage;
pub mod entities;
