//! # Jotter Architecture
//!
//! Jotter is the **document and formatting engine** of a local-first note
//! app. It is UI-agnostic: nothing in this crate draws, prints or reads a
//! terminal. The `jotter` binary is one thin client; a GUI would be another.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session Layer (session/)                                   │
//! │  - One EditorSession per open document                      │
//! │  - Debounced saves, delete flag, ensure-persisted guard     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine Layer (formatting.rs, markers.rs, blocks.rs)        │
//! │  - Format ranges re-indexed under text edits                │
//! │  - Logical content <-> raw content with block markers       │
//! │  - Checklist block read-modify-write                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Async DocumentStore + BlockStore traits                  │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Logical vs Raw Content
//!
//! Users edit the **logical content**: plain text with no markers. Format
//! ranges index it in `char`s. The **raw content** written to the store is the
//! logical content followed by one marker per embedded block; it is rebuilt on
//! every save and never edited directly. See [`markers`].
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Library code:
//! - Returns [`error::Result`] and never panics on store failures
//! - Emits `tracing` events but installs no subscriber
//! - **Never** writes to stdout/stderr
//!
//! ## Testing Strategy
//!
//! 1. **Engine** (`formatting`, `markers`, `tags`): plain unit tests, no async.
//! 2. **Stores**: unit tests against [`store::memory::InMemoryStore`] and
//!    [`store::fs::FileStore`] in a temp dir.
//! 3. **Sessions**: `#[tokio::test(start_paused = true)]` so debounce and grace
//!    periods run on virtual time. Integration tests live in `tests/`.
//!
//! ## Module Overview
//!
//! - [`session`]: The editor session state machine
//! - [`blocks`]: Block lifecycle for one document
//! - [`formatting`]: Format range engine
//! - [`markers`]: Marker parser/serializer
//! - [`tags`]: Tag-set rules
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Document`, `FormatRange`, `BlockRef`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod blocks;
pub mod config;
pub mod error;
pub mod formatting;
pub mod markers;
pub mod model;
pub mod session;
pub mod store;
pub mod tags;
