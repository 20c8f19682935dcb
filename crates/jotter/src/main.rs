//! # Jotter CLI
//!
//! A thin terminal client over the `jotterapp` library. This file only starts
//! the runtime, calls `cli::run()` and turns errors into an exit status.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/cli/)                                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - One editor session per invocation (commands.rs)          │
//! │  - Plain text rendering with console styles (render.rs)     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  jotterapp: sessions, engine, stores                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command that changes a document opens an `EditorSession`, applies the
//! change and closes the session, which flushes the debounced save before the
//! process exits.

mod cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
