//! JSONL journal of engine activity.
//!
//! One append-only file per day under the log directory:
//!
//! ```text
//! logs/
//! ├── runecast-2026-03-02.jsonl
//! └── runecast-2026-03-03.jsonl
//! ```
//!
//! The journal is a `tracing` layer, so it composes with the console
//! formatter the CLI installs:
//!
//! ```ignore
//! use runecast_core::logging::JsonlLayer;
//! use tracing_subscriber::prelude::*;
//!
//! tracing_subscriber::registry()
//!     .with(JsonlLayer::new("./logs")?)
//!     .with(tracing_subscriber::fmt::layer())
//!     .init();
//! ```
//!
//! Query with jq, e.g. `jq 'select(.level == "warn")' logs/*.jsonl`.

pub mod entry;
pub mod layer;
pub mod writer;

pub use entry::JournalEntry;
pub use layer::JsonlLayer;
pub use writer::{read_journal, JournalWriter};
