//! Read-only reconstruction of a symbol store's metadata.
//!
//! Turns the files an external archiver leaves behind into the value types
//! of [`symstore_types`]. Nothing here writes to the store.
//!
//! # Architecture
//!
//! - **File loader** — reads one file line by line, decoding each line with
//!   a record grammar. Malformed lines are skipped and reported; a missing
//!   file is fatal. Cancellation is honoured between lines.
//! - **Transaction log reader** — `000Admin/server.txt` and
//!   `000Admin/history.txt`.
//! - **Artifact detail loader** — `000Admin/<10-digit id>`.
//! - **Reference-pointer indexer** — every `<symbol>/<hash>/refs.ptr` outside
//!   the metadata folder.
//!
//! Loads that touch many files fan out with a bounded number of files open at
//! once (see [`ReaderConfig`]) and sort their results before returning.
//!
//! # Modules
//!
//! - [`error`] — [`ReaderError`] and the crate `Result`
//! - [`config`] — [`ReaderConfig`]
//! - [`loader`] — [`load_lines`], [`Loaded`], [`SkippedLine`]
//! - [`log`] — [`read_transaction_log`]
//! - [`detail`] — [`load_transaction_detail`], [`discover_transaction_files`]
//! - [`refs`] — [`discover_ref_pointers`], [`load_ref_pointer`]
//! - [`store`] — the [`SymbolStore`] facade

pub mod config;
pub mod detail;
pub mod error;
pub mod loader;
pub mod log;
pub mod refs;
pub mod store;

pub use config::{ReaderConfig, DEFAULT_MAX_CONCURRENT_FILES};
pub use detail::{discover_transaction_files, load_transaction_detail, TransactionFile};
pub use error::{ReaderError, Result};
pub use loader::{load_lines, Loaded, SkippedLine};
pub use log::read_transaction_log;
pub use refs::{discover_ref_pointers, load_ref_pointer};
pub use store::SymbolStore;
pub use tokio_util::sync::CancellationToken;
