//! Foundation types for reading a symbol store's metadata.
//!
//! A symbol store keeps its bookkeeping in plain text files: an append-only
//! transaction log, one detail file per transaction, and a `refs.ptr` index
//! file next to every stored symbol. This crate models those records as
//! immutable values and provides the line grammar that decodes and renders
//! them. Every other crate in the workspace depends on `symstore-types`.
//!
//! # Key Types
//!
//! - [`Transaction`] — One entry of `server.txt` / `history.txt`
//! - [`TransactionDetail`] — The artifact list of one transaction
//! - [`ArtifactDetail`] — One stored/original path pair
//! - [`RefPointer`] — One `refs.ptr` file with its derived identity
//! - [`RefPointerEntry`] — One line of a `refs.ptr` file
//! - [`LineRecord`] — Parse/render contract shared by all line records

pub mod artifact;
pub mod error;
pub mod grammar;
pub mod layout;
pub mod ref_pointer;
pub mod transaction;

pub use artifact::{ArtifactDetail, TransactionDetail};
pub use error::{Result, TypeError};
pub use grammar::{FieldKind, Grammar, LineRecord, Token};
pub use layout::{
    format_transaction_id, parse_transaction_file_name, HISTORY_FILE_NAME, METADATA_FOLDER_NAME,
    REF_FILE_NAME, SERVER_FILE_NAME, TRANSACTION_ID_WIDTH,
};
pub use ref_pointer::{PeType, RefPointer, RefPointerEntry, RefPointerLocation};
pub use transaction::{Operation, Transaction, TransactionKind};
