//! High-level read access to one symbol store on disk.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt, TryStreamExt};
use symstore_types::{
    format_transaction_id, RefPointer, Transaction, TransactionDetail, HISTORY_FILE_NAME,
    METADATA_FOLDER_NAME, SERVER_FILE_NAME,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};

use crate::config::ReaderConfig;
use crate::detail::{discover_transaction_files, load_transaction_detail};
use crate::error::{ReaderError, Result};
use crate::loader::Loaded;
use crate::log::read_transaction_log;
use crate::refs::{discover_ref_pointers, load_ref_pointer};

/// Read-only view of a symbol store rooted at a directory.
///
/// Every call reads the files afresh; nothing is cached between calls and
/// nothing is ever written. Calls are independent and may run concurrently.
#[derive(Clone, Debug)]
pub struct SymbolStore {
    root: PathBuf,
    config: ReaderConfig,
}

impl SymbolStore {
    /// Open a store with the default configuration.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, ReaderConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: ReaderConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// `<root>/000Admin`.
    pub fn metadata_dir(&self) -> PathBuf {
        self.root.join(METADATA_FOLDER_NAME)
    }

    /// Transactions of the live store (`server.txt`).
    pub async fn load_server(&self, cancel: &CancellationToken) -> Result<Loaded<Vec<Transaction>>> {
        let path = self.metadata_dir().join(SERVER_FILE_NAME);
        read_transaction_log(&path, cancel)
            .instrument(info_span!("load_server"))
            .await
    }

    /// Every transaction ever recorded, deletions included (`history.txt`).
    pub async fn load_history(&self, cancel: &CancellationToken) -> Result<Loaded<Vec<Transaction>>> {
        let path = self.metadata_dir().join(HISTORY_FILE_NAME);
        read_transaction_log(&path, cancel)
            .instrument(info_span!("load_history"))
            .await
    }

    /// The detail file of a single transaction.
    pub async fn load_transaction_detail(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<Loaded<TransactionDetail>> {
        let path = self.metadata_dir().join(format_transaction_id(id));
        load_transaction_detail(&path, id, cancel)
            .instrument(info_span!("load_transaction_detail", id))
            .await
    }

    /// Every transaction detail file in the metadata folder, sorted by id.
    ///
    /// Files load concurrently, at most
    /// [`ReaderConfig::max_concurrent_files`] at a time. The first fatal
    /// error aborts the whole call.
    pub async fn load_transaction_details(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Loaded<TransactionDetail>>> {
        self.collect_transaction_details(cancel)
            .instrument(info_span!("load_transaction_details"))
            .await
    }

    /// Paths of every `refs.ptr` file in the store, unparsed.
    pub async fn discover_ref_pointers(&self) -> Result<Vec<PathBuf>> {
        discover_ref_pointers(&self.root).await
    }

    /// Every `refs.ptr` file in the store with its entries, sorted by sub path.
    ///
    /// Uses the same bounded fan-out as
    /// [`load_transaction_details`](Self::load_transaction_details).
    pub async fn load_ref_pointers(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Loaded<RefPointer>>> {
        self.collect_ref_pointers(cancel)
            .instrument(info_span!("load_ref_pointers"))
            .await
    }

    async fn collect_transaction_details(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Loaded<TransactionDetail>>> {
        let files = discover_transaction_files(&self.metadata_dir()).await?;
        info!(count = files.len(), "found transaction files");

        let mut details: Vec<Loaded<TransactionDetail>> = stream::iter(files)
            .map(|file| async move {
                if cancel.is_cancelled() {
                    return Err(ReaderError::Cancelled);
                }
                load_transaction_detail(&file.path, file.id, cancel).await
            })
            .buffer_unordered(self.config.concurrency())
            .try_collect()
            .await?;

        details.sort_by_key(|d| d.value.id);
        Ok(details)
    }

    async fn collect_ref_pointers(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Loaded<RefPointer>>> {
        let paths = discover_ref_pointers(&self.root).await?;
        info!(count = paths.len(), "found ref pointer files");

        let root = self.root.as_path();
        let mut pointers: Vec<Loaded<RefPointer>> = stream::iter(paths)
            .map(|path| async move {
                if cancel.is_cancelled() {
                    return Err(ReaderError::Cancelled);
                }
                load_ref_pointer(root, &path, cancel).await
            })
            .buffer_unordered(self.config.concurrency())
            .try_collect()
            .await?;

        pointers.sort_by(|a, b| a.value.sub_path().cmp(b.value.sub_path()));
        Ok(pointers)
    }
}
