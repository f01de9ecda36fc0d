//! Transaction log reader (`server.txt` / `history.txt`).

use std::path::Path;

use symstore_types::Transaction;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::Result;
use crate::loader::{load_lines, Loaded};

/// Read a transaction log in file order.
///
/// Lines that do not match the transaction grammar are logged, reported in
/// [`Loaded::skipped`], and otherwise ignored.
pub async fn read_transaction_log(
    path: &Path,
    cancel: &CancellationToken,
) -> Result<Loaded<Vec<Transaction>>> {
    let loaded = load_lines::<Transaction>(path, cancel).await?;
    info!(
        path = %path.display(),
        transactions = loaded.value.len(),
        skipped = loaded.skipped.len(),
        "transaction log read"
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;
    use symstore_types::{LineRecord, Operation, TransactionKind};

    fn write_log(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("history.txt");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn reads_add_and_delete_entries_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(
            dir.path(),
            concat!(
                "0000000001,add,file,10/23/2023,14:05:09,\"Game\",\"1.0\",\"first\",\n",
                "0000000002,add,ptr,10/24/2023,08:00:00,\"Game\",\"1.1\",\"\",\n",
                "0000000001,del,file,10/25/2023,09:30:00,\"\",\"\",\"\",\n",
            ),
        );

        let loaded = read_transaction_log(&path, &CancellationToken::new())
            .await
            .unwrap();
        let summary: Vec<_> = loaded
            .value
            .iter()
            .map(|t| (t.id, t.operation, t.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, Operation::Add, TransactionKind::File),
                (2, Operation::Add, TransactionKind::Ptr),
                (1, Operation::Del, TransactionKind::File),
            ]
        );
        assert!(loaded.is_clean());
    }

    #[tokio::test]
    async fn tolerates_one_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let good = "0000000007,add,file,01/02/2020,03:04:05,\"p\",\"v\",\"c\",";
        let bad = "0000000008,add,file,01/02/2020,03:04:05,\"p\",\"v\",\"c\"";
        let path = write_log(dir.path(), &format!("{good}\n{bad}\n"));

        let loaded = read_transaction_log(&path, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(loaded.value.len(), 1);
        assert_eq!(loaded.value[0].render(), good);
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].raw, bad);
    }

    #[tokio::test]
    async fn empty_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(dir.path(), "");
        let loaded = read_transaction_log(&path, &CancellationToken::new())
            .await
            .unwrap();
        assert!(loaded.value.is_empty());
        assert!(loaded.is_clean());
    }

    #[tokio::test]
    async fn missing_log_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_transaction_log(&dir.path().join("server.txt"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReaderError::NotFound { .. }));
    }
}
