//! Fixed names of the on-disk store layout.
//!
//! ```text
//! <root>/000Admin/server.txt          transaction log (live)
//! <root>/000Admin/history.txt         transaction log (full history)
//! <root>/000Admin/0000000042          artifact details of transaction 42
//! <root>/<symbol>/<hash>/refs.ptr     reference pointers for one symbol variant
//! ```

/// Folder holding the transaction logs and detail files.
pub const METADATA_FOLDER_NAME: &str = "000Admin";

/// Transaction log of the live store.
pub const SERVER_FILE_NAME: &str = "server.txt";

/// Transaction log including deleted transactions.
pub const HISTORY_FILE_NAME: &str = "history.txt";

/// Reference-pointer index file name.
pub const REF_FILE_NAME: &str = "refs.ptr";

/// Transaction ids are written zero-padded to this many digits.
pub const TRANSACTION_ID_WIDTH: usize = 10;

/// Render a transaction id the way the store writes it.
///
/// ```
/// use symstore_types::format_transaction_id;
///
/// assert_eq!(format_transaction_id(42), "0000000042");
/// ```
pub fn format_transaction_id(id: u32) -> String {
    format!("{id:0width$}", width = TRANSACTION_ID_WIDTH)
}

/// Recover the transaction id from a detail file name.
///
/// Only names made of exactly [`TRANSACTION_ID_WIDTH`] ASCII digits qualify.
pub fn parse_transaction_file_name(name: &str) -> Option<u32> {
    if name.len() != TRANSACTION_ID_WIDTH || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_zero_padded() {
        assert_eq!(format_transaction_id(0), "0000000000");
        assert_eq!(format_transaction_id(u32::MAX), "4294967295");
    }

    #[test]
    fn detail_file_names() {
        assert_eq!(parse_transaction_file_name("0000000042"), Some(42));
        assert_eq!(parse_transaction_file_name("000000042"), None);
        assert_eq!(parse_transaction_file_name("00000000042"), None);
        assert_eq!(parse_transaction_file_name("server.txt"), None);
        assert_eq!(parse_transaction_file_name("00000000+1"), None);
        // Ten digits, but larger than any u32.
        assert_eq!(parse_transaction_file_name("9999999999"), None);
    }
}
