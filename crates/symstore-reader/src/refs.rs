//! Reference-pointer indexer.
//!
//! Discovery walks every top-level directory of the store except the
//! metadata folder and collects each file named exactly `refs.ptr`, at any
//! depth. Loading derives the file's identity from its path, before any I/O,
//! then decodes its entries.

use std::path::{Path, PathBuf};

use symstore_types::{
    RefPointer, RefPointerEntry, RefPointerLocation, METADATA_FOLDER_NAME, REF_FILE_NAME,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{ReaderError, Result};
use crate::loader::{load_lines, Loaded};

/// Find every `refs.ptr` file below `root`, skipping the metadata folder.
///
/// The order is the filesystem's enumeration order. Symbolic links to
/// directories and to `refs.ptr` files are followed; link cycles, dangling
/// links and entries that cannot be read are logged and skipped. A missing
/// `root` is [`ReaderError::NotFound`].
pub async fn discover_ref_pointers(root: &Path) -> Result<Vec<PathBuf>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || discover_blocking(&root))
        .await
        .map_err(|e| ReaderError::Task(e.to_string()))?
}

fn discover_blocking(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for entry in std::fs::read_dir(root).map_err(|e| ReaderError::io(root, e))? {
        let entry = entry.map_err(|e| ReaderError::io(root, e))?;
        if entry.file_name() == METADATA_FOLDER_NAME {
            continue;
        }
        // `metadata` follows symlinks.
        match std::fs::metadata(entry.path()) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => continue,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping unreadable store entry");
                continue;
            }
        }

        for item in WalkDir::new(entry.path()).follow_links(true) {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry during ref pointer search");
                    continue;
                }
            };
            if item.file_type().is_file() && item.file_name() == REF_FILE_NAME {
                debug!(path = %item.path().display(), "found ref pointer");
                found.push(item.into_path());
            }
        }
    }

    info!(root = %root.display(), count = found.len(), "ref pointer search complete");
    Ok(found)
}

/// Load the `refs.ptr` file at `path`, which must lie below `root`.
///
/// The identity (sub path, hash, symbol file name) is derived from the path
/// relative to `root` first; an unusable path fails with
/// [`ReaderError::InvalidPath`] without touching the filesystem.
pub async fn load_ref_pointer(
    root: &Path,
    path: &Path,
    cancel: &CancellationToken,
) -> Result<Loaded<RefPointer>> {
    let sub_path = path
        .strip_prefix(root)
        .map_err(|_| ReaderError::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("not below the store root {}", root.display()),
        })?;
    let location = RefPointerLocation::from_sub_path(sub_path)
        .map_err(|e| ReaderError::invalid_path(sub_path, e))?;

    let loaded = load_lines::<RefPointerEntry>(path, cancel).await?;
    Ok(loaded.map(|entries| RefPointer::new(location, entries)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use symstore_types::{PeType, TransactionKind};

    fn write_ref(root: &Path, symbol: &str, hash: &str, body: &str) -> PathBuf {
        let dir = root.join(symbol).join(hash);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(REF_FILE_NAME);
        fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn derives_identity_from_path() {
        let root = tempfile::tempdir().unwrap();
        let path = write_ref(
            root.path(),
            "Foo.pdb",
            "AB12CD34EF",
            "0000000001,file,\"D:\\out\\Foo.pdb\",pri,,Y,,\n0000000002,ptr,\"\\\\share\\Foo.pdb\",bin,,Y,,\n",
        );

        let loaded = load_ref_pointer(root.path(), &path, &CancellationToken::new())
            .await
            .unwrap();
        let rp = loaded.value;
        assert_eq!(rp.symbol_file_name(), "Foo.pdb");
        assert_eq!(rp.hash(), "AB12CD34EF");
        assert_eq!(rp.sub_path(), Path::new("Foo.pdb/AB12CD34EF/refs.ptr"));
        assert_eq!(rp.entries.len(), 2);
        assert_eq!(rp.entries[0].kind, TransactionKind::File);
        assert_eq!(rp.entries[1].pe_type, PeType::Bin);
    }

    #[tokio::test]
    async fn invalid_path_fails_before_io() {
        let root = tempfile::tempdir().unwrap();
        // Neither file exists; the path check must win over NotFound.
        let wrong_name = root.path().join("Foo.pdb").join("AB12").join("refs.txt");
        let err = load_ref_pointer(root.path(), &wrong_name, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReaderError::InvalidPath { .. }));

        let too_shallow = root.path().join(REF_FILE_NAME);
        let err = load_ref_pointer(root.path(), &too_shallow, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReaderError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn path_outside_root_is_invalid() {
        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let path = write_ref(other.path(), "Foo.pdb", "AB12", "0000000001,file,\"x\",pri,,Y,,\n");

        let err = load_ref_pointer(root.path(), &path, &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            ReaderError::InvalidPath { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected InvalidPath, got {other}"),
        }
    }

    #[tokio::test]
    async fn missing_ref_file_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("Foo.pdb").join("AB12").join(REF_FILE_NAME);
        let err = load_ref_pointer(root.path(), &path, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReaderError::NotFound { .. }));
    }

    #[tokio::test]
    async fn discovery_skips_metadata_folder() {
        let root = tempfile::tempdir().unwrap();
        let kept = write_ref(root.path(), "Foo.pdb", "AB12", "");
        write_ref(root.path(), METADATA_FOLDER_NAME, "AB12", "");
        fs::write(root.path().join(METADATA_FOLDER_NAME).join(REF_FILE_NAME), "").unwrap();

        let found = discover_ref_pointers(root.path()).await.unwrap();
        assert_eq!(found, vec![kept]);
    }

    #[tokio::test]
    async fn discovery_finds_files_at_any_depth() {
        let root = tempfile::tempdir().unwrap();
        let shallow = write_ref(root.path(), "Foo.pdb", "AB12", "");
        let deep_dir = root.path().join("Bar.dll").join("x").join("y").join("CAFE");
        fs::create_dir_all(&deep_dir).unwrap();
        fs::write(deep_dir.join(REF_FILE_NAME), "").unwrap();
        fs::write(deep_dir.join("refs.ptr.bak"), "").unwrap();
        // A refs.ptr directly in the root is not inside any symbol directory.
        fs::write(root.path().join(REF_FILE_NAME), "").unwrap();

        let mut found = discover_ref_pointers(root.path()).await.unwrap();
        found.sort();
        let mut expected = vec![shallow, deep_dir.join(REF_FILE_NAME)];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn discovery_follows_symlinks() {
        use std::os::unix::fs::symlink;

        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = write_ref(outside.path(), "Foo.pdb", "AB12", "");
        symlink(outside.path().join("Foo.pdb"), root.path().join("Foo.pdb")).unwrap();

        let bar = root.path().join("Bar.pdb").join("CD34");
        fs::create_dir_all(&bar).unwrap();
        symlink(&target, bar.join(REF_FILE_NAME)).unwrap();

        let mut found = discover_ref_pointers(root.path()).await.unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![
                bar.join(REF_FILE_NAME),
                root.path().join("Foo.pdb").join("AB12").join(REF_FILE_NAME),
            ]
        );

        // Identity comes from the link path, not the target.
        let loaded = load_ref_pointer(root.path(), &found[1], &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(loaded.value.hash(), "AB12");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn discovery_skips_link_cycles_and_dangling_links() {
        use std::os::unix::fs::symlink;

        let root = tempfile::tempdir().unwrap();
        let kept = write_ref(root.path(), "Foo.pdb", "AB12", "");
        symlink(root.path().join("Foo.pdb"), root.path().join("Foo.pdb").join("loop")).unwrap();
        symlink(root.path().join("gone"), root.path().join("Dangling.pdb")).unwrap();

        let found = discover_ref_pointers(root.path()).await.unwrap();
        assert_eq!(found, vec![kept]);
    }

    #[tokio::test]
    async fn discovery_of_missing_root_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let err = discover_ref_pointers(&root.path().join("store"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReaderError::NotFound { .. }));
    }
}
