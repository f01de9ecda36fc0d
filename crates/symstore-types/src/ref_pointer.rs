//! Reference-pointer records (`<symbol>/<hash>/refs.ptr`).
//!
//! A `refs.ptr` file lists every transaction that references one stored
//! symbol variant:
//!
//! ```text
//! 0000000042,file,"D:\build\out\Foo.pdb",pri,,Y,,
//! ```
//!
//! The file's identity is not in its content. The hash is the name of the
//! directory holding the file and the symbol file name is the name of the
//! directory above that; [`RefPointerLocation::from_sub_path`] is the only
//! place that rule is applied.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};
use crate::grammar::{parse_id, FieldKind, Grammar, LineRecord, Token};
use crate::layout::{format_transaction_id, REF_FILE_NAME};
use crate::transaction::TransactionKind;

/// Classification of a referenced symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeType {
    /// Primary symbol reference.
    Pri,
    /// Binary reference.
    Bin,
}

impl PeType {
    pub const ALL: &'static [&'static str] = &["pri", "bin"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pri => "pri",
            Self::Bin => "bin",
        }
    }
}

impl fmt::Display for PeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pri" => Ok(Self::Pri),
            "bin" => Ok(Self::Bin),
            other => Err(TypeError::invalid_field("pe_type", other, "expected pri or bin")),
        }
    }
}

static REF_POINTER_ENTRY_GRAMMAR: Grammar = Grammar {
    record: "ref pointer entry",
    tokens: &[
        Token::Field("id", FieldKind::Id),
        Token::Lit(","),
        Token::Field("kind", FieldKind::Choice(TransactionKind::ALL)),
        Token::Lit(",\""),
        Token::Field("original_path", FieldKind::Text),
        Token::Lit("\","),
        Token::Field("pe_type", FieldKind::Choice(PeType::ALL)),
        Token::Lit(",,Y,,"),
    ],
};

/// One line of a `refs.ptr` file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefPointerEntry {
    /// Transaction that added the reference.
    pub id: u32,
    pub kind: TransactionKind,
    pub original_path: String,
    pub pe_type: PeType,
}

impl LineRecord for RefPointerEntry {
    const GRAMMAR: &'static Grammar = &REF_POINTER_ENTRY_GRAMMAR;

    fn from_captures(captures: &[&str]) -> Result<Self> {
        let [id, kind, original_path, pe_type] = captures else {
            return Err(TypeError::invalid_field(
                "ref pointer entry",
                &captures.join(","),
                "wrong number of fields",
            ));
        };

        Ok(Self {
            id: parse_id("id", id)?,
            kind: kind.parse()?,
            original_path: original_path.to_string(),
            pe_type: pe_type.parse()?,
        })
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            format_transaction_id(self.id),
            self.kind.to_string(),
            self.original_path.clone(),
            self.pe_type.to_string(),
        ]
    }
}

/// Identity of a `refs.ptr` file, derived from its position in the store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefPointerLocation {
    /// Path of the file relative to the store root.
    pub sub_path: PathBuf,
    /// Name of the directory holding the file.
    pub hash: String,
    /// Name of the directory above the hash directory.
    pub symbol_file_name: String,
}

impl RefPointerLocation {
    /// Derive the identity of the `refs.ptr` file at `sub_path`.
    ///
    /// Fails with [`TypeError::InvalidPath`] when the path does not name a
    /// `refs.ptr` file or lacks the two enclosing directories. No filesystem
    /// access happens here.
    ///
    /// ```
    /// use symstore_types::RefPointerLocation;
    ///
    /// let loc = RefPointerLocation::from_sub_path("Foo.pdb/AB12CD34EF/refs.ptr").unwrap();
    /// assert_eq!(loc.symbol_file_name, "Foo.pdb");
    /// assert_eq!(loc.hash, "AB12CD34EF");
    ///
    /// assert!(RefPointerLocation::from_sub_path("Foo.pdb/AB12CD34EF/file.ptr").is_err());
    /// ```
    pub fn from_sub_path(sub_path: impl Into<PathBuf>) -> Result<Self> {
        let sub_path = sub_path.into();

        if sub_path.file_name().and_then(|n| n.to_str()) != Some(REF_FILE_NAME) {
            return Err(TypeError::invalid_path(
                sub_path,
                format!("does not point to a {REF_FILE_NAME} file"),
            ));
        }

        let hash_dir = enclosing_dir(&sub_path, &sub_path, "hash")?;
        let hash = segment_name(&sub_path, hash_dir, "hash")?;
        let symbol_dir = enclosing_dir(&sub_path, hash_dir, "symbol file name")?;
        let symbol_file_name = segment_name(&sub_path, symbol_dir, "symbol file name")?;

        Ok(Self {
            hash,
            symbol_file_name,
            sub_path,
        })
    }
}

fn enclosing_dir<'a>(full: &Path, path: &'a Path, what: &str) -> Result<&'a Path> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| TypeError::invalid_path(full, format!("missing the {what} directory")))
}

fn segment_name(full: &Path, dir: &Path, what: &str) -> Result<String> {
    dir.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            TypeError::invalid_path(full, format!("{what} directory has no usable name"))
        })
}

/// A loaded `refs.ptr` file: its derived identity plus its entries in file
/// order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefPointer {
    #[serde(flatten)]
    pub location: RefPointerLocation,
    pub entries: Vec<RefPointerEntry>,
}

impl RefPointer {
    pub fn new(location: RefPointerLocation, entries: Vec<RefPointerEntry>) -> Self {
        Self { location, entries }
    }

    pub fn sub_path(&self) -> &Path {
        &self.location.sub_path
    }

    pub fn hash(&self) -> &str {
        &self.location.hash
    }

    pub fn symbol_file_name(&self) -> &str {
        &self.location.symbol_file_name
    }
}
