//! Transaction log records (`server.txt` / `history.txt`).
//!
//! ```text
//! 0000000042,add,file,10/23/2023,14:05:09,"Product","1.2.0","nightly",
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};
use crate::grammar::{parse_id, FieldKind, Grammar, LineRecord, Token};
use crate::layout::format_transaction_id;

const DATE_FORMAT: &str = "%m/%d/%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

/// What a transaction did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Del,
}

impl Operation {
    pub const ALL: &'static [&'static str] = &["add", "del"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Del => "del",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(Self::Add),
            "del" => Ok(Self::Del),
            other => Err(TypeError::invalid_field("operation", other, "expected add or del")),
        }
    }
}

/// Whether a transaction stored real files or pointers to them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    File,
    Ptr,
}

impl TransactionKind {
    pub const ALL: &'static [&'static str] = &["file", "ptr"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Ptr => "ptr",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(Self::File),
            "ptr" => Ok(Self::Ptr),
            other => Err(TypeError::invalid_field("kind", other, "expected file or ptr")),
        }
    }
}

static TRANSACTION_GRAMMAR: Grammar = Grammar {
    record: "transaction",
    tokens: &[
        Token::Field("id", FieldKind::Id),
        Token::Lit(","),
        Token::Field("operation", FieldKind::Choice(Operation::ALL)),
        Token::Lit(","),
        Token::Field("kind", FieldKind::Choice(TransactionKind::ALL)),
        Token::Lit(","),
        Token::Field("creation_date", FieldKind::Date),
        Token::Lit(","),
        Token::Field("creation_time", FieldKind::Time),
        Token::Lit(",\""),
        Token::Field("product_name", FieldKind::Text),
        Token::Lit("\",\""),
        Token::Field("version", FieldKind::Text),
        Token::Lit("\",\""),
        Token::Field("comment", FieldKind::Text),
        Token::Lit("\","),
    ],
};

/// One entry of the store's transaction log.
///
/// Ids are assigned by the store, monotonically, and are unique within a
/// log file. The creation timestamp is written as two separate fields
/// (date and time) and combined here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u32,
    pub operation: Operation,
    pub kind: TransactionKind,
    pub created: NaiveDateTime,
    pub product_name: String,
    pub version: String,
    pub comment: String,
}

impl Transaction {
    /// Zero-padded id, as used for the transaction's detail file name.
    pub fn file_name(&self) -> String {
        format_transaction_id(self.id)
    }
}

impl LineRecord for Transaction {
    const GRAMMAR: &'static Grammar = &TRANSACTION_GRAMMAR;

    fn from_captures(captures: &[&str]) -> Result<Self> {
        let [id, operation, kind, date, time, product_name, version, comment] = captures else {
            return Err(TypeError::invalid_field(
                "transaction",
                &captures.join(","),
                "wrong number of fields",
            ));
        };

        let stamp = format!("{date} {time}");
        let created = NaiveDateTime::parse_from_str(&stamp, &format!("{DATE_FORMAT} {TIME_FORMAT}"))
            .map_err(|e| TypeError::invalid_field("creation timestamp", &stamp, e.to_string()))?;

        Ok(Self {
            id: parse_id("id", id)?,
            operation: operation.parse()?,
            kind: kind.parse()?,
            created,
            product_name: product_name.to_string(),
            version: version.to_string(),
            comment: comment.to_string(),
        })
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            format_transaction_id(self.id),
            self.operation.to_string(),
            self.kind.to_string(),
            self.created.format(DATE_FORMAT).to_string(),
            self.created.format(TIME_FORMAT).to_string(),
            self.product_name.clone(),
            self.version.clone(),
            self.comment.clone(),
        ]
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
