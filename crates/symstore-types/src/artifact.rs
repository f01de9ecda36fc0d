//! Per-transaction artifact details (`000Admin/<id>`).

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};
use crate::grammar::{FieldKind, Grammar, LineRecord, Token};
use crate::layout::format_transaction_id;

static ARTIFACT_GRAMMAR: Grammar = Grammar {
    record: "artifact detail",
    tokens: &[
        Token::Lit("\""),
        Token::Field("stored_path", FieldKind::Text),
        Token::Lit("\",\""),
        Token::Field("original_path", FieldKind::Text),
        Token::Lit("\""),
    ],
};

/// Where a transaction put one symbol file, and where it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDetail {
    pub stored_path: String,
    pub original_path: String,
}

impl ArtifactDetail {
    pub fn new(stored_path: impl Into<String>, original_path: impl Into<String>) -> Self {
        Self {
            stored_path: stored_path.into(),
            original_path: original_path.into(),
        }
    }
}

impl LineRecord for ArtifactDetail {
    const GRAMMAR: &'static Grammar = &ARTIFACT_GRAMMAR;

    fn from_captures(captures: &[&str]) -> Result<Self> {
        match captures {
            [stored, original] => Ok(Self::new(*stored, *original)),
            _ => Err(TypeError::invalid_field(
                "artifact detail",
                &captures.join(","),
                "wrong number of fields",
            )),
        }
    }

    fn to_fields(&self) -> Vec<String> {
        vec![self.stored_path.clone(), self.original_path.clone()]
    }
}

/// Every artifact touched by one transaction, in the order the store
/// recorded them.
///
/// The id comes from the detail file's name, never from its content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub id: u32,
    pub artifacts: Vec<ArtifactDetail>,
}

impl TransactionDetail {
    pub fn new(id: u32, artifacts: Vec<ArtifactDetail>) -> Self {
        Self { id, artifacts }
    }

    /// Name of the detail file this record was loaded from.
    pub fn file_name(&self) -> String {
        format_transaction_id(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_quoted_pair() {
        let line = r#""Foo.pdb\1A2B3C\Foo.pdb","D:\build\out\Foo.pdb""#;
        let detail = ArtifactDetail::parse_line(line).unwrap();
        assert_eq!(detail.stored_path, r"Foo.pdb\1A2B3C\Foo.pdb");
        assert_eq!(detail.original_path, r"D:\build\out\Foo.pdb");
        assert_eq!(detail.render(), line);
    }

    #[test]
    fn unquoted_line_is_a_mismatch() {
        let err = ArtifactDetail::parse_line("a.pdb,b.pdb").unwrap_err();
        assert!(matches!(err, TypeError::LineMismatch { record: "artifact detail", .. }));
    }

    #[test]
    fn trailing_garbage_is_a_mismatch() {
        assert!(ArtifactDetail::parse_line(r#""a","b","#).is_err());
    }

    #[test]
    fn detail_file_name_is_padded_id() {
        let detail = TransactionDetail::new(12, vec![ArtifactDetail::new("a", "b")]);
        assert_eq!(detail.file_name(), "0000000012");
    }

    proptest! {
        #[test]
        fn parse_inverts_render(stored in "[^\"\r\n]{0,24}", original in "[^\"\r\n]{0,24}") {
            let detail = ArtifactDetail::new(stored, original);
            let line = detail.render();
            let parsed = ArtifactDetail::parse_line(&line).unwrap();
            prop_assert_eq!(parsed.render(), line);
            prop_assert_eq!(parsed, detail);
        }
    }
}
