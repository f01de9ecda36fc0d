//! Table-driven line grammar shared by every metadata record.
//!
//! Each record kind describes its line layout as a static slice of
//! [`Token`]s: fixed literals interleaved with typed fields. A single
//! decoder and a single encoder interpret those tables, so record modules
//! only convert between captured field text and typed values.
//!
//! Decoding is anchored at both ends of the line. [`FieldKind::Text`]
//! fields are greedy: when several splits of the line satisfy the table,
//! the one giving the earliest text field the longest value wins.

use std::collections::HashSet;

use crate::error::{Result, TypeError};

/// The shape of a single captured field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// One or more ASCII digits. Consumes every digit available.
    Id,
    /// Arbitrary text, possibly empty.
    Text,
    /// Exactly one word out of a closed set.
    Choice(&'static [&'static str]),
    /// `MM/dd/yyyy`.
    Date,
    /// `HH:mm:ss`.
    Time,
}

/// One element of a grammar table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// Text that must appear verbatim.
    Lit(&'static str),
    /// A named, captured field.
    Field(&'static str, FieldKind),
}

/// The complete line layout of one record kind.
#[derive(Debug)]
pub struct Grammar {
    /// Record name used in diagnostics.
    pub record: &'static str,
    pub tokens: &'static [Token],
}

impl Grammar {
    /// Names of the captured fields, in line order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tokens.iter().filter_map(|t| match t {
            Token::Field(name, _) => Some(*name),
            Token::Lit(_) => None,
        })
    }

    /// Number of captured fields.
    pub fn field_count(&self) -> usize {
        self.field_names().count()
    }

    /// Match `line` against the whole table, returning field captures in
    /// order, or `None` if the line does not fit.
    pub fn decode<'a>(&self, line: &'a str) -> Option<Vec<&'a str>> {
        let mut matcher = Matcher::new(self.tokens, line, self.field_count());
        matcher.match_at(0, 0).then_some(matcher.captures)
    }

    /// Render field values through the table.
    ///
    /// `fields` must hold exactly one value per captured field, in line order.
    pub fn encode<S: AsRef<str>>(&self, fields: &[S]) -> String {
        debug_assert_eq!(
            fields.len(),
            self.field_count(),
            "{} expects {} fields",
            self.record,
            self.field_count()
        );

        let mut out = String::new();
        let mut values = fields.iter();
        for token in self.tokens {
            match token {
                Token::Lit(lit) => out.push_str(lit),
                Token::Field(..) => {
                    if let Some(value) = values.next() {
                        out.push_str(value.as_ref());
                    }
                }
            }
        }
        out
    }
}

/// Backtracking matcher for one line against one token table.
///
/// Whether the tokens from `index` onwards match the line from `pos` does not
/// depend on how `pos` was reached, so each failed `(index, pos)` state is
/// recorded and never explored twice. A text field that fails from `pos`
/// also fails from every later position, since its candidate ends are then a
/// subset; `text_fails_from` keeps the lowest such position per field and
/// bounds later candidate scans by it.
struct Matcher<'g, 'a> {
    tokens: &'g [Token],
    line: &'a str,
    captures: Vec<&'a str>,
    failed: HashSet<(usize, usize)>,
    text_fails_from: Vec<Option<usize>>,
}

impl<'g, 'a> Matcher<'g, 'a> {
    fn new(tokens: &'g [Token], line: &'a str, fields: usize) -> Self {
        Self {
            tokens,
            line,
            captures: Vec::with_capacity(fields),
            failed: HashSet::new(),
            text_fails_from: vec![None; tokens.len()],
        }
    }

    fn match_at(&mut self, index: usize, pos: usize) -> bool {
        let Some(&token) = self.tokens.get(index) else {
            return pos == self.line.len();
        };
        if self.failed.contains(&(index, pos)) {
            return false;
        }
        let line = self.line;
        let tail = &line[pos..];

        let matched = match token {
            Token::Lit(lit) => tail.starts_with(lit) && self.match_at(index + 1, pos + lit.len()),
            Token::Field(_, FieldKind::Text) => self.match_text(index, pos),
            Token::Field(_, FieldKind::Choice(words)) => words
                .iter()
                .filter(|word| tail.starts_with(**word))
                .any(|word| self.capture(index, pos, word.len())),
            Token::Field(_, kind) => match fixed_len(kind, tail) {
                Some(len) => self.capture(index, pos, len),
                None => false,
            },
        };

        if !matched {
            self.failed.insert((index, pos));
        }
        matched
    }

    /// Try the text field at `index` from `pos`, longest candidate first.
    fn match_text(&mut self, index: usize, pos: usize) -> bool {
        let line = self.line;
        let bound = self.text_fails_from[index].unwrap_or(line.len() + 1);
        if pos >= bound {
            return false;
        }

        // Ends at or past `bound` were already tried from `bound` and failed.
        let lens = text_candidates(&line[pos..], self.tokens.get(index + 1), bound - pos);
        let matched = lens.into_iter().rev().any(|len| self.capture(index, pos, len));
        if !matched {
            self.text_fails_from[index] = Some(pos);
        }
        matched
    }

    fn capture(&mut self, index: usize, pos: usize, len: usize) -> bool {
        let line = self.line;
        self.captures.push(&line[pos..pos + len]);
        if self.match_at(index + 1, pos + len) {
            return true;
        }
        self.captures.pop();
        false
    }
}

/// Every length below `limit` a text field could take, shortest first.
fn text_candidates(tail: &str, next: Option<&Token>, limit: usize) -> Vec<usize> {
    match next {
        None if tail.len() < limit => vec![tail.len()],
        None => Vec::new(),
        Some(Token::Lit(lit)) => literal_offsets(tail, lit, limit),
        Some(Token::Field(..)) => (0..=tail.len())
            .take_while(|&i| i < limit)
            .filter(|&i| tail.is_char_boundary(i))
            .collect(),
    }
}

/// Start offsets below `limit` of every occurrence of `lit` in `tail`,
/// overlapping ones included.
fn literal_offsets(tail: &str, lit: &str, limit: usize) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut from = 0;
    while from <= tail.len() {
        let Some(found) = tail[from..].find(lit) else {
            break;
        };
        let at = from + found;
        if at >= limit {
            break;
        }
        offsets.push(at);
        from = at + tail[at..].chars().next().map_or(1, char::len_utf8);
    }
    offsets
}

fn fixed_len(kind: FieldKind, tail: &str) -> Option<usize> {
    match kind {
        FieldKind::Id => {
            let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
            (digits > 0).then_some(digits)
        }
        FieldKind::Date => shape_len(tail, b"dd/dd/dddd"),
        FieldKind::Time => shape_len(tail, b"dd:dd:dd"),
        FieldKind::Text | FieldKind::Choice(_) => None,
    }
}

/// Match a fixed shape where `d` stands for an ASCII digit and any other
/// byte must appear verbatim.
fn shape_len(tail: &str, shape: &[u8]) -> Option<usize> {
    let bytes = tail.as_bytes();
    if bytes.len() < shape.len() {
        return None;
    }
    let fits = shape.iter().zip(bytes).all(|(s, b)| match s {
        b'd' => b.is_ascii_digit(),
        other => other == b,
    });
    fits.then_some(shape.len())
}

/// A record that lives on exactly one line of a metadata file.
///
/// Implementors name their grammar and convert between the captured field
/// text and their typed form. `parse_line` and `render` come for free and
/// satisfy `parse_line(&r.render()) == Ok(r)` for every record whose text
/// fields contain no quotes or line breaks.
pub trait LineRecord: Sized {
    /// The line layout of this record.
    const GRAMMAR: &'static Grammar;

    /// Build a record from captures produced by [`Grammar::decode`].
    fn from_captures(captures: &[&str]) -> Result<Self>;

    /// Field values in line order, ready for [`Grammar::encode`].
    fn to_fields(&self) -> Vec<String>;

    /// Decode one line. Failure is a [`TypeError::LineMismatch`].
    fn parse_line(line: &str) -> Result<Self> {
        let grammar = Self::GRAMMAR;
        let captures = grammar
            .decode(line)
            .ok_or_else(|| TypeError::LineMismatch {
                record: grammar.record,
                line: line.to_string(),
                reason: "layout mismatch".to_string(),
            })?;

        Self::from_captures(&captures).map_err(|e| TypeError::LineMismatch {
            record: grammar.record,
            line: line.to_string(),
            reason: e.to_string(),
        })
    }

    /// The canonical line for this record.
    fn render(&self) -> String {
        Self::GRAMMAR.encode(&self.to_fields())
    }
}

/// Parse a captured id field.
pub(crate) fn parse_id(field: &'static str, value: &str) -> Result<u32> {
    value
        .parse::<u32>()
        .map_err(|e| TypeError::invalid_field(field, value, e.to_string()))
}
