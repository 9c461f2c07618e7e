//! How a delimited file is laid out.

use std::borrow::Cow;

use encoding_rs::{UTF_8, WINDOWS_1252};
use serde::Deserialize;

use crate::{Error, Result};

/// Character encoding of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
  Utf8,
  /// Read as windows-1252, the superset of Latin-1 that spreadsheet exports
  /// actually produce.
  Latin1,
  /// UTF-8 when the bytes are valid UTF-8, windows-1252 otherwise.
  #[default]
  Auto,
}

impl TextEncoding {
  /// Decode `bytes`, dropping a leading byte-order mark.
  pub fn decode<'a>(self, bytes: &'a [u8], origin: &str) -> Result<Cow<'a, str>> {
    match self {
      TextEncoding::Utf8 => decode_utf8(bytes).ok_or_else(|| Error::Encoding(origin.to_owned())),
      TextEncoding::Latin1 => Ok(decode_latin1(bytes)),
      TextEncoding::Auto => Ok(match decode_utf8(bytes) {
        Some(text) => text,
        None => {
          tracing::debug!(origin, "input is not UTF-8, decoding as windows-1252");
          decode_latin1(bytes)
        }
      }),
    }
  }
}

fn decode_utf8(bytes: &[u8]) -> Option<Cow<'_, str>> {
  let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
  (!had_errors).then_some(text)
}

fn decode_latin1(bytes: &[u8]) -> Cow<'_, str> {
  let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
  text
}

/// Layout of one dataset's file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Dialect {
  pub separator:           char,
  /// Lines to skip before the header line.
  pub header_row_offset:   usize,
  /// Records to discard from the end (totals, source notes).
  pub footer_rows_to_drop: usize,
  pub encoding:            TextEncoding,
  /// Columns that must be present; checked eagerly when the file is read.
  pub required_columns:    Vec<String>,
}

impl Default for Dialect {
  fn default() -> Self {
    Self {
      separator:           ',',
      header_row_offset:   0,
      footer_rows_to_drop: 0,
      encoding:            TextEncoding::Auto,
      required_columns:    Vec::new(),
    }
  }
}

impl Dialect {
  pub fn separator(mut self, separator: char) -> Self {
    self.separator = separator;
    self
  }

  pub fn skip_header_rows(mut self, rows: usize) -> Self {
    self.header_row_offset = rows;
    self
  }

  pub fn drop_footer_rows(mut self, rows: usize) -> Self {
    self.footer_rows_to_drop = rows;
    self
  }

  pub fn encoding(mut self, encoding: TextEncoding) -> Self {
    self.encoding = encoding;
    self
  }

  pub fn require<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
    self
      .required_columns
      .extend(columns.iter().map(|c| c.as_ref().to_owned()));
    self
  }

  pub(crate) fn delimiter(&self) -> Result<u8> {
    if self.separator.is_ascii() {
      Ok(self.separator as u8)
    } else {
      Err(Error::Separator(self.separator))
    }
  }
}
