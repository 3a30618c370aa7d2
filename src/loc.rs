use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;

/// A half-open range of UTF-8 byte offsets within the current source file.
///
/// A location is not guaranteed to correspond to real source text; the
/// transformer creates entirely new nodes whose locations are borrowed from
/// the JS nodes they were derived from, which keeps diagnostics traceable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }
}

/// Maps byte offsets to 1-based line/column pairs for diagnostics.
///
/// Columns count Unicode scalar values, not bytes, so a caller rendering a
/// caret under the offending character lands in the right place.
pub struct LineIndex {
  line_starts: Vec<usize>,
  source: String,
}

impl LineIndex {
  pub fn new(source: &str) -> LineIndex {
    let mut line_starts = vec![0];
    for (i, b) in source.bytes().enumerate() {
      if b == b'\n' {
        line_starts.push(i + 1);
      };
    }
    LineIndex {
      line_starts,
      source: source.to_string(),
    }
  }

  /// Returns the 1-based (line, column) of a byte offset. Offsets past the
  /// end of the source resolve to just after the final character.
  pub fn line_col(&self, offset: usize) -> (u32, u32) {
    let offset = offset.min(self.source.len());
    let line = match self.line_starts.binary_search(&offset) {
      Ok(exact) => exact,
      Err(next) => next - 1,
    };
    let col = self.source[self.line_starts[line]..offset].chars().count();
    ((line + 1) as u32, (col + 1) as u32)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn line_col_is_one_based() {
    let idx = LineIndex::new("ab\ncd\n");
    assert_eq!(idx.line_col(0), (1, 1));
    assert_eq!(idx.line_col(1), (1, 2));
    assert_eq!(idx.line_col(3), (2, 1));
    assert_eq!(idx.line_col(4), (2, 2));
  }

  #[test]
  fn line_col_clamps_past_end() {
    let idx = LineIndex::new("ab");
    assert_eq!(idx.line_col(100), (1, 3));
  }

  #[test]
  fn line_col_counts_chars_not_bytes() {
    let idx = LineIndex::new("é x");
    assert_eq!(idx.line_col(2), (1, 2));
  }
}
