//! Source text bookkeeping: files, byte spans, position lookup.

use std::fmt;

/// Index of a file registered in the [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileId(pub u32);

/// A half-open byte range `[lo, hi)` within one source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span {
  pub file: FileId,
  pub lo: u32,
  pub hi: u32,
}

impl Span {
  pub fn new(
    file: FileId,
    lo: u32,
    hi: u32,
  ) -> Self {
    debug_assert!(lo <= hi, "span bounds out of order: {}..{}", lo, hi);
    Self { file, lo, hi }
  }

  /// The smallest span covering both this one and `end`.
  pub fn to(
    &self,
    end: &Span,
  ) -> Span {
    debug_assert_eq!(self.file, end.file, "cannot join spans from different files");
    Span {
      file: self.file,
      lo: self.lo.min(end.lo),
      hi: self.hi.max(end.hi),
    }
  }

  pub fn len(&self) -> u32 {
    self.hi.saturating_sub(self.lo)
  }

  pub fn is_empty(&self) -> bool {
    self.hi <= self.lo
  }
}

impl fmt::Display for Span {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{}..{}", self.lo, self.hi)
  }
}

pub struct SourceFile {
  pub name: String,
  pub text: String,
}

/// The files of one compilation, addressed by [`FileId`].
///
/// Positions are recovered by scanning the text on demand. Diagnostics
/// are rare, files are small, and keeping no line table means there is
/// no table to keep in sync.
#[derive(Default)]
pub struct SourceMap {
  files: Vec<SourceFile>,
}

impl SourceMap {
  pub fn new() -> Self {
    Self { files: Vec::new() }
  }

  pub fn add_file(
    &mut self,
    name: impl Into<String>,
    text: String,
  ) -> FileId {
    let id = FileId(self.files.len() as u32);
    self.files.push(SourceFile {
      name: name.into(),
      text,
    });
    id
  }

  pub fn file(
    &self,
    id: FileId,
  ) -> &SourceFile {
    &self.files[id.0 as usize]
  }

  /// 1-based line and column of a span's start, counting columns in
  /// characters.
  pub fn line_col(
    &self,
    span: &Span,
  ) -> (u32, u32) {
    let text = &self.file(span.file).text;
    let upto = (span.lo as usize).min(text.len());

    let mut line = 1u32;
    let mut col = 1u32;
    for c in text[..upto].chars() {
      if c == '\n' {
        line += 1;
        col = 1;
      } else {
        col += 1;
      }
    }
    (line, col)
  }

  /// The text of a 1-based line, without its terminator. Out-of-range
  /// lines come back empty.
  pub fn line_text(
    &self,
    file: FileId,
    line: u32,
  ) -> &str {
    self
      .file(file)
      .text
      .lines()
      .nth(line.saturating_sub(1) as usize)
      .unwrap_or("")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn map_with(text: &str) -> (SourceMap, FileId) {
    let mut sm = SourceMap::new();
    let id = sm.add_file("test.fo", text.to_string());
    (sm, id)
  }

  #[test]
  fn positions_are_one_based() {
    let (sm, file) = map_with("ab\ncd\nef");
    assert_eq!(sm.line_col(&Span::new(file, 0, 1)), (1, 1));
    assert_eq!(sm.line_col(&Span::new(file, 4, 5)), (2, 2));
    assert_eq!(sm.line_col(&Span::new(file, 6, 8)), (3, 1));
  }

  #[test]
  fn line_text_strips_terminators() {
    let (sm, file) = map_with("first\nsecond\n");
    assert_eq!(sm.line_text(file, 1), "first");
    assert_eq!(sm.line_text(file, 2), "second");
    assert_eq!(sm.line_text(file, 9), "");
  }

  #[test]
  fn spans_join_to_the_enclosing_range() {
    let file = FileId(0);
    let a = Span::new(file, 2, 5);
    let b = Span::new(file, 8, 11);
    assert_eq!(a.to(&b), Span::new(file, 2, 11));
    assert_eq!(b.to(&a), Span::new(file, 2, 11));
  }
}
