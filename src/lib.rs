pub mod ast;
pub mod char;
pub mod emit;
pub mod error;
pub mod lex;
pub mod loc;
pub mod operator;
pub mod parse;
pub mod py;
pub mod token;
pub mod transform;
pub mod validate;

use crate::emit::emit_module;
use crate::error::Diagnostic;
use crate::error::Stage;
use crate::lex::Lexer;
use crate::loc::LineIndex;
use crate::parse::ParseCtx;
use crate::parse::Parser;
use crate::transform::transform_top_level;
use crate::validate::validate_python;

/// Selects whether TypeScript-only grammar (type annotations, interface
/// declarations) is accepted.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Mode {
  JavaScript,
  TypeScript,
}

pub struct Conversion {
  pub python: String,
  /// Warning diagnostics, currently only type-hint degradations.
  pub warnings: Vec<Diagnostic>,
}

/// Converts a JS/TS source file into Python source.
///
/// The output is deterministic: the same input always yields byte-identical
/// Python. On failure, every diagnostic that could be collected is returned
/// at once; a failed top-level declaration does not hide errors in its
/// siblings.
pub fn convert(source: &str, mode: Mode) -> Result<String, Vec<Diagnostic>> {
  convert_with_warnings(source, mode).map(|conversion| conversion.python)
}

/// Like [`convert`], but also surfaces warning diagnostics for accepted
/// inputs that lost fidelity (e.g. a type annotation degraded to `Any`).
pub fn convert_with_warnings(source: &str, mode: Mode) -> Result<Conversion, Vec<Diagnostic>> {
  let lines = LineIndex::new(source);
  let mut parser = Parser::new(Lexer::new(source));
  let (top_level, errors) = parser.parse_top_level(ParseCtx { mode });
  if !errors.is_empty() {
    return Err(errors.iter().map(|e| e.to_diagnostic(&lines)).collect());
  }
  let transformed = match transform_top_level(&top_level) {
    Ok(transformed) => transformed,
    Err(errors) => return Err(errors.iter().map(|e| e.to_diagnostic(&lines)).collect()),
  };
  let python = emit_module(&transformed.body);
  // The validator runs on every conversion; a generated module that does not
  // re-parse is a bug worth failing loudly on.
  if let Err(diagnostic) = validate_python(&python) {
    return Err(vec![diagnostic]);
  }
  let warnings = transformed
    .warnings
    .iter()
    .map(|w| Diagnostic::warning(Stage::Transform, w.message.clone(), w.loc, &lines))
    .collect();
  Ok(Conversion { python, warnings })
}
