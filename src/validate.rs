use crate::error::Diagnostic;
use crate::error::Stage;
use crate::loc::LineIndex;
use crate::loc::Loc;
use rustpython_parser::parse;
use rustpython_parser::Mode;

/// Re-parses the generated Python with a real Python parser, so an emitter
/// bug surfaces as a diagnostic here rather than when the caller runs the
/// output. The diagnostic's line/column refer to the generated Python text.
pub fn validate_python(python: &str) -> Result<(), Diagnostic> {
  match parse(python, Mode::Module, "<generated>") {
    Ok(_) => Ok(()),
    Err(err) => {
      let offset = err.offset.to_usize();
      let lines = LineIndex::new(python);
      Err(Diagnostic::error(
        Stage::Validate,
        format!("generated Python failed to parse: {}", err.error),
        Loc(offset, offset),
        &lines,
      ))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Severity;

  #[test]
  fn test_validate_accepts_valid_python() {
    assert!(validate_python("def f(x):\n    return x + 1\n").is_ok());
  }

  #[test]
  fn test_validate_rejects_bad_indentation() {
    let diagnostic = validate_python("def f():\nreturn 1\n").unwrap_err();
    assert_eq!(diagnostic.stage, Stage::Validate);
    assert_eq!(diagnostic.severity, Severity::Error);
  }
}
