use crate::loc::LineIndex;
use crate::loc::Loc;
use crate::token::TT;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use serde::Serialize;
use std::error::Error;
use std::fmt::Display;

/// A stable classification of syntax errors produced by the lexer and parser.
///
/// Variants that describe a malformed token (rather than a construct outside
/// the supported grammar) report [`Stage::Lex`] from [`SyntaxErrorType::stage`];
/// everything else is a parse error.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedSyntax(&'static str),
  InvalidCharacter,
  InvalidCharacterEscape,
  MalformedLiteralNumber,
  RequiredTokenNotFound(TT),
  TypeScriptOnly(&'static str),
  UnexpectedEnd,
  UnsupportedSyntax(&'static str),
  UnterminatedComment,
  UnterminatedString,
  UnterminatedTemplate,
}

impl SyntaxErrorType {
  pub fn stage(&self) -> Stage {
    match self {
      SyntaxErrorType::InvalidCharacter
      | SyntaxErrorType::InvalidCharacterEscape
      | SyntaxErrorType::MalformedLiteralNumber
      | SyntaxErrorType::UnterminatedComment
      | SyntaxErrorType::UnterminatedString
      | SyntaxErrorType::UnterminatedTemplate => Stage::Lex,
      _ => Stage::Parse,
    }
  }

  /// Human-readable message describing this syntax error.
  pub fn message(&self, actual_token: Option<TT>) -> String {
    match self {
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {}", expected),
      SyntaxErrorType::InvalidCharacter => "invalid character".into(),
      SyntaxErrorType::InvalidCharacterEscape => "invalid character escape".into(),
      SyntaxErrorType::MalformedLiteralNumber => "malformed number literal".into(),
      SyntaxErrorType::RequiredTokenNotFound(token) => format!("expected token {:?}", token),
      SyntaxErrorType::TypeScriptOnly(construct) => {
        format!("{} is only supported in TypeScript mode", construct)
      }
      SyntaxErrorType::UnsupportedSyntax(construct) => {
        format!("{} is not supported", construct)
      }
      SyntaxErrorType::UnterminatedComment => "unterminated block comment".into(),
      SyntaxErrorType::UnterminatedString => "unterminated string literal".into(),
      SyntaxErrorType::UnterminatedTemplate => "unterminated template literal".into(),
      SyntaxErrorType::UnexpectedEnd => actual_token
        .map(|tok| format!("unexpected end before {:?}", tok))
        .unwrap_or_else(|| "unexpected end of input".into()),
    }
  }
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Loc,
  pub actual_token: Option<TT>,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, loc: Loc, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError {
      typ,
      loc,
      actual_token,
    }
  }

  pub fn to_diagnostic(&self, lines: &LineIndex) -> Diagnostic {
    Diagnostic::error(
      self.typ.stage(),
      self.typ.message(self.actual_token),
      self.loc,
      lines,
    )
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{:?} [token={:?}]", self.typ, self.actual_token)
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// A construct that parsed fine but cannot be faithfully expressed in Python.
///
/// These are hard failures: emitting Python that silently drops or reorders a
/// semantic effect present in the source is never acceptable.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum TransformErrorType {
  AssignmentInExpressionPosition,
  ThisOutsideClass,
  UnboundIdentifier(String),
  UnsupportedCall(String),
  UnsupportedCallback(&'static str),
  UnsupportedChain(String),
  UnsupportedConstruct(&'static str),
}

impl TransformErrorType {
  pub fn message(&self) -> String {
    match self {
      TransformErrorType::AssignmentInExpressionPosition => {
        "assignment is only supported in statement position".into()
      }
      TransformErrorType::ThisOutsideClass => {
        "`this` is only supported inside class methods or as `this.box`/`this.unbox`".into()
      }
      TransformErrorType::UnboundIdentifier(name) => format!(
        "`{}` is not defined in this conversion unit; closures capturing outer variables are not supported",
        name
      ),
      TransformErrorType::UnsupportedCall(callee) => {
        format!("`{}` has no Python equivalent", callee)
      }
      TransformErrorType::UnsupportedCallback(method) => format!(
        "`.{}` requires a single arrow-function argument",
        method
      ),
      TransformErrorType::UnsupportedChain(shape) => {
        format!("unsupported array method chain: {}", shape)
      }
      TransformErrorType::UnsupportedConstruct(construct) => {
        format!("{} cannot be converted to Python", construct)
      }
    }
  }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TransformError {
  pub typ: TransformErrorType,
  pub loc: Loc,
}

impl TransformError {
  pub fn new(typ: TransformErrorType, loc: Loc) -> TransformError {
    TransformError { typ, loc }
  }

  pub fn to_diagnostic(&self, lines: &LineIndex) -> Diagnostic {
    Diagnostic::error(Stage::Transform, self.typ.message(), self.loc, lines)
  }
}

impl Display for TransformError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self.typ.message(), self.loc.0, self.loc.1)
  }
}

impl Error for TransformError {}

pub type TransformResult<T> = Result<T, TransformError>;

/// Pipeline stage a diagnostic originated from.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum Stage {
  Lex,
  Parse,
  Transform,
  Generate,
  Validate,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum Severity {
  Error,
  Warning,
}

/// A structured diagnostic with a 1-based source position.
///
/// Diagnostics are data, not formatted strings; the caller decides how to
/// render or filter them.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Diagnostic {
  pub stage: Stage,
  pub severity: Severity,
  pub message: String,
  pub line: u32,
  pub col: u32,
}

impl Diagnostic {
  pub fn error(stage: Stage, message: String, loc: Loc, lines: &LineIndex) -> Diagnostic {
    let (line, col) = lines.line_col(loc.0);
    Diagnostic {
      stage,
      severity: Severity::Error,
      message,
      line,
      col,
    }
  }

  pub fn warning(stage: Stage, message: String, loc: Loc, lines: &LineIndex) -> Diagnostic {
    let (line, col) = lines.line_col(loc.0);
    Diagnostic {
      stage,
      severity: Severity::Warning,
      message,
      line,
      col,
    }
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{:?} {:?} at {}:{}: {}",
      self.severity, self.stage, self.line, self.col, self.message
    )
  }
}
