use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::token::TT;
use crate::token::TT::*;

fn check<const N: usize>(code: &str, expecteds: [TT; N]) {
  let mut lexer = Lexer::new(code);
  for expected in expecteds {
    let t = lex_next(&mut lexer, LexMode::Standard);
    assert_eq!(t.typ, expected);
  }
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(EOF, t.typ);
}

#[test]
fn test_lex_keywords() {
  check("class", [KeywordClass]);
  check("instanceof", [KeywordInstanceof]);
  check("interface", [KeywordInterface]);
  check("constructor", [KeywordConstructor]);
}

#[test]
fn test_lex_identifiers() {
  check("h929", [Identifier]);
  check("classes", [Identifier]);
  check("lettuce", [Identifier]);
  check("_private", [Identifier]);
  check("$dollar", [Identifier]);
  check("naïve", [Identifier]);
}

#[test]
fn test_lex_literal_numbers() {
  check("1", [LiteralNumber]);
  check("929", [LiteralNumber]);
  check(".929", [LiteralNumber]);
  check(". 929", [Dot, LiteralNumber]);
  check("3.14", [LiteralNumber]);
  check("1e10", [LiteralNumber]);
  check("1.5e-3", [LiteralNumber]);
  check("2E+8", [LiteralNumber]);
  check("1e", [Invalid]);
  check("123abc", [Invalid]);
  check("0x1f", [Invalid]);
  check("0b101", [Invalid]);
}

#[test]
fn test_lex_literal_strings() {
  check("'hello world'", [LiteralString]);
  check("\"hello world\"", [LiteralString]);
  check("'it\\'s'", [LiteralString]);
  check("'hello world\n'", [Invalid, Invalid]);
  check("'unterminated", [Invalid]);
}

#[test]
fn test_lex_template_literals() {
  check("`plain`", [LiteralTemplatePartStringEnd]);
  // A part ending in `${` means an interpolation follows.
  check("`a${", [LiteralTemplatePartString]);
  check("`unterminated", [Invalid]);
}

#[test]
fn test_lex_template_continue_mode() {
  let mut lexer = Lexer::new("`a${b}c`");
  assert_eq!(
    lex_next(&mut lexer, LexMode::Standard).typ,
    LiteralTemplatePartString
  );
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, Identifier);
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, BraceClose);
  assert_eq!(
    lex_next(&mut lexer, LexMode::TemplateStrContinue).typ,
    LiteralTemplatePartStringEnd
  );
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, EOF);
}

#[test]
fn test_lex_operators_longest_match() {
  check("= == ===", [Equals, EqualsEquals, EqualsEqualsEquals]);
  check("=>", [EqualsChevronRight]);
  check("! != !==", [Exclamation, ExclamationEquals, ExclamationEqualsEquals]);
  check("+ ++ +=", [Plus, PlusPlus, PlusEquals]);
  check("** *", [AsteriskAsterisk, Asterisk]);
  check("?? ?", [QuestionQuestion, Question]);
  check("...", [DotDotDot]);
}

#[test]
fn test_lex_comments() {
  check("a // comment\nb", [Identifier, Identifier]);
  check("a /* multi\nline */ b", [Identifier, Identifier]);
  check("/* unterminated", [Invalid]);
}

#[test]
fn test_lex_preceded_by_line_terminator() {
  let mut lexer = Lexer::new("a\nb c");
  assert!(!lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
  assert!(lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
  assert!(!lex_next(&mut lexer, LexMode::Standard).preceded_by_line_terminator);
}

#[test]
fn test_lex_invalid_character() {
  check("#", [Invalid]);
}

#[test]
fn test_lex_statement() {
  check("const x = [1, 2].map(v => v * 2);", [
    KeywordConst,
    Identifier,
    Equals,
    BracketOpen,
    LiteralNumber,
    Comma,
    LiteralNumber,
    BracketClose,
    Dot,
    Identifier,
    ParenthesisOpen,
    Identifier,
    EqualsChevronRight,
    Identifier,
    Asterisk,
    LiteralNumber,
    ParenthesisClose,
    Semicolon,
  ]);
}
