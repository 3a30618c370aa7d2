use super::ParseCtx;
use super::Parser;
use crate::ast::node::Node;
use crate::ast::stx::TopLevel;
use crate::error::SyntaxError;
use crate::token::TT;

impl<'a> Parser<'a> {
  /// Parses a whole source file.
  ///
  /// Statements that fail to parse are recorded and skipped; parsing resumes
  /// at the next plausible declaration boundary, so one malformed declaration
  /// does not hide errors in the rest of the file. The returned tree contains
  /// every statement that parsed cleanly.
  pub fn parse_top_level(&mut self, ctx: ParseCtx) -> (Node<TopLevel>, Vec<SyntaxError>) {
    let mut body = Vec::new();
    let mut errors = Vec::new();
    loop {
      let t = self.peek();
      if t.typ == TT::EOF {
        break;
      }
      if t.typ == TT::Semicolon {
        self.consume();
        continue;
      }
      match self.stmt(ctx) {
        Ok(stmt) => body.push(stmt),
        Err(err) => {
          errors.push(err);
          self.skip_to_next_top_level();
        }
      };
    }
    let loc = self.source_range();
    (Node::new(loc, TopLevel { body }), errors)
  }

  /// Best-effort resynchronisation after a parse error: consume tokens until
  /// a top-level semicolon, a brace-balanced close, or the start of the next
  /// declaration.
  fn skip_to_next_top_level(&mut self) {
    let mut depth = 0usize;
    let mut consumed = 0usize;
    loop {
      let t = self.peek();
      match t.typ {
        TT::EOF => return,
        TT::KeywordClass
        | TT::KeywordConst
        | TT::KeywordFunction
        | TT::KeywordInterface
        | TT::KeywordLet
        | TT::KeywordVar
          if depth == 0 && consumed > 0 =>
        {
          return
        }
        _ => {}
      };
      let t = self.consume();
      consumed += 1;
      match t.typ {
        TT::BraceOpen => depth += 1,
        TT::BraceClose => {
          if depth <= 1 {
            return;
          }
          depth -= 1;
        }
        TT::Semicolon if depth == 0 => return,
        _ => {}
      };
    }
  }
}
