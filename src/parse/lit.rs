use super::expr::is_valid_identifier;
use super::ParseCtx;
use super::Parser;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::class_or_object::ObjMember;
use crate::ast::expr::LitArrExpr;
use crate::ast::expr::LitBoolExpr;
use crate::ast::expr::LitNullExpr;
use crate::ast::expr::LitNumExpr;
use crate::ast::expr::LitObjExpr;
use crate::ast::expr::LitStrExpr;
use crate::ast::expr::LitTemplateExpr;
use crate::ast::expr::LitTemplatePart;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::LexMode;
use crate::loc::Loc;
use crate::token::TT;

/// Decodes the escape sequences in the contents of a string or template
/// literal. `base` is the source offset of `content`, for error locations.
///
/// Unknown single-character escapes resolve to the character itself, per
/// ECMAScript NonEscapeCharacter; malformed `\x` and `\u` sequences are
/// errors.
pub fn decode_escapes(content: &str, base: usize) -> SyntaxResult<String> {
  let mut out = String::with_capacity(content.len());
  let mut it = content.char_indices();
  while let Some((i, c)) = it.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    let err = |len: usize| Loc(base + i, base + i + len).error(SyntaxErrorType::InvalidCharacterEscape, None);
    let Some((_, esc)) = it.next() else {
      return Err(err(1));
    };
    match esc {
      'n' => out.push('\n'),
      't' => out.push('\t'),
      'r' => out.push('\r'),
      'b' => out.push('\u{8}'),
      'f' => out.push('\u{c}'),
      'v' => out.push('\u{b}'),
      '0' => out.push('\0'),
      'x' => {
        let mut v = 0u32;
        for _ in 0..2 {
          let Some(d) = it.next().and_then(|(_, h)| h.to_digit(16)) else {
            return Err(err(4));
          };
          v = v * 16 + d;
        }
        match char::from_u32(v) {
          Some(c) => out.push(c),
          None => return Err(err(4)),
        };
      }
      'u' => {
        let v = match it.next() {
          Some((_, '{')) => {
            let mut v = 0u32;
            let mut any = false;
            loop {
              match it.next() {
                Some((_, '}')) => break,
                Some((_, h)) => {
                  let Some(d) = h.to_digit(16) else {
                    return Err(err(2));
                  };
                  any = true;
                  v = v * 16 + d;
                  if v > 0x10ffff {
                    return Err(err(2));
                  }
                }
                None => return Err(err(2)),
              };
            }
            if !any {
              return Err(err(2));
            }
            v
          }
          Some((_, h)) => {
            let mut v = match h.to_digit(16) {
              Some(d) => d,
              None => return Err(err(2)),
            };
            for _ in 0..3 {
              let Some(d) = it.next().and_then(|(_, h)| h.to_digit(16)) else {
                return Err(err(6));
              };
              v = v * 16 + d;
            }
            v
          }
          None => return Err(err(2)),
        };
        match char::from_u32(v) {
          Some(c) => out.push(c),
          None => return Err(err(6)),
        };
      }
      // Line continuation.
      '\n' | '\r' | '\u{2028}' | '\u{2029}' => {}
      _ => out.push(esc),
    };
  }
  Ok(out)
}

impl<'a> Parser<'a> {
  pub fn lit_bool(&mut self) -> SyntaxResult<Node<LitBoolExpr>> {
    let t = self.consume();
    let value = match t.typ {
      TT::LiteralTrue => true,
      TT::LiteralFalse => false,
      _ => return Err(self.error_at(&t, SyntaxErrorType::ExpectedSyntax("boolean literal"))),
    };
    Ok(Node::new(t.loc, LitBoolExpr { value }))
  }

  pub fn lit_null(&mut self) -> SyntaxResult<Node<LitNullExpr>> {
    let t = self.require(TT::LiteralNull)?;
    Ok(Node::new(t.loc, LitNullExpr {}))
  }

  pub fn lit_num(&mut self) -> SyntaxResult<Node<LitNumExpr>> {
    let t = self.require(TT::LiteralNumber)?;
    Ok(Node::new(t.loc, LitNumExpr {
      raw: self.string(t.loc),
    }))
  }

  pub fn lit_str(&mut self) -> SyntaxResult<Node<LitStrExpr>> {
    let t = self.require(TT::LiteralString)?;
    let raw = self.string(t.loc);
    let content = &raw[1..raw.len() - 1];
    let value = decode_escapes(content, t.loc.0 + 1)?;
    Ok(Node::new(t.loc, LitStrExpr { value }))
  }

  pub fn lit_arr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitArrExpr>> {
    self.with_loc(|p| {
      p.require(TT::BracketOpen)?;
      let mut elements = Vec::new();
      loop {
        if p.consume_if(TT::BracketClose).is_match() {
          break;
        }
        let t = p.peek();
        if t.typ == TT::DotDotDot {
          return Err(p.error_at(&t, SyntaxErrorType::UnsupportedSyntax("spread elements")));
        }
        elements.push(p.expr(ctx, &[TT::Comma, TT::BracketClose])?);
        if !p.consume_if(TT::Comma).is_match() {
          p.require(TT::BracketClose)?;
          break;
        }
      }
      Ok(LitArrExpr { elements })
    })
  }

  pub fn lit_obj(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitObjExpr>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let mut members = Vec::new();
      loop {
        if p.consume_if(TT::BraceClose).is_match() {
          break;
        }
        members.push(p.obj_member(ctx)?);
        if !p.consume_if(TT::Comma).is_match() {
          p.require(TT::BraceClose)?;
          break;
        }
      }
      Ok(LitObjExpr { members })
    })
  }

  fn obj_member(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ObjMember>> {
    self.with_loc(|p| {
      let t = p.peek();
      match t.typ {
        TT::DotDotDot => {
          return Err(p.error_at(&t, SyntaxErrorType::UnsupportedSyntax("spread properties")))
        }
        TT::BracketOpen => {
          return Err(p.error_at(
            &t,
            SyntaxErrorType::UnsupportedSyntax("computed property keys"),
          ))
        }
        TT::LiteralNumber => {
          return Err(p.error_at(
            &t,
            SyntaxErrorType::UnsupportedSyntax("numeric property keys"),
          ))
        }
        _ => {}
      };
      let key_typ = t.typ;
      let key = p.with_loc(|p| {
        let t = p.consume();
        let key = if t.typ == TT::LiteralString {
          let raw = p.string(t.loc);
          decode_escapes(&raw[1..raw.len() - 1], t.loc.0 + 1)?
        } else if is_valid_identifier(t.typ) || is_word_token(p.str(t.loc)) {
          p.string(t.loc)
        } else {
          return Err(p.error_at(&t, SyntaxErrorType::ExpectedSyntax("property key")));
        };
        Ok(ClassOrObjKey { key })
      })?;
      let next = p.peek();
      match next.typ {
        TT::Colon => {
          p.consume();
          let value = p.expr(ctx, &[TT::Comma, TT::BraceClose])?;
          Ok(ObjMember::Valued { key, value })
        }
        TT::ParenthesisOpen => {
          Err(p.error_at(&next, SyntaxErrorType::UnsupportedSyntax("object methods")))
        }
        TT::Comma | TT::BraceClose if key_typ == TT::Identifier => Ok(ObjMember::Shorthand {
          name: key.stx.key.clone(),
        }),
        _ => Err(p.error_at(&next, SyntaxErrorType::ExpectedSyntax("property value"))),
      }
    })
  }

  pub fn lit_template(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LitTemplateExpr>> {
    self.with_loc(|p| {
      let head = p.consume();
      let mut ended = match head.typ {
        TT::LiteralTemplatePartString => false,
        TT::LiteralTemplatePartStringEnd => true,
        _ => return Err(p.error_at(&head, SyntaxErrorType::ExpectedSyntax("template literal"))),
      };
      let mut parts = Vec::new();
      // The head token includes the opening backtick and the trailing `${` or
      // closing backtick.
      let raw = p.string(head.loc);
      let content = &raw[1..raw.len() - if ended { 1 } else { 2 }];
      parts.push(LitTemplatePart::Str(decode_escapes(
        content,
        head.loc.0 + 1,
      )?));
      while !ended {
        let substitution = p.expr(ctx, &[TT::BraceClose])?;
        p.require(TT::BraceClose)?;
        parts.push(LitTemplatePart::Expr(substitution));
        let t = p.consume_with_mode(LexMode::TemplateStrContinue);
        ended = match t.typ {
          TT::LiteralTemplatePartString => false,
          TT::LiteralTemplatePartStringEnd => true,
          _ => return Err(t.error(SyntaxErrorType::UnterminatedTemplate)),
        };
        let raw = p.string(t.loc);
        let content = &raw[..raw.len() - if ended { 1 } else { 2 }];
        parts.push(LitTemplatePart::Str(decode_escapes(content, t.loc.0)?));
      }
      Ok(LitTemplateExpr { parts })
    })
  }
}

/// Keyword tokens may be used as property keys; they lex as their keyword
/// type but their text is a plain word.
pub(crate) fn is_word_token(text: &str) -> bool {
  !text.is_empty()
    && text
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '$' || c == '_')
}
