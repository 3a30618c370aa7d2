use super::expr::is_valid_identifier;
use super::ParseCtx;
use super::Parser;
use crate::ast::node::Node;
use crate::ast::type_expr::TypeArray;
use crate::ast::type_expr::TypeExpr;
use crate::ast::type_expr::TypeGeneric;
use crate::ast::type_expr::TypeNamed;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::TT;

impl<'a> Parser<'a> {
  pub fn type_expr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<TypeExpr>> {
    let mut typ = self.type_expr_operand(ctx)?;
    loop {
      let t = self.peek();
      match t.typ {
        // `T[]`.
        TT::BracketOpen => {
          self.consume();
          let close = self.require(TT::BracketClose)?;
          let loc = Loc(typ.loc.0, close.loc.1);
          typ = Node::new(loc, TypeExpr::Array(Node::new(loc, TypeArray { element: typ })));
        }
        TT::Bar => {
          return Err(self.error_at(&t, SyntaxErrorType::UnsupportedSyntax("union types")))
        }
        TT::Ampersand => {
          return Err(self.error_at(
            &t,
            SyntaxErrorType::UnsupportedSyntax("intersection types"),
          ))
        }
        _ => break,
      };
    }
    Ok(typ)
  }

  fn type_expr_operand(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<TypeExpr>> {
    let t = self.consume();
    if !is_valid_identifier(t.typ) && t.typ != TT::KeywordVoid {
      return Err(self.error_at(&t, SyntaxErrorType::ExpectedSyntax("type")));
    }
    let name = self.string(t.loc);
    if self.consume_if(TT::ChevronLeft).is_match() {
      let mut arguments = Vec::new();
      loop {
        arguments.push(self.type_expr(ctx)?);
        if !self.consume_if(TT::Comma).is_match() {
          break;
        }
      }
      let close = self.require(TT::ChevronRight)?;
      let loc = Loc(t.loc.0, close.loc.1);
      return Ok(Node::new(
        loc,
        TypeExpr::Generic(Node::new(loc, TypeGeneric { name, arguments })),
      ));
    }
    Ok(Node::new(
      t.loc,
      TypeExpr::Named(Node::new(t.loc, TypeNamed { name })),
    ))
  }
}
