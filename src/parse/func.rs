use super::ParseCtx;
use super::Parser;
use crate::ast::func::ClassOrFuncName;
use crate::ast::func::Func;
use crate::ast::func::FuncBody;
use crate::ast::func::ParamDecl;
use crate::ast::node::Node;
use crate::ast::stmt::FuncDecl;
use crate::ast::type_expr::TypeExpr;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::token::TT;
use crate::Mode;

impl<'a> Parser<'a> {
  pub fn class_or_func_name(&mut self) -> SyntaxResult<Node<ClassOrFuncName>> {
    self.with_loc(|p| {
      Ok(ClassOrFuncName {
        name: p.id_name()?,
      })
    })
  }

  pub fn func_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<FuncDecl>> {
    self.with_loc(|p| {
      p.require(TT::KeywordFunction)?;
      let t = p.peek();
      if t.typ == TT::Asterisk {
        return Err(p.error_at(&t, SyntaxErrorType::UnsupportedSyntax("generator functions")));
      }
      let name = p.class_or_func_name()?;
      let function = p.with_loc(|p| {
        let parameters = p.func_params(ctx)?;
        let return_type = p.func_return_type(ctx)?;
        p.require(TT::BraceOpen)?;
        let body = p.stmts(ctx, TT::BraceClose)?;
        p.require(TT::BraceClose)?;
        Ok(Func {
          arrow: false,
          parameters,
          return_type,
          body: FuncBody::Block(body),
        })
      })?;
      Ok(FuncDecl { name, function })
    })
  }

  pub fn func_params(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<Node<ParamDecl>>> {
    self.require(TT::ParenthesisOpen)?;
    let mut parameters = Vec::new();
    loop {
      if self.consume_if(TT::ParenthesisClose).is_match() {
        break;
      }
      let t = self.peek();
      match t.typ {
        TT::DotDotDot => {
          return Err(self.error_at(&t, SyntaxErrorType::UnsupportedSyntax("rest parameters")))
        }
        TT::BraceOpen | TT::BracketOpen => {
          return Err(self.error_at(
            &t,
            SyntaxErrorType::UnsupportedSyntax("destructuring patterns"),
          ))
        }
        _ => {}
      };
      parameters.push(self.param_decl(ctx)?);
      if !self.consume_if(TT::Comma).is_match() {
        self.require(TT::ParenthesisClose)?;
        break;
      }
    }
    Ok(parameters)
  }

  fn param_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ParamDecl>> {
    self.with_loc(|p| {
      let name = p.id_name()?;
      let type_annotation = p.type_annotation(ctx)?;
      let default_value = p
        .consume_if(TT::Equals)
        .and_then(|| p.expr(ctx, &[TT::Comma, TT::ParenthesisClose]))?;
      Ok(ParamDecl {
        name,
        type_annotation,
        default_value,
      })
    })
  }

  /// An optional `: Type` annotation. In JavaScript mode a colon here is an
  /// error, not silently accepted.
  pub fn type_annotation(&mut self, ctx: ParseCtx) -> SyntaxResult<Option<Node<TypeExpr>>> {
    let colon = self.consume_if(TT::Colon);
    let Some(loc) = colon.match_loc() else {
      return Ok(None);
    };
    if ctx.mode != Mode::TypeScript {
      return Err(loc.error(SyntaxErrorType::TypeScriptOnly("type annotations"), None));
    }
    Ok(Some(self.type_expr(ctx)?))
  }

  pub fn func_return_type(&mut self, ctx: ParseCtx) -> SyntaxResult<Option<Node<TypeExpr>>> {
    self.type_annotation(ctx)
  }
}
