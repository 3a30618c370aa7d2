use super::operator::MULTARY_OPERATOR_MAPPING;
use super::operator::UNARY_OPERATOR_MAPPING;
use super::ParseCtx;
use super::Parser;
use crate::ast::expr::ArrowFuncExpr;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::CallExpr;
use crate::ast::expr::ComputedMemberExpr;
use crate::ast::expr::CondExpr;
use crate::ast::expr::Expr;
use crate::ast::expr::IdExpr;
use crate::ast::expr::LitUndefinedExpr;
use crate::ast::expr::MemberExpr;
use crate::ast::expr::ThisExpr;
use crate::ast::expr::UnaryExpr;
use crate::ast::expr::UnaryPostfixExpr;
use crate::ast::func::Func;
use crate::ast::func::FuncBody;
use crate::ast::func::ParamDecl;
use crate::ast::node::Node;
use crate::char::ID_CONTINUE;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::operator::Associativity;
use crate::operator::OperatorName;
use crate::operator::OPERATORS;
use crate::token::UNRESERVED_KEYWORDS;
use crate::token::TT;
use crate::Mode;

/// Trackers for automatic semicolon insertion. If ASI may terminate the
/// expression being parsed, the caller must check `did_end_with_asi` instead
/// of requiring a semicolon token.
pub struct Asi {
  pub can_end_with_asi: bool,
  pub did_end_with_asi: bool,
}

impl Asi {
  pub fn can() -> Asi {
    Asi {
      can_end_with_asi: true,
      did_end_with_asi: false,
    }
  }

  pub fn no() -> Asi {
    Asi {
      can_end_with_asi: false,
      did_end_with_asi: false,
    }
  }
}

pub fn is_valid_identifier(typ: TT) -> bool {
  typ == TT::Identifier || UNRESERVED_KEYWORDS.contains(&typ)
}

impl<'a> Parser<'a> {
  pub fn id_name(&mut self) -> SyntaxResult<String> {
    let t = self.consume();
    if !is_valid_identifier(t.typ) {
      return Err(self.error_at(&t, SyntaxErrorType::ExpectedSyntax("identifier")));
    }
    Ok(self.string(t.loc))
  }

  pub fn id_expr(&mut self) -> SyntaxResult<Node<IdExpr>> {
    self.with_loc(|p| {
      Ok(IdExpr {
        name: p.id_name()?,
      })
    })
  }

  pub fn this_expr(&mut self) -> SyntaxResult<Node<ThisExpr>> {
    self.with_loc(|p| {
      p.require(TT::KeywordThis)?;
      Ok(ThisExpr {})
    })
  }

  pub fn expr(&mut self, ctx: ParseCtx, terminators: &[TT]) -> SyntaxResult<Node<Expr>> {
    self.expr_with_min_prec(ctx, 1, terminators, &mut Asi::no())
  }

  pub fn expr_with_asi(
    &mut self,
    ctx: ParseCtx,
    terminators: &[TT],
    asi: &mut Asi,
  ) -> SyntaxResult<Node<Expr>> {
    self.expr_with_min_prec(ctx, 1, terminators, asi)
  }

  /// Arguments of a call, after the opening parenthesis has been consumed.
  /// Does not consume the closing parenthesis.
  pub fn call_args(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<Node<Expr>>> {
    let mut args = Vec::new();
    loop {
      let t = self.peek();
      if t.typ == TT::ParenthesisClose {
        break;
      }
      if t.typ == TT::DotDotDot {
        return Err(self.error_at(&t, SyntaxErrorType::UnsupportedSyntax("spread arguments")));
      }
      args.push(self.expr(ctx, &[TT::Comma, TT::ParenthesisClose])?);
      if !self.consume_if(TT::Comma).is_match() {
        break;
      }
    }
    Ok(args)
  }

  /// Looks ahead from an opening parenthesis to decide whether it begins
  /// arrow function parameters or a parenthesised expression.
  fn paren_opens_arrow_params(&mut self, ctx: ParseCtx) -> bool {
    let cp = self.checkpoint();
    self.consume();
    let mut depth = 1usize;
    let is_arrow = loop {
      let t = self.consume();
      match t.typ {
        TT::ParenthesisOpen | TT::BracketOpen | TT::BraceOpen => depth += 1,
        TT::BracketClose | TT::BraceClose => depth = depth.saturating_sub(1),
        TT::ParenthesisClose => {
          depth -= 1;
          if depth == 0 {
            let next = self.peek().typ;
            break next == TT::EqualsChevronRight
              || (ctx.mode == Mode::TypeScript && next == TT::Colon);
          }
        }
        TT::EOF | TT::Invalid => break false,
        _ => {}
      }
    };
    self.restore_checkpoint(cp);
    is_arrow
  }

  fn arrow_function_or_grouping_expr(
    &mut self,
    ctx: ParseCtx,
    terminators: &[TT],
  ) -> SyntaxResult<Node<Expr>> {
    if self.paren_opens_arrow_params(ctx) {
      // The lookahead is a heuristic; `a ? (b) : c` also puts a colon after a
      // closing parenthesis. Roll back to a grouping on failure, except for
      // mode errors which would otherwise degrade into a confusing message.
      let cp = self.checkpoint();
      match self.arrow_func_expr(ctx, terminators) {
        Ok(expr) => return Ok(expr.into_wrapped()),
        Err(err) if matches!(err.typ, SyntaxErrorType::TypeScriptOnly(_)) => return Err(err),
        Err(_) => self.restore_checkpoint(cp),
      };
    }
    self.require(TT::ParenthesisOpen)?;
    let grouped = self.expr(ctx, &[TT::ParenthesisClose])?;
    self.require(TT::ParenthesisClose)?;
    Ok(grouped)
  }

  pub fn arrow_func_expr(
    &mut self,
    ctx: ParseCtx,
    terminators: &[TT],
  ) -> SyntaxResult<Node<ArrowFuncExpr>> {
    self.with_loc(|p| {
      let func = p.with_loc(|p| {
        let parameters = if p.peek().typ == TT::ParenthesisOpen {
          p.func_params(ctx)?
        } else {
          // Single parameter without parentheses.
          vec![p.with_loc(|p| {
            Ok(ParamDecl {
              name: p.id_name()?,
              type_annotation: None,
              default_value: None,
            })
          })?]
        };
        let return_type = p.func_return_type(ctx)?;
        p.require(TT::EqualsChevronRight)?;
        let body = if p.peek().typ == TT::BraceOpen {
          p.require(TT::BraceOpen)?;
          let body = p.stmts(ctx, TT::BraceClose)?;
          p.require(TT::BraceClose)?;
          FuncBody::Block(body)
        } else {
          let expr = p.expr_with_min_prec(
            ctx,
            OPERATORS[&OperatorName::Assignment].precedence,
            terminators,
            &mut Asi::no(),
          )?;
          FuncBody::Expression(expr)
        };
        Ok(Func {
          arrow: true,
          parameters,
          return_type,
          body,
        })
      })?;
      Ok(ArrowFuncExpr { func })
    })
  }

  fn expr_operand(
    &mut self,
    ctx: ParseCtx,
    terminators: &[TT],
    asi: &mut Asi,
  ) -> SyntaxResult<Node<Expr>> {
    let (t0, t1) = self.peek_2();
    if let Some(operator) = UNARY_OPERATOR_MAPPING.get(&t0.typ) {
      let next_min_prec =
        operator.precedence + (operator.associativity == Associativity::Left) as u8;
      let node = self.with_loc(|p| {
        p.consume();
        let argument = p.expr_with_min_prec(ctx, next_min_prec, terminators, asi)?;
        Ok(UnaryExpr {
          operator: operator.name,
          argument,
        })
      })?;
      return Ok(node.into_wrapped());
    }
    if is_valid_identifier(t0.typ) {
      if t1.typ == TT::EqualsChevronRight && !t1.preceded_by_line_terminator {
        return Ok(self.arrow_func_expr(ctx, terminators)?.into_wrapped());
      }
      if t0.typ == TT::Identifier && self.str(t0.loc) == "undefined" {
        let node = self.with_loc(|p| {
          p.consume();
          Ok(LitUndefinedExpr {})
        })?;
        return Ok(node.into_wrapped());
      }
      return Ok(self.id_expr()?.into_wrapped());
    }
    match t0.typ {
      TT::BraceOpen => Ok(self.lit_obj(ctx)?.into_wrapped()),
      TT::BracketOpen => Ok(self.lit_arr(ctx)?.into_wrapped()),
      TT::KeywordThis => Ok(self.this_expr()?.into_wrapped()),
      TT::LiteralFalse | TT::LiteralTrue => Ok(self.lit_bool()?.into_wrapped()),
      TT::LiteralNull => Ok(self.lit_null()?.into_wrapped()),
      TT::LiteralNumber => Ok(self.lit_num()?.into_wrapped()),
      TT::LiteralString => Ok(self.lit_str()?.into_wrapped()),
      TT::LiteralTemplatePartString | TT::LiteralTemplatePartStringEnd => {
        Ok(self.lit_template(ctx)?.into_wrapped())
      }
      TT::ParenthesisOpen => self.arrow_function_or_grouping_expr(ctx, terminators),
      TT::KeywordAsync => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("async functions"))),
      TT::KeywordAwait => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("await expressions"))),
      TT::KeywordClass => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("class expressions"))),
      TT::KeywordDelete => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("the delete operator"))),
      TT::KeywordFunction => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("function expressions"))),
      TT::KeywordImport => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("dynamic import"))),
      TT::KeywordVoid => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("the void operator"))),
      TT::KeywordYield => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("yield expressions"))),
      TT::DotDotDot => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("spread elements"))),
      TT::At => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("decorators"))),
      TT::EOF => Err(self.error_at(&t0, SyntaxErrorType::UnexpectedEnd)),
      _ => Err(self.error_at(&t0, SyntaxErrorType::ExpectedSyntax("expression operand"))),
    }
  }

  pub fn expr_with_min_prec(
    &mut self,
    ctx: ParseCtx,
    min_prec: u8,
    terminators: &[TT],
    asi: &mut Asi,
  ) -> SyntaxResult<Node<Expr>> {
    let mut left = self.expr_operand(ctx, terminators, asi)?;

    loop {
      let cp = self.checkpoint();
      let t = self.consume();

      if terminators.contains(&t.typ) || t.typ == TT::Semicolon {
        self.restore_checkpoint(cp);
        break;
      }

      if matches!(t.typ, TT::PlusPlus | TT::HyphenHyphen) {
        // A line terminator before `++`/`--` ends the statement instead.
        if t.preceded_by_line_terminator && asi.can_end_with_asi {
          self.restore_checkpoint(cp);
          asi.did_end_with_asi = true;
          break;
        }
        let operator_name = if t.typ == TT::PlusPlus {
          OperatorName::PostfixIncrement
        } else {
          OperatorName::PostfixDecrement
        };
        let operator = &OPERATORS[&operator_name];
        if operator.precedence < min_prec {
          self.restore_checkpoint(cp);
          break;
        }
        let loc = Loc(left.loc.0, t.loc.1);
        left = Node::new(loc, UnaryPostfixExpr {
          operator: operator_name,
          argument: left,
        })
        .into_wrapped();
        continue;
      }

      let Some(operator) = MULTARY_OPERATOR_MAPPING.get(&t.typ) else {
        if asi.can_end_with_asi
          && (t.preceded_by_line_terminator || t.typ == TT::BraceClose || t.typ == TT::EOF)
        {
          self.restore_checkpoint(cp);
          asi.did_end_with_asi = true;
          break;
        }
        return Err(self.error_at(&t, SyntaxErrorType::ExpectedSyntax("expression operator")));
      };

      if operator.precedence < min_prec {
        self.restore_checkpoint(cp);
        break;
      }

      let next_min_prec =
        operator.precedence + (operator.associativity == Associativity::Left) as u8;

      left = match operator.name {
        OperatorName::Call => {
          let arguments = self.call_args(ctx)?;
          let end = self.require(TT::ParenthesisClose)?;
          Node::new(Loc(left.loc.0, end.loc.1), CallExpr {
            callee: left,
            arguments,
          })
          .into_wrapped()
        }
        OperatorName::ComputedMemberAccess => {
          let member = self.expr(ctx, &[TT::BracketClose])?;
          let end = self.require(TT::BracketClose)?;
          Node::new(Loc(left.loc.0, end.loc.1), ComputedMemberExpr {
            object: left,
            member,
          })
          .into_wrapped()
        }
        OperatorName::Conditional => {
          let consequent = self.expr(ctx, &[TT::Colon])?;
          self.require(TT::Colon)?;
          let alternate = self.expr_with_min_prec(ctx, next_min_prec, terminators, asi)?;
          Node::new(Loc(left.loc.0, alternate.loc.1), CondExpr {
            test: left,
            consequent,
            alternate,
          })
          .into_wrapped()
        }
        OperatorName::MemberAccess => {
          let name = self.consume();
          let valid_name = name.typ == TT::Identifier || {
            let s = self.str(name.loc);
            !s.is_empty() && s.chars().all(|c| ID_CONTINUE.has(c))
          };
          if !valid_name {
            return Err(self.error_at(&name, SyntaxErrorType::ExpectedSyntax("member name")));
          }
          Node::new(Loc(left.loc.0, name.loc.1), MemberExpr {
            left,
            right: self.string(name.loc),
          })
          .into_wrapped()
        }
        name if name.is_assignment() => {
          if !matches!(
            *left.stx,
            Expr::Id(_) | Expr::Member(_) | Expr::ComputedMember(_)
          ) {
            return Err(left.error(SyntaxErrorType::ExpectedSyntax("assignment target")));
          }
          let right = self.expr_with_min_prec(ctx, next_min_prec, terminators, asi)?;
          Node::new(Loc(left.loc.0, right.loc.1), BinaryExpr {
            operator: name,
            left,
            right,
          })
          .into_wrapped()
        }
        name => {
          let right = self.expr_with_min_prec(ctx, next_min_prec, terminators, asi)?;
          Node::new(Loc(left.loc.0, right.loc.1), BinaryExpr {
            operator: name,
            left,
            right,
          })
          .into_wrapped()
        }
      };
    }

    Ok(left)
  }
}
