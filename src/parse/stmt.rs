use super::expr::is_valid_identifier;
use super::expr::Asi;
use super::ParseCtx;
use super::Parser;
use crate::ast::node::Node;
use crate::ast::stmt::BlockStmt;
use crate::ast::stmt::BreakStmt;
use crate::ast::stmt::ContinueStmt;
use crate::ast::stmt::ExprStmt;
use crate::ast::stmt::ForInit;
use crate::ast::stmt::ForOfStmt;
use crate::ast::stmt::ForTripleStmt;
use crate::ast::stmt::IfStmt;
use crate::ast::stmt::ReturnStmt;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::VarDecl;
use crate::ast::stmt::VarDeclMode;
use crate::ast::stmt::VarDeclarator;
use crate::ast::stmt::WhileStmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::token::TT;
use crate::Mode;

pub enum VarDeclParseMode {
  // Standalone statement, allowing ASI to end an initialiser.
  Asi,
  // Leftmost part of a `for` head; stops at the first semicolon.
  Leftmost,
}

impl<'a> Parser<'a> {
  /// Parses statements until `end` or EOF is reached, without consuming the
  /// terminating token. Stray semicolons are skipped.
  pub fn stmts(&mut self, ctx: ParseCtx, end: TT) -> SyntaxResult<Vec<Node<Stmt>>> {
    let mut body = Vec::new();
    loop {
      let t = self.peek();
      if t.typ == end || t.typ == TT::EOF {
        break;
      }
      if t.typ == TT::Semicolon {
        self.consume();
        continue;
      }
      body.push(self.stmt(ctx)?);
    }
    Ok(body)
  }

  pub fn stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    let (t0, t1) = self.peek_2();
    match t0.typ {
      TT::BraceOpen => Ok(self.block_stmt(ctx)?.into_wrapped()),
      TT::KeywordBreak => self.break_stmt(),
      TT::KeywordClass => Ok(self.class_decl(ctx)?.into_wrapped()),
      TT::KeywordConst | TT::KeywordLet | TT::KeywordVar => self.var_decl_stmt(ctx),
      TT::KeywordContinue => self.continue_stmt(),
      TT::KeywordFor => self.for_stmt(ctx),
      TT::KeywordFunction => Ok(self.func_decl(ctx)?.into_wrapped()),
      TT::KeywordIf => Ok(self.if_stmt(ctx)?.into_wrapped()),
      TT::KeywordInterface if is_valid_identifier(t1.typ) => {
        if ctx.mode != Mode::TypeScript {
          return Err(self.error_at(
            &t0,
            SyntaxErrorType::TypeScriptOnly("interface declarations"),
          ));
        }
        Ok(self.interface_decl(ctx)?.into_wrapped())
      }
      TT::KeywordReturn => self.return_stmt(ctx),
      TT::KeywordWhile => Ok(self.while_stmt(ctx)?.into_wrapped()),
      TT::KeywordAsync if t1.typ == TT::KeywordFunction => {
        Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("async functions")))
      }
      TT::KeywordDo => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("do-while loops"))),
      TT::KeywordExport => Err(self.error_at(
        &t0,
        SyntaxErrorType::UnsupportedSyntax("export declarations"),
      )),
      TT::KeywordImport => Err(self.error_at(
        &t0,
        SyntaxErrorType::UnsupportedSyntax("import declarations"),
      )),
      TT::KeywordSwitch => Err(self.error_at(
        &t0,
        SyntaxErrorType::UnsupportedSyntax("switch statements"),
      )),
      TT::KeywordThrow => Err(self.error_at(
        &t0,
        SyntaxErrorType::UnsupportedSyntax("throw statements"),
      )),
      TT::KeywordTry => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("try statements"))),
      TT::KeywordWith => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("with statements"))),
      TT::At => Err(self.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("decorators"))),
      _ if is_valid_identifier(t0.typ) && t1.typ == TT::Colon => Err(self.error_at(
        &t0,
        SyntaxErrorType::UnsupportedSyntax("labeled statements"),
      )),
      _ => self.expr_stmt(ctx),
    }
  }

  fn block_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<BlockStmt>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let body = p.stmts(ctx, TT::BraceClose)?;
      p.require(TT::BraceClose)?;
      Ok(BlockStmt { body })
    })
  }

  /// A braced body, or a single statement which becomes a one-element body.
  fn brace_or_single_body(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<Node<Stmt>>> {
    if self.consume_if(TT::BraceOpen).is_match() {
      let body = self.stmts(ctx, TT::BraceClose)?;
      self.require(TT::BraceClose)?;
      Ok(body)
    } else {
      Ok(vec![self.stmt(ctx)?])
    }
  }

  fn break_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    Ok(
      self
        .with_loc(|p| {
          p.require(TT::KeywordBreak)?;
          let t = p.peek();
          if !t.preceded_by_line_terminator && is_valid_identifier(t.typ) {
            return Err(p.error_at(&t, SyntaxErrorType::UnsupportedSyntax("labeled statements")));
          }
          p.semicolon()?;
          Ok(BreakStmt {})
        })?
        .into_wrapped(),
    )
  }

  fn continue_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    Ok(
      self
        .with_loc(|p| {
          p.require(TT::KeywordContinue)?;
          let t = p.peek();
          if !t.preceded_by_line_terminator && is_valid_identifier(t.typ) {
            return Err(p.error_at(&t, SyntaxErrorType::UnsupportedSyntax("labeled statements")));
          }
          p.semicolon()?;
          Ok(ContinueStmt {})
        })?
        .into_wrapped(),
    )
  }

  pub fn if_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<IfStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordIf)?;
      p.require(TT::ParenthesisOpen)?;
      let test = p.expr(ctx, &[TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      let consequent = p.brace_or_single_body(ctx)?;
      // `else if` nests as an alternate containing a single `if` statement.
      let alternate = p
        .consume_if(TT::KeywordElse)
        .and_then(|| p.brace_or_single_body(ctx))?;
      Ok(IfStmt {
        test,
        consequent,
        alternate,
      })
    })
  }

  pub fn while_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<WhileStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordWhile)?;
      p.require(TT::ParenthesisOpen)?;
      let condition = p.expr(ctx, &[TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      let body = p.brace_or_single_body(ctx)?;
      Ok(WhileStmt { condition, body })
    })
  }

  fn return_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    Ok(
      self
        .with_loc(|p| {
          p.require(TT::KeywordReturn)?;
          let t = p.peek();
          let value = if t.preceded_by_line_terminator
            || matches!(t.typ, TT::Semicolon | TT::BraceClose | TT::EOF)
          {
            // ASI: a line terminator after `return` ends the statement.
            None
          } else {
            let mut asi = Asi::can();
            Some(p.expr_with_asi(ctx, &[TT::Semicolon], &mut asi)?)
          };
          p.semicolon()?;
          Ok(ReturnStmt { value })
        })?
        .into_wrapped(),
    )
  }

  pub fn var_decl(
    &mut self,
    ctx: ParseCtx,
    parse_mode: VarDeclParseMode,
  ) -> SyntaxResult<Node<VarDecl>> {
    self.with_loc(|p| {
      let t = p.consume();
      let mode = match t.typ {
        TT::KeywordConst => VarDeclMode::Const,
        TT::KeywordLet => VarDeclMode::Let,
        TT::KeywordVar => VarDeclMode::Var,
        _ => {
          return Err(p.error_at(&t, SyntaxErrorType::ExpectedSyntax("variable declaration")))
        }
      };
      let mut declarators = Vec::new();
      loop {
        let t = p.peek();
        if matches!(t.typ, TT::BraceOpen | TT::BracketOpen) {
          return Err(p.error_at(
            &t,
            SyntaxErrorType::UnsupportedSyntax("destructuring patterns"),
          ));
        }
        let name = p.class_or_func_name()?;
        let type_annotation = p.type_annotation(ctx)?;
        let initializer = p.consume_if(TT::Equals).and_then(|| match parse_mode {
          VarDeclParseMode::Asi => {
            let mut asi = Asi::can();
            p.expr_with_asi(ctx, &[TT::Semicolon, TT::Comma], &mut asi)
          }
          VarDeclParseMode::Leftmost => p.expr(ctx, &[TT::Semicolon, TT::Comma]),
        })?;
        declarators.push(VarDeclarator {
          name,
          type_annotation,
          initializer,
        });
        if !p.consume_if(TT::Comma).is_match() {
          break;
        }
      }
      Ok(VarDecl { mode, declarators })
    })
  }

  fn var_decl_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    let decl = self.var_decl(ctx, VarDeclParseMode::Asi)?;
    self.semicolon()?;
    Ok(decl.into_wrapped())
  }

  fn expr_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    Ok(
      self
        .with_loc(|p| {
          let mut asi = Asi::can();
          let expr = p.expr_with_asi(ctx, &[TT::Semicolon], &mut asi)?;
          if !asi.did_end_with_asi {
            p.semicolon()?;
          }
          Ok(ExprStmt { expr })
        })?
        .into_wrapped(),
    )
  }

  /// Looks ahead past `for (` to decide between a for-of and a C-style
  /// triple, then rewinds and parses the chosen form.
  fn for_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    let cp = self.checkpoint();
    self.require(TT::KeywordFor)?;
    self.require(TT::ParenthesisOpen)?;
    let mut is_for_of = false;
    if matches!(
      self.peek().typ,
      TT::KeywordConst | TT::KeywordLet | TT::KeywordVar
    ) {
      self.consume();
      if is_valid_identifier(self.peek().typ) {
        self.consume();
        let t = self.peek();
        match t.typ {
          TT::KeywordOf => is_for_of = true,
          TT::KeywordIn => {
            return Err(self.error_at(&t, SyntaxErrorType::UnsupportedSyntax("for-in loops")))
          }
          _ => {}
        };
      }
    }
    self.restore_checkpoint(cp);
    if is_for_of {
      Ok(self.for_of_stmt(ctx)?.into_wrapped())
    } else {
      Ok(self.for_triple_stmt(ctx)?.into_wrapped())
    }
  }

  fn for_of_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ForOfStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordFor)?;
      p.require(TT::ParenthesisOpen)?;
      let t = p.consume();
      let mode = match t.typ {
        TT::KeywordConst => VarDeclMode::Const,
        TT::KeywordLet => VarDeclMode::Let,
        TT::KeywordVar => VarDeclMode::Var,
        _ => {
          return Err(p.error_at(&t, SyntaxErrorType::ExpectedSyntax("variable declaration")))
        }
      };
      let variable = p.class_or_func_name()?;
      p.require(TT::KeywordOf)?;
      let iterable = p.expr(ctx, &[TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      let body = p.brace_or_single_body(ctx)?;
      Ok(ForOfStmt {
        mode,
        variable,
        iterable,
        body,
      })
    })
  }

  fn for_triple_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ForTripleStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordFor)?;
      p.require(TT::ParenthesisOpen)?;
      let init = match p.peek().typ {
        TT::Semicolon => ForInit::None,
        TT::KeywordConst | TT::KeywordLet | TT::KeywordVar => {
          ForInit::VarDecl(p.var_decl(ctx, VarDeclParseMode::Leftmost)?)
        }
        _ => ForInit::Expr(p.expr(ctx, &[TT::Semicolon])?),
      };
      p.require(TT::Semicolon)?;
      let condition = match p.peek().typ {
        TT::Semicolon => None,
        _ => Some(p.expr(ctx, &[TT::Semicolon])?),
      };
      p.require(TT::Semicolon)?;
      let update = match p.peek().typ {
        TT::ParenthesisClose => None,
        _ => Some(p.expr(ctx, &[TT::ParenthesisClose])?),
      };
      p.require(TT::ParenthesisClose)?;
      let body = p.brace_or_single_body(ctx)?;
      Ok(ForTripleStmt {
        init,
        condition,
        update,
        body,
      })
    })
  }
}
