use super::expr::is_valid_identifier;
use super::expr::Asi;
use super::lit::decode_escapes;
use super::lit::is_word_token;
use super::ParseCtx;
use super::Parser;
use crate::ast::class_or_object::ClassMember;
use crate::ast::class_or_object::ClassMemberVal;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::class_or_object::ClassProp;
use crate::ast::func::Func;
use crate::ast::func::FuncBody;
use crate::ast::node::Node;
use crate::ast::stmt::ClassDecl;
use crate::ast::stmt::InterfaceDecl;
use crate::ast::stmt::InterfaceField;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a> Parser<'a> {
  pub fn class_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ClassDecl>> {
    self.with_loc(|p| {
      p.require(TT::KeywordClass)?;
      let name = p.class_or_func_name()?;
      let extends = p
        .consume_if(TT::KeywordExtends)
        .and_then(|| p.id_expr())?;
      let t = p.peek();
      if extends.is_some() && t.typ == TT::Comma {
        return Err(p.error_at(
          &t,
          SyntaxErrorType::UnsupportedSyntax("multiple base classes"),
        ));
      }
      if t.typ == TT::Identifier && p.str(t.loc) == "implements" {
        return Err(p.error_at(
          &t,
          SyntaxErrorType::UnsupportedSyntax("implements clauses"),
        ));
      }
      p.require(TT::BraceOpen)?;
      let mut members = Vec::new();
      loop {
        if p.consume_if(TT::BraceClose).is_match() {
          break;
        }
        if p.consume_if(TT::Semicolon).is_match() {
          continue;
        }
        members.push(p.class_member(ctx)?);
      }
      Ok(ClassDecl {
        name,
        extends,
        members,
      })
    })
  }

  fn class_member(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ClassMember>> {
    self.with_loc(|p| {
      let (t0, t1) = p.peek_2();
      // Modifier words are not keywords; they only act as modifiers when
      // another member key follows.
      if t0.typ == TT::Identifier && is_valid_identifier(t1.typ) {
        match p.str(t0.loc) {
          "static" => {
            return Err(p.error_at(&t0, SyntaxErrorType::UnsupportedSyntax("static members")))
          }
          "get" | "set" => {
            return Err(p.error_at(
              &t0,
              SyntaxErrorType::UnsupportedSyntax("accessor properties"),
            ))
          }
          "public" | "private" | "protected" | "readonly" | "abstract" => {
            return Err(p.error_at(
              &t0,
              SyntaxErrorType::UnsupportedSyntax("member modifiers"),
            ))
          }
          _ => {}
        };
      }
      let key = p.class_or_obj_key()?;
      let val = if p.peek().typ == TT::ParenthesisOpen {
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
        ClassMemberVal::Method(function)
      } else {
        let type_annotation = p.type_annotation(ctx)?;
        let initializer = p.consume_if(TT::Equals).and_then(|| {
          let mut asi = Asi::can();
          p.expr_with_asi(ctx, &[TT::Semicolon], &mut asi)
        })?;
        p.semicolon()?;
        ClassMemberVal::Prop(ClassProp {
          type_annotation,
          initializer,
        })
      };
      Ok(ClassMember { key, val })
    })
  }

  fn class_or_obj_key(&mut self) -> SyntaxResult<Node<ClassOrObjKey>> {
    self.with_loc(|p| {
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
    })
  }

  pub fn interface_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<InterfaceDecl>> {
    self.with_loc(|p| {
      p.require(TT::KeywordInterface)?;
      let name = p.class_or_func_name()?;
      let t = p.peek();
      if t.typ == TT::KeywordExtends {
        return Err(p.error_at(
          &t,
          SyntaxErrorType::UnsupportedSyntax("interface extends clauses"),
        ));
      }
      p.require(TT::BraceOpen)?;
      let mut fields = Vec::new();
      loop {
        if p.consume_if(TT::BraceClose).is_match() {
          break;
        }
        fields.push(p.interface_field(ctx)?);
      }
      Ok(InterfaceDecl { name, fields })
    })
  }

  fn interface_field(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<InterfaceField>> {
    self.with_loc(|p| {
      let name = p.id_name()?;
      let optional = p.consume_if(TT::Question).is_match();
      let t = p.peek();
      if t.typ == TT::ParenthesisOpen || t.typ == TT::ChevronLeft {
        return Err(p.error_at(&t, SyntaxErrorType::UnsupportedSyntax("interface methods")));
      }
      p.require(TT::Colon)?;
      let type_annotation = p.type_expr(ctx)?;
      // Fields may be separated by `;`, `,`, or just a newline.
      let sep = p.consume_if(TT::Semicolon).is_match() || p.consume_if(TT::Comma).is_match();
      if !sep {
        let t = p.peek();
        if t.typ != TT::BraceClose && !t.preceded_by_line_terminator {
          return Err(p.error_at(
            &t,
            SyntaxErrorType::ExpectedSyntax("interface member separator"),
          ));
        }
      }
      Ok(InterfaceField {
        name,
        optional,
        type_annotation,
      })
    })
  }
}
