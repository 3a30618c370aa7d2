use super::expr::Expr;
use super::node::Node;
use super::stmt::Stmt;
use super::type_expr::TypeExpr;
use derive_more::derive::From;
use serde::Serialize;

// This common type exists for better downstream usage, as one type is easier
// to match on and wrangle than many different types (ArrowFuncExpr,
// ClassMemberVal::Method, FuncDecl, etc.).
#[derive(Debug, Serialize)]
pub struct Func {
  pub arrow: bool,
  pub parameters: Vec<Node<ParamDecl>>,
  pub return_type: Option<Node<TypeExpr>>,
  pub body: FuncBody,
}

// A function body is different from a block statement, as the scopes are
// different.
#[derive(Debug, From, Serialize)]
pub enum FuncBody {
  Block(Vec<Node<Stmt>>),
  // If arrow function.
  Expression(Node<Expr>),
}

#[derive(Debug, Serialize)]
pub struct ParamDecl {
  pub name: String,
  pub type_annotation: Option<Node<TypeExpr>>,
  pub default_value: Option<Node<Expr>>,
}

/// A binding-position name. Not an `IdExpr` as it is not a usage of a
/// variable.
#[derive(Debug, Serialize)]
pub struct ClassOrFuncName {
  pub name: String,
}
