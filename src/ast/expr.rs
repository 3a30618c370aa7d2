use super::class_or_object::ObjMember;
use super::func::Func;
use super::node::Node;
use crate::operator::OperatorName;
use derive_more::derive::From;
use derive_more::derive::TryInto;
use serde::Serialize;

// We must wrap each variant with Node<T> so every subtree carries its own
// location.
#[derive(Debug, From, Serialize, TryInto)]
#[serde(tag = "$t")]
pub enum Expr {
  ArrowFunc(Node<ArrowFuncExpr>),
  Binary(Node<BinaryExpr>),
  Call(Node<CallExpr>),
  ComputedMember(Node<ComputedMemberExpr>),
  Cond(Node<CondExpr>),
  Id(Node<IdExpr>),
  Member(Node<MemberExpr>),
  This(Node<ThisExpr>),
  Unary(Node<UnaryExpr>),
  UnaryPostfix(Node<UnaryPostfixExpr>),

  // Literals.
  LitArr(Node<LitArrExpr>),
  LitBool(Node<LitBoolExpr>),
  LitNull(Node<LitNullExpr>),
  LitNum(Node<LitNumExpr>),
  LitObj(Node<LitObjExpr>),
  LitStr(Node<LitStrExpr>),
  LitTemplate(Node<LitTemplateExpr>),
  LitUndefined(Node<LitUndefinedExpr>),
}

#[derive(Debug, Serialize)]
pub struct ArrowFuncExpr {
  pub func: Node<Func>,
}

#[derive(Debug, Serialize)]
pub struct BinaryExpr {
  pub operator: OperatorName,
  pub left: Node<Expr>,
  pub right: Node<Expr>,
}

#[derive(Debug, Serialize)]
pub struct CallExpr {
  pub callee: Node<Expr>,
  pub arguments: Vec<Node<Expr>>,
}

#[derive(Debug, Serialize)]
pub struct ComputedMemberExpr {
  pub object: Node<Expr>,
  pub member: Node<Expr>,
}

#[derive(Debug, Serialize)]
pub struct CondExpr {
  pub test: Node<Expr>,
  pub consequent: Node<Expr>,
  pub alternate: Node<Expr>,
}

#[derive(Debug, Serialize)]
pub struct IdExpr {
  pub name: String,
}

#[derive(Debug, Serialize)]
pub struct MemberExpr {
  pub left: Node<Expr>,
  pub right: String,
}

#[derive(Debug, Serialize)]
pub struct ThisExpr {}

#[derive(Debug, Serialize)]
pub struct UnaryExpr {
  pub operator: OperatorName,
  pub argument: Node<Expr>,
}

#[derive(Debug, Serialize)]
pub struct UnaryPostfixExpr {
  pub operator: OperatorName,
  pub argument: Node<Expr>,
}

#[derive(Debug, Serialize)]
pub struct LitArrExpr {
  pub elements: Vec<Node<Expr>>,
}

#[derive(Debug, Serialize)]
pub struct LitBoolExpr {
  pub value: bool,
}

#[derive(Debug, Serialize)]
pub struct LitNullExpr {}

/// The raw source spelling is kept; whether it denotes an integer or a float
/// is decided during transformation.
#[derive(Debug, Serialize)]
pub struct LitNumExpr {
  pub raw: String,
}

#[derive(Debug, Serialize)]
pub struct LitObjExpr {
  pub members: Vec<Node<ObjMember>>,
}

/// The decoded value, after escape sequences have been resolved.
#[derive(Debug, Serialize)]
pub struct LitStrExpr {
  pub value: String,
}

#[derive(Debug, Serialize)]
pub struct LitTemplateExpr {
  pub parts: Vec<LitTemplatePart>,
}

// Externally tagged; an internally tagged `Str` variant cannot carry a bare
// string.
#[derive(Debug, From, Serialize)]
pub enum LitTemplatePart {
  Str(String),
  Expr(Node<Expr>),
}

#[derive(Debug, Serialize)]
pub struct LitUndefinedExpr {}
