use crate::ast::node::Node;
use derive_more::derive::From;
use serde::Serialize;

#[derive(Clone, Debug, From, Serialize)]
#[serde(tag = "$t")]
pub enum PyExpr {
  Attribute(Node<PyAttribute>),
  BinOp(Node<PyBinOp>),
  BoolOp(Node<PyBoolOp>),
  Call(Node<PyCall>),
  Compare(Node<PyCompare>),
  Constant(Node<PyConstant>),
  Dict(Node<PyDict>),
  FString(Node<PyFString>),
  IfExp(Node<PyIfExp>),
  List(Node<PyList>),
  ListComp(Node<PyListComp>),
  Name(Node<PyName>),
  // `a:b` inside a subscript only.
  SliceRange(Node<PySliceRange>),
  Subscript(Node<PySubscript>),
  // Bare tuple, only produced as a subscript index (`dict[str, float]`).
  Tuple(Node<PyTuple>),
  UnaryOp(Node<PyUnaryOp>),
}

#[derive(Clone, Debug, Serialize)]
pub struct PyAttribute {
  pub value: Node<PyExpr>,
  pub attr: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum PyOp {
  Add,
  Div,
  Mod,
  Mult,
  Pow,
  Sub,
}

impl PyOp {
  pub fn text(self) -> &'static str {
    match self {
      PyOp::Add => "+",
      PyOp::Div => "/",
      PyOp::Mod => "%",
      PyOp::Mult => "*",
      PyOp::Pow => "**",
      PyOp::Sub => "-",
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct PyBinOp {
  pub op: PyOp,
  pub left: Node<PyExpr>,
  pub right: Node<PyExpr>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum PyBoolOpKind {
  And,
  Or,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyBoolOp {
  pub op: PyBoolOpKind,
  pub left: Node<PyExpr>,
  pub right: Node<PyExpr>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyCall {
  pub func: Node<PyExpr>,
  pub args: Vec<Node<PyExpr>>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum PyCmpOp {
  Eq,
  Gt,
  GtE,
  In,
  Is,
  IsNot,
  Lt,
  LtE,
  NotEq,
}

impl PyCmpOp {
  pub fn text(self) -> &'static str {
    match self {
      PyCmpOp::Eq => "==",
      PyCmpOp::Gt => ">",
      PyCmpOp::GtE => ">=",
      PyCmpOp::In => "in",
      PyCmpOp::Is => "is",
      PyCmpOp::IsNot => "is not",
      PyCmpOp::Lt => "<",
      PyCmpOp::LtE => "<=",
      PyCmpOp::NotEq => "!=",
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct PyCompare {
  pub op: PyCmpOp,
  pub left: Node<PyExpr>,
  pub right: Node<PyExpr>,
}

/// Number constants keep their source spelling so emission is deterministic
/// and lossless (no float re-formatting).
#[derive(Clone, Debug, Serialize)]
pub enum PyConstant {
  Bool(bool),
  Float(String),
  Int(String),
  None,
  Str(String),
}

#[derive(Clone, Debug, Serialize)]
pub struct PyDict {
  pub entries: Vec<(Node<PyExpr>, Node<PyExpr>)>,
}

#[derive(Clone, Debug, From, Serialize)]
pub enum PyFStringPart {
  Str(String),
  Expr(Node<PyExpr>),
}

#[derive(Clone, Debug, Serialize)]
pub struct PyFString {
  pub parts: Vec<PyFStringPart>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyIfExp {
  pub test: Node<PyExpr>,
  pub body: Node<PyExpr>,
  pub orelse: Node<PyExpr>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyList {
  pub elements: Vec<Node<PyExpr>>,
}

/// `[element for target in iter]`, optionally `if condition`.
#[derive(Clone, Debug, Serialize)]
pub struct PyListComp {
  pub element: Node<PyExpr>,
  pub target: String,
  pub iter: Node<PyExpr>,
  pub condition: Option<Node<PyExpr>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyName {
  pub name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PySliceRange {
  pub lower: Option<Node<PyExpr>>,
  pub upper: Option<Node<PyExpr>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyTuple {
  pub elements: Vec<Node<PyExpr>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PySubscript {
  pub value: Node<PyExpr>,
  pub index: Node<PyExpr>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum PyUnaryOpKind {
  Not,
  UAdd,
  USub,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyUnaryOp {
  pub op: PyUnaryOpKind,
  pub operand: Node<PyExpr>,
}
