use super::expr::PyExpr;
use super::expr::PyOp;
use crate::ast::node::Node;
use derive_more::derive::From;
use serde::Serialize;

#[derive(Clone, Debug, From, Serialize)]
#[serde(tag = "$t")]
pub enum PyStmt {
  Assign(Node<PyAssign>),
  AugAssign(Node<PyAugAssign>),
  Break(Node<PyBreak>),
  ClassDef(Node<PyClassDef>),
  Continue(Node<PyContinue>),
  Expr(Node<PyExprStmt>),
  For(Node<PyFor>),
  FunctionDef(Node<PyFunctionDef>),
  If(Node<PyIf>),
  Import(Node<PyImport>),
  ImportFrom(Node<PyImportFrom>),
  Return(Node<PyReturn>),
  While(Node<PyWhile>),
}

/// Covers plain assignment, annotated assignment, and a bare annotation
/// (`value: None`, as in class field declarations).
#[derive(Clone, Debug, Serialize)]
pub struct PyAssign {
  pub target: Node<PyExpr>,
  pub annotation: Option<Node<PyExpr>>,
  pub value: Option<Node<PyExpr>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyAugAssign {
  pub target: Node<PyExpr>,
  pub op: PyOp,
  pub value: Node<PyExpr>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyBreak {}

#[derive(Clone, Debug, Serialize)]
pub struct PyClassDef {
  pub name: String,
  pub bases: Vec<Node<PyExpr>>,
  pub body: Vec<Node<PyStmt>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyContinue {}

#[derive(Clone, Debug, Serialize)]
pub struct PyExprStmt {
  pub expr: Node<PyExpr>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyFor {
  pub target: String,
  pub iter: Node<PyExpr>,
  pub body: Vec<Node<PyStmt>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyParam {
  pub name: String,
  pub annotation: Option<Node<PyExpr>>,
  pub default: Option<Node<PyExpr>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyFunctionDef {
  pub name: String,
  pub parameters: Vec<PyParam>,
  pub returns: Option<Node<PyExpr>>,
  pub body: Vec<Node<PyStmt>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyIf {
  pub test: Node<PyExpr>,
  pub body: Vec<Node<PyStmt>>,
  pub orelse: Vec<Node<PyStmt>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyImport {
  pub module: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyImportFrom {
  pub module: &'static str,
  pub names: Vec<&'static str>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyReturn {
  pub value: Option<Node<PyExpr>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PyWhile {
  pub test: Node<PyExpr>,
  pub body: Vec<Node<PyStmt>>,
}
