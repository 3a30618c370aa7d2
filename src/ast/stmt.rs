use super::class_or_object::ClassMember;
use super::expr::Expr;
use super::expr::IdExpr;
use super::func::ClassOrFuncName;
use super::func::Func;
use super::node::Node;
use super::type_expr::TypeExpr;
use derive_more::derive::From;
use derive_more::derive::TryInto;
use serde::Serialize;

// We must wrap each variant with Node<T> so every subtree carries its own
// location.
#[derive(Debug, From, Serialize, TryInto)]
#[serde(tag = "$t")]
pub enum Stmt {
  Block(Node<BlockStmt>),
  Break(Node<BreakStmt>),
  ClassDecl(Node<ClassDecl>),
  Continue(Node<ContinueStmt>),
  Expr(Node<ExprStmt>),
  ForOf(Node<ForOfStmt>),
  ForTriple(Node<ForTripleStmt>),
  FunctionDecl(Node<FuncDecl>),
  If(Node<IfStmt>),
  InterfaceDecl(Node<InterfaceDecl>),
  Return(Node<ReturnStmt>),
  VarDecl(Node<VarDecl>),
  While(Node<WhileStmt>),
}

#[derive(Debug, Serialize)]
pub struct BlockStmt {
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Serialize)]
pub struct BreakStmt {}

#[derive(Debug, Serialize)]
pub struct ContinueStmt {}

#[derive(Debug, Serialize)]
pub struct ExprStmt {
  pub expr: Node<Expr>,
}

#[derive(Debug, Serialize)]
pub struct ForOfStmt {
  pub mode: VarDeclMode,
  pub variable: Node<ClassOrFuncName>,
  pub iterable: Node<Expr>,
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, From, Serialize)]
#[serde(tag = "$t")]
pub enum ForInit {
  None,
  Expr(Node<Expr>),
  VarDecl(Node<VarDecl>),
}

#[derive(Debug, Serialize)]
pub struct ForTripleStmt {
  pub init: ForInit,
  pub condition: Option<Node<Expr>>,
  pub update: Option<Node<Expr>>,
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Serialize)]
pub struct IfStmt {
  pub test: Node<Expr>,
  pub consequent: Vec<Node<Stmt>>,
  pub alternate: Option<Vec<Node<Stmt>>>,
}

#[derive(Debug, Serialize)]
pub struct ReturnStmt {
  pub value: Option<Node<Expr>>,
}

#[derive(Debug, Serialize)]
pub struct WhileStmt {
  pub condition: Node<Expr>,
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Serialize)]
pub struct ClassDecl {
  pub name: Node<ClassOrFuncName>,
  pub extends: Option<Node<IdExpr>>,
  pub members: Vec<Node<ClassMember>>,
}

#[derive(Debug, Serialize)]
pub struct FuncDecl {
  pub name: Node<ClassOrFuncName>,
  pub function: Node<Func>,
}

#[derive(Debug, Serialize)]
pub struct InterfaceDecl {
  pub name: Node<ClassOrFuncName>,
  pub fields: Vec<Node<InterfaceField>>,
}

#[derive(Debug, Serialize)]
pub struct InterfaceField {
  pub name: String,
  pub optional: bool,
  pub type_annotation: Node<TypeExpr>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum VarDeclMode {
  Const,
  Let,
  Var,
}

#[derive(Debug, Serialize)]
pub struct VarDecl {
  pub mode: VarDeclMode,
  pub declarators: Vec<VarDeclarator>,
}

#[derive(Debug, Serialize)]
pub struct VarDeclarator {
  pub name: Node<ClassOrFuncName>,
  pub type_annotation: Option<Node<TypeExpr>>,
  pub initializer: Option<Node<Expr>>,
}
