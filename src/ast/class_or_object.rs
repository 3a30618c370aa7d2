use super::expr::Expr;
use super::func::Func;
use super::node::Node;
use super::type_expr::TypeExpr;
use derive_more::derive::From;
use serde::Serialize;

/// This is a node as the key may not be the same as source[node.loc], due to
/// string-key decoding.
#[derive(Debug, Serialize)]
pub struct ClassOrObjKey {
  pub key: String,
}

#[derive(Debug, From, Serialize)]
#[serde(tag = "$t")]
pub enum ClassMemberVal {
  // Includes the constructor, under the key `constructor`.
  Method(Node<Func>),
  Prop(ClassProp),
}

#[derive(Debug, Serialize)]
pub struct ClassProp {
  pub type_annotation: Option<Node<TypeExpr>>,
  pub initializer: Option<Node<Expr>>,
}

#[derive(Debug, Serialize)]
pub struct ClassMember {
  pub key: Node<ClassOrObjKey>,
  pub val: ClassMemberVal,
}

#[derive(Debug, Serialize)]
#[serde(tag = "$t")]
pub enum ObjMember {
  Valued {
    key: Node<ClassOrObjKey>,
    value: Node<Expr>,
  },
  // `{ a }`, sugar for `{ a: a }`.
  Shorthand {
    name: String,
  },
}
