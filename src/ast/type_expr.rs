use super::node::Node;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(tag = "$t")]
pub enum TypeExpr {
  // `T[]`.
  Array(Node<TypeArray>),
  // `Array<T>`, `Record<K, V>`, or any other `Name<...>`.
  Generic(Node<TypeGeneric>),
  // `string`, `number`, `boolean`, `any`, `void`, or a bare reference.
  Named(Node<TypeNamed>),
}

#[derive(Debug, Serialize)]
pub struct TypeArray {
  pub element: Node<TypeExpr>,
}

#[derive(Debug, Serialize)]
pub struct TypeGeneric {
  pub name: String,
  pub arguments: Vec<Node<TypeExpr>>,
}

#[derive(Debug, Serialize)]
pub struct TypeNamed {
  pub name: String,
}
