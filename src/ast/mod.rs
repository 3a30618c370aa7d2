pub mod class_or_object;
pub mod expr;
pub mod func;
pub mod node;
pub mod stmt;
pub mod stx;
pub mod type_expr;
