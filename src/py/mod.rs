// The Python-shaped AST the transformer produces and the emitter renders.
// Structured the same way as the JS AST: tagged enums over `Node<S>` so every
// subtree keeps the source range of the JS node it was derived from.

pub mod expr;
pub mod stmt;
