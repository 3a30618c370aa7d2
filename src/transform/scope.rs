use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use once_cell::sync::Lazy;

/// Python keywords and commonly shadowed builtins. A JS binding with one of
/// these names is renamed with a trailing underscore so the generated module
/// stays valid and does not clobber a builtin it may itself rely on.
pub static PYTHON_RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  [
    "False", "None", "True", "abs", "and", "as", "assert", "async", "await", "bool", "break",
    "class", "continue", "def", "del", "dict", "elif", "else", "enumerate", "except", "filter",
    "finally", "float", "for", "from", "global", "id", "if", "import", "in", "input", "int", "is",
    "json", "lambda", "len", "list", "map", "math", "max", "min", "next", "nonlocal", "not",
    "open", "or", "pass", "print", "raise", "random", "range", "return", "reversed", "round",
    "self", "set", "sorted", "str", "sum", "try", "tuple", "type", "while", "with", "yield",
    "zip",
  ]
  .into_iter()
  .collect()
});

pub fn safe_name(name: &str) -> String {
  if PYTHON_RESERVED.contains(name) {
    format!("{}_", name)
  } else {
    name.to_string()
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BindingKind {
  Class,
  Function,
  Local,
  Param,
}

#[derive(Clone, Debug)]
pub struct Binding {
  pub kind: BindingKind,
  pub py_name: String,
}

struct Scope {
  bindings: HashMap<String, Binding>,
  // Function bodies start a boundary; blocks and loop bodies do not.
  is_function_boundary: bool,
}

pub enum Lookup<'a> {
  /// Bound in a reachable scope.
  Ok(&'a Binding),
  /// Bound, but only across a function boundary in a non-module scope, which
  /// would require capturing a closure variable.
  Captured,
  Missing,
}

/// Lexical symbol table. The outermost scope is the module scope; names bound
/// there are reachable from anywhere, since module-level names are globals in
/// the generated Python too.
pub struct ScopeStack {
  scopes: Vec<Scope>,
}

impl ScopeStack {
  pub fn new() -> ScopeStack {
    ScopeStack {
      scopes: vec![Scope {
        bindings: HashMap::new(),
        is_function_boundary: true,
      }],
    }
  }

  pub fn push(&mut self, is_function_boundary: bool) {
    self.scopes.push(Scope {
      bindings: HashMap::new(),
      is_function_boundary,
    });
  }

  pub fn pop(&mut self) {
    self.scopes.pop();
  }

  /// Binds `name` in the innermost scope and returns the Python-safe name it
  /// was given.
  pub fn declare(&mut self, name: &str, kind: BindingKind) -> String {
    let py_name = safe_name(name);
    self.declare_as(name, py_name.clone(), kind);
    py_name
  }

  pub fn declare_as(&mut self, name: &str, py_name: String, kind: BindingKind) {
    // Unwrap-free: the stack always holds at least the module scope.
    if let Some(scope) = self.scopes.last_mut() {
      scope.bindings.insert(name.to_string(), Binding { kind, py_name });
    }
  }

  pub fn lookup(&self, name: &str) -> Lookup<'_> {
    let mut crossed_boundary = false;
    for (i, scope) in self.scopes.iter().enumerate().rev() {
      if let Some(binding) = scope.bindings.get(name) {
        return if crossed_boundary && i != 0 {
          Lookup::Captured
        } else {
          Lookup::Ok(binding)
        };
      };
      if scope.is_function_boundary {
        crossed_boundary = true;
      };
    }
    Lookup::Missing
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_reserved_names_get_renamed() {
    let mut scopes = ScopeStack::new();
    assert_eq!(scopes.declare("max", BindingKind::Local), "max_");
    assert_eq!(scopes.declare("total", BindingKind::Local), "total");
  }

  #[test]
  fn test_module_scope_reachable_across_functions() {
    let mut scopes = ScopeStack::new();
    scopes.declare("limit", BindingKind::Local);
    scopes.push(true);
    assert!(matches!(scopes.lookup("limit"), Lookup::Ok(_)));
  }

  #[test]
  fn test_closure_capture_detected() {
    let mut scopes = ScopeStack::new();
    scopes.push(true);
    scopes.declare("outer", BindingKind::Local);
    scopes.push(true);
    assert!(matches!(scopes.lookup("outer"), Lookup::Captured));
    assert!(matches!(scopes.lookup("missing"), Lookup::Missing));
    scopes.pop();
    assert!(matches!(scopes.lookup("outer"), Lookup::Ok(_)));
  }

  #[test]
  fn test_block_scopes_do_not_capture() {
    let mut scopes = ScopeStack::new();
    scopes.push(true);
    scopes.declare("i", BindingKind::Local);
    scopes.push(false);
    assert!(matches!(scopes.lookup("i"), Lookup::Ok(_)));
  }
}
