use crate::ast::node::Node;
use crate::py::expr::PyBoolOpKind;
use crate::py::expr::PyConstant;
use crate::py::expr::PyExpr;
use crate::py::expr::PyFStringPart;
use crate::py::expr::PyOp;
use crate::py::expr::PyUnaryOpKind;
use crate::py::stmt::PyIf;
use crate::py::stmt::PyParam;
use crate::py::stmt::PyStmt;

// Python expression precedence, low to high. Used to decide parenthesisation
// so the emitted text re-parses to the same tree.
const PREC_TERNARY: u8 = 2;
const PREC_OR: u8 = 4;
const PREC_AND: u8 = 5;
const PREC_NOT: u8 = 6;
const PREC_CMP: u8 = 7;
const PREC_ADD: u8 = 11;
const PREC_MUL: u8 = 12;
const PREC_UNARY: u8 = 13;
const PREC_POW: u8 = 14;
const PREC_ATOM: u8 = 16;

/// Renders a Python module. Output is deterministic: indentation derives
/// purely from AST nesting (4 spaces per level), dict entries keep insertion
/// order, and one blank line separates consecutive top-level definitions.
pub fn emit_module(body: &[Node<PyStmt>]) -> String {
  let mut emitter = Emitter {
    out: String::new(),
    indent: 0,
  };
  emitter.stmts(body);
  emitter.out
}

struct Emitter {
  out: String,
  indent: usize,
}

impl Emitter {
  fn line(&mut self, text: &str) {
    for _ in 0..self.indent {
      self.out.push_str("    ");
    }
    self.out.push_str(text);
    self.out.push('\n');
  }

  fn blank_line(&mut self) {
    self.out.push('\n');
  }

  fn stmts(&mut self, body: &[Node<PyStmt>]) {
    for (i, stmt) in body.iter().enumerate() {
      if i > 0 && matches!(stmt.stx.as_ref(), PyStmt::ClassDef(_) | PyStmt::FunctionDef(_)) {
        self.blank_line();
      }
      self.stmt(stmt);
    }
  }

  fn suite(&mut self, body: &[Node<PyStmt>]) {
    self.indent += 1;
    if body.is_empty() {
      self.line("pass");
    } else {
      self.stmts(body);
    }
    self.indent -= 1;
  }

  fn stmt(&mut self, stmt: &Node<PyStmt>) {
    match stmt.stx.as_ref() {
      PyStmt::Assign(n) => {
        let target = expr_text(&n.stx.target, 0);
        let text = match (&n.stx.annotation, &n.stx.value) {
          (Some(annotation), Some(value)) => format!(
            "{}: {} = {}",
            target,
            expr_text(annotation, 0),
            expr_text(value, 0)
          ),
          (Some(annotation), None) => format!("{}: {}", target, expr_text(annotation, 0)),
          (None, Some(value)) => format!("{} = {}", target, expr_text(value, 0)),
          (None, None) => format!("{} = None", target),
        };
        self.line(&text);
      }
      PyStmt::AugAssign(n) => {
        self.line(&format!(
          "{} {}= {}",
          expr_text(&n.stx.target, 0),
          n.stx.op.text(),
          expr_text(&n.stx.value, 0)
        ));
      }
      PyStmt::Break(_) => self.line("break"),
      PyStmt::ClassDef(n) => {
        let bases = n
          .stx
          .bases
          .iter()
          .map(|b| expr_text(b, 0))
          .collect::<Vec<_>>()
          .join(", ");
        if bases.is_empty() {
          self.line(&format!("class {}:", n.stx.name));
        } else {
          self.line(&format!("class {}({}):", n.stx.name, bases));
        }
        self.suite(&n.stx.body);
      }
      PyStmt::Continue(_) => self.line("continue"),
      PyStmt::Expr(n) => {
        let text = expr_text(&n.stx.expr, 0);
        self.line(&text);
      }
      PyStmt::For(n) => {
        self.line(&format!(
          "for {} in {}:",
          n.stx.target,
          expr_text(&n.stx.iter, 0)
        ));
        self.suite(&n.stx.body);
      }
      PyStmt::FunctionDef(n) => {
        let parameters = n
          .stx
          .parameters
          .iter()
          .map(param_text)
          .collect::<Vec<_>>()
          .join(", ");
        let returns = match &n.stx.returns {
          Some(returns) => format!(" -> {}", expr_text(returns, 0)),
          None => String::new(),
        };
        self.line(&format!("def {}({}){}:", n.stx.name, parameters, returns));
        self.suite(&n.stx.body);
      }
      PyStmt::If(n) => self.if_stmt(&n.stx, "if"),
      PyStmt::Import(n) => self.line(&format!("import {}", n.stx.module)),
      PyStmt::ImportFrom(n) => self.line(&format!(
        "from {} import {}",
        n.stx.module,
        n.stx.names.join(", ")
      )),
      PyStmt::Return(n) => match &n.stx.value {
        Some(value) => {
          let text = expr_text(value, 0);
          self.line(&format!("return {}", text));
        }
        None => self.line("return"),
      },
      PyStmt::While(n) => {
        self.line(&format!("while {}:", expr_text(&n.stx.test, 0)));
        self.suite(&n.stx.body);
      }
    };
  }

  fn if_stmt(&mut self, stmt: &PyIf, keyword: &str) {
    self.line(&format!("{} {}:", keyword, expr_text(&stmt.test, 0)));
    self.suite(&stmt.body);
    if stmt.orelse.is_empty() {
      return;
    }
    // A lone nested `if` in the else suite renders as `elif`.
    if stmt.orelse.len() == 1 {
      if let PyStmt::If(inner) = stmt.orelse[0].stx.as_ref() {
        self.if_stmt(&inner.stx, "elif");
        return;
      }
    }
    self.line("else:");
    self.suite(&stmt.orelse);
  }
}

fn param_text(param: &PyParam) -> String {
  match (&param.annotation, &param.default) {
    (Some(annotation), Some(default)) => format!(
      "{}: {} = {}",
      param.name,
      expr_text(annotation, 0),
      expr_text(default, 0)
    ),
    (Some(annotation), None) => format!("{}: {}", param.name, expr_text(annotation, 0)),
    (None, Some(default)) => format!("{}={}", param.name, expr_text(default, 0)),
    (None, None) => param.name.clone(),
  }
}

fn expr_text(node: &Node<PyExpr>, parent: u8) -> String {
  let (text, prec) = match node.stx.as_ref() {
    PyExpr::Attribute(n) => (
      format!("{}.{}", expr_text(&n.stx.value, PREC_ATOM), n.stx.attr),
      PREC_ATOM,
    ),
    PyExpr::BinOp(n) => {
      let prec = match n.stx.op {
        PyOp::Pow => PREC_POW,
        PyOp::Div | PyOp::Mod | PyOp::Mult => PREC_MUL,
        PyOp::Add | PyOp::Sub => PREC_ADD,
      };
      // `**` is right-associative; everything else is left-associative.
      let (left_prec, right_prec) = if n.stx.op == PyOp::Pow {
        (prec + 1, prec)
      } else {
        (prec, prec + 1)
      };
      (
        format!(
          "{} {} {}",
          expr_text(&n.stx.left, left_prec),
          n.stx.op.text(),
          expr_text(&n.stx.right, right_prec)
        ),
        prec,
      )
    }
    PyExpr::BoolOp(n) => {
      let (keyword, prec) = match n.stx.op {
        PyBoolOpKind::And => ("and", PREC_AND),
        PyBoolOpKind::Or => ("or", PREC_OR),
      };
      (
        format!(
          "{} {} {}",
          expr_text(&n.stx.left, prec),
          keyword,
          expr_text(&n.stx.right, prec + 1)
        ),
        prec,
      )
    }
    PyExpr::Call(n) => {
      let args = n
        .stx
        .args
        .iter()
        .map(|a| expr_text(a, 0))
        .collect::<Vec<_>>()
        .join(", ");
      (
        format!("{}({})", expr_text(&n.stx.func, PREC_ATOM), args),
        PREC_ATOM,
      )
    }
    PyExpr::Compare(n) => (
      format!(
        "{} {} {}",
        expr_text(&n.stx.left, PREC_CMP + 1),
        n.stx.op.text(),
        expr_text(&n.stx.right, PREC_CMP + 1)
      ),
      PREC_CMP,
    ),
    PyExpr::Constant(n) => (constant_text(&n.stx), PREC_ATOM),
    PyExpr::Dict(n) => {
      let entries = n
        .stx
        .entries
        .iter()
        .map(|(key, value)| format!("{}: {}", expr_text(key, 0), expr_text(value, 0)))
        .collect::<Vec<_>>()
        .join(", ");
      (format!("{{{}}}", entries), PREC_ATOM)
    }
    PyExpr::FString(n) => (fstring_text(&n.stx.parts), PREC_ATOM),
    PyExpr::IfExp(n) => (
      format!(
        "{} if {} else {}",
        expr_text(&n.stx.body, PREC_TERNARY + 1),
        expr_text(&n.stx.test, PREC_TERNARY + 1),
        expr_text(&n.stx.orelse, PREC_TERNARY)
      ),
      PREC_TERNARY,
    ),
    PyExpr::List(n) => {
      let elements = n
        .stx
        .elements
        .iter()
        .map(|e| expr_text(e, 0))
        .collect::<Vec<_>>()
        .join(", ");
      (format!("[{}]", elements), PREC_ATOM)
    }
    PyExpr::ListComp(n) => {
      let condition = match &n.stx.condition {
        Some(condition) => format!(" if {}", expr_text(condition, PREC_OR)),
        None => String::new(),
      };
      (
        format!(
          "[{} for {} in {}{}]",
          expr_text(&n.stx.element, 0),
          n.stx.target,
          expr_text(&n.stx.iter, PREC_OR),
          condition
        ),
        PREC_ATOM,
      )
    }
    PyExpr::Name(n) => (n.stx.name.clone(), PREC_ATOM),
    PyExpr::SliceRange(n) => {
      let lower = n
        .stx
        .lower
        .as_ref()
        .map(|e| expr_text(e, 0))
        .unwrap_or_default();
      let upper = n
        .stx
        .upper
        .as_ref()
        .map(|e| expr_text(e, 0))
        .unwrap_or_default();
      (format!("{}:{}", lower, upper), PREC_ATOM)
    }
    PyExpr::Subscript(n) => (
      format!(
        "{}[{}]",
        expr_text(&n.stx.value, PREC_ATOM),
        expr_text(&n.stx.index, 0)
      ),
      PREC_ATOM,
    ),
    // Only appears as a subscript index, where no parens are needed.
    PyExpr::Tuple(n) => {
      let elements = n
        .stx
        .elements
        .iter()
        .map(|e| expr_text(e, 0))
        .collect::<Vec<_>>()
        .join(", ");
      (elements, PREC_ATOM)
    }
    PyExpr::UnaryOp(n) => match n.stx.op {
      PyUnaryOpKind::Not => (
        format!("not {}", expr_text(&n.stx.operand, PREC_NOT)),
        PREC_NOT,
      ),
      PyUnaryOpKind::UAdd => (
        format!("+{}", expr_text(&n.stx.operand, PREC_UNARY)),
        PREC_UNARY,
      ),
      PyUnaryOpKind::USub => (
        format!("-{}", expr_text(&n.stx.operand, PREC_UNARY)),
        PREC_UNARY,
      ),
    },
  };
  if prec < parent {
    format!("({})", text)
  } else {
    text
  }
}

fn constant_text(constant: &PyConstant) -> String {
  match constant {
    PyConstant::Bool(true) => "True".to_string(),
    PyConstant::Bool(false) => "False".to_string(),
    PyConstant::Float(raw) => raw.clone(),
    PyConstant::Int(raw) => raw.clone(),
    PyConstant::None => "None".to_string(),
    PyConstant::Str(value) => str_text(value),
  }
}

// A string containing a single quote switches to double quotes instead of
// escaping it: string literals also appear inside f-string expression parts,
// where parsers before Python 3.12 reject backslashes.
fn str_text(value: &str) -> String {
  let quote = if value.contains('\'') && !value.contains('"') {
    '"'
  } else {
    '\''
  };
  let mut out = String::with_capacity(value.len() + 2);
  out.push(quote);
  for c in value.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      c if c == quote => {
        out.push('\\');
        out.push(c);
      }
      c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
      c => out.push(c),
    };
  }
  out.push(quote);
  out
}

// Expression parts are spliced in verbatim, and parsers before Python 3.12
// reject the enclosing quote character inside them, so the enclosing quote
// is chosen to avoid every rendered expression. Literal parts can escape
// freely; only the expression parts are restricted.
fn fstring_text(parts: &[PyFStringPart]) -> String {
  let expr_texts: Vec<String> = parts
    .iter()
    .filter_map(|part| match part {
      PyFStringPart::Expr(expr) => Some(expr_text(expr, 0)),
      PyFStringPart::Str(_) => None,
    })
    .collect();
  let quote = if expr_texts.iter().any(|t| t.contains('"')) {
    '\''
  } else {
    '"'
  };
  let mut expr_texts = expr_texts.into_iter();
  let mut out = String::from("f");
  out.push(quote);
  for part in parts {
    match part {
      PyFStringPart::Str(text) => {
        for c in text.chars() {
          match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '{' => out.push_str("{{"),
            '}' => out.push_str("}}"),
            c if c == quote => {
              out.push('\\');
              out.push(c);
            }
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
          };
        }
      }
      PyFStringPart::Expr(_) => {
        out.push('{');
        if let Some(text) = expr_texts.next() {
          out.push_str(&text);
        }
        out.push('}');
      }
    };
  }
  out.push(quote);
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::loc::Loc;
  use crate::py::expr::PyBinOp;
  use crate::py::expr::PyCall;
  use crate::py::expr::PyName;
  use crate::py::stmt::PyFunctionDef;
  use crate::py::stmt::PyReturn;

  fn node<S>(stx: S) -> Node<S> {
    Node::new(Loc(0, 0), stx)
  }

  fn name(text: &str) -> Node<PyExpr> {
    node(PyName {
      name: text.to_string(),
    })
    .into_wrapped()
  }

  fn int(raw: &str) -> Node<PyExpr> {
    node(PyConstant::Int(raw.to_string())).into_wrapped()
  }

  fn bin(op: PyOp, left: Node<PyExpr>, right: Node<PyExpr>) -> Node<PyExpr> {
    node(PyBinOp { op, left, right }).into_wrapped()
  }

  #[test]
  fn test_emit_precedence_parens() {
    // (1 + 2) * 3 keeps its parentheses; 1 + 2 * 3 does not gain any.
    let grouped = bin(PyOp::Mult, bin(PyOp::Add, int("1"), int("2")), int("3"));
    assert_eq!(expr_text(&grouped, 0), "(1 + 2) * 3");
    let flat = bin(PyOp::Add, int("1"), bin(PyOp::Mult, int("2"), int("3")));
    assert_eq!(expr_text(&flat, 0), "1 + 2 * 3");
  }

  #[test]
  fn test_emit_pow_right_associative() {
    let pow = bin(PyOp::Pow, int("2"), bin(PyOp::Pow, int("3"), int("2")));
    assert_eq!(expr_text(&pow, 0), "2 ** 3 ** 2");
    let left = bin(PyOp::Pow, bin(PyOp::Pow, int("2"), int("3")), int("2"));
    assert_eq!(expr_text(&left, 0), "(2 ** 3) ** 2");
  }

  #[test]
  fn test_emit_string_escapes() {
    assert_eq!(str_text("plain"), "'plain'");
    // A single quote in the value flips to double quotes, escape-free.
    assert_eq!(str_text("it's\na\\b"), "\"it's\\na\\\\b\"");
    // Both quote characters force an escape.
    assert_eq!(str_text("a'b\"c"), "'a\\'b\"c'");
  }

  #[test]
  fn test_emit_fstring_braces_escaped() {
    let parts = vec![
      PyFStringPart::Str("a{b}".to_string()),
      PyFStringPart::Expr(name("x")),
    ];
    assert_eq!(fstring_text(&parts), "f\"a{{b}}{x}\"");
  }

  #[test]
  fn test_emit_fstring_quote_avoids_inner_strings() {
    // A double-quoted inner string would terminate the default f"..." form
    // before Python 3.12, and a backslash escape is no better; the f-string
    // switches its own quote instead.
    let inner: Node<PyExpr> = node(PyConstant::Str("'".to_string())).into_wrapped();
    let parts = vec![
      PyFStringPart::Str("v: ".to_string()),
      PyFStringPart::Expr(inner),
    ];
    assert_eq!(fstring_text(&parts), "f'v: {\"'\"}'");
  }

  #[test]
  fn test_emit_function_and_blank_lines() {
    let def = |ident: &str| -> Node<PyStmt> {
      node(PyFunctionDef {
        name: ident.to_string(),
        parameters: vec![],
        returns: None,
        body: vec![node(PyReturn { value: None }).into_wrapped()],
      })
      .into_wrapped()
    };
    let out = emit_module(&[def("a"), def("b")]);
    assert_eq!(out, "def a():\n    return\n\ndef b():\n    return\n");
  }

  #[test]
  fn test_emit_elif_chain() {
    let branch = node(PyIf {
      test: name("b"),
      body: vec![node(PyReturn { value: Some(int("2")) }).into_wrapped()],
      orelse: vec![],
    });
    let top = node(PyIf {
      test: name("a"),
      body: vec![node(PyReturn { value: Some(int("1")) }).into_wrapped()],
      orelse: vec![branch.into_wrapped()],
    });
    let out = emit_module(&[top.into_wrapped()]);
    assert_eq!(out, "if a:\n    return 1\nelif b:\n    return 2\n");
  }

  #[test]
  fn test_emit_empty_suite_gets_pass() {
    let def: Node<PyStmt> = node(PyFunctionDef {
      name: "noop".to_string(),
      parameters: vec![],
      returns: None,
      body: vec![],
    })
    .into_wrapped();
    assert_eq!(emit_module(&[def]), "def noop():\n    pass\n");
  }

  #[test]
  fn test_emit_call() {
    let call: Node<PyExpr> = node(PyCall {
      func: name("print"),
      args: vec![name("x"), int("2")],
    })
    .into_wrapped();
    assert_eq!(expr_text(&call, 0), "print(x, 2)");
  }
}
