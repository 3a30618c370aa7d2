pub mod scope;

use crate::ast::class_or_object::ClassMemberVal;
use crate::ast::class_or_object::ObjMember;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::CallExpr;
use crate::ast::expr::Expr;
use crate::ast::expr::LitTemplatePart;
use crate::ast::expr::MemberExpr;
use crate::ast::expr::UnaryExpr;
use crate::ast::func::Func;
use crate::ast::func::FuncBody;
use crate::ast::node::Node;
use crate::ast::stmt::ClassDecl;
use crate::ast::stmt::ForInit;
use crate::ast::stmt::ForTripleStmt;
use crate::ast::stmt::InterfaceDecl;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::VarDecl;
use crate::ast::stx::TopLevel;
use crate::ast::type_expr::TypeExpr;
use crate::error::TransformError;
use crate::error::TransformErrorType;
use crate::error::TransformResult;
use crate::loc::Loc;
use crate::operator::OperatorName;
use crate::py::expr::PyAttribute;
use crate::py::expr::PyBinOp;
use crate::py::expr::PyBoolOp;
use crate::py::expr::PyBoolOpKind;
use crate::py::expr::PyCall;
use crate::py::expr::PyCmpOp;
use crate::py::expr::PyCompare;
use crate::py::expr::PyConstant;
use crate::py::expr::PyDict;
use crate::py::expr::PyExpr;
use crate::py::expr::PyFString;
use crate::py::expr::PyFStringPart;
use crate::py::expr::PyIfExp;
use crate::py::expr::PyList;
use crate::py::expr::PyListComp;
use crate::py::expr::PyName;
use crate::py::expr::PyOp;
use crate::py::expr::PySliceRange;
use crate::py::expr::PySubscript;
use crate::py::expr::PyTuple;
use crate::py::expr::PyUnaryOp;
use crate::py::expr::PyUnaryOpKind;
use crate::py::stmt::PyAssign;
use crate::py::stmt::PyAugAssign;
use crate::py::stmt::PyBreak;
use crate::py::stmt::PyClassDef;
use crate::py::stmt::PyContinue;
use crate::py::stmt::PyExprStmt;
use crate::py::stmt::PyFor;
use crate::py::stmt::PyFunctionDef;
use crate::py::stmt::PyIf;
use crate::py::stmt::PyImport;
use crate::py::stmt::PyImportFrom;
use crate::py::stmt::PyParam;
use crate::py::stmt::PyReturn;
use crate::py::stmt::PyStmt;
use crate::py::stmt::PyWhile;
use ahash::HashSet;
use once_cell::sync::Lazy;
use scope::safe_name;
use scope::BindingKind;
use scope::Lookup;
use scope::ScopeStack;
use std::collections::BTreeSet;

/// A non-fatal fidelity loss, currently only type-hint degradation.
#[derive(Clone, Debug)]
pub struct TransformWarning {
  pub message: String,
  pub loc: Loc,
}

pub struct Transformed {
  pub body: Vec<Node<PyStmt>>,
  pub warnings: Vec<TransformWarning>,
}

/// Rewrites the JS AST into the Python AST.
///
/// Each top-level declaration is transformed independently; an error in one
/// does not stop the others, and all errors are reported together. Any
/// construct without a faithful Python rendering is an error, never a
/// best-effort guess.
pub fn transform_top_level(top_level: &Node<TopLevel>) -> Result<Transformed, Vec<TransformError>> {
  let mut transformer = Transformer::new();
  // Module-level names are visible to every declaration regardless of order,
  // matching Python where module globals resolve at call time.
  for stmt in &top_level.stx.body {
    transformer.hoist_module_decl(stmt);
  }
  let mut body = Vec::new();
  let mut errors = Vec::new();
  for stmt in &top_level.stx.body {
    match transformer.stmt(stmt) {
      Ok(stmts) => body.extend(stmts),
      Err(err) => errors.push(err),
    };
  }
  if !errors.is_empty() {
    return Err(errors);
  }
  let mut module = transformer.import_stmts();
  module.extend(body);
  Ok(Transformed {
    body: module,
    warnings: transformer.warnings,
  })
}

/// JS methods with no Python equivalent (or one with different semantics,
/// e.g. `sort` mutates and returns the array in JS but `None` in Python).
static UNMAPPABLE_METHODS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  [
    "charAt",
    "charCodeAt",
    "concat",
    "every",
    "findIndex",
    "flat",
    "flatMap",
    "lastIndexOf",
    "padEnd",
    "padStart",
    "reverse",
    "some",
    "sort",
    "splice",
    "substr",
    "unshift",
  ]
  .into_iter()
  .collect()
});

fn simple_method_rename(method: &str) -> Option<&'static str> {
  Some(match method {
    "endsWith" => "endswith",
    "indexOf" => "index",
    "pop" => "pop",
    "push" => "append",
    "replace" => "replace",
    "split" => "split",
    "startsWith" => "startswith",
    "toLowerCase" => "lower",
    "toUpperCase" => "upper",
    "trim" => "strip",
    _ => return None,
  })
}

type FieldInit<'a> = (Loc, String, Option<&'a Node<TypeExpr>>, &'a Node<Expr>);

struct Transformer {
  scopes: ScopeStack,
  warnings: Vec<TransformWarning>,
  // Python modules the generated code needs; BTreeSet for stable order.
  imports: BTreeSet<&'static str>,
  typing_any: bool,
  in_class: bool,
  this_receiver_used: bool,
  function_depth: usize,
}

impl Transformer {
  fn new() -> Transformer {
    Transformer {
      scopes: ScopeStack::new(),
      warnings: Vec::new(),
      imports: BTreeSet::new(),
      typing_any: false,
      in_class: false,
      this_receiver_used: false,
      function_depth: 0,
    }
  }

  fn import_stmts(&self) -> Vec<Node<PyStmt>> {
    let loc = Loc(0, 0);
    let mut out = Vec::<Node<PyStmt>>::new();
    if self.typing_any {
      out.push(
        Node::new(loc, PyImportFrom {
          module: "typing",
          names: vec!["Any"],
        })
        .into_wrapped(),
      );
    }
    for module in self.imports.iter().copied() {
      out.push(Node::new(loc, PyImport { module }).into_wrapped());
    }
    out
  }

  fn in_scope<T, F: FnOnce(&mut Self) -> TransformResult<T>>(
    &mut self,
    is_function_boundary: bool,
    f: F,
  ) -> TransformResult<T> {
    self.scopes.push(is_function_boundary);
    let result = f(self);
    self.scopes.pop();
    result
  }

  fn hoist_module_decl(&mut self, stmt: &Node<Stmt>) {
    match stmt.stx.as_ref() {
      Stmt::ClassDecl(c) => {
        self.scopes.declare(&c.stx.name.stx.name, BindingKind::Class);
      }
      Stmt::FunctionDecl(f) => {
        self.scopes.declare(&f.stx.name.stx.name, BindingKind::Function);
      }
      Stmt::InterfaceDecl(i) => {
        self.scopes.declare(&i.stx.name.stx.name, BindingKind::Class);
      }
      Stmt::VarDecl(v) => {
        for declarator in &v.stx.declarators {
          let kind = match &declarator.initializer {
            Some(init) if matches!(init.stx.as_ref(), Expr::ArrowFunc(_)) => BindingKind::Function,
            _ => BindingKind::Local,
          };
          self.scopes.declare(&declarator.name.stx.name, kind);
        }
      }
      _ => {}
    };
  }

  // Function and class declarations are hoisted within their block, so a
  // call above the declaration still resolves.
  fn hoist_block_decls(&mut self, body: &[Node<Stmt>]) {
    for stmt in body {
      match stmt.stx.as_ref() {
        Stmt::ClassDecl(c) => {
          self.scopes.declare(&c.stx.name.stx.name, BindingKind::Class);
        }
        Stmt::FunctionDecl(f) => {
          self.scopes.declare(&f.stx.name.stx.name, BindingKind::Function);
        }
        Stmt::InterfaceDecl(i) => {
          self.scopes.declare(&i.stx.name.stx.name, BindingKind::Class);
        }
        _ => {}
      };
    }
  }

  fn block_body(&mut self, body: &[Node<Stmt>]) -> TransformResult<Vec<Node<PyStmt>>> {
    self.hoist_block_decls(body);
    let mut out = Vec::new();
    for stmt in body {
      out.extend(self.stmt(stmt)?);
    }
    Ok(out)
  }

  fn stmt(&mut self, node: &Node<Stmt>) -> TransformResult<Vec<Node<PyStmt>>> {
    let loc = node.loc;
    match node.stx.as_ref() {
      // Python has no block statement; the contents splice into the parent
      // suite while keeping their own declaration scope.
      Stmt::Block(b) => self.in_scope(false, |t| t.block_body(&b.stx.body)),
      Stmt::Break(_) => Ok(vec![Node::new(loc, PyBreak {}).into_wrapped()]),
      Stmt::ClassDecl(c) => Ok(vec![self.class_decl(c)?]),
      Stmt::Continue(_) => Ok(vec![Node::new(loc, PyContinue {}).into_wrapped()]),
      Stmt::Expr(e) => self.expr_statement(&e.stx.expr),
      Stmt::ForOf(f) => {
        let iter = self.expr(&f.stx.iterable)?;
        self.in_scope(false, |t| {
          let target = t.scopes.declare(&f.stx.variable.stx.name, BindingKind::Local);
          let body = t.block_body(&f.stx.body)?;
          Ok(vec![
            Node::new(loc, PyFor { target, iter, body }).into_wrapped(),
          ])
        })
      }
      Stmt::ForTriple(f) => self.for_triple(loc, f),
      Stmt::FunctionDecl(f) => {
        let py_name = self
          .scopes
          .declare(&f.stx.name.stx.name, BindingKind::Function);
        Ok(vec![self.function_def(loc, py_name, &f.stx.function, false, &[])?])
      }
      Stmt::If(s) => {
        let test = self.expr(&s.stx.test)?;
        let body = self.in_scope(false, |t| t.block_body(&s.stx.consequent))?;
        let orelse = match &s.stx.alternate {
          Some(stmts) => self.in_scope(false, |t| t.block_body(stmts))?,
          None => Vec::new(),
        };
        Ok(vec![
          Node::new(loc, PyIf { test, body, orelse }).into_wrapped(),
        ])
      }
      Stmt::InterfaceDecl(i) => Ok(vec![self.interface_decl(i)?]),
      Stmt::Return(r) => {
        let value = match &r.stx.value {
          Some(value) => Some(self.expr(value)?),
          None => None,
        };
        Ok(vec![Node::new(loc, PyReturn { value }).into_wrapped()])
      }
      Stmt::VarDecl(v) => self.var_decl(v),
      Stmt::While(w) => {
        let test = self.expr(&w.stx.condition)?;
        let body = self.in_scope(false, |t| t.block_body(&w.stx.body))?;
        Ok(vec![Node::new(loc, PyWhile { test, body }).into_wrapped()])
      }
    }
  }

  fn var_decl(&mut self, node: &Node<VarDecl>) -> TransformResult<Vec<Node<PyStmt>>> {
    let mut out = Vec::new();
    for declarator in &node.stx.declarators {
      let name = &declarator.name.stx.name;
      let loc = declarator.name.loc;
      match &declarator.initializer {
        Some(init) => match init.stx.as_ref() {
          // `const f = (...) => ...` becomes a `def`.
          Expr::ArrowFunc(arrow) => {
            let py_name = self.scopes.declare(name, BindingKind::Function);
            out.push(self.function_def(init.loc, py_name, &arrow.stx.func, false, &[])?);
          }
          Expr::Call(call) if is_method_call(call, "reduce") => {
            out.extend(self.reduce_decl(loc, name, call)?);
          }
          _ => {
            let value = self.expr(init)?;
            let annotation = match &declarator.type_annotation {
              Some(t) => Some(self.type_hint(t)),
              None => None,
            };
            let py_name = self.scopes.declare(name, BindingKind::Local);
            out.push(
              Node::new(loc, PyAssign {
                target: name_expr(loc, py_name),
                annotation,
                value: Some(value),
              })
              .into_wrapped(),
            );
          }
        },
        // `let x;` still has to bind the name in Python.
        None => {
          let annotation = match &declarator.type_annotation {
            Some(t) => Some(self.type_hint(t)),
            None => None,
          };
          let py_name = self.scopes.declare(name, BindingKind::Local);
          out.push(
            Node::new(loc, PyAssign {
              target: name_expr(loc, py_name),
              annotation,
              value: None,
            })
            .into_wrapped(),
          );
        }
      };
    }
    Ok(out)
  }

  /// `const total = seq.reduce((acc, x) => step, init)` lowers to an explicit
  /// accumulator loop, preserving side-effect order:
  ///
  /// ```text
  /// total = init
  /// for x in seq:
  ///     total = step[acc := total]
  /// ```
  fn reduce_decl(
    &mut self,
    loc: Loc,
    name: &str,
    call: &Node<CallExpr>,
  ) -> TransformResult<Vec<Node<PyStmt>>> {
    let Expr::Member(member) = call.stx.callee.stx.as_ref() else {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedChain("`.reduce` callee".to_string()),
        loc,
      ));
    };
    if call.stx.arguments.len() != 2 {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedChain("`.reduce` without an initial value".to_string()),
        loc,
      ));
    }
    let callback = &call.stx.arguments[0];
    let Expr::ArrowFunc(arrow) = callback.stx.as_ref() else {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedCallback("reduce"),
        callback.loc,
      ));
    };
    let func = &arrow.stx.func;
    if func.stx.parameters.len() != 2 {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedCallback("reduce"),
        callback.loc,
      ));
    }
    let FuncBody::Expression(step) = &func.stx.body else {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedChain("`.reduce` with a block-bodied callback".to_string()),
        callback.loc,
      ));
    };
    let init = self.expr(&call.stx.arguments[1])?;
    let iter = self.expr(&member.stx.left)?;
    let target = self.scopes.declare(name, BindingKind::Local);
    let acc_name = &func.stx.parameters[0].stx.name;
    let item_name = &func.stx.parameters[1].stx.name;
    let accumulator = target.clone();
    let (item_target, step_value) = self.in_scope(false, move |t| {
      t.scopes
        .declare_as(acc_name, accumulator, BindingKind::Local);
      let item_target = t.scopes.declare(item_name, BindingKind::Param);
      let step_value = t.expr(step)?;
      Ok((item_target, step_value))
    })?;
    let assign_step: Node<PyStmt> = Node::new(step.loc, PyAssign {
      target: name_expr(loc, target.clone()),
      annotation: None,
      value: Some(step_value),
    })
    .into_wrapped();
    Ok(vec![
      Node::new(loc, PyAssign {
        target: name_expr(loc, target),
        annotation: None,
        value: Some(init),
      })
      .into_wrapped(),
      Node::new(loc, PyFor {
        target: item_target,
        iter,
        body: vec![assign_step],
      })
      .into_wrapped(),
    ])
  }

  fn for_triple(
    &mut self,
    loc: Loc,
    node: &Node<ForTripleStmt>,
  ) -> TransformResult<Vec<Node<PyStmt>>> {
    let f = &node.stx;
    // The canonical counting loop `for (let i = a; i < n; i++)` becomes
    // `for i in range(a, n)`.
    if let (ForInit::VarDecl(decl), Some(condition), Some(update)) =
      (&f.init, &f.condition, &f.update)
    {
      if let [declarator] = decl.stx.declarators.as_slice() {
        let var = &declarator.name.stx.name;
        let start = match declarator.initializer.as_ref().map(|i| i.stx.as_ref()) {
          Some(Expr::LitNum(n)) if !is_float_raw(&n.stx.raw) => Some(n.stx.raw.clone()),
          _ => None,
        };
        if let (Some(start), Expr::Binary(cond)) = (start, condition.stx.as_ref()) {
          // A body that writes the counter needs the while form; Python's
          // `for` reassigns the target at the top of every iteration.
          let counts_up = cond.stx.operator == OperatorName::LessThan
            && matches!(cond.stx.left.stx.as_ref(), Expr::Id(id) if &id.stx.name == var)
            && is_increment_of(update, var)
            && !body_writes_to(&f.body, var);
          if counts_up {
            let limit = self.expr(&cond.stx.right)?;
            return self.in_scope(false, |t| {
              let target = t.scopes.declare(var, BindingKind::Local);
              let body = t.block_body(&f.body)?;
              let mut range_args = Vec::new();
              if start != "0" {
                range_args.push(constant(loc, PyConstant::Int(start)));
              }
              range_args.push(limit);
              let iter = builtin_call(loc, "range", range_args);
              Ok(vec![Node::new(loc, PyFor { target, iter, body }).into_wrapped()])
            });
          }
        }
      }
    }
    // Anything else desugars to init + while, with the update appended to
    // the loop body. A `continue` would skip that update, changing meaning.
    if f.update.is_some() && contains_shallow_continue(&f.body) {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedConstruct(
          "`continue` inside a `for` loop with an update expression",
        ),
        loc,
      ));
    }
    self.in_scope(false, |t| {
      let mut out = Vec::new();
      match &f.init {
        ForInit::None => {}
        ForInit::Expr(e) => out.extend(t.expr_statement(e)?),
        ForInit::VarDecl(d) => out.extend(t.var_decl(d)?),
      };
      let test = match &f.condition {
        Some(condition) => t.expr(condition)?,
        None => constant(loc, PyConstant::Bool(true)),
      };
      let mut body = t.in_scope(false, |t| t.block_body(&f.body))?;
      if let Some(update) = &f.update {
        body.extend(t.expr_statement(update)?);
      }
      out.push(Node::new(loc, PyWhile { test, body }).into_wrapped());
      Ok(out)
    })
  }

  fn interface_decl(&mut self, node: &Node<InterfaceDecl>) -> TransformResult<Node<PyStmt>> {
    let py_name = self
      .scopes
      .declare(&node.stx.name.stx.name, BindingKind::Class);
    let mut body = Vec::new();
    for field in &node.stx.fields {
      let annotation = self.type_hint(&field.stx.type_annotation);
      body.push(
        Node::new(field.loc, PyAssign {
          target: name_expr(field.loc, field.stx.name.clone()),
          annotation: Some(annotation),
          value: None,
        })
        .into_wrapped(),
      );
    }
    Ok(
      Node::new(node.loc, PyClassDef {
        name: py_name,
        bases: Vec::new(),
        body,
      })
      .into_wrapped(),
    )
  }

  fn class_decl(&mut self, node: &Node<ClassDecl>) -> TransformResult<Node<PyStmt>> {
    let decl = &node.stx;
    let py_name = self.scopes.declare(&decl.name.stx.name, BindingKind::Class);
    let mut bases = Vec::new();
    if let Some(extends) = &decl.extends {
      let base = self.ident_usage(extends.loc, &extends.stx.name)?;
      bases.push(name_expr(extends.loc, base));
    }
    let mut body = Vec::new();
    let mut field_inits = Vec::<FieldInit>::new();
    let mut constructor: Option<&Node<Func>> = None;
    let mut methods = Vec::new();
    for member in &decl.members {
      let key = &member.stx.key.stx.key;
      match &member.stx.val {
        ClassMemberVal::Method(func) => {
          if key == "constructor" {
            constructor = Some(func);
          } else {
            methods.push((member.loc, key.clone(), func));
          }
        }
        ClassMemberVal::Prop(prop) => match &prop.initializer {
          // Initialized fields move into __init__.
          Some(init) => {
            field_inits.push((member.loc, key.clone(), prop.type_annotation.as_ref(), init))
          }
          // Annotation-only fields stay as class-level annotations.
          None => {
            let annotation = match &prop.type_annotation {
              Some(t) => Some(self.type_hint(t)),
              None => None,
            };
            body.push(
              Node::new(member.loc, PyAssign {
                target: name_expr(member.loc, key.clone()),
                annotation,
                value: None,
              })
              .into_wrapped(),
            );
          }
        },
      };
    }
    match constructor {
      Some(func) => {
        body.push(self.function_def(func.loc, "__init__".to_string(), func, true, &field_inits)?)
      }
      None if !field_inits.is_empty() => {
        let prev_in_class = self.in_class;
        self.in_class = true;
        self.function_depth += 1;
        let assigns = self.in_scope(true, |t| t.field_init_stmts(&field_inits));
        self.function_depth -= 1;
        self.in_class = prev_in_class;
        body.push(
          Node::new(node.loc, PyFunctionDef {
            name: "__init__".to_string(),
            parameters: vec![PyParam {
              name: "self".to_string(),
              annotation: None,
              default: None,
            }],
            returns: None,
            body: assigns?,
          })
          .into_wrapped(),
        );
      }
      None => {}
    };
    for (loc, key, func) in methods {
      body.push(self.function_def(loc, key, func, true, &[])?);
    }
    Ok(
      Node::new(node.loc, PyClassDef {
        name: py_name,
        bases,
        body,
      })
      .into_wrapped(),
    )
  }

  fn field_init_stmts(&mut self, field_inits: &[FieldInit]) -> TransformResult<Vec<Node<PyStmt>>> {
    let mut out = Vec::new();
    for (loc, key, annotation, init) in field_inits {
      let value = self.expr(init)?;
      let annotation = match annotation {
        Some(t) => Some(self.type_hint(t)),
        None => None,
      };
      out.push(
        Node::new(*loc, PyAssign {
          target: attribute(*loc, name_expr(*loc, "self"), key.clone()),
          annotation,
          value: Some(value),
        })
        .into_wrapped(),
      );
    }
    Ok(out)
  }

  fn function_def(
    &mut self,
    loc: Loc,
    name: String,
    func: &Node<Func>,
    is_method: bool,
    field_inits: &[FieldInit],
  ) -> TransformResult<Node<PyStmt>> {
    let returns = match &func.stx.return_type {
      Some(t) => Some(self.type_hint(t)),
      None => None,
    };
    // Hints and defaults resolve in the enclosing scope, as in Python.
    let mut declared = Vec::new();
    for param in &func.stx.parameters {
      let annotation = match &param.stx.type_annotation {
        Some(t) => Some(self.type_hint(t)),
        None => None,
      };
      let default = match &param.stx.default_value {
        Some(d) => Some(self.expr(d)?),
        None => None,
      };
      declared.push((param.stx.name.clone(), annotation, default));
    }
    let prev_in_class = self.in_class;
    let prev_receiver = self.this_receiver_used;
    self.in_class = is_method;
    self.this_receiver_used = false;
    self.function_depth += 1;
    self.scopes.push(true);
    let mut parameters = Vec::new();
    for (param_name, annotation, default) in declared {
      let py_name = self.scopes.declare(&param_name, BindingKind::Param);
      parameters.push(PyParam {
        name: py_name,
        annotation,
        default,
      });
    }
    let result = self.function_body(func, field_inits);
    self.scopes.pop();
    self.function_depth -= 1;
    // A free function calling `this.box`/`this.unbox` is bound to the host
    // receiver through an explicit leading parameter.
    let takes_receiver = is_method || self.this_receiver_used;
    self.in_class = prev_in_class;
    self.this_receiver_used = prev_receiver;
    let body = result?;
    if takes_receiver {
      parameters.insert(0, PyParam {
        name: "self".to_string(),
        annotation: None,
        default: None,
      });
    }
    Ok(
      Node::new(loc, PyFunctionDef {
        name,
        parameters,
        returns,
        body,
      })
      .into_wrapped(),
    )
  }

  fn function_body(
    &mut self,
    func: &Node<Func>,
    field_inits: &[FieldInit],
  ) -> TransformResult<Vec<Node<PyStmt>>> {
    let mut body = self.field_init_stmts(field_inits)?;
    match &func.stx.body {
      FuncBody::Block(stmts) => body.extend(self.block_body(stmts)?),
      FuncBody::Expression(expr) => {
        let value = self.expr(expr)?;
        body.push(
          Node::new(expr.loc, PyReturn { value: Some(value) }).into_wrapped(),
        );
      }
    };
    Ok(body)
  }

  fn expr_statement(&mut self, expr: &Node<Expr>) -> TransformResult<Vec<Node<PyStmt>>> {
    let loc = expr.loc;
    match expr.stx.as_ref() {
      Expr::Binary(b) if b.stx.operator.is_assignment() => {
        let value = self.expr(&b.stx.right)?;
        let target = self.assign_target(&b.stx.left)?;
        if b.stx.operator == OperatorName::Assignment {
          return Ok(vec![
            Node::new(loc, PyAssign {
              target,
              annotation: None,
              value: Some(value),
            })
            .into_wrapped(),
          ]);
        }
        let op = match b.stx.operator {
          OperatorName::AssignmentAddition => PyOp::Add,
          OperatorName::AssignmentDivision => PyOp::Div,
          OperatorName::AssignmentMultiplication => PyOp::Mult,
          OperatorName::AssignmentRemainder => PyOp::Mod,
          OperatorName::AssignmentSubtraction => PyOp::Sub,
          _ => {
            return Err(TransformError::new(
              TransformErrorType::UnsupportedConstruct("this assignment operator"),
              loc,
            ))
          }
        };
        Ok(vec![
          Node::new(loc, PyAugAssign { target, op, value }).into_wrapped(),
        ])
      }
      Expr::Unary(u)
        if matches!(
          u.stx.operator,
          OperatorName::PrefixDecrement | OperatorName::PrefixIncrement
        ) =>
      {
        self.increment_stmt(loc, &u.stx.argument, u.stx.operator == OperatorName::PrefixIncrement)
      }
      Expr::UnaryPostfix(u) => self.increment_stmt(
        loc,
        &u.stx.argument,
        u.stx.operator == OperatorName::PostfixIncrement,
      ),
      Expr::Call(call) if is_method_call(call, "forEach") => self.for_each(loc, call),
      _ => {
        let expr = self.expr(expr)?;
        Ok(vec![Node::new(loc, PyExprStmt { expr }).into_wrapped()])
      }
    }
  }

  fn increment_stmt(
    &mut self,
    loc: Loc,
    argument: &Node<Expr>,
    increment: bool,
  ) -> TransformResult<Vec<Node<PyStmt>>> {
    let target = self.assign_target(argument)?;
    let op = if increment { PyOp::Add } else { PyOp::Sub };
    Ok(vec![
      Node::new(loc, PyAugAssign {
        target,
        op,
        value: constant(loc, PyConstant::Int("1".to_string())),
      })
      .into_wrapped(),
    ])
  }

  fn assign_target(&mut self, target: &Node<Expr>) -> TransformResult<Node<PyExpr>> {
    let loc = target.loc;
    match target.stx.as_ref() {
      Expr::Id(id) => {
        let py_name = self.ident_usage(loc, &id.stx.name)?;
        Ok(name_expr(loc, py_name))
      }
      Expr::Member(m) => {
        if let Expr::This(_) = m.stx.left.stx.as_ref() {
          return self.this_attribute(loc, &m.stx.right);
        }
        let value = self.expr(&m.stx.left)?;
        Ok(attribute(loc, value, m.stx.right.clone()))
      }
      Expr::ComputedMember(cm) => {
        let value = self.expr(&cm.stx.object)?;
        let index = self.expr(&cm.stx.member)?;
        Ok(Node::new(loc, PySubscript { value, index }).into_wrapped())
      }
      _ => Err(TransformError::new(
        TransformErrorType::UnsupportedConstruct("assignment target"),
        loc,
      )),
    }
  }

  fn for_each(&mut self, loc: Loc, call: &Node<CallExpr>) -> TransformResult<Vec<Node<PyStmt>>> {
    let Expr::Member(member) = call.stx.callee.stx.as_ref() else {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedCallback("forEach"),
        loc,
      ));
    };
    let [callback] = call.stx.arguments.as_slice() else {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedCallback("forEach"),
        loc,
      ));
    };
    let Expr::ArrowFunc(arrow) = callback.stx.as_ref() else {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedCallback("forEach"),
        callback.loc,
      ));
    };
    let func = &arrow.stx.func;
    let [param] = func.stx.parameters.as_slice() else {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedCallback("forEach"),
        callback.loc,
      ));
    };
    let iter = self.expr(&member.stx.left)?;
    self.in_scope(false, |t| {
      let target = t.scopes.declare(&param.stx.name, BindingKind::Param);
      let body = match &func.stx.body {
        FuncBody::Block(stmts) => t.block_body(stmts)?,
        FuncBody::Expression(expr) => {
          let expr = t.expr(expr)?;
          vec![Node::new(expr.loc, PyExprStmt { expr }).into_wrapped()]
        }
      };
      Ok(vec![
        Node::new(loc, PyFor { target, iter, body }).into_wrapped(),
      ])
    })
  }

  fn exprs(&mut self, nodes: &[Node<Expr>]) -> TransformResult<Vec<Node<PyExpr>>> {
    nodes.iter().map(|n| self.expr(n)).collect()
  }

  fn expr(&mut self, node: &Node<Expr>) -> TransformResult<Node<PyExpr>> {
    let loc = node.loc;
    match node.stx.as_ref() {
      Expr::ArrowFunc(_) => Err(TransformError::new(
        TransformErrorType::UnsupportedConstruct(
          "arrow functions outside declarations and array callbacks",
        ),
        loc,
      )),
      Expr::Binary(b) => self.binary(loc, b),
      Expr::Call(call) => self.call(call),
      Expr::ComputedMember(cm) => {
        let value = self.expr(&cm.stx.object)?;
        let index = self.expr(&cm.stx.member)?;
        Ok(Node::new(loc, PySubscript { value, index }).into_wrapped())
      }
      Expr::Cond(c) => {
        let test = self.expr(&c.stx.test)?;
        let body = self.expr(&c.stx.consequent)?;
        let orelse = self.expr(&c.stx.alternate)?;
        Ok(Node::new(loc, PyIfExp { test, body, orelse }).into_wrapped())
      }
      Expr::Id(id) => {
        let py_name = self.ident_usage(loc, &id.stx.name)?;
        Ok(name_expr(loc, py_name))
      }
      Expr::Member(m) => self.member(m),
      Expr::This(_) => {
        if self.in_class {
          Ok(name_expr(loc, "self"))
        } else {
          Err(TransformError::new(TransformErrorType::ThisOutsideClass, loc))
        }
      }
      Expr::Unary(u) => self.unary(loc, u),
      Expr::UnaryPostfix(_) => Err(TransformError::new(
        TransformErrorType::UnsupportedConstruct("increment and decrement in expression position"),
        loc,
      )),
      Expr::LitArr(a) => {
        let elements = self.exprs(&a.stx.elements)?;
        Ok(Node::new(loc, PyList { elements }).into_wrapped())
      }
      Expr::LitBool(b) => Ok(constant(loc, PyConstant::Bool(b.stx.value))),
      Expr::LitNull(_) | Expr::LitUndefined(_) => Ok(constant(loc, PyConstant::None)),
      Expr::LitNum(n) => Ok(number_constant(loc, &n.stx.raw)),
      Expr::LitObj(o) => {
        let mut entries = Vec::new();
        for member in &o.stx.members {
          match member.stx.as_ref() {
            ObjMember::Valued { key, value } => {
              let value = self.expr(value)?;
              entries.push((constant(key.loc, PyConstant::Str(key.stx.key.clone())), value));
            }
            ObjMember::Shorthand { name } => {
              let py_name = self.ident_usage(member.loc, name)?;
              entries.push((
                constant(member.loc, PyConstant::Str(name.clone())),
                name_expr(member.loc, py_name),
              ));
            }
          };
        }
        Ok(Node::new(loc, PyDict { entries }).into_wrapped())
      }
      Expr::LitStr(s) => Ok(constant(loc, PyConstant::Str(s.stx.value.clone()))),
      Expr::LitTemplate(t) => self.template(loc, &t.stx.parts),
    }
  }

  fn template(&mut self, loc: Loc, parts: &[LitTemplatePart]) -> TransformResult<Node<PyExpr>> {
    if parts.iter().all(|p| matches!(p, LitTemplatePart::Str(_))) {
      let mut text = String::new();
      for part in parts {
        if let LitTemplatePart::Str(s) = part {
          text.push_str(s);
        }
      }
      return Ok(constant(loc, PyConstant::Str(text)));
    }
    let mut out = Vec::new();
    for part in parts {
      match part {
        LitTemplatePart::Str(s) => {
          if !s.is_empty() {
            out.push(PyFStringPart::Str(s.clone()));
          }
        }
        LitTemplatePart::Expr(e) => out.push(PyFStringPart::Expr(self.expr(e)?)),
      };
    }
    Ok(Node::new(loc, PyFString { parts: out }).into_wrapped())
  }

  fn binary(&mut self, loc: Loc, node: &Node<BinaryExpr>) -> TransformResult<Node<PyExpr>> {
    let b = &node.stx;
    if b.operator.is_assignment() {
      return Err(TransformError::new(
        TransformErrorType::AssignmentInExpressionPosition,
        loc,
      ));
    }
    match b.operator {
      OperatorName::Addition
      | OperatorName::Division
      | OperatorName::Exponentiation
      | OperatorName::Multiplication
      | OperatorName::Remainder
      | OperatorName::Subtraction => {
        let op = match b.operator {
          OperatorName::Addition => PyOp::Add,
          OperatorName::Division => PyOp::Div,
          OperatorName::Exponentiation => PyOp::Pow,
          OperatorName::Multiplication => PyOp::Mult,
          OperatorName::Remainder => PyOp::Mod,
          _ => PyOp::Sub,
        };
        let left = self.expr(&b.left)?;
        let right = self.expr(&b.right)?;
        Ok(Node::new(loc, PyBinOp { op, left, right }).into_wrapped())
      }
      OperatorName::GreaterThan
      | OperatorName::GreaterThanOrEqual
      | OperatorName::LessThan
      | OperatorName::LessThanOrEqual => {
        let op = match b.operator {
          OperatorName::GreaterThan => PyCmpOp::Gt,
          OperatorName::GreaterThanOrEqual => PyCmpOp::GtE,
          OperatorName::LessThan => PyCmpOp::Lt,
          _ => PyCmpOp::LtE,
        };
        let left = self.expr(&b.left)?;
        let right = self.expr(&b.right)?;
        Ok(Node::new(loc, PyCompare { op, left, right }).into_wrapped())
      }
      OperatorName::Equality | OperatorName::StrictEquality => {
        self.equality(loc, &b.left, &b.right, false)
      }
      OperatorName::Inequality | OperatorName::StrictInequality => {
        self.equality(loc, &b.left, &b.right, true)
      }
      OperatorName::LogicalAnd | OperatorName::LogicalOr => {
        let op = if b.operator == OperatorName::LogicalAnd {
          PyBoolOpKind::And
        } else {
          PyBoolOpKind::Or
        };
        let left = self.expr(&b.left)?;
        let right = self.expr(&b.right)?;
        Ok(Node::new(loc, PyBoolOp { op, left, right }).into_wrapped())
      }
      OperatorName::NullishCoalescing => self.nullish(loc, &b.left, &b.right),
      OperatorName::In => {
        let left = self.expr(&b.left)?;
        let right = self.expr(&b.right)?;
        Ok(
          Node::new(loc, PyCompare {
            op: PyCmpOp::In,
            left,
            right,
          })
          .into_wrapped(),
        )
      }
      OperatorName::Instanceof => {
        let left = self.expr(&b.left)?;
        let right = self.expr(&b.right)?;
        Ok(builtin_call(loc, "isinstance", vec![left, right]))
      }
      _ => Err(TransformError::new(
        TransformErrorType::UnsupportedConstruct("this binary operator"),
        loc,
      )),
    }
  }

  // `x === null` and `x === undefined` become identity checks against None;
  // everything else is a value comparison.
  fn equality(
    &mut self,
    loc: Loc,
    left: &Node<Expr>,
    right: &Node<Expr>,
    negated: bool,
  ) -> TransformResult<Node<PyExpr>> {
    let value = if is_none_literal(right) {
      self.expr(left)?
    } else if is_none_literal(left) {
      self.expr(right)?
    } else {
      let l = self.expr(left)?;
      let r = self.expr(right)?;
      let op = if negated { PyCmpOp::NotEq } else { PyCmpOp::Eq };
      return Ok(Node::new(loc, PyCompare { op, left: l, right: r }).into_wrapped());
    };
    let op = if negated { PyCmpOp::IsNot } else { PyCmpOp::Is };
    Ok(
      Node::new(loc, PyCompare {
        op,
        left: value,
        right: constant(loc, PyConstant::None),
      })
      .into_wrapped(),
    )
  }

  /// `a ?? b` becomes `a if a is not None else b`, which evaluates `a` twice;
  /// only operands that are trivially re-evaluable are allowed.
  fn nullish(
    &mut self,
    loc: Loc,
    left: &Node<Expr>,
    right: &Node<Expr>,
  ) -> TransformResult<Node<PyExpr>> {
    let left = self.expr(left)?;
    if !matches!(
      left.stx.as_ref(),
      PyExpr::Attribute(_) | PyExpr::Constant(_) | PyExpr::Name(_)
    ) {
      return Err(TransformError::new(
        TransformErrorType::UnsupportedConstruct("`??` with a side-effecting left operand"),
        loc,
      ));
    }
    let right = self.expr(right)?;
    let test = Node::new(loc, PyCompare {
      op: PyCmpOp::IsNot,
      left: left.clone(),
      right: constant(loc, PyConstant::None),
    })
    .into_wrapped();
    Ok(
      Node::new(loc, PyIfExp {
        test,
        body: left,
        orelse: right,
      })
      .into_wrapped(),
    )
  }

  fn unary(
    &mut self,
    loc: Loc,
    node: &Node<UnaryExpr>,
  ) -> TransformResult<Node<PyExpr>> {
    let u = &node.stx;
    let op = match u.operator {
      OperatorName::LogicalNot => PyUnaryOpKind::Not,
      OperatorName::UnaryNegation => PyUnaryOpKind::USub,
      OperatorName::UnaryPlus => PyUnaryOpKind::UAdd,
      OperatorName::New => return self.new_expr(loc, &u.argument),
      OperatorName::Typeof => {
        return Err(TransformError::new(
          TransformErrorType::UnsupportedConstruct("the typeof operator"),
          loc,
        ))
      }
      OperatorName::PrefixDecrement | OperatorName::PrefixIncrement => {
        return Err(TransformError::new(
          TransformErrorType::UnsupportedConstruct(
            "increment and decrement in expression position",
          ),
          loc,
        ))
      }
      _ => {
        return Err(TransformError::new(
          TransformErrorType::UnsupportedConstruct("this unary operator"),
          loc,
        ))
      }
    };
    let operand = self.expr(&u.argument)?;
    Ok(Node::new(loc, PyUnaryOp { op, operand }).into_wrapped())
  }

  // Python constructors are plain calls, so `new` just drops.
  fn new_expr(&mut self, loc: Loc, argument: &Node<Expr>) -> TransformResult<Node<PyExpr>> {
    match argument.stx.as_ref() {
      Expr::Call(call) => self.call(call),
      Expr::Id(id) => {
        let py_name = self.ident_usage(argument.loc, &id.stx.name)?;
        Ok(call_of(loc, name_expr(argument.loc, py_name), Vec::new()))
      }
      _ => Err(TransformError::new(
        TransformErrorType::UnsupportedConstruct("`new` with a non-constructor expression"),
        loc,
      )),
    }
  }

  fn member(&mut self, node: &Node<MemberExpr>) -> TransformResult<Node<PyExpr>> {
    let loc = node.loc;
    let m = &node.stx;
    if let Expr::This(_) = m.left.stx.as_ref() {
      return self.this_attribute(loc, &m.right);
    }
    if let Expr::Id(id) = m.left.stx.as_ref() {
      let namespace = &id.stx.name;
      if matches!(self.scopes.lookup(namespace), Lookup::Missing) {
        return match (namespace.as_str(), m.right.as_str()) {
          ("Math", "PI") => {
            self.imports.insert("math");
            Ok(attribute(loc, name_expr(id.loc, "math"), "pi"))
          }
          ("Math" | "JSON" | "console", other) => Err(TransformError::new(
            TransformErrorType::UnsupportedCall(format!("{}.{}", namespace, other)),
            loc,
          )),
          _ => Err(TransformError::new(
            TransformErrorType::UnboundIdentifier(namespace.clone()),
            id.loc,
          )),
        };
      }
    }
    if m.right == "length" {
      let receiver = self.expr(&m.left)?;
      return Ok(builtin_call(loc, "len", vec![receiver]));
    }
    let value = self.expr(&m.left)?;
    Ok(attribute(loc, value, m.right.clone()))
  }

  fn this_attribute(&mut self, loc: Loc, attr: &str) -> TransformResult<Node<PyExpr>> {
    let host_interop = matches!(attr, "box" | "unbox");
    if self.in_class || (host_interop && self.function_depth > 0) {
      if !self.in_class {
        self.this_receiver_used = true;
      }
      Ok(attribute(loc, name_expr(loc, "self"), attr.to_string()))
    } else {
      Err(TransformError::new(TransformErrorType::ThisOutsideClass, loc))
    }
  }

  fn call(&mut self, node: &Node<CallExpr>) -> TransformResult<Node<PyExpr>> {
    let loc = node.loc;
    let call = &node.stx;
    match call.callee.stx.as_ref() {
      Expr::Member(m) => {
        if let Expr::Id(id) = m.stx.left.stx.as_ref() {
          // An unbound receiver name is one of the global namespaces, not a
          // local value.
          if matches!(self.scopes.lookup(&id.stx.name), Lookup::Missing) {
            return self.namespace_call(loc, id.loc, &id.stx.name, &m.stx.right, &call.arguments);
          }
        }
        self.method_call(loc, m, &call.arguments)
      }
      Expr::Id(id) => match self.scopes.lookup(&id.stx.name) {
        Lookup::Ok(binding) => {
          let func = binding.py_name.clone();
          let args = self.exprs(&call.arguments)?;
          Ok(call_of(loc, name_expr(id.loc, func), args))
        }
        Lookup::Missing => {
          let builtin = match id.stx.name.as_str() {
            "parseInt" => "int",
            "parseFloat" => "float",
            _ => {
              return Err(TransformError::new(
                TransformErrorType::UnboundIdentifier(id.stx.name.clone()),
                id.loc,
              ))
            }
          };
          let args = self.exprs(&call.arguments)?;
          Ok(builtin_call(loc, builtin, args))
        }
        Lookup::Captured => Err(TransformError::new(
          TransformErrorType::UnboundIdentifier(id.stx.name.clone()),
          id.loc,
        )),
      },
      _ => {
        let func = self.expr(&call.callee)?;
        let args = self.exprs(&call.arguments)?;
        Ok(call_of(loc, func, args))
      }
    }
  }

  fn namespace_call(
    &mut self,
    loc: Loc,
    ns_loc: Loc,
    namespace: &str,
    method: &str,
    arguments: &[Node<Expr>],
  ) -> TransformResult<Node<PyExpr>> {
    let unsupported = || {
      TransformError::new(
        TransformErrorType::UnsupportedCall(format!("{}.{}", namespace, method)),
        loc,
      )
    };
    match (namespace, method) {
      ("console", "error" | "log" | "warn") => {
        let args = self.exprs(arguments)?;
        Ok(builtin_call(loc, "print", args))
      }
      ("Math", "floor") => {
        if arguments.len() != 1 {
          return Err(unsupported());
        }
        let args = self.exprs(arguments)?;
        Ok(builtin_call(loc, "int", args))
      }
      ("Math", "abs" | "max" | "min" | "round") => {
        let args = self.exprs(arguments)?;
        Ok(builtin_call(loc, method, args))
      }
      ("Math", "ceil" | "sqrt") => {
        if arguments.len() != 1 {
          return Err(unsupported());
        }
        self.imports.insert("math");
        let args = self.exprs(arguments)?;
        Ok(call_of(
          loc,
          attribute(loc, name_expr(loc, "math"), method.to_string()),
          args,
        ))
      }
      ("Math", "random") => {
        if !arguments.is_empty() {
          return Err(unsupported());
        }
        self.imports.insert("random");
        Ok(call_of(
          loc,
          attribute(loc, name_expr(loc, "random"), "random"),
          Vec::new(),
        ))
      }
      ("Math", "pow") => {
        if arguments.len() != 2 {
          return Err(unsupported());
        }
        let left = self.expr(&arguments[0])?;
        let right = self.expr(&arguments[1])?;
        Ok(
          Node::new(loc, PyBinOp {
            op: PyOp::Pow,
            left,
            right,
          })
          .into_wrapped(),
        )
      }
      ("JSON", "parse" | "stringify") => {
        self.imports.insert("json");
        let py_method = if method == "parse" { "loads" } else { "dumps" };
        let args = self.exprs(arguments)?;
        Ok(call_of(
          loc,
          attribute(loc, name_expr(loc, "json"), py_method),
          args,
        ))
      }
      ("Math" | "JSON" | "console", _) => Err(unsupported()),
      _ => Err(TransformError::new(
        TransformErrorType::UnboundIdentifier(namespace.to_string()),
        ns_loc,
      )),
    }
  }

  fn method_call(
    &mut self,
    loc: Loc,
    member: &Node<MemberExpr>,
    arguments: &[Node<Expr>],
  ) -> TransformResult<Node<PyExpr>> {
    let method = member.stx.right.as_str();
    let arity_error = || {
      TransformError::new(
        TransformErrorType::UnsupportedCall(format!(".{}", method)),
        loc,
      )
    };
    match method {
      "map" => self.map_call(loc, &member.stx.left, arguments),
      "filter" => self.filter_call(loc, &member.stx.left, arguments),
      "find" => self.find_call(loc, &member.stx.left, arguments),
      "reduce" => Err(TransformError::new(
        TransformErrorType::UnsupportedChain(
          "`.reduce` is only supported as a variable initializer".to_string(),
        ),
        loc,
      )),
      "forEach" => Err(TransformError::new(
        TransformErrorType::UnsupportedChain(
          "`.forEach` is only supported in statement position".to_string(),
        ),
        loc,
      )),
      "includes" => {
        if arguments.len() != 1 {
          return Err(arity_error());
        }
        let item = self.expr(&arguments[0])?;
        let receiver = self.expr(&member.stx.left)?;
        Ok(
          Node::new(loc, PyCompare {
            op: PyCmpOp::In,
            left: item,
            right: receiver,
          })
          .into_wrapped(),
        )
      }
      // `arr.join(sep)` flips to `sep.join(arr)`.
      "join" => {
        if arguments.len() != 1 {
          return Err(arity_error());
        }
        let separator = self.expr(&arguments[0])?;
        let receiver = self.expr(&member.stx.left)?;
        Ok(call_of(
          loc,
          attribute(loc, separator, "join"),
          vec![receiver],
        ))
      }
      "slice" | "substring" => {
        if arguments.len() > 2 {
          return Err(arity_error());
        }
        let receiver = self.expr(&member.stx.left)?;
        let lower = match arguments.first() {
          Some(a) => Some(self.expr(a)?),
          None => None,
        };
        let upper = match arguments.get(1) {
          Some(a) => Some(self.expr(a)?),
          None => None,
        };
        let index = Node::new(loc, PySliceRange { lower, upper }).into_wrapped();
        Ok(
          Node::new(loc, PySubscript {
            value: receiver,
            index,
          })
          .into_wrapped(),
        )
      }
      "shift" => {
        if !arguments.is_empty() {
          return Err(arity_error());
        }
        let receiver = self.expr(&member.stx.left)?;
        Ok(call_of(
          loc,
          attribute(loc, receiver, "pop"),
          vec![constant(loc, PyConstant::Int("0".to_string()))],
        ))
      }
      "toString" => {
        if !arguments.is_empty() {
          return Err(arity_error());
        }
        let receiver = self.expr(&member.stx.left)?;
        Ok(builtin_call(loc, "str", vec![receiver]))
      }
      _ => {
        if let Some(py_method) = simple_method_rename(method) {
          let receiver = self.expr(&member.stx.left)?;
          let args = self.exprs(arguments)?;
          Ok(call_of(loc, attribute(loc, receiver, py_method), args))
        } else if UNMAPPABLE_METHODS.contains(method) {
          Err(TransformError::new(
            TransformErrorType::UnsupportedCall(format!(".{}", method)),
            loc,
          ))
        } else {
          // A method on a user-defined object, including the box/unbox host
          // convention via `this`.
          let func = if matches!(member.stx.left.stx.as_ref(), Expr::This(_)) {
            self.this_attribute(member.loc, method)?
          } else {
            let receiver = self.expr(&member.stx.left)?;
            attribute(member.loc, receiver, method.to_string())
          };
          let args = self.exprs(arguments)?;
          Ok(call_of(loc, func, args))
        }
      }
    }
  }

  fn map_call(
    &mut self,
    loc: Loc,
    receiver: &Node<Expr>,
    arguments: &[Node<Expr>],
  ) -> TransformResult<Node<PyExpr>> {
    let (param, body) = expression_callback(loc, arguments, "map")?;
    // `.filter(f).map(g)` fuses into a single comprehension with both the
    // condition and the element expression bound to one target.
    if let Expr::Call(inner) = receiver.stx.as_ref() {
      if let Expr::Member(m) = inner.stx.callee.stx.as_ref() {
        if m.stx.right == "filter" {
          let (filter_param, filter_body) =
            expression_callback(inner.loc, &inner.stx.arguments, "filter")?;
          let target = safe_name(param);
          // Fusing rebinds the filter predicate to the map parameter's name;
          // if that name already occurs free in the predicate, the rebind
          // would shadow it, so such chains stay as nested comprehensions.
          if safe_name(filter_param) == target || !mentions_python_name(filter_body, &target) {
            let iter = self.expr(&m.stx.left)?;
            let bound = target.clone();
            let condition = self.in_scope(false, move |t| {
              t.scopes.declare_as(filter_param, bound, BindingKind::Param);
              t.expr(filter_body)
            })?;
            let bound = target.clone();
            let element = self.in_scope(false, move |t| {
              t.scopes.declare_as(param, bound, BindingKind::Param);
              t.expr(body)
            })?;
            return Ok(
              Node::new(loc, PyListComp {
                element,
                target,
                iter,
                condition: Some(condition),
              })
              .into_wrapped(),
            );
          }
        }
      }
    }
    let iter = self.expr(receiver)?;
    let target = safe_name(param);
    let bound = target.clone();
    let element = self.in_scope(false, move |t| {
      t.scopes.declare_as(param, bound, BindingKind::Param);
      t.expr(body)
    })?;
    Ok(
      Node::new(loc, PyListComp {
        element,
        target,
        iter,
        condition: None,
      })
      .into_wrapped(),
    )
  }

  fn filter_call(
    &mut self,
    loc: Loc,
    receiver: &Node<Expr>,
    arguments: &[Node<Expr>],
  ) -> TransformResult<Node<PyExpr>> {
    let (param, body) = expression_callback(loc, arguments, "filter")?;
    let iter = self.expr(receiver)?;
    let target = safe_name(param);
    let bound = target.clone();
    let condition = self.in_scope(false, move |t| {
      t.scopes.declare_as(param, bound, BindingKind::Param);
      t.expr(body)
    })?;
    Ok(
      Node::new(loc, PyListComp {
        element: name_expr(loc, target.clone()),
        target,
        iter,
        condition: Some(condition),
      })
      .into_wrapped(),
    )
  }

  // `seq.find(f)` becomes `next(iter([x for x in seq if f(x)]), None)`:
  // absent-safe, like `find` returning undefined.
  fn find_call(
    &mut self,
    loc: Loc,
    receiver: &Node<Expr>,
    arguments: &[Node<Expr>],
  ) -> TransformResult<Node<PyExpr>> {
    let filtered = self.filter_call(loc, receiver, arguments)?;
    let iterator = builtin_call(loc, "iter", vec![filtered]);
    Ok(builtin_call(
      loc,
      "next",
      vec![iterator, constant(loc, PyConstant::None)],
    ))
  }

  fn ident_usage(&mut self, loc: Loc, name: &str) -> TransformResult<String> {
    match self.scopes.lookup(name) {
      Lookup::Ok(binding) => Ok(binding.py_name.clone()),
      Lookup::Captured | Lookup::Missing => Err(TransformError::new(
        TransformErrorType::UnboundIdentifier(name.to_string()),
        loc,
      )),
    }
  }

  fn type_hint(&mut self, node: &Node<TypeExpr>) -> Node<PyExpr> {
    let loc = node.loc;
    match node.stx.as_ref() {
      TypeExpr::Named(n) => match n.stx.name.as_str() {
        "string" => name_expr(loc, "str"),
        "number" => name_expr(loc, "float"),
        "boolean" => name_expr(loc, "bool"),
        "null" | "undefined" | "void" => name_expr(loc, "None"),
        "any" => self.any_hint(loc),
        other => {
          let class_name = match self.scopes.lookup(other) {
            Lookup::Ok(binding) if binding.kind == BindingKind::Class => {
              Some(binding.py_name.clone())
            }
            _ => None,
          };
          match class_name {
            Some(py_name) => name_expr(loc, py_name),
            None => self.degraded_hint(loc, other),
          }
        }
      },
      TypeExpr::Array(a) => {
        let element = self.type_hint(&a.stx.element);
        Node::new(loc, PySubscript {
          value: name_expr(loc, "list"),
          index: element,
        })
        .into_wrapped()
      }
      TypeExpr::Generic(g) => match (g.stx.name.as_str(), g.stx.arguments.as_slice()) {
        ("Array", [element]) => {
          let element = self.type_hint(element);
          Node::new(loc, PySubscript {
            value: name_expr(loc, "list"),
            index: element,
          })
          .into_wrapped()
        }
        ("Record", [key, value]) => {
          let key = self.type_hint(key);
          let value = self.type_hint(value);
          let index = Node::new(loc, PyTuple {
            elements: vec![key, value],
          })
          .into_wrapped();
          Node::new(loc, PySubscript {
            value: name_expr(loc, "dict"),
            index,
          })
          .into_wrapped()
        }
        _ => self.degraded_hint(loc, &g.stx.name),
      },
    }
  }

  fn any_hint(&mut self, loc: Loc) -> Node<PyExpr> {
    self.typing_any = true;
    name_expr(loc, "Any")
  }

  // Hints never change runtime behavior, so degradation is a warning rather
  // than an error.
  fn degraded_hint(&mut self, loc: Loc, name: &str) -> Node<PyExpr> {
    self.warnings.push(TransformWarning {
      message: format!("type `{}` has no Python equivalent; degraded to Any", name),
      loc,
    });
    self.any_hint(loc)
  }
}

fn expression_callback<'a>(
  loc: Loc,
  arguments: &'a [Node<Expr>],
  method: &'static str,
) -> TransformResult<(&'a str, &'a Node<Expr>)> {
  let [callback] = arguments else {
    return Err(TransformError::new(
      TransformErrorType::UnsupportedCallback(method),
      loc,
    ));
  };
  let Expr::ArrowFunc(arrow) = callback.stx.as_ref() else {
    return Err(TransformError::new(
      TransformErrorType::UnsupportedCallback(method),
      callback.loc,
    ));
  };
  let func = &arrow.stx.func;
  let [param] = func.stx.parameters.as_slice() else {
    return Err(TransformError::new(
      TransformErrorType::UnsupportedCallback(method),
      callback.loc,
    ));
  };
  match &func.stx.body {
    FuncBody::Expression(body) => Ok((param.stx.name.as_str(), body)),
    FuncBody::Block(_) => Err(TransformError::new(
      TransformErrorType::UnsupportedChain(format!("`.{}` with a block-bodied callback", method)),
      callback.loc,
    )),
  }
}

fn is_method_call(call: &Node<CallExpr>, method: &str) -> bool {
  matches!(call.stx.callee.stx.as_ref(), Expr::Member(m) if m.stx.right == method)
}

fn is_none_literal(expr: &Node<Expr>) -> bool {
  matches!(
    expr.stx.as_ref(),
    Expr::LitNull(_) | Expr::LitUndefined(_)
  )
}

fn is_increment_of(update: &Node<Expr>, var: &str) -> bool {
  let (operator, argument) = match update.stx.as_ref() {
    Expr::Unary(u) => (u.stx.operator, &u.stx.argument),
    Expr::UnaryPostfix(u) => (u.stx.operator, &u.stx.argument),
    _ => return false,
  };
  matches!(
    operator,
    OperatorName::PostfixIncrement | OperatorName::PrefixIncrement
  ) && matches!(argument.stx.as_ref(), Expr::Id(id) if id.stx.name == var)
}

fn contains_shallow_continue(body: &[Node<Stmt>]) -> bool {
  body.iter().any(|stmt| match stmt.stx.as_ref() {
    Stmt::Continue(_) => true,
    Stmt::Block(b) => contains_shallow_continue(&b.stx.body),
    Stmt::If(i) => {
      contains_shallow_continue(&i.stx.consequent)
        || i
          .stx
          .alternate
          .as_ref()
          .map_or(false, |a| contains_shallow_continue(a))
    }
    _ => false,
  })
}

/// True if any identifier in the expression would resolve to `py_name` after
/// keyword renaming. Binding forms inside the expression are not tracked, so
/// a shadowed occurrence still counts; callers only use this to stay safe.
fn mentions_python_name(node: &Node<Expr>, py_name: &str) -> bool {
  let sub = |e: &Node<Expr>| mentions_python_name(e, py_name);
  match node.stx.as_ref() {
    Expr::Id(id) => safe_name(&id.stx.name) == py_name,
    Expr::ArrowFunc(a) => match &a.stx.func.stx.body {
      FuncBody::Expression(body) => sub(body),
      FuncBody::Block(_) => true,
    },
    Expr::Binary(b) => sub(&b.stx.left) || sub(&b.stx.right),
    Expr::Call(c) => sub(&c.stx.callee) || c.stx.arguments.iter().any(sub),
    Expr::ComputedMember(c) => sub(&c.stx.object) || sub(&c.stx.member),
    Expr::Cond(c) => sub(&c.stx.test) || sub(&c.stx.consequent) || sub(&c.stx.alternate),
    Expr::Member(m) => sub(&m.stx.left),
    Expr::Unary(u) => sub(&u.stx.argument),
    Expr::UnaryPostfix(u) => sub(&u.stx.argument),
    Expr::LitArr(a) => a.stx.elements.iter().any(sub),
    Expr::LitObj(o) => o.stx.members.iter().any(|m| match m.stx.as_ref() {
      ObjMember::Valued { value, .. } => sub(value),
      ObjMember::Shorthand { name } => safe_name(name) == py_name,
    }),
    Expr::LitTemplate(t) => t.stx.parts.iter().any(|p| match p {
      LitTemplatePart::Expr(e) => sub(e),
      LitTemplatePart::Str(_) => false,
    }),
    Expr::This(_)
    | Expr::LitBool(_)
    | Expr::LitNull(_)
    | Expr::LitNum(_)
    | Expr::LitStr(_)
    | Expr::LitUndefined(_) => false,
  }
}

fn expr_writes_to(expr: &Node<Expr>, var: &str) -> bool {
  let (operator, target) = match expr.stx.as_ref() {
    Expr::Binary(b) => (b.stx.operator, &b.stx.left),
    Expr::Unary(u) => (u.stx.operator, &u.stx.argument),
    Expr::UnaryPostfix(u) => (u.stx.operator, &u.stx.argument),
    _ => return false,
  };
  let writes = operator.is_assignment()
    || matches!(
      operator,
      OperatorName::PostfixDecrement
        | OperatorName::PostfixIncrement
        | OperatorName::PrefixDecrement
        | OperatorName::PrefixIncrement
    );
  writes && matches!(target.stx.as_ref(), Expr::Id(id) if id.stx.name == var)
}

/// True if a statement in the body assigns, increments, decrements or
/// redeclares `var`. Assignments only occur in statement position in the
/// supported subset, so only statement expressions are inspected.
fn body_writes_to(body: &[Node<Stmt>], var: &str) -> bool {
  body.iter().any(|stmt| match stmt.stx.as_ref() {
    Stmt::Block(b) => body_writes_to(&b.stx.body, var),
    Stmt::Expr(e) => expr_writes_to(&e.stx.expr, var),
    Stmt::ForOf(f) => f.stx.variable.stx.name == var || body_writes_to(&f.stx.body, var),
    Stmt::ForTriple(f) => {
      let init = match &f.stx.init {
        ForInit::None => false,
        ForInit::Expr(e) => expr_writes_to(e, var),
        ForInit::VarDecl(d) => d.stx.declarators.iter().any(|dec| dec.name.stx.name == var),
      };
      init
        || f.stx.update.as_ref().map_or(false, |u| expr_writes_to(u, var))
        || body_writes_to(&f.stx.body, var)
    }
    Stmt::If(i) => {
      body_writes_to(&i.stx.consequent, var)
        || i
          .stx
          .alternate
          .as_ref()
          .map_or(false, |a| body_writes_to(a, var))
    }
    Stmt::VarDecl(d) => d.stx.declarators.iter().any(|dec| dec.name.stx.name == var),
    Stmt::While(w) => body_writes_to(&w.stx.body, var),
    _ => false,
  })
}

fn is_float_raw(raw: &str) -> bool {
  !raw.starts_with("0x")
    && !raw.starts_with("0X")
    && (raw.contains('.') || raw.contains('e') || raw.contains('E'))
}

fn number_constant(loc: Loc, raw: &str) -> Node<PyExpr> {
  let value = if is_float_raw(raw) {
    PyConstant::Float(raw.to_string())
  } else {
    PyConstant::Int(raw.to_string())
  };
  constant(loc, value)
}

fn name_expr(loc: Loc, name: impl Into<String>) -> Node<PyExpr> {
  Node::new(loc, PyName { name: name.into() }).into_wrapped()
}

fn constant(loc: Loc, value: PyConstant) -> Node<PyExpr> {
  Node::new(loc, value).into_wrapped()
}

fn attribute(loc: Loc, value: Node<PyExpr>, attr: impl Into<String>) -> Node<PyExpr> {
  Node::new(loc, PyAttribute {
    value,
    attr: attr.into(),
  })
  .into_wrapped()
}

fn call_of(loc: Loc, func: Node<PyExpr>, args: Vec<Node<PyExpr>>) -> Node<PyExpr> {
  Node::new(loc, PyCall { func, args }).into_wrapped()
}

fn builtin_call(loc: Loc, name: &str, args: Vec<Node<PyExpr>>) -> Node<PyExpr> {
  call_of(loc, name_expr(loc, name), args)
}

#[cfg(test)]
mod tests;
