use super::ParseCtx;
use super::Parser;
use crate::ast::node::Node;
use crate::ast::stx::TopLevel;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::lex::Lexer;
use crate::Mode;
use serde_json::json;
use serde_json::Value;

fn parse(mode: Mode, source: &str) -> (Node<TopLevel>, Vec<SyntaxError>) {
  let mut parser = Parser::new(Lexer::new(source));
  parser.parse_top_level(ParseCtx { mode })
}

fn parse_ok(mode: Mode, source: &str) -> Value {
  let (top_level, errors) = parse(mode, source);
  assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
  serde_json::to_value(&top_level).unwrap()
}

fn parse_err(mode: Mode, source: &str) -> Vec<SyntaxError> {
  let (_, errors) = parse(mode, source);
  assert!(!errors.is_empty(), "expected at least one error");
  errors
}

fn first_stmt(value: &Value) -> &Value {
  &value["body"][0]
}

#[test]
fn test_parse_var_decl() {
  let top = parse_ok(Mode::JavaScript, "let x = 1;");
  assert_eq!(first_stmt(&top), &json!({
    "$t": "VarDecl",
    "mode": "Let",
    "declarators": [{
      "name": {"name": "x"},
      "type_annotation": null,
      "initializer": {"$t": "LitNum", "raw": "1"},
    }],
  }));
}

#[test]
fn test_parse_precedence() {
  let top = parse_ok(Mode::JavaScript, "1 + 2 * 3;");
  assert_eq!(first_stmt(&top), &json!({
    "$t": "Expr",
    "expr": {
      "$t": "Binary",
      "operator": "Addition",
      "left": {"$t": "LitNum", "raw": "1"},
      "right": {
        "$t": "Binary",
        "operator": "Multiplication",
        "left": {"$t": "LitNum", "raw": "2"},
        "right": {"$t": "LitNum", "raw": "3"},
      },
    },
  }));
}

#[test]
fn test_parse_exponentiation_right_associative() {
  let top = parse_ok(Mode::JavaScript, "2 ** 3 ** 2;");
  let expr = &first_stmt(&top)["expr"];
  assert_eq!(expr["operator"], "Exponentiation");
  assert_eq!(expr["left"], json!({"$t": "LitNum", "raw": "2"}));
  assert_eq!(expr["right"]["operator"], "Exponentiation");
}

#[test]
fn test_parse_arrow_function_single_param() {
  let top = parse_ok(Mode::JavaScript, "x => x + 1;");
  let func = &first_stmt(&top)["expr"]["func"];
  assert_eq!(func["arrow"], true);
  assert_eq!(func["parameters"], json!([{
    "name": "x",
    "type_annotation": null,
    "default_value": null,
  }]));
  assert_eq!(func["body"]["Expression"]["operator"], "Addition");
}

#[test]
fn test_parse_method_chain() {
  let top = parse_ok(
    Mode::JavaScript,
    "[1, 2, 3].filter(x => x > 1).map(x => x * 2);",
  );
  let expr = &first_stmt(&top)["expr"];
  assert_eq!(expr["$t"], "Call");
  assert_eq!(expr["callee"]["$t"], "Member");
  assert_eq!(expr["callee"]["right"], "map");
  assert_eq!(expr["callee"]["left"]["callee"]["right"], "filter");
}

#[test]
fn test_parse_template_literal() {
  let top = parse_ok(Mode::JavaScript, "`a${b}c`;");
  assert_eq!(first_stmt(&top)["expr"]["parts"], json!([
    {"Str": "a"},
    {"Expr": {"$t": "Id", "name": "b"}},
    {"Str": "c"},
  ]));
}

#[test]
fn test_parse_undefined_literal() {
  let top = parse_ok(Mode::JavaScript, "let x = undefined;");
  assert_eq!(
    first_stmt(&top)["declarators"][0]["initializer"],
    json!({"$t": "LitUndefined"})
  );
}

#[test]
fn test_parse_ts_type_annotations() {
  let top = parse_ok(Mode::TypeScript, "const xs: number[] = [];");
  assert_eq!(
    first_stmt(&top)["declarators"][0]["type_annotation"],
    json!({
      "$t": "Array",
      "element": {"$t": "Named", "name": "number"},
    })
  );
}

#[test]
fn test_parse_generic_type() {
  let top = parse_ok(Mode::TypeScript, "const m: Record<string, number> = {};");
  let annotation = &first_stmt(&top)["declarators"][0]["type_annotation"];
  assert_eq!(annotation["$t"], "Generic");
  assert_eq!(annotation["name"], "Record");
  assert_eq!(annotation["arguments"][0], json!({"$t": "Named", "name": "string"}));
}

#[test]
fn test_parse_type_annotation_rejected_in_js_mode() {
  let errors = parse_err(Mode::JavaScript, "const x: number = 1;");
  assert_eq!(
    errors[0].typ,
    SyntaxErrorType::TypeScriptOnly("type annotations")
  );
}

#[test]
fn test_parse_interface() {
  let top = parse_ok(Mode::TypeScript, "interface Point { x: number; y?: string }");
  let decl = first_stmt(&top);
  assert_eq!(decl["$t"], "InterfaceDecl");
  assert_eq!(decl["fields"], json!([
    {"name": "x", "optional": false, "type_annotation": {"$t": "Named", "name": "number"}},
    {"name": "y", "optional": true, "type_annotation": {"$t": "Named", "name": "string"}},
  ]));
}

#[test]
fn test_parse_interface_rejected_in_js_mode() {
  let errors = parse_err(Mode::JavaScript, "interface Point { x: number }");
  assert_eq!(
    errors[0].typ,
    SyntaxErrorType::TypeScriptOnly("interface declarations")
  );
}

#[test]
fn test_parse_class() {
  let top = parse_ok(Mode::TypeScript, r#"
    class Counter {
      count: number;
      constructor(start: number) {
        this.count = start;
      }
      increment() {
        this.count++;
      }
    }
  "#);
  let decl = first_stmt(&top);
  assert_eq!(decl["$t"], "ClassDecl");
  assert_eq!(decl["name"], json!({"name": "Counter"}));
  let members = decl["members"].as_array().unwrap();
  assert_eq!(members.len(), 3);
  assert_eq!(members[0]["key"], json!({"key": "count"}));
  assert_eq!(members[0]["val"]["$t"], "Prop");
  assert_eq!(members[1]["key"], json!({"key": "constructor"}));
  assert_eq!(members[1]["val"]["$t"], "Method");
}

#[test]
fn test_parse_class_extends() {
  let top = parse_ok(Mode::JavaScript, "class Dog extends Animal {}");
  assert_eq!(first_stmt(&top)["extends"], json!({"name": "Animal"}));
}

#[test]
fn test_parse_for_of() {
  let top = parse_ok(Mode::JavaScript, "for (const x of xs) { use(x); }");
  let stmt = first_stmt(&top);
  assert_eq!(stmt["$t"], "ForOf");
  assert_eq!(stmt["mode"], "Const");
  assert_eq!(stmt["variable"], json!({"name": "x"}));
}

#[test]
fn test_parse_for_triple() {
  let top = parse_ok(Mode::JavaScript, "for (let i = 0; i < 10; i++) {}");
  let stmt = first_stmt(&top);
  assert_eq!(stmt["$t"], "ForTriple");
  assert_eq!(stmt["init"]["$t"], "VarDecl");
  assert_eq!(stmt["condition"]["operator"], "LessThan");
  assert_eq!(stmt["update"]["operator"], "PostfixIncrement");
}

#[test]
fn test_parse_for_in_rejected() {
  let errors = parse_err(Mode::JavaScript, "for (const k in obj) {}");
  assert_eq!(
    errors[0].typ,
    SyntaxErrorType::UnsupportedSyntax("for-in loops")
  );
}

#[test]
fn test_parse_asi() {
  let top = parse_ok(Mode::JavaScript, "let a = 1\nlet b = 2\nreturn");
  // `return` is invalid at the top level of a script, but ASI itself is what
  // is under test here; only the two declarations matter.
  let body = top["body"].as_array().unwrap();
  assert!(body.len() >= 2);
  assert_eq!(body[0]["$t"], "VarDecl");
  assert_eq!(body[1]["$t"], "VarDecl");
}

#[test]
fn test_parse_ternary_with_parenthesised_branch() {
  let top = parse_ok(Mode::JavaScript, "a ? (b) : c;");
  assert_eq!(first_stmt(&top)["expr"]["$t"], "Cond");
}

#[test]
fn test_parse_assignment_target_validated() {
  let errors = parse_err(Mode::JavaScript, "1 = 2;");
  assert_eq!(
    errors[0].typ,
    SyntaxErrorType::ExpectedSyntax("assignment target")
  );
}

#[test]
fn test_parse_keyword_member_name() {
  parse_ok(Mode::JavaScript, "registry.delete(key);");
}

#[test]
fn test_parse_unsupported_statements() {
  for (source, construct) in [
    ("switch (x) {}", "switch statements"),
    ("try { f(); } finally {}", "try statements"),
    ("throw new Error();", "throw statements"),
    ("do { f(); } while (x);", "do-while loops"),
    ("import x from 'y';", "import declarations"),
    ("export const a = 1;", "export declarations"),
    ("outer: while (x) {}", "labeled statements"),
    ("async function f() {}", "async functions"),
  ] {
    let errors = parse_err(Mode::JavaScript, source);
    assert_eq!(
      errors[0].typ,
      SyntaxErrorType::UnsupportedSyntax(construct),
      "source: {}",
      source
    );
  }
}

#[test]
fn test_parse_destructuring_rejected() {
  for source in [
    "const {a, b} = obj;",
    "const [a, b] = xs;",
    "function f({a}) {}",
  ] {
    let errors = parse_err(Mode::JavaScript, source);
    assert_eq!(
      errors[0].typ,
      SyntaxErrorType::UnsupportedSyntax("destructuring patterns"),
      "source: {}",
      source
    );
  }
}

#[test]
fn test_parse_unterminated_string_reported_as_lex_error() {
  let errors = parse_err(Mode::JavaScript, "const s = 'abc");
  assert_eq!(errors[0].typ, SyntaxErrorType::UnterminatedString);
}

#[test]
fn test_parse_recovers_per_declaration() {
  let (top_level, errors) = parse(
    Mode::JavaScript,
    "let a = ;\nlet b = 2;\nswitch (x) {}\nlet c = 3;",
  );
  assert_eq!(errors.len(), 2);
  let top = serde_json::to_value(&top_level).unwrap();
  let names: Vec<&str> = top["body"]
    .as_array()
    .unwrap()
    .iter()
    .map(|stmt| stmt["declarators"][0]["name"]["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, ["b", "c"]);
}

#[test]
fn test_parse_object_literal() {
  let top = parse_ok(Mode::JavaScript, "let o = { a: 1, b, 'c d': 2 };");
  assert_eq!(
    first_stmt(&top)["declarators"][0]["initializer"]["members"],
    json!([
      {"$t": "Valued", "key": {"key": "a"}, "value": {"$t": "LitNum", "raw": "1"}},
      {"$t": "Shorthand", "name": "b"},
      {"$t": "Valued", "key": {"key": "c d"}, "value": {"$t": "LitNum", "raw": "2"}},
    ])
  );
}

#[test]
fn test_parse_string_escapes() {
  let top = parse_ok(Mode::JavaScript, r#"let s = 'a\nbA\x21';"#);
  assert_eq!(
    first_stmt(&top)["declarators"][0]["initializer"],
    json!({"$t": "LitStr", "value": "a\nbA!"})
  );
}

#[test]
fn test_parse_invalid_escape() {
  let errors = parse_err(Mode::JavaScript, r#"let s = '\u00zz';"#);
  assert_eq!(errors[0].typ, SyntaxErrorType::InvalidCharacterEscape);
}
