use js2py::convert;
use js2py::convert_with_warnings;
use js2py::error::Severity;
use js2py::error::Stage;
use js2py::Mode;
use similar::TextDiff;

fn assert_python(mode: Mode, source: &str, expected: &str) {
  let actual = match convert(source, mode) {
    Ok(python) => python,
    Err(diagnostics) => panic!("conversion failed: {:?}", diagnostics),
  };
  if actual != expected {
    let diff = TextDiff::from_lines(expected, actual.as_str());
    panic!("unexpected Python output:\n{}", diff.unified_diff());
  }
}

#[test]
fn test_convert_full_typescript_program() {
  let source = r#"interface Item {
  name: string;
  price: number;
}

function totalPrice(items: Item[]): number {
  const prices = items.map(item => item.price);
  const total = prices.reduce((acc, p) => acc + p, 0);
  return total;
}
"#;
  let expected = "class Item:\n    name: str\n    price: float\n\ndef totalPrice(items: list[Item]) -> float:\n    prices = [item.price for item in items]\n    total = 0\n    for p in prices:\n        total = total + p\n    return total\n";
  assert_python(Mode::TypeScript, source, expected);
}

#[test]
fn test_convert_class_with_host_interop() {
  let source = "class Store {\n  save(value) {\n    this.box('v', value);\n  }\n  load() {\n    return this.unbox('v');\n  }\n}\n";
  let expected = "class Store:\n    def save(self, value):\n        self.box('v', value)\n\n    def load(self):\n        return self.unbox('v')\n";
  assert_python(Mode::JavaScript, source, expected);
}

#[test]
fn test_convert_is_deterministic() {
  let source = "const xs = [3, 1, 2];\nconst big = xs.filter(x => x > 1).map(x => x * 10);\nconsole.log(`got ${big.length}`);\n";
  let first = convert(source, Mode::JavaScript).expect("conversion failed");
  let second = convert(source, Mode::JavaScript).expect("conversion failed");
  assert_eq!(first, second);
}

#[test]
fn test_convert_empty_source() {
  assert_eq!(convert("", Mode::JavaScript).expect("conversion failed"), "");
}

#[test]
fn test_convert_reports_one_based_positions() {
  let diagnostics =
    convert("const a = 1;\nconst b = ;\n", Mode::JavaScript).expect_err("expected a parse error");
  assert_eq!(diagnostics.len(), 1);
  assert_eq!(diagnostics[0].stage, Stage::Parse);
  assert_eq!(diagnostics[0].severity, Severity::Error);
  assert_eq!(diagnostics[0].line, 2);
  assert_eq!(diagnostics[0].col, 11);
}

#[test]
fn test_convert_recovers_and_reports_all_errors() {
  let diagnostics = convert(
    "let a = ;\nswitch (x) {}\nlet c = 3;\n",
    Mode::JavaScript,
  )
  .expect_err("expected parse errors");
  assert_eq!(diagnostics.len(), 2);
  assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn test_convert_warning_positions_point_at_the_type() {
  let conversion = convert_with_warnings(
    "function f(x: CustomThing) {\n  return x;\n}\n",
    Mode::TypeScript,
  )
  .expect("conversion failed");
  assert_eq!(conversion.warnings.len(), 1);
  let warning = &conversion.warnings[0];
  assert_eq!(warning.severity, Severity::Warning);
  assert_eq!(warning.line, 1);
  assert_eq!(warning.col, 15);
}

#[test]
fn test_convert_rejects_typescript_grammar_in_javascript_mode() {
  let diagnostics =
    convert("let x: number = 1;\n", Mode::JavaScript).expect_err("expected a parse error");
  assert!(diagnostics[0].message.contains("TypeScript mode"));
}
