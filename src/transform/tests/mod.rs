use crate::convert;
use crate::convert_with_warnings;
use crate::error::Diagnostic;
use crate::error::Severity;
use crate::error::Stage;
use crate::Mode;

fn js(source: &str) -> String {
  match convert(source, Mode::JavaScript) {
    Ok(python) => python,
    Err(diagnostics) => panic!("conversion failed: {:?}", diagnostics),
  }
}

fn ts(source: &str) -> String {
  match convert(source, Mode::TypeScript) {
    Ok(python) => python,
    Err(diagnostics) => panic!("conversion failed: {:?}", diagnostics),
  }
}

fn js_errors(source: &str) -> Vec<Diagnostic> {
  convert(source, Mode::JavaScript).expect_err("conversion unexpectedly succeeded")
}

#[test]
fn test_transform_function_decl() {
  assert_eq!(
    js("function add(a, b) {\n  return a + b;\n}\n"),
    "def add(a, b):\n    return a + b\n"
  );
}

#[test]
fn test_transform_filter_map_chain_fuses() {
  assert_eq!(
    js("const doubled = [1, 2, 3].filter(x => x > 1).map(x => x * 2);\n"),
    "doubled = [x * 2 for x in [1, 2, 3] if x > 1]\n"
  );
}

#[test]
fn test_transform_filter_map_fusion_avoids_capture() {
  // The filter predicate reads an outer `x`; fusing would rebind the
  // predicate to the map parameter's name and shadow it, so the chain stays
  // as nested comprehensions.
  assert_eq!(
    js("const x = 0;\nconst ys = [1, 2, 3].filter(y => y > x).map(x => x * 2);\n"),
    "x = 0\nys = [x * 2 for x in [y for y in [1, 2, 3] if y > x]]\n"
  );
}

#[test]
fn test_transform_map_alone() {
  assert_eq!(
    js("const labels = names.map(n => n.trim());\nlet names = [];\n"),
    "labels = [n.strip() for n in names]\nnames = []\n"
  );
}

#[test]
fn test_transform_template_literal() {
  assert_eq!(
    js("const a = 2;\nconst b = 3;\nconst msg = `Sum: ${a + b}`;\n"),
    "a = 2\nb = 3\nmsg = f\"Sum: {a + b}\"\n"
  );
}

#[test]
fn test_transform_template_with_quoted_string_argument() {
  // The interpolated expression contains a string literal holding a single
  // quote; the rendered literal uses double quotes and the f-string flips
  // its own quote, since escapes inside the expression part are invalid
  // before Python 3.12.
  assert_eq!(
    js("const s = 'a';\nconst t = `v: ${s.replace(\"'\", \"-\")}`;\n"),
    "s = 'a'\nt = f'v: {s.replace(\"'\", '-')}'\n"
  );
}

#[test]
fn test_transform_object_preserves_key_order() {
  assert_eq!(
    js("const cfg = { \"b\": 1, \"a\": 2 };\n"),
    "cfg = {'b': 1, 'a': 2}\n"
  );
}

#[test]
fn test_transform_type_hints() {
  assert_eq!(
    ts("function scale(values: number[], factor: number): number[] {\n  return values.map(v => v * factor);\n}\n"),
    "def scale(values: list[float], factor: float) -> list[float]:\n    return [v * factor for v in values]\n"
  );
}

#[test]
fn test_transform_record_type_hint() {
  assert_eq!(
    ts("function tally(counts: Record<string, number>) {\n  return counts;\n}\n"),
    "def tally(counts: dict[str, float]):\n    return counts\n"
  );
}

#[test]
fn test_transform_unknown_generic_degrades_with_warning() {
  let conversion =
    convert_with_warnings("function f(x: Promise<string>) {\n  return x;\n}\n", Mode::TypeScript)
      .expect("conversion failed");
  assert_eq!(
    conversion.python,
    "from typing import Any\n\ndef f(x: Any):\n    return x\n"
  );
  assert_eq!(conversion.warnings.len(), 1);
  let warning = &conversion.warnings[0];
  assert_eq!(warning.severity, Severity::Warning);
  assert_eq!(warning.stage, Stage::Transform);
  assert!(warning.message.contains("Promise"));
}

#[test]
fn test_transform_class() {
  let source = "class Counter {\n  count: number = 0;\n  constructor(start: number) {\n    this.count = start;\n  }\n  increment() {\n    this.count += 1;\n  }\n}\n";
  let expected = "class Counter:\n    def __init__(self, start: float):\n        self.count: float = 0\n        self.count = start\n\n    def increment(self):\n        self.count += 1\n";
  assert_eq!(ts(source), expected);
}

#[test]
fn test_transform_class_extends() {
  assert_eq!(
    js("class Base {\n  greet() {\n    return 1;\n  }\n}\nclass Derived extends Base {\n}\n"),
    "class Base:\n    def greet(self):\n        return 1\n\nclass Derived(Base):\n    pass\n"
  );
}

#[test]
fn test_transform_interface_to_annotated_class() {
  assert_eq!(
    ts("interface Point {\n  x: number;\n  y: number;\n}\n"),
    "class Point:\n    x: float\n    y: float\n"
  );
}

#[test]
fn test_transform_reduce_becomes_accumulator_loop() {
  assert_eq!(
    js("const total = [1, 2, 3].reduce((acc, x) => acc + x, 0);\n"),
    "total = 0\nfor x in [1, 2, 3]:\n    total = total + x\n"
  );
}

#[test]
fn test_transform_for_each() {
  assert_eq!(
    js("const items = [1, 2];\nitems.forEach(x => console.log(x));\n"),
    "items = [1, 2]\nfor x in items:\n    print(x)\n"
  );
}

#[test]
fn test_transform_counting_for_becomes_range() {
  assert_eq!(
    js("for (let i = 0; i < 5; i++) {\n  console.log(i);\n}\n"),
    "for i in range(5):\n    print(i)\n"
  );
  assert_eq!(
    js("for (let i = 1; i < n; i++) {\n  console.log(i);\n}\nlet n = 4;\n"),
    "for i in range(1, n):\n    print(i)\nn = 4\n"
  );
}

#[test]
fn test_transform_counter_write_in_body_forces_while() {
  // Python's `for` reassigns the target every iteration, so a body that
  // also writes the counter cannot use `range`.
  assert_eq!(
    js("for (let i = 0; i < 3; i++) {\n  console.log(i);\n  i++;\n}\n"),
    "i = 0\nwhile i < 3:\n    print(i)\n    i += 1\n    i += 1\n"
  );
}

#[test]
fn test_transform_general_for_becomes_while() {
  assert_eq!(
    js("for (let i = 10; i > 0; i -= 2) {\n  console.log(i);\n}\n"),
    "i = 10\nwhile i > 0:\n    print(i)\n    i -= 2\n"
  );
}

#[test]
fn test_transform_continue_in_desugared_for_rejected() {
  let diagnostics = js_errors(
    "for (let i = 9; i > 0; i -= 1) {\n  if (i === 5) {\n    continue;\n  }\n  console.log(i);\n}\n",
  );
  assert_eq!(diagnostics.len(), 1);
  assert!(diagnostics[0].message.contains("continue"));
}

#[test]
fn test_transform_closure_capture_rejected() {
  let diagnostics = js_errors(
    "function outer() {\n  let captured = 1;\n  function inner() {\n    return captured;\n  }\n  return inner;\n}\n",
  );
  assert_eq!(diagnostics.len(), 1);
  assert_eq!(diagnostics[0].stage, Stage::Transform);
  assert!(diagnostics[0].message.contains("closures"));
}

#[test]
fn test_transform_this_outside_class_rejected() {
  let diagnostics = js_errors("function f() {\n  return this.value;\n}\n");
  assert_eq!(diagnostics.len(), 1);
  assert!(diagnostics[0].message.contains("this"));
}

#[test]
fn test_transform_box_unbox_bind_receiver() {
  assert_eq!(
    js("function save(value) {\n  this.box('k', value);\n  return this.unbox('k');\n}\n"),
    "def save(self, value):\n    self.box('k', value)\n    return self.unbox('k')\n"
  );
}

#[test]
fn test_transform_math_and_json_imports_sorted() {
  assert_eq!(
    js("const r = Math.sqrt(2);\nconst s = JSON.stringify(r);\n"),
    "import json\nimport math\nr = math.sqrt(2)\ns = json.dumps(r)\n"
  );
}

#[test]
fn test_transform_math_builtins() {
  assert_eq!(
    js("const a = Math.floor(1.5);\nconst b = Math.max(1, 2);\nconst c = Math.abs(0 - 3);\n"),
    "a = int(1.5)\nb = max(1, 2)\nc = abs(0 - 3)\n"
  );
}

#[test]
fn test_transform_nullish_coalescing() {
  assert_eq!(
    js("function f(a) {\n  return a ?? 0;\n}\n"),
    "def f(a):\n    return a if a is not None else 0\n"
  );
}

#[test]
fn test_transform_null_comparison_is_identity() {
  assert_eq!(
    js("function f(a) {\n  return a === null;\n}\n"),
    "def f(a):\n    return a is None\n"
  );
  assert_eq!(
    js("function f(a) {\n  return a !== undefined;\n}\n"),
    "def f(a):\n    return a is not None\n"
  );
}

#[test]
fn test_transform_errors_reported_per_declaration() {
  let diagnostics = js_errors(
    "function f() {\n  return this.x;\n}\nfunction g() {\n  return unknown;\n}\n",
  );
  assert_eq!(diagnostics.len(), 2);
}

#[test]
fn test_transform_reserved_name_renamed() {
  assert_eq!(js("const max = 3;\nconsole.log(max);\n"), "max_ = 3\nprint(max_)\n");
}

#[test]
fn test_transform_find_is_absent_safe() {
  assert_eq!(
    js("const found = [1, 2, 3].find(x => x === 2);\n"),
    "found = next(iter([x for x in [1, 2, 3] if x == 2]), None)\n"
  );
}

#[test]
fn test_transform_string_methods() {
  assert_eq!(
    js("function f(s) {\n  return s.trim().toLowerCase().split(',');\n}\n"),
    "def f(s):\n    return s.strip().lower().split(',')\n"
  );
}

#[test]
fn test_transform_array_methods() {
  assert_eq!(
    js("const xs = [];\nxs.push(1);\nconst first = xs.shift();\nconst has = xs.includes(1);\n"),
    "xs = []\nxs.append(1)\nfirst = xs.pop(0)\nhas = 1 in xs\n"
  );
}

#[test]
fn test_transform_join_flips_receiver() {
  assert_eq!(
    js("const out = parts.join('-');\nlet parts = [];\n"),
    "out = '-'.join(parts)\nparts = []\n"
  );
}

#[test]
fn test_transform_length_becomes_len() {
  assert_eq!(
    js("function f(xs) {\n  return xs.length;\n}\n"),
    "def f(xs):\n    return len(xs)\n"
  );
}

#[test]
fn test_transform_splice_rejected() {
  let diagnostics = js_errors("const xs = [1];\nxs.splice(0, 1);\n");
  assert_eq!(diagnostics.len(), 1);
  assert!(diagnostics[0].message.contains("splice"));
}

#[test]
fn test_transform_new_drops_to_call() {
  assert_eq!(
    js("class A {\n}\nconst a = new A();\n"),
    "class A:\n    pass\na = A()\n"
  );
}

#[test]
fn test_transform_for_of() {
  assert_eq!(
    js("const xs = [1, 2];\nfor (const x of xs) {\n  console.log(x);\n}\n"),
    "xs = [1, 2]\nfor x in xs:\n    print(x)\n"
  );
}

#[test]
fn test_transform_elif_chain() {
  assert_eq!(
    js("function f(a) {\n  if (a > 1) {\n    return 1;\n  } else if (a > 0) {\n    return 2;\n  } else {\n    return 3;\n  }\n}\n"),
    "def f(a):\n    if a > 1:\n        return 1\n    elif a > 0:\n        return 2\n    else:\n        return 3\n"
  );
}

#[test]
fn test_transform_typeof_rejected() {
  let diagnostics = js_errors("function f(a) {\n  return typeof a;\n}\n");
  assert_eq!(diagnostics.len(), 1);
  assert!(diagnostics[0].message.contains("typeof"));
}

#[test]
fn test_transform_parse_int_and_float() {
  assert_eq!(
    js("const a = parseInt('42');\nconst b = parseFloat('1.5');\n"),
    "a = int('42')\nb = float('1.5')\n"
  );
}

#[test]
fn test_transform_instanceof_becomes_isinstance() {
  assert_eq!(
    js("class A {\n}\nfunction f(x) {\n  return x instanceof A;\n}\n"),
    "class A:\n    pass\n\ndef f(x):\n    return isinstance(x, A)\n"
  );
}

#[test]
fn test_transform_arrow_expression_body() {
  assert_eq!(js("const double = x => x * 2;\n"), "def double(x):\n    return x * 2\n");
}

#[test]
fn test_transform_assignment_in_expression_rejected() {
  let diagnostics = js_errors("function f(a, b) {\n  return (a = b);\n}\n");
  assert_eq!(diagnostics.len(), 1);
  assert!(diagnostics[0].message.contains("statement position"));
}
