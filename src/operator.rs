use ahash::HashMap;
use ahash::HashMapExt;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum OperatorName {
  Addition,
  Assignment,
  AssignmentAddition,
  AssignmentDivision,
  AssignmentMultiplication,
  AssignmentRemainder,
  AssignmentSubtraction,
  Call,
  ComputedMemberAccess,
  Conditional,
  Division,
  Equality,
  Exponentiation,
  GreaterThan,
  GreaterThanOrEqual,
  In,
  Inequality,
  Instanceof,
  LessThan,
  LessThanOrEqual,
  LogicalAnd,
  LogicalNot,
  LogicalOr,
  MemberAccess,
  Multiplication,
  New,
  NullishCoalescing,
  PostfixDecrement,
  PostfixIncrement,
  PrefixDecrement,
  PrefixIncrement,
  Remainder,
  StrictEquality,
  StrictInequality,
  Subtraction,
  Typeof,
  UnaryNegation,
  UnaryPlus,
}

impl OperatorName {
  pub fn is_assignment(self) -> bool {
    matches!(
      self,
      OperatorName::Assignment
        | OperatorName::AssignmentAddition
        | OperatorName::AssignmentDivision
        | OperatorName::AssignmentMultiplication
        | OperatorName::AssignmentRemainder
        | OperatorName::AssignmentSubtraction
    )
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Associativity {
  Left,
  Right,
}

#[derive(Clone, Debug)]
pub struct Operator {
  pub name: OperatorName,
  pub precedence: u8,
  pub associativity: Associativity,
}

// Precedence values follow the ECMAScript operator table; higher binds
// tighter.
#[rustfmt::skip]
pub static OPERATORS: Lazy<HashMap<OperatorName, Operator>> = Lazy::new(|| {
  let mut map = HashMap::<OperatorName, Operator>::new();
  let mut add = |name: OperatorName, precedence: u8, associativity: Associativity| {
    map.insert(name, Operator { name, precedence, associativity });
  };
  use Associativity::*;
  use OperatorName::*;
  add(Assignment,               2,  Right);
  add(AssignmentAddition,       2,  Right);
  add(AssignmentDivision,       2,  Right);
  add(AssignmentMultiplication, 2,  Right);
  add(AssignmentRemainder,      2,  Right);
  add(AssignmentSubtraction,    2,  Right);
  add(Conditional,              4,  Right);
  add(NullishCoalescing,        5,  Left);
  add(LogicalOr,                6,  Left);
  add(LogicalAnd,               7,  Left);
  add(Equality,                 11, Left);
  add(Inequality,               11, Left);
  add(StrictEquality,           11, Left);
  add(StrictInequality,         11, Left);
  add(GreaterThan,              12, Left);
  add(GreaterThanOrEqual,       12, Left);
  add(In,                       12, Left);
  add(Instanceof,               12, Left);
  add(LessThan,                 12, Left);
  add(LessThanOrEqual,          12, Left);
  add(Addition,                 14, Left);
  add(Subtraction,              14, Left);
  add(Division,                 15, Left);
  add(Multiplication,           15, Left);
  add(Remainder,                15, Left);
  add(Exponentiation,           16, Right);
  add(LogicalNot,               17, Right);
  add(PrefixDecrement,          17, Right);
  add(PrefixIncrement,          17, Right);
  add(Typeof,                   17, Right);
  add(UnaryNegation,            17, Right);
  add(UnaryPlus,                17, Right);
  add(PostfixDecrement,         18, Left);
  add(PostfixIncrement,         18, Left);
  add(New,                      19, Right);
  add(Call,                     20, Left);
  add(ComputedMemberAccess,     20, Left);
  add(MemberAccess,             20, Left);
  map
});
