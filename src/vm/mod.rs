//! Stack VM that evaluates a compiled [`crate::compiler::Program`] against
//! one JSON record (spec §4.E, §5). There is no run-time error path: a
//! missing or malformed selector resolves to `Null` and the rest of the
//! program runs normally, so it only forces the predicate false where an
//! `and` (or the final result) actually depends on it.

use log::warn;

use crate::json;
use crate::ops::Opcode;
use crate::value::{values_equal, Value};

/// Runs `program` against `json`, returning the boolean the expression
/// evaluates to. `'v` is the single lifetime shared by program literals
/// (tied to the expression text) and values pulled out of `json` — the
/// shorter of the two bounds the result, and `Value`'s covariance over
/// `'a` lets both coexist on one stack without cloning either buffer.
pub fn execute<'v>(program: &[Value<'v>], json: &'v [u8]) -> bool {
    let mut stack: Vec<Value<'v>> = Vec::with_capacity(program.len());

    for token in program {
        match token {
            Value::Selector(field) => {
                // A missing or malformed field resolves to `Null` rather
                // than aborting the run: `.missing or .year == 1984` must
                // still reach the `or` and evaluate true (spec §8 S4).
                // `and`-only expressions end up false "for free" since
                // `Null` is falsy, with no special-casing needed.
                let value = json::extract_field(json, field).unwrap_or_else(|| {
                    warn!(
                        "selector {:?} not found or malformed, treating as null",
                        String::from_utf8_lossy(field)
                    );
                    Value::Null
                });
                stack.push(value);
            }
            Value::Op { opcode, .. } => {
                if !apply(&mut stack, *opcode) {
                    return false;
                }
            }
            value => stack.push(value.clone()),
        }
    }

    stack.pop().map(|v| v.to_bool()).unwrap_or(false)
}

/// Applies one opcode to the top of `stack`. The compiler already checked
/// arity, so operands are always present; the `bool` return only exists to
/// let a stack underflow (a compiler bug, not a user error) fail the run
/// instead of panicking.
fn apply(stack: &mut Vec<Value>, opcode: Opcode) -> bool {
    match opcode {
        Opcode::Not => {
            let Some(a) = stack.pop() else { return false };
            stack.push(Value::Number(if a.to_bool() { 0.0 } else { 1.0 }));
        }
        Opcode::LParen | Opcode::RParen => {
            // Never emitted into a compiled program.
        }
        _ => {
            let (Some(b), Some(a)) = (stack.pop(), stack.pop()) else {
                return false;
            };
            stack.push(binary(opcode, &a, &b));
        }
    }
    true
}

fn binary(opcode: Opcode, a: &Value, b: &Value) -> Value<'static> {
    match opcode {
        Opcode::Pow => Value::Number(a.to_number().powf(b.to_number())),
        Opcode::Mul => Value::Number(a.to_number() * b.to_number()),
        Opcode::Div => {
            let result = a.to_number() / b.to_number();
            if !result.is_finite() {
                warn!("division produced a non-finite result: {result}");
            }
            Value::Number(result)
        }
        Opcode::Mod => Value::Number(a.to_number() % b.to_number()),
        Opcode::Add => Value::Number(a.to_number() + b.to_number()),
        Opcode::Sub => Value::Number(a.to_number() - b.to_number()),
        Opcode::Gt => bool_number(a.to_number() > b.to_number()),
        Opcode::Gte => bool_number(a.to_number() >= b.to_number()),
        Opcode::Lt => bool_number(a.to_number() < b.to_number()),
        Opcode::Lte => bool_number(a.to_number() <= b.to_number()),
        Opcode::Eq => bool_number(values_equal(a, b)),
        Opcode::Neq => bool_number(!values_equal(a, b)),
        Opcode::In => bool_number(contains(a, b)),
        // Both operands are already on the stack — these never short-circuit
        // (spec §5 "Ordering": `and`/`or` always evaluate both sides).
        Opcode::And => bool_number(a.to_bool() && b.to_bool()),
        Opcode::Or => bool_number(a.to_bool() || b.to_bool()),
        Opcode::Not | Opcode::LParen | Opcode::RParen => unreachable!("handled in apply"),
    }
}

fn bool_number(b: bool) -> Value<'static> {
    Value::Number(if b { 1.0 } else { 0.0 })
}

/// `in` semantics (spec §4.E): membership against a `Tuple`, substring
/// search when the right side is a `String`, `false` otherwise.
fn contains(needle: &Value, haystack: &Value) -> bool {
    match haystack {
        Value::Tuple(elements) => elements.iter().any(|e| values_equal(needle, e)),
        Value::String(hay) => match needle.as_bytes() {
            Some(n) => hay
                .windows(n.len().max(1))
                .any(|w| w == n.as_ref())
                || n.is_empty(),
            None => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;

    fn run(expr: &str, json: &str) -> bool {
        let program = compile(expr).unwrap();
        execute(program.ops(), json.as_bytes())
    }

    #[test]
    fn missing_selector_is_falsy_but_does_not_abort_the_run() {
        assert!(run(".missing or 1 == 1", r#"{"a": 1}"#));
    }

    #[test]
    fn arithmetic_and_comparison_compose() {
        assert!(run("(.a + .b) * 2 == 20", r#"{"a": 3, "b": 7}"#));
    }

    #[test]
    fn pow_right_associativity_matches_evaluation() {
        assert!(run("2 ** 3 ** 2 == 512", r#"{}"#));
    }

    #[test]
    fn in_checks_tuple_membership() {
        assert!(run(r#".genre in ["drama", "scifi"]"#, r#"{"genre": "scifi"}"#));
        assert!(!run(r#".genre in ["drama", "scifi"]"#, r#"{"genre": "comedy"}"#));
    }

    #[test]
    fn in_checks_string_substring() {
        assert!(run(r#".title in "The Matrix Reloaded""#, r#"{"title": "Matrix"}"#));
    }

    #[test]
    fn not_negates_truthiness() {
        assert!(run("!.flag", r#"{"flag": false}"#));
        assert!(!run("!.flag", r#"{"flag": true}"#));
    }

    #[test]
    fn and_or_never_short_circuit_but_still_fail_on_missing_selector() {
        assert!(!run("1 == 1 and .missing", r#"{}"#));
    }
}
