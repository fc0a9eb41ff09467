//! Shunting-yard compiler (spec §4.C): turns the lexer's token sequence
//! into a flat postfix [`Program`], checking parenthesis balance and
//! operator arity at compile time so the VM never has to.

use log::{debug, trace};

use crate::error::{CompileError, CompileResult};
use crate::lexer;
use crate::ops::{precedence_of, Opcode};
use crate::value::Value;

/// A compiled, immutable postfix program. Borrows from the expression text
/// it was compiled from and may be run against any number of JSON records.
#[derive(Debug)]
pub struct Program<'src> {
    ops: Vec<Value<'src>>,
}

impl<'src> Program<'src> {
    pub fn ops(&self) -> &[Value<'src>] {
        &self.ops
    }
}

fn is_value_token(token: &Value) -> bool {
    matches!(
        token,
        Value::Number(_) | Value::String(_) | Value::Null | Value::Tuple(_) | Value::Selector(_)
    )
}

/// Pops one operator off the stack into the program, checking that enough
/// operands are already on the (abstract) value stack.
fn apply_pop(depth: &mut i64, opcode: Opcode, offset: usize) -> CompileResult<()> {
    let arity = opcode.arity() as i64;
    if *depth < arity {
        return Err(CompileError::new(
            offset,
            format!("operator requires {arity} operand(s) but only {depth} available"),
        ));
    }
    *depth = *depth - arity + 1;
    Ok(())
}

pub fn compile(expr: &str) -> CompileResult<Program<'_>> {
    trace!("compiling expression: {expr:?}");
    let tokens = lexer::lex(expr.as_bytes())?;
    debug!("lexed {} token(s)", tokens.len());
    let program = compile_tokens(tokens, expr.len())?;
    debug!("compiled to a {}-entry postfix program", program.ops().len());
    Ok(program)
}

fn compile_tokens(tokens: Vec<Value<'_>>, source_len: usize) -> CompileResult<Program<'_>> {
    let mut program: Vec<Value<'_>> = Vec::with_capacity(tokens.len());
    let mut op_stack: Vec<Value<'_>> = Vec::new();
    let mut depth: i64 = 0;

    for token in tokens {
        if is_value_token(&token) {
            program.push(token);
            depth += 1;
            continue;
        }

        let Value::Op { opcode, source_offset } = token else {
            // Eof: nothing left to push onto the program.
            break;
        };

        match opcode {
            Opcode::LParen => op_stack.push(Value::Op { opcode, source_offset }),
            Opcode::RParen => {
                loop {
                    match op_stack.pop() {
                        Some(Value::Op { opcode: Opcode::LParen, .. }) => break,
                        Some(Value::Op { opcode: popped, source_offset: popped_offset }) => {
                            apply_pop(&mut depth, popped, popped_offset)?;
                            program.push(Value::Op { opcode: popped, source_offset: popped_offset });
                        }
                        _ => return Err(CompileError::new(source_offset, "unmatched ')'")),
                    }
                }
            }
            current => {
                while let Some(Value::Op { opcode: top, .. }) = op_stack.last() {
                    if *top == Opcode::LParen {
                        break;
                    }
                    let should_pop = if current == Opcode::Pow {
                        precedence_of(*top) > precedence_of(current)
                    } else {
                        precedence_of(*top) >= precedence_of(current)
                    };
                    if !should_pop {
                        break;
                    }
                    let Some(Value::Op { opcode: popped, source_offset: popped_offset }) = op_stack.pop() else {
                        unreachable!("just matched Value::Op on the stack top");
                    };
                    apply_pop(&mut depth, popped, popped_offset)?;
                    program.push(Value::Op { opcode: popped, source_offset: popped_offset });
                }
                op_stack.push(Value::Op { opcode: current, source_offset });
            }
        }
    }

    while let Some(top) = op_stack.pop() {
        let Value::Op { opcode, source_offset } = top else {
            unreachable!("operator stack only ever holds Op values");
        };
        if opcode == Opcode::LParen {
            return Err(CompileError::new(source_offset, "unmatched '('"));
        }
        apply_pop(&mut depth, opcode, source_offset)?;
        program.push(Value::Op { opcode, source_offset });
    }

    if depth != 1 {
        return Err(CompileError::new(
            source_len,
            format!("expression does not reduce to a single value (stack depth {depth})"),
        ));
    }

    Ok(Program { ops: program })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opcodes(program: &Program) -> Vec<Opcode> {
        program
            .ops()
            .iter()
            .filter_map(|v| match v {
                Value::Op { opcode, .. } => Some(*opcode),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn precedence_orders_mul_before_add() {
        let program = compile("1 + 2 * 3").unwrap();
        assert_eq!(opcodes(&program), vec![Opcode::Mul, Opcode::Add]);
    }

    #[test]
    fn pow_is_right_associative() {
        let program = compile("2 ** 3 ** 2").unwrap();
        assert_eq!(opcodes(&program), vec![Opcode::Pow, Opcode::Pow]);
    }

    #[test]
    fn mul_div_mod_are_left_associative() {
        let program = compile("8 / 4 / 2").unwrap();
        assert_eq!(opcodes(&program), vec![Opcode::Div, Opcode::Div]);
    }

    #[test]
    fn unmatched_open_paren_reports_its_offset() {
        let err = compile("((1+2)").unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn unmatched_close_paren_reports_its_offset() {
        let err = compile("1 + 2)").unwrap_err();
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn arity_starvation_is_a_compile_error() {
        assert!(compile("1 + + 2").is_err());
    }

    #[test]
    fn idempotent_compilation_yields_equal_programs() {
        let a = compile("(5+2)*3 and .year > 1980").unwrap();
        let b = compile("(5+2)*3 and .year > 1980").unwrap();
        assert_eq!(opcodes(&a), opcodes(&b));
        assert_eq!(a.ops().len(), b.ops().len());
    }
}
