//! The operator table shared by the lexer (longest-match scanning) and the
//! compiler (shunting-yard precedence/associativity). One entry per
//! spelling; several spellings can map to the same opcode (`and` / `&&`).

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The 18 opcodes of the expression language. `LParen`/`RParen` never reach
/// the postfix program; they only live on the compiler's operator stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Not,
    Pow,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
    In,
    And,
    Or,
    LParen,
    RParen,
}

impl Opcode {
    /// Operand count. `!`/`not` take one operand, everything else (besides
    /// the paren markers, which are never evaluated) takes two.
    pub fn arity(self) -> usize {
        match self {
            Opcode::Not => 1,
            Opcode::LParen | Opcode::RParen => 0,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub opcode: Opcode,
    pub precedence: u8,
}

macro_rules! op {
    ($map:ident, $name:expr, $opcode:ident, $prec:expr) => {
        $map.insert(
            $name,
            OperatorInfo {
                opcode: Opcode::$opcode,
                precedence: $prec,
            },
        );
    };
}

pub static OPERATORS: Lazy<HashMap<&'static str, OperatorInfo>> = Lazy::new(|| {
    let mut m = HashMap::new();

    op!(m, "(", LParen, 7);
    op!(m, ")", RParen, 7);

    op!(m, "!", Not, 6);
    op!(m, "not", Not, 6);

    op!(m, "**", Pow, 5);

    op!(m, "*", Mul, 4);
    op!(m, "/", Div, 4);
    op!(m, "%", Mod, 4);

    op!(m, "+", Add, 3);
    op!(m, "-", Sub, 3);

    op!(m, ">", Gt, 2);
    op!(m, ">=", Gte, 2);
    op!(m, "<", Lt, 2);
    op!(m, "<=", Lte, 2);
    op!(m, "==", Eq, 2);
    op!(m, "!=", Neq, 2);
    op!(m, "in", In, 2);

    op!(m, "and", And, 1);
    op!(m, "&&", And, 1);

    op!(m, "or", Or, 0);
    op!(m, "||", Or, 0);

    m
});

/// Precedence of an opcode, independent of which spelling produced it.
/// Only `**` gets the right-associative "strictly greater" exception in the
/// compiler (spec §4.C); every other operator compares with `>=`.
pub fn precedence_of(opcode: Opcode) -> u8 {
    match opcode {
        Opcode::LParen | Opcode::RParen => 7,
        Opcode::Not => 6,
        Opcode::Pow => 5,
        Opcode::Mul | Opcode::Div | Opcode::Mod => 4,
        Opcode::Add | Opcode::Sub => 3,
        Opcode::Gt | Opcode::Gte | Opcode::Lt | Opcode::Lte | Opcode::Eq | Opcode::Neq | Opcode::In => 2,
        Opcode::And => 1,
        Opcode::Or => 0,
    }
}
