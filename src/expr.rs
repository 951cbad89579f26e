//! The arithmetic/boolean expression evaluator used by the `expr`
//! built-in (and, indirectly, by `if`/`while` conditions).
//!
//! This is a precedence-climbing ("Pratt style") parser: a single
//! recursive function carries the minimum operator precedence it is
//! willing to consume, and the call stack stands in for an explicit
//! operator stack. `$vars` and `[cmds]` are never expanded here —
//! substitution already happened when the evaluator built the text
//! this function receives.

use crate::error::ExprError;
use crate::MAX_RECURSION_LEVEL;

#[derive(Clone, Copy)]
enum Op {
    Or,
    And,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
}

fn apply(op: Op, a: f64, b: f64) -> f64 {
    match op {
        Op::Or => bool_f64(a != 0.0 || b != 0.0),
        Op::And => bool_f64(a != 0.0 && b != 0.0),
        Op::Lt => bool_f64(a < b),
        Op::Gt => bool_f64(a > b),
        Op::Le => bool_f64(a <= b),
        Op::Ge => bool_f64(a >= b),
        Op::Eq => bool_f64(a == b),
        Op::Ne => bool_f64(a != b),
        Op::Add => a + b,
        Op::Sub => a - b,
        Op::Mul => a * b,
        // Division by zero is not special-cased: the IEEE-754 result
        // (+-inf or NaN) propagates to the formatted result.
        Op::Div => a / b,
    }
}

fn bool_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\r' || b == b'\n'
}

fn skip_ws(bytes: &[u8], pos: &mut usize) {
    while matches!(bytes.get(*pos), Some(&b) if is_ws(b)) {
        *pos += 1;
    }
}

fn peek2(bytes: &[u8], pos: usize) -> (u8, u8) {
    (
        bytes.get(pos).copied().unwrap_or(0),
        bytes.get(pos + 1).copied().unwrap_or(0),
    )
}

/// Parses the longest valid floating-point literal starting at `*pos`.
/// Rejects (with `ExpectedOperand`) if no digit is consumed, matching
/// `strtod`'s "no conversion" case.
fn parse_number(bytes: &[u8], pos: &mut usize) -> Result<f64, ExprError> {
    let start = *pos;
    let mut p = *pos;
    let mut saw_digit = false;

    while matches!(bytes.get(p), Some(b) if b.is_ascii_digit()) {
        p += 1;
        saw_digit = true;
    }
    if bytes.get(p) == Some(&b'.') {
        p += 1;
        while matches!(bytes.get(p), Some(b) if b.is_ascii_digit()) {
            p += 1;
            saw_digit = true;
        }
    }
    if saw_digit && matches!(bytes.get(p), Some(b'e') | Some(b'E')) {
        let mut ep = p + 1;
        if matches!(bytes.get(ep), Some(b'+') | Some(b'-')) {
            ep += 1;
        }
        if matches!(bytes.get(ep), Some(b) if b.is_ascii_digit()) {
            ep += 1;
            while matches!(bytes.get(ep), Some(b) if b.is_ascii_digit()) {
                ep += 1;
            }
            p = ep;
        }
    }

    if !saw_digit {
        return Err(ExprError::ExpectedOperand);
    }
    let text = std::str::from_utf8(&bytes[start..p]).expect("ASCII-only slice is valid UTF-8");
    let value = text.parse::<f64>().map_err(|_| ExprError::ExpectedOperand)?;
    *pos = p;
    Ok(value)
}

/// Parses and evaluates one expression node at or above `min_prec`,
/// bumping `*level` for the duration of the call so expression
/// recursion (nested parentheses) shares the same recursion bound as
/// the evaluator's own nesting.
fn parse_expr(bytes: &[u8], pos: &mut usize, level: &mut u32, min_prec: i32) -> Result<f64, ExprError> {
    *level += 1;
    if *level > MAX_RECURSION_LEVEL {
        *level -= 1;
        return Err(ExprError::NestingTooDeep);
    }
    let result = parse_expr_body(bytes, pos, level, min_prec);
    *level -= 1;
    result
}

fn parse_expr_body(
    bytes: &[u8],
    pos: &mut usize,
    level: &mut u32,
    min_prec: i32,
) -> Result<f64, ExprError> {
    skip_ws(bytes, pos);

    let mut a = match bytes.get(*pos) {
        Some(b'(') => {
            *pos += 1;
            let v = parse_expr(bytes, pos, level, 0)?;
            skip_ws(bytes, pos);
            if bytes.get(*pos) == Some(&b')') {
                *pos += 1;
            } else {
                return Err(ExprError::ExpectedCloseParen);
            }
            v
        }
        Some(b'-') => {
            *pos += 1;
            -parse_expr(bytes, pos, level, 5)?
        }
        Some(b'+') => {
            *pos += 1;
            parse_expr(bytes, pos, level, 5)?
        }
        _ => parse_number(bytes, pos)?,
    };
    skip_ws(bytes, pos);

    loop {
        let (op, oprec, len) = match peek2(bytes, *pos) {
            (b'|', b'|') => (Op::Or, 0, 2),
            (b'&', b'&') => (Op::And, 1, 2),
            (b'<', b'=') => (Op::Le, 2, 2),
            (b'>', b'=') => (Op::Ge, 2, 2),
            (b'=', b'=') => (Op::Eq, 2, 2),
            (b'!', b'=') => (Op::Ne, 2, 2),
            (b'<', _) => (Op::Lt, 2, 1),
            (b'>', _) => (Op::Gt, 2, 1),
            (b'+', _) => (Op::Add, 3, 1),
            (b'-', _) => (Op::Sub, 3, 1),
            (b'*', _) => (Op::Mul, 4, 1),
            (b'/', _) => (Op::Div, 4, 1),
            _ => break,
        };
        if oprec < min_prec {
            break;
        }
        *pos += len;
        let b = parse_expr(bytes, pos, level, oprec + 1)?;
        a = apply(op, a, b);
        skip_ws(bytes, pos);
    }

    Ok(a)
}

/// Evaluates a complete expression string, rejecting trailing garbage
/// after the parsed expression.
pub fn eval_expr(text: &str, level: &mut u32) -> Result<f64, ExprError> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let value = parse_expr(bytes, &mut pos, level, 0)?;
    skip_ws(bytes, &mut pos);
    if pos != bytes.len() {
        return Err(ExprError::TrailingInput);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str) -> f64 {
        let mut level = 0;
        eval_expr(s, &mut level).unwrap()
    }

    #[test]
    fn precedence() {
        assert_eq!(eval("2 + 3 * 4"), 14.0);
        assert_eq!(eval("(2 + 3) * 4"), 20.0);
    }

    #[test]
    fn unary_minus() {
        assert_eq!(eval("-5 + 3"), -2.0);
        assert_eq!(eval("-7"), -7.0);
    }

    #[test]
    fn comparisons_and_booleans() {
        assert_eq!(eval("3 > 2"), 1.0);
        assert_eq!(eval("2 > 3"), 0.0);
        assert_eq!(eval("1 && 0"), 0.0);
        assert_eq!(eval("0 || 1"), 1.0);
    }

    #[test]
    fn no_short_circuit_side_effect_free_but_still_evaluates_both_sides() {
        // There's no side-effecting operand in pure expr syntax, but the
        // non-short-circuit evaluation order is still exercised here:
        // both operands must parse even when the left side alone would
        // determine the boolean result.
        assert_eq!(eval("1 || 0"), 1.0);
        assert_eq!(eval("0 && 1"), 0.0);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let mut level = 0;
        assert_eq!(
            eval_expr("1 +", &mut level).unwrap_err(),
            ExprError::ExpectedOperand
        );
        let mut level = 0;
        assert!(eval_expr("1 1", &mut level).is_err());
    }

    #[test]
    fn deep_parens_hit_recursion_limit() {
        let depth = 2000;
        let mut expr = String::new();
        expr.extend(std::iter::repeat('(').take(depth));
        expr.push('1');
        expr.extend(std::iter::repeat(')').take(depth));
        let mut level = 0;
        assert!(eval_expr(&expr, &mut level).is_err());
    }

    #[test]
    fn division_by_zero_propagates_ieee_result() {
        assert!(eval("1 / 0").is_infinite());
    }
}
