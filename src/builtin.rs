//! The core command set: `set`, `expr`, `if`, `while`, `break`,
//! `continue`, `proc`, `return`, `puts`, plus user-procedure dispatch.

use std::io::Write;

use crate::command::Handler;
use crate::error::InterpError;
use crate::expr;
use crate::format;
use crate::interp::{Code, Interp};

pub(crate) fn register_core_commands(interp: &mut Interp) {
    interp.register("set", Handler::Builtin(cmd_set));
    interp.register("expr", Handler::Builtin(cmd_expr));
    interp.register("if", Handler::Builtin(cmd_if));
    interp.register("while", Handler::Builtin(cmd_while));
    interp.register("break", Handler::Builtin(cmd_break));
    interp.register("continue", Handler::Builtin(cmd_continue));
    interp.register("proc", Handler::Builtin(cmd_proc));
    interp.register("return", Handler::Builtin(cmd_return));
    interp.register("puts", Handler::Builtin(cmd_puts));
}

fn cmd_set(interp: &mut Interp, argv: &[String]) -> Result<Code, InterpError> {
    match argv.len() {
        3 => {
            let value = argv[2].clone();
            interp.set_var(&argv[1], value.clone());
            interp.set_result(value);
            Ok(Code::Ok)
        }
        2 => {
            let value = interp
                .get_var(&argv[1])
                .ok_or_else(|| InterpError::CantRead(argv[1].clone()))?
                .to_string();
            interp.set_result(value);
            Ok(Code::Ok)
        }
        _ => Err(InterpError::Arity("set".to_string())),
    }
}

fn cmd_expr(interp: &mut Interp, argv: &[String]) -> Result<Code, InterpError> {
    if argv.len() < 2 {
        return Err(InterpError::Arity("expr".to_string()));
    }
    let text = argv[1..].join(" ");
    let value = expr::eval_expr(&text, &mut interp.level).map_err(|_| InterpError::ExprSyntax)?;
    interp.set_result(format::fmt_g12(value));
    Ok(Code::Ok)
}

/// Wraps `cond` as `expr <cond>` and re-evaluates it, so `$`/`[...]`
/// substitutions inside the condition text happen before parsing.
/// Returns the raw code from that re-evaluation: callers must check for
/// a non-`Ok` code (e.g. a `[cmd]` inside the condition returning
/// `BREAK`) before trusting the result as a boolean.
fn eval_condition(interp: &mut Interp, cond: &str) -> Result<Code, InterpError> {
    let mut text = String::with_capacity(cond.len() + 5);
    text.push_str("expr ");
    text.push_str(cond);
    interp.eval(&text)
}

fn is_truthy(interp: &Interp) -> bool {
    interp.result().parse::<f64>().unwrap_or(0.0) != 0.0
}

fn cmd_if(interp: &mut Interp, argv: &[String]) -> Result<Code, InterpError> {
    if argv.len() < 3 {
        return Err(InterpError::Arity("if".to_string()));
    }
    let mut i = 1;
    loop {
        let cond = argv.get(i).ok_or_else(|| InterpError::Arity("if".to_string()))?.clone();
        let body = argv
            .get(i + 1)
            .ok_or_else(|| InterpError::Arity("if".to_string()))?
            .clone();

        let code = eval_condition(interp, &cond)?;
        if code != Code::Ok {
            return Ok(code);
        }
        if is_truthy(interp) {
            return interp.eval(&body);
        }

        i += 2;
        if i >= argv.len() {
            return Ok(Code::Ok);
        }
        match argv[i].as_str() {
            "else" => {
                let body = argv
                    .get(i + 1)
                    .ok_or_else(|| InterpError::Arity("if".to_string()))?
                    .clone();
                return interp.eval(&body);
            }
            "elseif" => {
                i += 1;
            }
            _ => return Err(InterpError::Arity("if".to_string())),
        }
    }
}

fn cmd_while(interp: &mut Interp, argv: &[String]) -> Result<Code, InterpError> {
    if argv.len() != 3 {
        return Err(InterpError::Arity("while".to_string()));
    }
    let cond = argv[1].clone();
    let body = argv[2].clone();
    loop {
        let code = eval_condition(interp, &cond)?;
        if code != Code::Ok {
            return Ok(code);
        }
        if !is_truthy(interp) {
            return Ok(Code::Ok);
        }
        match interp.eval(&body)? {
            Code::Ok | Code::Continue => continue,
            Code::Break => return Ok(Code::Ok),
            other => return Ok(other),
        }
    }
}

fn cmd_break(_interp: &mut Interp, argv: &[String]) -> Result<Code, InterpError> {
    if argv.len() != 1 {
        return Err(InterpError::Arity("break".to_string()));
    }
    Ok(Code::Break)
}

fn cmd_continue(_interp: &mut Interp, argv: &[String]) -> Result<Code, InterpError> {
    if argv.len() != 1 {
        return Err(InterpError::Arity("continue".to_string()));
    }
    Ok(Code::Continue)
}

fn cmd_proc(interp: &mut Interp, argv: &[String]) -> Result<Code, InterpError> {
    if argv.len() != 4 {
        return Err(InterpError::Arity("proc".to_string()));
    }
    let name = argv[1].clone();
    let arglist = argv[2].clone();
    let body = argv[3].clone();
    interp.register(&name, Handler::Proc { arglist, body });
    interp.set_result("");
    Ok(Code::Ok)
}

fn cmd_return(interp: &mut Interp, argv: &[String]) -> Result<Code, InterpError> {
    if argv.len() > 2 {
        return Err(InterpError::Arity("return".to_string()));
    }
    let value = argv.get(1).cloned().unwrap_or_default();
    interp.set_result(value);
    Ok(Code::Return)
}

fn cmd_puts(_interp: &mut Interp, argv: &[String]) -> Result<Code, InterpError> {
    match argv.len() {
        2 => {
            println!("{}", argv[1]);
            Ok(Code::Ok)
        }
        3 if argv[1] == "-nonewline" => {
            print!("{}", argv[2]);
            std::io::stdout().flush().ok();
            Ok(Code::Ok)
        }
        _ => Err(InterpError::Arity("puts".to_string())),
    }
}

/// Invokes a user-defined procedure: binds `argv[1..]` to `arglist`'s
/// names in a fresh frame, evaluates `body`, and always pops the frame
/// before returning — including on an error or a non-local exit from
/// `body`.
pub(crate) fn call_proc(
    interp: &mut Interp,
    name: &str,
    arglist: &str,
    body: &str,
    argv: &[String],
) -> Result<Code, InterpError> {
    let params: Vec<&str> = arglist.split_whitespace().collect();

    interp.push_frame();
    log::debug!("call {} ({} args)", name, params.len());

    let bind_result = bind_params(interp, name, &params, argv);
    let outcome = match bind_result {
        Ok(()) => interp.eval(body),
        Err(e) => Err(e),
    };
    interp.pop_frame();

    match outcome {
        Ok(Code::Return) => Ok(Code::Ok),
        other => other,
    }
}

/// Binds each `arglist` name to the matching `argv` value, walking the
/// two in lockstep the way `picolCommandCallProc` does: the arity check
/// and the uppercase-parameter check are interleaved per position, not
/// front-loaded, so a too-few-args call that also carries an uppercase
/// parameter name reports whichever trips first as the walk reaches it.
fn bind_params(interp: &mut Interp, name: &str, params: &[&str], argv: &[String]) -> Result<(), InterpError> {
    let argc = argv.len();
    let mut arity = 0;
    for param in params {
        arity += 1;
        if arity > argc - 1 {
            return Err(InterpError::ProcArity(name.to_string()));
        }
        if param.as_bytes().first().map_or(false, |b| b.is_ascii_uppercase()) {
            return Err(InterpError::GlobalParam((*param).to_string()));
        }
        interp.set_var(param, argv[arity].clone());
    }
    if arity != argc - 1 {
        return Err(InterpError::ProcArity(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::Interp;

    #[test]
    fn set_with_two_args_reads_existing_variable() {
        let mut i = Interp::new();
        i.eval("set x hi").unwrap();
        assert_eq!(i.eval("set x").unwrap(), Code::Ok);
        assert_eq!(i.result(), "hi");
    }

    #[test]
    fn set_read_of_missing_variable_is_an_error() {
        let mut i = Interp::new();
        assert!(i.eval("set nope").is_err());
        assert_eq!(i.result(), "Can't read \"nope\": no such variable");
    }

    #[test]
    fn expr_with_no_operands_is_a_syntax_error() {
        let mut i = Interp::new();
        assert!(i.eval("expr 1 +").is_err());
        assert_eq!(i.result(), "Error in expression");
    }

    #[test]
    fn proc_arity_mismatch() {
        let mut i = Interp::new();
        i.eval("proc f {a b} { return $a }").unwrap();
        assert!(i.eval("f 1").is_err());
    }

    #[test]
    fn uppercase_proc_parameter_is_rejected() {
        let mut i = Interp::new();
        i.eval("proc f {X} { return $X }").unwrap();
        assert!(i.eval("f 1").is_err());
    }

    #[test]
    fn uppercase_check_at_a_reachable_position_wins_over_a_later_arity_mismatch() {
        // "f 1 2" supplies too few args for {a B c}, but the walk reaches
        // the uppercase parameter B before running out of arguments to
        // compare against, so that error fires first.
        let mut i = Interp::new();
        i.eval("proc f {a B c} { return $a }").unwrap();
        assert!(i.eval("f 1 2").is_err());
        assert_eq!(
            i.result(),
            "Procedure parameter 'B' can't be a global (upcase first character)"
        );
    }

    #[test]
    fn while_break_and_continue() {
        let mut i = Interp::new();
        i.eval("set n 0").unwrap();
        i.eval("set total 0").unwrap();
        i.eval(
            "while {$n < 5} { set n [expr $n+1]; if {$n == 3} { continue }; set total [expr $total+$n] }",
        )
        .unwrap();
        assert_eq!(i.get_var("total"), Some("12"));
    }

    #[test]
    fn puts_nonewline_flag() {
        let mut i = Interp::new();
        assert_eq!(i.eval("puts -nonewline hi").unwrap(), Code::Ok);
    }

    #[test]
    fn builtin_can_be_shadowed_by_a_proc() {
        let mut i = Interp::new();
        i.eval("proc puts {x} { return got_$x }").unwrap();
        i.eval("puts hi").unwrap();
        assert_eq!(i.result(), "got_hi");
    }
}
