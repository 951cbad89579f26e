//! End-to-end scenarios exercising the interpreter as an embedder
//! would: construct, evaluate, inspect the result register.

use picol::{Code, Interp};

#[test]
fn set_assigns_and_returns_the_value() {
    let mut i = Interp::new();
    assert_eq!(i.eval("set x 42").unwrap(), Code::Ok);
    assert_eq!(i.result(), "42");
}

#[test]
fn expr_respects_precedence() {
    let mut i = Interp::new();
    i.eval("expr 2 + 3 * 4").unwrap();
    assert_eq!(i.result(), "14");
}

#[test]
fn variable_substitution_inside_expr() {
    let mut i = Interp::new();
    i.eval("set a 10").unwrap();
    i.eval("expr $a + 5").unwrap();
    assert_eq!(i.result(), "15");
}

#[test]
fn recursive_factorial_via_command_substitution() {
    let mut i = Interp::new();
    i.eval("proc fact {n} { if {$n <= 1} { return 1 }; expr $n * [fact [expr $n-1]] }")
        .unwrap();
    i.eval("fact 6").unwrap();
    assert_eq!(i.result(), "720");
}

#[test]
fn double_quoted_concatenation_of_two_variables() {
    let mut i = Interp::new();
    i.eval("set p aa").unwrap();
    i.eval("set q bb").unwrap();
    i.eval(r#"set r "$p$q""#).unwrap();
    assert_eq!(i.result(), "aabb");
    assert_eq!(i.get_var("r"), Some("aabb"));
}

#[test]
fn braces_suppress_substitution() {
    let mut i = Interp::new();
    i.eval("set r {$notavar}").unwrap();
    assert_eq!(i.result(), "$notavar");
}

#[test]
fn lowercase_locals_do_not_leak_into_the_top_frame() {
    let mut i = Interp::new();
    i.eval("set z outer").unwrap();
    i.eval("proc lf {} { set z inner }").unwrap();
    i.eval("lf").unwrap();
    assert_eq!(i.get_var("z"), Some("outer"));
}

#[test]
fn uppercase_globals_are_visible_and_mutable_from_any_depth() {
    let mut i = Interp::new();
    i.eval("proc inc {} { set Counter [expr $Counter+1] }").unwrap();
    i.eval("set Counter 0").unwrap();
    i.eval("inc").unwrap();
    i.eval("inc").unwrap();
    i.eval("inc").unwrap();
    assert_eq!(i.get_var("Counter"), Some("3"));
}

#[test]
fn reading_an_undefined_variable_is_an_error() {
    let mut i = Interp::new();
    assert!(i.eval("set r $undefined").is_err());
}

#[test]
fn malformed_expr_reports_the_canonical_message() {
    let mut i = Interp::new();
    assert!(i.eval("expr 1 +").is_err());
    assert_eq!(i.result(), "Error in expression");
}

#[test]
fn after_an_error_the_interpreter_is_still_usable() {
    let mut i = Interp::new();
    assert!(i.eval("expr 1 +").is_err());
    assert_eq!(i.eval("set x 1").unwrap(), Code::Ok);
    assert_eq!(i.result(), "1");
}

#[test]
fn re_registering_a_proc_replaces_it_in_place() {
    let mut i = Interp::new();
    i.eval("proc f {} { return a }").unwrap();
    i.eval("proc f {} { return b }").unwrap();
    i.eval("f").unwrap();
    assert_eq!(i.result(), "b");
}

#[test]
fn deeply_nested_command_substitution_hits_the_recursion_bound() {
    let depth = 200;
    let mut src = String::new();
    src.extend(std::iter::repeat('[').take(depth));
    src.push_str("set r 1");
    src.extend(std::iter::repeat(']').take(depth));
    let mut i = Interp::new();
    assert!(i.eval(&src).is_err());
    // the interpreter must still be usable after unwinding the error
    assert_eq!(i.eval("set ok 1").unwrap(), Code::Ok);
}

#[test]
fn deeply_nested_expr_parens_hit_the_recursion_bound() {
    let depth = 200;
    let mut src = String::from("expr ");
    src.extend(std::iter::repeat('(').take(depth));
    src.push('1');
    src.extend(std::iter::repeat(')').take(depth));
    let mut i = Interp::new();
    assert!(i.eval(&src).is_err());
}

#[test]
fn self_recursive_proc_without_a_base_case_errors_instead_of_overflowing() {
    let mut i = Interp::new();
    i.eval("proc loop {} { loop }").unwrap();
    assert!(i.eval("loop").is_err());
}

#[test]
fn crlf_line_endings_terminate_commands() {
    let mut i = Interp::new();
    i.eval("set a 1\r\nset b 2\r\nexpr $a + $b").unwrap();
    assert_eq!(i.result(), "3");
}

#[test]
fn trailing_backslash_in_an_unterminated_bracket_does_not_panic() {
    let mut i = Interp::new();
    let _ = i.eval("set r [\\");
}

#[test]
fn expr_accepts_a_bare_literal_and_a_negative_literal() {
    let mut i = Interp::new();
    i.eval("expr 42").unwrap();
    assert_eq!(i.result(), "42");
    i.eval("expr -7").unwrap();
    assert_eq!(i.result(), "-7");
}

#[test]
fn puts_nonewline_requires_the_flag_before_the_string() {
    let mut i = Interp::new();
    assert!(i.eval("puts hello -nonewline").is_err());
    assert_eq!(i.eval("puts -nonewline hello").unwrap(), Code::Ok);
}

#[test]
fn uppercase_proc_parameter_is_rejected() {
    let mut i = Interp::new();
    i.eval("proc f {X} { return $X }").unwrap();
    assert!(i.eval("f 1").is_err());
}

#[test]
fn break_and_continue_inside_while() {
    let mut i = Interp::new();
    i.eval("set n 0").unwrap();
    i.eval("set hits 0").unwrap();
    i.eval(
        "while {1} { \
            set n [expr $n+1]; \
            if {$n == 2} { continue }; \
            if {$n > 4} { break }; \
            set hits [expr $hits+1] \
        }",
    )
    .unwrap();
    assert_eq!(i.get_var("n"), Some("5"));
    assert_eq!(i.get_var("hits"), Some("3"));
}
