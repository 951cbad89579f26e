//! picol: a minimal, embeddable Tcl-like command interpreter.
//!
//! Values are always strings; programs are command lists; a small core
//! command set (`set`, `expr`, `if`, `while`, `break`, `continue`,
//! `proc`, `return`, `puts`) plus user-defined procedures is enough to
//! express arithmetic, control flow, recursion, and string building.
//!
//! ```
//! use picol::Interp;
//!
//! let mut interp = Interp::new();
//! interp.eval("set x 42").unwrap();
//! assert_eq!(interp.result(), "42");
//! ```

pub mod builtin;
pub mod command;
pub mod error;
pub mod expr;
pub mod format;
pub mod frame;
pub mod interp;
pub mod token;

pub use command::BuiltinFn;
pub use error::{ExprError, InterpError};
pub use interp::{Code, Interp};

/// Bound shared by the evaluator and the expression parser: exceeding
/// it is the only protection against runaway recursion (nested
/// `[...]`, procedure calls, or parenthesized expressions).
pub const MAX_RECURSION_LEVEL: u32 = 128;

/// Largest source file the CLI will read into memory for one-shot
/// evaluation.
pub const MAX_FILE_SIZE: usize = 16 * 1024;
