//! The evaluator: drives the tokenizer, assembles words with
//! substitution and concatenation, and dispatches to the command
//! registry. This is the core of [`Interp::eval`].

use std::fmt;

use crate::builtin;
use crate::command::{Handler, Registry};
use crate::error::InterpError;
use crate::frame::Frame;
use crate::token::{Tokenizer, TokenKind};
use crate::MAX_RECURSION_LEVEL;

pub use crate::command::BuiltinFn;

/// The out-of-band signal returned alongside every evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    Ok = 0,
    Err = 1,
    Return = 2,
    Break = 3,
    Continue = 4,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// An embeddable interpreter instance.
///
/// Multiple `Interp`s may live on separate threads, but a single
/// instance is never meant to be shared across threads concurrently —
/// there is no internal locking.
pub struct Interp {
    pub(crate) level: u32,
    pub(crate) frames: Vec<Frame>,
    pub(crate) commands: Registry,
    result: String,
}

impl Interp {
    /// Builds a ready-to-use interpreter with the core command set
    /// already registered.
    pub fn new() -> Self {
        let mut interp = Interp {
            level: 0,
            frames: vec![Frame::new()],
            commands: Registry::new(),
            result: String::new(),
        };
        builtin::register_core_commands(&mut interp);
        interp
    }

    /// The last result string set by any command.
    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn set_result(&mut self, value: impl Into<String>) {
        self.result = value.into();
    }

    /// Registers a user command, replacing any existing handler with
    /// that name.
    pub fn register_command(&mut self, name: &str, handler: BuiltinFn) {
        self.register(name, Handler::Builtin(handler));
    }

    pub(crate) fn register(&mut self, name: &str, handler: Handler) {
        self.commands.register(name, handler);
    }

    pub(crate) fn push_frame(&mut self) {
        self.frames.push(Frame::new());
    }

    pub(crate) fn pop_frame(&mut self) {
        self.frames.pop();
    }

    fn resolve_scope(&self, name: &str) -> usize {
        if name.as_bytes().first().map_or(false, |b| b.is_ascii_uppercase()) {
            0
        } else {
            self.frames.len() - 1
        }
    }

    pub fn get_var(&self, name: &str) -> Option<&str> {
        let idx = self.resolve_scope(name);
        self.frames[idx].get(name).map(|v| v.value.as_str())
    }

    pub fn set_var(&mut self, name: &str, value: String) {
        let idx = self.resolve_scope(name);
        self.frames[idx].set(name, value);
    }

    /// Evaluates a chunk of source text, bumping the recursion level
    /// for the duration of the call and decrementing it on every exit
    /// path — success, a propagated non-`Ok` code, or an error.
    pub fn eval(&mut self, text: &str) -> Result<Code, InterpError> {
        self.result.clear();
        self.level += 1;
        if self.level > MAX_RECURSION_LEVEL {
            self.level -= 1;
            self.result = InterpError::NestingTooDeep.to_string();
            return Err(InterpError::NestingTooDeep);
        }
        log::trace!("eval enter, level={}", self.level);
        let outcome = self.eval_body(text);
        self.level -= 1;
        if let Err(ref e) = outcome {
            self.result = e.to_string();
        }
        log::trace!("eval exit, level={}", self.level);
        outcome
    }

    fn eval_body(&mut self, text: &str) -> Result<Code, InterpError> {
        let mut tokenizer = Tokenizer::new(text);
        let mut argv: Vec<String> = Vec::new();
        let mut prev_kind = TokenKind::Eol;

        loop {
            let token = tokenizer.next_token();
            match token.kind {
                TokenKind::Sep => {
                    prev_kind = TokenKind::Sep;
                }
                TokenKind::Eol | TokenKind::Eof => {
                    if !argv.is_empty() {
                        let code = self.dispatch(&argv)?;
                        argv.clear();
                        if code != Code::Ok {
                            return Ok(code);
                        }
                    }
                    if token.kind == TokenKind::Eof {
                        return Ok(Code::Ok);
                    }
                    prev_kind = TokenKind::Eol;
                }
                TokenKind::Var => {
                    let value = self
                        .get_var(token.text)
                        .ok_or_else(|| InterpError::NoSuchVariable(token.text.to_string()))?
                        .to_string();
                    push_word(&mut argv, value, prev_kind);
                    prev_kind = TokenKind::Var;
                }
                TokenKind::Cmd => {
                    let code = self.eval(token.text)?;
                    if code != Code::Ok {
                        return Ok(code);
                    }
                    let value = self.result().to_string();
                    push_word(&mut argv, value, prev_kind);
                    prev_kind = TokenKind::Cmd;
                }
                TokenKind::Esc => {
                    push_word(&mut argv, decode_escapes(token.text), prev_kind);
                    prev_kind = TokenKind::Esc;
                }
                TokenKind::Str => {
                    push_word(&mut argv, token.text.to_string(), prev_kind);
                    prev_kind = TokenKind::Str;
                }
            }
        }
    }

    fn dispatch(&mut self, argv: &[String]) -> Result<Code, InterpError> {
        let name = argv[0].clone();
        log::trace!("dispatch {}", name);
        match self.commands.get(&name) {
            Some(Handler::Builtin(f)) => f(self, argv),
            Some(Handler::Proc { arglist, body }) => {
                builtin::call_proc(self, &name, &arglist, &body, argv)
            }
            None => Err(InterpError::NoSuchCommand(name)),
        }
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

/// Appends `text` as a new word, or concatenates it onto the last word,
/// depending on whether the previous token was a separator.
fn push_word(argv: &mut Vec<String>, text: String, prev_kind: TokenKind) {
    if argv.is_empty() || matches!(prev_kind, TokenKind::Sep | TokenKind::Eol) {
        argv.push(text);
    } else {
        argv.last_mut().expect("checked non-empty above").push_str(&text);
    }
}

/// Decodes `\n`, `\t`, `\r`, and `\<char>` escapes. A trailing lone `\`
/// is preserved verbatim.
fn decode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
