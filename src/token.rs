//! The tokenizer.
//!
//! `Tokenizer` is a stateful scanner over a source buffer: each call to
//! [`Tokenizer::next_token`] advances an internal cursor and classifies
//! the next lexical fragment. Tokens borrow directly from the source
//! text and do not outlive the step that produced them — callers that
//! need to keep a token's text around (the evaluator does, to perform
//! substitution and concatenation) must copy it into an owned `String`
//! before asking for the next token.
//!
//! This scanner is hand-written rather than built from `nom` combinators.
//! The grammar here is not context-free in the way `nom`'s combinator
//! style wants: recognizing the end of a `[...]` command substitution
//! requires tracking bracket *and* brace nesting across the whole scan,
//! and deciding whether `{` or `"` opens a new word depends on the kind
//! of the *previous* token. Both are exactly the kind of long-lived,
//! cross-call mutable state that a single `next_token` cursor expresses
//! far more directly than a combinator tree would.

/// The kind of lexical fragment produced by one `next_token` step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Inline whitespace between words.
    Sep,
    /// A newline, carriage return, or `;` terminating a command.
    Eol,
    /// Plain text: a braces-quoted literal, or a bare `$`.
    Str,
    /// An identifier following `$`.
    Var,
    /// The body between a matched `[` and `]`.
    Cmd,
    /// Text that may contain `\x` escapes, from a bare or quoted word.
    Esc,
    /// End of input.
    Eof,
}

/// A single lexical fragment: a kind paired with the source slice it covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Scans one token at a time from a source buffer.
pub struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
    inside_quote: bool,
    prev_kind: TokenKind,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer positioned at the start of `text`.
    ///
    /// The initial "previous token kind" is `Eol`, matching the start of
    /// a fresh command: a leading `#` is a comment, and a leading `{` or
    /// `"` opens a new word.
    pub fn new(text: &'a str) -> Self {
        Tokenizer {
            text,
            pos: 0,
            inside_quote: false,
            prev_kind: TokenKind::Eol,
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn is_ident_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_'
    }

    /// Advances the cursor and returns the next token.
    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            if self.pos >= self.text.len() {
                let kind = if self.prev_kind != TokenKind::Eol && self.prev_kind != TokenKind::Eof
                {
                    TokenKind::Eol
                } else {
                    TokenKind::Eof
                };
                self.prev_kind = kind;
                return Token { kind, text: "" };
            }

            let c = self.bytes()[self.pos];
            let word_start = matches!(
                self.prev_kind,
                TokenKind::Sep | TokenKind::Eol | TokenKind::Str
            );

            match c {
                b' ' | b'\t' if !self.inside_quote => return self.scan_sep(),
                b'\n' | b'\r' | b';' if !self.inside_quote => return self.scan_eol(),
                b'[' => return self.scan_command(),
                b'$' => return self.scan_var(),
                b'#' if self.prev_kind == TokenKind::Eol => {
                    self.skip_comment();
                    continue;
                }
                b'{' if word_start => return self.scan_brace(),
                _ => return self.scan_string(word_start),
            }
        }
    }

    fn scan_sep(&mut self) -> Token<'a> {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
        self.prev_kind = TokenKind::Sep;
        Token {
            kind: TokenKind::Sep,
            text: &self.text[start..self.pos],
        }
    }

    fn scan_eol(&mut self) -> Token<'a> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'\n') | Some(b'\r') | Some(b';')) {
            self.pos += 1;
        }
        self.prev_kind = TokenKind::Eol;
        Token {
            kind: TokenKind::Eol,
            text: &self.text[start..self.pos],
        }
    }

    fn skip_comment(&mut self) {
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
        }
    }

    /// Scans the body of a `[...]` command substitution.
    ///
    /// Bracket nesting is only counted while brace depth is zero, so a
    /// literal `]` inside `{...}` never closes the substitution early. A
    /// stray `}` with no matching `{` is silently ignored rather than
    /// treated as an error — this mirrors the forgiving behavior of the
    /// original implementation and is intentional, not an oversight.
    fn scan_command(&mut self) -> Token<'a> {
        self.pos += 1; // skip '['
        let start = self.pos;
        let mut depth = 1i32;
        let mut brace_depth = 0i32;
        loop {
            match self.peek() {
                None => break,
                Some(b'[') if brace_depth == 0 => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(b']') if brace_depth == 0 => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    self.pos += 1;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if self.pos < self.text.len() {
                        self.pos += 1;
                    }
                }
                Some(b'{') => {
                    brace_depth += 1;
                    self.pos += 1;
                }
                Some(b'}') => {
                    if brace_depth > 0 {
                        brace_depth -= 1;
                    }
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
        let text = &self.text[start..self.pos];
        if self.peek() == Some(b']') {
            self.pos += 1;
        }
        self.prev_kind = TokenKind::Cmd;
        Token {
            kind: TokenKind::Cmd,
            text,
        }
    }

    /// Scans `$name`. A `$` with no identifier characters after it is a
    /// one-character `Str` token holding just the dollar sign.
    fn scan_var(&mut self) -> Token<'a> {
        self.pos += 1; // skip '$'
        let start = self.pos;
        while let Some(b) = self.peek() {
            if Self::is_ident_byte(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            self.prev_kind = TokenKind::Str;
            Token {
                kind: TokenKind::Str,
                text: &self.text[start - 1..start],
            }
        } else {
            self.prev_kind = TokenKind::Var;
            Token {
                kind: TokenKind::Var,
                text: &self.text[start..self.pos],
            }
        }
    }

    /// Scans a `{...}` brace-quoted literal. Escapes are only honored to
    /// skip one raw character during the scan; no interpretation happens
    /// here, so the returned text preserves backslashes verbatim.
    fn scan_brace(&mut self) -> Token<'a> {
        self.pos += 1; // skip '{'
        let start = self.pos;
        let mut level = 1i32;
        loop {
            match self.peek() {
                Some(b'\\') if self.pos + 1 < self.text.len() => {
                    self.pos += 1;
                }
                None => break,
                Some(b'}') => {
                    level -= 1;
                    if level == 0 {
                        break;
                    }
                }
                Some(b'{') => level += 1,
                _ => {}
            }
            self.pos += 1;
        }
        let end = self.pos;
        if self.peek().is_some() {
            self.pos += 1; // skip the closing brace
        }
        self.prev_kind = TokenKind::Str;
        Token {
            kind: TokenKind::Str,
            text: &self.text[start..end],
        }
    }

    /// Scans a bare or double-quoted word, up to the next unescaped
    /// delimiter (`$`, `[`, unquoted whitespace/EOL, or a closing `"`).
    /// Backslash escapes are only honored to skip one raw character;
    /// actual decoding happens later, in the evaluator.
    fn scan_string(&mut self, word_start: bool) -> Token<'a> {
        if word_start && self.peek() == Some(b'"') {
            self.inside_quote = true;
            self.pos += 1;
        }
        let start = self.pos;
        loop {
            match self.peek() {
                None => {
                    let text = &self.text[start..self.pos];
                    self.prev_kind = TokenKind::Esc;
                    return Token {
                        kind: TokenKind::Esc,
                        text,
                    };
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if self.pos < self.text.len() {
                        self.pos += 1;
                    }
                }
                Some(b'$') | Some(b'[') => {
                    let text = &self.text[start..self.pos];
                    self.prev_kind = TokenKind::Esc;
                    return Token {
                        kind: TokenKind::Esc,
                        text,
                    };
                }
                Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b';') => {
                    if !self.inside_quote {
                        let text = &self.text[start..self.pos];
                        self.prev_kind = TokenKind::Esc;
                        return Token {
                            kind: TokenKind::Esc,
                            text,
                        };
                    }
                    self.pos += 1;
                }
                Some(b'"') => {
                    if self.inside_quote {
                        let text = &self.text[start..self.pos];
                        self.pos += 1;
                        self.inside_quote = false;
                        self.prev_kind = TokenKind::Esc;
                        return Token {
                            kind: TokenKind::Esc,
                            text,
                        };
                    }
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
    }
}
