//! On-demand tokenizer for type expressions.
//!
//! Tokens are produced one at a time so that a caller parsing a type at the
//! start of free text (a doc tag such as `@param int $id The id`) never lexes
//! past the token following the type.

use ordered_float::OrderedFloat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Keyword, builtin or (possibly qualified) class-like name.
    Identifier(String),
    /// `$this`
    This,
    /// `$name`, without the sigil.
    Variable(String),
    Int(i64),
    Float(OrderedFloat<f64>),
    /// Quoted literal, unescaped.
    Str(String),
    Pipe,
    Amp,
    Question,
    OpenParen,
    CloseParen,
    OpenAngle,
    CloseAngle,
    OpenSquare,
    CloseSquare,
    OpenCurly,
    CloseCurly,
    Comma,
    Colon,
    DoubleColon,
    Ellipsis,
    Equal,
    Arrow,
    Star,
    /// Malformed input; carries a description.
    Invalid(String),
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier \"{name}\""),
            TokenKind::This => "\"$this\"".into(),
            TokenKind::Variable(name) => format!("variable \"${name}\""),
            TokenKind::Int(v) => format!("integer {v}"),
            TokenKind::Float(v) => format!("float {v}"),
            TokenKind::Str(_) => "string literal".into(),
            TokenKind::Invalid(what) => what.clone(),
            TokenKind::Eof => "end of input".into(),
            punct => format!("\"{}\"", punct.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Pipe => "|",
            TokenKind::Amp => "&",
            TokenKind::Question => "?",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenAngle => "<",
            TokenKind::CloseAngle => ">",
            TokenKind::OpenSquare => "[",
            TokenKind::CloseSquare => "]",
            TokenKind::OpenCurly => "{",
            TokenKind::CloseCurly => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::DoubleColon => "::",
            TokenKind::Ellipsis => "...",
            TokenKind::Equal => "=",
            TokenKind::Arrow => "=>",
            TokenKind::Star => "*",
            _ => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offsets into the source.
    pub start: usize,
    pub end: usize,
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.eat_while(char::is_whitespace);
        let start = self.pos;
        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(c) => self.lex(c),
        };
        Token { kind, start, end: self.pos }
    }

    fn lex(&mut self, c: char) -> TokenKind {
        let punct = match c {
            '|' => Some(TokenKind::Pipe),
            '&' => Some(TokenKind::Amp),
            '?' => Some(TokenKind::Question),
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            '<' => Some(TokenKind::OpenAngle),
            '>' => Some(TokenKind::CloseAngle),
            '[' => Some(TokenKind::OpenSquare),
            ']' => Some(TokenKind::CloseSquare),
            '{' => Some(TokenKind::OpenCurly),
            '}' => Some(TokenKind::CloseCurly),
            ',' => Some(TokenKind::Comma),
            '*' => Some(TokenKind::Star),
            _ => None,
        };
        if let Some(kind) = punct {
            self.bump();
            return kind;
        }

        match c {
            ':' => {
                self.bump();
                if self.peek() == Some(':') {
                    self.bump();
                    TokenKind::DoubleColon
                } else {
                    TokenKind::Colon
                }
            }
            '=' => {
                self.bump();
                if self.peek() == Some('>') {
                    self.bump();
                    TokenKind::Arrow
                } else {
                    TokenKind::Equal
                }
            }
            '.' if self.src[self.pos..].starts_with("...") => {
                self.pos += 3;
                TokenKind::Ellipsis
            }
            '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => self.number(),
            '$' => self.variable(),
            '\'' | '"' => self.string(c),
            '-' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit() || d == '.') => self.number(),
            d if d.is_ascii_digit() => self.number(),
            c if is_ident_start(c) || c == '\\' => self.identifier(),
            other => {
                self.bump();
                TokenKind::Invalid(format!("unexpected character \"{other}\""))
            }
        }
    }

    fn identifier(&mut self) -> TokenKind {
        let start = self.pos;
        loop {
            if self.peek() == Some('\\') {
                self.bump();
            }
            if !self.peek().is_some_and(is_ident_start) {
                break;
            }
            self.eat_while(is_ident_continue);
            if self.peek() != Some('\\') {
                break;
            }
        }
        let text = &self.src[start..self.pos];
        if text.is_empty() || text.ends_with('\\') {
            return TokenKind::Invalid(format!("malformed name \"{text}\""));
        }
        TokenKind::Identifier(text.to_string())
    }

    fn variable(&mut self) -> TokenKind {
        self.bump();
        let start = self.pos;
        if !self.peek().is_some_and(is_ident_start) {
            return TokenKind::Invalid("expected variable name after \"$\"".into());
        }
        self.eat_while(|c| c.is_alphanumeric() || c == '_');
        match &self.src[start..self.pos] {
            "this" => TokenKind::This,
            name => TokenKind::Variable(name.to_string()),
        }
    }

    fn string(&mut self, quote: char) -> TokenKind {
        self.bump();
        let mut out = String::new();
        while let Some(c) = self.bump() {
            match c {
                c if c == quote => return TokenKind::Str(out),
                '\\' => match self.bump() {
                    Some('n') if quote == '"' => out.push('\n'),
                    Some('t') if quote == '"' => out.push('\t'),
                    Some('r') if quote == '"' => out.push('\r'),
                    Some(e) if e == quote || e == '\\' => out.push(e),
                    Some(e) => {
                        out.push('\\');
                        out.push(e);
                    }
                    None => break,
                },
                _ => out.push(c),
            }
        }
        TokenKind::Invalid("unterminated string literal".into())
    }

    fn number(&mut self) -> TokenKind {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }

        let rest = &self.src[self.pos..];
        if rest.starts_with("0x") || rest.starts_with("0X") {
            self.pos += 2;
            let digits_start = self.pos;
            self.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
            let digits = self.src[digits_start..self.pos].replace('_', "");
            let negative = self.src[start..].starts_with('-');
            return match i64::from_str_radix(&digits, 16) {
                Ok(v) if negative => TokenKind::Int(-v),
                Ok(v) => TokenKind::Int(v),
                Err(_) => TokenKind::Invalid(format!("invalid integer \"{}\"", &self.src[start..self.pos])),
            };
        }

        let mut is_float = false;
        self.eat_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek() == Some('.') && self.peek_at(1) != Some('.') {
            is_float = true;
            self.bump();
            self.eat_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    self.bump();
                }
                self.eat_while(|c| c.is_ascii_digit());
            }
        }

        let text = self.src[start..self.pos].replace('_', "");
        if is_float {
            match text.parse::<f64>() {
                Ok(v) => TokenKind::Float(OrderedFloat(v)),
                Err(_) => TokenKind::Invalid(format!("invalid float \"{text}\"")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => TokenKind::Int(v),
                Err(_) => TokenKind::Invalid(format!("invalid integer \"{text}\"")),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || !c.is_ascii() && !c.is_whitespace()
}

/// Keywords such as `non-empty-string` embed dashes.
fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}
