use crate::error::LiteralError;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Int(i128),
    Float(f64),
    Char(char),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    PathSep,
    Comma,
    Dot,
    Amp,
    Eq,
    Semi,
    /// Punctuation with no meaning in a literal (`+`, `<`, `!`, ...).
    Symbol(char),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier `{}`", name),
            TokenKind::Str(_) => write!(f, "string literal"),
            TokenKind::Int(n) => write!(f, "integer `{}`", n),
            TokenKind::Float(n) => write!(f, "float `{}`", n),
            TokenKind::Char(c) => write!(f, "char {:?}", c),
            TokenKind::LBrace => write!(f, "`{{`"),
            TokenKind::RBrace => write!(f, "`}}`"),
            TokenKind::LBracket => write!(f, "`[`"),
            TokenKind::RBracket => write!(f, "`]`"),
            TokenKind::LParen => write!(f, "`(`"),
            TokenKind::RParen => write!(f, "`)`"),
            TokenKind::Colon => write!(f, "`:`"),
            TokenKind::PathSep => write!(f, "`::`"),
            TokenKind::Comma => write!(f, "`,`"),
            TokenKind::Dot => write!(f, "`.`"),
            TokenKind::Amp => write!(f, "`&`"),
            TokenKind::Eq => write!(f, "`=`"),
            TokenKind::Semi => write!(f, "`;`"),
            TokenKind::Symbol(c) => write!(f, "`{}`", c),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

const INT_SUFFIXES: &[&str] = &[
    "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
];
const FLOAT_SUFFIXES: &[&str] = &["f32", "f64"];

/// Splits a snippet into tokens. Line (`//`) and block (`/* */`) comments
/// are dropped; positions are 1-based.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LiteralError> {
    let mut lexer = Lexer {
        chars: source.chars().peekable(),
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_second() == Some('*') => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(LiteralError::syntax(line, column, "unterminated block comment"));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LiteralError> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let token = |kind| Token { kind, line, column };

        let Some(c) = self.peek() else {
            return Ok(token(TokenKind::Eof));
        };

        if c == 'r' && matches!(self.peek_second(), Some('"') | Some('#')) {
            self.bump();
            return self.raw_string(line, column).map(token);
        }
        if c.is_alphabetic() || c == '_' {
            return Ok(token(TokenKind::Ident(self.ident())));
        }
        if c.is_ascii_digit() {
            return self.number(false, line, column).map(token);
        }
        if c == '-' && self.peek_second().is_some_and(|n| n.is_ascii_digit()) {
            self.bump();
            return self.number(true, line, column).map(token);
        }

        self.bump();
        let kind = match c {
            '"' => TokenKind::Str(self.string(line, column)?),
            '\'' => TokenKind::Char(self.char_literal(line, column)?),
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ':' if self.peek() == Some(':') => {
                self.bump();
                TokenKind::PathSep
            }
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '&' => TokenKind::Amp,
            '=' => TokenKind::Eq,
            ';' => TokenKind::Semi,
            other => TokenKind::Symbol(other),
        };
        Ok(token(kind))
    }

    fn ident(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        name
    }

    fn number(&mut self, negative: bool, line: usize, column: usize) -> Result<TokenKind, LiteralError> {
        let radix = match (self.peek(), self.peek_second()) {
            (Some('0'), Some('x')) => 16,
            (Some('0'), Some('o')) => 8,
            (Some('0'), Some('b')) => 2,
            _ => 10,
        };
        if radix != 10 {
            self.bump();
            self.bump();
        }

        let mut digits = String::new();
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c == '_' {
                self.bump();
            } else if c.is_digit(radix) {
                digits.push(c);
                self.bump();
            } else if radix == 10
                && c == '.'
                && !is_float
                && self.peek_second().is_some_and(|n| n.is_ascii_digit())
            {
                is_float = true;
                digits.push(c);
                self.bump();
            } else if radix == 10 && (c == 'e' || c == 'E') && self.exponent_follows() {
                is_float = true;
                digits.push(c);
                self.bump();
                if let Some(sign) = self.peek().filter(|s| *s == '+' || *s == '-') {
                    digits.push(sign);
                    self.bump();
                }
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(LiteralError::syntax(line, column, "number literal has no digits"));
        }

        if self.peek().is_some_and(|c| c.is_alphabetic()) {
            let suffix = self.ident();
            if FLOAT_SUFFIXES.contains(&suffix.as_str()) && radix == 10 {
                is_float = true;
            } else if !INT_SUFFIXES.contains(&suffix.as_str()) || is_float {
                return Err(LiteralError::syntax(
                    line,
                    column,
                    format!("invalid suffix `{}` on number literal", suffix),
                ));
            }
        }

        if is_float {
            let text = if negative { format!("-{}", digits) } else { digits };
            return text
                .parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|e| LiteralError::syntax(line, column, format!("invalid float literal: {}", e)));
        }

        let magnitude = u128::from_str_radix(&digits, radix)
            .map_err(|_| LiteralError::syntax(line, column, "integer literal is too large"))?;
        let value = if negative {
            0i128.checked_sub_unsigned(magnitude)
        } else {
            i128::try_from(magnitude).ok()
        };
        value
            .map(TokenKind::Int)
            .ok_or_else(|| LiteralError::syntax(line, column, "integer literal is too large"))
    }

    /// Whether the `e` under the cursor starts an exponent rather than a suffix.
    fn exponent_follows(&self) -> bool {
        let mut ahead = self.chars.clone();
        ahead.next();
        match ahead.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('+') | Some('-') => ahead.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn escape(&mut self, line: usize, column: usize) -> Result<char, LiteralError> {
        let escaped = self
            .bump()
            .ok_or_else(|| LiteralError::syntax(line, column, "unterminated escape sequence"))?;
        let c = match escaped {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'u' => {
                if self.bump() != Some('{') {
                    return Err(LiteralError::syntax(line, column, "expected `{` after `\\u`"));
                }
                let mut hex = String::new();
                loop {
                    match self.bump() {
                        Some('}') => break,
                        Some(h) if h.is_ascii_hexdigit() && hex.len() < 6 => hex.push(h),
                        _ => {
                            return Err(LiteralError::syntax(line, column, "invalid unicode escape"));
                        }
                    }
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| LiteralError::syntax(line, column, "invalid unicode escape"))?
            }
            other => {
                return Err(LiteralError::syntax(
                    line,
                    column,
                    format!("unknown escape sequence `\\{}`", other),
                ));
            }
        };
        Ok(c)
    }

    fn string(&mut self, line: usize, column: usize) -> Result<String, LiteralError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => value.push(self.escape(line, column)?),
                Some(c) => value.push(c),
                None => return Err(LiteralError::syntax(line, column, "unterminated string literal")),
            }
        }
    }

    fn raw_string(&mut self, line: usize, column: usize) -> Result<TokenKind, LiteralError> {
        let mut hashes = 0;
        while self.peek() == Some('#') {
            self.bump();
            hashes += 1;
        }
        if self.bump() != Some('"') {
            return Err(LiteralError::syntax(line, column, "expected `\"` to open raw string"));
        }
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => {
                    let mut closing = 0;
                    while closing < hashes && self.peek() == Some('#') {
                        self.bump();
                        closing += 1;
                    }
                    if closing == hashes {
                        return Ok(TokenKind::Str(value));
                    }
                    value.push('"');
                    value.extend(std::iter::repeat_n('#', closing));
                }
                Some(c) => value.push(c),
                None => return Err(LiteralError::syntax(line, column, "unterminated raw string literal")),
            }
        }
    }

    fn char_literal(&mut self, line: usize, column: usize) -> Result<char, LiteralError> {
        let c = match self.bump() {
            Some('\\') => self.escape(line, column)?,
            Some('\'') | None => return Err(LiteralError::syntax(line, column, "empty char literal")),
            Some(c) => c,
        };
        if self.bump() != Some('\'') {
            return Err(LiteralError::syntax(line, column, "unterminated char literal"));
        }
        Ok(c)
    }
}
