use super::lexer::{tokenize, Token, TokenKind};
use crate::error::LiteralError;

/// Keys a brace literal may be addressed by.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKey {
    /// A bare identifier: the literal is a record.
    Field(String),
    /// A quoted or scalar key: the literal is a map.
    Str(String),
    Int(i128),
    Char(char),
}

impl EntryKey {
    pub fn is_field(&self) -> bool {
        matches!(self, EntryKey::Field(_))
    }

    /// The unquoted key text the entry is stored under after lowering.
    pub fn text(&self) -> String {
        match self {
            EntryKey::Field(name) | EntryKey::Str(name) => name.clone(),
            EntryKey::Int(n) => n.to_string(),
            EntryKey::Char(c) => c.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: EntryKey,
    pub value: Literal,
    pub line: usize,
    pub column: usize,
}

/// Parsed form of a snippet. Type prefixes (`Person { .. }`) are kept for
/// display only and never interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Object {
        type_path: Option<String>,
        entries: Vec<Entry>,
    },
    Array {
        type_path: Option<String>,
        elements: Vec<Literal>,
    },
    Str(String),
    Int(i128),
    Float(f64),
    Char(char),
    Path {
        name: String,
        line: usize,
        column: usize,
    },
    /// `&literal`; transparent once lowered.
    AddressOf(Box<Literal>),
}

const DECLARATION_KEYWORDS: &[&str] = &["let", "const", "static"];

/// Parses a snippet holding exactly one literal, optionally wrapped in a
/// `let`/`const`/`static` declaration.
pub fn parse_snippet(source: &str, max_depth: usize) -> Result<Literal, LiteralError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        max_depth,
    };
    parser.declaration()?;
    let literal = parser.literal(0)?;
    if parser.peek().kind == TokenKind::Semi {
        parser.bump();
    }
    parser.expect_eof()?;
    Ok(literal)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    max_depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token stream always ends with Eof, and Eof is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_at(token: &Token, message: impl Into<String>) -> LiteralError {
        LiteralError::syntax(token.line, token.column, message)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, LiteralError> {
        let token = self.bump();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(Self::error_at(&token, format!("expected {}, found {}", kind, token.kind)))
        }
    }

    fn expect_eof(&mut self) -> Result<(), LiteralError> {
        let token = self.peek();
        match token.kind.clone() {
            TokenKind::Eof => Ok(()),
            _ => Err(Self::error_at(
                token,
                format!("unexpected {} after the literal", token.kind),
            )),
        }
    }

    /// Consumes `let name [: Type] =` if present.
    fn declaration(&mut self) -> Result<(), LiteralError> {
        let is_declaration = matches!(
            &self.peek().kind,
            TokenKind::Ident(word) if DECLARATION_KEYWORDS.contains(&word.as_str())
        );
        if !is_declaration {
            return Ok(());
        }
        self.bump();
        if matches!(&self.peek().kind, TokenKind::Ident(word) if word == "mut") {
            self.bump();
        }
        let name = self.bump();
        if !matches!(name.kind, TokenKind::Ident(_)) {
            return Err(Self::error_at(
                &name,
                format!("expected a binding name, found {}", name.kind),
            ));
        }
        if self.peek().kind == TokenKind::Colon {
            self.bump();
            self.skip_type_annotation()?;
        }
        self.expect(TokenKind::Eq)?;
        Ok(())
    }

    /// Skips a balanced run of tokens up to the `=` that ends the annotation.
    fn skip_type_annotation(&mut self) -> Result<(), LiteralError> {
        let mut depth = 0usize;
        loop {
            let token = self.peek();
            match &token.kind {
                TokenKind::Eq if depth == 0 => return Ok(()),
                TokenKind::Eof => {
                    return Err(Self::error_at(token, "expected `=` after the type annotation"));
                }
                TokenKind::LBrace
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::Symbol('<') => depth += 1,
                TokenKind::RBrace
                | TokenKind::RBracket
                | TokenKind::RParen
                | TokenKind::Symbol('>') => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| Self::error_at(token, "unbalanced type annotation"))?;
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn literal(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        if depth > self.max_depth {
            return Err(Self::error_at(
                self.peek(),
                format!("literal nests deeper than {} levels", self.max_depth),
            ));
        }

        let token = self.bump();
        match token.kind.clone() {
            TokenKind::Amp => {
                if matches!(&self.peek().kind, TokenKind::Ident(word) if word == "mut") {
                    self.bump();
                }
                Ok(Literal::AddressOf(Box::new(self.literal(depth + 1)?)))
            }
            TokenKind::LBrace => self.object(None, depth),
            TokenKind::LBracket => self.array(None, depth),
            TokenKind::Str(value) => Ok(Literal::Str(value)),
            TokenKind::Int(value) => Ok(Literal::Int(value)),
            TokenKind::Float(value) => Ok(Literal::Float(value)),
            TokenKind::Char(value) => Ok(Literal::Char(value)),
            TokenKind::Ident(first) => self.path_literal(first, &token, depth),
            other => Err(Self::error_at(
                &token,
                format!("expected a literal, found {}", other),
            )),
        }
    }

    /// A path, optionally followed by a brace or bracket body or `vec!`.
    fn path_literal(&mut self, first: String, start: &Token, depth: usize) -> Result<Literal, LiteralError> {
        let mut name = first;
        while matches!(self.peek().kind, TokenKind::Dot | TokenKind::PathSep) {
            let separator = if self.bump().kind == TokenKind::Dot { "." } else { "::" };
            let segment = self.bump();
            match segment.kind.clone() {
                TokenKind::Ident(part) => {
                    name.push_str(separator);
                    name.push_str(&part);
                }
                other => {
                    return Err(Self::error_at(
                        &segment,
                        format!("expected an identifier after `{}`, found {}", separator, other),
                    ));
                }
            }
        }

        match self.peek().kind.clone() {
            TokenKind::Symbol('!') => {
                let bang = self.bump();
                if name == "vec" && self.peek().kind == TokenKind::LBracket {
                    self.bump();
                    self.array(None, depth)
                } else {
                    Err(Self::error_at(
                        &bang,
                        format!("macro `{}!` is not allowed in a literal", name),
                    ))
                }
            }
            TokenKind::LParen => Err(Self::error_at(
                self.peek(),
                format!("call to `{}` is not allowed in a literal", name),
            )),
            TokenKind::LBrace => {
                self.bump();
                self.object(Some(name), depth)
            }
            TokenKind::LBracket => {
                self.bump();
                self.array(Some(name), depth)
            }
            _ => Ok(Literal::Path {
                name,
                line: start.line,
                column: start.column,
            }),
        }
    }

    /// Parses entries after an opening `{`.
    fn object(&mut self, type_path: Option<String>, depth: usize) -> Result<Literal, LiteralError> {
        let mut entries: Vec<Entry> = Vec::new();
        loop {
            if self.peek().kind == TokenKind::RBrace {
                self.bump();
                break;
            }

            let key_token = self.bump();
            let key = match key_token.kind.clone() {
                TokenKind::Ident(name) => EntryKey::Field(name),
                TokenKind::Str(text) => EntryKey::Str(text),
                TokenKind::Int(n) => EntryKey::Int(n),
                TokenKind::Char(c) => EntryKey::Char(c),
                other => {
                    return Err(Self::error_at(
                        &key_token,
                        format!("expected a field name or key, found {}", other),
                    ));
                }
            };
            if let Some(first) = entries.first() {
                if first.key.is_field() != key.is_field() {
                    return Err(Self::error_at(
                        &key_token,
                        "record fields and map keys cannot be mixed in one literal",
                    ));
                }
            }

            self.expect(TokenKind::Colon)?;
            let value = self.literal(depth + 1)?;
            entries.push(Entry {
                key,
                value,
                line: key_token.line,
                column: key_token.column,
            });

            let separator = self.bump();
            match separator.kind.clone() {
                TokenKind::Comma => {}
                TokenKind::RBrace => break,
                other => {
                    return Err(Self::error_at(
                        &separator,
                        format!("expected `,` or `}}`, found {}", other),
                    ));
                }
            }
        }
        Ok(Literal::Object { type_path, entries })
    }

    /// Parses elements after an opening `[`.
    fn array(&mut self, type_path: Option<String>, depth: usize) -> Result<Literal, LiteralError> {
        let mut elements = Vec::new();
        loop {
            if self.peek().kind == TokenKind::RBracket {
                self.bump();
                break;
            }
            elements.push(self.literal(depth + 1)?);

            let separator = self.bump();
            match separator.kind.clone() {
                TokenKind::Comma => {}
                TokenKind::RBracket => break,
                TokenKind::Semi => {
                    return Err(Self::error_at(
                        &separator,
                        "repeat expressions like `[x; n]` are not allowed in a literal",
                    ));
                }
                other => {
                    return Err(Self::error_at(
                        &separator,
                        format!("expected `,` or `]`, found {}", other),
                    ));
                }
            }
        }
        if self.peek().kind == TokenKind::Dot {
            return Err(Self::error_at(self.peek(), "method calls are not allowed in a literal"));
        }
        Ok(Literal::Array { type_path, elements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Literal, LiteralError> {
        parse_snippet(source, 64)
    }

    #[test]
    fn test_parses_declaration_with_annotation() {
        let literal = parse("let p: HashMap<String, Vec<u8>> = { \"a\": [1, 2] };").unwrap();
        match literal {
            Literal::Object { entries, .. } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].key, EntryKey::Str("a".to_string()));
            }
            other => panic!("expected an object, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_typed_record_and_vec_macro() {
        let literal = parse("Person { name: \"a\", tags: vec![\"x\"], boss: &Boss { id: 1 } }").unwrap();
        let Literal::Object { type_path, entries } = literal else {
            panic!("expected an object");
        };
        assert_eq!(type_path.as_deref(), Some("Person"));
        assert!(matches!(entries[1].value, Literal::Array { .. }));
        assert!(matches!(entries[2].value, Literal::AddressOf(_)));
    }

    #[test]
    fn test_keeps_path_position() {
        let literal = parse("\n  config::DEFAULT").unwrap();
        assert_eq!(
            literal,
            Literal::Path {
                name: "config::DEFAULT".to_string(),
                line: 2,
                column: 3
            }
        );
    }

    #[test]
    fn test_rejects_calls_and_macros() {
        assert!(parse("compute(1, 2)").is_err());
        assert!(parse("format!(\"x\")").is_err());
        assert!(parse("[1, 2].len").is_err());
        assert!(parse("[0; 4]").is_err());
    }

    #[test]
    fn test_rejects_mixed_keys_and_trailing_tokens() {
        assert!(parse("{ a: 1, \"b\": 2 }").is_err());
        assert!(parse("{ a: 1 } { b: 2 }").is_err());
        assert!(parse("let x = 1 + 2").is_err());
    }

    #[test]
    fn test_enforces_depth_limit() {
        let nested = format!("{}1{}", "[".repeat(10), "]".repeat(10));
        assert!(parse_snippet(&nested, 10).is_ok());
        let error = parse_snippet(&nested, 9).unwrap_err();
        assert!(error.is_syntax());
    }
}
