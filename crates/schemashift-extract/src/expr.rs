//! Tokenizer and recursive-descent parser for column expressions.
//!
//! A column expression is a leading type call followed by chained
//! constraint calls, e.g. `varchar("email", { length: 320 }).notNull().unique()`.
//! Arguments are parsed into [`Value`]s; anything outside the literal
//! subset (arrow functions, tagged templates, member paths) is kept as
//! [`Value::Opaque`] source text.

use thiserror::Error;

/// Errors raised while parsing a column expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("unterminated literal starting at offset {offset}")]
    UnterminatedLiteral { offset: usize },
    #[error("expected {expected} at offset {offset}")]
    Expected {
        expected: &'static str,
        offset: usize,
    },
    #[error("unexpected trailing input at offset {offset}")]
    TrailingInput { offset: usize },
}

/// Parsed column expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExpr {
    /// Leading type call (`varchar(...)`).
    pub base: Call,
    /// Chained calls in source order (`.notNull()`, `.default(...)`).
    pub chain: Vec<Call>,
}

/// One call (or bare member) in a column expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Value>,
}

/// Argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Number(String),
    Bool(bool),
    Ident(String),
    Object(Vec<(String, Value)>),
    Array(Vec<Value>),
    /// Verbatim source text of an expression outside the literal subset.
    Opaque(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Number(value) => value.parse().ok(),
            _ => None,
        }
    }

    /// Look up `key` in an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl ColumnExpr {
    /// Name of the leading type call.
    pub fn type_name(&self) -> &str {
        &self.base.name
    }

    pub fn modifier(&self, name: &str) -> Option<&Call> {
        self.chain.iter().find(|call| call.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.modifier(name).is_some()
    }

    /// Column name passed as the first argument of the type call.
    pub fn column_name(&self) -> Option<&str> {
        self.base.args.first().and_then(Value::as_str)
    }

    /// Entry of the config object passed to the type call.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.base
            .args
            .iter()
            .find(|arg| matches!(arg, Value::Object(_)))
            .and_then(|config| config.get(key))
    }

    /// First argument of `.default(...)`.
    pub fn default_value(&self) -> Option<&Value> {
        self.modifier("default").and_then(|call| call.args.first())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Ident(String),
    Str(String),
    Template,
    Number(String),
    Arrow,
    Punct(char),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, ch) = chars[i];

        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let mut j = i;
            while j < chars.len() && (chars[j].1.is_alphanumeric() || matches!(chars[j].1, '_' | '$'))
            {
                j += 1;
            }
            let end = offset_at(&chars, j, src.len());
            tokens.push(Token {
                kind: TokenKind::Ident(src[start..end].to_string()),
                start,
                end,
            });
            i = j;
            continue;
        }

        if ch.is_ascii_digit() {
            let mut j = i;
            while j < chars.len() && (chars[j].1.is_ascii_digit() || matches!(chars[j].1, '.' | '_'))
            {
                j += 1;
            }
            let end = offset_at(&chars, j, src.len());
            tokens.push(Token {
                kind: TokenKind::Number(src[start..end].replace('_', "")),
                start,
                end,
            });
            i = j;
            continue;
        }

        if matches!(ch, '"' | '\'' | '`') {
            let mut value = String::new();
            let mut j = i + 1;
            let mut closed = false;
            while j < chars.len() {
                let c = chars[j].1;
                if c == '\\' {
                    if let Some(&(_, next)) = chars.get(j + 1) {
                        value.push(match next {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                    }
                    j += 2;
                    continue;
                }
                if c == ch {
                    closed = true;
                    j += 1;
                    break;
                }
                value.push(c);
                j += 1;
            }
            if !closed {
                return Err(ExprError::UnterminatedLiteral { offset: start });
            }
            let end = offset_at(&chars, j, src.len());
            let kind = if ch == '`' {
                TokenKind::Template
            } else {
                TokenKind::Str(value)
            };
            tokens.push(Token { kind, start, end });
            i = j;
            continue;
        }

        if ch == '=' && chars.get(i + 1).map(|(_, c)| *c) == Some('>') {
            tokens.push(Token {
                kind: TokenKind::Arrow,
                start,
                end: start + 2,
            });
            i += 2;
            continue;
        }

        if "(){}[],:.<>-=!|&?+*/;%".contains(ch) {
            tokens.push(Token {
                kind: TokenKind::Punct(ch),
                start,
                end: start + ch.len_utf8(),
            });
            i += 1;
            continue;
        }

        return Err(ExprError::UnexpectedChar { ch, offset: start });
    }

    Ok(tokens)
}

fn offset_at(chars: &[(usize, char)], idx: usize, len: usize) -> usize {
    chars.get(idx).map(|(offset, _)| *offset).unwrap_or(len)
}

/// Parse a raw column expression.
pub fn parse_column_expr(src: &str) -> Result<ColumnExpr, ExprError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        src,
        tokens,
        pos: 0,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        Some(token) => Err(ExprError::TrailingInput {
            offset: token.start,
        }),
        None => Ok(expr),
    }
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_punct(&self, ch: char) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Punct(c), .. }) if *c == ch)
    }

    fn offset(&self) -> usize {
        self.peek().map(|token| token.start).unwrap_or(self.src.len())
    }

    fn expect_punct(&mut self, ch: char, expected: &'static str) -> Result<(), ExprError> {
        if self.peek_punct(ch) {
            self.pos += 1;
            Ok(())
        } else {
            Err(ExprError::Expected {
                expected,
                offset: self.offset(),
            })
        }
    }

    fn ident(&mut self) -> Result<String, ExprError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(ExprError::Expected {
                expected: "identifier",
                offset: self.offset(),
            }),
        }
    }

    fn expr(&mut self) -> Result<ColumnExpr, ExprError> {
        let name = self.ident()?;
        self.skip_generic()?;
        if !self.peek_punct('(') {
            return Err(ExprError::Expected {
                expected: "`(`",
                offset: self.offset(),
            });
        }
        let base = Call {
            name,
            args: self.args()?,
        };

        let mut chain = Vec::new();
        while self.peek_punct('.') {
            self.pos += 1;
            let name = self.ident()?;
            self.skip_generic()?;
            let args = if self.peek_punct('(') {
                self.args()?
            } else {
                Vec::new()
            };
            chain.push(Call { name, args });
        }

        Ok(ColumnExpr { base, chain })
    }

    /// Skip a `<...>` type argument list.
    fn skip_generic(&mut self) -> Result<(), ExprError> {
        if !self.peek_punct('<') {
            return Ok(());
        }
        let start = self.offset();
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Punct('<') => depth += 1,
                TokenKind::Punct('>') => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(ExprError::UnterminatedLiteral { offset: start })
    }

    fn args(&mut self) -> Result<Vec<Value>, ExprError> {
        self.expect_punct('(', "`(`")?;
        let mut args = Vec::new();
        loop {
            if self.peek_punct(')') {
                self.pos += 1;
                return Ok(args);
            }
            args.push(self.value()?);
            if self.peek_punct(',') {
                self.pos += 1;
            } else if !self.peek_punct(')') {
                return Err(ExprError::Expected {
                    expected: "`,` or `)`",
                    offset: self.offset(),
                });
            }
        }
    }

    fn value(&mut self) -> Result<Value, ExprError> {
        let start = self.pos;
        if let Some(value) = self.literal() {
            if self.at_value_end() {
                return Ok(value);
            }
        }
        self.pos = start;
        self.opaque()
    }

    fn at_value_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(token) => matches!(token.kind, TokenKind::Punct(',' | ')' | ']' | '}')),
        }
    }

    /// Parse a value in the literal subset, or `None` to fall back to opaque.
    fn literal(&mut self) -> Option<Value> {
        let token = self.peek()?.clone();
        match token.kind {
            TokenKind::Str(value) => {
                self.pos += 1;
                Some(Value::Str(value))
            }
            TokenKind::Number(value) => {
                self.pos += 1;
                Some(Value::Number(value))
            }
            TokenKind::Punct('-') => {
                self.pos += 1;
                match self.peek()?.kind.clone() {
                    TokenKind::Number(value) => {
                        self.pos += 1;
                        Some(Value::Number(format!("-{value}")))
                    }
                    _ => None,
                }
            }
            TokenKind::Ident(name) => {
                self.pos += 1;
                Some(match name.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => Value::Ident(name),
                })
            }
            TokenKind::Punct('{') => {
                self.pos += 1;
                let mut entries = Vec::new();
                loop {
                    if self.peek_punct('}') {
                        self.pos += 1;
                        return Some(Value::Object(entries));
                    }
                    let key = match self.peek()?.kind.clone() {
                        TokenKind::Ident(key) | TokenKind::Str(key) | TokenKind::Number(key) => key,
                        _ => return None,
                    };
                    self.pos += 1;
                    if !self.peek_punct(':') {
                        return None;
                    }
                    self.pos += 1;
                    let value = self.nested_value()?;
                    entries.push((key, value));
                    if self.peek_punct(',') {
                        self.pos += 1;
                    } else if !self.peek_punct('}') {
                        return None;
                    }
                }
            }
            TokenKind::Punct('[') => {
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    if self.peek_punct(']') {
                        self.pos += 1;
                        return Some(Value::Array(items));
                    }
                    items.push(self.nested_value()?);
                    if self.peek_punct(',') {
                        self.pos += 1;
                    } else if !self.peek_punct(']') {
                        return None;
                    }
                }
            }
            _ => None,
        }
    }

    fn nested_value(&mut self) -> Option<Value> {
        self.value().ok()
    }

    /// Consume a balanced token run up to the next `,` or closing bracket
    /// at depth zero and keep its source text.
    fn opaque(&mut self) -> Result<Value, ExprError> {
        let first = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Punct(',') if depth == 0 => break,
                _ => {}
            }
            self.pos += 1;
        }

        if self.pos == first {
            return Err(ExprError::Expected {
                expected: "value",
                offset: self.offset(),
            });
        }
        let start = self.tokens[first].start;
        let end = self.tokens[self.pos - 1].end;
        Ok(Value::Opaque(self.src[start..end].to_string()))
    }
}
