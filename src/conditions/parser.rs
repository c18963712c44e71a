//! condition parser - converts expression text to condition AST
//!
//! supports:
//! - logical operators: and / &&, or / ||, not / !
//! - comparison operators: ==, !=, >, >=, <, <= (multiple forms)
//! - set operators: in, not in
//! - parentheses for grouping
//! - string ('..' or ".."), number, bool and null literals
//! - field identifiers, which may contain '-' and '.' (e.g. `Q2-KM`, `Q5-ModelData.year`)

use super::types::{CompareOp, Comparison, Condition, Operand, Value};

/// deepest nesting of `(`, `[` and `not`/`!` a condition may use
pub const MAX_NESTING: usize = 64;

/// error type for parsing conditions
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    /// character offset into the source text
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at column {}: {}", self.position + 1, self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    /// symbolic operators: == != > >= < <= ! && ||
    Symbol(&'static str),
    Str(String),
    Int(i64),
    Float(f64),
    Word(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Comma => write!(f, "','"),
            Token::Symbol(s) => write!(f, "'{}'", s),
            Token::Str(s) => write!(f, "string {:?}", s),
            Token::Int(n) => write!(f, "number {}", n),
            Token::Float(n) => write!(f, "number {}", n),
            Token::Word(w) => write!(f, "'{}'", w),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    position: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

fn tokenize(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let token = match c {
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            '[' => {
                i += 1;
                Token::LBracket
            }
            ']' => {
                i += 1;
                Token::RBracket
            }
            ',' => {
                i += 1;
                Token::Comma
            }
            '=' | '!' | '<' | '>' => {
                let next = chars.get(i + 1).copied();
                let (symbol, width) = match (c, next) {
                    ('=', Some('=')) => ("==", 2),
                    ('!', Some('=')) => ("!=", 2),
                    ('<', Some('=')) => ("<=", 2),
                    ('>', Some('=')) => (">=", 2),
                    ('!', _) => ("!", 1),
                    ('<', _) => ("<", 1),
                    ('>', _) => (">", 1),
                    _ => {
                        return Err(ParseError::new("unexpected '=', did you mean '=='?", start))
                    }
                };
                i += width;
                Token::Symbol(symbol)
            }
            '&' | '|' => {
                if chars.get(i + 1) != Some(&c) {
                    return Err(ParseError::new(
                        format!("unexpected '{}', did you mean '{}{}'?", c, c, c),
                        start,
                    ));
                }
                i += 2;
                Token::Symbol(if c == '&' { "&&" } else { "||" })
            }
            '\'' | '"' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(ParseError::new("unterminated string", start)),
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            let escaped = chars
                                .get(i + 1)
                                .ok_or_else(|| ParseError::new("unterminated string", start))?;
                            s.push(match escaped {
                                'n' => '\n',
                                't' => '\t',
                                other => *other,
                            });
                            i += 2;
                        }
                        Some(&ch) => {
                            s.push(ch);
                            i += 1;
                        }
                    }
                }
                Token::Str(s)
            }
            c if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                if text.contains('.') {
                    let f = text
                        .parse::<f64>()
                        .map_err(|_| ParseError::new(format!("invalid number '{}'", text), start))?;
                    Token::Float(f)
                } else {
                    let n = text
                        .parse::<i64>()
                        .map_err(|_| ParseError::new(format!("invalid number '{}'", text), start))?;
                    Token::Int(n)
                }
            }
            c if is_ident_start(c) => {
                while i < chars.len() && is_ident_continue(chars[i]) {
                    i += 1;
                }
                Token::Word(chars[start..i].iter().collect())
            }
            other => {
                return Err(ParseError::new(
                    format!("unexpected character '{}'", other),
                    start,
                ))
            }
        };

        tokens.push(Spanned {
            token,
            position: start,
        });
    }

    Ok(tokens)
}

/// parse condition text into a condition AST
///
/// # Arguments
/// * `src` - the condition text, e.g. `Color == "Red" and Q2-KM > 100000`
///
/// # Returns
/// * `Ok(Condition)` - the parsed condition
/// * `Err(ParseError)` - if parsing fails
pub fn parse_condition(src: &str) -> Result<Condition, ParseError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ParseError::new("empty condition", 0));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        end: src.chars().count(),
        depth: 0,
    };
    let condition = parser.parse_or()?;

    if let Some(extra) = parser.peek() {
        return Err(ParseError::new(
            format!("unexpected {} after end of expression", extra.token),
            extra.position,
        ));
    }

    Ok(condition)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
    /// open groups on the current descent
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|s| &s.token)
    }

    fn position(&self) -> usize {
        self.peek().map(|s| s.position).unwrap_or(self.end)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(
                format!("condition nested too deeply (limit {})", MAX_NESTING),
                self.position(),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn at_word(&self, word: &str) -> bool {
        matches!(self.peek_token(), Some(Token::Word(w)) if w == word)
    }

    fn at_symbol(&self, symbol: &str) -> bool {
        matches!(self.peek_token(), Some(Token::Symbol(s)) if *s == symbol)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        let position = self.position();
        match self.advance() {
            Some(s) if s.token == expected => Ok(()),
            Some(s) => Err(ParseError::new(
                format!("expected {}, found {}", expected, s.token),
                position,
            )),
            None => Err(ParseError::new(
                format!("expected {}, found end of input", expected),
                position,
            )),
        }
    }

    fn parse_or(&mut self) -> Result<Condition, ParseError> {
        let mut terms = vec![self.parse_and()?];
        while self.at_word("or") || self.at_symbol("||") {
            self.advance();
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Condition::Any(terms)
        })
    }

    fn parse_and(&mut self) -> Result<Condition, ParseError> {
        let mut terms = vec![self.parse_unary()?];
        while self.at_word("and") || self.at_symbol("&&") {
            self.advance();
            terms.push(self.parse_unary()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Condition::All(terms)
        })
    }

    fn parse_unary(&mut self) -> Result<Condition, ParseError> {
        if self.at_word("not") || self.at_symbol("!") {
            self.enter()?;
            self.advance();
            let inner = self.parse_unary()?;
            self.leave();
            return Ok(Condition::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Condition, ParseError> {
        if matches!(self.peek_token(), Some(Token::LParen)) {
            self.enter()?;
            self.advance();
            let inner = self.parse_or()?;
            self.expect(Token::RParen)?;
            self.leave();
            return Ok(inner);
        }

        let left = self.parse_operand()?;

        // `not in` is the only two-word operator
        if self.at_word("not")
            && matches!(self.tokens.get(self.pos + 1).map(|s| &s.token), Some(Token::Word(w)) if w == "in")
        {
            self.pos += 2;
            let right = self.parse_operand()?;
            let membership = Comparison::new(left, CompareOp::In, right);
            return Ok(Condition::Not(Box::new(Condition::Compare(membership))));
        }

        let op = match self.peek_token() {
            Some(Token::Symbol(s)) => CompareOp::parse(s),
            Some(Token::Word(w)) => CompareOp::parse(w),
            _ => None,
        };

        match op {
            Some(op) => {
                self.advance();
                let right = self.parse_operand()?;
                Ok(Condition::Compare(Comparison::new(left, op, right)))
            }
            None => Ok(Condition::Truthy(left)),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        let position = self.position();
        let Some(spanned) = self.advance() else {
            return Err(ParseError::new("expected a value, found end of input", position));
        };

        match spanned.token {
            Token::Str(s) => Ok(Operand::Literal(Value::String(s))),
            Token::Int(n) => Ok(Operand::Literal(Value::Number(n))),
            Token::Float(f) => Ok(Operand::Literal(Value::Float(f))),
            Token::LBracket => {
                self.enter()?;
                let values = self.parse_list()?;
                self.leave();
                Ok(Operand::Literal(Value::List(values)))
            }
            Token::Word(w) => Ok(match w.as_str() {
                "true" | "True" => Operand::Literal(Value::Bool(true)),
                "false" | "False" => Operand::Literal(Value::Bool(false)),
                "null" | "None" => Operand::Literal(Value::Null),
                "and" | "or" | "not" | "in" => {
                    return Err(ParseError::new(
                        format!("expected a value, found keyword '{}'", w),
                        position,
                    ))
                }
                _ => Operand::Field(w),
            }),
            other => Err(ParseError::new(
                format!("expected a value, found {}", other),
                position,
            )),
        }
    }

    fn parse_list(&mut self) -> Result<Vec<Value>, ParseError> {
        let mut values = Vec::new();

        if matches!(self.peek_token(), Some(Token::RBracket)) {
            self.advance();
            return Ok(values);
        }

        loop {
            let position = self.position();
            match self.parse_operand()? {
                Operand::Literal(v) => values.push(v),
                Operand::Field(name) => {
                    return Err(ParseError::new(
                        format!("list items must be literals, found field '{}'", name),
                        position,
                    ))
                }
            }

            let position = self.position();
            match self.advance().map(|s| s.token) {
                Some(Token::Comma) => continue,
                Some(Token::RBracket) => break,
                Some(other) => {
                    return Err(ParseError::new(
                        format!("expected ',' or ']', found {}", other),
                        position,
                    ))
                }
                None => return Err(ParseError::new("unterminated list", position)),
            }
        }

        Ok(values)
    }
}
