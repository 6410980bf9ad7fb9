//! Formula language for dependent variables and constants.
//!
//! Formulas are small arithmetic expressions over JSON scalars: numbers,
//! strings, booleans, variable references, `+ - * / %`, unary minus,
//! parentheses, and a fixed set of functions. Parsing happens once when the
//! catalog is built; evaluation is a tree walk over a name/value scope.

use std::collections::{BTreeMap, BTreeSet};

use des_core::errors::{DesError, ErrorInfo};
use serde_json::Value;

/// Binary operators in precedence order (additive below multiplicative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Numeric addition or string concatenation.
    Add,
    /// Numeric subtraction.
    Sub,
    /// Numeric multiplication.
    Mul,
    /// Numeric division.
    Div,
    /// Numeric remainder.
    Rem,
}

/// Built-in functions callable from formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    /// Smaller of two numbers.
    Min,
    /// Larger of two numbers.
    Max,
    /// `base` raised to `exponent`.
    Pow,
    /// Absolute value.
    Abs,
    /// Largest integer not above the argument.
    Floor,
    /// Smallest integer not below the argument.
    Ceil,
    /// Nearest integer, half away from zero.
    Round,
    /// Square root.
    Sqrt,
}

impl Func {
    fn lookup(name: &str) -> Option<(Self, usize)> {
        match name {
            "min" => Some((Func::Min, 2)),
            "max" => Some((Func::Max, 2)),
            "pow" => Some((Func::Pow, 2)),
            "abs" => Some((Func::Abs, 1)),
            "floor" => Some((Func::Floor, 1)),
            "ceil" => Some((Func::Ceil, 1)),
            "round" => Some((Func::Round, 1)),
            "sqrt" => Some((Func::Sqrt, 1)),
            _ => None,
        }
    }
}

/// Parsed formula tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// String literal.
    Str(String),
    /// Boolean literal.
    Bool(bool),
    /// Reference to a variable or constant by name.
    Var(String),
    /// Negation of a sub-expression.
    Neg(Box<Expr>),
    /// Binary operation on two sub-expressions.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Call to a built-in function.
    Call(Func, Vec<Expr>),
}

impl Expr {
    /// Collects every variable name referenced by this expression.
    pub fn references(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) | Expr::Str(_) | Expr::Bool(_) => {}
            Expr::Var(name) => {
                out.insert(name.clone());
            }
            Expr::Neg(inner) => inner.collect_references(out),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_references(out);
                rhs.collect_references(out);
            }
            Expr::Call(_, args) => {
                for arg in args {
                    arg.collect_references(out);
                }
            }
        }
    }

    /// Evaluates the expression against a name/value scope.
    pub fn eval(&self, scope: &BTreeMap<String, Value>) -> Result<Value, DesError> {
        match self {
            Expr::Number(n) => Ok(number_value(*n)),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Var(name) => scope.get(name).cloned().ok_or_else(|| {
                DesError::Resolve(
                    ErrorInfo::new("missing-dependency", "formula references an undefined name")
                        .with_context("name", name.clone()),
                )
            }),
            Expr::Neg(inner) => {
                let value = inner.eval(scope)?;
                Ok(number_value(-as_number(&value, "unary minus")?))
            }
            Expr::Binary(op, lhs, rhs) => {
                let left = lhs.eval(scope)?;
                let right = rhs.eval(scope)?;
                eval_binary(*op, &left, &right)
            }
            Expr::Call(func, args) => {
                let mut numbers = Vec::with_capacity(args.len());
                for arg in args {
                    numbers.push(as_number(&arg.eval(scope)?, "function argument")?);
                }
                eval_call(*func, &numbers)
            }
        }
    }
}

fn eval_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, DesError> {
    if op == BinaryOp::Add {
        if let (Value::String(a), Value::String(b)) = (left, right) {
            return Ok(Value::String(format!("{a}{b}")));
        }
    }
    let a = as_number(left, binary_name(op))?;
    let b = as_number(right, binary_name(op))?;
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Rem => {
            if b == 0.0 {
                return Err(DesError::Resolve(
                    ErrorInfo::new("division-by-zero", "formula divides by zero")
                        .with_context("dividend", a.to_string()),
                ));
            }
            if op == BinaryOp::Div {
                a / b
            } else {
                a % b
            }
        }
    };
    Ok(number_value(result))
}

fn eval_call(func: Func, args: &[f64]) -> Result<Value, DesError> {
    let result = match func {
        Func::Min => args[0].min(args[1]),
        Func::Max => args[0].max(args[1]),
        Func::Pow => args[0].powf(args[1]),
        Func::Abs => args[0].abs(),
        Func::Floor => args[0].floor(),
        Func::Ceil => args[0].ceil(),
        Func::Round => args[0].round(),
        Func::Sqrt => {
            if args[0] < 0.0 {
                return Err(DesError::Resolve(
                    ErrorInfo::new("sqrt-negative", "sqrt of a negative value")
                        .with_context("argument", args[0].to_string()),
                ));
            }
            args[0].sqrt()
        }
    };
    Ok(number_value(result))
}

fn binary_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "addition",
        BinaryOp::Sub => "subtraction",
        BinaryOp::Mul => "multiplication",
        BinaryOp::Div => "division",
        BinaryOp::Rem => "remainder",
    }
}

fn as_number(value: &Value, operation: &str) -> Result<f64, DesError> {
    value.as_f64().ok_or_else(|| {
        DesError::Resolve(
            ErrorInfo::new("type-mismatch", "formula operand is not numeric")
                .with_context("operation", operation.to_string())
                .with_context("value", value.to_string()),
        )
    })
}

/// Converts an evaluation result back to a JSON number, keeping integral
/// results as integers so resolved scopes stay close to their declarations.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
}

fn syntax_error(message: impl Into<String>, source: &str) -> DesError {
    DesError::Resolve(
        ErrorInfo::new("formula-syntax", message).with_context("formula", source.to_string()),
    )
}

fn lex(source: &str) -> Result<Vec<Token>, DesError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some('"') => text.push('"'),
                            Some('\\') => text.push('\\'),
                            _ => return Err(syntax_error("invalid string escape", source)),
                        },
                        other => text.push(other),
                    }
                }
                if !closed {
                    return Err(syntax_error("unterminated string literal", source));
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut text = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' {
                        text.push(d);
                        chars.next();
                        if (d == 'e' || d == 'E') && matches!(chars.peek(), Some(&'+') | Some(&'-'))
                        {
                            if let Some(sign) = chars.next() {
                                text.push(sign);
                            }
                        }
                    } else {
                        break;
                    }
                }
                let value: f64 = text
                    .parse()
                    .map_err(|_| syntax_error(format!("invalid number `{text}`"), source))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut text = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(text));
            }
            other => {
                return Err(syntax_error(format!("unexpected character `{other}`"), source));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    cursor: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), DesError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            _ => Err(syntax_error(format!("expected {what}"), self.source)),
        }
    }

    fn expression(&mut self) -> Result<Expr, DesError> {
        let mut node = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.cursor += 1;
            let rhs = self.term()?;
            node = Expr::Binary(op, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<Expr, DesError> {
        let mut node = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.cursor += 1;
            let rhs = self.factor()?;
            node = Expr::Binary(op, Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn factor(&mut self) -> Result<Expr, DesError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.cursor += 1;
            let inner = self.factor()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, DesError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    return self.call(&name);
                }
                match name.as_str() {
                    "true" => Ok(Expr::Bool(true)),
                    "false" => Ok(Expr::Bool(false)),
                    _ => Ok(Expr::Var(name)),
                }
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(Token::RParen, "closing parenthesis")?;
                Ok(inner)
            }
            _ => Err(syntax_error("expected a value", self.source)),
        }
    }

    fn call(&mut self, name: &str) -> Result<Expr, DesError> {
        let (func, arity) = Func::lookup(name)
            .ok_or_else(|| syntax_error(format!("unknown function `{name}`"), self.source))?;
        self.expect(Token::LParen, "opening parenthesis")?;
        let mut args = Vec::new();
        if !matches!(self.peek(), Some(Token::RParen)) {
            loop {
                args.push(self.expression()?);
                match self.peek() {
                    Some(Token::Comma) => {
                        self.cursor += 1;
                    }
                    _ => break,
                }
            }
        }
        self.expect(Token::RParen, "closing parenthesis")?;
        if args.len() != arity {
            return Err(syntax_error(
                format!("`{name}` takes {arity} argument(s), got {}", args.len()),
                self.source,
            ));
        }
        Ok(Expr::Call(func, args))
    }
}

/// Parses a formula into an expression tree.
pub fn parse(source: &str) -> Result<Expr, DesError> {
    let tokens = lex(source)?;
    if tokens.is_empty() {
        return Err(syntax_error("empty formula", source));
    }
    let mut parser = Parser {
        tokens,
        cursor: 0,
        source,
    };
    let expr = parser.expression()?;
    if parser.cursor != parser.tokens.len() {
        return Err(syntax_error("trailing tokens after expression", source));
    }
    Ok(expr)
}
