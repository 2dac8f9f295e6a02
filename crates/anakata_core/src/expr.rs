//! Safe arithmetic expressions for formula surfaces
//!
//! Formula text is parsed into an [`Expr`] tree and evaluated directly; no
//! code is generated or executed. The grammar is the usual one:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := '-' unary | power
//! power  := atom ('^' unary)?
//! atom   := number | name | name '(' expr (',' expr)* ')' | '(' expr ')'
//! ```
//!
//! `^` is right-associative and binds tighter than unary minus, so `-u^2`
//! is `-(u^2)`. Names are the variables `u`, `v`, `w` and the constants
//! `pi`, `tau`, `e`.
//!
//! Nesting is limited to [`MAX_DEPTH`] levels, counting parentheses,
//! operator chains and unary minus, so hostile text fails to parse instead
//! of exhausting the stack.

use std::f32::consts::{E, PI, TAU};
use std::fmt;

use anakata_math::Vec4;
use serde::{Serialize, Deserialize};

/// Deepest expression tree [`Expr::parse`] accepts
pub const MAX_DEPTH: usize = 256;

/// What went wrong while parsing an expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionErrorKind {
    UnexpectedCharacter(char),
    UnexpectedToken(String),
    UnexpectedEnd,
    UnknownIdentifier(String),
    UnknownFunction(String),
    WrongArity {
        function: &'static str,
        expected: usize,
        found: usize,
    },
    UnbalancedParenthesis,
    InvalidNumber(String),
    TooDeep,
}

/// A parse error and the byte offset where it was detected
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionError {
    pub kind: ExpressionErrorKind,
    pub position: usize,
}

impl ExpressionError {
    fn new(kind: ExpressionErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionErrorKind::UnexpectedCharacter(c) => write!(f, "unexpected character '{}'", c)?,
            ExpressionErrorKind::UnexpectedToken(t) => write!(f, "unexpected '{}'", t)?,
            ExpressionErrorKind::UnexpectedEnd => write!(f, "unexpected end of expression")?,
            ExpressionErrorKind::UnknownIdentifier(name) => write!(f, "unknown identifier '{}'", name)?,
            ExpressionErrorKind::UnknownFunction(name) => write!(f, "unknown function '{}'", name)?,
            ExpressionErrorKind::WrongArity { function, expected, found } => write!(
                f,
                "{}() takes {} argument(s) but {} were given",
                function, expected, found
            )?,
            ExpressionErrorKind::UnbalancedParenthesis => write!(f, "unbalanced parenthesis")?,
            ExpressionErrorKind::InvalidNumber(text) => write!(f, "invalid number '{}'", text)?,
            ExpressionErrorKind::TooDeep => write!(f, "expression nested deeper than {} levels", MAX_DEPTH)?,
        }
        write!(f, " at byte {}", self.position)
    }
}

impl std::error::Error for ExpressionError {}

/// Surface parameter referenced by an expression
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variable {
    U,
    V,
    W,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Built-in functions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Abs,
    Exp,
    Ln,
    Floor,
    Ceil,
    Min,
    Max,
    Pow,
    Atan2,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" => Func::Asin,
            "acos" => Func::Acos,
            "atan" => Func::Atan,
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            "exp" => Func::Exp,
            "ln" => Func::Ln,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            "min" => Func::Min,
            "max" => Func::Max,
            "pow" => Func::Pow,
            "atan2" => Func::Atan2,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Sqrt => "sqrt",
            Func::Abs => "abs",
            Func::Exp => "exp",
            Func::Ln => "ln",
            Func::Floor => "floor",
            Func::Ceil => "ceil",
            Func::Min => "min",
            Func::Max => "max",
            Func::Pow => "pow",
            Func::Atan2 => "atan2",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Func::Min | Func::Max | Func::Pow | Func::Atan2 => 2,
            _ => 1,
        }
    }

    fn apply(self, args: &[f32]) -> f32 {
        let a = args[0];
        match self {
            Func::Sin => a.sin(),
            Func::Cos => a.cos(),
            Func::Tan => a.tan(),
            Func::Asin => a.asin(),
            Func::Acos => a.acos(),
            Func::Atan => a.atan(),
            Func::Sqrt => a.sqrt(),
            Func::Abs => a.abs(),
            Func::Exp => a.exp(),
            Func::Ln => a.ln(),
            Func::Floor => a.floor(),
            Func::Ceil => a.ceil(),
            Func::Min => a.min(args[1]),
            Func::Max => a.max(args[1]),
            Func::Pow => a.powf(args[1]),
            Func::Atan2 => a.atan2(args[1]),
        }
    }
}

/// A parsed expression tree
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(f32),
    Var(Variable),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// Evaluates to NaN unless given exactly [`Func::arity`] arguments
    Call(Func, Vec<Expr>),
}

impl Expr {
    /// Parse expression text
    pub fn parse(text: &str) -> Result<Self, ExpressionError> {
        let tokens = tokenize(text)?;
        let mut parser = Parser { tokens: &tokens, pos: 0, end: text.len(), depth: 0 };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some((Token::RParen, at)) => Err(ExpressionError::new(ExpressionErrorKind::UnbalancedParenthesis, at)),
            Some((token, at)) => Err(ExpressionError::new(ExpressionErrorKind::UnexpectedToken(token.to_string()), at)),
        }
    }

    /// Evaluate with the given parameter values
    pub fn eval(&self, u: f32, v: f32, w: f32) -> f32 {
        match self {
            Expr::Num(n) => *n,
            Expr::Var(Variable::U) => u,
            Expr::Var(Variable::V) => v,
            Expr::Var(Variable::W) => w,
            Expr::Neg(inner) => -inner.eval(u, v, w),
            Expr::Binary(op, a, b) => {
                let (a, b) = (a.eval(u, v, w), b.eval(u, v, w));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => a.powf(b),
                }
            }
            Expr::Call(func, args) => {
                if args.len() != func.arity() {
                    return f32::NAN;
                }
                let mut values = [0.0f32; 2];
                for (slot, arg) in values.iter_mut().zip(args) {
                    *slot = arg.eval(u, v, w);
                }
                func.apply(&values[..args.len()])
            }
        }
    }

    /// Whether the expression references `variable`
    pub fn uses(&self, variable: Variable) -> bool {
        match self {
            Expr::Num(_) => false,
            Expr::Var(v) => *v == variable,
            Expr::Neg(inner) => inner.uses(variable),
            Expr::Binary(_, a, b) => a.uses(variable) || b.uses(variable),
            Expr::Call(_, args) => args.iter().any(|a| a.uses(variable)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Num(f32),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{}", n),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Op(c) => write!(f, "{}", c),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    let exponent_sign = (d == '-' || d == '+')
                        && text[start..i].ends_with(&['e', 'E'][..]);
                    if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' || exponent_sign {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &text[start..end];
                let value = literal.parse::<f32>().map_err(|_| {
                    ExpressionError::new(ExpressionErrorKind::InvalidNumber(literal.to_string()), start)
                })?;
                tokens.push((Token::Num(value), start));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Ident(text[start..end].to_string()), start));
            }
            '+' | '-' | '*' | '/' | '^' => {
                tokens.push((Token::Op(c), start));
                chars.next();
            }
            '(' => {
                tokens.push((Token::LParen, start));
                chars.next();
            }
            ')' => {
                tokens.push((Token::RParen, start));
                chars.next();
            }
            ',' => {
                tokens.push((Token::Comma, start));
                chars.next();
            }
            other => {
                return Err(ExpressionError::new(ExpressionErrorKind::UnexpectedCharacter(other), start));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<(&Token, usize)> {
        self.tokens.get(self.pos).map(|(t, at)| (t, *at))
    }

    fn next(&mut self) -> Option<(&Token, usize)> {
        let token = self.tokens.get(self.pos).map(|(t, at)| (t, *at));
        self.pos += 1;
        token
    }

    /// Go one level deeper, failing at the current token past [`MAX_DEPTH`]
    fn enter(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let at = self.peek().map_or(self.end, |(_, at)| at);
            return Err(ExpressionError::new(ExpressionErrorKind::TooDeep, at));
        }
        Ok(())
    }

    fn eat_op(&mut self, ops: &[char]) -> Option<char> {
        let op = match self.peek() {
            Some((Token::Op(c), _)) if ops.contains(c) => *c,
            _ => return None,
        };
        self.pos += 1;
        Some(op)
    }

    fn expr(&mut self) -> Result<Expr, ExpressionError> {
        let depth = self.depth;
        let mut lhs = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            // each link of the chain is one more level of the tree
            self.enter()?;
            let rhs = self.term()?;
            let op = if op == '+' { BinOp::Add } else { BinOp::Sub };
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ExpressionError> {
        let depth = self.depth;
        let mut lhs = self.unary()?;
        while let Some(op) = self.eat_op(&['*', '/']) {
            self.enter()?;
            let rhs = self.unary()?;
            let op = if op == '*' { BinOp::Mul } else { BinOp::Div };
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExpressionError> {
        self.enter()?;
        let expr = if self.eat_op(&['-']).is_some() {
            self.unary().map(|inner| Expr::Neg(Box::new(inner)))
        } else {
            self.power()
        };
        self.depth -= 1;
        expr
    }

    fn power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.atom()?;
        if self.eat_op(&['^']).is_some() {
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ExpressionError> {
        let end = self.end;
        let (token, at) = match self.next() {
            Some((token, at)) => (token.clone(), at),
            None => return Err(ExpressionError::new(ExpressionErrorKind::UnexpectedEnd, end)),
        };
        match token {
            Token::Num(n) => Ok(Expr::Num(n)),
            Token::LParen => {
                let inner = self.expr()?;
                self.close_paren(at)?;
                Ok(inner)
            }
            Token::Ident(name) => {
                if matches!(self.peek(), Some((Token::LParen, _))) {
                    self.pos += 1;
                    self.call(&name, at)
                } else {
                    named_value(&name, at)
                }
            }
            other => Err(ExpressionError::new(ExpressionErrorKind::UnexpectedToken(other.to_string()), at)),
        }
    }

    fn call(&mut self, name: &str, at: usize) -> Result<Expr, ExpressionError> {
        let func = Func::from_name(name)
            .ok_or_else(|| ExpressionError::new(ExpressionErrorKind::UnknownFunction(name.to_string()), at))?;
        let mut args = vec![self.expr()?];
        while matches!(self.peek(), Some((Token::Comma, _))) {
            self.pos += 1;
            args.push(self.expr()?);
        }
        self.close_paren(at)?;
        if args.len() != func.arity() {
            return Err(ExpressionError::new(
                ExpressionErrorKind::WrongArity {
                    function: func.name(),
                    expected: func.arity(),
                    found: args.len(),
                },
                at,
            ));
        }
        Ok(Expr::Call(func, args))
    }

    fn close_paren(&mut self, open: usize) -> Result<(), ExpressionError> {
        match self.next() {
            Some((Token::RParen, _)) => Ok(()),
            Some((token, at)) => Err(ExpressionError::new(ExpressionErrorKind::UnexpectedToken(token.to_string()), at)),
            None => Err(ExpressionError::new(ExpressionErrorKind::UnbalancedParenthesis, open)),
        }
    }
}

fn named_value(name: &str, at: usize) -> Result<Expr, ExpressionError> {
    Ok(match name {
        "u" => Expr::Var(Variable::U),
        "v" => Expr::Var(Variable::V),
        "w" => Expr::Var(Variable::W),
        "pi" => Expr::Num(PI),
        "tau" => Expr::Num(TAU),
        "e" => Expr::Num(E),
        _ => return Err(ExpressionError::new(ExpressionErrorKind::UnknownIdentifier(name.to_string()), at)),
    })
}

/// Formula text for the four coordinates of a parametric surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormulaText {
    pub x: String,
    pub y: String,
    pub z: String,
    pub w: String,
}

impl Default for FormulaText {
    fn default() -> Self {
        Self {
            x: "cos(u)".into(),
            y: "sin(u)".into(),
            z: "cos(v)".into(),
            w: "sin(v)".into(),
        }
    }
}

/// Four compiled coordinate expressions
#[derive(Clone, Debug, PartialEq)]
pub struct Formula4 {
    pub x: Expr,
    pub y: Expr,
    pub z: Expr,
    pub w: Expr,
}

impl Formula4 {
    pub fn parse(text: &FormulaText) -> Result<Self, ExpressionError> {
        Ok(Self {
            x: Expr::parse(&text.x)?,
            y: Expr::parse(&text.y)?,
            z: Expr::parse(&text.z)?,
            w: Expr::parse(&text.w)?,
        })
    }

    #[inline]
    pub fn eval(&self, u: f32, v: f32, w: f32) -> Vec4 {
        Vec4::new(
            self.x.eval(u, v, w),
            self.y.eval(u, v, w),
            self.z.eval(u, v, w),
            self.w.eval(u, v, w),
        )
    }
}
