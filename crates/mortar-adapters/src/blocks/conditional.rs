//! `if` / `elif` / `else` / `endif`.
//!
//! Conditions are a flat token list with the usual precedence:
//!
//! ```text
//! or_expr  := and_expr ( "or" and_expr )*
//! and_expr := not_expr ( "and" not_expr )*
//! not_expr := "not" not_expr | operand [ op operand ]
//! op       := == | equalto | != | notequalto | < | lessthan | > | greaterthan
//!           | <= | >= | contains | in
//! ```
//!
//! Operands resolve through the scope; names that do not resolve are null
//! (falsy) rather than errors.

use std::cmp::Ordering;

use mortar_core::{
    application::ports::{ArgumentError, BlockHandler, Opening, StartContext},
    domain::{Scope, Value},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct IfBlock;

impl IfBlock {
    pub fn new() -> Self {
        Self
    }
}

impl BlockHandler for IfBlock {
    fn names(&self) -> &[&str] {
        &["if"]
    }

    fn closing_names(&self, name: &str) -> &[&str] {
        match name {
            "if" | "elif" => &["elif", "else", "endif"],
            "else" => &["endif"],
            _ => &[],
        }
    }

    /// Segment state is "some branch of this chain has been taken".
    fn start(&self, ctx: &StartContext<'_, '_>) -> Result<Opening, ArgumentError> {
        let taken = ctx.previous.is_some_and(Value::is_truthy);

        match ctx.name {
            "else" => Ok(Opening::new().output_if(!taken).with_state(true)),
            "elif" if taken => Ok(Opening::new().output_if(false).with_state(true)),
            _ => {
                let holds = evaluate(ctx.args, ctx.scope)?;
                Ok(Opening::new().output_if(holds).with_state(holds))
            }
        }
    }

    fn describe(&self) -> &str {
        "render the first branch whose condition holds (elif, else)"
    }
}

/// Evaluate a condition token list.
pub fn evaluate(tokens: &[String], scope: &Scope<'_>) -> Result<bool, ArgumentError> {
    if tokens.is_empty() {
        return Err(ArgumentError::new("missing condition"));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        scope,
    };
    let result = parser.or_expr()?;
    match parser.peek() {
        None => Ok(result),
        Some(extra) => Err(ArgumentError::new(format!("unexpected '{extra}' in condition"))),
    }
}

struct Parser<'a, 's> {
    tokens: &'a [String],
    pos: usize,
    scope: &'a Scope<'s>,
}

impl Parser<'_, '_> {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn next(&mut self) -> Option<&str> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token.as_str())
    }

    fn or_expr(&mut self) -> Result<bool, ArgumentError> {
        let mut value = self.and_expr()?;
        while self.peek() == Some("or") {
            self.pos += 1;
            let rhs = self.and_expr()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and_expr(&mut self) -> Result<bool, ArgumentError> {
        let mut value = self.not_expr()?;
        while self.peek() == Some("and") {
            self.pos += 1;
            let rhs = self.not_expr()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn not_expr(&mut self) -> Result<bool, ArgumentError> {
        if self.peek() == Some("not") {
            self.pos += 1;
            return Ok(!self.not_expr()?);
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<bool, ArgumentError> {
        let lhs = self.operand()?;
        let Some(op) = self.peek().and_then(Operator::parse) else {
            return Ok(lhs.is_truthy());
        };
        self.pos += 1;
        let rhs = self.operand()?;
        Ok(op.apply(&lhs, &rhs))
    }

    fn operand(&mut self) -> Result<Value, ArgumentError> {
        let scope = self.scope;
        match self.next() {
            Some(token) if is_keyword(token) => {
                Err(ArgumentError::new(format!("expected a value, found '{token}'")))
            }
            Some(token) => Ok(scope.resolve(token).unwrap_or_default()),
            None => Err(ArgumentError::new("condition ends too early")),
        }
    }
}

fn is_keyword(token: &str) -> bool {
    matches!(token, "and" | "or" | "not") || Operator::parse(token).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Contains,
    In,
}

impl Operator {
    fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "==" | "equalto" => Self::Eq,
            "!=" | "notequalto" => Self::Ne,
            "<" | "lessthan" => Self::Lt,
            ">" | "greaterthan" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "contains" => Self::Contains,
            "in" => Self::In,
            _ => return None,
        })
    }

    fn apply(self, lhs: &Value, rhs: &Value) -> bool {
        match self {
            Self::Eq => loosely_equal(lhs, rhs),
            Self::Ne => !loosely_equal(lhs, rhs),
            Self::Lt => compare(lhs, rhs) == Some(Ordering::Less),
            Self::Gt => compare(lhs, rhs) == Some(Ordering::Greater),
            Self::Le => matches!(compare(lhs, rhs), Some(Ordering::Less | Ordering::Equal)),
            Self::Ge => matches!(compare(lhs, rhs), Some(Ordering::Greater | Ordering::Equal)),
            Self::Contains => contains(lhs, rhs),
            Self::In => contains(rhs, lhs),
        }
    }
}

/// Numbers compare numerically (`1 == 1.0`), everything else by
/// structure, falling back to string form for mixed scalars (`"1" == 1`).
fn loosely_equal(lhs: &Value, rhs: &Value) -> bool {
    if lhs == rhs {
        return true;
    }
    match (lhs, rhs) {
        (Value::List(_) | Value::Map(_), _) | (_, Value::List(_) | Value::Map(_)) => false,
        (Value::Null, _) | (_, Value::Null) => false,
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => lhs.to_string() == rhs.to_string(),
        },
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => match (lhs, rhs) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        },
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::List(items) => items.iter().any(|item| loosely_equal(item, needle)),
        Value::Map(map) => map.contains_key(&needle.to_string()),
        Value::String(s) => s.contains(&needle.to_string()),
        _ => false,
    }
}
