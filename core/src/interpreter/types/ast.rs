//! Instruction tree node types
//!
//! The parser hands the tree over as JSON where every node is an array whose
//! first element is a tag and the rest are positional fields:
//!
//! ```text
//! ["assign", "x", ["arithm", ["var", "x"], ["value", 1], "+"]]
//! ["for", ["value", 0], ["value", 5], "+", [ ...body... ]]
//! ["if", cond, [ ...then... ], [["elif", cond, [ ... ]]], [["else", [ ... ]]]]
//! ```
//!
//! Loading converts that shape into the typed `Stmt`/`Expr` enums once, so
//! the executor never inspects raw JSON.

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::rc::Rc;
use std::str::FromStr;

use super::values::Value;
use crate::interpreter::errors::TreeError;

/// A sequence of statements. Shared so procedure bodies can be stored and
/// executed without deep copies.
pub type Block = Rc<[Stmt]>;

/// Statement AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        name: String,
        expr: Expr,
    },
    Define {
        name: String,
        body: Block,
    },
    /// Statement-form call; any return value is discarded
    Call {
        name: String,
        args: Vec<Expr>,
    },
    If {
        test: Expr,
        then_body: Block,
        elifs: Vec<ElifClause>,
        else_body: Option<Block>,
    },
    /// Counted loop over `[start, end)`; the index is never bound to a variable
    ForRange {
        start: Expr,
        end: Expr,
        step: StepMode,
        body: Block,
    },
    ForEach {
        var: String,
        iterable: Expr,
        body: Block,
    },
    While {
        test: Expr,
        body: Block,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElifClause {
    pub test: Expr,
    pub body: Block,
}

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value. Nodes without a recognized tag also land here and
    /// evaluate to themselves.
    Literal(Value),
    Var(String),
    Arith {
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Boolean {
        op: BoolOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::FloorDiv => "//",
            ArithOp::Mod => "%",
            ArithOp::Pow => "**",
        }
    }
}

impl FromStr for ArithOp {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(ArithOp::Add),
            "-" => Ok(ArithOp::Sub),
            "*" => Ok(ArithOp::Mul),
            "/" => Ok(ArithOp::Div),
            "//" => Ok(ArithOp::FloorDiv),
            "%" => Ok(ArithOp::Mod),
            "**" => Ok(ArithOp::Pow),
            other => Err(TreeError::UnknownOperator(other.to_string())),
        }
    }
}

/// Binary comparison and logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BoolOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BoolOp::Eq => "==",
            BoolOp::Ne => "!=",
            BoolOp::Lt => "<",
            BoolOp::Gt => ">",
            BoolOp::Le => "<=",
            BoolOp::Ge => ">=",
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

impl FromStr for BoolOp {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(BoolOp::Eq),
            "!=" => Ok(BoolOp::Ne),
            "<" => Ok(BoolOp::Lt),
            ">" => Ok(BoolOp::Gt),
            "<=" => Ok(BoolOp::Le),
            ">=" => Ok(BoolOp::Ge),
            "and" => Ok(BoolOp::And),
            "or" => Ok(BoolOp::Or),
            other => Err(TreeError::UnknownOperator(other.to_string())),
        }
    }
}

/// Step of a counted loop: `+`, `++`, `-`, `--`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    Inc,
    DoubleInc,
    Dec,
    DoubleDec,
}

impl StepMode {
    pub fn step(self) -> i64 {
        match self {
            StepMode::Inc => 1,
            StepMode::DoubleInc => 2,
            StepMode::Dec => -1,
            StepMode::DoubleDec => -2,
        }
    }
}

impl FromStr for StepMode {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(StepMode::Inc),
            "++" => Ok(StepMode::DoubleInc),
            "-" => Ok(StepMode::Dec),
            "--" => Ok(StepMode::DoubleDec),
            other => Err(TreeError::UnknownLoopMode(other.to_string())),
        }
    }
}

/* ===================== Loading ===================== */

/// Parse a whole program (a JSON array of statements)
pub fn parse_program(source: &str) -> Result<Vec<Stmt>, TreeError> {
    let json: JsonValue = serde_json::from_str(source)?;
    Ok(parse_block(&json)?.to_vec())
}

/// Split a node into its tag and positional fields
fn node_parts(json: &JsonValue) -> Option<(&str, &[JsonValue])> {
    let items = json.as_array()?;
    let tag = items.first()?.as_str()?;
    Some((tag, &items[1..]))
}

fn malformed(tag: &str, fields: &[JsonValue]) -> TreeError {
    TreeError::Malformed {
        tag: tag.to_string(),
        arity: fields.len(),
    }
}

fn parse_name(json: &JsonValue) -> Result<String, TreeError> {
    match json {
        JsonValue::String(name) => Ok(name.clone()),
        // the parser sometimes wraps loop variable names as literals
        other => match node_parts(other) {
            Some(("value", [JsonValue::String(name)])) => Ok(name.clone()),
            _ => Err(TreeError::ExpectedName(other.to_string())),
        },
    }
}

fn parse_block(json: &JsonValue) -> Result<Block, TreeError> {
    let items = json
        .as_array()
        .ok_or_else(|| TreeError::ExpectedBlock(json.to_string()))?;
    let stmts = items.iter().map(parse_stmt).collect::<Result<Vec<_>, _>>()?;
    Ok(Rc::from(stmts))
}

fn parse_args(json: &JsonValue) -> Result<Vec<Expr>, TreeError> {
    match json.as_array() {
        Some(items) => items.iter().map(parse_expr).collect(),
        None => Err(TreeError::ExpectedBlock(json.to_string())),
    }
}

pub fn parse_stmt(json: &JsonValue) -> Result<Stmt, TreeError> {
    let (tag, fields) = node_parts(json).ok_or_else(|| TreeError::NotANode(json.to_string()))?;

    match (tag, fields) {
        ("assign", [name, expr]) => Ok(Stmt::Assign {
            name: parse_name(name)?,
            expr: parse_expr(expr)?,
        }),

        ("def", [name, body]) => Ok(Stmt::Define {
            name: parse_name(name)?,
            body: parse_block(body)?,
        }),

        ("func", [name]) => Ok(Stmt::Call {
            name: parse_name(name)?,
            args: Vec::new(),
        }),
        ("func", [name, args]) => Ok(Stmt::Call {
            name: parse_name(name)?,
            args: parse_args(args)?,
        }),

        ("if", [test, then_body, clauses @ ..]) if clauses.len() <= 2 => {
            let mut elifs = Vec::new();
            let mut else_body = None;
            // 4-field form carries elifs OR an else; 5-field form carries both
            for group in clauses {
                parse_if_clauses(group, &mut elifs, &mut else_body)?;
            }
            Ok(Stmt::If {
                test: parse_expr(test)?,
                then_body: parse_block(then_body)?,
                elifs,
                else_body,
            })
        }

        ("for", [var, iterable, body]) => {
            // the parser names the collection variable directly
            let iterable = match iterable {
                JsonValue::String(name) => Expr::Var(name.clone()),
                other => parse_expr(other)?,
            };
            Ok(Stmt::ForEach {
                var: parse_name(var)?,
                iterable,
                body: parse_block(body)?,
            })
        }
        ("for", [start, end, mode, body]) => {
            let mode = mode
                .as_str()
                .ok_or_else(|| TreeError::UnknownLoopMode(mode.to_string()))?;
            Ok(Stmt::ForRange {
                start: parse_expr(start)?,
                end: parse_expr(end)?,
                step: mode.parse()?,
                body: parse_block(body)?,
            })
        }

        ("while", [test, body]) => Ok(Stmt::While {
            test: parse_expr(test)?,
            body: parse_block(body)?,
        }),

        ("assign" | "def" | "func" | "if" | "for" | "while", _) => Err(malformed(tag, fields)),
        _ => Err(TreeError::UnknownInstruction(tag.to_string())),
    }
}

fn parse_if_clauses(
    group: &JsonValue,
    elifs: &mut Vec<ElifClause>,
    else_body: &mut Option<Block>,
) -> Result<(), TreeError> {
    let clauses = group
        .as_array()
        .ok_or_else(|| TreeError::MalformedClause(group.to_string()))?;

    for clause in clauses {
        match node_parts(clause) {
            Some(("elif", [test, body])) => elifs.push(ElifClause {
                test: parse_expr(test)?,
                body: parse_block(body)?,
            }),
            Some(("else", [body])) => *else_body = Some(parse_block(body)?),
            _ => return Err(TreeError::MalformedClause(clause.to_string())),
        }
    }

    Ok(())
}

pub fn parse_expr(json: &JsonValue) -> Result<Expr, TreeError> {
    let Some((tag, fields)) = node_parts(json) else {
        return Ok(Expr::Literal(Value::from(json.clone())));
    };

    match (tag, fields) {
        ("value", [value]) => Ok(Expr::Literal(Value::from(value.clone()))),

        ("var", [name]) => Ok(Expr::Var(parse_name(name)?)),

        ("arithm", [lhs, rhs, op]) => Ok(Expr::Arith {
            op: op_str(op)?.parse()?,
            lhs: Box::new(parse_expr(lhs)?),
            rhs: Box::new(parse_expr(rhs)?),
        }),

        ("boolean", [operand, op]) | ("boolean", [operand, _, op])
            if op.as_str() == Some("not") =>
        {
            Ok(Expr::Not(Box::new(parse_expr(operand)?)))
        }
        ("boolean", [lhs, rhs, op]) => Ok(Expr::Boolean {
            op: op_str(op)?.parse()?,
            lhs: Box::new(parse_expr(lhs)?),
            rhs: Box::new(parse_expr(rhs)?),
        }),

        ("func", [name]) => Ok(Expr::Call {
            name: parse_name(name)?,
            args: Vec::new(),
        }),
        ("func", [name, args]) => Ok(Expr::Call {
            name: parse_name(name)?,
            args: parse_args(args)?,
        }),

        ("value" | "var" | "arithm" | "boolean" | "func", _) => Err(malformed(tag, fields)),

        // unrecognized shapes pass through as plain values
        _ => Ok(Expr::Literal(Value::from(json.clone()))),
    }
}

fn op_str(op: &JsonValue) -> Result<&str, TreeError> {
    op.as_str()
        .ok_or_else(|| TreeError::UnknownOperator(op.to_string()))
}

impl TryFrom<&JsonValue> for Stmt {
    type Error = TreeError;

    fn try_from(json: &JsonValue) -> Result<Self, Self::Error> {
        parse_stmt(json)
    }
}

impl TryFrom<&JsonValue> for Expr {
    type Error = TreeError;

    fn try_from(json: &JsonValue) -> Result<Self, Self::Error> {
        parse_expr(json)
    }
}

impl<'de> Deserialize<'de> for Stmt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        parse_stmt(&json).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        parse_expr(&json).map_err(serde::de::Error::custom)
    }
}
