//! Runtime value types

use serde_json::Value as JsonValue;
use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::Path;
use std::rc::Rc;

/// Runtime value type
///
/// Scripts are untyped; operators inspect the variant at runtime to decide
/// what to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// "No usable value" (natives with nothing to return, user procedures
    /// called in expression position)
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    /// Line-oriented streaming input, consumed as it is iterated
    Lines(LineSource),
}

impl Value {
    /// Check if value is truthy (for conditionals)
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Lines(_) => true,
        }
    }

    /// Name of the value kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Lines(_) => "lines",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Numeric view of the value. Bools count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn fmt_repr(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "'{}'", s),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => fmt_float(*x, f),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_repr(f)?;
                }
                write!(f, "]")
            }
            Value::Lines(source) => write!(f, "<lines {}>", source.name()),
        }
    }
}

/// Decimal form inside `[1e-4, 1e16)`, exponent form (`1e+16`, `1.5e-05`)
/// outside it. Integral decimals keep a trailing `.0`.
fn fmt_float(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let magnitude = x.abs();
    if !x.is_finite() || x == 0.0 || (1e-4..1e16).contains(&magnitude) {
        return if x.is_finite() && x.fract() == 0.0 {
            write!(f, "{:.1}", x)
        } else {
            write!(f, "{}", x)
        };
    }

    let sci = format!("{:e}", x);
    match sci.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().map_err(|_| fmt::Error)?;
            let sign = if exp < 0 { '-' } else { '+' };
            write!(f, "{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => write!(f, "{}", sci),
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            obj @ JsonValue::Object(_) => Value::Text(obj.to_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/* ===================== Line Sources ===================== */

/// Shared handle to a line-oriented reader
///
/// Clones share the same underlying reader, so a file opened once and bound
/// to two variables is consumed by whichever iterates it first.
#[derive(Clone)]
pub struct LineSource {
    name: String,
    reader: Rc<RefCell<Box<dyn BufRead>>>,
}

impl LineSource {
    /// Open a file for line-by-line reading
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::from_reader(path.display().to_string(), BufReader::new(file)))
    }

    pub fn from_reader(name: impl Into<String>, reader: impl BufRead + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Rc::new(RefCell::new(Box::new(reader))),
        }
    }

    /// In-memory source, mostly useful for hosts feeding generated input
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::from_reader(name, Cursor::new(text.into().into_bytes()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the next line, terminator included. `None` at end of input.
    /// Bytes that are not valid UTF-8 become U+FFFD.
    pub fn next_line(&self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let read = self.reader.borrow_mut().read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

impl fmt::Debug for LineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineSource").field("name", &self.name).finish()
    }
}

impl PartialEq for LineSource {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.reader, &other.reader)
    }
}
