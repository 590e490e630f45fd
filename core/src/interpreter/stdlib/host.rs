//! Natives that do not touch the browser: output, timing, files, conversions

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::thread;
use std::time::Duration;
use tracing::info;

use super::{arg, number_arg, text_arg, NativeRegistry};
use crate::driver::Session;
use crate::interpreter::types::{LineSource, Value};

pub fn register(registry: &mut NativeRegistry) {
    registry.register("print", print);
    registry.register("wait", wait);
    registry.register("get_timestamp", get_timestamp);
    registry.register("open", open);
    registry.register("write", write);
    registry.register("len", len);
    registry.register("str", to_str);
    registry.register("int", to_int);
    registry.register("float", to_float);
}

/// print(args...): string forms joined by spaces
pub fn print(_session: &mut Session, args: &[Value]) -> Result<Value> {
    let line = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    info!(target: "nbz::script", "{}", line);
    println!("{}", line);
    Ok(Value::Null)
}

/// wait(seconds)
pub fn wait(_session: &mut Session, args: &[Value]) -> Result<Value> {
    let seconds = number_arg(args, 0, "wait")?;
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("wait() duration must be a non-negative number of seconds");
    }
    let duration = Duration::try_from_secs_f64(seconds).map_err(|e| anyhow!("wait() {}", e))?;
    thread::sleep(duration);
    Ok(Value::Null)
}

pub fn get_timestamp(_session: &mut Session, _args: &[Value]) -> Result<Value> {
    Ok(Value::Text(
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    ))
}

/// open(path) -> lines, for use in `for line in ...` loops
pub fn open(_session: &mut Session, args: &[Value]) -> Result<Value> {
    let path = text_arg(args, 0, "open")?;
    let source = LineSource::open(&path).with_context(|| format!("Failed to open {}", path))?;
    Ok(Value::Lines(source))
}

/// write(path, text): appends one line, creating the file if needed
pub fn write(_session: &mut Session, args: &[Value]) -> Result<Value> {
    let path = text_arg(args, 0, "write")?;
    let text = text_arg(args, 1, "write")?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {} for writing", path))?;
    writeln!(file, "{}", text)?;
    Ok(Value::Null)
}

pub fn len(_session: &mut Session, args: &[Value]) -> Result<Value> {
    let count = match arg(args, 0, "len")? {
        Value::List(items) => items.len(),
        Value::Text(s) => s.chars().count(),
        other => bail!("len() not supported for {}", other.kind()),
    };
    Ok(Value::Int(count as i64))
}

pub fn to_str(_session: &mut Session, args: &[Value]) -> Result<Value> {
    Ok(Value::Text(text_arg(args, 0, "str")?))
}

pub fn to_int(_session: &mut Session, args: &[Value]) -> Result<Value> {
    let value = arg(args, 0, "int")?;
    let n = match value {
        Value::Int(n) => *n,
        Value::Bool(b) => *b as i64,
        Value::Float(x) if x.is_finite() => x.trunc() as i64,
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("int() invalid literal: '{}'", s))?,
        other => bail!("int() not supported for {}", other.kind()),
    };
    Ok(Value::Int(n))
}

pub fn to_float(_session: &mut Session, args: &[Value]) -> Result<Value> {
    let value = arg(args, 0, "float")?;
    let x = match value {
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| anyhow!("float() invalid literal: '{}'", s))?,
        other => other
            .as_f64()
            .ok_or_else(|| anyhow!("float() not supported for {}", other.kind()))?,
    };
    Ok(Value::Float(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn call(f: fn(&mut Session, &[Value]) -> Result<Value>, args: &[Value]) -> Result<Value> {
        f(&mut Session::default(), args)
    }

    #[test]
    fn test_conversions() {
        assert_eq!(call(to_int, &[Value::from(" 42 ")]).unwrap(), Value::Int(42));
        assert_eq!(call(to_int, &[Value::Float(-2.7)]).unwrap(), Value::Int(-2));
        assert_eq!(call(to_float, &[Value::Int(2)]).unwrap(), Value::Float(2.0));
        assert_eq!(call(to_str, &[Value::Float(1.0)]).unwrap(), Value::from("1.0"));
        assert!(call(to_int, &[Value::from("abc")]).is_err());
    }

    #[test]
    fn test_len() {
        assert_eq!(
            call(len, &[Value::List(vec![Value::Null, Value::Null])]).unwrap(),
            Value::Int(2)
        );
        assert_eq!(call(len, &[Value::from("héllo")]).unwrap(), Value::Int(5));
        assert!(call(len, &[Value::Int(3)]).is_err());
    }

    #[test]
    fn test_write_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path_value = Value::Text(path.display().to_string());

        call(write, &[path_value.clone(), Value::from("first")]).unwrap();
        call(write, &[path_value.clone(), Value::Int(2)]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n2\n");

        let Value::Lines(source) = call(open, &[path_value]).unwrap() else {
            unreachable!("Expected a line source");
        };
        assert_eq!(source.next_line().unwrap(), Some("first\n".to_string()));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let err = call(open, &[Value::from("/definitely/not/here.txt")]).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    fn test_wait_rejects_negative() {
        assert!(call(wait, &[Value::Int(-1)]).is_err());
        assert_eq!(call(wait, &[Value::Int(0)]).unwrap(), Value::Null);
    }

    #[test]
    fn test_wait_rejects_unrepresentable_duration() {
        let err = call(wait, &[Value::Float(1e300)]).unwrap_err();
        assert!(err.to_string().starts_with("wait()"));
    }
}
