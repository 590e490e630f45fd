//! Expression-only reserved operations
//!
//! These take host state the general native signature does not carry:
//! the proxy capture for `check_net`, the script parameters for
//! `get_parameter`.

use anyhow::{anyhow, Result};

use super::{int_arg, text_arg};
use crate::driver::HarEntry;
use crate::interpreter::types::Value;

/// check_net(pattern) -> status of the first captured request whose url
/// contains `pattern`, or `false` when none does
pub fn check_net(har: &[HarEntry], args: &[Value]) -> Result<Value> {
    let pattern = text_arg(args, 0, "check_net")?;
    Ok(har
        .iter()
        .find(|entry| entry.url.contains(&pattern))
        .map(|entry| Value::Int(entry.status as i64))
        .unwrap_or(Value::Bool(false)))
}

/// get_parameter(index) -> the script parameter at `index`
pub fn get_parameter(parameters: &[String], args: &[Value]) -> Result<Value> {
    let index = int_arg(args, 0, "get_parameter")?;
    usize::try_from(index)
        .ok()
        .and_then(|i| parameters.get(i))
        .map(|p| Value::Text(p.clone()))
        .ok_or_else(|| {
            anyhow!(
                "get_parameter() index {} out of range ({} parameter(s) given)",
                index,
                parameters.len()
            )
        })
}
