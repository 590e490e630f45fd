//! Page-level natives. All of them need a browser in the session.

use anyhow::Result;

use super::{text_arg, NativeRegistry};
use crate::driver::Session;
use crate::interpreter::types::Value;

pub fn register(registry: &mut NativeRegistry) {
    registry.register("go_to", go_to);
    registry.register("get_url", get_url);
    registry.register("click", click);
    registry.register("fill", fill);
    registry.register("get_text", get_text);
    registry.register("back", back);
    registry.register("refresh", refresh);
    registry.register("close_browser", close_browser);
}

/// go_to(url)
pub fn go_to(session: &mut Session, args: &[Value]) -> Result<Value> {
    let url = text_arg(args, 0, "go_to")?;
    session.browser_mut()?.navigate(&url)?;
    Ok(Value::Null)
}

/// get_url() -> text
pub fn get_url(session: &mut Session, _args: &[Value]) -> Result<Value> {
    Ok(Value::Text(session.browser()?.current_url()))
}

/// click(selector)
pub fn click(session: &mut Session, args: &[Value]) -> Result<Value> {
    let selector = text_arg(args, 0, "click")?;
    session.browser_mut()?.click(&selector)?;
    Ok(Value::Null)
}

/// fill(selector, text)
pub fn fill(session: &mut Session, args: &[Value]) -> Result<Value> {
    let selector = text_arg(args, 0, "fill")?;
    let text = text_arg(args, 1, "fill")?;
    session.browser_mut()?.fill(&selector, &text)?;
    Ok(Value::Null)
}

/// get_text(selector) -> text
pub fn get_text(session: &mut Session, args: &[Value]) -> Result<Value> {
    let selector = text_arg(args, 0, "get_text")?;
    Ok(Value::Text(session.browser()?.text(&selector)?))
}

pub fn back(session: &mut Session, _args: &[Value]) -> Result<Value> {
    session.browser_mut()?.back()?;
    Ok(Value::Null)
}

pub fn refresh(session: &mut Session, _args: &[Value]) -> Result<Value> {
    session.browser_mut()?.refresh()?;
    Ok(Value::Null)
}

/// Tear down the whole session so `browser` can provision a new one
pub fn close_browser(session: &mut Session, _args: &[Value]) -> Result<Value> {
    session.close()?;
    Ok(Value::Null)
}
