//! Text rendering of values in the host language's literal syntax.

use crate::error::DictError;
use crate::protocol::Protocol;
use crate::value::Value;
use core::fmt::Write;

/// Quote a text the way the host does: single quotes unless the text
/// contains a single quote and no double quote.
pub(crate) fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                // Writing into a String cannot fail.
                let _ = if code < 0x100 {
                    write!(out, "\\x{code:02x}")
                } else {
                    write!(out, "\\u{code:04x}")
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

pub(crate) fn repr_value<P: Protocol>(v: &Value<P>, p: &P) -> Result<String, DictError> {
    match v {
        Value::None => Ok("None".into()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Str(s) => Ok(repr_str(s)),
        Value::Tuple(items) => {
            let inner = join(items.iter().map(|x| repr_value(x, p)))?;
            if items.len() == 1 {
                Ok(format!("({inner},)"))
            } else {
                Ok(format!("({inner})"))
            }
        }
        Value::Object(o) => p.repr(o),
        // The nested dictionary guards its own re-entry.
        Value::Dict(d) => d.try_borrow()?.repr(),
    }
}

pub(crate) fn repr_pair<P: Protocol>(k: &Value<P>, v: &Value<P>, p: &P) -> Result<String, DictError> {
    Ok(format!("({}, {})", repr_value(k, p)?, repr_value(v, p)?))
}

/// Join already-rendered parts with `", "`, stopping at the first error.
pub(crate) fn join<I>(parts: I) -> Result<String, DictError>
where
    I: IntoIterator<Item = Result<String, DictError>>,
{
    let mut out = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&part?);
    }
    Ok(out)
}
