//! Inputs accepted by `update`, `merge_in_place` and `from_source`.

use crate::dict::{Dict, DictRef};
use crate::error::DictError;
use crate::protocol::Protocol;
use crate::value::Value;
use std::rc::Rc;

/// Anything exposing key enumeration plus element access.
pub trait Mapping<P: Protocol> {
    fn keys(&self) -> Result<Vec<Value<P>>, DictError>;

    fn get_item(&self, key: &Value<P>) -> Result<Value<P>, DictError>;
}

pub enum Source<'a, P: Protocol> {
    /// A dictionary borrowed for the whole update.
    Dict(&'a Dict<P>),
    /// A shared dictionary; its version is re-checked after every insert.
    Shared(&'a DictRef<P>),
    Mapping(&'a dyn Mapping<P>),
    /// Elements that must each be a two-element sequence.
    Pairs(Box<dyn Iterator<Item = Value<P>> + 'a>),
}

impl<'a, P: Protocol> Source<'a, P> {
    pub fn pairs<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value<P>>,
        I::IntoIter: 'a,
    {
        Source::Pairs(Box::new(items.into_iter()))
    }
}

/// Element view of an update-sequence item, if it is a sequence at all.
fn elements<P: Protocol>(item: Value<P>, p: &P) -> Result<Option<Vec<Value<P>>>, DictError> {
    Ok(match item {
        Value::Tuple(t) => Some(t.to_vec()),
        Value::Str(s) => Some(
            s.chars()
                .map(|c| Value::Str(Rc::from(c.to_string())))
                .collect(),
        ),
        Value::Dict(d) => {
            let src = d.try_borrow()?;
            let keys = Mapping::keys(&*src)?;
            Some(keys)
        }
        Value::Object(o) => p.to_sequence(&o),
        Value::None | Value::Int(_) => None,
    })
}

/// Split element `index` of an update sequence into a key and a value.
pub(crate) fn split_pair<P: Protocol>(
    index: usize,
    item: Value<P>,
    p: &P,
) -> Result<(Value<P>, Value<P>), DictError> {
    let Some(parts) = elements(item, p)? else {
        return Err(DictError::Type(format!(
            "cannot convert dictionary update sequence element #{index} to a sequence"
        )));
    };
    let n = parts.len();
    let mut parts = parts.into_iter();
    match (parts.next(), parts.next(), n) {
        (Some(k), Some(v), 2) => Ok((k, v)),
        _ => Err(DictError::Value(format!(
            "dictionary update sequence element #{index} has length {n}; 2 is required"
        ))),
    }
}
