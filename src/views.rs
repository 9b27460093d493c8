//! Keys, values and items views.
//!
//! A view owns a snapshot of its projection, taken in iteration order when
//! the view is created, plus a length check bound to the live dictionary.
//! Each call to `iter` starts a fresh cursor over the snapshot. Every step
//! compares the live length with the length captured at creation: on a
//! mismatch the iterator yields one `RuntimeError` and is then exhausted.
//!
//! Keys and items views support set algebra through `SetView`, by
//! converting both operands to a `ValueSet`. Values are not required to
//! be hashable, so the values view has none.

use crate::error::DictError;
use crate::protocol::Protocol;
use crate::repr::{join, repr_pair, repr_value};
use crate::set::ValueSet;
use crate::value::Value;
use core::iter::FusedIterator;
use std::fmt;
use std::rc::Rc;

/// Current length of the dictionary a view was taken from.
#[derive(Clone)]
pub(crate) struct LenCheck(Rc<dyn Fn() -> usize>);

impl LenCheck {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn() -> usize + 'static,
    {
        LenCheck(Rc::new(f))
    }

    fn current(&self) -> usize {
        (self.0)()
    }
}

struct Snapshot<T> {
    items: Rc<[T]>,
    expected: usize,
    live: LenCheck,
}

impl<T> Snapshot<T> {
    fn new(items: Vec<T>, live: LenCheck) -> Self {
        Self {
            expected: items.len(),
            items: Rc::from(items),
            live,
        }
    }

    fn iter(&self) -> ViewIter<T> {
        ViewIter {
            items: self.items.clone(),
            pos: 0,
            expected: self.expected,
            live: self.live.clone(),
            done: false,
        }
    }
}

/// Cursor over a view snapshot.
pub struct ViewIter<T> {
    items: Rc<[T]>,
    pos: usize,
    expected: usize,
    live: LenCheck,
    done: bool,
}

impl<T: Clone> Iterator for ViewIter<T> {
    type Item = Result<T, DictError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.live.current() != self.expected {
            self.done = true;
            return Some(Err(DictError::changed_size()));
        }
        match self.items.get(self.pos) {
            Some(item) => {
                self.pos += 1;
                Some(Ok(item.clone()))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl<T: Clone> FusedIterator for ViewIter<T> {}

/// Set algebra shared by keys and items views (and `ValueSet` itself).
pub trait SetView<P: Protocol> {
    fn to_set(&self) -> Result<ValueSet<P>, DictError>;

    fn union(&self, other: &dyn SetView<P>) -> Result<ValueSet<P>, DictError> {
        self.to_set()?.union(&other.to_set()?)
    }

    fn intersection(&self, other: &dyn SetView<P>) -> Result<ValueSet<P>, DictError> {
        self.to_set()?.intersection(&other.to_set()?)
    }

    fn difference(&self, other: &dyn SetView<P>) -> Result<ValueSet<P>, DictError> {
        self.to_set()?.difference(&other.to_set()?)
    }

    fn symmetric_difference(&self, other: &dyn SetView<P>) -> Result<ValueSet<P>, DictError> {
        self.to_set()?.symmetric_difference(&other.to_set()?)
    }

    fn is_subset(&self, other: &dyn SetView<P>) -> Result<bool, DictError> {
        self.to_set()?.is_subset(&other.to_set()?)
    }

    fn is_superset(&self, other: &dyn SetView<P>) -> Result<bool, DictError> {
        self.to_set()?.is_superset(&other.to_set()?)
    }

    fn is_disjoint(&self, other: &dyn SetView<P>) -> Result<bool, DictError> {
        self.to_set()?.is_disjoint(&other.to_set()?)
    }

    fn set_eq(&self, other: &dyn SetView<P>) -> Result<bool, DictError> {
        self.to_set()?.set_eq(&other.to_set()?)
    }
}

impl<P: Protocol> SetView<P> for ValueSet<P> {
    fn to_set(&self) -> Result<ValueSet<P>, DictError> {
        Ok(self.clone())
    }
}

macro_rules! view_common {
    ($view:ident, $item:ty) => {
        impl<P: Protocol> $view<P> {
            pub(crate) fn new(items: Vec<$item>, live: LenCheck, protocol: P) -> Self {
                Self {
                    snap: Snapshot::new(items, live),
                    protocol,
                }
            }

            /// Length of the snapshot.
            pub fn len(&self) -> usize {
                self.snap.expected
            }

            pub fn is_empty(&self) -> bool {
                self.snap.expected == 0
            }

            pub fn iter(&self) -> ViewIter<$item> {
                self.snap.iter()
            }
        }

        impl<P: Protocol> fmt::Debug for $view<P> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.repr() {
                    Ok(s) => f.write_str(&s),
                    Err(e) => write!(f, "<{}: {e}>", stringify!($view)),
                }
            }
        }
    };
}

pub struct KeysView<P: Protocol> {
    snap: Snapshot<Value<P>>,
    protocol: P,
}

pub struct ValuesView<P: Protocol> {
    snap: Snapshot<Value<P>>,
    protocol: P,
}

pub struct ItemsView<P: Protocol> {
    snap: Snapshot<(Value<P>, Value<P>)>,
    protocol: P,
}

view_common!(KeysView, Value<P>);
view_common!(ValuesView, Value<P>);
view_common!(ItemsView, (Value<P>, Value<P>));

impl<P: Protocol> KeysView<P> {
    pub fn repr(&self) -> Result<String, DictError> {
        let body = join(self.snap.items.iter().map(|k| repr_value(k, &self.protocol)))?;
        Ok(format!("dict_keys([{body}])"))
    }
}

impl<P: Protocol> ValuesView<P> {
    pub fn repr(&self) -> Result<String, DictError> {
        let body = join(self.snap.items.iter().map(|v| repr_value(v, &self.protocol)))?;
        Ok(format!("dict_values([{body}])"))
    }
}

impl<P: Protocol> ItemsView<P> {
    pub fn repr(&self) -> Result<String, DictError> {
        let body = join(
            self.snap
                .items
                .iter()
                .map(|(k, v)| repr_pair(k, v, &self.protocol)),
        )?;
        Ok(format!("dict_items([{body}])"))
    }
}

impl<P: Protocol> SetView<P> for KeysView<P> {
    fn to_set(&self) -> Result<ValueSet<P>, DictError> {
        ValueSet::from_values(self.protocol.clone(), self.snap.items.iter().cloned())
    }
}

/// Items become `(key, value)` tuples; an unhashable value fails the
/// conversion with a `TypeError`.
impl<P: Protocol> SetView<P> for ItemsView<P> {
    fn to_set(&self) -> Result<ValueSet<P>, DictError> {
        ValueSet::from_values(
            self.protocol.clone(),
            self.snap
                .items
                .iter()
                .map(|(k, v)| Value::pair(k.clone(), v.clone())),
        )
    }
}
