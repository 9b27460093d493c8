//! Dict: the public mutation API over the partitioned tables.
//!
//! A `Dict` owns its storage exclusively; every mutating method takes
//! `&mut self`. Dictionaries nested inside values are shared through
//! `DictRef`, whose borrows fail with a `RuntimeError` instead of
//! panicking when a protocol callback re-enters a dictionary that is
//! already being mutated.
//!
//! Storage is either the partitioned `Tables` or a foreign host object.
//! Operations that need the full table shape (copy, equality, repr,
//! views) materialize foreign storage first.

use crate::class::DictClass;
use crate::error::DictError;
use crate::foreign::{visible_len, Foreign, ForeignObject};
use crate::protocol::{DynProtocol, Protocol};
use crate::reentrancy::Reentry;
use crate::repr::{join, repr_value};
use crate::source::{split_pair, Mapping, Source};
use crate::tables::{Insert, Tables};
use crate::value::Value;
use crate::views::{ItemsView, KeysView, LenCheck, ValuesView, ViewIter};
use std::borrow::Cow;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Outcome of a binary operator: a value, or a signal that the operand
/// type is not supported so the caller may try the reflected operator.
#[derive(Debug, Clone, PartialEq)]
pub enum OpResult<T> {
    Value(T),
    NotImplemented,
}

impl<T> OpResult<T> {
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, OpResult::NotImplemented)
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            OpResult::Value(v) => Some(v),
            OpResult::NotImplemented => None,
        }
    }
}

/// Shared handle to a dictionary stored inside a value.
pub struct DictRef<P: Protocol = DynProtocol>(Rc<RefCell<Dict<P>>>);

impl<P: Protocol> Clone for DictRef<P> {
    fn clone(&self) -> Self {
        DictRef(self.0.clone())
    }
}

impl<P: Protocol> DictRef<P> {
    pub fn new(d: Dict<P>) -> Self {
        DictRef(Rc::new(RefCell::new(d)))
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, Dict<P>>, DictError> {
        self.0.try_borrow().map_err(|_| DictError::busy())
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, Dict<P>>, DictError> {
        self.0.try_borrow_mut().map_err(|_| DictError::busy())
    }

    pub fn ptr_eq(&self, other: &DictRef<P>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn as_ptr(&self) -> *const Dict<P> {
        self.0.as_ptr()
    }
}

impl<P: Protocol> fmt::Debug for DictRef<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_borrow() {
            Ok(d) => fmt::Debug::fmt(&*d, f),
            Err(_) => f.write_str("DictRef(<borrowed>)"),
        }
    }
}

pub(crate) enum Storage<P: Protocol> {
    Tables(Tables<P>),
    Foreign(Foreign<P>),
}

pub struct Dict<P: Protocol = DynProtocol> {
    protocol: P,
    class: DictClass<P>,
    storage: Storage<P>,
    // Length seen by views; refreshed after every mutation.
    live: Rc<Cell<usize>>,
    reentry: Reentry,
    comparing: Reentry,
}

impl Dict<DynProtocol> {
    pub fn new() -> Self {
        Self::with_protocol(DynProtocol)
    }
}

impl Default for Dict<DynProtocol> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Protocol> Dict<P> {
    fn from_parts(protocol: P, class: DictClass<P>, storage: Storage<P>) -> Self {
        let d = Self {
            protocol,
            class,
            storage,
            live: Rc::new(Cell::new(0)),
            reentry: Reentry::new(),
            comparing: Reentry::new(),
        };
        d.sync_len();
        d
    }

    pub fn with_protocol(protocol: P) -> Self {
        Self::with_class(protocol, DictClass::base())
    }

    pub fn with_class(protocol: P, class: DictClass<P>) -> Self {
        Self::from_parts(protocol, class, Storage::Tables(Tables::new()))
    }

    pub fn with_capacity(protocol: P, capacity: usize) -> Self {
        Self::from_parts(
            protocol,
            DictClass::base(),
            Storage::Tables(Tables::with_capacity(capacity)),
        )
    }

    /// Build from any update source. A table-backed source dictionary is
    /// copied partition by partition instead of entry by entry.
    pub fn from_source(protocol: P, source: Source<'_, P>) -> Result<Self, DictError> {
        if let Source::Dict(d) = &source {
            if let Storage::Tables(t) = &d.storage {
                return Ok(Self::from_parts(
                    protocol,
                    DictClass::base(),
                    Storage::Tables(t.clone()),
                ));
            }
        }
        let mut d = Self::with_protocol(protocol);
        d.update(source)?;
        Ok(d)
    }

    pub fn from_pairs<I>(protocol: P, pairs: I) -> Result<Self, DictError>
    where
        I: IntoIterator<Item = (Value<P>, Value<P>)>,
    {
        let pairs = pairs.into_iter();
        let mut d = Self::with_capacity(protocol, pairs.size_hint().0);
        for (k, v) in pairs {
            d.set_item(k, v)?;
        }
        Ok(d)
    }

    pub fn from_kwargs<I, S>(protocol: P, kwargs: I) -> Result<Self, DictError>
    where
        I: IntoIterator<Item = (S, Value<P>)>,
        S: AsRef<str>,
    {
        let mut d = Self::with_protocol(protocol);
        d.update_kwargs(kwargs)?;
        Ok(d)
    }

    /// A dictionary whose entries live in `object`. With `from_host`, values
    /// written through the dictionary pass through `ForeignObject::translate`.
    pub fn from_foreign(protocol: P, object: Rc<dyn ForeignObject<P>>, from_host: bool) -> Self {
        Self::from_parts(
            protocol,
            DictClass::base(),
            Storage::Foreign(Foreign::new(object, from_host)),
        )
    }

    /// Class-level constructor: every key maps to the same shared `value`
    /// (`None` when absent).
    pub fn fromkeys<I>(
        protocol: P,
        class: DictClass<P>,
        keys: I,
        value: Option<Value<P>>,
    ) -> Result<Self, DictError>
    where
        I: IntoIterator<Item = Value<P>>,
    {
        let value = value.unwrap_or(Value::None);
        let mut d = Self::with_class(protocol, class);
        for k in keys {
            d.set_item(k, value.clone())?;
        }
        Ok(d)
    }

    fn sync_len(&self) {
        if let Storage::Tables(t) = &self.storage {
            self.live.set(t.len());
        }
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Tables(t) => t.len(),
            Storage::Foreign(f) => f.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_truthy(&self) -> bool {
        !self.is_empty()
    }

    /// Structural change counter. Foreign-backed dictionaries keep none and
    /// always report 0.
    pub fn version(&self) -> u64 {
        match &self.storage {
            Storage::Tables(t) => t.version(),
            Storage::Foreign(_) => 0,
        }
    }

    pub fn class(&self) -> &DictClass<P> {
        &self.class
    }

    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    pub fn is_foreign(&self) -> bool {
        matches!(self.storage, Storage::Foreign(_))
    }

    fn key_error(&self, key: &Value<P>) -> DictError {
        let shown = repr_value(key, &self.protocol)
            .unwrap_or_else(|_| format!("<{} object>", key.type_name(&self.protocol)));
        DictError::Key(shown)
    }

    fn find(&self, key: &Value<P>) -> Result<Option<Value<P>>, DictError> {
        match &self.storage {
            Storage::Tables(t) => {
                let class = key.classify(&self.protocol)?;
                Ok(t.lookup(key, &class, &self.protocol)?.cloned())
            }
            Storage::Foreign(f) => f.get(key, &self.protocol),
        }
    }

    fn remove_entry(&mut self, key: &Value<P>) -> Result<Option<(Value<P>, Value<P>)>, DictError> {
        let removed = match &mut self.storage {
            Storage::Tables(t) => {
                let class = key.classify(&self.protocol)?;
                t.remove(key, &class, &self.protocol)?
            }
            Storage::Foreign(f) => f.delete(key, &self.protocol)?,
        };
        self.sync_len();
        Ok(removed)
    }

    /// `d[key]`. On a miss, a subclass's missing-key hook supplies the
    /// result; the base type raises `KeyError`.
    pub fn get_item(&self, key: &Value<P>) -> Result<Value<P>, DictError> {
        if let Some(v) = self.find(key)? {
            return Ok(v);
        }
        if let Some(hook) = self.class.missing() {
            trace!(class = self.class.name(), "dispatching missing-key hook");
            return hook(self, key);
        }
        Err(self.key_error(key))
    }

    /// Lookup without the missing-key hook.
    pub fn get(&self, key: &Value<P>) -> Result<Option<Value<P>>, DictError> {
        self.find(key)
    }

    pub fn get_or(&self, key: &Value<P>, default: Value<P>) -> Result<Value<P>, DictError> {
        Ok(self.find(key)?.unwrap_or(default))
    }

    pub fn contains(&self, key: &Value<P>) -> Result<bool, DictError> {
        Ok(self.find(key)?.is_some())
    }

    /// `d[key] = value`. Replacing a value keeps the key's rank.
    pub fn set_item(&mut self, key: Value<P>, value: Value<P>) -> Result<(), DictError> {
        match &mut self.storage {
            Storage::Tables(t) => {
                let class = key.classify(&self.protocol)?;
                t.insert(key, class, value, Insert::Probe, &self.protocol)?;
            }
            Storage::Foreign(f) => f.set(&key, value, &self.protocol)?,
        }
        self.sync_len();
        Ok(())
    }

    pub fn del_item(&mut self, key: &Value<P>) -> Result<(), DictError> {
        match self.remove_entry(key)? {
            Some(_) => Ok(()),
            None => Err(self.key_error(key)),
        }
    }

    /// Remove `key` and return its value, or `default` when absent.
    /// Without a default a missing key is a `KeyError`.
    pub fn pop(&mut self, key: &Value<P>, default: Option<Value<P>>) -> Result<Value<P>, DictError> {
        match self.remove_entry(key)? {
            Some((_, v)) => Ok(v),
            None => default.ok_or_else(|| self.key_error(key)),
        }
    }

    /// Remove and return the most recently inserted entry.
    pub fn popitem(&mut self) -> Result<(Value<P>, Value<P>), DictError> {
        let popped = match &mut self.storage {
            Storage::Tables(t) => {
                let loc = t.newest().ok_or_else(DictError::empty_popitem)?;
                t.remove_at(&loc, &self.protocol)
                    .ok_or_else(DictError::empty_popitem)?
            }
            Storage::Foreign(f) => {
                let name = f.newest_name().ok_or_else(DictError::empty_popitem)?;
                f.delete(&Value::Str(name), &self.protocol)?
                    .ok_or_else(DictError::empty_popitem)?
            }
        };
        self.sync_len();
        trace!(remaining = self.len(), "popitem");
        Ok(popped)
    }

    /// Return the value for `key`, inserting `default` (or `None`) first when
    /// the key is absent. The key is classified and hashed once; the insert
    /// after a miss skips the equality scan.
    pub fn setdefault(&mut self, key: Value<P>, default: Option<Value<P>>) -> Result<Value<P>, DictError> {
        let default = default.unwrap_or(Value::None);
        match &mut self.storage {
            Storage::Tables(t) => {
                let class = key.classify(&self.protocol)?;
                if let Some(v) = t.lookup(&key, &class, &self.protocol)? {
                    return Ok(v.clone());
                }
                t.insert(key, class, default.clone(), Insert::KnownAbsent, &self.protocol)?;
            }
            Storage::Foreign(f) => {
                if let Some(v) = f.get(&key, &self.protocol)? {
                    return Ok(v);
                }
                f.set(&key, default.clone(), &self.protocol)?;
            }
        }
        self.sync_len();
        Ok(default)
    }

    pub fn clear(&mut self) {
        match &mut self.storage {
            Storage::Tables(t) => t.clear(),
            Storage::Foreign(f) => f.clear(),
        }
        self.sync_len();
        trace!("cleared dictionary");
    }

    /// Entries in iteration order.
    pub fn entries(&self) -> Vec<(Value<P>, Value<P>)> {
        match &self.storage {
            Storage::Tables(t) => t.entries(),
            Storage::Foreign(f) => f.entries(),
        }
    }

    /// Text-keyed entries only, in iteration order.
    pub fn to_text_map(&self) -> Vec<(Rc<str>, Value<P>)> {
        self.entries()
            .into_iter()
            .filter_map(|(k, v)| match k {
                Value::Str(s) => Some((s, v)),
                _ => None,
            })
            .collect()
    }

    /// Table view of the storage, materializing foreign entries.
    fn tables(&self) -> Result<Cow<'_, Tables<P>>, DictError> {
        match &self.storage {
            Storage::Tables(t) => Ok(Cow::Borrowed(t)),
            Storage::Foreign(f) => Ok(Cow::Owned(f.materialize(&self.protocol)?)),
        }
    }

    /// Shallow copy into a fresh table-backed dictionary of the base type.
    pub fn copy(&self) -> Result<Self, DictError> {
        let tables = self.tables()?.into_owned();
        Ok(Self::from_parts(
            self.protocol.clone(),
            DictClass::base(),
            Storage::Tables(tables),
        ))
    }

    /// Apply every entry of `source`, later entries winning.
    pub fn update(&mut self, source: Source<'_, P>) -> Result<(), DictError> {
        match source {
            Source::Dict(other) => {
                for (k, v) in other.entries() {
                    self.set_item(k, v)?;
                }
            }
            Source::Shared(other) => {
                if core::ptr::eq(other.as_ptr(), &*self) {
                    return Ok(());
                }
                let (entries, version) = {
                    let src = other.try_borrow()?;
                    (src.entries(), src.version())
                };
                for (k, v) in entries {
                    self.set_item(k, v)?;
                    if other.try_borrow()?.version() != version {
                        debug!(expected = version, "source dictionary mutated during update");
                        return Err(DictError::mutated_during_update());
                    }
                }
            }
            Source::Mapping(m) => {
                for k in m.keys()? {
                    let v = m.get_item(&k)?;
                    self.set_item(k, v)?;
                }
            }
            Source::Pairs(items) => {
                for (index, item) in items.enumerate() {
                    let (k, v) = split_pair(index, item, &self.protocol)?;
                    self.set_item(k, v)?;
                }
            }
        }
        Ok(())
    }

    /// Keyword-style entries, applied after any positional source.
    pub fn update_kwargs<I, S>(&mut self, kwargs: I) -> Result<(), DictError>
    where
        I: IntoIterator<Item = (S, Value<P>)>,
        S: AsRef<str>,
    {
        for (name, v) in kwargs {
            self.set_item(Value::str(name.as_ref()), v)?;
        }
        Ok(())
    }

    /// `self | other`. Operands that are not dictionaries yield
    /// `NotImplemented`.
    pub fn merge(&self, other: &Value<P>) -> Result<OpResult<Self>, DictError> {
        let Value::Dict(other) = other else {
            return Ok(OpResult::NotImplemented);
        };
        let mut out = self.copy()?;
        out.update(Source::Shared(other))?;
        Ok(OpResult::Value(out))
    }

    pub fn merge_dict(&self, other: &Dict<P>) -> Result<Self, DictError> {
        let mut out = self.copy()?;
        out.update(Source::Dict(other))?;
        Ok(out)
    }

    /// `other | self`, for when the left operand declined.
    pub fn merge_reflected(&self, other: &Value<P>) -> Result<OpResult<Self>, DictError> {
        let Value::Dict(other) = other else {
            return Ok(OpResult::NotImplemented);
        };
        let mut out = other.try_borrow()?.copy()?;
        out.update(Source::Dict(self))?;
        Ok(OpResult::Value(out))
    }

    /// `self |= source`.
    pub fn merge_in_place(&mut self, source: Source<'_, P>) -> Result<&mut Self, DictError> {
        self.update(source)?;
        Ok(self)
    }

    /// Same length and every pair of one side matched in the other.
    /// Comparing a dictionary that is already being compared (two distinct
    /// self-containing dictionaries) fails with a RuntimeError.
    pub fn equals(&self, other: &Dict<P>) -> Result<bool, DictError> {
        if core::ptr::eq(self, other) {
            return Ok(true);
        }
        if self.len() != other.len() {
            return Ok(false);
        }
        let Some(_guard) = self.comparing.enter() else {
            return Err(DictError::comparison_recursion());
        };
        let (a, b) = (self.tables()?, other.tables()?);
        a.equals(&b, &self.protocol)
    }

    /// `{k: v, ...}` in iteration order; a dictionary reached again while it
    /// is being rendered shows as `{...}`.
    pub fn repr(&self) -> Result<String, DictError> {
        let Some(_guard) = self.reentry.enter() else {
            return Ok("{...}".into());
        };
        let p = &self.protocol;
        let body = join(
            self.entries()
                .iter()
                .map(|(k, v)| Ok(format!("{}: {}", repr_value(k, p)?, repr_value(v, p)?))),
        )?;
        Ok(format!("{{{body}}}"))
    }

    fn len_check(&self) -> LenCheck {
        match &self.storage {
            Storage::Tables(_) => {
                let live = self.live.clone();
                LenCheck::new(move || live.get())
            }
            Storage::Foreign(f) => {
                let object = f.object.clone();
                LenCheck::new(move || visible_len(&*object))
            }
        }
    }

    pub fn keys(&self) -> KeysView<P> {
        let keys: Vec<Value<P>> = self.entries().into_iter().map(|(k, _)| k).collect();
        KeysView::new(keys, self.len_check(), self.protocol.clone())
    }

    pub fn values(&self) -> ValuesView<P> {
        let values: Vec<Value<P>> = self.entries().into_iter().map(|(_, v)| v).collect();
        ValuesView::new(values, self.len_check(), self.protocol.clone())
    }

    pub fn items(&self) -> ItemsView<P> {
        ItemsView::new(self.entries(), self.len_check(), self.protocol.clone())
    }

    /// Iterate keys; fails once if the dictionary changes size meanwhile.
    pub fn iter(&self) -> ViewIter<Value<P>> {
        self.keys().iter()
    }
}

impl<P: Protocol> Mapping<P> for Dict<P> {
    fn keys(&self) -> Result<Vec<Value<P>>, DictError> {
        Ok(self.entries().into_iter().map(|(k, _)| k).collect())
    }

    fn get_item(&self, key: &Value<P>) -> Result<Value<P>, DictError> {
        Dict::get_item(self, key)
    }
}

/// `==` maps every comparison error to `false`, cycles included.
/// `Dict::equals` is the fallible form.
impl<P: Protocol> PartialEq for Dict<P> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

impl<P: Protocol> fmt::Debug for Dict<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr() {
            Ok(s) => f.write_str(&s),
            Err(e) => write!(f, "<{} with unrenderable entries: {e}>", self.class.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{i, obj, s};

    fn d(pairs: &[(&str, i64)]) -> Dict {
        Dict::from_pairs(DynProtocol, pairs.iter().map(|(k, v)| (s(k), i(*v)))).unwrap()
    }

    fn shown(d: &Dict) -> String {
        d.repr().unwrap()
    }

    /// Invariant: a miss through a subclass consults its hook; `get` and the
    /// base type never do.
    #[test]
    fn missing_hook_only_for_subclass_get_item() {
        let class: DictClass<DynProtocol> =
            DictClass::subclass("Zeroes").with_missing(|_d, _k| Ok(Value::Int(0)));
        let zd = Dict::with_class(DynProtocol, class);
        assert_eq!(zd.get_item(&s("nope")).unwrap().as_int(), Some(0));
        assert!(zd.get(&s("nope")).unwrap().is_none());
        assert!(zd.is_empty(), "the hook does not insert");

        let base = Dict::new();
        assert_eq!(
            base.get_item(&s("nope")).unwrap_err(),
            DictError::Key("'nope'".into())
        );
    }

    /// Invariant: the live length cell follows every mutation.
    #[test]
    fn live_length_tracks_mutations() {
        let mut x = d(&[("a", 1)]);
        assert_eq!(x.live.get(), 1);
        x.set_item(s("b"), i(2)).unwrap();
        assert_eq!(x.live.get(), 2);
        x.pop(&s("a"), None).unwrap();
        assert_eq!(x.live.get(), 1);
        x.setdefault(s("c"), None).unwrap();
        assert_eq!(x.live.get(), 2);
        x.clear();
        assert_eq!(x.live.get(), 0);
    }

    /// Invariant: popitem takes the newest entry and fails when empty.
    #[test]
    fn popitem_is_lifo() {
        let mut x = d(&[("a", 1), ("b", 2)]);
        x.set_item(s("a"), i(3)).unwrap();
        let (k, v) = x.popitem().unwrap();
        assert_eq!((k.as_str(), v.as_int()), (Some("b"), Some(2)));
        x.popitem().unwrap();
        let err = x.popitem().unwrap_err();
        assert_eq!(err.to_string(), "KeyError: 'popitem(): dictionary is empty'");
    }

    /// Invariant: a dictionary containing itself renders the inner
    /// occurrence as `{...}`.
    #[test]
    fn repr_breaks_cycles() {
        let shared = DictRef::new(d(&[("a", 1)]));
        shared
            .try_borrow_mut()
            .unwrap()
            .set_item(s("me"), Value::Dict(shared.clone()))
            .unwrap();
        let text = shared.try_borrow().unwrap().repr().unwrap();
        assert_eq!(text, "{'a': 1, 'me': {...}}");
    }

    /// Invariant: updating a dictionary from its own shared handle is a no-op
    /// rather than a borrow failure.
    #[test]
    fn self_update_through_shared_handle() {
        let shared = DictRef::new(d(&[("a", 1)]));
        {
            let mut inner = shared.try_borrow_mut().unwrap();
            inner.update(Source::Shared(&shared)).unwrap();
            assert_eq!(inner.len(), 1);
        }
    }

    /// Invariant: a source whose version changes between inserts aborts the
    /// update with a RuntimeError.
    #[test]
    fn source_mutation_is_detected() {
        use crate::protocol::DynObject;
        use core::any::Any;

        // Key whose equality check removes an entry from the source.
        struct Meddler {
            victim: DictRef,
        }
        impl DynObject for Meddler {
            fn type_name(&self) -> &str {
                "Meddler"
            }
            fn hash(&self) -> Result<i64, DictError> {
                Ok(1)
            }
            fn eq(&self, _other: &Value<DynProtocol>) -> Result<bool, DictError> {
                let mut v = self.victim.try_borrow_mut()?;
                let _ = v.pop(&s("x"), Some(Value::None))?;
                Ok(false)
            }
            fn repr(&self) -> Result<String, DictError> {
                Ok("Meddler".into())
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let source = DictRef::new(Dict::new());
        let meddler = Value::Object(Rc::new(Meddler {
            victim: source.clone(),
        }) as crate::protocol::ObjectRef);
        {
            let mut src = source.try_borrow_mut().unwrap();
            src.set_item(meddler, i(0)).unwrap();
            src.set_item(s("x"), i(1)).unwrap();
        }
        // The target already holds a key with the same hash, so inserting
        // the meddler runs its equality.
        let mut target = Dict::new();
        target.set_item(obj("other", 1), i(9)).unwrap();
        let err = target.update(Source::Shared(&source)).unwrap_err();
        assert_eq!(err, DictError::mutated_during_update());
    }

    #[test]
    fn copy_is_independent_and_base_typed() {
        let class: DictClass<DynProtocol> = DictClass::subclass("Sub");
        let mut x = Dict::with_class(DynProtocol, class);
        x.set_item(s("a"), i(1)).unwrap();
        let mut y = x.copy().unwrap();
        assert!(y.class().is_base());
        assert_eq!(x, y);
        y.set_item(s("b"), i(2)).unwrap();
        assert_eq!(x.len(), 1);
        assert_ne!(x, y);
    }

    #[test]
    fn merge_declines_non_dicts() {
        let x = d(&[("a", 1)]);
        assert!(x.merge(&i(3)).unwrap().is_not_implemented());
        assert!(x.merge_reflected(&s("zz")).unwrap().is_not_implemented());
        let right: Value<DynProtocol> = d(&[("a", 2), ("b", 3)]).into();
        let merged = x.merge(&right).unwrap().into_value().unwrap();
        assert_eq!(shown(&merged), "{'a': 2, 'b': 3}");
        let reflected = x.merge_reflected(&right).unwrap().into_value().unwrap();
        assert_eq!(shown(&reflected), "{'a': 1, 'b': 3}");
    }

    #[test]
    fn text_map_skips_other_keys() {
        let mut x = d(&[("a", 1)]);
        x.set_item(i(5), i(5)).unwrap();
        x.set_item(s("b"), i(2)).unwrap();
        let names: Vec<String> = x.to_text_map().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
