//! Tables: the partitioned storage engine behind a dictionary.
//!
//! Three partitions hold entries, split by the key's runtime kind:
//! - `ints`: primitive integer keys, native equality, no protocol calls.
//! - `texts`: primitive text keys, plus `text_hashes`, a reverse index
//!   from the protocol hash of a text to the texts carrying it.
//! - `objects`: everything else, one bucket per protocol hash, each bucket
//!   a collision chain scanned linearly with protocol equality.
//!
//! Each entry stores its value and a rank taken from a monotonic counter
//! at first insertion. Iteration order is rank order. `version` changes
//! exactly when the key count changes (and on `clear`).
//!
//! A generic key may be equal to a primitive key (a text subclass, a
//! number-like object). Lookups of generic keys therefore probe the fast
//! partitions by hash first, and lookups of primitive keys probe the
//! generic bucket of their hash when the generic partition is not empty,
//! so that one logical key never occupies two partitions.

use crate::error::DictError;
use crate::protocol::Protocol;
use crate::value::{KeyClass, Value};
use core::hash::BuildHasher;
use hashbrown::hash_table::Entry as TableEntry;
use hashbrown::{HashMap, HashTable};
use smallvec::SmallVec;
use std::collections::hash_map::RandomState;
use std::rc::Rc;

/// Value plus first-insertion rank.
#[derive(Clone)]
pub(crate) struct Slot<P: Protocol> {
    pub(crate) value: Value<P>,
    pub(crate) rank: u64,
}

#[derive(Clone)]
struct ChainEntry<P: Protocol> {
    key: Value<P>,
    slot: Slot<P>,
}

#[derive(Clone)]
struct Bucket<P: Protocol> {
    hash: i64,
    chain: Vec<ChainEntry<P>>,
}

/// Where a key currently lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Loc {
    Int(i64),
    Text(Rc<str>),
    Chain { hash: i64, index: usize },
}

/// How `insert` should treat the key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Insert {
    /// Look for an equal key first; replace its value if found.
    Probe,
    /// The caller has just failed a lookup for this key with the same
    /// classification; append without any equality scan.
    KnownAbsent,
}

#[derive(Clone)]
pub struct Tables<P: Protocol> {
    hasher: RandomState,
    ints: HashMap<i64, Slot<P>, RandomState>,
    texts: HashMap<Rc<str>, Slot<P>, RandomState>,
    text_hashes: HashMap<i64, SmallVec<[Rc<str>; 1]>, RandomState>,
    objects: HashTable<Bucket<P>>,
    object_count: usize,
    version: u64,
    order: u64,
}

impl<P: Protocol> Default for Tables<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Protocol> Tables<P> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hasher: RandomState::new(),
            ints: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            texts: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            text_hashes: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            objects: HashTable::new(),
            object_count: 0,
            version: 0,
            order: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.ints.len() + self.texts.len() + self.object_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn make_hash(&self, hash: i64) -> u64 {
        self.hasher.hash_one(hash)
    }

    fn bucket(&self, hash: i64) -> Option<&Bucket<P>> {
        self.objects.find(self.make_hash(hash), |b| b.hash == hash)
    }

    fn chain_position(
        &self,
        hash: i64,
        key: &Value<P>,
        p: &P,
    ) -> Result<Option<usize>, DictError> {
        let Some(bucket) = self.bucket(hash) else {
            return Ok(None);
        };
        for (i, e) in bucket.chain.iter().enumerate() {
            if key.same_or_eq(&e.key, p)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    pub(crate) fn locate(
        &self,
        key: &Value<P>,
        class: &KeyClass,
        p: &P,
    ) -> Result<Option<Loc>, DictError> {
        match class {
            KeyClass::Int(i) => {
                if self.ints.contains_key(i) {
                    return Ok(Some(Loc::Int(*i)));
                }
                if self.object_count == 0 {
                    return Ok(None);
                }
                Ok(self
                    .chain_position(*i, key, p)?
                    .map(|index| Loc::Chain { hash: *i, index }))
            }
            KeyClass::Text(t) => {
                if self.texts.contains_key(t) {
                    return Ok(Some(Loc::Text(t.clone())));
                }
                if self.object_count == 0 {
                    return Ok(None);
                }
                let hash = p.hash_str(t);
                Ok(self
                    .chain_position(hash, key, p)?
                    .map(|index| Loc::Chain { hash, index }))
            }
            KeyClass::Generic { hash } => {
                if let Some(texts) = self.text_hashes.get(hash) {
                    for t in texts {
                        if key.eq(&Value::Str(t.clone()), p)? {
                            return Ok(Some(Loc::Text(t.clone())));
                        }
                    }
                }
                if self.ints.contains_key(hash) && key.eq(&Value::Int(*hash), p)? {
                    return Ok(Some(Loc::Int(*hash)));
                }
                Ok(self
                    .chain_position(*hash, key, p)?
                    .map(|index| Loc::Chain { hash: *hash, index }))
            }
        }
    }

    pub(crate) fn slot(&self, loc: &Loc) -> Option<&Slot<P>> {
        match loc {
            Loc::Int(i) => self.ints.get(i),
            Loc::Text(t) => self.texts.get(t),
            Loc::Chain { hash, index } => self
                .bucket(*hash)
                .and_then(|b| b.chain.get(*index))
                .map(|e| &e.slot),
        }
    }

    fn slot_mut(&mut self, loc: &Loc) -> Option<&mut Slot<P>> {
        match loc {
            Loc::Int(i) => self.ints.get_mut(i),
            Loc::Text(t) => self.texts.get_mut(t),
            Loc::Chain { hash, index } => {
                let hh = self.make_hash(*hash);
                self.objects
                    .find_mut(hh, |b| b.hash == *hash)
                    .and_then(|b| b.chain.get_mut(*index))
                    .map(|e| &mut e.slot)
            }
        }
    }

    pub fn lookup(
        &self,
        key: &Value<P>,
        class: &KeyClass,
        p: &P,
    ) -> Result<Option<&Value<P>>, DictError> {
        let Some(loc) = self.locate(key, class, p)? else {
            return Ok(None);
        };
        Ok(self.slot(&loc).map(|s| &s.value))
    }

    /// Insert or replace. Returns the previous value when the key existed;
    /// replacing keeps the entry's rank and leaves `version` alone.
    pub fn insert(
        &mut self,
        key: Value<P>,
        class: KeyClass,
        value: Value<P>,
        mode: Insert,
        p: &P,
    ) -> Result<Option<Value<P>>, DictError> {
        if mode == Insert::Probe {
            if let Some(loc) = self.locate(&key, &class, p)? {
                if let Some(slot) = self.slot_mut(&loc) {
                    return Ok(Some(core::mem::replace(&mut slot.value, value)));
                }
            }
        }

        let slot = Slot {
            value,
            rank: self.order,
        };
        self.order += 1;
        self.version += 1;

        match class {
            KeyClass::Int(i) => {
                self.ints.insert(i, slot);
            }
            KeyClass::Text(t) => {
                let hash = p.hash_str(&t);
                self.text_hashes.entry(hash).or_default().push(t.clone());
                self.texts.insert(t, slot);
            }
            KeyClass::Generic { hash } => {
                let hh = self.make_hash(hash);
                let hasher = &self.hasher;
                let entry = ChainEntry { key, slot };
                match self
                    .objects
                    .entry(hh, |b| b.hash == hash, |b| hasher.hash_one(b.hash))
                {
                    TableEntry::Occupied(mut o) => o.get_mut().chain.push(entry),
                    TableEntry::Vacant(v) => {
                        v.insert(Bucket {
                            hash,
                            chain: vec![entry],
                        });
                    }
                }
                self.object_count += 1;
            }
        }
        Ok(None)
    }

    /// Remove the key equal to `key`; returns the stored key and its value.
    pub fn remove(
        &mut self,
        key: &Value<P>,
        class: &KeyClass,
        p: &P,
    ) -> Result<Option<(Value<P>, Value<P>)>, DictError> {
        match self.locate(key, class, p)? {
            Some(loc) => Ok(self.remove_at(&loc, p)),
            None => Ok(None),
        }
    }

    pub(crate) fn remove_at(&mut self, loc: &Loc, p: &P) -> Option<(Value<P>, Value<P>)> {
        let removed = match loc {
            Loc::Int(i) => self
                .ints
                .remove(i)
                .map(|slot| (Value::Int(*i), slot.value)),
            Loc::Text(t) => {
                let (k, slot) = self.texts.remove_entry(t)?;
                let hash = p.hash_str(&k);
                if let Some(list) = self.text_hashes.get_mut(&hash) {
                    list.retain(|s| **s != *k);
                    if list.is_empty() {
                        self.text_hashes.remove(&hash);
                    }
                }
                Some((Value::Str(k), slot.value))
            }
            Loc::Chain { hash, index } => {
                let hh = self.make_hash(*hash);
                let Ok(mut occupied) = self.objects.find_entry(hh, |b| b.hash == *hash) else {
                    return None;
                };
                let chain = &mut occupied.get_mut().chain;
                if *index >= chain.len() {
                    return None;
                }
                let e = chain.remove(*index);
                if chain.is_empty() {
                    occupied.remove();
                }
                self.object_count -= 1;
                Some((e.key, e.slot.value))
            }
        };
        if removed.is_some() {
            self.version += 1;
        }
        removed
    }

    /// Location of the entry with the highest rank.
    pub(crate) fn newest(&self) -> Option<Loc> {
        let mut best: Option<(u64, Loc)> = None;
        let mut consider = |rank: u64, loc: &dyn Fn() -> Loc| {
            if best.as_ref().map_or(true, |(r, _)| rank > *r) {
                best = Some((rank, loc()));
            }
        };
        for (k, s) in &self.ints {
            consider(s.rank, &|| Loc::Int(*k));
        }
        for (k, s) in &self.texts {
            consider(s.rank, &|| Loc::Text(k.clone()));
        }
        for b in self.objects.iter() {
            for (index, e) in b.chain.iter().enumerate() {
                consider(e.slot.rank, &|| Loc::Chain {
                    hash: b.hash,
                    index,
                });
            }
        }
        best.map(|(_, loc)| loc)
    }

    /// All entries in rank order.
    pub fn entries(&self) -> Vec<(Value<P>, Value<P>)> {
        let mut ranked: Vec<(u64, Value<P>, Value<P>)> = Vec::with_capacity(self.len());
        ranked.extend(
            self.ints
                .iter()
                .map(|(k, s)| (s.rank, Value::Int(*k), s.value.clone())),
        );
        ranked.extend(
            self.texts
                .iter()
                .map(|(k, s)| (s.rank, Value::Str(k.clone()), s.value.clone())),
        );
        for b in self.objects.iter() {
            ranked.extend(
                b.chain
                    .iter()
                    .map(|e| (e.slot.rank, e.key.clone(), e.slot.value.clone())),
            );
        }
        ranked.sort_unstable_by_key(|(rank, _, _)| *rank);
        ranked.into_iter().map(|(_, k, v)| (k, v)).collect()
    }

    pub(crate) fn int_entries(&self) -> impl Iterator<Item = (i64, &Value<P>)> {
        self.ints.iter().map(|(k, s)| (*k, &s.value))
    }

    pub(crate) fn text_entries(&self) -> impl Iterator<Item = (&Rc<str>, &Value<P>)> {
        self.texts.iter().map(|(k, s)| (k, &s.value))
    }

    pub(crate) fn object_entries(&self) -> impl Iterator<Item = (i64, &Value<P>, &Value<P>)> {
        self.objects
            .iter()
            .flat_map(|b| b.chain.iter().map(move |e| (b.hash, &e.key, &e.slot.value)))
    }

    /// Pairwise equality of two tables, independent of rank order.
    ///
    /// Every entry of `self` is looked up in `other` with the routing of
    /// its own partition. Lookups cross partitions, so a key stored as a
    /// generic object on one side and as a primitive on the other still
    /// matches. Equal lengths then make the check symmetric.
    pub(crate) fn equals(&self, other: &Tables<P>, p: &P) -> Result<bool, DictError> {
        if self.len() != other.len() {
            return Ok(false);
        }
        for (k, v) in self.int_entries() {
            let key = Value::Int(k);
            match other.lookup(&key, &KeyClass::Int(k), p)? {
                Some(w) if v.same_or_eq(w, p)? => {}
                _ => return Ok(false),
            }
        }
        for (k, v) in self.text_entries() {
            let key = Value::Str(k.clone());
            match other.lookup(&key, &KeyClass::Text(k.clone()), p)? {
                Some(w) if v.same_or_eq(w, p)? => {}
                _ => return Ok(false),
            }
        }
        for (hash, k, v) in self.object_entries() {
            match other.lookup(k, &KeyClass::Generic { hash }, p)? {
                Some(w) if v.same_or_eq(w, p)? => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Empty every partition and restart ranks; counts as a structural change.
    pub fn clear(&mut self) {
        self.ints.clear();
        self.texts.clear();
        self.text_hashes.clear();
        self.objects.clear();
        self.object_count = 0;
        self.order = 0;
        self.version += 1;
    }
}
