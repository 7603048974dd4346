//! A minimal managed heap for parsed values.
//!
//! Objects live in an arena and are addressed by [`TaggedValue`] heap
//! references. Nothing is ever freed; the heap is dropped as a whole.

use alloc::{
    boxed::Box,
    collections::{BTreeMap, btree_map::Entry},
    string::String,
    vec::Vec,
};
use core::cmp::Ordering;

use crate::{
    error::HeapError,
    options::HeapOptions,
    tagged::{HeapRef, TaggedValue},
};

/// A string in the host's representation: one byte per code unit when every
/// unit is ASCII, UTF-16 otherwise.
#[derive(Clone, Debug)]
pub enum JsString {
    OneByte(Box<[u8]>),
    TwoByte(Box<[u16]>),
}

impl JsString {
    /// Builds a one-byte string. Every byte must be ASCII.
    #[must_use]
    pub fn from_ascii(bytes: Vec<u8>) -> Self {
        debug_assert!(bytes.is_ascii());
        Self::OneByte(bytes.into_boxed_slice())
    }

    #[must_use]
    pub fn from_utf16(units: Vec<u16>) -> Self {
        Self::TwoByte(units.into_boxed_slice())
    }

    /// Number of UTF-16 code units.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::OneByte(b) => b.len(),
            Self::TwoByte(u) => u.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_one_byte(&self) -> bool {
        matches!(self, Self::OneByte(_))
    }

    /// Iterates over the UTF-16 code units.
    pub fn units(&self) -> impl Iterator<Item = u16> + '_ {
        let (bytes, wide): (&[u8], &[u16]) = match self {
            Self::OneByte(b) => (&b[..], &[][..]),
            Self::TwoByte(u) => (&[][..], &u[..]),
        };
        bytes.iter().map(|&b| u16::from(b)).chain(wide.iter().copied())
    }

    /// Converts to a Rust string, replacing unpaired surrogates with U+FFFD.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        match self {
            Self::OneByte(b) => b.iter().map(|&b| char::from(b)).collect(),
            Self::TwoByte(u) => String::from_utf16_lossy(u),
        }
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        if s.is_ascii() {
            Self::from_ascii(s.as_bytes().to_vec())
        } else {
            Self::from_utf16(s.encode_utf16().collect())
        }
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.units().eq(other.units())
    }
}

impl Eq for JsString {}

impl PartialOrd for JsString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JsString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.units().cmp(other.units())
    }
}

/// Whether an object belongs to one thread or may be shared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sharing {
    Local,
    Shared,
}

/// Ordered `(key, value)` pairs; keys are heap strings.
pub type Properties = Vec<(TaggedValue, TaggedValue)>;

#[derive(Clone, Debug)]
pub enum HeapObject {
    String(JsString),
    Array(Vec<TaggedValue>),
    Object(Properties),
    Map(Properties),
}

#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<(Sharing, HeapObject)>,
    options: HeapOptions,
}

impl Heap {
    #[must_use]
    pub fn new(options: HeapOptions) -> Self {
        Self {
            objects: Vec::new(),
            options,
        }
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn alloc(&mut self, object: HeapObject, sharing: Sharing) -> Result<TaggedValue, HeapError> {
        let count = self.objects.len();
        let over_limit = self.options.max_objects.is_some_and(|max| count >= max);
        let Ok(index) = u32::try_from(count) else {
            return Err(HeapError::OutOfMemory(count));
        };
        if over_limit {
            log::debug!("heap exhausted after {count} objects");
            return Err(HeapError::OutOfMemory(count));
        }
        self.objects.push((sharing, object));
        Ok(TaggedValue::from_heap(HeapRef::new(index)))
    }

    pub fn alloc_string(&mut self, s: JsString, sharing: Sharing) -> Result<TaggedValue, HeapError> {
        self.alloc(HeapObject::String(s), sharing)
    }

    pub fn alloc_array(&mut self, elements: &[TaggedValue], sharing: Sharing) -> Result<TaggedValue, HeapError> {
        self.alloc(HeapObject::Array(elements.to_vec()), sharing)
    }

    /// Allocates an object from alternating key, value slots.
    pub fn alloc_object(&mut self, pairs: &[TaggedValue], sharing: Sharing) -> Result<TaggedValue, HeapError> {
        let properties = self.collect_properties(pairs)?;
        self.alloc(HeapObject::Object(properties), sharing)
    }

    /// Allocates a map from alternating key, value slots.
    pub fn alloc_map(&mut self, pairs: &[TaggedValue], sharing: Sharing) -> Result<TaggedValue, HeapError> {
        let entries = self.collect_properties(pairs)?;
        self.alloc(HeapObject::Map(entries), sharing)
    }

    // A repeated key overwrites the earlier value but keeps its position.
    fn collect_properties(&self, pairs: &[TaggedValue]) -> Result<Properties, HeapError> {
        debug_assert!(pairs.len() % 2 == 0);
        let mut properties = Properties::with_capacity(pairs.len() / 2);
        let mut seen: BTreeMap<&JsString, usize> = BTreeMap::new();
        for pair in pairs.chunks_exact(2) {
            let (key, value) = (pair[0], pair[1]);
            match seen.entry(self.string(key)?) {
                Entry::Vacant(slot) => {
                    slot.insert(properties.len());
                    properties.push((key, value));
                }
                Entry::Occupied(slot) => properties[*slot.get()].1 = value,
            }
        }
        Ok(properties)
    }

    #[must_use]
    pub fn get(&self, value: TaggedValue) -> Option<&HeapObject> {
        let r = value.as_heap_ref()?;
        self.objects.get(r.index()).map(|(_, object)| object)
    }

    fn get_mut(&mut self, value: TaggedValue) -> Result<&mut HeapObject, HeapError> {
        let r = value.as_heap_ref().ok_or(HeapError::NotAnObject)?;
        self.objects
            .get_mut(r.index())
            .map(|(_, object)| object)
            .ok_or(HeapError::NotAnObject)
    }

    /// `true` for a heap value allocated as [`Sharing::Shared`].
    #[must_use]
    pub fn is_shared(&self, value: TaggedValue) -> bool {
        value
            .as_heap_ref()
            .and_then(|r| self.objects.get(r.index()))
            .is_some_and(|(sharing, _)| *sharing == Sharing::Shared)
    }

    pub fn string(&self, value: TaggedValue) -> Result<&JsString, HeapError> {
        match self.get(value) {
            Some(HeapObject::String(s)) => Ok(s),
            Some(_) => Err(HeapError::WrongKind("string")),
            None => Err(HeapError::NotAnObject),
        }
    }

    pub fn array(&self, value: TaggedValue) -> Result<&[TaggedValue], HeapError> {
        match self.get(value) {
            Some(HeapObject::Array(elements)) => Ok(elements),
            Some(_) => Err(HeapError::WrongKind("array")),
            None => Err(HeapError::NotAnObject),
        }
    }

    /// Properties of an object, in insertion order.
    pub fn properties(&self, value: TaggedValue) -> Result<&[(TaggedValue, TaggedValue)], HeapError> {
        match self.get(value) {
            Some(HeapObject::Object(properties)) => Ok(properties),
            Some(_) => Err(HeapError::WrongKind("object")),
            None => Err(HeapError::NotAnObject),
        }
    }

    /// Entries of a map, in insertion order.
    pub fn map_entries(&self, value: TaggedValue) -> Result<&[(TaggedValue, TaggedValue)], HeapError> {
        match self.get(value) {
            Some(HeapObject::Map(entries)) => Ok(entries),
            Some(_) => Err(HeapError::WrongKind("map")),
            None => Err(HeapError::NotAnObject),
        }
    }

    /// Looks up `key` on an object or map.
    pub fn get_property(&self, target: TaggedValue, key: &str) -> Result<Option<TaggedValue>, HeapError> {
        self.find_property(target, &JsString::from(key))
    }

    pub(crate) fn find_property(&self, target: TaggedValue, key: &JsString) -> Result<Option<TaggedValue>, HeapError> {
        let entries = match self.get(target) {
            Some(HeapObject::Object(p) | HeapObject::Map(p)) => p,
            Some(_) => return Err(HeapError::WrongKind("object")),
            None => return Err(HeapError::NotAnObject),
        };
        for &(k, v) in entries {
            if self.string(k)? == key {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    fn position_of(&self, target: TaggedValue, key: &JsString) -> Result<Option<usize>, HeapError> {
        let entries = match self.get(target) {
            Some(HeapObject::Object(p) | HeapObject::Map(p)) => p,
            Some(_) => return Err(HeapError::WrongKind("object")),
            None => return Err(HeapError::NotAnObject),
        };
        for (i, &(k, _)) in entries.iter().enumerate() {
            if self.string(k)? == key {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Sets `key` on an object or map, appending it when absent.
    pub fn set_property(&mut self, target: TaggedValue, key: TaggedValue, value: TaggedValue) -> Result<(), HeapError> {
        let position = {
            let name = self.string(key)?;
            self.position_of(target, name)?
        };
        match self.get_mut(target)? {
            HeapObject::Object(p) | HeapObject::Map(p) => match position {
                Some(i) => p[i].1 = value,
                None => p.push((key, value)),
            },
            _ => return Err(HeapError::WrongKind("object")),
        }
        Ok(())
    }

    /// Removes `key` from an object or map; later keys keep their order.
    pub fn delete_property(&mut self, target: TaggedValue, key: &JsString) -> Result<bool, HeapError> {
        let Some(i) = self.position_of(target, key)? else {
            return Ok(false);
        };
        if let HeapObject::Object(p) | HeapObject::Map(p) = self.get_mut(target)? {
            p.remove(i);
        }
        Ok(true)
    }

    /// Overwrites an existing array element.
    pub fn set_element(&mut self, target: TaggedValue, index: usize, value: TaggedValue) -> Result<(), HeapError> {
        match self.get_mut(target)? {
            HeapObject::Array(elements) => match elements.get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(HeapError::WrongKind("array index")),
            },
            _ => Err(HeapError::WrongKind("array")),
        }
    }
}
