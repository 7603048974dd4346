//! Reviver support.
//!
//! [`internalize`] walks an already parsed value bottom-up and gives a
//! callback the chance to replace every property, element and map entry,
//! innermost first. The walk keeps its own work stack, so arbitrarily deep
//! values are fine.

use alloc::vec::Vec;
use core::fmt;

use crate::{
    error::HeapError,
    heap::{Heap, HeapObject, JsString, Sharing},
    tagged::TaggedValue,
};

/// The name under which a value is passed to a reviver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    Index(usize),
    Name(JsString),
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(name) => f.write_str(&name.to_string_lossy()),
        }
    }
}

/// A slot in a holder. Property keys stay heap strings so revived values can
/// be written back under the same key.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Element(usize),
    Property(TaggedValue),
}

#[derive(Debug)]
enum Task {
    /// Queue the children of the value in the slot, then revive it.
    Visit { holder: TaggedValue, slot: Slot },
    Revive { holder: TaggedValue, slot: Slot },
}

/// Calls `reviver(heap, holder, key, value)` for every value reachable from
/// `root`, children before their parent, and stores the result back into the
/// holder.
///
/// The root itself is revived last, held by a fresh object under the key
/// `""`. A reviver returning `undefined` deletes an object property or map
/// entry; an array element keeps its slot and becomes `undefined`. The
/// children of a value are listed before its reviver runs, so a reviver only
/// ever sees the final state of the values below it.
///
/// # Errors
///
/// The first reviver error, or any heap error raised while reading or
/// writing holders, stops the walk.
pub fn internalize<E, R>(heap: &mut Heap, root: TaggedValue, mut reviver: R) -> Result<TaggedValue, E>
where
    E: From<HeapError>,
    R: FnMut(&mut Heap, TaggedValue, &PropertyKey, TaggedValue) -> Result<TaggedValue, E>,
{
    let root_key = heap.alloc_string(JsString::from(""), Sharing::Local)?;
    let root_holder = heap.alloc_object(&[root_key, root], Sharing::Local)?;

    let mut tasks = Vec::new();
    tasks.push(Task::Visit {
        holder: root_holder,
        slot: Slot::Property(root_key),
    });

    while let Some(task) = tasks.pop() {
        match task {
            Task::Visit { holder, slot } => {
                tasks.push(Task::Revive { holder, slot });
                let value = read_slot(heap, holder, slot)?;
                let first_child = tasks.len();
                match heap.get(value) {
                    Some(HeapObject::Array(elements)) => {
                        tasks.extend((0..elements.len()).map(|i| Task::Visit {
                            holder: value,
                            slot: Slot::Element(i),
                        }));
                    }
                    Some(HeapObject::Object(properties) | HeapObject::Map(properties)) => {
                        tasks.extend(properties.iter().map(|&(key, _)| Task::Visit {
                            holder: value,
                            slot: Slot::Property(key),
                        }));
                    }
                    Some(HeapObject::String(_)) | None => {}
                }
                // Children are popped in source order.
                tasks[first_child..].reverse();
            }
            Task::Revive { holder, slot } => {
                let value = read_slot(heap, holder, slot)?;
                let key = match slot {
                    Slot::Element(i) => PropertyKey::Index(i),
                    Slot::Property(key) => PropertyKey::Name(heap.string(key)?.clone()),
                };
                let revived = reviver(heap, holder, &key, value)?;
                match (slot, &key) {
                    (Slot::Element(i), _) => heap.set_element(holder, i, revived)?,
                    (Slot::Property(_), PropertyKey::Name(name)) if revived.is_undefined() => {
                        heap.delete_property(holder, name)?;
                    }
                    (Slot::Property(key), _) => heap.set_property(holder, key, revived)?,
                }
            }
        }
    }

    let result = heap.get_property(root_holder, "")?;
    Ok(result.unwrap_or_else(TaggedValue::undefined))
}

/// Current value of a slot; `undefined` when a reviver removed it.
fn read_slot(heap: &Heap, holder: TaggedValue, slot: Slot) -> Result<TaggedValue, HeapError> {
    let value = match slot {
        Slot::Element(i) => heap.array(holder)?.get(i).copied(),
        Slot::Property(key) => heap.find_property(holder, heap.string(key)?)?,
    };
    Ok(value.unwrap_or_else(TaggedValue::undefined))
}
