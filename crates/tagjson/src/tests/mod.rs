use alloc::string::{String, ToString};

use crate::{Heap, ParserError, ParserOptions, TaggedValue, Value, parse_str};

mod arbitrary;
mod end_to_end;
mod modes;

pub(crate) fn map_options() -> ParserOptions {
    ParserOptions {
        map_literals: true,
        ..Default::default()
    }
}

/// Parses with map literals enabled and returns the owned tree.
pub(crate) fn owned(text: &str) -> Result<Value, ParserError> {
    let mut heap = Heap::default();
    let v = parse_str(&mut heap, text, &map_options())?;
    Ok(heap.to_value(v).unwrap())
}

/// Parses with map literals enabled and renders the result back to text.
pub(crate) fn reformat(text: &str) -> Result<String, ParserError> {
    let mut heap = Heap::default();
    let v: TaggedValue = parse_str(&mut heap, text, &map_options())?;
    Ok(heap.display(v).to_string())
}
