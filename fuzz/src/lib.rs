//! Checks shared by the fuzz targets.

use arbitrary::Arbitrary;
use tagjson::{Heap, HeapOptions, ParserOptions, TransformType, parse_utf8, parse_utf16};

/// Deepest nesting `serde_json` reads with its default recursion limit.
const SERDE_JSON_MAX_DEPTH: usize = 127;

#[derive(Arbitrary, Debug, Default)]
pub struct Input {
    pub map_literals: bool,
    pub sendable: bool,
    pub max_depth: Option<u8>,
    pub max_objects: Option<u16>,
    pub wide: bool,
    pub text: Vec<u8>,
}

/// Nesting depth of rendered JSON text, ignoring brackets inside strings.
fn nesting_depth(text: &str) -> usize {
    let (mut depth, mut max) = (0usize, 0usize);
    let (mut in_string, mut escaped) = (false, false);
    for c in text.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => {
                depth += 1;
                max = max.max(depth);
            }
            ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Parses `input` and, on success, checks that the rendering reparses to
/// itself and that plain JSON renderings are accepted by `serde_json`.
///
/// # Panics
///
/// When either check fails.
pub fn check(input: &Input) {
    let options = ParserOptions {
        map_literals: input.map_literals,
        transform: if input.sendable {
            TransformType::Sendable
        } else {
            TransformType::Normal
        },
        max_depth: input.max_depth.map(usize::from),
    };
    let mut heap = Heap::new(HeapOptions {
        max_objects: input.max_objects.map(usize::from),
    });

    let text = String::from_utf8_lossy(&input.text);
    let result = if input.wide {
        let wide: Vec<u16> = text.encode_utf16().collect();
        parse_utf16(&mut heap, &wide, &options)
    } else {
        parse_utf8(&mut heap, text.as_bytes(), &options)
    };
    let Ok(value) = result else {
        return;
    };

    let rendered = heap.display(value).to_string();
    let mut again = Heap::default();
    let relaxed = ParserOptions {
        max_depth: None,
        ..options
    };
    let reparsed = parse_utf8(&mut again, rendered.as_bytes(), &relaxed)
        .unwrap_or_else(|e| panic!("{rendered:?} does not reparse: {e}"));
    assert_eq!(again.display(reparsed).to_string(), rendered);

    // Without map literals the rendering is plain JSON, as far as serde_json
    // is willing to nest.
    if !input.map_literals && nesting_depth(&rendered) <= SERDE_JSON_MAX_DEPTH {
        serde_json::from_str::<serde_json::Value>(&rendered)
            .unwrap_or_else(|e| panic!("serde_json rejects {rendered:?}: {e}"));
    }
}
