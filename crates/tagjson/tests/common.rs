#![allow(missing_docs)]

/// A structured-message document touching every value kind, pretty-printed
/// so that whitespace handling is exercised between all token pairs.
pub const ORIGINAL: &str = r#"
{
    "moderation": {
        "decision": "allow",
        "reason": null,
        "score": -0.25
    },
    "request": {
        "filename": "example.rs",
        "language": "rust",
        "options": {
            "opt_level": 2,
            "features": [
                "serde",
                "tokio"
            ]
        }
    },
    "snippets": [
        "fn main() {}",
        "println!(\"hi\")\n",
        "café 😀"
    ],
    "matrix": [
        [
            1,
            2.5e3
        ],
        [],
        [
            true,
            false
        ]
    ],
    "nested_objects": {
        "outer": {
            "inner": 1
        },
        "empty": {}
    }
}
"#;

/// [`ORIGINAL`] after a parse and compact re-render.
pub const COMPACT: &str = r#"{"moderation":{"decision":"allow","reason":null,"score":-0.25},"request":{"filename":"example.rs","language":"rust","options":{"opt_level":2,"features":["serde","tokio"]}},"snippets":["fn main() {}","println!(\"hi\")\u000A","café 😀"],"matrix":[[1,2500],[],[true,false]],"nested_objects":{"outer":{"inner":1},"empty":{}}}"#;
