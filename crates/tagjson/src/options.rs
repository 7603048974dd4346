/// Which family of heap objects a parse produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransformType {
    /// Ordinary, thread-local objects.
    #[default]
    Normal,
    /// Shared objects that may cross isolate boundaries.
    Sendable,
}

/// Configuration options for the JSON parser.
///
/// # Examples
///
/// ```rust
/// use tagjson::{Heap, ParserOptions, TransformType, parse_str};
///
/// let options = ParserOptions {
///     map_literals: true,
///     transform: TransformType::Sendable,
///     ..Default::default()
/// };
/// let mut heap = Heap::default();
/// let v = parse_str(&mut heap, r##"#{"a": 1}"##, &options).unwrap();
/// assert!(heap.is_shared(v));
/// ```
///
/// # Default
///
/// Strict RFC 8259 parsing, plain objects, no depth limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Whether `#{ ... }` is accepted as a map literal.
    ///
    /// Map literals have the same body as objects, but are materialized as
    /// ordered maps. When `false`, `#` is an illegal token.
    ///
    /// # Default
    ///
    /// `false`
    pub map_literals: bool,

    /// Maximum number of open, non-empty aggregates.
    ///
    /// The parser never recurses, so this is a memory bound rather than a
    /// stack-safety requirement. Empty `[]` and `{}` do not count.
    ///
    /// # Default
    ///
    /// `None` (unbounded)
    pub max_depth: Option<usize>,

    /// Plain or sendable object construction.
    ///
    /// # Default
    ///
    /// [`TransformType::Normal`]
    pub transform: TransformType,
}

/// Configuration for a [`Heap`](crate::Heap).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapOptions {
    /// Number of objects after which allocation fails.
    ///
    /// # Default
    ///
    /// `None` (unbounded)
    pub max_objects: Option<usize>,
}
