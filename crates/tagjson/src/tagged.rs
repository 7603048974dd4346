//! The 64-bit tagged value encoding.
//!
//! Every value the parser produces is a single `u64`. Four encodings share
//! the bit space and are told apart by a handful of masks:
//!
//! ```text
//! Int:       0xFFFF_0000_IIII_IIII   32-bit payload in the low half
//! Double:    raw f64 bits + 0x0001_0000_0000_0000
//! Heap ref:  0x0000_PPPP_PPPP_PPP(000|001)   8-byte aligned, bit 0 = weak
//! Special:   0x0000_0000_0000_00SS   null/true/false/hole/undefined/exception
//! ```
//!
//! Predicates are checked in the order int, special, heap object, double.
//! The double offset moves every pure double out of the `0x0000` and `0xFFFF`
//! top-16-bit ranges, so a double never aliases the other three.

use core::fmt;

/// Marks the tag region in the top 16 bits.
pub const TAG_MARK: u64 = 0xFFFF_0000_0000_0000;
/// Top bits of a tagged integer.
pub const TAG_INT: u64 = TAG_MARK;
/// Offset added to raw double bits.
pub const DOUBLE_ENCODE_OFFSET: u64 = 1 << 48;

/// Weak (non-owning) bit on heap references.
pub const TAG_WEAK: u64 = 0x01;
/// Set on every special singleton.
pub const TAG_SPECIAL: u64 = 0x02;
/// Set on booleans and the hole.
pub const TAG_BOOLEAN: u64 = 0x04;
/// Distinguishes `undefined` and `exception` from `null`.
pub const TAG_EXCEPTION: u64 = 0x08;

/// A heap reference has all of these bits clear.
pub const TAG_HEAP_OBJECT_MASK: u64 = TAG_MARK | TAG_SPECIAL | TAG_BOOLEAN;
/// Bits that may be set on a special singleton.
const SPECIAL_VALUE_MASK: u64 = 0xFF;

pub const VALUE_NULL: u64 = TAG_SPECIAL;
pub const VALUE_FALSE: u64 = TAG_BOOLEAN | TAG_SPECIAL;
pub const VALUE_TRUE: u64 = VALUE_FALSE | 0x01;
pub const VALUE_HOLE: u64 = TAG_BOOLEAN | 0x01;
pub const VALUE_UNDEFINED: u64 = TAG_SPECIAL | TAG_EXCEPTION;
pub const VALUE_EXCEPTION: u64 = TAG_SPECIAL | 0x10;

/// Alignment of heap addresses; the low bits are free for tags.
const HEAP_ALIGN_SHIFT: u32 = 3;
/// Heap addresses must fit below the tag region.
const HEAP_ADDRESS_LIMIT: u64 = 1 << 48;

/// Smallest raw double bit pattern that cannot be encoded.
const IMPURE_NAN_BITS: u64 = TAG_INT - DOUBLE_ENCODE_OFFSET;

/// Returns `true` if `d` is a NaN whose payload would collide with the int
/// tag once offset. Only negative NaNs with the top fraction bits set hit
/// this; arithmetic never produces them but `f64::from_bits` can.
#[inline]
#[must_use]
pub const fn is_impure_nan(d: f64) -> bool {
    d.to_bits() >= IMPURE_NAN_BITS
}

/// Index of an object in a [`Heap`](crate::Heap).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeapRef(u32);

impl HeapRef {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    // Slot 0 would encode to address 0, so addresses are offset by one slot.
    const fn address(self) -> u64 {
        (self.0 as u64 + 1) << HEAP_ALIGN_SHIFT
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn from_address(address: u64) -> Self {
        Self(((address >> HEAP_ALIGN_SHIFT) - 1) as u32)
    }
}

/// A JavaScript value packed into 64 bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TaggedValue(u64);

impl TaggedValue {
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn from_int(i: i32) -> Self {
        Self(TAG_INT | (i as u32 as u64))
    }

    /// Encodes a double.
    ///
    /// Encoding an impure NaN is a bug in the caller; it is checked in debug
    /// builds only.
    #[inline]
    #[must_use]
    pub fn from_double(d: f64) -> Self {
        debug_assert!(!is_impure_nan(d), "impure NaN {:#018x}", d.to_bits());
        Self(d.to_bits().wrapping_add(DOUBLE_ENCODE_OFFSET))
    }

    /// Encodes `n` as an int when it is an integral `i32` (and not `-0`),
    /// otherwise as a double. NaN is canonicalized.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn from_number(n: f64) -> Self {
        if n.is_nan() {
            return Self::from_double(f64::NAN);
        }
        let i = n as i32;
        if f64::from(i) == n && !(i == 0 && n.is_sign_negative()) {
            Self::from_int(i)
        } else {
            Self::from_double(n)
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_heap(r: HeapRef) -> Self {
        let address = r.address();
        debug_assert!(address < HEAP_ADDRESS_LIMIT);
        Self(address)
    }

    #[inline]
    #[must_use]
    pub const fn from_bool(b: bool) -> Self {
        if b { Self(VALUE_TRUE) } else { Self(VALUE_FALSE) }
    }

    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Self(VALUE_NULL)
    }

    #[inline]
    #[must_use]
    pub const fn undefined() -> Self {
        Self(VALUE_UNDEFINED)
    }

    #[inline]
    #[must_use]
    pub const fn hole() -> Self {
        Self(VALUE_HOLE)
    }

    #[inline]
    #[must_use]
    pub const fn exception() -> Self {
        Self(VALUE_EXCEPTION)
    }

    /// Returns a weak (non-owning) copy of a heap reference.
    #[inline]
    #[must_use]
    pub const fn weak_ref(self) -> Self {
        debug_assert!(self.is_heap_object());
        Self(self.0 | TAG_WEAK)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    // ----- predicates -----

    #[inline]
    #[must_use]
    pub const fn is_int(self) -> bool {
        (self.0 & TAG_MARK) == TAG_INT
    }

    /// Top 16 bits clear: either a heap reference or a special.
    #[inline]
    const fn is_object_bits(self) -> bool {
        (self.0 & TAG_MARK) == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_double(self) -> bool {
        !self.is_int() && !self.is_object_bits()
    }

    #[inline]
    #[must_use]
    pub const fn is_number(self) -> bool {
        !self.is_object_bits()
    }

    #[inline]
    #[must_use]
    pub const fn is_special(self) -> bool {
        (self.0 & !SPECIAL_VALUE_MASK) == 0 && (self.0 & (TAG_SPECIAL | TAG_BOOLEAN)) != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_heap_object(self) -> bool {
        (self.0 & TAG_HEAP_OBJECT_MASK) == 0 && self.0 > TAG_WEAK
    }

    #[inline]
    #[must_use]
    pub const fn is_weak(self) -> bool {
        self.is_heap_object() && (self.0 & TAG_WEAK) != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == VALUE_NULL
    }

    #[inline]
    #[must_use]
    pub const fn is_undefined(self) -> bool {
        self.0 == VALUE_UNDEFINED
    }

    #[inline]
    #[must_use]
    pub const fn is_hole(self) -> bool {
        self.0 == VALUE_HOLE
    }

    #[inline]
    #[must_use]
    pub const fn is_exception(self) -> bool {
        self.0 == VALUE_EXCEPTION
    }

    #[inline]
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        (self.0 & !TAG_WEAK) == VALUE_FALSE
    }

    #[inline]
    #[must_use]
    pub const fn is_true(self) -> bool {
        self.0 == VALUE_TRUE
    }

    #[inline]
    #[must_use]
    pub const fn is_false(self) -> bool {
        self.0 == VALUE_FALSE
    }

    // ----- accessors -----

    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn as_int(self) -> Option<i32> {
        if self.is_int() {
            Some(self.0 as u32 as i32)
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_double(self) -> Option<f64> {
        if self.is_double() {
            Some(f64::from_bits(self.0.wrapping_sub(DOUBLE_ENCODE_OFFSET)))
        } else {
            None
        }
    }

    /// Numeric value of an int or a double.
    #[must_use]
    pub fn as_number(self) -> Option<f64> {
        match self.as_int() {
            Some(i) => Some(f64::from(i)),
            None => self.as_double(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_bool(self) -> Option<bool> {
        if self.is_boolean() { Some(self.is_true()) } else { None }
    }

    /// The heap object this value refers to, weak or not.
    #[inline]
    #[must_use]
    pub const fn as_heap_ref(self) -> Option<HeapRef> {
        if self.is_heap_object() {
            Some(HeapRef::from_address(self.0 & !TAG_WEAK))
        } else {
            None
        }
    }
}

impl fmt::Debug for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(i) = self.as_int() {
            return write!(f, "Int({i})");
        }
        if self.is_special() {
            return f.write_str(match self.0 {
                VALUE_NULL => "Null",
                VALUE_TRUE => "True",
                VALUE_FALSE => "False",
                VALUE_HOLE => "Hole",
                VALUE_UNDEFINED => "Undefined",
                VALUE_EXCEPTION => "Exception",
                _ => "Special(?)",
            });
        }
        if let Some(r) = self.as_heap_ref() {
            let weak = if self.is_weak() { "Weak" } else { "" };
            return write!(f, "{weak}Heap({})", r.index());
        }
        match self.as_double() {
            Some(d) => write!(f, "Double({d:?})"),
            None => write!(f, "Raw({:#018x})", self.0),
        }
    }
}

impl From<bool> for TaggedValue {
    fn from(b: bool) -> Self {
        Self::from_bool(b)
    }
}

impl From<i32> for TaggedValue {
    fn from(i: i32) -> Self {
        Self::from_int(i)
    }
}

impl From<HeapRef> for TaggedValue {
    fn from(r: HeapRef) -> Self {
        Self::from_heap(r)
    }
}
