use crate::{
    error::HeapError,
    heap::{Heap, JsString, Sharing},
    tagged::TaggedValue,
};

/// Abstraction over heap object construction.
///
/// The parser calls these entry points to materialize every string and
/// completed aggregate; which family of objects they produce is entirely up
/// to the implementation. Object and map contents arrive as alternating key,
/// value slots in source order.
pub trait ObjectFactory {
    fn new_string(&mut self, s: JsString) -> Result<TaggedValue, HeapError>;
    fn new_array(&mut self, elements: &[TaggedValue]) -> Result<TaggedValue, HeapError>;
    fn new_object(&mut self, pairs: &[TaggedValue]) -> Result<TaggedValue, HeapError>;
    fn new_map(&mut self, pairs: &[TaggedValue]) -> Result<TaggedValue, HeapError>;
}

impl<F: ObjectFactory + ?Sized> ObjectFactory for &mut F {
    #[inline]
    fn new_string(&mut self, s: JsString) -> Result<TaggedValue, HeapError> {
        (**self).new_string(s)
    }

    #[inline]
    fn new_array(&mut self, elements: &[TaggedValue]) -> Result<TaggedValue, HeapError> {
        (**self).new_array(elements)
    }

    #[inline]
    fn new_object(&mut self, pairs: &[TaggedValue]) -> Result<TaggedValue, HeapError> {
        (**self).new_object(pairs)
    }

    #[inline]
    fn new_map(&mut self, pairs: &[TaggedValue]) -> Result<TaggedValue, HeapError> {
        (**self).new_map(pairs)
    }
}

/// Factory producing ordinary thread-local objects.
#[derive(Debug)]
pub struct PlainFactory<'h> {
    heap: &'h mut Heap,
}

impl<'h> PlainFactory<'h> {
    pub fn new(heap: &'h mut Heap) -> Self {
        Self { heap }
    }
}

impl ObjectFactory for PlainFactory<'_> {
    #[inline]
    fn new_string(&mut self, s: JsString) -> Result<TaggedValue, HeapError> {
        self.heap.alloc_string(s, Sharing::Local)
    }

    #[inline]
    fn new_array(&mut self, elements: &[TaggedValue]) -> Result<TaggedValue, HeapError> {
        self.heap.alloc_array(elements, Sharing::Local)
    }

    #[inline]
    fn new_object(&mut self, pairs: &[TaggedValue]) -> Result<TaggedValue, HeapError> {
        self.heap.alloc_object(pairs, Sharing::Local)
    }

    #[inline]
    fn new_map(&mut self, pairs: &[TaggedValue]) -> Result<TaggedValue, HeapError> {
        self.heap.alloc_map(pairs, Sharing::Local)
    }
}

/// Factory producing shared objects, strings included, that may be handed
/// to another isolate.
#[derive(Debug)]
pub struct SendableFactory<'h> {
    heap: &'h mut Heap,
}

impl<'h> SendableFactory<'h> {
    pub fn new(heap: &'h mut Heap) -> Self {
        Self { heap }
    }
}

impl ObjectFactory for SendableFactory<'_> {
    #[inline]
    fn new_string(&mut self, s: JsString) -> Result<TaggedValue, HeapError> {
        self.heap.alloc_string(s, Sharing::Shared)
    }

    #[inline]
    fn new_array(&mut self, elements: &[TaggedValue]) -> Result<TaggedValue, HeapError> {
        self.heap.alloc_array(elements, Sharing::Shared)
    }

    #[inline]
    fn new_object(&mut self, pairs: &[TaggedValue]) -> Result<TaggedValue, HeapError> {
        self.heap.alloc_object(pairs, Sharing::Shared)
    }

    #[inline]
    fn new_map(&mut self, pairs: &[TaggedValue]) -> Result<TaggedValue, HeapError> {
        self.heap.alloc_map(pairs, Sharing::Shared)
    }
}
