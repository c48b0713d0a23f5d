//! Standard-library collection contracts listed in the value model's
//! abstract contract table: LIFO/FIFO deques, a bounds-checked fixed-size
//! array, and a stable binary heap. These are plain data types a VM can
//! dispatch builtin-function calls into; no bytecode lowering targets them
//! directly.

use crate::core::value::Value;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// Backs both `SplStack` and `SplQueue`: a double-ended queue with
/// LIFO (`push`/`pop`/`top`) and FIFO (`enqueue`/`dequeue`/`peek`) views
/// over the same storage, matching how `SplDoublyLinkedList` is the shared
/// base of both in PHP.
#[derive(Debug, Clone, Default)]
pub struct SplDoublyLinkedList {
    items: VecDeque<Value>,
}

impl SplDoublyLinkedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push_back(&mut self, value: Value) {
        self.items.push_back(value);
    }

    pub fn push_front(&mut self, value: Value) {
        self.items.push_front(value);
    }

    pub fn pop_back(&mut self) -> Option<Value> {
        self.items.pop_back()
    }

    pub fn pop_front(&mut self) -> Option<Value> {
        self.items.pop_front()
    }

    pub fn back(&self) -> Option<&Value> {
        self.items.back()
    }

    pub fn front(&self) -> Option<&Value> {
        self.items.front()
    }
}

/// LIFO: `push` onto the back, `pop`/`top` operate on the back.
#[derive(Debug, Clone, Default)]
pub struct SplStack(SplDoublyLinkedList);

impl SplStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.0.push_back(value);
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.0.pop_back()
    }

    pub fn top(&self) -> Option<&Value> {
        self.0.back()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// FIFO: `enqueue` onto the back, `dequeue` from the front, `peek` reads
/// the front.
#[derive(Debug, Clone, Default)]
pub struct SplQueue(SplDoublyLinkedList);

impl SplQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, value: Value) {
        self.0.push_back(value);
    }

    pub fn dequeue(&mut self) -> Option<Value> {
        self.0.pop_front()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.0.front()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Indexed, bounds-checked, fixed-size array. Growing fills new slots with
/// `Value::Null`; shrinking truncates.
#[derive(Debug, Clone)]
pub struct SplFixedArray {
    slots: Vec<Value>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("index {index} out of range for SplFixedArray of size {size}")]
pub struct OutOfRangeError {
    pub index: usize,
    pub size: usize,
}

impl SplFixedArray {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![Value::Null; size],
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn set_size(&mut self, new_size: usize) {
        self.slots.resize_with(new_size, || Value::Null);
    }

    pub fn get(&self, index: usize) -> Result<&Value, OutOfRangeError> {
        self.slots.get(index).ok_or(OutOfRangeError {
            index,
            size: self.slots.len(),
        })
    }

    pub fn set(&mut self, index: usize, value: Value) -> Result<(), OutOfRangeError> {
        let size = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(OutOfRangeError { index, size })?;
        *slot = value;
        Ok(())
    }
}

/// Wraps a `Value` with the insertion order it was extracted/compared at,
/// so the heap can break ties by insertion order (PHP's `SplHeap` family is
/// stable on equal-priority elements).
#[derive(Debug, Clone)]
struct HeapEntry {
    value: Value,
    priority: f64,
    sequence: u64,
    max_first: bool,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_priority = self
            .priority
            .partial_cmp(&other.priority)
            .unwrap_or(Ordering::Equal);
        let by_priority = if self.max_first {
            by_priority
        } else {
            by_priority.reverse()
        };
        // Earlier insertions pop first among equal priorities.
        by_priority.then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Debug, Clone)]
struct SplHeap {
    heap: BinaryHeap<HeapEntry>,
    next_sequence: u64,
    max_first: bool,
}

impl SplHeap {
    fn new(max_first: bool) -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
            max_first,
        }
    }

    fn insert(&mut self, value: Value) {
        let priority = value.to_float();
        self.heap.push(HeapEntry {
            value,
            priority,
            sequence: self.next_sequence,
            max_first: self.max_first,
        });
        self.next_sequence += 1;
    }

    fn extract(&mut self) -> Option<Value> {
        self.heap.pop().map(|entry| entry.value)
    }

    fn top(&self) -> Option<&Value> {
        self.heap.peek().map(|entry| &entry.value)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Binary max-heap: `extract` removes the largest-priority element.
#[derive(Debug, Clone)]
pub struct SplMaxHeap(SplHeap);

impl Default for SplMaxHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl SplMaxHeap {
    pub fn new() -> Self {
        Self(SplHeap::new(true))
    }
    pub fn insert(&mut self, value: Value) {
        self.0.insert(value);
    }
    pub fn extract(&mut self) -> Option<Value> {
        self.0.extract()
    }
    pub fn top(&self) -> Option<&Value> {
        self.0.top()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Binary min-heap: `extract` removes the smallest-priority element.
#[derive(Debug, Clone)]
pub struct SplMinHeap(SplHeap);

impl Default for SplMinHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl SplMinHeap {
    pub fn new() -> Self {
        Self(SplHeap::new(false))
    }
    pub fn insert(&mut self, value: Value) {
        self.0.insert(value);
    }
    pub fn extract(&mut self) -> Option<Value> {
        self.0.extract()
    }
    pub fn top(&self) -> Option<&Value> {
        self.0.top()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_is_lifo() {
        let mut s = SplStack::new();
        s.push(Value::Int(1));
        s.push(Value::Int(2));
        assert_eq!(s.top(), Some(&Value::Int(2)));
        assert_eq!(s.pop(), Some(Value::Int(2)));
        assert_eq!(s.pop(), Some(Value::Int(1)));
        assert_eq!(s.pop(), None);
    }

    #[test]
    fn queue_is_fifo() {
        let mut q = SplQueue::new();
        q.enqueue(Value::Int(1));
        q.enqueue(Value::Int(2));
        assert_eq!(q.peek(), Some(&Value::Int(1)));
        assert_eq!(q.dequeue(), Some(Value::Int(1)));
        assert_eq!(q.dequeue(), Some(Value::Int(2)));
    }

    #[test]
    fn fixed_array_bounds_and_resize() {
        let mut arr = SplFixedArray::new(2);
        assert_eq!(arr.size(), 2);
        arr.set(0, Value::Int(10)).unwrap();
        assert!(arr.set(5, Value::Int(1)).is_err());
        arr.set_size(3);
        assert_eq!(arr.size(), 3);
        assert_eq!(arr.get(2), Ok(&Value::Null));
        arr.set_size(1);
        assert!(arr.get(1).is_err());
    }

    #[test]
    fn max_heap_extracts_largest_first_with_stable_ties() {
        let mut heap = SplMaxHeap::new();
        heap.insert(Value::Int(5));
        heap.insert(Value::Int(9));
        heap.insert(Value::Int(1));
        assert_eq!(heap.extract(), Some(Value::Int(9)));
        assert_eq!(heap.extract(), Some(Value::Int(5)));
        assert_eq!(heap.extract(), Some(Value::Int(1)));
        assert_eq!(heap.extract(), None);
    }

    #[test]
    fn min_heap_extracts_smallest_first() {
        let mut heap = SplMinHeap::new();
        heap.insert(Value::Int(5));
        heap.insert(Value::Int(1));
        heap.insert(Value::Int(9));
        assert_eq!(heap.extract(), Some(Value::Int(1)));
        assert_eq!(heap.extract(), Some(Value::Int(5)));
        assert_eq!(heap.extract(), Some(Value::Int(9)));
    }
}
