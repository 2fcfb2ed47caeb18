//! A growable, double-ended buffer of small integers.
//!
//! Messages, polynomials and the chirality tracking of the text decoder are
//! all stored in an [`IntBuffer`]. The live elements sit in a window of the
//! backing storage, so elements can be added or removed at either end (and
//! inserted near either end) without moving everything on every edit.
//!
//! ```
//! use multicode::buffer::IntBuffer;
//! let mut buffer = IntBuffer::fixed(2);
//! buffer.push_back(7);
//! buffer.push_front(3);
//! assert_eq!(buffer.to_vec(), vec![3, 0, 0, 7]);
//! assert_eq!(buffer.pop_front(), 3);
//! ```

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

/// Spare slots given to buffers created with [`IntBuffer::by_size`].
const SPARE: usize = 16;

#[derive(Clone, Default)]
pub struct IntBuffer {
    storage: Vec<i32>,
    offset: usize,
    len: usize,
}

impl IntBuffer {
    fn with_layout(len: usize, capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity],
            offset: (capacity - len) / 2,
            len,
        }
    }

    /// A zero-filled buffer of `len` elements, with room to grow at both ends.
    #[must_use]
    pub fn by_size(len: usize) -> Self {
        Self::with_layout(len, len + SPARE)
    }

    /// A zero-filled buffer of `len` elements and no spare capacity.
    #[must_use]
    pub fn fixed(len: usize) -> Self {
        Self::with_layout(len, len)
    }

    /// An empty buffer with storage for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_layout(0, capacity)
    }

    /// The constant polynomial `1`.
    #[must_use]
    pub fn single_one() -> Self {
        let mut buffer = Self::by_size(1);
        buffer.set(0, 1);
        buffer
    }

    #[must_use]
    pub fn pair(a: i32, b: i32) -> Self {
        let mut buffer = Self::fixed(2);
        buffer.set(0, a);
        buffer.set(1, b);
        buffer
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// # Panics
    ///
    /// Panics if `index` is not below [`len`](Self::len).
    #[must_use]
    pub fn get(&self, index: usize) -> i32 {
        assert!(index < self.len, "index {index} out of range for length {}", self.len);
        self.storage[self.offset + index]
    }

    /// # Panics
    ///
    /// Panics if `index` is not below [`len`](Self::len).
    pub fn set(&mut self, index: usize, value: i32) {
        assert!(index < self.len, "index {index} out of range for length {}", self.len);
        self.storage[self.offset + index] = value;
    }

    fn tail_room(&self) -> usize {
        self.storage.len() - (self.offset + self.len)
    }

    /// Doubles the storage, keeping every live element where it is.
    fn grow(&mut self) {
        let capacity = (self.storage.len() * 2).max(1);
        self.storage.resize(capacity, 0);
    }

    pub fn push_back(&mut self, value: i32) {
        if self.tail_room() == 0 {
            if self.offset > 0 {
                // reclaim the head room
                let start = self.offset;
                self.storage.copy_within(start..start + self.len, 0);
                self.offset = 0;
            } else {
                self.grow();
            }
        }
        self.storage[self.offset + self.len] = value;
        self.len += 1;
    }

    pub fn push_front(&mut self, value: i32) {
        if self.offset == 0 {
            if self.tail_room() == 0 {
                self.grow();
            }
            // move everything up into the tail room, leaving at least one free slot at the head
            let shift = self.tail_room().div_ceil(2);
            self.storage.copy_within(0..self.len, shift);
            self.offset = shift;
        }
        self.offset -= 1;
        self.len += 1;
        self.storage[self.offset] = value;
    }

    /// Removes the last element. An empty buffer yields `0`.
    pub fn pop_back(&mut self) -> i32 {
        if self.len == 0 {
            return 0;
        }
        self.len -= 1;
        self.storage[self.offset + self.len]
    }

    /// Removes the first element. An empty buffer yields `0`.
    pub fn pop_front(&mut self) -> i32 {
        if self.len == 0 {
            return 0;
        }
        let value = self.storage[self.offset];
        self.offset += 1;
        self.len -= 1;
        value
    }

    /// Inserts `value` before `index`, so it ends up at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than [`len`](Self::len).
    pub fn insert_at(&mut self, index: usize, value: i32) {
        assert!(index <= self.len, "insert index {index} out of range for length {}", self.len);
        let head_is_shorter = index <= self.len / 2;
        if self.offset > 0 && (head_is_shorter || self.tail_room() == 0) {
            let start = self.offset;
            self.storage.copy_within(start..start + index, start - 1);
            self.offset -= 1;
        } else {
            if self.tail_room() == 0 {
                self.grow();
            }
            let start = self.offset + index;
            self.storage.copy_within(start..self.offset + self.len, start + 1);
        }
        self.storage[self.offset + index] = value;
        self.len += 1;
    }

    /// # Panics
    ///
    /// Panics if `index` is not below [`len`](Self::len).
    pub fn delete_at(&mut self, index: usize) {
        assert!(index < self.len, "delete index {index} out of range for length {}", self.len);
        if index <= self.len / 2 {
            let start = self.offset;
            self.storage.copy_within(start..start + index, start + 1);
            self.offset += 1;
        } else {
            let start = self.offset + index;
            self.storage.copy_within(start + 1..self.offset + self.len, start);
        }
        self.len -= 1;
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        assert!(a < self.len && b < self.len, "swap of {a} and {b} out of range for length {}", self.len);
        self.storage.swap(self.offset + a, self.offset + b);
    }

    pub fn reverse(&mut self) {
        self.storage[self.offset..self.offset + self.len].reverse();
    }

    /// Drops every element, keeping the storage.
    pub fn clear(&mut self) {
        self.offset = 0;
        self.len = 0;
    }

    /// Drops zero elements from the front. May leave the buffer empty.
    pub fn trim_leading_zeros(&mut self) {
        while self.len > 0 && self.storage[self.offset] == 0 {
            self.offset += 1;
            self.len -= 1;
        }
    }

    /// Drops the last `count` elements, or all of them if there are fewer.
    pub fn trim_end(&mut self, count: usize) {
        self.len = self.len.saturating_sub(count);
    }

    /// True for an empty buffer too.
    #[must_use]
    pub fn all_zero(&self) -> bool {
        self.iter().all(|v| v == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.as_slice().iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.storage[self.offset..self.offset + self.len]
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<i32> {
        self.as_slice().to_vec()
    }
}

impl From<&[i32]> for IntBuffer {
    fn from(values: &[i32]) -> Self {
        let mut buffer = Self::by_size(values.len());
        for (i, &v) in values.iter().enumerate() {
            buffer.set(i, v);
        }
        buffer
    }
}

impl PartialEq for IntBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for IntBuffer {}

impl core::fmt::Debug for IntBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
