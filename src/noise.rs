//! Deterministic simulation of transcription mistakes.
//!
//! ```
//! use multicode::noise::Noise;
//!
//! let code = multicode::encode(b"Hi!", 6);
//! let damaged = Noise::from("seed").damage(&code, 1);
//! assert_eq!(multicode::decode(&damaged, 3, 6).unwrap(), b"Hi!");
//! ```

use core::fmt;

use bitcoin_hashes::Hash;
use rand_xoshiro::rand_core::RngCore;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::constants::SEPARATORS;

/// A single copying mistake at a character index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Swap the character with the one before it.
    Transpose(usize),
    Delete(usize),
    /// Write the character twice.
    Duplicate(usize),
    /// Replace the character with one a few code points away.
    Perturb(usize, i8),
}

impl Edit {
    pub fn apply(self, chars: &mut Vec<char>) {
        match self {
            Self::Transpose(index) => transpose(chars, index),
            Self::Delete(index) => delete(chars, index),
            Self::Duplicate(index) => duplicate(chars, index),
            Self::Perturb(index, offset) => perturb(chars, index, offset),
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transpose(index) => {
                write!(f, "transpose {} and {index}", index.saturating_sub(1))
            }
            Self::Delete(index) => write!(f, "delete {index}"),
            Self::Duplicate(index) => write!(f, "duplicate {index}"),
            Self::Perturb(index, offset) => write!(f, "shift {index} by {offset:+}"),
        }
    }
}

/// Swaps `chars[index - 1]` and `chars[index]`. Out of range indices are ignored.
pub fn transpose(chars: &mut [char], index: usize) {
    if index > 0 && index < chars.len() {
        chars.swap(index - 1, index);
    }
}

pub fn delete(chars: &mut Vec<char>, index: usize) {
    if index < chars.len() {
        chars.remove(index);
    }
}

pub fn duplicate(chars: &mut Vec<char>, index: usize) {
    if let Some(&c) = chars.get(index) {
        chars.insert(index, c);
    }
}

/// Moves `chars[index]` by `offset` code points, if the result is still a `char`.
pub fn perturb(chars: &mut [char], index: usize, offset: i8) {
    if let Some(c) = chars.get_mut(index) {
        let shifted = (*c as u32).checked_add_signed(i32::from(offset));
        if let Some(shifted) = shifted.and_then(char::from_u32) {
            *c = shifted;
        }
    }
}

/// A seeded source of [`Edit`]s.
pub struct Noise {
    inner: Xoshiro256StarStar,
}

impl From<Xoshiro256StarStar> for Noise {
    fn from(from: Xoshiro256StarStar) -> Self {
        Self { inner: from }
    }
}

/// Seeds from the SHA-256 digest of the text.
impl From<&str> for Noise {
    fn from(value: &str) -> Self {
        let hash = bitcoin_hashes::sha256::Hash::hash(value.as_bytes());
        let mut digest = [0_u8; 32];
        digest.copy_from_slice(&hash[..]);
        Self::from(digest)
    }
}

impl From<[u8; 32]> for Noise {
    fn from(value: [u8; 32]) -> Self {
        // the digest is read as four big-endian words
        let mut seed = [0_u8; 32];
        for (word, chunk) in seed.chunks_exact_mut(8).zip(value.chunks_exact(8)) {
            let mut bytes = [0_u8; 8];
            bytes.copy_from_slice(chunk);
            word.copy_from_slice(&u64::from_be_bytes(bytes).to_le_bytes());
        }
        Xoshiro256StarStar::from_seed(seed).into()
    }
}

#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
impl Noise {
    fn next(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn next_double(&mut self) -> f64 {
        self.next() as f64 / (u64::MAX as f64 + 1.0)
    }

    /// Uniform in `low..=high`.
    fn next_int(&mut self, low: u64, high: u64) -> u64 {
        (self.next_double() * ((high - low + 1) as f64)) as u64 + low
    }

    /// A random edit for a text of `len` characters. The first character is
    /// never the target; texts shorter than two characters get none.
    pub fn next_edit(&mut self, len: usize) -> Option<Edit> {
        if len < 2 {
            return None;
        }
        let index = self.next_int(1, len as u64 - 1) as usize;
        let edit = match self.next_int(0, 3) {
            0 => Edit::Transpose(index),
            1 => Edit::Delete(index),
            2 => Edit::Duplicate(index),
            _ => {
                let offset = [-2, -1, 1, 2][self.next_int(0, 3) as usize];
                Edit::Perturb(index, offset)
            }
        };
        Some(edit)
    }

    /// Strips grouping characters from `code` and applies `edits` random edits.
    pub fn damage(&mut self, code: &str, edits: usize) -> String {
        self.damage_logged(code, edits).0
    }

    /// Like [`damage`](Self::damage), also returning the edits in the order applied.
    pub fn damage_logged(&mut self, code: &str, edits: usize) -> (String, Vec<Edit>) {
        let mut chars: Vec<char> = code.chars().filter(|c| !SEPARATORS.contains(c)).collect();
        let mut applied = Vec::with_capacity(edits);
        for _ in 0..edits {
            let Some(edit) = self.next_edit(chars.len()) else {
                break;
            };
            edit.apply(&mut chars);
            applied.push(edit);
        }
        (chars.into_iter().collect(), applied)
    }
}
