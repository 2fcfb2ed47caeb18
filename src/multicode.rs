//! Encode bytes as short, human-transcribable codes and decode them back,
//! repairing the mistakes people make when copying them.
//!
//! Every byte becomes two 4-bit symbols, high nibble first. Reed–Solomon check
//! symbols are appended and the codeword is written with two alternating
//! alphabets, grouped in pairs and fours:
//!
//! ```
//! let code = multicode::encode(&[0xBC, 0x7D, 0xE6, 0xFD], 6);
//! assert_eq!(code, "Ns 9T-YF ZT-14 JP-Js");
//! ```
//!
//! The decoder ignores case and grouping, undoes swapped, dropped and
//! doubled characters using the alphabet each character belongs to, and lets
//! the check symbols fix whatever is left:
//!
//! ```
//! // "9T" was typed as "T9"
//! let data = multicode::decode("ns t9 yf zt 14 jp js", 4, 6).unwrap();
//! assert_eq!(data, [0xBC, 0x7D, 0xE6, 0xFD]);
//! ```

use core::cmp::Ordering;

use log::debug;

use crate::buffer::IntBuffer;
use crate::constants::{CASE_CHANGES, CORRECTIONS, EVEN_ALPHABET, ODD_ALPHABET, SEPARATORS};
use crate::reed_solomon::{self, Uncorrectable};

/// Why a code could not be decoded. No partial data is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The repaired code still had the wrong number of symbols.
    #[error("expected {expected} symbols after repair, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// More symbols were wrong than the check symbols can fix.
    #[error(transparent)]
    Uncorrectable(#[from] Uncorrectable),
    /// The character is a member of both alphabets.
    #[error("ambiguous character {0:?}")]
    AmbiguousCharacter(char),
}

/// The two numbers both sides of a transcription must agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Payload length in bytes.
    pub data_len: usize,
    /// Number of 4-bit check symbols.
    pub correction_symbols: usize,
}

impl Params {
    #[must_use]
    pub const fn new(data_len: usize, correction_symbols: usize) -> Self {
        Self {
            data_len,
            correction_symbols,
        }
    }

    /// Number of symbols in a code, or `None` if that does not fit in a `usize`.
    #[must_use]
    pub fn code_len(&self) -> Option<usize> {
        self.data_len
            .checked_mul(2)?
            .checked_add(self.correction_symbols)
    }

    /// See [`decode_detailed`].
    ///
    /// # Errors
    ///
    /// As for [`decode_detailed`].
    pub fn decode(&self, code: &str) -> Result<Decoded, Error> {
        decode_detailed(code, self.data_len, self.correction_symbols)
    }
}

/// A successful decode, with what it took to get there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub data: Vec<u8>,
    /// Whether the Reed–Solomon stage had to change or rotate symbols.
    pub corrected: bool,
    /// Positions touched by the transcription repair, in order.
    pub repairs: Vec<usize>,
}

/// Encodes `data` with `correction_symbols` check symbols.
///
/// # Examples
///
/// ```
/// assert_eq!(multicode::encode(&[0; 4], 6), "04 04-04 04-04 04-04");
/// assert_eq!(multicode::encode(&[], 0), "");
/// ```
#[must_use]
pub fn encode(data: &[u8], correction_symbols: usize) -> String {
    let mut message = IntBuffer::with_capacity(data.len() * 2 + correction_symbols);
    for byte in data {
        message.push_back(i32::from(byte >> 4));
        message.push_back(i32::from(byte & 0x0f));
    }
    display(&reed_solomon::encode(&message, correction_symbols))
}

/// Decodes a code of `data_len` bytes protected by `correction_symbols` check
/// symbols.
///
/// # Errors
///
/// Returns an [`Error`] when the text cannot be repaired to the expected
/// length or has more errors than the check symbols can correct.
pub fn decode(code: &str, data_len: usize, correction_symbols: usize) -> Result<Vec<u8>, Error> {
    decode_detailed(code, data_len, correction_symbols).map(|decoded| decoded.data)
}

/// Like [`decode`], but also reports which repairs and corrections were made.
///
/// # Examples
///
/// ```
/// let decoded = multicode::decode_detailed("XP 8s-1T ZA-1R 0W-X", 4, 6).unwrap();
/// assert_eq!(decoded.data, [0xDA, 0x6C, 0x1D, 0xF2]);
/// assert_eq!(decoded.repairs, [13]);
/// assert!(decoded.corrected);
/// ```
///
/// # Errors
///
/// As for [`decode`].
pub fn decode_detailed(
    code: &str,
    data_len: usize,
    correction_symbols: usize,
) -> Result<Decoded, Error> {
    // no text is long enough to reach an overflowing length
    let expected = Params::new(data_len, correction_symbols)
        .code_len()
        .unwrap_or(usize::MAX);
    let mut transcription = Transcription::read(code, expected)?;
    transcription.repair(expected);

    let actual = transcription.codes.len();
    if actual != expected {
        debug!("repair left {actual} symbols, expected {expected}");
        return Err(Error::LengthMismatch { expected, actual });
    }

    let recovered =
        reed_solomon::try_hard_decode(transcription.codes, correction_symbols, expected)?;
    let mut message = recovered.codeword;
    message.trim_end(correction_symbols);

    let data = message
        .as_slice()
        .chunks_exact(2)
        .map(|pair| ((pair[0] << 4) | pair[1]) as u8)
        .collect();
    Ok(Decoded {
        data,
        corrected: recovered.had_errors,
        repairs: transcription.repairs,
    })
}

/// Writes a codeword in its two alphabets, with a space before every second
/// symbol and a dash before every fourth.
#[must_use]
pub fn display(codeword: &IntBuffer) -> String {
    let mut text = String::with_capacity(codeword.len() * 3 / 2);
    for (i, symbol) in codeword.iter().enumerate() {
        if i > 0 && i % 4 == 0 {
            text.push('-');
        } else if i > 0 && i % 2 == 0 {
            text.push(' ');
        }
        let alphabet = if i % 2 == 0 {
            &EVEN_ALPHABET
        } else {
            &ODD_ALPHABET
        };
        text.push(alphabet[symbol as usize]);
    }
    text
}

/// What a single cleaned-up character stands for.
enum Glyph {
    Symbol { value: i32, chirality: i32 },
    Ambiguous,
    Unknown,
}

fn classify(c: char) -> Glyph {
    let even = EVEN_ALPHABET.iter().position(|&a| a == c);
    let odd = ODD_ALPHABET.iter().position(|&a| a == c);
    match (even, odd) {
        (Some(_), Some(_)) => Glyph::Ambiguous,
        (Some(value), None) => Glyph::Symbol {
            value: value as i32,
            chirality: 0,
        },
        (None, Some(value)) => Glyph::Symbol {
            value: value as i32,
            chirality: 1,
        },
        (None, None) => Glyph::Unknown,
    }
}

/// Uppercases `c` and applies the case changes. Separators give `None`.
fn normalize(c: char) -> Option<char> {
    let c = upper(c);
    if SEPARATORS.contains(&c) {
        return None;
    }
    Some(CASE_CHANGES.get(&c).copied().unwrap_or(c))
}

fn upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

#[inline]
fn parity(position: usize) -> i32 {
    (position & 1) as i32
}

/// Symbols read back from text, with the alphabet each came from.
#[derive(Debug, Default)]
struct Transcription {
    codes: IntBuffer,
    chirality: IntBuffer,
    repairs: Vec<usize>,
}

enum Step {
    Edited,
    Stop,
}

impl Transcription {
    /// Maps text to symbols, filling unknown characters with placeholders
    /// while the text is shorter than `expected`.
    #[allow(clippy::cast_lossless)]
    fn read(text: &str, expected: usize) -> Result<Self, Error> {
        let valid = text
            .chars()
            .filter_map(normalize)
            .filter(|&c| !matches!(classify(c), Glyph::Unknown))
            .count();
        let mut deficit = expected as i128 - valid as i128;

        let mut transcription = Self::default();
        let mut next_chirality = 0;
        for c in text.chars().filter_map(normalize) {
            let c = CORRECTIONS.get(&c).copied().unwrap_or(c);
            match classify(c) {
                Glyph::Symbol { value, chirality } => {
                    transcription.codes.push_back(value);
                    transcription.chirality.push_back(chirality);
                    next_chirality = chirality ^ 1;
                }
                Glyph::Ambiguous => return Err(Error::AmbiguousCharacter(c)),
                Glyph::Unknown if deficit > 0 => {
                    transcription.codes.push_back(0);
                    transcription.chirality.push_back(next_chirality);
                    next_chirality ^= 1;
                    deficit -= 1;
                }
                Glyph::Unknown => deficit += 1,
            }
        }
        Ok(transcription)
    }

    fn first_chirality_error(&self) -> Option<usize> {
        (0..self.chirality.len()).find(|&p| self.chirality.get(p) != parity(p))
    }

    fn repair(&mut self, expected: usize) {
        for _ in 0..expected {
            if let Step::Stop = self.repair_step(expected) {
                break;
            }
        }
    }

    /// Makes at most one edit towards `expected` symbols at alternating parity.
    fn repair_step(&mut self, expected: usize) -> Step {
        let len = self.codes.len();
        if len != self.chirality.len() {
            debug!("symbol and chirality counts differ");
            return Step::Stop;
        }
        if len < expected / 3 * 2 + expected % 3 * 2 / 3 {
            debug!("only {len} of {expected} symbols, too damaged to repair");
            return Step::Stop;
        }

        match (len.cmp(&expected), self.first_chirality_error()) {
            (Ordering::Equal, None) => return Step::Stop,
            (Ordering::Less, None) => {
                let chirality = parity(len);
                if expected - len == 1 && chirality != parity(expected - 1) {
                    self.insert(0, 0);
                } else {
                    self.insert(len, chirality);
                }
            }
            (Ordering::Less, Some(p)) => {
                let transposed = p + 3 < len
                    && self.chirality.get(p + 1) != parity(p + 1)
                    && self.chirality.get(p + 2) == parity(p + 2);
                if transposed {
                    self.swap(p);
                } else {
                    self.insert(p, parity(p));
                }
            }
            (Ordering::Greater, first_error) => {
                if self.chirality.get(len - 1) != parity(expected - 1) {
                    self.delete(len - 1);
                } else {
                    self.delete(first_error.unwrap_or(len - 1));
                }
            }
            (Ordering::Equal, Some(p)) => {
                if p + 1 >= expected {
                    debug!("chirality error on the last symbol, giving up");
                    return Step::Stop;
                }
                if self.chirality.get(p) == self.chirality.get(p + 1) {
                    self.flip(p);
                } else {
                    self.swap(p);
                }
            }
        }
        Step::Edited
    }

    fn insert(&mut self, position: usize, chirality: i32) {
        debug!("inserting placeholder at {position}");
        self.codes.insert_at(position, 0);
        self.chirality.insert_at(position, chirality);
        self.repairs.push(position);
    }

    fn delete(&mut self, position: usize) {
        debug!("deleting symbol at {position}");
        self.codes.delete_at(position);
        self.chirality.delete_at(position);
        self.repairs.push(position);
    }

    fn swap(&mut self, position: usize) {
        debug!("swapping symbols at {position} and {}", position + 1);
        self.codes.swap(position, position + 1);
        self.chirality.swap(position, position + 1);
        self.repairs.push(position);
    }

    fn flip(&mut self, position: usize) {
        debug!("flipping chirality at {position}");
        self.chirality.set(position, self.chirality.get(position) ^ 1);
        self.repairs.push(position);
    }
}

/// Reads `text` into symbols and repairs it towards `expected` symbols,
/// without error correction. Returns the symbols and the repair log.
///
/// # Errors
///
/// Returns [`Error::AmbiguousCharacter`] for a character found in both alphabets.
pub fn decode_display(text: &str, expected: usize) -> Result<(IntBuffer, Vec<usize>), Error> {
    let mut transcription = Transcription::read(text, expected)?;
    transcription.repair(expected);
    Ok((transcription.codes, transcription.repairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(hex: &str) -> Vec<u8> {
        hex::decode(hex).unwrap()
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(&bytes("00000000"), 6), "04 04-04 04-04 04-04");
        assert_eq!(encode(&bytes("FFFFFFFF"), 6), "ZW ZW-ZW ZW-8s YE-JR");
        assert_eq!(encode(&bytes("BC7DE6FD"), 6), "Ns 9T-YF ZT-14 JP-Js");
        assert_eq!(encode(&bytes("DA6C1DF2"), 6), "XP 8s-1T ZA-1R 0W-XD");
        assert_eq!(encode(&bytes("E137E76B"), 6), "Y5 3H-YH 8R-Gs 6W-Xs");
        assert_eq!(encode(&bytes("BE006D89"), 6), "NV 04-8T bM-qD 1A-YP");
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&[], 0), "");
        assert_eq!(encode(&[], 4), "04 04");
        assert_eq!(decode("", 0, 0).unwrap(), Vec::<u8>::new());
        assert_eq!(decode("04 04", 0, 4).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_ignores_case_and_grouping() {
        assert_eq!(decode("nS9tyfzt14jpjS", 4, 6).unwrap(), bytes("BC7DE6FD"));
        assert_eq!(decode("xp8S1tzA1R0WXD", 4, 6).unwrap(), bytes("DA6C1DF2"));
        assert_eq!(decode("Y53HYH8rgS6wxs", 4, 6).unwrap(), bytes("E137E76B"));
        assert_eq!(
            decode("  n v 0. 4 8 t b m q d. 1 a - y p", 4, 6).unwrap(),
            bytes("BE006D89")
        );
        assert_eq!(
            decode(" N-- V0...4 8 T B M Q.D..1 A -Y P", 4, 6).unwrap(),
            bytes("BE006D89")
        );
    }

    #[test]
    fn test_clean_decode_reports_nothing() {
        let decoded = decode_detailed("Ns 9T-YF ZT-14 JP-Js", 4, 6).unwrap();
        assert_eq!(decoded.data, bytes("BC7DE6FD"));
        assert!(!decoded.corrected);
        assert!(decoded.repairs.is_empty());
    }

    #[test]
    fn test_decode_transposition() {
        let decoded = decode_detailed("Ns T9-YF ZT-14 JP-Js", 4, 6).unwrap();
        assert_eq!(decoded.data, bytes("BC7DE6FD"));
        assert_eq!(decoded.repairs, [2]);
        assert!(!decoded.corrected);

        assert_eq!(
            decode("VN 40-T8 Mb-Dq A1-PY", 4, 6).unwrap(),
            bytes("BE006D89")
        );
    }

    #[test]
    fn test_decode_deletions() {
        assert_eq!(decode("XP 8s-1T ZA-1R 0W-X", 4, 6).unwrap(), bytes("DA6C1DF2"));
        assert_eq!(decode("5 3H-YH 8R-Gs 6W-Xs", 4, 6).unwrap(), bytes("E137E76B"));
        assert_eq!(decode("XP 8s-1T ZA-1R 0W", 4, 6).unwrap(), bytes("DA6C1DF2"));

        let decoded = decode_detailed("9T-YF ZT-14 JP-Js", 4, 6).unwrap();
        assert_eq!(decoded.data, bytes("BC7DE6FD"));
        assert_eq!(decoded.repairs, [12, 13]);
        assert!(decoded.corrected);
    }

    #[test]
    fn test_decode_duplications() {
        assert_eq!(
            decode("Y5 3H-YHh 8Rr-Gs 6W-Xs", 4, 6).unwrap(),
            bytes("E137E76B")
        );
        assert_eq!(
            decode("NV 04-8T Mmb-qD 1A-YP", 4, 6).unwrap(),
            bytes("BE006D89")
        );
    }

    #[test]
    fn test_decode_longer_message() {
        let data = b"Hello, world!\0";
        let code = encode(data, 8);
        assert_eq!(
            code,
            "6K 8E-8s 8s-8W 2s-24 9H-8W 9A-8s 8D-25 04-XW 6R-JR 14"
        );
        let damaged = "K6 8E-8s 8s-8W 2s-42 9H-8W 9A-8s 8D-25 04-XW 6R-JR 1 ";
        assert_eq!(decode(damaged, data.len(), 8).unwrap(), data);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            decode("04 04", 4, 6).unwrap_err(),
            Error::LengthMismatch {
                expected: 14,
                actual: 4
            }
        );
        assert_eq!(
            decode("Ns 9T-YF ~T-14 JP-Js", 4, 6).unwrap_err(),
            Error::AmbiguousCharacter('~')
        );
        assert_eq!(
            Error::from(Uncorrectable::InconsistentSearch).to_string(),
            "too many errors (B)"
        );
    }

    #[test]
    fn test_decode_huge_lengths() {
        assert_eq!(
            decode("04", usize::MAX / 2 + 1, 0),
            Err(Error::LengthMismatch {
                expected: usize::MAX,
                actual: 2
            })
        );
        assert_eq!(
            decode("04", usize::MAX / 4 + 1, 0),
            Err(Error::LengthMismatch {
                expected: usize::MAX / 2 + 1,
                actual: 2
            })
        );
        assert!(decode("04 04", 1, usize::MAX).is_err());
    }

    #[test]
    fn test_read_placeholders_and_corrections() {
        // 'O' is read as '0'; '!' stands in for a missing symbol
        let transcription = Transcription::read("O4 !4", 4).unwrap();
        assert_eq!(transcription.codes.to_vec(), vec![0, 0, 0, 0]);
        assert_eq!(transcription.chirality.to_vec(), vec![0, 1, 0, 1]);

        // no deficit, so the unknown character is dropped
        let transcription = Transcription::read("04!04", 4).unwrap();
        assert_eq!(transcription.codes.len(), 4);
    }

    #[test]
    fn test_repair_steps() {
        let (codes, repairs) = decode_display("N9sT", 4).unwrap();
        assert_eq!(codes.to_vec(), vec![11, 12, 7, 13]);
        assert_eq!(repairs, [1]);

        // both neighbours from the same alphabet: the parity is flipped in place
        let (codes, repairs) = decode_display("NN9T", 4).unwrap();
        assert_eq!(codes.to_vec(), vec![11, 11, 7, 13]);
        assert_eq!(repairs, [1]);

        // a doubled last character is dropped
        let (codes, repairs) = decode_display("Ns 9T-YF ZTT", 8).unwrap();
        assert_eq!(codes.to_vec(), vec![11, 12, 7, 13, 14, 6, 15, 13]);
        assert_eq!(repairs, [8]);

        // missing symbols at the end get placeholders
        let (codes, repairs) = decode_display("Ns 9T-YF Z", 9).unwrap();
        assert_eq!(codes.to_vec(), vec![11, 12, 7, 13, 14, 6, 15, 0, 0]);
        assert_eq!(repairs, [7, 8]);

        // a swap first, then placeholders for what is still missing
        let (codes, repairs) = decode_display("Ns T9-YF ZT", 10).unwrap();
        assert_eq!(codes.to_vec(), vec![11, 12, 7, 13, 14, 6, 15, 13, 0, 0]);
        assert_eq!(repairs, [2, 8, 9]);
    }

    #[test]
    fn test_params() {
        let params = Params::new(4, 6);
        assert_eq!(params.code_len(), Some(14));
        assert_eq!(Params::new(usize::MAX / 2 + 1, 0).code_len(), None);
        assert_eq!(
            params.decode("Ns 9T-YF ZT-14 JP-Js").unwrap().data,
            bytes("BC7DE6FD")
        );
    }
}
