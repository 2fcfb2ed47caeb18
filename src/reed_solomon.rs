//! Systematic Reed–Solomon coding over GF(16).
//!
//! A codeword is the message followed by `correction_symbols` check symbols.
//! Decoding computes syndromes, builds an error locator with a
//! Berlekamp–Massey recurrence, finds its roots with a Chien search and fixes
//! the located symbols with the Forney algorithm. Every correction is verified
//! by recomputing the syndromes; a decode never returns a codeword that does
//! not check out.

use log::{debug, trace};

use crate::buffer::IntBuffer;
use crate::galois::{
    add_poly, add_sub, div, eval_poly, inverse, irreducible_poly, mul, mul_poly, pow,
    scalar_mul,
};

/// Why a codeword could not be corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Uncorrectable {
    /// The error locator has a higher degree than the check symbols can fix.
    #[error("too many errors (A)")]
    LocatorDegree,
    /// The Chien search found a different number of roots than the locator degree.
    #[error("too many errors (B)")]
    InconsistentSearch,
    /// Syndromes were still non-zero after correction.
    #[error("too many errors (C)")]
    ResidualSyndromes,
}

/// A codeword that passed the syndrome check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub codeword: IntBuffer,
    /// Whether any symbol had to be changed (or the word rotated) to get here.
    pub had_errors: bool,
}

/// Appends `correction_symbols` check symbols to `message`.
#[must_use]
pub fn encode(message: &IntBuffer, correction_symbols: usize) -> IntBuffer {
    let generator = irreducible_poly(correction_symbols);
    let mut mix = IntBuffer::by_size(message.len() + generator.len() - 1);
    for (i, symbol) in message.iter().enumerate() {
        mix.set(i, symbol);
    }

    // long division by the generator; the remainder is left in the tail
    for i in 0..message.len() {
        let coefficient = mix.get(i);
        if coefficient == 0 {
            continue;
        }
        for j in 1..generator.len() {
            mix.set(i + j, mix.get(i + j) ^ mul(generator.get(j), coefficient));
        }
    }

    for (i, symbol) in message.iter().enumerate() {
        mix.set(i, symbol);
    }
    mix
}

/// Evaluates the codeword at `2^i` for each check symbol. Index 0 is always zero.
#[must_use]
pub fn calc_syndromes(codeword: &IntBuffer, correction_symbols: usize) -> IntBuffer {
    let mut syndromes = IntBuffer::by_size(correction_symbols + 1);
    for i in 0..correction_symbols {
        syndromes.set(i + 1, eval_poly(codeword, pow(2, i)));
    }
    syndromes
}

/// Builds the error locator polynomial from the syndromes.
///
/// `erasures` is the number of symbols known to be missing. The text decoder
/// always normalises the length before decoding, so it is zero in practice.
#[must_use]
pub fn error_locator_poly(
    syndromes: &IntBuffer,
    correction_symbols: usize,
    erasures: usize,
) -> IntBuffer {
    let mut locator = IntBuffer::single_one();
    let mut previous = IntBuffer::single_one();
    let shift = syndromes.len().saturating_sub(correction_symbols);

    for i in 0..correction_symbols.saturating_sub(erasures) {
        let kappa = i + shift;
        let mut delta = syndromes.get(kappa);
        for j in 1..locator.len() {
            delta ^= mul(locator.get(locator.len() - (j + 1)), syndromes.get(kappa - j));
        }
        previous.push_back(0);
        if delta != 0 {
            if previous.len() > locator.len() {
                let grown = scalar_mul(&previous, delta);
                previous = scalar_mul(&locator, inverse(delta));
                locator = grown;
            }
            locator = add_poly(&locator, &scalar_mul(&previous, delta));
        }
    }

    locator.trim_leading_zeros();
    locator
}

/// Chien search: the positions in a codeword of `length` symbols where the
/// locator has a root.
///
/// Returns an empty list when the number of roots does not match the degree
/// of the locator.
#[must_use]
pub fn find_errors(locator: &IntBuffer, length: usize) -> IntBuffer {
    let mut reversed = locator.clone();
    reversed.reverse();

    let mut positions = IntBuffer::by_size(0);
    for i in 0..length {
        if eval_poly(&reversed, pow(2, i)) == 0 {
            positions.push_back((length - 1 - i) as i32);
        }
    }

    if locator.len().checked_sub(1) != Some(positions.len()) {
        positions.clear();
    }
    positions
}

/// The locator restricted to the known error coefficients.
fn data_error_locator_poly(coefficient_positions: &[usize]) -> IntBuffer {
    let mut locator = IntBuffer::single_one();
    for &position in coefficient_positions {
        locator = mul_poly(&locator, &IntBuffer::pair(pow(2, position), 1));
    }
    locator
}

/// Keeps the lowest `degree + 1` coefficients of `syndromes * locator`.
fn error_evaluator(syndromes: &IntBuffer, locator: &IntBuffer, degree: usize) -> IntBuffer {
    let mut poly = mul_poly(syndromes, locator);
    let drop = poly.len().saturating_sub(degree + 1);
    let keep = poly.len() - drop;
    // only the first `drop` slots are shifted down
    for i in 0..drop.min(keep) {
        poly.set(i, poly.get(i + drop));
    }
    poly.trim_end(drop);
    poly
}

/// Forney correction of the symbols at `positions`. Returns a corrected copy.
#[must_use]
pub fn correct_errors(
    codeword: &IntBuffer,
    syndromes: &IntBuffer,
    positions: &IntBuffer,
) -> IntBuffer {
    let len = codeword.len();
    let mut syndromes = syndromes.clone();
    syndromes.reverse();

    let coefficient_positions: Vec<usize> = positions
        .iter()
        .map(|p| len - 1 - p as usize)
        .collect();
    let locator = data_error_locator_poly(&coefficient_positions);
    let evaluator = error_evaluator(&syndromes, &locator, locator.len() - 1);

    let roots: Vec<i32> = coefficient_positions.iter().map(|&c| pow(2, c)).collect();
    let mut magnitudes = IntBuffer::by_size(len);
    for (i, &root) in roots.iter().enumerate() {
        let root_inverse = inverse(root);
        let prime = roots
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .fold(1, |acc, (_, &other)| mul(acc, add_sub(1, mul(root_inverse, other))));

        let y = mul(root, eval_poly(&evaluator, root_inverse));
        magnitudes.set(positions.get(i) as usize, div(y, prime));
    }

    add_poly(codeword, &magnitudes)
}

/// One decode attempt on a codeword as received.
///
/// # Errors
///
/// Returns [`Uncorrectable`] when the codeword has more errors than the
/// check symbols can locate and fix.
pub fn decode_once(
    codeword: &IntBuffer,
    correction_symbols: usize,
    expected_length: usize,
) -> Result<Recovered, Uncorrectable> {
    let erasures = expected_length.saturating_sub(codeword.len());
    let syndromes = calc_syndromes(codeword, correction_symbols);
    if syndromes.all_zero() {
        return Ok(Recovered {
            codeword: codeword.clone(),
            had_errors: false,
        });
    }

    let locator = error_locator_poly(&syndromes, correction_symbols, erasures);
    if locator.len().saturating_sub(1 + erasures) > correction_symbols {
        debug!("locator degree {} exceeds {correction_symbols}", locator.len().saturating_sub(1));
        return Err(Uncorrectable::LocatorDegree);
    }

    let mut positions = find_errors(&locator, codeword.len());
    if positions.is_empty() {
        debug!("chien search found no consistent error positions");
        return Err(Uncorrectable::InconsistentSearch);
    }
    positions.reverse();

    let corrected = correct_errors(codeword, &syndromes, &positions);
    if !calc_syndromes(&corrected, correction_symbols).all_zero() {
        debug!("syndromes non-zero after correcting {positions:?}");
        return Err(Uncorrectable::ResidualSyndromes);
    }

    debug!("corrected symbols at {positions:?}");
    Ok(Recovered {
        codeword: corrected,
        had_errors: true,
    })
}

/// Decodes, retrying with rotated codewords when the direct attempt fails.
///
/// A zero symbol dropped at one end of a transcription looks the same as a
/// zero that was never there, so leading zeros are rotated to the end (and
/// then trailing zeros to the front) one at a time, decoding after each step.
/// At most `len / 2` rotations are tried in each direction.
///
/// # Errors
///
/// Returns the last [`Uncorrectable`] reason when no rotation decodes.
pub fn try_hard_decode(
    mut codeword: IntBuffer,
    correction_symbols: usize,
    expected_length: usize,
) -> Result<Recovered, Uncorrectable> {
    let mut failure = match decode_once(&codeword, correction_symbols, expected_length) {
        Ok(recovered) => return Ok(recovered),
        Err(reason) => reason,
    };

    let half = codeword.len() / 2;
    let mut rotations = 0;
    while rotations < half {
        let first = codeword.pop_front();
        if first != 0 {
            codeword.push_front(first);
            break;
        }
        codeword.push_back(first);
        rotations += 1;

        trace!("retrying with {rotations} leading zeros rotated to the end");
        match decode_once(&codeword, correction_symbols, expected_length) {
            Ok(recovered) => return Ok(rotated(recovered)),
            Err(reason) => failure = reason,
        }
    }

    for _ in 0..rotations {
        let last = codeword.pop_back();
        codeword.push_front(last);
    }

    for step in 1..=half {
        let last = codeword.pop_back();
        if last != 0 {
            codeword.push_back(last);
            break;
        }
        codeword.push_front(last);

        trace!("retrying with {step} trailing zeros rotated to the front");
        match decode_once(&codeword, correction_symbols, expected_length) {
            Ok(recovered) => return Ok(rotated(recovered)),
            Err(reason) => failure = reason,
        }
    }

    Err(failure)
}

fn rotated(recovered: Recovered) -> Recovered {
    Recovered {
        had_errors: true,
        ..recovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(values: &[i32]) -> IntBuffer {
        IntBuffer::from(values)
    }

    #[test]
    fn test_encode_is_systematic() {
        let encoded = encode(&buffer(&[1, 2, 3, 4]), 6);
        assert_eq!(encoded.to_vec(), vec![1, 2, 3, 4, 13, 15, 1, 3, 14, 10]);
        assert_eq!(
            encode(&buffer(&[0, 0, 0, 1]), 4).to_vec(),
            vec![0, 0, 0, 1, 15, 3, 1, 12]
        );
        assert_eq!(encode(&buffer(&[5, 6]), 0).to_vec(), vec![5, 6]);
        assert_eq!(encode(&IntBuffer::by_size(0), 3).to_vec(), vec![0, 0, 0]);
    }

    #[test]
    fn test_syndromes() {
        let encoded = encode(&buffer(&[1, 2, 3, 4]), 6);
        let syndromes = calc_syndromes(&encoded, 6);
        assert_eq!(syndromes.len(), 7);
        assert!(syndromes.all_zero());

        let mut damaged = encoded.clone();
        damaged.set(3, 9);
        let syndromes = calc_syndromes(&damaged, 6);
        assert_eq!(syndromes.get(0), 0);
        assert!(!syndromes.all_zero());
    }

    #[test]
    fn test_locate_single_error() {
        let mut codeword = encode(&buffer(&[1, 2, 3, 4]), 6);
        codeword.set(2, 7);
        let syndromes = calc_syndromes(&codeword, 6);
        let locator = error_locator_poly(&syndromes, 6, 0);
        assert_eq!(locator.len(), 2);
        assert_eq!(find_errors(&locator, codeword.len()).to_vec(), vec![2]);
    }

    #[test]
    fn test_clean_decode() {
        let codeword = encode(&buffer(&[1, 2, 3, 4]), 6);
        let recovered = decode_once(&codeword, 6, codeword.len()).unwrap();
        assert!(!recovered.had_errors);
        assert_eq!(recovered.codeword, codeword);
    }

    #[test]
    fn test_correct_two_errors() {
        let codeword = encode(&buffer(&[1, 2, 3, 4]), 6);
        let damaged = buffer(&[1, 2, 6, 4, 13, 15, 1, 3, 14, 11]);
        let recovered = decode_once(&damaged, 6, damaged.len()).unwrap();
        assert!(recovered.had_errors);
        assert_eq!(recovered.codeword, codeword);
        // the input is left alone
        assert_eq!(damaged.get(2), 6);
    }

    #[test]
    fn test_correct_three_errors() {
        let codeword = encode(&buffer(&[9, 8, 7, 6, 5, 4]), 6);
        let mut damaged = codeword.clone();
        damaged.set(0, 0);
        damaged.set(5, 1);
        damaged.set(11, damaged.get(11) ^ 0b0101);
        let recovered = decode_once(&damaged, 6, damaged.len()).unwrap();
        assert_eq!(recovered.codeword, codeword);
    }

    #[test]
    fn test_inconsistent_search() {
        let damaged = buffer(&[3, 4, 7, 15, 0, 11, 12, 9, 10, 14]);
        assert_eq!(
            decode_once(&damaged, 6, damaged.len()).unwrap_err(),
            Uncorrectable::InconsistentSearch
        );
    }

    #[test]
    fn test_residual_syndromes() {
        let damaged = buffer(&[2, 9, 8, 4, 6, 1, 11, 2, 3, 4]);
        assert_eq!(
            decode_once(&damaged, 6, damaged.len()).unwrap_err(),
            Uncorrectable::ResidualSyndromes
        );
    }

    #[test]
    fn test_try_hard_rotates_trailing_zeros() {
        // "Ns" dropped from the front of a code, then padded with zeros at the end
        let damaged = buffer(&[7, 13, 14, 6, 15, 13, 1, 0, 10, 10, 10, 12, 0, 0]);
        assert!(decode_once(&damaged, 6, 14).is_err());

        let recovered = try_hard_decode(damaged, 6, 14).unwrap();
        assert!(recovered.had_errors);
        assert_eq!(
            recovered.codeword.to_vec(),
            vec![11, 12, 7, 13, 14, 6, 15, 13, 1, 0, 10, 10, 10, 12]
        );
    }

    #[test]
    fn test_try_hard_reports_failure() {
        let damaged = buffer(&[3, 4, 7, 15, 0, 11, 12, 9, 10, 14]);
        assert_eq!(
            try_hard_decode(damaged, 6, 10).unwrap_err(),
            Uncorrectable::InconsistentSearch
        );
    }

    #[test]
    fn test_uncorrectable_messages() {
        assert_eq!(Uncorrectable::LocatorDegree.to_string(), "too many errors (A)");
        assert_eq!(Uncorrectable::InconsistentSearch.to_string(), "too many errors (B)");
        assert_eq!(Uncorrectable::ResidualSyndromes.to_string(), "too many errors (C)");
    }
}
