//! Arithmetic over GF(2^4) and the polynomial helpers the Reed–Solomon codec
//! needs.
//!
//! - Field: GF(2^4) = GF(16), one symbol per nibble
//! - Reduction constant: x^4 + x + 1 (`0b10011`)
//! - Generator: α = 2
//!
//! Polynomials are [`IntBuffer`]s holding the highest-degree coefficient at
//! index 0. The reduction constant is part of the wire format: changing it
//! changes every code ever produced.

use crate::buffer::IntBuffer;

const PRIME: i32 = 0b1_0011;
const EXP_LEN: usize = 32;
const LOG_LEN: usize = 16;

static TABLES: Tables = build_tables();

struct Tables {
    exp: [i32; EXP_LEN],
    log: [i32; LOG_LEN],
}

const fn build_tables() -> Tables {
    let mut exp = [0; EXP_LEN];
    let mut log = [0; LOG_LEN];

    let mut x = 1;
    let mut i = 0;
    while i < 16 {
        exp[i] = x & 0x0f;
        // α^15 wraps back to 1, so log[1] ends up as 15 rather than 0
        log[x as usize] = (i as i32) & 0x0f;
        x <<= 1;
        if x & 0x110 != 0 {
            x ^= PRIME;
        }
        i += 1;
    }

    // Duplicate exp so sums of two logs can index it directly.
    let mut j = 15;
    while j < EXP_LEN {
        exp[j] = exp[j - 15] & 0x0f;
        j += 1;
    }

    Tables { exp, log }
}

#[inline]
fn log(n: i32) -> usize {
    debug_assert!((0..16).contains(&n), "{n} is not a GF(16) symbol");
    TABLES.log[n as usize] as usize
}

#[inline]
fn exp(power: usize) -> i32 {
    TABLES.exp[power]
}

/// Addition and subtraction are the same operation in GF(2^n).
#[inline]
#[must_use]
pub fn add_sub(a: i32, b: i32) -> i32 {
    (a ^ b) & 0x0f
}

#[inline]
#[must_use]
pub fn mul(a: i32, b: i32) -> i32 {
    if a == 0 || b == 0 {
        0
    } else {
        exp((log(a) + log(b)) % 15)
    }
}

/// Division by zero yields zero rather than failing.
#[inline]
#[must_use]
pub fn div(a: i32, b: i32) -> i32 {
    if a == 0 || b == 0 {
        0
    } else {
        exp((log(a) + 15 - log(b)) % 15)
    }
}

#[inline]
#[must_use]
pub fn pow(n: i32, p: usize) -> i32 {
    exp((log(n) * p) % 15)
}

/// Multiplicative inverse. `n` must not be zero.
#[inline]
#[must_use]
pub fn inverse(n: i32) -> i32 {
    debug_assert!(n != 0, "zero has no inverse");
    exp(15 - log(n))
}

#[must_use]
pub fn scalar_mul(p: &IntBuffer, scalar: i32) -> IntBuffer {
    let mut result = IntBuffer::by_size(p.len());
    for (i, coefficient) in p.iter().enumerate() {
        result.set(i, mul(coefficient, scalar));
    }
    result
}

/// Adds two polynomials, lining them up on their lowest-degree end.
#[must_use]
pub fn add_poly(p: &IntBuffer, q: &IntBuffer) -> IntBuffer {
    let len = p.len().max(q.len());
    let mut result = IntBuffer::by_size(len);
    for (i, coefficient) in p.iter().enumerate() {
        result.set(i + len - p.len(), coefficient);
    }
    for (i, coefficient) in q.iter().enumerate() {
        let idx = i + len - q.len();
        result.set(idx, result.get(idx) ^ coefficient);
    }
    result
}

/// Full product of two polynomials. Either operand being empty gives an empty result.
#[must_use]
pub fn mul_poly(p: &IntBuffer, q: &IntBuffer) -> IntBuffer {
    if p.is_empty() || q.is_empty() {
        return IntBuffer::by_size(0);
    }
    let mut result = IntBuffer::by_size(p.len() + q.len() - 1);
    for (j, b) in q.iter().enumerate() {
        for (i, a) in p.iter().enumerate() {
            result.set(i + j, add_sub(result.get(i + j), mul(a, b)));
        }
    }
    result
}

/// Evaluates `p` at `x` with Horner's method.
#[must_use]
pub fn eval_poly(p: &IntBuffer, x: i32) -> i32 {
    let mut coefficients = p.iter();
    let Some(first) = coefficients.next() else {
        return 0;
    };
    coefficients.fold(first, |y, c| mul(y, x) ^ c) & 0x0f
}

/// The Reed–Solomon generator polynomial for `symbols` check symbols:
/// the product of `(x + 2^i)` for `i` in `0..symbols`.
#[must_use]
pub fn irreducible_poly(symbols: usize) -> IntBuffer {
    let mut generator = IntBuffer::single_one();
    let mut factor = IntBuffer::pair(1, 1);
    for i in 0..symbols {
        factor.set(1, pow(2, i));
        generator = mul_poly(&generator, &factor);
    }
    generator
}
