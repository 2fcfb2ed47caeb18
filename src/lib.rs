//! `multicode` turns short binary payloads into codes that people can read
//! aloud, type and copy by hand, and recovers the payload from imperfect
//! copies.
//!
//! # Encode binary data
//! ```
//! let code = multicode::encode(&[0xDA, 0x6C, 0x1D, 0xF2], 6);
//! assert_eq!(code, "XP 8s-1T ZA-1R 0W-XD");
//! ```
//!
//! # Decode a careless copy
//!
//! Case, spacing and grouping do not matter. Swapped, missing and doubled
//! characters are repaired, and the Reed–Solomon check symbols correct the
//! rest. The decoder has to be told the payload length and the number of
//! check symbols.
//! ```
//! // last character missing
//! let data = multicode::decode("xp 8s 1t za 1r 0w x", 4, 6).unwrap();
//! assert_eq!(data, [0xDA, 0x6C, 0x1D, 0xF2]);
//! ```
//!
//! # Failure is explicit
//!
//! One mistake in a code of at most 15 symbols is always recovered. Damage
//! beyond what the check symbols can fix is usually reported as an
//! [`Error`], but heavy damage can occasionally repair into a different valid
//! code and decode to the wrong data.
//! ```
//! use multicode::Error;
//! assert_eq!(
//!     multicode::decode("XP 8s", 4, 6),
//!     Err(Error::LengthMismatch { expected: 14, actual: 4 })
//! );
//! ```

pub mod buffer;
pub mod constants;
pub mod galois;
pub mod multicode;
pub mod noise;
pub mod reed_solomon;

pub use self::multicode::decode;
pub use self::multicode::decode_detailed;
pub use self::multicode::encode;
pub use self::multicode::Decoded;
pub use self::multicode::Error;
pub use self::multicode::Params;
