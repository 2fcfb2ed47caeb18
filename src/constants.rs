//! Character tables shared by the text encoder and decoder.
//!
//! Symbols at even display positions come from [`EVEN_ALPHABET`] and symbols
//! at odd positions from [`ODD_ALPHABET`]. No character other than the
//! [`SENTINEL`] appears in both, so a character's alphabet tells the decoder
//! which parity ("chirality") it was written at.

/// Alphabet for symbols at even positions, indexed by symbol value.
pub const EVEN_ALPHABET: [char; 17] = [
    '0', '1', '2', '3', '6', '7', '8', '9', 'b', 'G', 'J', 'N', 'q', 'X', 'Y', 'Z', SENTINEL,
];

/// Alphabet for symbols at odd positions, indexed by symbol value.
pub const ODD_ALPHABET: [char; 17] = [
    '4', '5', 'A', 'C', 'D', 'E', 'F', 'H', 'K', 'M', 'P', 'R', 's', 'T', 'V', 'W', SENTINEL,
];

/// Error marker present in both alphabets. Never produced by the encoder.
pub const SENTINEL: char = '~';

/// Grouping characters a reader may type between symbols. They carry no data.
pub static SEPARATORS: phf::Set<char> = phf::phf_set! {
    ' ', '-', '.', '_', '+', '*', '#',
};

/// Applied after uppercasing: these letters are written in lower case so they
/// stand apart from `8`, `9` and `5`.
pub static CASE_CHANGES: phf::Map<char, char> = phf::phf_map! {
    'B' => 'b',
    'Q' => 'q',
    'S' => 's',
};

/// Likely misreadings of characters that are not in either alphabet.
pub static CORRECTIONS: phf::Map<char, char> = phf::phf_map! {
    'O' => '0',
    'L' => '1',
    'I' => '1',
    'U' => 'V',
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabets_only_share_the_sentinel() {
        for c in EVEN_ALPHABET.iter().filter(|c| **c != SENTINEL) {
            assert!(!ODD_ALPHABET.contains(c), "{c} is in both alphabets");
        }
        assert_eq!(EVEN_ALPHABET[16], SENTINEL);
        assert_eq!(ODD_ALPHABET[16], SENTINEL);
    }

    #[test]
    fn test_corrections_land_in_an_alphabet() {
        for (from, to) in CORRECTIONS.entries() {
            assert!(!EVEN_ALPHABET.contains(from) && !ODD_ALPHABET.contains(from));
            assert!(EVEN_ALPHABET.contains(to) || ODD_ALPHABET.contains(to));
        }
        for to in CASE_CHANGES.values() {
            assert!(EVEN_ALPHABET.contains(to) || ODD_ALPHABET.contains(to));
        }
    }

    #[test]
    fn test_separators_are_not_symbols() {
        for c in SEPARATORS.iter() {
            assert!(!EVEN_ALPHABET.contains(c) && !ODD_ALPHABET.contains(c));
        }
    }
}
