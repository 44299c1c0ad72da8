//! ASCII byte classification shared by the compile and scan paths.
//!
//! A single 256-entry flag table answers the three questions the matcher
//! asks about a byte: is it punctuation, is it whitespace, is it a word
//! character. The definitions are byte-oriented and ASCII-only:
//!
//! - punctuation: printable non-alphanumeric, non-space, excluding `_`
//! - whitespace: `\t \n \v \f \r ' ' \a \b`
//! - word: `[A-Za-z0-9_]`

const PUNCT: u8 = 1 << 0;
const SPACE: u8 = 1 << 1;
const WORD: u8 = 1 << 2;

const fn build_class_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        let mut flags = 0u8;

        if matches!(b, b'!'..=b'/' | b':'..=b'@' | b'['..=b'^' | b'`' | b'{'..=b'~') {
            flags |= PUNCT;
        }

        // BEL and BS are treated as whitespace alongside the usual set.
        if matches!(b, 0x07..=0x0D | b' ') {
            flags |= SPACE;
        }

        if b.is_ascii_alphanumeric() || b == b'_' {
            flags |= WORD;
        }

        table[i] = flags;
        i += 1;
    }
    table
}

static CLASS: [u8; 256] = build_class_table();

#[inline(always)]
pub fn is_punct(b: u8) -> bool {
    CLASS[b as usize] & PUNCT != 0
}

#[inline(always)]
pub fn is_space(b: u8) -> bool {
    CLASS[b as usize] & SPACE != 0
}

#[inline(always)]
pub fn is_word(b: u8) -> bool {
    CLASS[b as usize] & WORD != 0
}

#[inline(always)]
pub fn is_line_break(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}
