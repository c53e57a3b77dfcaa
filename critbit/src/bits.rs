// Copyright (C) 2025, Ava Labs, Inc. All rights reserved.
// See the file LICENSE.md for licensing terms.

//! Bit-level primitives over 64-bit keys.
//!
//! Positions count from the most significant bit: position 0 is the MSB and
//! position 63 is the LSB. Every function here is total for positions in
//! `0..KEY_BITS`; positions outside that range are a caller bug.

/// Width of every key, in bits.
pub const KEY_BITS: u8 = 64;

/// Mask with only bit `pos` set.
#[inline]
const fn bit_mask(pos: u8) -> u64 {
    debug_assert!(pos < KEY_BITS);
    1u64 << (KEY_BITS - 1 - pos)
}

/// Returns the bit at `pos`.
#[inline]
#[must_use]
pub const fn bit_at(word: u64, pos: u8) -> bool {
    word & bit_mask(pos) != 0
}

/// Returns `word` with the bit at `pos` set.
#[inline]
#[must_use]
pub const fn set_bit(word: u64, pos: u8) -> u64 {
    word | bit_mask(pos)
}

/// Returns `word` with the bit at `pos` cleared.
#[inline]
#[must_use]
pub const fn clear_bit(word: u64, pos: u8) -> u64 {
    word & !bit_mask(pos)
}

/// A mask with the leading `depth` bits set.
///
/// `depth == 0` yields an empty mask and `depth == 64` yields all ones, so
/// neither end needs a shift by the full word width.
#[inline]
#[must_use]
pub const fn high_mask(depth: u8) -> u64 {
    match depth {
        0 => 0,
        d if d >= KEY_BITS => u64::MAX,
        d => u64::MAX << (KEY_BITS - d),
    }
}

/// Keeps bits `[0, end]` of `word` and clears everything after `end`.
#[inline]
#[must_use]
pub const fn extract_prefix(word: u64, end: u8) -> u64 {
    word & high_mask(end + 1)
}

/// Keeps the `crit_bit` bits that precede `crit_bit`.
///
/// This is the prefix a slot stores for a child node: only the bits strictly
/// before the child's critical bit are meaningful.
#[inline]
#[must_use]
pub const fn prefix_through(word: u64, crit_bit: u8) -> u64 {
    word & high_mask(crit_bit)
}

/// Whether `a` and `b` agree on bits `[0, bits)`. An empty prefix always matches.
#[inline]
#[must_use]
pub const fn prefix_matches(bits: u8, a: u64, b: u64) -> bool {
    (a ^ b) & high_mask(bits) == 0
}

/// The most significant position at which `a` and `b` differ, or `None` if
/// they are equal.
#[inline]
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "leading_zeros < 64 here")]
pub const fn crit_bit(a: u64, b: u64) -> Option<u8> {
    let diff = a ^ b;
    if diff == 0 {
        None
    } else {
        Some(diff.leading_zeros() as u8)
    }
}

/// Renders the leading `width` bits of `word`, MSB first, with a `.` every 8 bits.
#[must_use]
pub fn to_binary(word: u64, width: u8) -> String {
    let width = width.min(KEY_BITS);
    let mut out = String::with_capacity(usize::from(width) + usize::from(width / 8));
    for pos in 0..width {
        if pos != 0 && pos % 8 == 0 {
            out.push('.');
        }
        out.push(if bit_at(word, pos) { '1' } else { '0' });
    }
    out
}

/// Maps an `i64` to a `u64` whose unsigned order matches the signed order.
#[inline]
#[must_use]
#[expect(clippy::cast_sign_loss, reason = "bit reinterpretation is the point")]
pub const fn i64_to_sortable(value: i64) -> u64 {
    (value as u64) ^ (1 << 63)
}

/// Inverse of [`i64_to_sortable`].
#[inline]
#[must_use]
#[expect(clippy::cast_possible_wrap, reason = "bit reinterpretation is the point")]
pub const fn sortable_to_i64(value: u64) -> i64 {
    (value ^ (1 << 63)) as i64
}

/// Maps an `f64` to a `u64` whose unsigned order matches the IEEE-754 total order.
///
/// Negative values have every bit flipped, positive values only the sign bit,
/// so `-0.0` sorts just below `0.0` and NaNs land at the extremes.
#[inline]
#[must_use]
pub const fn f64_to_sortable(value: f64) -> u64 {
    let bits = value.to_bits();
    if bits & (1 << 63) == 0 {
        bits ^ (1 << 63)
    } else {
        !bits
    }
}

/// Inverse of [`f64_to_sortable`].
#[inline]
#[must_use]
pub const fn sortable_to_f64(value: u64) -> f64 {
    let bits = if value & (1 << 63) == 0 {
        !value
    } else {
        value ^ (1 << 63)
    };
    f64::from_bits(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0x8000_0000_0000_0000, 0, true)]
    #[test_case(0x8000_0000_0000_0000, 1, false)]
    #[test_case(1, 63, true)]
    #[test_case(1, 62, false)]
    fn bit_at_counts_from_msb(word: u64, pos: u8, expected: bool) {
        assert_eq!(bit_at(word, pos), expected);
    }

    #[test]
    fn set_and_clear_are_inverse() {
        for pos in 0..KEY_BITS {
            let set = set_bit(0, pos);
            assert!(bit_at(set, pos));
            assert_eq!(set.count_ones(), 1);
            assert_eq!(clear_bit(set, pos), 0);
            assert_eq!(clear_bit(u64::MAX, pos).count_zeros(), 1);
        }
    }

    #[test_case(0, 0)]
    #[test_case(1, 0x8000_0000_0000_0000)]
    #[test_case(8, 0xff00_0000_0000_0000)]
    #[test_case(63, 0xffff_ffff_ffff_fffe)]
    #[test_case(64, u64::MAX)]
    fn high_mask_edges(depth: u8, expected: u64) {
        assert_eq!(high_mask(depth), expected);
    }

    #[test]
    fn extract_prefix_keeps_last_bit_inclusive() {
        assert_eq!(extract_prefix(u64::MAX, 63), u64::MAX);
        assert_eq!(extract_prefix(u64::MAX, 0), 0x8000_0000_0000_0000);
        assert_eq!(extract_prefix(0x0123_4567_89ab_cdef, 15), 0x0123_0000_0000_0000);
        assert_eq!(prefix_through(u64::MAX, 0), 0);
        assert_eq!(prefix_through(0x0123_4567_89ab_cdef, 16), 0x0123_0000_0000_0000);
    }

    #[test_case(0, 0, u64::MAX, true ; "empty prefix always matches")]
    #[test_case(1, 0, u64::MAX, false)]
    #[test_case(4, 0x0fff_0000_0000_0000, 0x0000_0000_0000_0000, true)]
    #[test_case(5, 0x0fff_0000_0000_0000, 0x0000_0000_0000_0000, false)]
    #[test_case(64, 7, 7, true)]
    fn prefix_match_cases(bits: u8, a: u64, b: u64, expected: bool) {
        assert_eq!(prefix_matches(bits, a, b), expected);
    }

    #[test]
    fn crit_bit_is_first_difference() {
        assert_eq!(crit_bit(5, 5), None);
        assert_eq!(crit_bit(0, u64::MAX), Some(0));
        assert_eq!(crit_bit(2, 3), Some(63));
        assert_eq!(crit_bit(1, 2), Some(62));
    }

    #[test]
    fn binary_rendering() {
        assert_eq!(to_binary(0xa5, 4), "0000");
        assert_eq!(
            to_binary(0xa500_0000_0000_0000, 16),
            "10100101.00000000"
        );
        assert_eq!(to_binary(u64::MAX, 64).len(), 64 + 7);
    }

    #[test]
    fn signed_encoding_preserves_order() {
        let values = [i64::MIN, -1_000, -1, 0, 1, 42, i64::MAX];
        for pair in values.windows(2) {
            let [a, b] = pair else { unreachable!() };
            assert!(i64_to_sortable(*a) < i64_to_sortable(*b));
        }
        for v in values {
            assert_eq!(sortable_to_i64(i64_to_sortable(v)), v);
        }
    }

    #[test]
    fn float_encoding_preserves_order() {
        let values = [
            f64::NEG_INFINITY,
            -1.5e300,
            -2.0,
            -0.0,
            0.0,
            f64::MIN_POSITIVE,
            3.25,
            f64::INFINITY,
        ];
        for pair in values.windows(2) {
            let [a, b] = pair else { unreachable!() };
            assert!(f64_to_sortable(*a) < f64_to_sortable(*b), "{a} < {b}");
        }
        for v in values {
            assert_eq!(sortable_to_f64(f64_to_sortable(v)).to_bits(), v.to_bits());
        }
    }
}
