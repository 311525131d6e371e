//! Luhn checksum for payment card validation.

/// Shortest card number accepted.
pub const MIN_CARD_DIGITS: usize = 13;
/// Longest card number accepted.
pub const MAX_CARD_DIGITS: usize = 19;

/// Validate a digit-only card number.
///
/// Anything that is not 13 to 19 ASCII digits is rejected before summing.
#[inline]
pub fn is_valid_luhn(number: &str) -> bool {
    let len = number.len();
    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&len)
        || !number.bytes().all(|b| b.is_ascii_digit())
    {
        return false;
    }

    let mut sum: u32 = 0;
    for (i, b) in number.bytes().rev().enumerate() {
        let mut val = (b - b'0') as u32;
        if i % 2 == 1 {
            val *= 2;
            if val > 9 {
                val -= 9;
            }
        }
        sum += val;
    }

    sum % 10 == 0
}

/// Strip everything but ASCII digits.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}
