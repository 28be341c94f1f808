/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Price codec.
//!
//! A price travels as an unsigned integer whose 7-bit groups line up with the
//! byte boundaries of the varint framing applied by the transport. The number
//! of groups in use is the *level* `L` (0..=7). Inside the `7 * (L + 1)` bit
//! window a level stores a scale field in its top bits and a mantissa below it:
//!
//! | level | window | scale bits | mantissa bits | decimals |
//! |-------|--------|------------|---------------|----------|
//! | 0     | 7      | 0          | 7             | 1        |
//! | 1     | 14     | 1          | 13            | 1..=2    |
//! | 2     | 21     | 2          | 19            | 1..=4    |
//! | 3     | 28     | 3          | 25            | 1..=8    |
//! | 4..=7 | 35..56 | 4          | 31..52        | 1..=16   |
//!
//! The decoded value is `mantissa * 10^-(scale + 1)`. The level of an encoded
//! value is the highest level with any bit set in its top 7-bit group.
//!
//! `NAN_PRICE` is the level-1 word with scale field 1 and a zero mantissa,
//! which would otherwise be a redundant spelling of zero.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::debug;

const LEVELS: usize = 8;
const GROUP_BITS: u32 = 7;
const SCALE_BITS: [u32; LEVELS] = [0, 1, 2, 3, 4, 4, 4, 4];

/// Reserved encoding for NaN.
pub const NAN_PRICE: u64 = 1 << 13;

/// Largest value that fits in eight 7-bit groups. Anything above decodes to NaN.
pub const MAX_ENCODED_PRICE: u64 = (1 << (GROUP_BITS * LEVELS as u32)) - 1;

const fn window_bits(level: usize) -> u32 {
    GROUP_BITS * (level as u32 + 1)
}

const fn mantissa_bits(level: usize) -> u32 {
    window_bits(level) - SCALE_BITS[level]
}

const fn mantissa_mask(level: usize) -> u64 {
    (1u64 << mantissa_bits(level)) - 1
}

const fn level_mask(level: usize) -> u64 {
    MAX_ENCODED_PRICE & !((1u64 << (GROUP_BITS * level as u32)) - 1)
}

const fn max_decimals(level: usize) -> u32 {
    1 << SCALE_BITS[level]
}

/// Returns the level (0..=7) an encoded price is read at.
///
/// Values above [`MAX_ENCODED_PRICE`] report level 7; [`decode_price`] rejects them.
pub fn price_level(encoded: u64) -> usize {
    (1..LEVELS)
        .rev()
        .find(|&level| encoded & level_mask(level) != 0)
        .unwrap_or(0)
}

/// Decodes a wire price.
///
/// The mantissa and scale are combined through a `Decimal` so that common
/// decimal prices do not pick up binary-fraction noise. Encodings at a higher
/// level than the minimal one decode to the same number.
pub fn decode_price(encoded: u64) -> f64 {
    if encoded == NAN_PRICE || encoded > MAX_ENCODED_PRICE {
        return f64::NAN;
    }
    if encoded == 0 {
        return 0.0;
    }

    let level = price_level(encoded);
    let mantissa = encoded & mantissa_mask(level);
    let decimals = (encoded >> mantissa_bits(level)) as u32 + 1;

    Decimal::from_i128_with_scale(i128::from(mantissa), decimals)
        .to_f64()
        .unwrap_or(f64::NAN)
}

/// Encodes a non-negative price into its minimal-length wire form.
///
/// NaN maps to [`NAN_PRICE`] and zero to `0`. Negative, infinite and
/// out-of-range values cannot be represented and are sent as NaN. Values with
/// more decimals than any level can carry are rounded to the finest scale that
/// still fits.
pub fn encode_price(value: f64) -> u64 {
    if value.is_nan() {
        return NAN_PRICE;
    }
    if value == 0.0 {
        return 0;
    }
    if !value.is_finite() || value < 0.0 {
        debug!("Price {} is not representable, encoding as NaN", value);
        return NAN_PRICE;
    }

    // Display on f64 yields the shortest string that round-trips, never exponent form.
    let Ok(decimal) = Decimal::from_str(&value.to_string()) else {
        debug!("Price {} exceeds decimal range, encoding as NaN", value);
        return NAN_PRICE;
    };
    let decimal = decimal.normalize();

    for decimals in (1..=decimal.scale().max(1)).rev() {
        let rounded = decimal
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        if let Some(encoded) = encode_exact(rounded) {
            return encoded;
        }
    }

    debug!("Price {} exceeds the largest level, encoding as NaN", value);
    NAN_PRICE
}

/// Finds the lowest level (and, within it, the lowest scale) that carries
/// `value` without loss and reads back at that same level.
fn encode_exact(value: Decimal) -> Option<u64> {
    let mantissa = u64::try_from(value.mantissa()).ok()?;
    if mantissa == 0 {
        return Some(0);
    }
    let scale = value.scale();
    let needed = scale.max(1);

    for level in 0..LEVELS {
        for decimals in needed..=max_decimals(level) {
            let Some(scaled) = 10u64
                .checked_pow(decimals - scale)
                .and_then(|factor| mantissa.checked_mul(factor))
            else {
                break;
            };
            if scaled > mantissa_mask(level) {
                break;
            }
            // A zero top group would be read back at a lower level; a finer scale sets a scale bit.
            let encoded = (u64::from(decimals - 1) << mantissa_bits(level)) | scaled;
            if price_level(encoded) == level {
                return Some(encoded);
            }
        }
    }
    None
}
