/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Numeric codecs used to keep gauge payloads compact on the wire.

/// Variable-length price encoding with a level-dependent decimal scale.
pub mod price;

/// Sparse-to-dense expansion of the 55-bar sentiment spectrum.
pub mod spectrum;

pub use price::{MAX_ENCODED_PRICE, NAN_PRICE, decode_price, encode_price, price_level};
pub use spectrum::{PEAKING_THRESHOLD, SPECTRUM_LEN, interpolate, peaking};
