/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Gauge payloads.
//!
//! [`GaugeRecord`] is the parsed body of a MESSAGE frame, still in protocol
//! units. [`GaugeRecord::decode`] turns it into a [`GaugeValue`] for callers.

use crate::codec::{SPECTRUM_LEN, decode_price, interpolate, peaking};
use crate::subscription::destination::{DestinationKind, GaugePath};
use crate::utils::DecodeError;
use serde::{Deserialize, Serialize};

/// Scale of integer protocol units.
const UNITS_PER_ONE: f64 = 1000.0;

fn from_units(value: i32) -> f64 {
    f64::from(value) / UNITS_PER_ONE
}

/// Compressed spectrum anchors as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectrumTriplet {
    /// Bar index of the first anchor
    pub i: u8,
    /// Bar index of the second anchor
    pub j: u8,
    /// Value at bar 0, in protocol units
    pub x: i32,
    /// Value at bar `i`, in protocol units
    pub y: i32,
    /// Value at bar `j`, in protocol units
    pub z: i32,
}

impl SpectrumTriplet {
    /// Expands the triplet into a dense spectrum.
    pub fn expand(&self) -> Result<[f64; SPECTRUM_LEN], DecodeError> {
        interpolate(
            self.i,
            self.j,
            from_units(self.x),
            from_units(self.y),
            from_units(self.z),
        )
    }
}

/// Body of a MESSAGE frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GaugeRecord {
    /// Encoded price
    Price {
        /// Price in the variable-length encoding
        price: u64,
    },
    /// Scalar perception reading
    Perception {
        /// Reading in protocol units
        value: i32,
    },
    /// Commitment of long and short participants
    Commitment {
        /// Long side, in protocol units
        long: i32,
        /// Short side, in protocol units
        short: i32,
        /// Net commitment, in protocol units
        net: i32,
    },
    /// Equilibrium price band
    Equilibrium {
        /// Equilibrium price, encoded
        price: u64,
        /// Upper band, encoded
        upper: u64,
        /// Lower band, encoded
        lower: u64,
    },
    /// Compressed sentiment spectrum
    Sentiment {
        /// Bar lengths
        lengths: SpectrumTriplet,
        /// Bar colors
        colors: SpectrumTriplet,
        /// Average sentiment, in protocol units
        average: i32,
        /// Stale sample
        #[serde(default)]
        dirty: bool,
    },
    /// Instrument definition
    Definition {
        /// Exchange symbol
        symbol: String,
        /// Human readable name
        description: String,
        /// Minimum price increment, encoded
        tick_size: u64,
        /// Display decimals
        #[serde(default)]
        decimals: u8,
    },
    /// Strategy signal
    Strategy {
        /// Signal strength in protocol units, positive long, negative short
        signal: i32,
        /// Reference price, encoded
        price: u64,
        /// Whether the strategy is currently engaged
        #[serde(default)]
        active: bool,
    },
}

impl GaugeRecord {
    /// Record type tag, as written on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            GaugeRecord::Price { .. } => "price",
            GaugeRecord::Perception { .. } => "perception",
            GaugeRecord::Commitment { .. } => "commitment",
            GaugeRecord::Equilibrium { .. } => "equilibrium",
            GaugeRecord::Sentiment { .. } => "sentiment",
            GaugeRecord::Definition { .. } => "definition",
            GaugeRecord::Strategy { .. } => "strategy",
        }
    }

    /// Decodes the record into caller units.
    ///
    /// A sentiment record with invalid anchor indices still yields a value:
    /// both spectra are NaN and the sample is flagged dirty. The error is
    /// returned alongside so the caller can account for it.
    pub fn decode(self) -> (GaugeValue, Option<DecodeError>) {
        let value = match self {
            GaugeRecord::Price { price } => GaugeValue::Price(decode_price(price)),
            GaugeRecord::Perception { value } => GaugeValue::Perception(from_units(value)),
            GaugeRecord::Commitment { long, short, net } => GaugeValue::Commitment {
                long: from_units(long),
                short: from_units(short),
                net: from_units(net),
            },
            GaugeRecord::Equilibrium {
                price,
                upper,
                lower,
            } => GaugeValue::Equilibrium {
                price: decode_price(price),
                upper: decode_price(upper),
                lower: decode_price(lower),
            },
            GaugeRecord::Sentiment {
                lengths,
                colors,
                average,
                dirty,
            } => {
                let (spectrum, error) = SentimentSpectrum::expand(lengths, colors, average, dirty);
                return (GaugeValue::Sentiment(Box::new(spectrum)), error);
            }
            GaugeRecord::Definition {
                symbol,
                description,
                tick_size,
                decimals,
            } => GaugeValue::Definition(InstrumentDefinition {
                symbol,
                description,
                tick_size: decode_price(tick_size),
                decimals,
            }),
            GaugeRecord::Strategy {
                signal,
                price,
                active,
            } => GaugeValue::Strategy {
                signal: from_units(signal),
                price: decode_price(price),
                active,
            },
        };
        (value, None)
    }
}

/// The record type a destination is expected to deliver.
pub(crate) fn expected_record(kind: &DestinationKind) -> &'static str {
    match kind {
        DestinationKind::Gauge(path) => path.as_str(),
        DestinationKind::Definition(_) => "definition",
        DestinationKind::Strategy { .. } => "strategy",
    }
}

/// Static description of an instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentDefinition {
    /// Exchange symbol
    pub symbol: String,
    /// Human readable name
    pub description: String,
    /// Minimum price increment
    pub tick_size: f64,
    /// Display decimals
    pub decimals: u8,
}

/// A decompressed sentiment sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSpectrum {
    /// Bar lengths
    pub lengths: [f64; SPECTRUM_LEN],
    /// Bar colors
    pub colors: [f64; SPECTRUM_LEN],
    /// Average sentiment
    pub average: f64,
    /// Stale sample; render specially rather than treat as authoritative
    pub dirty: bool,
}

impl SentimentSpectrum {
    fn expand(
        lengths: SpectrumTriplet,
        colors: SpectrumTriplet,
        average: i32,
        dirty: bool,
    ) -> (Self, Option<DecodeError>) {
        let mut error = None;
        let mut expand = |triplet: SpectrumTriplet| {
            triplet.expand().unwrap_or_else(|e| {
                error = Some(e);
                [f64::NAN; SPECTRUM_LEN]
            })
        };
        let lengths = expand(lengths);
        let colors = expand(colors);
        let spectrum = Self {
            lengths,
            colors,
            average: from_units(average),
            dirty: dirty || error.is_some(),
        };
        (spectrum, error)
    }

    /// `1` when bar 0 peaks up, `-1` when it peaks down, `0` otherwise.
    pub fn peaking(&self) -> i8 {
        peaking(&self.lengths)
    }
}

/// A decoded gauge update.
#[derive(Debug, Clone, PartialEq)]
pub enum GaugeValue {
    /// Price
    Price(f64),
    /// Perception reading
    Perception(f64),
    /// Commitment
    Commitment {
        /// Long side
        long: f64,
        /// Short side
        short: f64,
        /// Net commitment
        net: f64,
    },
    /// Equilibrium band
    Equilibrium {
        /// Equilibrium price
        price: f64,
        /// Upper band
        upper: f64,
        /// Lower band
        lower: f64,
    },
    /// Sentiment spectrum
    Sentiment(Box<SentimentSpectrum>),
    /// Instrument definition
    Definition(InstrumentDefinition),
    /// Strategy signal
    Strategy {
        /// Signal strength, positive long, negative short
        signal: f64,
        /// Reference price
        price: f64,
        /// Whether the strategy is engaged
        active: bool,
    },
}

impl GaugeValue {
    /// The gauge path a value belongs to, for gauge values.
    pub fn gauge_path(&self) -> Option<GaugePath> {
        match self {
            GaugeValue::Price(_) => Some(GaugePath::Price),
            GaugeValue::Perception(_) => Some(GaugePath::Perception),
            GaugeValue::Commitment { .. } => Some(GaugePath::Commitment),
            GaugeValue::Equilibrium { .. } => Some(GaugePath::Equilibrium),
            GaugeValue::Sentiment(_) => Some(GaugePath::Sentiment),
            GaugeValue::Definition(_) | GaugeValue::Strategy { .. } => None,
        }
    }
}
