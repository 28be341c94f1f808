/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

use std::fmt;

/// The analytic a gauge or definition destination refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GaugePath {
    /// Last traded price
    Price,
    /// Single scalar perception gauge
    Perception,
    /// Long/short commitment gauge
    Commitment,
    /// Equilibrium price band
    Equilibrium,
    /// 55-bar sentiment spectrum
    Sentiment,
}

impl GaugePath {
    /// Path segment used in the destination string.
    pub fn as_str(&self) -> &'static str {
        match self {
            GaugePath::Price => "price",
            GaugePath::Perception => "perception",
            GaugePath::Commitment => "commitment",
            GaugePath::Equilibrium => "equilibrium",
            GaugePath::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for GaugePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which feed of a symbol to stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamId {
    /// Live data
    Realtime,
    /// Exchange-delayed data
    Delay,
    /// Simulated data
    Demo,
}

impl StreamId {
    /// Stream segment used in the destination string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamId::Realtime => "realtime",
            StreamId::Delay => "delay",
            StreamId::Demo => "demo",
        }
    }

    /// The stream actually requested for `symbol`.
    ///
    /// Cross rates and contract symbols (containing `.` or `:`) are not
    /// delay-eligible, so a delayed request for them is served in realtime.
    pub fn for_symbol(self, symbol: &str) -> StreamId {
        if self == StreamId::Delay && symbol.contains(['.', ':']) {
            StreamId::Realtime
        } else {
            self
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a destination subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DestinationKind {
    /// A real-time gauge
    Gauge(GaugePath),
    /// The static definition backing a gauge
    Definition(GaugePath),
    /// Signals of a trading strategy
    Strategy {
        /// Server-side strategy identifier
        strategy_id: String,
    },
}

/// Structured address of a stream.
///
/// The serialized form is the wire key:
/// `/{kind}/{path}/{stream}/{symbol}[/{compression}]` for gauges and
/// definitions, `/strategy/{stream}/{symbol}/{strategy_id}` for strategies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    kind: DestinationKind,
    stream: StreamId,
    symbol: String,
    compression: Option<String>,
}

impl Destination {
    /// Destination of a gauge stream.
    pub fn gauge(path: GaugePath, stream: StreamId, symbol: impl Into<String>) -> Self {
        Self::new(DestinationKind::Gauge(path), stream, symbol)
    }

    /// Destination of a gauge definition.
    pub fn definition(path: GaugePath, stream: StreamId, symbol: impl Into<String>) -> Self {
        Self::new(DestinationKind::Definition(path), stream, symbol)
    }

    /// Destination of a strategy signal stream.
    pub fn strategy(
        strategy_id: impl Into<String>,
        stream: StreamId,
        symbol: impl Into<String>,
    ) -> Self {
        Self::new(
            DestinationKind::Strategy {
                strategy_id: strategy_id.into(),
            },
            stream,
            symbol,
        )
    }

    fn new(kind: DestinationKind, stream: StreamId, symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            stream: stream.for_symbol(&symbol),
            kind,
            symbol,
            compression: None,
        }
    }

    /// Sets the compression tag. Ignored by strategy destinations.
    #[must_use]
    pub fn with_compression(mut self, compression: impl Into<String>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    /// What this destination subscribes to.
    pub fn kind(&self) -> &DestinationKind {
        &self.kind
    }

    /// The effective stream, after the per-symbol adjustment.
    pub fn stream(&self) -> StreamId {
        self.stream
    }

    /// The subscribed symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The compression tag, if any.
    pub fn compression(&self) -> Option<&str> {
        self.compression.as_deref()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, path) = match &self.kind {
            DestinationKind::Gauge(path) => ("gauge", path),
            DestinationKind::Definition(path) => ("definition", path),
            DestinationKind::Strategy { strategy_id } => {
                return write!(f, "/strategy/{}/{}/{}", self.stream, self.symbol, strategy_id);
            }
        };
        write!(f, "/{}/{}/{}/{}", prefix, path, self.stream, self.symbol)?;
        if let Some(compression) = &self.compression {
            write!(f, "/{}", compression)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_destination_string() {
        let destination = Destination::gauge(GaugePath::Perception, StreamId::Realtime, "AAPL");
        assert_eq!(destination.to_string(), "/gauge/perception/realtime/AAPL");
    }

    #[test]
    fn test_compression_suffix() {
        let destination = Destination::gauge(GaugePath::Sentiment, StreamId::Demo, "ES")
            .with_compression("c3");
        assert_eq!(destination.to_string(), "/gauge/sentiment/demo/ES/c3");
        assert_eq!(destination.compression(), Some("c3"));
    }

    #[test]
    fn test_definition_destination_string() {
        let destination = Destination::definition(GaugePath::Price, StreamId::Delay, "MSFT");
        assert_eq!(destination.to_string(), "/definition/price/delay/MSFT");
    }

    #[test]
    fn test_strategy_destination_string() {
        let destination = Destination::strategy("momentum-7", StreamId::Realtime, "NQ")
            .with_compression("ignored");
        assert_eq!(destination.to_string(), "/strategy/realtime/NQ/momentum-7");
    }

    #[test]
    fn test_delay_rewritten_for_cross_rates_and_contracts() {
        let cross = Destination::gauge(GaugePath::Price, StreamId::Delay, "EUR.USD");
        assert_eq!(cross.stream(), StreamId::Realtime);
        assert_eq!(cross.to_string(), "/gauge/price/realtime/EUR.USD");

        let contract = Destination::gauge(GaugePath::Price, StreamId::Delay, "CL:Z6");
        assert_eq!(contract.stream(), StreamId::Realtime);

        let plain = Destination::gauge(GaugePath::Price, StreamId::Delay, "IBM");
        assert_eq!(plain.stream(), StreamId::Delay);

        let demo = Destination::gauge(GaugePath::Price, StreamId::Demo, "EUR.USD");
        assert_eq!(demo.stream(), StreamId::Demo);
    }

    #[test]
    fn test_same_tuple_serializes_identically() {
        let a = Destination::gauge(GaugePath::Commitment, StreamId::Delay, "GBP:USD");
        let b = Destination::gauge(GaugePath::Commitment, StreamId::Delay, "GBP:USD");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }
}
