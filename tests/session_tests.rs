//! End-to-end tests of subscription traffic through a session
//!
//! A channel transport stands in for the network; server frames are fed to
//! the session directly.

use bytes::Bytes;
use gaugestream_rs::client::{
    ChannelTransport, ClientFrame, ReceiptOutcome, ServerFrame, Session, SessionConfig,
    StaticCredential,
};
use gaugestream_rs::codec::{decode_price, encode_price};
use gaugestream_rs::connection::{ConnectionState, DisconnectionReason, HeartbeatConfig};
use gaugestream_rs::subscription::{
    ChannelSubscriptionListener, Destination, GaugePath, GaugeRecord, GaugeValue, SpectrumTriplet,
    StreamId, Subscription, SubscriptionListener,
};
use gaugestream_rs::utils::SessionError;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

#[cfg(test)]
mod tests {
    use super::*;

    fn new_session() -> (Arc<Session>, mpsc::UnboundedReceiver<Bytes>) {
        let (transport, outbound) = ChannelTransport::create_channel();
        let session = Session::new(
            SessionConfig::new().heartbeat(HeartbeatConfig::disabled()),
            Arc::new(transport),
            Arc::new(StaticCredential::none()),
        )
        .unwrap();
        (session, outbound)
    }

    fn drain(outbound: &mut mpsc::UnboundedReceiver<Bytes>) -> Vec<ClientFrame> {
        let mut frames = Vec::new();
        while let Ok(bytes) = outbound.try_recv() {
            frames.push(ClientFrame::decode(&bytes).unwrap());
        }
        frames
    }

    async fn connect(session: &Session) {
        session.on_transport_open().await;
        session
            .handle_frame(ServerFrame::Connected {
                heart_beat_ms: 10_000,
                session: Some("abc".to_string()),
            })
            .await;
    }

    fn message(subscription: u64, body: GaugeRecord) -> ServerFrame {
        ServerFrame::Message { subscription, body }
    }

    #[tokio::test]
    async fn test_end_to_end_cross_rate() {
        let (session, mut outbound) = new_session();

        let (listener, mut updates) = ChannelSubscriptionListener::create_channel();
        let mut eur_usd =
            Subscription::new(Destination::gauge(GaugePath::Price, StreamId::Delay, "EUR.USD"));
        eur_usd.add_listener(Arc::new(listener));
        let ibm =
            Subscription::new(Destination::gauge(GaugePath::Price, StreamId::Delay, "IBM"));

        session.subscribe(&eur_usd, false).await.unwrap();
        session.subscribe(&ibm, false).await.unwrap();
        connect(&session).await;

        let frames = drain(&mut outbound);
        assert_eq!(
            frames[1],
            ClientFrame::Subscribe {
                destination: "/gauge/price/realtime/EUR.USD".to_string(),
                id: 1,
                throttle_ms: 0,
                receipt: 0
            }
        );
        assert_eq!(
            frames[2],
            ClientFrame::Subscribe {
                destination: "/gauge/price/delay/IBM".to_string(),
                id: 2,
                throttle_ms: 0,
                receipt: 0
            }
        );

        let eur_latest = session.latest(eur_usd.handle()).await.unwrap();
        let ibm_latest = session.latest(ibm.handle()).await.unwrap();

        let encoded = encode_price(1.0842);
        session
            .handle_frame(message(1, GaugeRecord::Price { price: encoded }))
            .await;

        let update = updates.recv().await.unwrap();
        assert_eq!(update.handle, eur_usd.handle());
        assert_eq!(update.subscription_id, 1);
        assert_eq!(update.destination, "/gauge/price/realtime/EUR.USD");
        match update.value {
            GaugeValue::Price(price) => assert!((price - 1.0842).abs() < 1e-9),
            other => panic!("unexpected value {:?}", other),
        }
        assert_eq!(
            *eur_latest.borrow(),
            Some(GaugeValue::Price(decode_price(encoded)))
        );
        assert_eq!(*ibm_latest.borrow(), None);

        session.unsubscribe(eur_usd.handle(), false).await.unwrap();
        assert_eq!(
            drain(&mut outbound),
            vec![ClientFrame::Unsubscribe { id: 1, receipt: 0 }]
        );

        // Late frame for the removed stream
        session
            .handle_frame(message(1, GaugeRecord::Price { price: encoded }))
            .await;
        assert!(updates.try_recv().is_err());
        assert_eq!(*ibm_latest.borrow(), None);

        let metrics = session.metrics().await;
        assert_eq!(metrics.routing_misses, 1);
        assert_eq!(metrics.decode_errors, 0);
        assert_eq!(session.status().await, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_mismatched_record_is_dropped() {
        let (session, _outbound) = new_session();
        let sub = Subscription::new(Destination::gauge(
            GaugePath::Perception,
            StreamId::Realtime,
            "ES",
        ));
        session.subscribe(&sub, false).await.unwrap();
        connect(&session).await;
        let latest = session.latest(sub.handle()).await.unwrap();

        session
            .handle_frame(message(1, GaugeRecord::Price { price: 5 }))
            .await;
        assert_eq!(*latest.borrow(), None);

        session
            .handle_frame(message(1, GaugeRecord::Perception { value: 2500 }))
            .await;
        assert_eq!(*latest.borrow(), Some(GaugeValue::Perception(2.5)));
        assert_eq!(session.metrics().await.decode_errors, 1);
    }

    #[tokio::test]
    async fn test_invalid_spectrum_is_published_dirty() {
        let (session, _outbound) = new_session();
        let sub = Subscription::new(Destination::gauge(
            GaugePath::Sentiment,
            StreamId::Realtime,
            "ES",
        ));
        session.subscribe(&sub, false).await.unwrap();
        connect(&session).await;
        let latest = session.latest(sub.handle()).await.unwrap();

        let valid = SpectrumTriplet {
            i: 10,
            j: 30,
            x: 0,
            y: 1000,
            z: 2000,
        };
        let invalid = SpectrumTriplet { i: 40, j: 20, ..valid };
        session
            .handle_frame(message(
                1,
                GaugeRecord::Sentiment {
                    lengths: invalid,
                    colors: valid,
                    average: 500,
                    dirty: false,
                },
            ))
            .await;

        match latest.borrow().as_ref() {
            Some(GaugeValue::Sentiment(spectrum)) => {
                assert!(spectrum.dirty);
                assert!(spectrum.lengths.iter().all(|v| v.is_nan()));
                assert_eq!(spectrum.colors[10], 1.0);
                assert_eq!(spectrum.colors[30], 2.0);
                assert_eq!(spectrum.average, 0.5);
            }
            other => panic!("unexpected value {:?}", other),
        }
        assert_eq!(session.metrics().await.decode_errors, 1);
    }

    #[derive(Default)]
    struct ThrottleListener {
        rates: Mutex<Vec<u32>>,
    }

    impl SubscriptionListener for ThrottleListener {
        fn on_throttle_change(&self, throttle_rate_ms: u32) {
            self.rates.lock().unwrap().push(throttle_rate_ms);
        }
    }

    #[tokio::test]
    async fn test_throttle_with_receipt() {
        let (session, mut outbound) = new_session();
        let listener = Arc::new(ThrottleListener::default());
        let mut sub =
            Subscription::new(Destination::gauge(GaugePath::Price, StreamId::Demo, "IBM"));
        sub.add_listener(listener.clone());
        session.subscribe(&sub, false).await.unwrap();
        connect(&session).await;
        drain(&mut outbound);

        let receipt = session
            .throttle(sub.handle(), 2000, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            drain(&mut outbound),
            vec![ClientFrame::Throttle {
                id: 1,
                throttle_ms: 2000,
                receipt: receipt.id()
            }]
        );
        session
            .handle_frame(ServerFrame::Receipt {
                receipt: receipt.id(),
            })
            .await;

        assert_eq!(receipt.outcome().await, ReceiptOutcome::Acknowledged);
        assert_eq!(session.throttle_rate(sub.handle()).await, Some(2000));
        assert_eq!(*listener.rates.lock().unwrap(), vec![2000]);
    }

    #[tokio::test]
    async fn test_send_only_while_connected() {
        let (session, mut outbound) = new_session();
        let destination = Destination::strategy("momentum", StreamId::Realtime, "NQ");

        session
            .send(&destination, Bytes::from_static(b"ping"), false)
            .await
            .unwrap();
        assert!(drain(&mut outbound).is_empty());

        connect(&session).await;
        drain(&mut outbound);
        session
            .send(&destination, Bytes::from_static(b"ping"), false)
            .await
            .unwrap();
        assert_eq!(
            drain(&mut outbound),
            vec![ClientFrame::Send {
                destination: "/strategy/realtime/NQ/momentum".to_string(),
                body: b"ping".to_vec(),
                receipt: 0
            }]
        );
    }

    #[tokio::test]
    async fn test_subscribe_is_idempotent() {
        let (session, mut outbound) = new_session();
        connect(&session).await;
        drain(&mut outbound);

        let sub = Subscription::new(Destination::definition(
            GaugePath::Price,
            StreamId::Realtime,
            "IBM",
        ));
        session.subscribe(&sub, false).await.unwrap();
        assert!(session.subscribe(&sub, true).await.unwrap().is_none());
        assert_eq!(drain(&mut outbound).len(), 1);
        assert_eq!(session.subscription_count().await, 1);
        assert_eq!(
            session.destination(sub.handle()).await.as_deref(),
            Some("/definition/price/realtime/IBM")
        );
    }

    #[tokio::test]
    async fn test_unknown_handle() {
        let (session, _outbound) = new_session();
        let sub = Subscription::new(Destination::gauge(GaugePath::Price, StreamId::Demo, "X"));
        assert!(matches!(
            session.unsubscribe(sub.handle(), false).await,
            Err(SessionError::UnknownSubscription(handle)) if handle == sub.handle()
        ));
        assert!(matches!(
            session.throttle(sub.handle(), 10, false).await,
            Err(SessionError::UnknownSubscription(_))
        ));
    }

    #[tokio::test]
    async fn test_message_before_connected_is_protocol_fault() {
        let (session, _outbound) = new_session();
        session
            .handle_message(
                br#"{"command":"MESSAGE","subscription":1,"body":{"type":"price","price":5}}"#,
            )
            .await;
        let metrics = session.metrics().await;
        assert_eq!(metrics.protocol_faults, 1);
        assert_eq!(metrics.routing_misses, 0);
    }

    #[tokio::test]
    async fn test_refreshed_credential_used_on_reconnect() {
        let (transport, mut outbound) = ChannelTransport::create_channel();
        let (token_tx, token_rx) = watch::channel("first".to_string());
        let session = Session::new(
            SessionConfig::new()
                .heartbeat(HeartbeatConfig::disabled())
                .client_id("desk"),
            Arc::new(transport),
            Arc::new(token_rx),
        )
        .unwrap();

        connect(&session).await;
        token_tx.send_replace("second".to_string());
        session
            .on_transport_closed(DisconnectionReason::ServerError("restart".to_string()))
            .await;
        connect(&session).await;

        let credentials: Vec<_> = drain(&mut outbound)
            .into_iter()
            .filter_map(|frame| match frame {
                ClientFrame::Connect {
                    credential,
                    client_id,
                    ..
                } => {
                    assert_eq!(client_id.as_deref(), Some("desk"));
                    credential
                }
                _ => None,
            })
            .collect();
        assert_eq!(credentials, vec!["first".to_string(), "second".to_string()]);
    }
}
