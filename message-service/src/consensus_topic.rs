//! The shared Hedera Consensus Service topic validators gossip signature
//! envelopes over (spec.md §4.6/§4.8 "the consensus topic") is a real
//! external system, not the in-process `message-queue` bus — that bus only
//! carries Watcher → Transfer Service intents. This trait is the seam: a
//! loopback implementation backed by `tokio::sync::broadcast` is enough for
//! a single-node deployment and for tests; a production build would submit
//! to and subscribe from a real HCS topic over `hedera-client`.

use async_trait::async_trait;
use bridge_types::{Reason, SignatureMessage};
use tokio::sync::broadcast;

#[async_trait]
pub trait ConsensusTopic: Send + Sync {
    async fn publish(&self, message: &SignatureMessage) -> Result<(), Reason>;
}

pub struct LoopbackConsensusTopic {
    tx: broadcast::Sender<SignatureMessage>,
}

impl LoopbackConsensusTopic {
    pub fn new(channel_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(channel_capacity);
        LoopbackConsensusTopic { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SignatureMessage> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl ConsensusTopic for LoopbackConsensusTopic {
    async fn publish(&self, message: &SignatureMessage) -> Result<(), Reason> {
        // No subscribers yet is not an error — the Signature Aggregator may
        // not have started its subscription loop.
        let _ = self.tx.send(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample() -> SignatureMessage {
        SignatureMessage {
            transfer_id: "0xabc-0".into(),
            signature: "0xdead".into(),
            hash: "0xbeef".into(),
            signer: "0x1234".into(),
            transaction_timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn published_messages_reach_a_subscriber() {
        let topic = LoopbackConsensusTopic::new(8);
        let mut sub = topic.subscribe();
        topic.publish(&sample()).await.unwrap();
        let received = sub.recv().await.unwrap();
        assert_eq!(received.transfer_id, "0xabc-0");
    }

    #[tokio::test]
    async fn publishing_with_no_subscribers_is_not_an_error() {
        let topic = LoopbackConsensusTopic::new(8);
        assert!(topic.publish(&sample()).await.is_ok());
    }
}
