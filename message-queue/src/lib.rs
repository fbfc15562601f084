//! In-process fan-out bus: watchers publish typed messages, handlers
//! subscribe by topic tag. Grounded on the poll/checkpoint/dispatch shape of
//! the teacher's `internal::events::process_events` loop, translated from a
//! single-threaded OCW poll into a `tokio::sync::mpsc` channel per topic.
//! Delivery is best-effort in-memory FIFO; there is no persistence here —
//! the Watcher only advances its durable checkpoint once `push` returns.

use bridge_types::{Topic, TransferIntent};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// The message body enqueued for a given topic. A closed tagged union, per
/// the design note preferring exhaustive handling over open dynamic
/// dispatch.
#[derive(Clone, Debug)]
pub enum Message {
    Transfer(TransferIntent),
    MemberUpdated { chain_id: bridge_types::ChainId },
}

#[derive(Debug)]
pub enum PushError {
    Closed,
}

pub struct Subscription {
    rx: mpsc::Receiver<Message>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }
}

/// The message queue: one bounded channel per topic tag.
pub struct Bus {
    senders: HashMap<Topic, mpsc::Sender<Message>>,
}

impl Bus {
    /// Builds a bus with a fresh channel (capacity `channel_capacity`) for
    /// every topic in the closed set.
    pub fn new(channel_capacity: usize) -> (Self, HashMap<Topic, Subscription>) {
        let mut senders = HashMap::new();
        let mut subscriptions = HashMap::new();
        for topic in Topic::ALL {
            let (tx, rx) = mpsc::channel(channel_capacity);
            senders.insert(topic, tx);
            subscriptions.insert(topic, Subscription { rx });
        }
        (Bus { senders }, subscriptions)
    }

    /// Enqueues `message` on `topic`. Returns once the message is enqueued,
    /// not processed — the caller (a Watcher) advances its durable
    /// checkpoint only after this returns `Ok`.
    pub async fn push(&self, topic: Topic, message: Message) -> Result<(), PushError> {
        self.senders
            .get(&topic)
            .expect("all topics have a sender")
            .send(message)
            .await
            .map_err(|_| PushError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::{ChainId, TransferIntent};
    use rust_decimal::Decimal;

    fn sample_intent() -> TransferIntent {
        TransferIntent {
            transaction_id: "0xabc-0".into(),
            source_chain_id: ChainId(33),
            target_chain_id: ChainId::HEDERA,
            native_chain_id: ChainId(33),
            source_asset: "0x00".into(),
            target_asset: "HBAR".into(),
            native_asset: "0x00".into(),
            receiver: "0.0.123456".into(),
            amount: Decimal::from(1),
            serial_number: None,
            metadata: None,
            is_nft: false,
        }
    }

    #[tokio::test]
    async fn push_then_recv_round_trips_a_message() {
        let (bus, mut subs) = Bus::new(8);
        bus.push(Topic::HederaMintHtsTransfer, Message::Transfer(sample_intent()))
            .await
            .unwrap();
        let sub = subs.get_mut(&Topic::HederaMintHtsTransfer).unwrap();
        match sub.recv().await.unwrap() {
            Message::Transfer(intent) => assert_eq!(intent.transaction_id, "0xabc-0"),
            _ => panic!("expected a Transfer message"),
        }
    }

    #[tokio::test]
    async fn topics_do_not_cross_deliver() {
        let (bus, mut subs) = Bus::new(8);
        bus.push(Topic::TopicMessageSubmission, Message::Transfer(sample_intent()))
            .await
            .unwrap();
        let other = subs.get_mut(&Topic::HederaFeeTransfer).unwrap();
        assert!(tokio::time::timeout(std::time::Duration::from_millis(20), other.recv())
            .await
            .is_err());
    }
}
