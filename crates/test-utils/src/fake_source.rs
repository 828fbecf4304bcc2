use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use retrig::engine::TriggerEvent;
use retrig::errors::Result;
use retrig::watch::{EventSource, SubscribeRequest, WatchSubscription};

type ChannelTable = Arc<Mutex<Vec<(u64, mpsc::Sender<TriggerEvent>)>>>;

/// A fake event source that records subscribe requests and exposes the
/// trigger senders so tests can inject events by hand.
///
/// Dropping a subscription releases its channel sender, exactly like the
/// production source: once every subscription of a session is gone, the
/// session's coordinator sees its channel close.
#[derive(Default)]
pub struct FakeEventSource {
    requests: Mutex<Vec<SubscribeRequest>>,
    channels: ChannelTable,
    next_id: AtomicU64,
}

/// Dropping the guard (i.e. the subscription) removes its channel entry.
struct SubscriptionGuard {
    id: u64,
    channels: ChannelTable,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Ok(mut channels) = self.channels.lock() {
            channels.retain(|(id, _)| *id != self.id);
        }
    }
}

impl FakeEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriptions that have not been dropped yet.
    pub fn live_subscriptions(&self) -> usize {
        self.channels.lock().unwrap().len()
    }

    /// Every subscribe request seen so far.
    pub fn requests(&self) -> Vec<SubscribeRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Deliver an event through every live subscription's channel.
    pub async fn send_to_all(&self, event: TriggerEvent) {
        let senders: Vec<_> = self
            .channels
            .lock()
            .unwrap()
            .iter()
            .map(|(_, sender)| sender.clone())
            .collect();
        for sender in senders {
            let _ = sender.send(event.clone()).await;
        }
    }
}

impl EventSource for FakeEventSource {
    fn subscribe(
        &self,
        request: &SubscribeRequest,
        events_tx: mpsc::Sender<TriggerEvent>,
    ) -> Result<WatchSubscription> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().unwrap().push(request.clone());
        self.channels.lock().unwrap().push((id, events_tx));
        Ok(WatchSubscription::new(SubscriptionGuard {
            id,
            channels: Arc::clone(&self.channels),
        }))
    }
}
