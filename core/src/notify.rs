use std::sync::mpsc::{channel, Receiver, Sender};

/// What changed in a session after a committed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Line contents, order, indentation or completion changed
    Lines,
    /// The active pointer moved
    Active { index: usize },
    /// The stash queue changed
    Stash,
    FocusMode(bool),
    TimeView(bool),
    /// Timer state or remaining time changed
    Timer,
}

/// Fan-out of change notifications to any number of subscribers.
///
/// Every subscriber gets its own channel; receivers that were dropped are
/// pruned on the next publish.
#[derive(Debug, Default)]
pub struct Notifier {
    subscribers: Vec<Sender<Change>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<Change> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, change: Change) {
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let mut notifier = Notifier::new();
        let a = notifier.subscribe();
        let b = notifier.subscribe();

        notifier.publish(Change::Stash);

        assert_eq!(a.try_recv(), Ok(Change::Stash));
        assert_eq!(b.try_recv(), Ok(Change::Stash));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut notifier = Notifier::new();
        let kept = notifier.subscribe();
        drop(notifier.subscribe());
        assert_eq!(notifier.subscriber_count(), 2);

        notifier.publish(Change::Lines);

        assert_eq!(notifier.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Ok(Change::Lines));
    }
}
