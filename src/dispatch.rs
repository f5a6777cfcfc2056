//! Per-kind event subscriptions.

use std::collections::HashMap;
use std::fmt;

use crate::event::{Event, EventKind};

/// A subscriber callback.
pub type Handler = Box<dyn FnMut(&Event) + Send>;

/// Subscriber lists keyed by event kind.
///
/// Handlers for a kind run in subscription order, synchronously, for each
/// dispatched event of that kind.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<EventKind, Vec<Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    /// Run every handler subscribed to the event's kind.
    pub fn dispatch(&mut self, event: &Event) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for handler in handlers {
                handler(event);
            }
        }
    }

    pub fn has_subscribers(&self, kind: EventKind) -> bool {
        self.handlers.get(&kind).is_some_and(|h| !h.is_empty())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<_> = self.handlers.iter().map(|(k, v)| (*k, v.len())).collect();
        counts.sort();
        f.debug_struct("Dispatcher").field("handlers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_dispatch_by_kind_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();

        let log = Arc::clone(&seen);
        dispatcher.subscribe(EventKind::Ping, move |e| {
            log.lock().unwrap().push(format!("first {:?}", e.kind()))
        });
        let log = Arc::clone(&seen);
        dispatcher.subscribe(EventKind::Ping, move |_| log.lock().unwrap().push("second".into()));
        let log = Arc::clone(&seen);
        dispatcher.subscribe(EventKind::Pong, move |_| log.lock().unwrap().push("pong".into()));

        dispatcher.dispatch(&Event::Ping {
            token: "x".into(),
        });

        assert_eq!(*seen.lock().unwrap(), vec!["first Ping", "second"]);
        assert!(dispatcher.has_subscribers(EventKind::Pong));
        assert!(!dispatcher.has_subscribers(EventKind::Join));
    }
}
