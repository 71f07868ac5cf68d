//! Observer protocol: typed state-change events fanned out by the registry
//!
//! Observers subscribe to the registry and receive events synchronously, in
//! attachment order, the moment the owning entity mutates; there is no
//! batching or deferral. Every event method has a default no-op body so a
//! view subscribes only to what it renders.
//!
//! A name an observer has never seen is an implicit introduction; `removed`
//! for an unknown name is silently ignored. Rendering is entirely the
//! observer's concern.

pub mod views;

use crate::core::types::Point;
use std::cell::RefCell;
use std::rc::Rc;

/// Subscriber to registry state-change events
pub trait Observer {
    /// An entity's position changed (or was first announced)
    fn location_changed(&mut self, _name: &str, _location: Point) {}

    /// A structure's stored amount changed
    fn amount_changed(&mut self, _name: &str, _amount: f64) {}

    /// An agent's health changed
    fn health_changed(&mut self, _name: &str, _health: i32) {}

    /// An entity left the world
    fn removed(&mut self, _name: &str) {}
}

/// Shared handle to an observer
///
/// The registry and the command driver hold the same observer: the registry
/// delivers events through its copy, the driver draws through its own.
pub type ObserverHandle = Rc<RefCell<dyn Observer>>;

/// Attachment-ordered list of observers with synchronous delivery
#[derive(Default)]
pub struct ObserverHub {
    observers: Vec<ObserverHandle>,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn attach(&mut self, observer: ObserverHandle) {
        self.observers.push(observer);
    }

    /// Remove by pointer identity; unknown handles are ignored
    pub fn detach(&mut self, observer: &ObserverHandle) {
        self.observers.retain(|o| !Rc::ptr_eq(o, observer));
    }

    pub fn location_changed(&mut self, name: &str, location: Point) {
        for observer in &self.observers {
            observer.borrow_mut().location_changed(name, location);
        }
    }

    pub fn amount_changed(&mut self, name: &str, amount: f64) {
        for observer in &self.observers {
            observer.borrow_mut().amount_changed(name, amount);
        }
    }

    pub fn health_changed(&mut self, name: &str, health: i32) {
        for observer in &self.observers {
            observer.borrow_mut().health_changed(name, health);
        }
    }

    pub fn removed(&mut self, name: &str) {
        for observer in &self.observers {
            observer.borrow_mut().removed(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every event it sees, tagged with an id, into a shared log
    struct Recorder {
        id: usize,
        log: Rc<RefCell<Vec<(usize, String)>>>,
    }

    impl Observer for Recorder {
        fn location_changed(&mut self, name: &str, location: Point) {
            self.log.borrow_mut().push((self.id, format!("loc {} {}", name, location)));
        }
        fn removed(&mut self, name: &str) {
            self.log.borrow_mut().push((self.id, format!("gone {}", name)));
        }
    }

    #[test]
    fn test_delivery_in_attachment_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hub = ObserverHub::new();
        let first: ObserverHandle = Rc::new(RefCell::new(Recorder { id: 1, log: log.clone() }));
        let second: ObserverHandle = Rc::new(RefCell::new(Recorder { id: 2, log: log.clone() }));
        hub.attach(first);
        hub.attach(second);

        hub.location_changed("Zug", Point::new(1.0, 2.0));

        let seen: Vec<usize> = log.borrow().iter().map(|(id, _)| *id).collect();
        assert_eq!(seen, vec![1, 2], "events arrive in attachment order");
    }

    #[test]
    fn test_detach_stops_delivery() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hub = ObserverHub::new();
        let handle: ObserverHandle = Rc::new(RefCell::new(Recorder { id: 1, log: log.clone() }));
        hub.attach(handle.clone());

        hub.removed("Zug");
        hub.detach(&handle);
        hub.removed("Bug");

        assert_eq!(log.borrow().len(), 1, "no delivery after detach");
        assert!(hub.is_empty());
    }

    #[test]
    fn test_no_observers_is_noop() {
        let mut hub = ObserverHub::new();
        hub.location_changed("Zug", Point::default());
        hub.health_changed("Zug", 5);
        hub.amount_changed("Shire", 10.0);
        hub.removed("Zug");
    }

    #[test]
    fn test_default_methods_ignore_unsubscribed_events() {
        struct OnlyAmounts;
        impl Observer for OnlyAmounts {
            fn amount_changed(&mut self, _name: &str, _amount: f64) {}
        }
        let mut hub = ObserverHub::new();
        hub.attach(Rc::new(RefCell::new(OnlyAmounts)));
        // events this observer does not implement fall through the defaults
        hub.location_changed("Zug", Point::default());
        hub.removed("never-seen");
    }
}
