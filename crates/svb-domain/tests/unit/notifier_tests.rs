//! Unit tests for the functional ports

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use svb_domain::{Adapter, Listener, Notifier};

#[test]
fn test_closure_adapter() {
    let adapter = |n: u32| n.to_string();
    assert_eq!(adapter.adapt(42), "42");
}

#[test]
fn test_notifier_delivers_in_registration_order() {
    let notifier = Notifier::<u32>::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second"] {
        let seen = Arc::clone(&seen);
        notifier.add_listener(Arc::new(move |n: &u32| {
            seen.lock().unwrap().push(format!("{tag}:{n}"));
        }));
    }

    notifier.notify(&7);
    assert_eq!(*seen.lock().unwrap(), vec!["first:7", "second:7"]);
}

#[test]
fn test_removed_listener_is_not_called() {
    let notifier = Notifier::<()>::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let id = notifier.add_listener(Arc::new(move |_: &()| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    notifier.notify(&());
    assert!(notifier.remove_listener(id));
    assert!(!notifier.remove_listener(id));
    notifier.notify(&());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(notifier.is_empty());
}

struct Counting(AtomicUsize);

impl Listener<String> for Counting {
    fn on_event(&self, _event: &String) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_struct_listener() {
    let notifier = Notifier::<String>::new();
    let listener = Arc::new(Counting(AtomicUsize::new(0)));
    notifier.add_listener(listener.clone());
    notifier.notify(&"a".to_string());
    notifier.notify(&"b".to_string());
    assert_eq!(listener.0.load(Ordering::SeqCst), 2);
}
