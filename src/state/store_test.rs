use super::*;
use crate::test_support::identity;

fn recording(store: &SessionStore) -> Rc<RefCell<Vec<Session>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |s| sink.borrow_mut().push(s.clone()));
    seen
}

// =============================================================
// snapshot / setters
// =============================================================

#[test]
fn new_store_is_empty() {
    let store = SessionStore::new();
    assert_eq!(store.snapshot(), Session::default());
}

#[test]
fn setters_update_snapshot() {
    let store = SessionStore::new();
    store.set_credential("tok");
    store.set_identity(identity("u-1", &["ADMIN"]));
    store.set_loading(true);
    store.set_error("boom");
    store.set_intent(Intent::Home);

    let s = store.snapshot();
    assert_eq!(s.credential.as_deref(), Some("tok"));
    assert_eq!(s.identity.as_ref().map(|i| i.id.as_str()), Some("u-1"));
    assert!(s.loading);
    assert_eq!(s.error.as_deref(), Some("boom"));
    assert_eq!(s.intent, Some(Intent::Home));
    assert!(store.is_admin());
}

#[test]
fn clear_setters_reset_fields() {
    let store = SessionStore::new();
    store.set_credential("tok");
    store.set_identity(identity("u-1", &[]));
    store.set_error("boom");
    store.set_intent(Intent::Login);

    store.clear_credential();
    store.clear_identity();
    store.clear_error();
    store.clear_intent();
    assert_eq!(store.snapshot(), Session::default());
}

#[test]
fn new_intent_overwrites_pending_one() {
    let store = SessionStore::new();
    store.set_intent(Intent::Login);
    store.set_intent(Intent::Profile);
    assert_eq!(store.intent(), Some(Intent::Profile));
}

// =============================================================
// subscriptions
// =============================================================

#[test]
fn subscribers_see_each_change() {
    let store = SessionStore::new();
    let seen = recording(&store);
    store.set_loading(true);
    store.set_loading(false);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].loading);
    assert!(!seen[1].loading);
}

#[test]
fn unchanged_value_does_not_notify() {
    let store = SessionStore::new();
    let seen = recording(&store);
    store.set_loading(false);
    store.clear_intent();
    store.set_intent(Intent::Home);
    store.set_intent(Intent::Home);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn unsubscribe_stops_notifications() {
    let store = SessionStore::new();
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    let id = store.subscribe(move |_| c.set(c.get() + 1));
    store.set_loading(true);
    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.set_loading(false);
    assert_eq!(count.get(), 1);
}

#[test]
fn clear_auth_is_a_single_atomic_change() {
    let store = SessionStore::new();
    store.set_credential("tok");
    store.set_identity(identity("u-1", &[]));
    store.set_error("stale");
    let seen = recording(&store);

    store.clear_auth();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].credential.is_none());
    assert!(seen[0].identity.is_none());
    assert!(seen[0].error.is_none());
}

#[test]
fn subscriber_may_mutate_reentrantly() {
    let store = Rc::new(SessionStore::new());
    let weak = Rc::downgrade(&store);
    store.subscribe(move |s| {
        if s.intent == Some(Intent::Logout) {
            if let Some(store) = weak.upgrade() {
                store.clear_auth();
            }
        }
    });
    let seen = recording(&store);

    store.set_credential("tok");
    store.set_intent(Intent::Logout);

    assert!(store.credential().is_none());
    // The later subscriber always receives the latest snapshot.
    let last = seen.borrow().last().cloned().unwrap();
    assert!(last.credential.is_none());
    assert_eq!(last.intent, Some(Intent::Logout));
}
