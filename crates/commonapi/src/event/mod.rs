// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Thread-safe event with reentrant subscription management.
//!
//! # Locking discipline
//!
//! One `parking_lot::Mutex` guards the listener table. It is held only for
//! bookkeeping and is always released before a listener or a hook runs, so
//! listeners may subscribe, unsubscribe or even notify the same Event.
//!
//! `notify` applies the pending additions and removals, takes an `Arc`
//! snapshot of the active listeners and increments an in-flight counter.
//! While any notify is in flight, subscribe/unsubscribe only record pending
//! changes; the last notify to finish applies them. Hence:
//!
//! - a listener added during notify `k` is first called by notify `k+1`
//! - a listener removed during notify `k` may still be called by `k`, never
//!   by `k+1`
//! - outside of any notify, changes apply immediately
//!
//! Listeners are called in subscription order. A panicking listener
//! aborts that notify and the panic propagates to the caller; the table
//! stays consistent.

mod subscription;

pub use subscription::{EventHooks, NoHooks, Subscription, SubscriptionStatus};

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

type Listener<T> = Arc<dyn Fn(&T) -> SubscriptionStatus + Send + Sync>;

struct ListenerTable<T> {
    active: Arc<BTreeMap<Subscription, Listener<T>>>,
    pending_add: Vec<(Subscription, Listener<T>)>,
    /// Always a subset of `active`'s keys.
    pending_remove: BTreeSet<Subscription>,
    next_id: u64,
    in_flight: usize,
}

impl<T> ListenerTable<T> {
    fn new() -> Self {
        Self {
            active: Arc::new(BTreeMap::new()),
            pending_add: Vec::new(),
            pending_remove: BTreeSet::new(),
            next_id: 1,
            in_flight: 0,
        }
    }

    /// Listeners that will be called by the next notify.
    fn live_count(&self) -> usize {
        self.active.len() - self.pending_remove.len() + self.pending_add.len()
    }

    fn is_live(&self, token: Subscription) -> bool {
        (self.active.contains_key(&token) && !self.pending_remove.contains(&token))
            || self.pending_add.iter().any(|(t, _)| *t == token)
    }

    /// Apply pending changes. Returns false when there was nothing to do.
    fn flush(&mut self) -> bool {
        if self.pending_add.is_empty() && self.pending_remove.is_empty() {
            return false;
        }
        let active = Arc::make_mut(&mut self.active);
        for token in std::mem::take(&mut self.pending_remove) {
            active.remove(&token);
        }
        active.extend(self.pending_add.drain(..));
        true
    }
}

/// Restores the table when a notify ends, including by panic.
struct InFlight<'a, T> {
    table: &'a Mutex<ListenerTable<T>>,
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        let mut table = self.table.lock();
        table.in_flight -= 1;
        if table.in_flight == 0 && table.flush() {
            log::debug!(
                "[Event::notify] applied deferred changes, {} listener(s) active",
                table.active.len()
            );
        }
    }
}

/// Multiplexes notifications of `T` to any number of listeners.
pub struct Event<T, H = NoHooks> {
    table: Mutex<ListenerTable<T>>,
    hooks: H,
}

impl<T> Event<T, NoHooks> {
    pub fn new() -> Self {
        Self::with_hooks(NoHooks)
    }
}

impl<T> Default for Event<T, NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H> fmt::Debug for Event<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.lock();
        f.debug_struct("Event")
            .field("listeners", &table.live_count())
            .field("in_flight", &table.in_flight)
            .finish()
    }
}

impl<T, H: EventHooks> Event<T, H> {
    pub fn with_hooks(hooks: H) -> Self {
        Self {
            table: Mutex::new(ListenerTable::new()),
            hooks,
        }
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Register a listener. Returns its token.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe_cancellable(move |value: &T| {
            listener(value);
            SubscriptionStatus::Retain
        })
    }

    /// Register a listener that may return [`SubscriptionStatus::Cancel`]
    /// to unsubscribe itself.
    pub fn subscribe_cancellable<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) -> SubscriptionStatus + Send + Sync + 'static,
    {
        let listener: Listener<T> = Arc::new(listener);
        let (token, first) = {
            let mut table = self.table.lock();
            let token = Subscription::new(table.next_id);
            table.next_id += 1;
            let first = table.live_count() == 0;
            if table.in_flight > 0 {
                table.pending_add.push((token, listener));
            } else {
                Arc::make_mut(&mut table.active).insert(token, listener);
            }
            (token, first)
        };

        if first {
            log::debug!("[Event::subscribe] first listener {}", token);
            self.hooks.on_first_listener_added(token);
        }
        self.hooks.on_listener_added(token);
        token
    }

    /// Remove a listener. Returns false, and does nothing, if `token` is not
    /// a live subscription of this Event.
    pub fn unsubscribe(&self, token: Subscription) -> bool {
        let last = {
            let mut table = self.table.lock();
            if let Some(pos) = table.pending_add.iter().position(|(t, _)| *t == token) {
                // Never visible to any notify yet.
                table.pending_add.remove(pos);
            } else if table.active.contains_key(&token) && !table.pending_remove.contains(&token)
            {
                if table.in_flight > 0 {
                    table.pending_remove.insert(token);
                } else {
                    Arc::make_mut(&mut table.active).remove(&token);
                }
            } else {
                return false;
            }
            table.live_count() == 0
        };

        self.hooks.on_listener_removed(token);
        if last {
            log::debug!("[Event::unsubscribe] last listener {} removed", token);
            self.hooks.on_last_listener_removed(token);
        }
        true
    }

    /// Like [`unsubscribe`](Self::unsubscribe), but reports unknown tokens.
    pub fn try_unsubscribe(&self, token: Subscription) -> Result<()> {
        if self.unsubscribe(token) {
            Ok(())
        } else {
            Err(Error::InvalidSubscription(token))
        }
    }

    /// Call every active listener with `value`.
    ///
    /// Returns [`SubscriptionStatus::Cancel`] when no listener remains
    /// afterwards, so a forwarding Event can drop its upstream subscription.
    pub fn notify(&self, value: &T) -> SubscriptionStatus {
        let snapshot = {
            let mut table = self.table.lock();
            if table.flush() {
                log::debug!(
                    "[Event::notify] applied pending changes, {} listener(s) active",
                    table.active.len()
                );
            }
            table.in_flight += 1;
            Arc::clone(&table.active)
        };
        let in_flight = InFlight { table: &self.table };

        for (token, listener) in snapshot.iter() {
            if listener(value) == SubscriptionStatus::Cancel {
                self.unsubscribe(*token);
            }
        }

        drop(snapshot);
        drop(in_flight);

        if self.has_listeners() {
            SubscriptionStatus::Retain
        } else {
            SubscriptionStatus::Cancel
        }
    }

    /// Listeners the next notify will call.
    pub fn listener_count(&self) -> usize {
        self.table.lock().live_count()
    }

    pub fn has_listeners(&self) -> bool {
        self.listener_count() > 0
    }

    pub fn is_subscribed(&self, token: Subscription) -> bool {
        self.table.lock().is_live(token)
    }

    /// True while at least one notify is running on any thread.
    pub fn is_notifying(&self) -> bool {
        self.table.lock().in_flight > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHooks {
        first: AtomicUsize,
        added: AtomicUsize,
        removed: AtomicUsize,
        last: AtomicUsize,
    }

    impl EventHooks for CountingHooks {
        fn on_first_listener_added(&self, _: Subscription) {
            self.first.fetch_add(1, Ordering::SeqCst);
        }
        fn on_listener_added(&self, _: Subscription) {
            self.added.fetch_add(1, Ordering::SeqCst);
        }
        fn on_listener_removed(&self, _: Subscription) {
            self.removed.fetch_add(1, Ordering::SeqCst);
        }
        fn on_last_listener_removed(&self, _: Subscription) {
            self.last.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&u32) + Send + Sync + 'static) {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&calls);
        (calls, move |_: &u32| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_tokens_are_unique_and_monotonic() {
        let event: Event<u32> = Event::new();
        let a = event.subscribe(|_| {});
        let b = event.subscribe(|_| {});
        assert!(event.unsubscribe(a));
        let c = event.subscribe(|_| {});
        assert_eq!(a.id(), 1);
        assert!(a < b && b < c);
        assert_eq!(c.to_string(), "#3");
    }

    #[test]
    fn test_each_listener_called_once() {
        let event: Event<u32> = Event::new();
        let (calls_a, a) = counter();
        let (calls_b, b) = counter();
        event.subscribe(a);
        event.subscribe(b);
        assert_eq!(event.notify(&1), SubscriptionStatus::Retain);
        assert_eq!(calls_a.load(Ordering::SeqCst), 1);
        assert_eq!(calls_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_outside_notify_is_immediate() {
        let event: Event<u32> = Event::new();
        let (calls, listener) = counter();
        let token = event.subscribe(listener);
        assert!(event.unsubscribe(token));
        assert!(!event.is_subscribed(token));
        assert_eq!(event.notify(&1), SubscriptionStatus::Cancel);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_token_is_noop() {
        let event: Event<u32, CountingHooks> = Event::with_hooks(CountingHooks::default());
        let token = event.subscribe(|_| {});
        assert!(event.unsubscribe(token));
        assert!(!event.unsubscribe(token));
        assert_eq!(
            event.try_unsubscribe(token),
            Err(Error::InvalidSubscription(token))
        );
        assert_eq!(event.hooks().removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hooks_first_and_last() {
        let event: Event<u32, CountingHooks> = Event::with_hooks(CountingHooks::default());
        let a = event.subscribe(|_| {});
        let b = event.subscribe(|_| {});
        assert!(event.unsubscribe(a));
        assert!(event.unsubscribe(b));
        let hooks = event.hooks();
        assert_eq!(hooks.first.load(Ordering::SeqCst), 1);
        assert_eq!(hooks.added.load(Ordering::SeqCst), 2);
        assert_eq!(hooks.removed.load(Ordering::SeqCst), 2);
        assert_eq!(hooks.last.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_status_removes_listener() {
        let event: Event<u32, CountingHooks> = Event::with_hooks(CountingHooks::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&calls);
        event.subscribe_cancellable(move |value| {
            inner.fetch_add(1, Ordering::SeqCst);
            if *value >= 2 {
                SubscriptionStatus::Cancel
            } else {
                SubscriptionStatus::Retain
            }
        });

        assert_eq!(event.notify(&1), SubscriptionStatus::Retain);
        assert_eq!(event.notify(&2), SubscriptionStatus::Cancel);
        assert_eq!(event.notify(&3), SubscriptionStatus::Cancel);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(event.hooks().last.load(Ordering::SeqCst), 1);
        assert!(!event.is_notifying());
    }

    #[test]
    fn test_listener_panic_keeps_event_usable() {
        let event: Arc<Event<u32>> = Arc::new(Event::new());
        event.subscribe(|value| {
            if *value == 13 {
                panic!("unlucky");
            }
        });
        let (calls, listener) = counter();
        event.subscribe(listener);

        let cloned = Arc::clone(&event);
        let outcome = std::thread::spawn(move || cloned.notify(&13)).join();
        assert!(outcome.is_err());
        assert!(!event.is_notifying());

        event.notify(&1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_output() {
        let event: Event<u32> = Event::new();
        event.subscribe(|_| {});
        assert_eq!(format!("{:?}", event), "Event { listeners: 1, in_flight: 0 }");
    }
}
