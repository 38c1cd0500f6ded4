// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subscription tokens, listener status and lifecycle hooks.

use std::fmt;

/// Identifies one registered listener of one Event.
///
/// Allocated monotonically starting at 1 and never reused for the life of
/// the Event. Tokens of different Events are unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription(u64);

impl Subscription {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Returned by cancellable listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionStatus {
    #[default]
    Retain,
    /// Unsubscribe this listener; takes effect from the next notify.
    Cancel,
}

/// Callbacks fired when the set of listeners changes.
///
/// Hooks run after the Event's lock is released, on the thread that
/// subscribed or unsubscribed, so they may call back into the Event.
/// Typical use: start forwarding from an upstream source when the first
/// listener arrives, stop when the last one leaves.
pub trait EventHooks {
    fn on_first_listener_added(&self, _token: Subscription) {}
    fn on_listener_added(&self, _token: Subscription) {}
    fn on_listener_removed(&self, _token: Subscription) {}
    fn on_last_listener_removed(&self, _token: Subscription) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl EventHooks for NoHooks {}
