//! Authenticated-user session.
//!
//! A `Session` is an explicit object handed to whoever needs the current user. Interested parties
//! subscribe with a listener and receive `SessionEvent`s synchronously, in subscription order.
//! Subscriptions end either with `Session::unsubscribe` or by dropping the `Subscription` guard.
//! The session is single-threaded by construction (`Rc`), matching the UI event loop it serves.

mod store;

pub use store::{SessionStore, SESSION_KEY};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(User),
    LoggedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionToken(u64);

type Listener = Rc<RefCell<dyn FnMut(&SessionEvent)>>;

#[derive(Default)]
struct Registry {
    next: u64,
    listeners: Vec<(SubscriptionToken, Listener)>,
}

impl Registry {
    fn remove(&mut self, token: SubscriptionToken) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(t, _)| *t != token);
        self.listeners.len() != before
    }
}

/// Guard that unsubscribes its listener when dropped.
#[must_use = "dropping the subscription unsubscribes the listener"]
pub struct Subscription {
    token: SubscriptionToken,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn token(&self) -> SubscriptionToken {
        self.token
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.token);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("token", &self.token)
            .finish()
    }
}

pub struct Session {
    user: Option<User>,
    store: Option<SessionStore>,
    registry: Rc<RefCell<Registry>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session that lives only in memory.
    pub fn new() -> Self {
        Self {
            user: None,
            store: None,
            registry: Rc::new(RefCell::new(Registry::default())),
        }
    }

    /// A session backed by `store`; a previously persisted user is restored immediately.
    pub fn restore(store: SessionStore) -> Result<Self, AppError> {
        let user = store.load()?;
        Ok(Self {
            user,
            store: Some(store),
            registry: Rc::new(RefCell::new(Registry::default())),
        })
    }

    /// A session backed by `store` that starts logged out without reading it. The next login
    /// overwrites whatever the store holds and a logout removes it.
    pub fn with_store(store: SessionStore) -> Self {
        Self {
            user: None,
            store: Some(store),
            registry: Rc::new(RefCell::new(Registry::default())),
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn login(&mut self, user: User) -> Result<(), AppError> {
        if let Some(store) = &self.store {
            store.save(&user)?;
        }
        self.user = Some(user.clone());
        self.notify(&SessionEvent::LoggedIn(user));
        Ok(())
    }

    /// End the session. Logging out while already logged out is a no-op without an event.
    pub fn logout(&mut self) -> Result<(), AppError> {
        if let Some(store) = &self.store {
            store.clear()?;
        }
        if self.user.take().is_some() {
            self.notify(&SessionEvent::LoggedOut);
        }
        Ok(())
    }

    /// Register `listener` and return a guard that keeps it registered.
    pub fn subscribe(&self, listener: impl FnMut(&SessionEvent) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next += 1;
        let token = SubscriptionToken(registry.next);
        let listener: Listener = Rc::new(RefCell::new(listener));
        registry.listeners.push((token, listener));
        Subscription {
            token,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Remove a listener early. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.registry.borrow_mut().remove(token)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    fn notify(&self, event: &SessionEvent) {
        // Snapshot so listeners may unsubscribe while being notified.
        let listeners: Vec<Listener> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            (&mut *listener.borrow_mut())(event);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("store", &self.store)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
