//! Observable store synchronizing tunables between the UI and the sim loop
//!
//! Single-threaded by design: the host runs UI callbacks and simulation ticks on
//! one thread, so the store is `Rc`-shared rather than locked.
//!
//! Readers get an `Rc<T>` snapshot. It is shared by every reader until the next
//! mutation, and being behind `Rc` it cannot be mutated in place.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::settings::{Settings, clamp_to};

type Listener = Rc<dyn Fn()>;

struct StoreInner<T> {
    state: T,
    snapshot: Option<Rc<T>>,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

/// Value container with a cached snapshot and change listeners
pub struct SyncedStore<T> {
    inner: Rc<RefCell<StoreInner<T>>>,
}

impl<T> Clone for SyncedStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> SyncedStore<T> {
    pub fn new(state: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                state,
                snapshot: None,
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
        }
    }

    /// Current value; cached until the next mutation
    pub fn snapshot(&self) -> Rc<T> {
        let mut inner = self.inner.borrow_mut();
        if let Some(snapshot) = &inner.snapshot {
            return Rc::clone(snapshot);
        }
        let snapshot = Rc::new(inner.state.clone());
        inner.snapshot = Some(Rc::clone(&snapshot));
        snapshot
    }

    /// Mutate the state, then notify listeners
    pub fn update(&self, mutate: impl FnOnce(&mut T)) {
        mutate(&mut self.inner.borrow_mut().state);
        self.notify();
    }

    /// Invalidate the snapshot, then call every listener
    pub fn notify(&self) {
        let listeners: Vec<Listener> = {
            let mut inner = self.inner.borrow_mut();
            inner.snapshot = None;
            inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
        };
        // Borrow released: listeners may read the snapshot or (un)subscribe
        for listener in listeners {
            listener();
        }
    }

    /// Register a change listener; dropping the returned handle unsubscribes
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Rc::new(listener)));

        let weak: Weak<RefCell<StoreInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// Handle returned by [`SyncedStore::subscribe`]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Store of flocking [`Settings`] with clamped typed setters
#[derive(Clone)]
pub struct SettingsStore {
    store: SyncedStore<Settings>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            store: SyncedStore::new(settings.clamped()),
        }
    }

    pub fn snapshot(&self) -> Rc<Settings> {
        self.store.snapshot()
    }

    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        self.store.subscribe(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.store.listener_count()
    }

    /// Replace every tunable at once (e.g. after loading a settings file)
    pub fn replace(&self, settings: Settings) {
        self.store.update(|s| *s = settings.clamped());
    }

    pub fn set_alignment_factor(&self, value: f32) {
        self.store
            .update(|s| s.alignment_factor = clamp_to(value, &Settings::ALIGNMENT_RANGE));
    }

    pub fn set_cohesion_factor(&self, value: f32) {
        self.store
            .update(|s| s.cohesion_factor = clamp_to(value, &Settings::COHESION_RANGE));
    }

    pub fn set_separation_factor(&self, value: f32) {
        self.store
            .update(|s| s.separation_factor = clamp_to(value, &Settings::SEPARATION_RANGE));
    }

    pub fn set_speed(&self, value: f32) {
        self.store
            .update(|s| s.speed = clamp_to(value, &Settings::SPEED_RANGE));
    }

    pub fn set_flock_search_radius(&self, value: f32) {
        self.store
            .update(|s| s.flock_search_radius = clamp_to(value, &Settings::RADIUS_RANGE));
    }

    pub fn set_leader_boid_enabled(&self, value: bool) {
        self.store.update(|s| s.leader_boid_enabled = value);
    }

    pub fn set_leader_follow_fraction(&self, value: f32) {
        self.store.update(|s| {
            s.leader_follow_fraction = clamp_to(value, &Settings::FOLLOW_FRACTION_RANGE)
        });
    }
}
