//! Synchronous, re-entrant event registry.
//!
//! The table maps each event to an `Arc<Vec<Listener>>`. A dispatch clones
//! that `Arc` and iterates its snapshot, so changes made by listeners while it
//! runs are only seen by later dispatches:
//!
//! - removals always store a freshly built `Vec`;
//! - registrations append through `Arc::make_mut`, which copies the `Vec`
//!   whenever a dispatch still holds the old one.
//!
//! The lock is never held while a listener runs.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{EventError, Result};
use crate::key::NamedEvent;
use crate::listener::{Callback, Context, Listener, ListenerFilter, ListenerId, Receiver};

type Table<E, P> = Vec<(E, Arc<Vec<Listener<E, P>>>)>;

/// An in-process publish/subscribe registry.
///
/// `E` is the event identifier and `P` the payload every listener of this
/// emitter receives.
pub struct EventEmitter<E, P> {
    events: Mutex<Table<E, P>>,
    next_id: AtomicU64,
}

impl<E, P> EventEmitter<E, P>
where
    E: PartialEq + Clone,
{
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn table(&self) -> MutexGuard<'_, Table<E, P>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self, event: &E) -> Option<Arc<Vec<Listener<E, P>>>> {
        self.table()
            .iter()
            .find(|(key, _)| key == event)
            .map(|(_, listeners)| Arc::clone(listeners))
    }

    fn add(&self, event: E, callback: Callback<E, P>, context: Context, once: bool) -> &Self {
        let listener = Listener {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            callback,
            context,
            once,
        };

        let mut table = self.table();
        match table.iter().position(|(key, _)| *key == event) {
            Some(index) => Arc::make_mut(&mut table[index].1).push(listener),
            None => table.push((event, Arc::new(vec![listener]))),
        }
        tracing::trace!(once, "listener added");

        self
    }

    /// Drops the listeners `remove` selects, storing the survivors as a new
    /// sequence or deleting the key if none survive.
    ///
    /// The replaced sequence is dropped after the lock is released, since
    /// dropping captured values may call back into the emitter.
    fn retain(&self, event: &E, remove: impl Fn(&Listener<E, P>) -> bool) {
        let (replaced, removed) = {
            let mut table = self.table();
            let Some(index) = table.iter().position(|(key, _)| key == event) else {
                return;
            };

            let kept: Vec<_> = table[index]
                .1
                .iter()
                .filter(|listener| !remove(*listener))
                .cloned()
                .collect();

            let removed = table[index].1.len() - kept.len();
            if removed == 0 {
                return;
            }

            let replaced = if kept.is_empty() {
                table.remove(index).1
            } else {
                std::mem::replace(&mut table[index].1, Arc::new(kept))
            };
            (replaced, removed)
        };
        tracing::trace!(removed, "listeners removed");

        drop(replaced);
    }

    fn remove_one(&self, event: &E, id: ListenerId) {
        self.retain(event, |listener| listener.id == id);
    }

    /// Registers `callback` for every future `emit` of `event`.
    pub fn on(&self, event: E, callback: Callback<E, P>) -> &Self {
        self.add(event, callback, Context::Emitter, false)
    }

    pub fn on_with_context(
        &self,
        event: E,
        callback: Callback<E, P>,
        context: impl Into<Context>,
    ) -> &Self {
        self.add(event, callback, context.into(), false)
    }

    pub fn add_listener(&self, event: E, callback: Callback<E, P>) -> &Self {
        self.on(event, callback)
    }

    /// Registers `callback` for the next `emit` of `event` only. The listener
    /// is removed right before it is invoked.
    pub fn once(&self, event: E, callback: Callback<E, P>) -> &Self {
        self.add(event, callback, Context::Emitter, true)
    }

    pub fn once_with_context(
        &self,
        event: E,
        callback: Callback<E, P>,
        context: impl Into<Context>,
    ) -> &Self {
        self.add(event, callback, context.into(), true)
    }

    /// Like [`Self::on_with_context`] for a listener of unknown type, e.g. one
    /// handed over through a plugin boundary.
    ///
    /// Fails with [`EventError::InvalidListener`] unless `listener` is a
    /// `Callback<E, P>`.
    pub fn try_on(
        &self,
        event: E,
        listener: &dyn Any,
        context: Option<Context>,
    ) -> Result<&Self>
    where
        E: 'static,
        P: 'static,
    {
        let callback = downcast_callback::<E, P>(listener)?;
        Ok(self.add(event, callback, context.unwrap_or_default(), false))
    }

    pub fn try_once(
        &self,
        event: E,
        listener: &dyn Any,
        context: Option<Context>,
    ) -> Result<&Self>
    where
        E: 'static,
        P: 'static,
    {
        let callback = downcast_callback::<E, P>(listener)?;
        Ok(self.add(event, callback, context.unwrap_or_default(), true))
    }

    /// Calls every listener of `event` in registration order.
    ///
    /// Returns `Ok(false)` if `event` has no listeners. The first listener
    /// error aborts the dispatch and is returned as [`EventError::Listener`],
    /// unless it already is an [`EventError`] from a nested emit.
    pub fn emit(&self, event: &E, payload: &P) -> Result<bool> {
        let Some(listeners) = self.snapshot(event) else {
            return Ok(false);
        };
        tracing::trace!(listeners = listeners.len(), "emitting event");

        for listener in listeners.iter() {
            if listener.once {
                self.remove_one(event, listener.id);
            }

            let receiver = match &listener.context {
                Context::Emitter => Receiver::Emitter(self),
                Context::Bound(ctx) => Receiver::Bound(ctx),
            };

            // a nested emit failing inside the listener is passed through as is
            listener
                .callback
                .call(receiver, payload)
                .map_err(|err| match err.downcast::<EventError>() {
                    Ok(inner) => inner,
                    Err(err) => EventError::Listener(err),
                })?;
        }

        Ok(true)
    }

    /// Removes the listeners of `event` selected by `filter`. Unknown events
    /// and filters that match nothing are ignored.
    pub fn off(&self, event: &E, filter: impl Into<ListenerFilter<E, P>>) -> &Self {
        let filter = filter.into();
        if filter.callback.is_none() {
            self.clear(event);
        } else {
            self.retain(event, |listener| filter.matches(listener));
        }

        self
    }

    pub fn remove_listener(&self, event: &E, filter: impl Into<ListenerFilter<E, P>>) -> &Self {
        self.off(event, filter)
    }

    /// Removes every listener of `event`, or of all events if `event` is `None`.
    pub fn remove_all_listeners(&self, event: Option<&E>) -> &Self {
        match event {
            Some(event) => self.clear(event),
            None => {
                let removed = std::mem::take(&mut *self.table());
                tracing::trace!(events = removed.len(), "all listeners removed");
            }
        }

        self
    }

    fn clear(&self, event: &E) {
        let removed = {
            let mut table = self.table();
            let index = table.iter().position(|(key, _)| key == event);
            let removed = index.map(|index| table.remove(index));
            removed
        };

        if removed.is_some() {
            tracing::trace!("event cleared");
        }
    }

    /// The callbacks registered for `event`, in invocation order.
    pub fn listeners(&self, event: &E) -> Vec<Callback<E, P>> {
        self.snapshot(event)
            .map(|listeners| listeners.iter().map(|l| l.callback.clone()).collect())
            .unwrap_or_default()
    }

    pub fn listener_count(&self, event: &E) -> usize {
        self.snapshot(event).map_or(0, |listeners| listeners.len())
    }

    /// Events that currently have at least one listener, in the order they were
    /// first registered.
    pub fn event_names(&self) -> Vec<E> {
        self.table().iter().map(|(key, _)| key.clone()).collect()
    }
}

impl<E, P> EventEmitter<E, P>
where
    E: PartialEq + Clone,
    P: NamedEvent<Name = E>,
{
    /// Emits `payload` under the event it names.
    pub fn emit_event(&self, payload: &P) -> Result<bool> {
        self.emit(&payload.name(), payload)
    }
}

fn downcast_callback<E: 'static, P: 'static>(listener: &dyn Any) -> Result<Callback<E, P>> {
    listener
        .downcast_ref::<Callback<E, P>>()
        .cloned()
        .ok_or(EventError::InvalidListener)
}

impl<E, P> Default for EventEmitter<E, P>
where
    E: PartialEq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, P> fmt::Debug for EventEmitter<E, P>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = f.debug_map();
        for (key, listeners) in table.iter() {
            map.entry(key, &listeners.len());
        }
        map.finish()
    }
}
