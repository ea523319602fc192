use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::emitter::EventEmitter;

type CallbackFn<E, P> = dyn Fn(Receiver<'_, E, P>, &P) -> anyhow::Result<()> + Send + Sync;

/// A shared handle to a listener function.
///
/// Two callbacks are equal when they are clones of the same handle, which is
/// how a caller later refers to "the same function" in [`EventEmitter::off`].
pub struct Callback<E, P> {
    inner: Arc<CallbackFn<E, P>>,
}

impl<E, P> Callback<E, P> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Receiver<'_, E, P>, &P) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    pub fn call(&self, receiver: Receiver<'_, E, P>, payload: &P) -> anyhow::Result<()> {
        (self.inner)(receiver, payload)
    }
}

impl<E, P> Clone for Callback<E, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E, P> PartialEq for Callback<E, P> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E, P> Eq for Callback<E, P> {}

impl<E, P> fmt::Debug for Callback<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback")
            .field(&Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// An arbitrary value bound as the receiver of a listener.
///
/// Compared by identity: only clones of the same `BoundContext` are equal.
#[derive(Clone)]
pub struct BoundContext(Arc<dyn Any + Send + Sync>);

impl BoundContext {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self(value)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl PartialEq for BoundContext {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for BoundContext {}

impl fmt::Debug for BoundContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoundContext")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// The receiver a listener is registered with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Context {
    /// The emitter that dispatches the event.
    #[default]
    Emitter,
    Bound(BoundContext),
}

impl From<BoundContext> for Context {
    fn from(ctx: BoundContext) -> Self {
        Self::Bound(ctx)
    }
}

/// What a callback is invoked with in place of `this`.
pub enum Receiver<'a, E, P> {
    Emitter(&'a EventEmitter<E, P>),
    Bound(&'a BoundContext),
}

impl<'a, E, P> Receiver<'a, E, P> {
    /// The dispatching emitter, if the listener was registered without a context.
    pub fn emitter(&self) -> Option<&'a EventEmitter<E, P>> {
        match *self {
            Self::Emitter(emitter) => Some(emitter),
            Self::Bound(_) => None,
        }
    }

    pub fn bound(&self) -> Option<&'a BoundContext> {
        match *self {
            Self::Emitter(_) => None,
            Self::Bound(ctx) => Some(ctx),
        }
    }
}

impl<E, P> Clone for Receiver<'_, E, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, P> Copy for Receiver<'_, E, P> {}

pub(crate) type ListenerId = u64;

#[derive(Debug)]
pub(crate) struct Listener<E, P> {
    pub(crate) id: ListenerId,
    pub(crate) callback: Callback<E, P>,
    pub(crate) context: Context,
    pub(crate) once: bool,
}

impl<E, P> Clone for Listener<E, P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: self.callback.clone(),
            context: self.context.clone(),
            once: self.once,
        }
    }
}

/// Selects which listeners [`EventEmitter::off`] removes.
///
/// Without a callback every listener of the event is removed. With one, only
/// listeners registered under that callback are removed, further narrowed by
/// `context` when set and to one-shot listeners when `once` is set.
#[derive(Debug)]
pub struct ListenerFilter<E, P> {
    pub callback: Option<Callback<E, P>>,
    pub context: Option<Context>,
    pub once: bool,
}

impl<E, P> ListenerFilter<E, P> {
    pub fn all() -> Self {
        Self {
            callback: None,
            context: None,
            once: false,
        }
    }

    pub fn callback(callback: Callback<E, P>) -> Self {
        Self {
            callback: Some(callback),
            context: None,
            once: false,
        }
    }

    pub fn with_context(mut self, context: impl Into<Context>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn once_only(mut self) -> Self {
        self.once = true;
        self
    }

    /// `true` if `listener` should be dropped. Only meaningful with a callback.
    pub(crate) fn matches(&self, listener: &Listener<E, P>) -> bool {
        let Some(callback) = &self.callback else {
            return true;
        };

        listener.callback == *callback
            && (!self.once || listener.once)
            && self
                .context
                .as_ref()
                .map_or(true, |ctx| listener.context == *ctx)
    }
}

impl<E, P> From<Callback<E, P>> for ListenerFilter<E, P> {
    fn from(callback: Callback<E, P>) -> Self {
        Self::callback(callback)
    }
}

impl<E, P> From<&Callback<E, P>> for ListenerFilter<E, P> {
    fn from(callback: &Callback<E, P>) -> Self {
        Self::callback(callback.clone())
    }
}

impl<E, P> Default for ListenerFilter<E, P> {
    fn default() -> Self {
        Self::all()
    }
}
