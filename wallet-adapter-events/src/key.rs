use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(0);

/// A unique event token. Equal only to itself and its clones, whatever its
/// description says.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Option<Arc<str>>,
}

impl Symbol {
    pub fn new() -> Self {
        Self {
            id: NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed),
            description: None,
        }
    }

    pub fn with_description(description: impl AsRef<str>) -> Self {
        Self {
            description: Some(Arc::from(description.as_ref())),
            ..Self::new()
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or_default())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An untyped event identifier: either a name or a [`Symbol`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    Name(Cow<'static, str>),
    Symbol(Symbol),
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Symbol(symbol) => fmt::Display::fmt(symbol, f),
        }
    }
}

impl From<&'static str> for EventKey {
    fn from(name: &'static str) -> Self {
        Self::Name(Cow::Borrowed(name))
    }
}

impl From<String> for EventKey {
    fn from(name: String) -> Self {
        Self::Name(Cow::Owned(name))
    }
}

impl From<Symbol> for EventKey {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

/// A payload that knows which event it belongs to.
///
/// Lets a typed emitter pair each payload shape with exactly one event name,
/// see [`crate::EventEmitter::emit_event`].
pub trait NamedEvent {
    type Name;

    fn name(&self) -> Self::Name;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_with_same_description_are_distinct() {
        let a = Symbol::with_description("ready");
        let b = Symbol::with_description("ready");

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(EventKey::from(a.clone()), EventKey::from(b));
        assert_eq!(a.to_string(), "Symbol(ready)");
    }

    #[test]
    fn borrowed_and_owned_names_are_equal() {
        assert_eq!(EventKey::from("connect"), EventKey::from("connect".to_string()));
        assert_eq!(EventKey::from("connect").to_string(), "connect");
    }
}
