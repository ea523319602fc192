//! In-process publish/subscribe registry used by wallet adapters to announce
//! connect, disconnect, error and ready-state changes.

mod emitter;
mod error;
mod key;
mod listener;

pub use emitter::EventEmitter;
pub use error::{EventError, Result};
pub use key::{EventKey, NamedEvent, Symbol};
pub use listener::{BoundContext, Callback, Context, ListenerFilter, Receiver};
