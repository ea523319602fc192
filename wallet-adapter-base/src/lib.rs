mod adapter;
mod error;

pub use adapter::emit_error;
pub use adapter::BaseWalletAdapter;
pub use adapter::ReadyStateTracker;
pub use adapter::WalletAdapterCallback;
pub use adapter::WalletAdapterEvent;
pub use adapter::WalletAdapterEventEmitter;
pub use adapter::WalletAdapterEventName;
pub use adapter::WalletReadyState;
pub use error::{Result, WalletError};

pub use wallet_adapter_events::{BoundContext, Callback, Context, ListenerFilter, Receiver};
