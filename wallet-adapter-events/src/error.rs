pub type Result<T> = std::result::Result<T, EventError>;

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("the listener must be a callback")]
    InvalidListener,
    #[error("listener failed: {0}")]
    Listener(#[source] anyhow::Error),
}
