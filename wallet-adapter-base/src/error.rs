use wallet_adapter_events::EventError;

pub type Result<T> = std::result::Result<T, WalletError>;

#[derive(Debug, strum::Display)]
pub enum WalletError {
    WalletNotReady,
    WalletLoad,
    WalletConfig,
    WalletConnection((String, String)),
    WalletDisconnected,
    WalletDisconnection((String, String)),
    WalletNotConnected,
    WalletKeypair(String),
    Event(EventError),
    Anyhow(anyhow::Error),
}

impl std::error::Error for WalletError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Event(e) => Some(e),
            Self::Anyhow(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for WalletError {
    fn from(e: anyhow::Error) -> Self {
        Self::Anyhow(e)
    }
}

impl From<EventError> for WalletError {
    fn from(e: EventError) -> Self {
        Self::Event(e)
    }
}
