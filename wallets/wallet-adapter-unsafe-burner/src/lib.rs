use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
use wallet_adapter_base::{
    emit_error, BaseWalletAdapter, WalletAdapterEvent, WalletAdapterEventEmitter, WalletError,
    WalletReadyState,
};

#[derive(Debug, Default)]
pub struct UnsafeBurnerWallet {
    /**
     * Storing a keypair locally like this is not safe because any application using this adapter could retrieve the
     * secret key, and because the keypair will be lost any time the wallet is disconnected or the window is refreshed.
     */
    keypair: Arc<Mutex<Option<Keypair>>>,
    event_emitter: WalletAdapterEventEmitter,
}

impl UnsafeBurnerWallet {
    pub fn new() -> Self {
        Self::default()
    }

    fn keypair(&self) -> wallet_adapter_base::Result<MutexGuard<'_, Option<Keypair>>> {
        self.keypair
            .lock()
            .map_err(|err| anyhow!("{err:?}").into())
    }

    /// Signs `message` with the connected keypair. Emits an `Error` event when
    /// the wallet isn't connected.
    pub fn sign_message(&self, message: &[u8]) -> wallet_adapter_base::Result<Vec<u8>> {
        // the guard is dropped before emitting so listeners can query the wallet
        let signature = self
            .keypair()
            .map_err(|err| emit_error(&self.event_emitter, err))?
            .as_ref()
            .map(|kp| kp.sign_message(message));
        let signature = signature
            .ok_or_else(|| emit_error(&self.event_emitter, WalletError::WalletNotConnected))?;

        let sig_bytes: [u8; 64] = signature.into();

        Ok(sig_bytes.to_vec())
    }
}

#[async_trait::async_trait(?Send)]
impl BaseWalletAdapter for UnsafeBurnerWallet {
    fn event_emitter(&self) -> &WalletAdapterEventEmitter {
        &self.event_emitter
    }

    fn name(&self) -> String {
        "UnsafeBurnerWallet".to_string()
    }

    fn url(&self) -> String {
        "https://github.com/mucks/wallet-adapter".to_string()
    }

    fn icon(&self) -> String {
        "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iMzQiIGhlaWdodD0iMzAiIGZpbGw9Im5vbmUiIHhtbG5zPSJodHRwOi8vd3d3LnczLm9yZy8yMDAwL3N2ZyI+PHBhdGggZmlsbC1ydWxlPSJldmVub2RkIiBjbGlwLXJ1bGU9ImV2ZW5vZGQiIGQ9Ik0zNCAxMC42djIuN2wtOS41IDE2LjVoLTQuNmw2LTEwLjVhMi4xIDIuMSAwIDEgMCAyLTMuNGw0LjgtOC4zYTQgNCAwIDAgMSAxLjMgM1ptLTQuMyAxOS4xaC0uNmw0LjktOC40djQuMmMwIDIuMy0yIDQuMy00LjMgNC4zWm0yLTI4LjRjLS4zLS44LTEtMS4zLTItMS4zaC0xLjlsLTIuNCA0LjNIMzBsMS43LTNabS0zIDVoLTQuNkwxMC42IDI5LjhoNC43TDI4LjggNi40Wk0xOC43IDBoNC42bC0yLjUgNC4zaC00LjZMMTguNiAwWk0xNSA2LjRoNC42TDYgMjkuOEg0LjJjLS44IDAtMS43LS4zLTIuNC0uOEwxNSA2LjRaTTE0IDBIOS40TDcgNC4zaDQuNkwxNCAwWm0tMy42IDYuNEg1LjdMMCAxNi4ydjhMMTAuMyA2LjRaTTQuMyAwaC40TDAgOC4ydi00QzAgMiAxLjkgMCA0LjMgMFoiIGZpbGw9IiM5OTQ1RkYiLz48L3N2Zz4=".to_string()
    }

    fn ready_state(&self) -> WalletReadyState {
        WalletReadyState::Loadable
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.keypair
            .lock()
            .ok()?
            .as_ref()
            .map(|keypair| keypair.pubkey())
    }

    fn connecting(&self) -> bool {
        false
    }

    async fn connect(&mut self) -> wallet_adapter_base::Result<()> {
        let kp = Keypair::new();
        let public_key = kp.pubkey();
        *self
            .keypair()
            .map_err(|err| emit_error(&self.event_emitter, err))? = Some(kp);

        tracing::debug!("burner wallet connected: {public_key}");
        self.event_emitter
            .emit_event(&WalletAdapterEvent::Connect(public_key))?;

        Ok(())
    }

    async fn disconnect(&self) -> wallet_adapter_base::Result<()> {
        *self
            .keypair()
            .map_err(|err| emit_error(&self.event_emitter, err))? = None;

        tracing::debug!("burner wallet disconnected");
        self.event_emitter
            .emit_event(&WalletAdapterEvent::Disconnect)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use wallet_adapter_base::{
        BoundContext, Callback, Context, ListenerFilter, Receiver, WalletAdapterEventName,
    };

    use super::*;

    fn record_connects(wallet: &UnsafeBurnerWallet) -> Arc<Mutex<Vec<Pubkey>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_cb = seen.clone();
        wallet.on(
            WalletAdapterEventName::Connect,
            Callback::new(move |_, event| {
                if let WalletAdapterEvent::Connect(public_key) = event {
                    seen_by_cb.lock().unwrap().push(*public_key);
                }
                Ok(())
            }),
        );
        seen
    }

    #[tokio::test]
    async fn connect_emits_the_new_public_key() -> anyhow::Result<()> {
        let mut wallet = UnsafeBurnerWallet::new();
        let seen = record_connects(&wallet);

        assert!(!wallet.connected());
        wallet.connect().await?;

        let public_key = wallet.public_key().unwrap();
        assert!(wallet.connected());
        assert_eq!(*seen.lock().unwrap(), vec![public_key]);

        Ok(())
    }

    #[tokio::test]
    async fn disconnect_emits_disconnect_once() -> anyhow::Result<()> {
        let mut wallet = UnsafeBurnerWallet::new();
        let disconnects = Arc::new(Mutex::new(0));

        let disconnects_by_cb = disconnects.clone();
        wallet.once(
            WalletAdapterEventName::Disconnect,
            Callback::new(move |_, _| {
                *disconnects_by_cb.lock().unwrap() += 1;
                Ok(())
            }),
        );

        wallet.connect().await?;
        wallet.disconnect().await?;
        wallet.disconnect().await?;

        assert!(!wallet.connected());
        assert_eq!(*disconnects.lock().unwrap(), 1);
        assert_eq!(wallet.listener_count(WalletAdapterEventName::Disconnect), 0);

        Ok(())
    }

    #[tokio::test]
    async fn listener_failure_is_returned_from_connect() {
        let mut wallet = UnsafeBurnerWallet::new();
        wallet.on(
            WalletAdapterEventName::Connect,
            Callback::new(|_, _| anyhow::bail!("ui crashed")),
        );

        let err = wallet.connect().await.unwrap_err();

        assert!(matches!(err, WalletError::Event(_)));
        assert!(wallet.connected());
    }

    #[test]
    fn sign_message_without_connection_emits_error() {
        let wallet = UnsafeBurnerWallet::new();
        let errors = Arc::new(Mutex::new(Vec::new()));

        let errors_by_cb = errors.clone();
        wallet.on(
            WalletAdapterEventName::Error,
            Callback::new(move |_, event| {
                errors_by_cb.lock().unwrap().push(format!("{event:?}"));
                Ok(())
            }),
        );

        let err = wallet.sign_message(b"hello").unwrap_err();

        assert!(matches!(err, WalletError::WalletNotConnected));
        assert_eq!(*errors.lock().unwrap(), vec!["Error(WalletNotConnected)"]);
    }

    #[tokio::test]
    async fn sign_message_verifies_against_public_key() -> anyhow::Result<()> {
        let mut wallet = UnsafeBurnerWallet::new();
        wallet.connect().await?;

        let sig_bytes = wallet.sign_message(b"hello")?;
        let signature = solana_sdk::signature::Signature::try_from(sig_bytes.as_slice())?;

        assert!(signature.verify(wallet.public_key().unwrap().as_ref(), b"hello"));

        Ok(())
    }

    #[test]
    fn subscription_surface_reaches_the_embedded_emitter() {
        let wallet = UnsafeBurnerWallet::new();
        let seen = record_connects(&wallet);
        let on_disconnect: wallet_adapter_base::WalletAdapterCallback =
            Callback::new(|_, _| Ok(()));

        wallet
            .on(WalletAdapterEventName::Disconnect, on_disconnect.clone())
            .on(WalletAdapterEventName::Disconnect, on_disconnect.clone());

        assert_eq!(
            wallet.event_names(),
            vec![
                WalletAdapterEventName::Connect,
                WalletAdapterEventName::Disconnect
            ]
        );
        assert_eq!(
            wallet.listeners(WalletAdapterEventName::Disconnect),
            vec![on_disconnect.clone(), on_disconnect.clone()]
        );

        wallet.off(
            WalletAdapterEventName::Disconnect,
            ListenerFilter::callback(on_disconnect),
        );
        assert_eq!(wallet.listener_count(WalletAdapterEventName::Disconnect), 0);

        wallet.remove_all_listeners(None);
        assert!(wallet.event_names().is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn listeners_receive_the_context_they_were_bound_with() -> anyhow::Result<()> {
        let mut wallet = UnsafeBurnerWallet::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ui = BoundContext::new("wallet-menu".to_string());

        let seen_by_cb = seen.clone();
        let cb: wallet_adapter_base::WalletAdapterCallback = Callback::new(move |receiver, _| {
            let who = match receiver {
                Receiver::Emitter(_) => "emitter".to_string(),
                Receiver::Bound(ctx) => ctx.downcast_ref::<String>().cloned().unwrap_or_default(),
            };
            seen_by_cb.lock().unwrap().push(who);
            Ok(())
        });

        wallet.on_with_context(WalletAdapterEventName::Connect, cb.clone(), ui.clone().into());
        wallet.once_with_context(WalletAdapterEventName::Connect, cb.clone(), Context::Emitter);

        wallet.connect().await?;
        wallet.connect().await?;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["wallet-menu", "emitter", "wallet-menu"]
        );

        wallet.off(
            WalletAdapterEventName::Connect,
            ListenerFilter::callback(cb).with_context(ui),
        );
        assert_eq!(wallet.listener_count(WalletAdapterEventName::Connect), 0);

        Ok(())
    }

    #[test]
    fn burner_is_always_loadable() {
        let wallet = UnsafeBurnerWallet::new();

        assert_eq!(wallet.ready_state(), WalletReadyState::Loadable);
        assert!(!wallet.connecting());
        assert_eq!(wallet.name(), "UnsafeBurnerWallet");
    }
}
