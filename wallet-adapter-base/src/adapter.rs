//! taken from https://github.com/anza-xyz/wallet-adapter/blob/master/packages/core/base/src/adapter.ts

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;
use solana_sdk::pubkey::Pubkey;
use wallet_adapter_events::{Callback, Context, EventEmitter, ListenerFilter, NamedEvent};

use crate::WalletError;

#[derive(Debug, strum::EnumDiscriminants)]
#[strum_discriminants(name(WalletAdapterEventName))]
#[strum_discriminants(derive(Hash, strum::Display, strum::EnumIter))]
#[strum_discriminants(strum(serialize_all = "camelCase"))]
pub enum WalletAdapterEvent {
    Connect(Pubkey),
    Disconnect,
    Error(WalletError),
    ReadyStateChange(WalletReadyState),
}

impl NamedEvent for WalletAdapterEvent {
    type Name = WalletAdapterEventName;

    fn name(&self) -> Self::Name {
        self.into()
    }
}

pub type WalletAdapterEventEmitter = EventEmitter<WalletAdapterEventName, WalletAdapterEvent>;
pub type WalletAdapterCallback = Callback<WalletAdapterEventName, WalletAdapterEvent>;

/// Emits `err` as a [`WalletAdapterEvent::Error`] and hands it back, so a
/// failing adapter operation can notify listeners and then return it.
///
/// A listener failure during the emit takes precedence over `err`.
pub fn emit_error(emitter: &WalletAdapterEventEmitter, err: WalletError) -> WalletError {
    tracing::debug!("wallet error: {err}");

    let event = WalletAdapterEvent::Error(err);
    let emitted = emitter.emit_event(&event);

    match (emitted, event) {
        (Err(listener_err), _) => listener_err.into(),
        (Ok(_), WalletAdapterEvent::Error(err)) => err,
        (Ok(_), other) => anyhow!("expected an error event, got {other:?}").into(),
    }
}

/**
 * A wallet's readiness describes a series of states that the wallet can be in,
 * depending on what kind of wallet it is. An installable wallet (eg. a browser
 * extension like Phantom) might be `Installed` if we've found the Phantom API
 * in the global scope, or `NotDetected` otherwise. A loadable, zero-install
 * runtime (eg. Torus Wallet) might simply signal that it's `Loadable`. Use this
 * metadata to personalize the wallet list for each user (eg. to show their
 * installed wallets first).
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum WalletReadyState {
    /**
     * User-installable wallets can typically be detected by scanning for an API
     * that they've injected into the global context. If such an API is present,
     * we consider the wallet to have been installed.
     */
    Installed,
    NotDetected,
    /**
     * Loadable wallets are always available to you. Since you can load them at
     * any time, it's meaningless to say that they have been detected.
     */
    Loadable,
    /**
     * If a wallet is not supported on a given platform (eg. server-rendering, or
     * mobile) then it will stay in the `Unsupported` state.
     */
    Unsupported,
}

/// Current ready state of an adapter. Announces every change on the adapter's
/// emitter.
#[derive(Debug, Clone)]
pub struct ReadyStateTracker {
    state: Arc<Mutex<WalletReadyState>>,
}

impl ReadyStateTracker {
    pub fn new(initial: WalletReadyState) -> Self {
        Self {
            state: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn get(&self) -> WalletReadyState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `state` and emits `ReadyStateChange` if it differs from the
    /// current one. Returns whether it changed.
    pub fn set(
        &self,
        state: WalletReadyState,
        emitter: &WalletAdapterEventEmitter,
    ) -> crate::Result<bool> {
        {
            let mut current = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *current == state {
                return Ok(false);
            }
            *current = state;
        }

        tracing::debug!("ready state changed to {state}");
        emitter.emit_event(&WalletAdapterEvent::ReadyStateChange(state))?;

        Ok(true)
    }
}

#[async_trait::async_trait(?Send)]
pub trait BaseWalletAdapter {
    fn event_emitter(&self) -> &WalletAdapterEventEmitter;
    fn name(&self) -> String;
    fn url(&self) -> String;
    fn icon(&self) -> String;
    fn ready_state(&self) -> WalletReadyState;
    fn public_key(&self) -> Option<Pubkey>;
    fn connecting(&self) -> bool;

    fn connected(&self) -> bool {
        self.public_key().is_some()
    }

    async fn disconnect(&self) -> crate::Result<()>;
    async fn auto_connect(&mut self) -> crate::Result<()> {
        self.connect().await
    }

    async fn connect(&mut self) -> crate::Result<()>;

    fn on(
        &self,
        event: WalletAdapterEventName,
        callback: WalletAdapterCallback,
    ) -> &WalletAdapterEventEmitter {
        self.event_emitter().on(event, callback)
    }

    fn once(
        &self,
        event: WalletAdapterEventName,
        callback: WalletAdapterCallback,
    ) -> &WalletAdapterEventEmitter {
        self.event_emitter().once(event, callback)
    }

    fn on_with_context(
        &self,
        event: WalletAdapterEventName,
        callback: WalletAdapterCallback,
        context: Context,
    ) -> &WalletAdapterEventEmitter {
        self.event_emitter().on_with_context(event, callback, context)
    }

    fn once_with_context(
        &self,
        event: WalletAdapterEventName,
        callback: WalletAdapterCallback,
        context: Context,
    ) -> &WalletAdapterEventEmitter {
        self.event_emitter().once_with_context(event, callback, context)
    }

    fn off(
        &self,
        event: WalletAdapterEventName,
        filter: ListenerFilter<WalletAdapterEventName, WalletAdapterEvent>,
    ) -> &WalletAdapterEventEmitter {
        self.event_emitter().off(&event, filter)
    }

    fn remove_all_listeners(
        &self,
        event: Option<WalletAdapterEventName>,
    ) -> &WalletAdapterEventEmitter {
        self.event_emitter().remove_all_listeners(event.as_ref())
    }

    fn listeners(&self, event: WalletAdapterEventName) -> Vec<WalletAdapterCallback> {
        self.event_emitter().listeners(&event)
    }

    fn listener_count(&self, event: WalletAdapterEventName) -> usize {
        self.event_emitter().listener_count(&event)
    }

    fn event_names(&self) -> Vec<WalletAdapterEventName> {
        self.event_emitter().event_names()
    }
}
