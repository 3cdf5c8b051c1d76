//! Handler registration and dispatch of host lifecycle signals.

use shell_core::{LifecycleEventKind, Request};

use crate::error::LifecycleError;
use crate::event::{ExtendableEvent, FetchEvent};
use crate::policy::FetchOutcome;

type LifecycleHandler =
    Box<dyn Fn(&mut ExtendableEvent) -> Result<(), LifecycleError> + Send + Sync>;
type FetchHandler = Box<dyn Fn(&mut FetchEvent) -> Result<(), LifecycleError> + Send + Sync>;

/// One handler slot per lifecycle signal.
///
/// Registering a handler for a signal replaces the previous one. Signals
/// without a handler complete immediately; fetches pass through.
#[derive(Default)]
pub struct EventDispatcher {
    install: Option<LifecycleHandler>,
    activate: Option<LifecycleHandler>,
    fetch: Option<FetchHandler>,
}

impl EventDispatcher {
    /// Create a dispatcher with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the install handler.
    pub fn on_install<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ExtendableEvent) -> Result<(), LifecycleError> + Send + Sync + 'static,
    {
        self.install = Some(Box::new(handler));
        self
    }

    /// Register the activate handler.
    pub fn on_activate<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut ExtendableEvent) -> Result<(), LifecycleError> + Send + Sync + 'static,
    {
        self.activate = Some(Box::new(handler));
        self
    }

    /// Register the fetch handler.
    pub fn on_fetch<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut FetchEvent) -> Result<(), LifecycleError> + Send + Sync + 'static,
    {
        self.fetch = Some(Box::new(handler));
        self
    }

    /// Check if a handler is registered for a signal.
    pub fn handles(&self, kind: LifecycleEventKind) -> bool {
        match kind {
            LifecycleEventKind::Install => self.install.is_some(),
            LifecycleEventKind::Activate => self.activate.is_some(),
            LifecycleEventKind::Fetch => self.fetch.is_some(),
        }
    }

    /// Deliver `install` and wait for all work the handler attached.
    pub async fn dispatch_install(&self) -> Result<(), LifecycleError> {
        dispatch_extendable(LifecycleEventKind::Install, self.install.as_ref()).await
    }

    /// Deliver `activate` and wait for all work the handler attached.
    pub async fn dispatch_activate(&self) -> Result<(), LifecycleError> {
        dispatch_extendable(LifecycleEventKind::Activate, self.activate.as_ref()).await
    }

    /// Deliver `fetch` for one intercepted request.
    ///
    /// Resolves with the promised response, or `Passthrough` when the handler
    /// did not respond. Attached work is awaited before returning.
    pub async fn dispatch_fetch(&self, request: Request) -> Result<FetchOutcome, LifecycleError> {
        let Some(handler) = &self.fetch else {
            return Ok(FetchOutcome::Passthrough);
        };

        let mut event = FetchEvent::new(request);
        handler(&mut event)?;

        let (response, extend) = event.into_parts();
        let outcome = match response {
            None => FetchOutcome::Passthrough,
            Some(response) => match response.await {
                Ok(served) => FetchOutcome::Served(served),
                Err(error) => FetchOutcome::Failed(error),
            },
        };
        extend.settle().await?;

        Ok(outcome)
    }
}

async fn dispatch_extendable(
    kind: LifecycleEventKind,
    handler: Option<&LifecycleHandler>,
) -> Result<(), LifecycleError> {
    let mut event = ExtendableEvent::new(kind);
    if let Some(handler) = handler {
        handler(&mut event)?;
    }
    tracing::trace!(event = %kind, pending = event.pending(), "waiting for handler work");
    event.settle().await
}
