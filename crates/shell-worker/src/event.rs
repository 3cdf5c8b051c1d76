//! Lifecycle events whose lifetime handlers can extend.

use std::future::Future;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use shell_core::{LifecycleEventKind, Request};
use shell_net::NetworkError;

use crate::error::LifecycleError;
use crate::policy::Served;

/// Work a handler attached to an event.
pub type LifecycleFuture = BoxFuture<'static, Result<(), LifecycleError>>;

/// A response a fetch handler promised.
pub type ResponseFuture = BoxFuture<'static, Result<Served, NetworkError>>;

/// An event the host keeps alive until all attached work completes.
pub struct ExtendableEvent {
    kind: LifecycleEventKind,
    pending: Vec<LifecycleFuture>,
}

impl ExtendableEvent {
    /// Create an event with no attached work.
    pub fn new(kind: LifecycleEventKind) -> Self {
        Self {
            kind,
            pending: Vec::new(),
        }
    }

    /// The lifecycle signal this event carries.
    pub fn kind(&self) -> LifecycleEventKind {
        self.kind
    }

    /// Keep the event alive until `work` completes. A failure fails the event.
    pub fn wait_until<F>(&mut self, work: F)
    where
        F: Future<Output = Result<(), LifecycleError>> + Send + 'static,
    {
        self.pending.push(work.boxed());
    }

    /// Number of attached futures.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drive every attached future to completion.
    ///
    /// All work runs to the end even when some of it fails; the first
    /// failure, in attach order, is returned.
    pub async fn settle(self) -> Result<(), LifecycleError> {
        join_all(self.pending).await.into_iter().collect()
    }
}

/// A fetch event: an intercepted request plus an optional promised response.
pub struct FetchEvent {
    request: Request,
    response: Option<ResponseFuture>,
    extend: ExtendableEvent,
}

impl FetchEvent {
    /// Create an event for an intercepted request.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: None,
            extend: ExtendableEvent::new(LifecycleEventKind::Fetch),
        }
    }

    /// The intercepted request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Answer the request with `response` instead of default network handling.
    ///
    /// Only one response may be promised per event.
    pub fn respond_with<F>(&mut self, response: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = Result<Served, NetworkError>> + Send + 'static,
    {
        if self.response.is_some() {
            return Err(LifecycleError::AlreadyResponded);
        }
        self.response = Some(response.boxed());
        Ok(())
    }

    /// Whether a handler promised a response.
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// Keep the event alive until `work` completes.
    pub fn wait_until<F>(&mut self, work: F)
    where
        F: Future<Output = Result<(), LifecycleError>> + Send + 'static,
    {
        self.extend.wait_until(work);
    }

    pub(crate) fn into_parts(self) -> (Option<ResponseFuture>, ExtendableEvent) {
        (self.response, self.extend)
    }
}
