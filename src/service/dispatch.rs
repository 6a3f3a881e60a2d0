use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::edit::{EditRequest, EditTicket};
use crate::error::{EditorError, Result};
use crate::image::ImageRef;
use super::EditService;

type Outcome = Result<ImageRef>;

/// One request in flight, owned by the UI thread
struct PendingEdit {
    ticket: EditTicket,
    mailbox: Arc<Mutex<Option<Outcome>>>,
    started: Instant,
    label: &'static str,
}

/// Runs edit requests off the UI thread.
///
/// Holds at most one pending request. The background task writes its outcome
/// into a single-slot mailbox which [`EditDispatcher::poll`] drains once per
/// frame. Every request is bounded by `timeout`.
pub struct EditDispatcher {
    runtime: tokio::runtime::Runtime,
    service: Arc<dyn EditService>,
    timeout: Duration,
    pending: Option<PendingEdit>,
}

impl std::fmt::Debug for EditDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditDispatcher")
            .field("service", &self.service.name())
            .field("timeout", &self.timeout)
            .field("pending", &self.pending.as_ref().map(|p| p.label))
            .finish()
    }
}

impl EditDispatcher {
    pub fn new(service: Arc<dyn EditService>, timeout: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("edit-dispatch")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            service,
            timeout,
            pending: None,
        })
    }

    pub fn service_name(&self) -> &'static str {
        self.service.name()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Time since the pending request was sent
    pub fn elapsed(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.started.elapsed())
    }

    /// Starts `request` in the background.
    ///
    /// The ticket comes from the version store; if a request is somehow still
    /// pending the new one is refused and the ticket handed back.
    pub fn dispatch(
        &mut self,
        ticket: EditTicket,
        request: EditRequest,
    ) -> std::result::Result<(), EditTicket> {
        if self.pending.is_some() {
            log::warn!("Dispatcher busy, refusing {} edit", request.kind.label());
            return Err(ticket);
        }

        let label = request.kind.label();
        let mailbox = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&mailbox);
        let future = self.service.submit(request.to_payload());
        let timeout = self.timeout;

        log::info!("Dispatching {} edit to {}", label, self.service.name());
        self.runtime.spawn(async move {
            let outcome = match tokio::time::timeout(timeout, future).await {
                Ok(outcome) => outcome,
                Err(_) => Err(EditorError::Timeout(timeout)),
            };
            *slot.lock() = Some(outcome);
        });

        self.pending = Some(PendingEdit {
            ticket,
            mailbox,
            started: Instant::now(),
            label,
        });
        Ok(())
    }

    /// Takes the finished outcome, if any, together with its ticket
    pub fn poll(&mut self) -> Option<(EditTicket, Outcome)> {
        let outcome = self.pending.as_ref()?.mailbox.lock().take()?;
        let pending = self.pending.take()?;
        log::info!(
            "{} edit finished after {:.1}s ({})",
            pending.label,
            pending.started.elapsed().as_secs_f32(),
            if outcome.is_ok() { "ok" } else { "failed" }
        );
        Some((pending.ticket, outcome))
    }
}
