//! Saga coordinator for the two-step invoice creation saga.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use accounting_client::{AccountingClient, ClientError};
use common::SagaId;
use journal::{AppendOptions, JournalRecord, JournalStore, Version};
use tokio::sync::{Mutex, watch};

use crate::error::SagaError;
use crate::events::SagaEvent;
use crate::instance::SagaInstance;
use crate::invoice_creation;
use crate::request::InvoiceRequest;
use crate::retry::RetryPolicy;
use crate::state::SagaState;

/// Final outcome of a saga execution, broadcast to every attached caller.
#[derive(Debug, Clone)]
pub enum SagaOutcome {
    /// Both steps completed; carries the PDF reference.
    Completed(String),
    /// The execution failed. `internal` distinguishes journal or
    /// serialization failures from a downstream rejection or exhausted
    /// retries.
    Failed { reason: String, internal: bool },
}

type OutcomeReceiver = watch::Receiver<Option<SagaOutcome>>;

/// Orchestrates invoice creation sagas.
///
/// Drives the 2-step saga (create invoice → generate PDF) against the
/// accounting service, journaling each completed step so an interrupted
/// execution resumes instead of re-running. Each saga ID has at most one
/// in-flight execution: duplicate starts attach to it, and a completed or
/// failed saga replays its recorded outcome without remote calls.
pub struct SagaCoordinator<J, C>
where
    J: JournalStore,
    C: AccountingClient,
{
    journal: J,
    client: Arc<C>,
    retry: RetryPolicy,
    inflight: Arc<Mutex<HashMap<SagaId, OutcomeReceiver>>>,
}

impl<J, C> Clone for SagaCoordinator<J, C>
where
    J: JournalStore + Clone,
    C: AccountingClient,
{
    fn clone(&self) -> Self {
        Self {
            journal: self.journal.clone(),
            client: Arc::clone(&self.client),
            retry: self.retry,
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<J, C> SagaCoordinator<J, C>
where
    J: JournalStore + Clone + 'static,
    C: AccountingClient + 'static,
{
    /// Creates a new saga coordinator.
    pub fn new(journal: J, client: C, retry: RetryPolicy) -> Self {
        Self {
            journal,
            client: Arc::new(client),
            retry,
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runs the saga for the given ID, returning the PDF reference.
    ///
    /// If the ID is already terminal, returns the recorded outcome without
    /// remote calls. If it is in flight, attaches to the existing
    /// execution. Otherwise starts (or resumes) the execution on its own
    /// task: a caller that stops waiting does not abort the saga, and a
    /// later call with the same ID observes the final state.
    #[tracing::instrument(skip(self, request), fields(saga_type = invoice_creation::SAGA_TYPE))]
    pub async fn run(
        &self,
        saga_id: SagaId,
        request: InvoiceRequest,
    ) -> Result<String, SagaError> {
        // Fast path: attach to an execution already in flight. The lock
        // only guards the map lookup, never journal I/O.
        if let Some(rx) = self.inflight.lock().await.get(&saga_id).cloned() {
            metrics::counter!("saga_attach_total").increment(1);
            tracing::debug!(%saga_id, "attaching to in-flight saga");
            return self.wait_for_outcome(saga_id, rx).await;
        }

        // Terminal sagas replay their recorded outcome. The replay runs
        // without the in-flight lock so a slow journal read for one saga
        // cannot stall admission of others.
        if let Some(saga) = self.get_saga(saga_id).await? {
            match saga.state() {
                SagaState::PdfStored => {
                    metrics::counter!("saga_replays_total").increment(1);
                    return saga
                        .pdf_result()
                        .map(str::to_string)
                        .ok_or(SagaError::MissingResult(saga_id));
                }
                SagaState::Failed => {
                    metrics::counter!("saga_replays_total").increment(1);
                    return Err(SagaError::SagaFailed {
                        reason: saga.failure_reason().unwrap_or("unknown").to_string(),
                    });
                }
                _ => {}
            }
        }

        let rx = {
            let mut inflight = self.inflight.lock().await;

            // Another caller may have started the execution while we read
            // the journal; attach instead of spawning a duplicate.
            if let Some(rx) = inflight.get(&saga_id) {
                metrics::counter!("saga_attach_total").increment(1);
                tracing::debug!(%saga_id, "attaching to in-flight saga");
                rx.clone()
            } else {
                let (tx, rx) = watch::channel(None);
                inflight.insert(saga_id, rx.clone());

                // The execution owns its task: a caller timeout abandons the
                // wait, never the saga.
                let coordinator = self.clone();
                tokio::spawn(async move {
                    let outcome = match coordinator.execute(saga_id, request).await {
                        Ok(result) => SagaOutcome::Completed(result),
                        Err(e) => {
                            let internal = !matches!(
                                e,
                                SagaError::StepFailed { .. } | SagaError::SagaFailed { .. }
                            );
                            SagaOutcome::Failed {
                                reason: e.to_string(),
                                internal,
                            }
                        }
                    };
                    let _ = tx.send(Some(outcome));
                    coordinator.inflight.lock().await.remove(&saga_id);
                });

                rx
            }
        };

        self.wait_for_outcome(saga_id, rx).await
    }

    /// Waits on an execution's outcome channel.
    async fn wait_for_outcome(
        &self,
        saga_id: SagaId,
        mut rx: OutcomeReceiver,
    ) -> Result<String, SagaError> {
        loop {
            let outcome = rx.borrow_and_update().clone();
            if let Some(outcome) = outcome {
                return match outcome {
                    SagaOutcome::Completed(result) => Ok(result),
                    SagaOutcome::Failed {
                        reason,
                        internal: false,
                    } => Err(SagaError::SagaFailed { reason }),
                    SagaOutcome::Failed {
                        reason,
                        internal: true,
                    } => Err(SagaError::Internal(reason)),
                };
            }
            if rx.changed().await.is_err() {
                return Err(SagaError::ExecutionAborted(saga_id));
            }
        }
    }

    /// Executes the saga, resuming from the journal's last completed step.
    #[tracing::instrument(skip(self, request), fields(%saga_id))]
    async fn execute(
        &self,
        saga_id: SagaId,
        request: InvoiceRequest,
    ) -> Result<String, SagaError> {
        metrics::counter!("saga_executions_total").increment(1);
        let saga_start = std::time::Instant::now();

        let mut saga = self.get_saga(saga_id).await?.unwrap_or_default();
        let mut version = self
            .journal
            .get_version(saga_id)
            .await?
            .unwrap_or(Version::initial());

        match saga.state() {
            SagaState::PdfStored => {
                return saga
                    .pdf_result()
                    .map(str::to_string)
                    .ok_or(SagaError::MissingResult(saga_id));
            }
            SagaState::Failed => {
                return Err(SagaError::SagaFailed {
                    reason: saga.failure_reason().unwrap_or("unknown").to_string(),
                });
            }
            SagaState::NotStarted => {
                let started = SagaEvent::saga_started(saga_id, &request);
                version = self.append_saga_event(saga_id, version, &started).await?;
                saga.apply(started);
            }
            _ => {
                metrics::counter!("saga_resumes_total").increment(1);
                tracing::info!(state = %saga.state(), "resuming saga from journal");
            }
        }

        // Work from the journaled request so a resumed execution uses the
        // originally accepted data.
        let tenant_id = saga
            .tenant_id()
            .cloned()
            .unwrap_or_else(|| request.tenant_id.clone());
        let user_id = saga
            .user_id()
            .cloned()
            .unwrap_or_else(|| request.user_id.clone());
        let payload = saga
            .payload()
            .map(str::to_string)
            .unwrap_or_else(|| request.payload.clone());

        // Step 1: create the invoice record
        let invoice = match saga.invoice_result() {
            Some(result) => result.to_string(),
            None => {
                tracing::info!(
                    step = invoice_creation::STEP_CREATE_INVOICE,
                    "saga step started"
                );
                match self
                    .call_with_retry(invoice_creation::STEP_CREATE_INVOICE, || {
                        self.client.create_invoice(&tenant_id, &user_id, &payload)
                    })
                    .await
                {
                    Ok(result) => {
                        let completed = SagaEvent::invoice_created(&result);
                        version = self.append_saga_event(saga_id, version, &completed).await?;
                        saga.apply(completed);
                        result
                    }
                    Err(e) => {
                        return self
                            .fail(
                                saga_id,
                                version,
                                saga_start,
                                invoice_creation::STEP_CREATE_INVOICE,
                                e,
                            )
                            .await;
                    }
                }
            }
        };

        // Step 2: generate the PDF; only reached once step 1's result is
        // durably journaled.
        tracing::info!(
            step = invoice_creation::STEP_GENERATE_PDF,
            "saga step started"
        );
        let pdf = match self
            .call_with_retry(invoice_creation::STEP_GENERATE_PDF, || {
                self.client.generate_pdf(&tenant_id, &user_id, &invoice)
            })
            .await
        {
            Ok(result) => {
                let completed = SagaEvent::pdf_stored(&result);
                self.append_saga_event(saga_id, version, &completed).await?;
                result
            }
            Err(e) => {
                return self
                    .fail(
                        saga_id,
                        version,
                        saga_start,
                        invoice_creation::STEP_GENERATE_PDF,
                        e,
                    )
                    .await;
            }
        };

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        metrics::counter!("saga_completed").increment(1);
        tracing::info!(%saga_id, duration, "saga completed successfully");

        Ok(pdf)
    }

    /// Calls a remote step under the retry policy.
    ///
    /// Only transient (`Unavailable`) failures are retried; a rejection is
    /// returned immediately.
    async fn call_with_retry<T, F, Fut>(&self, step: &str, mut call: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    metrics::counter!("saga_step_retries_total").increment(1);
                    tracing::warn!(
                        step,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "remote unavailable, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Journals the saga failure and surfaces it.
    async fn fail(
        &self,
        saga_id: SagaId,
        version: Version,
        saga_start: std::time::Instant,
        step: &str,
        err: ClientError,
    ) -> Result<String, SagaError> {
        let failed = SagaEvent::saga_failed(step, err.to_string());
        self.append_saga_event(saga_id, version, &failed).await?;

        metrics::histogram!("saga_duration_seconds").record(saga_start.elapsed().as_secs_f64());
        metrics::counter!("saga_failed").increment(1);
        tracing::warn!(%saga_id, step, error = %err, "saga failed");

        Err(SagaError::StepFailed {
            step: step.to_string(),
            reason: err.to_string(),
        })
    }

    /// Loads a saga instance by ID from the journal.
    pub async fn get_saga(&self, saga_id: SagaId) -> Result<Option<SagaInstance>, SagaError> {
        let records = self.journal.get_records(saga_id).await?;

        if records.is_empty() {
            return Ok(None);
        }

        let mut saga = SagaInstance::default();
        for record in records {
            let event: SagaEvent = serde_json::from_value(record.payload)?;
            saga.apply(event);
        }
        Ok(Some(saga))
    }

    /// Appends a single saga event to the journal.
    async fn append_saga_event(
        &self,
        saga_id: SagaId,
        current_version: Version,
        event: &SagaEvent,
    ) -> Result<Version, SagaError> {
        let next_version = current_version.next();

        let record = JournalRecord::builder()
            .event_type(event.event_type())
            .saga_id(saga_id)
            .saga_type(invoice_creation::SAGA_TYPE)
            .version(next_version)
            .payload(event)?
            .build();

        let new_version = self
            .journal
            .append(
                vec![record],
                AppendOptions::expect_version(current_version),
            )
            .await?;

        Ok(new_version)
    }
}
