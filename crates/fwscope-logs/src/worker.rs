use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use fwscope_types::FirewallLog;

use crate::protocol::{WorkerRequest, WorkerResponse};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("log worker has shut down")]
    Disconnected,
}

/// Background context that runs log processing off the caller's task
///
/// Requests are handled one at a time in arrival order, each on the blocking
/// thread pool. Responses carry no request id: if several requests are in
/// flight, the caller can't tell which response answers which, and separate
/// workers give no ordering between each other at all.
pub struct LogWorker {
    /// Request channel into the background task
    requests: mpsc::UnboundedSender<WorkerRequest>,

    /// Responses coming back
    responses: mpsc::UnboundedReceiver<WorkerResponse>,

    /// Cancellation token for stopping the background task
    cancel: CancellationToken,
}

impl LogWorker {
    /// Start the worker on the current tokio runtime
    pub fn spawn() -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<WorkerRequest>();
        let (response_tx, response_rx) = mpsc::unbounded_channel::<WorkerResponse>();
        let cancel = CancellationToken::new();

        {
            let cancel = cancel.clone();

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,

                        request = request_rx.recv() => {
                            let Some(request) = request else {
                                // Every handle dropped
                                break;
                            };

                            let response = match tokio::task::spawn_blocking(move || request.handle()).await {
                                Ok(response) => response,
                                Err(e) => {
                                    tracing::warn!("log processing task failed: {}", e);
                                    continue;
                                }
                            };

                            let WorkerResponse::ProcessedLogs { logs } = &response;
                            tracing::debug!(count = logs.len(), "processed logs");

                            if response_tx.send(response).is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }

        Self {
            requests: request_tx,
            responses: response_rx,
            cancel,
        }
    }

    /// Queue a request without waiting for it
    pub fn post(&self, request: WorkerRequest) -> Result<(), WorkerError> {
        self.requests
            .send(request)
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Wait for the next response
    ///
    /// Returns `None` once the worker has stopped and every response has been
    /// taken.
    pub async fn recv(&mut self) -> Option<WorkerResponse> {
        self.responses.recv().await
    }

    /// Post a request and wait for the next response
    ///
    /// Only meaningful with nothing else in flight; otherwise the returned
    /// batch may answer an earlier request.
    pub async fn process(&mut self, request: WorkerRequest) -> Result<Vec<FirewallLog>, WorkerError> {
        self.post(request)?;
        self.recv()
            .await
            .map(WorkerResponse::into_logs)
            .ok_or(WorkerError::Disconnected)
    }

    /// Stop the background task; pending requests are dropped
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for LogWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
