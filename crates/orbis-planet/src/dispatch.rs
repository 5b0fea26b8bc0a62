//! Background geometry generation on a worker thread pool.
//!
//! Requests go in as [`WorkerMessage`]s carrying a caller-visible
//! [`RequestId`]; finished meshes come back as [`WorkerResponse`]s tagged with
//! the same id. Buffers move through the channels, never copied. Responses can
//! arrive in any order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use dashmap::DashMap;
use orbis_terrain::NoiseBiome;
use serde::{Deserialize, Serialize};

use crate::{GeneratedMeshes, GenerationError, GenerationRequest, Icosphere, generate_planet};

/// Correlation token pairing a response with its request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Inbound message envelope.
///
/// On the wire: `{ "type": "createGeometry", "data": { .. }, "requestId": 7 }`.
/// Any other `type` decodes as [`WorkerMessage::Unknown`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerMessage {
    CreateGeometry {
        data: GenerationRequest,
        #[serde(rename = "requestId")]
        request_id: RequestId,
    },
    #[serde(other)]
    Unknown,
}

/// Outbound message: the finished meshes or the reason there are none.
#[derive(Debug)]
pub enum WorkerResponse {
    Geometry {
        request_id: RequestId,
        data: GeneratedMeshes,
        /// Worker-side generation time in microseconds.
        generation_time_us: u64,
    },
    Failed {
        request_id: RequestId,
        error: GenerationError,
    },
}

impl WorkerResponse {
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Geometry { request_id, .. } | Self::Failed { request_id, .. } => *request_id,
        }
    }
}

/// Errors returned when a message cannot be queued.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The in-flight budget is used up; retry after draining responses.
    #[error("worker queue is full ({in_flight} requests in flight)")]
    Busy { in_flight: usize },

    /// The workers have shut down.
    #[error("geometry workers have shut down")]
    Disconnected,

    #[error("failed to spawn geometry worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Pool of threads that turn generation requests into meshes.
pub struct GeometryWorker {
    message_sender: Option<Sender<WorkerMessage>>,
    response_receiver: Receiver<WorkerResponse>,
    handles: Vec<JoinHandle<()>>,
    /// Submission time of every request without a collected response.
    pending: Arc<DashMap<RequestId, Instant>>,
    in_flight: Arc<AtomicUsize>,
    next_id: AtomicU64,
    max_in_flight: usize,
}

impl GeometryWorker {
    /// Spawn `thread_count` workers accepting at most `max_in_flight` queued
    /// or running messages.
    pub fn new(thread_count: usize, max_in_flight: usize) -> Result<Self, DispatchError> {
        let thread_count = thread_count.max(1);
        let max_in_flight = max_in_flight.max(1);
        let (message_sender, message_receiver) = bounded::<WorkerMessage>(max_in_flight);
        let (response_sender, response_receiver) = unbounded::<WorkerResponse>();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(thread_count);
        for index in 0..thread_count {
            let receiver = message_receiver.clone();
            let sender = response_sender.clone();
            let in_flight = Arc::clone(&in_flight);

            let handle = std::thread::Builder::new()
                .name(format!("geometry-worker-{index}"))
                .spawn(move || {
                    while let Ok(message) = receiver.recv() {
                        if let Some(response) = handle_message(message) {
                            let _ = sender.send(response);
                        }
                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })
                .map_err(DispatchError::Spawn)?;
            handles.push(handle);
        }

        tracing::info!(threads = thread_count, max_in_flight, "Started geometry workers");

        Ok(Self {
            message_sender: Some(message_sender),
            response_receiver,
            handles,
            pending: Arc::new(DashMap::new()),
            in_flight,
            next_id: AtomicU64::new(1),
            max_in_flight,
        })
    }

    /// A pool sized to the machine, leaving a core for the caller.
    pub fn with_defaults() -> Result<Self, DispatchError> {
        let threads = num_cpus::get().saturating_sub(1).max(1);
        Self::new(threads, threads * 2)
    }

    /// Queue a request under a fresh id.
    pub fn submit(&self, request: GenerationRequest) -> Result<RequestId, DispatchError> {
        let request_id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.send(WorkerMessage::CreateGeometry {
            data: request,
            request_id,
        })?;
        Ok(request_id)
    }

    /// Queue a raw message. The caller chooses the id.
    pub fn send(&self, message: WorkerMessage) -> Result<(), DispatchError> {
        let sender = self
            .message_sender
            .as_ref()
            .ok_or(DispatchError::Disconnected)?;

        let in_flight = self.in_flight.fetch_add(1, Ordering::Relaxed);
        if in_flight >= self.max_in_flight {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return Err(DispatchError::Busy { in_flight });
        }

        let request_id = match &message {
            WorkerMessage::CreateGeometry { request_id, .. } => Some(*request_id),
            WorkerMessage::Unknown => None,
        };
        if let Some(id) = request_id {
            self.pending.insert(id, Instant::now());
        }

        sender.try_send(message).map_err(|e| {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            if let Some(id) = request_id {
                self.pending.remove(&id);
            }
            match e {
                TrySendError::Full(_) => DispatchError::Busy {
                    in_flight: self.in_flight_count(),
                },
                TrySendError::Disconnected(_) => DispatchError::Disconnected,
            }
        })
    }

    /// Collect every response that is ready without blocking.
    pub fn drain_responses(&self) -> Vec<WorkerResponse> {
        let mut responses = Vec::new();
        while let Ok(response) = self.response_receiver.try_recv() {
            self.collect(&response);
            responses.push(response);
        }
        responses
    }

    /// Wait up to `timeout` for the next response.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerResponse> {
        let response = self.response_receiver.recv_timeout(timeout).ok()?;
        self.collect(&response);
        Some(response)
    }

    fn collect(&self, response: &WorkerResponse) {
        if let Some((id, submitted)) = self.pending.remove(&response.request_id()) {
            tracing::debug!(
                request_id = %id,
                round_trip_ms = submitted.elapsed().as_secs_f64() * 1000.0,
                "Collected geometry response"
            );
        }
    }

    /// Messages queued or being processed.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// `true` until the response for `id` has been collected.
    pub fn is_pending(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Stop accepting messages, let queued ones finish, and join the workers.
    ///
    /// Responses produced before the workers exit can still be drained.
    pub fn shutdown(&mut self) {
        if self.message_sender.take().is_none() {
            return;
        }
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::error!("Geometry worker panicked");
            }
        }
        tracing::info!("Geometry workers stopped");
    }
}

impl Drop for GeometryWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn handle_message(message: WorkerMessage) -> Option<WorkerResponse> {
    match message {
        WorkerMessage::CreateGeometry { data, request_id } => {
            let _span = tracing::info_span!("create_geometry", request_id = request_id.0).entered();
            let start = Instant::now();
            let response = match create_geometry(&data) {
                Ok(meshes) => WorkerResponse::Geometry {
                    request_id,
                    data: meshes,
                    generation_time_us: start.elapsed().as_micros() as u64,
                },
                Err(error) => {
                    tracing::warn!(%error, "Geometry generation failed");
                    WorkerResponse::Failed { request_id, error }
                }
            };
            Some(response)
        }
        WorkerMessage::Unknown => {
            tracing::error!("Unknown worker message type");
            None
        }
    }
}

fn create_geometry(request: &GenerationRequest) -> Result<GeneratedMeshes, GenerationError> {
    let biome = NoiseBiome::new(request.biome.clone())?;
    generate_planet(request, &biome, &Icosphere)
}
