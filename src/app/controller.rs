// SPDX-License-Identifier: GPL-3.0-only

//! Capture/process/persist controller
//!
//! The controller owns the only busy flag. A request is accepted only when
//! the controller is idle; a shutter press while busy is dropped, never
//! queued. Every accepted request ends with exactly one
//! [`CaptureEvent::Completed`], sent after the controller is idle again,
//! even when the device or store panics.

use crate::app::state::{
    CaptureEvent, CaptureStatus, PipelineState, ProcessingRequest, ProcessingResult,
};
use crate::backends::camera::{CaptureDevice, CapturedFrame, ExposureOverride};
use crate::errors::{BackendResult, CaptureError};
use crate::pipelines::photo::PhotoPipeline;
use crate::storage::{Authorization, PhotoStore};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Drives one capture at a time through the device, the film pipeline and the store
pub struct CaptureController {
    device: Arc<dyn CaptureDevice>,
    store: Arc<dyn PhotoStore>,
    pipeline: Arc<PhotoPipeline>,
    state: Arc<watch::Sender<PipelineState>>,
    events: mpsc::UnboundedSender<CaptureEvent>,
    capture_timeout: Option<Duration>,
}

impl CaptureController {
    /// Create a controller and the event receiver for the result context
    pub fn new(
        device: Arc<dyn CaptureDevice>,
        store: Arc<dyn PhotoStore>,
        pipeline: Arc<PhotoPipeline>,
    ) -> (Self, mpsc::UnboundedReceiver<CaptureEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(PipelineState::Idle);
        let controller = Self {
            device,
            store,
            pipeline,
            state: Arc::new(state),
            events,
            capture_timeout: None,
        };
        (controller, receiver)
    }

    /// Fail captures that take longer than `timeout` with a device error
    pub fn with_capture_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.capture_timeout = timeout;
        self
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    /// Watch state transitions without going through the event channel
    pub fn subscribe_state(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Accept a capture request if the controller is idle
    ///
    /// Returns the handle of the spawned capture task, or `None` when a
    /// capture is already in flight. A rejected request has no effect.
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: ProcessingRequest) -> Option<JoinHandle<()>> {
        let Some(guard) = BusyGuard::acquire(&self.state, &self.events) else {
            info!(state = %self.state(), "Capture already in progress, ignoring request");
            return None;
        };

        info!(
            device = self.device.name(),
            style = %request.style(),
            light_leak = ?request.light_leak_intensity(),
            date_stamp = request.date_stamp_enabled(),
            "Capture request accepted"
        );

        let task = CaptureTask {
            device: Arc::clone(&self.device),
            store: Arc::clone(&self.store),
            pipeline: Arc::clone(&self.pipeline),
            capture_timeout: self.capture_timeout,
        };
        let events = self.events.clone();

        Some(tokio::spawn(async move {
            // A panicking collaborator still ends in a terminal status
            let result = AssertUnwindSafe(task.run(&guard, request))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    error!("Capture task panicked");
                    ProcessingResult::device_error(CaptureError::Device(
                        "capture task panicked".to_string(),
                    ))
                });
            // Back to idle before the result is delivered
            drop(guard);

            info!(status = %result.status, "Capture finished");
            if events.send(CaptureEvent::Completed(result)).is_err() {
                debug!("Result receiver closed, dropping capture result");
            }
        }))
    }
}

/// Holds the busy flag for one request
///
/// Dropping the guard returns the controller to `Idle` on every exit path.
struct BusyGuard {
    state: Arc<watch::Sender<PipelineState>>,
    events: mpsc::UnboundedSender<CaptureEvent>,
}

impl BusyGuard {
    fn acquire(
        state: &Arc<watch::Sender<PipelineState>>,
        events: &mpsc::UnboundedSender<CaptureEvent>,
    ) -> Option<Self> {
        let acquired = state.send_if_modified(|current| {
            if *current == PipelineState::Idle {
                *current = PipelineState::Capturing;
                true
            } else {
                false
            }
        });
        if !acquired {
            return None;
        }

        let guard = Self {
            state: Arc::clone(state),
            events: events.clone(),
        };
        guard.notify(PipelineState::Capturing);
        Some(guard)
    }

    fn advance(&self, next: PipelineState) {
        self.state.send_replace(next);
        self.notify(next);
    }

    fn notify(&self, state: PipelineState) {
        debug!(%state, "Pipeline state changed");
        let _ = self.events.send(CaptureEvent::StateChanged(state));
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.advance(PipelineState::Idle);
    }
}

/// Collaborators cloned into the spawned capture task
struct CaptureTask {
    device: Arc<dyn CaptureDevice>,
    store: Arc<dyn PhotoStore>,
    pipeline: Arc<PhotoPipeline>,
    capture_timeout: Option<Duration>,
}

impl CaptureTask {
    async fn run(self, guard: &BusyGuard, request: ProcessingRequest) -> ProcessingResult {
        let frame = match self.capture(&request).await {
            Ok(frame) if frame.is_empty() => {
                warn!(?frame, "Device returned an empty frame");
                return ProcessingResult::device_error(CaptureError::NoData);
            }
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Capture failed");
                return ProcessingResult::device_error(e);
            }
        };
        debug!(?frame, "Frame captured");

        guard.advance(PipelineState::Processing);
        let captured_at = frame.captured_at;
        let image = Arc::clone(&self.pipeline)
            .process_async(frame, request)
            .await;

        guard.advance(PipelineState::Persisting);
        match self.store.request_authorization().await {
            Authorization::Denied => {
                warn!("Photo library authorization denied, not saving");
                ProcessingResult {
                    status: CaptureStatus::LibraryAccessDenied,
                    image: Some(image),
                    saved: None,
                }
            }
            Authorization::Granted => {
                debug!("Photo library authorization granted");
                match self.store.write(image.clone(), captured_at).await {
                    Ok(saved) => ProcessingResult {
                        status: CaptureStatus::Success,
                        image: Some(image),
                        saved: Some(saved),
                    },
                    Err(e) => {
                        error!(error = %e, "Failed to save photo");
                        ProcessingResult {
                            status: CaptureStatus::StorageFailed(e),
                            image: Some(image),
                            saved: None,
                        }
                    }
                }
            }
        }
    }

    /// Apply the clamped manual exposure, if any, and fire the shutter
    async fn capture(&self, request: &ProcessingRequest) -> BackendResult<CapturedFrame> {
        let exposure: Option<ExposureOverride> = request.manual_exposure().map(|manual| {
            let clamped = self
                .device
                .exposure_limits()
                .clamp(manual.iso, manual.shutter);
            debug!(
                requested_iso = manual.iso,
                iso = clamped.iso,
                duration_us = clamped.duration.as_micros() as u64,
                "Manual exposure"
            );
            clamped
        });

        let capture = self.device.capture_once(exposure);
        match self.capture_timeout {
            Some(limit) => tokio::time::timeout(limit, capture)
                .await
                .unwrap_or_else(|_| {
                    warn!(timeout_ms = limit.as_millis() as u64, "Capture timed out");
                    Err(CaptureError::Timeout)
                }),
            None => capture.await,
        }
    }
}
