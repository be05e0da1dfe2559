// SPDX-License-Identifier: GPL-3.0-only

//! Timer and burst capture sequencing
//!
//! One sequence runs per sequencer at a time:
//!
//! ```text
//! Idle → [CountingDown(t..1) → Ready] → Capturing → InterShotWait → ... → Done
//!                                                                       ↘ Cancelled
//! ```
//!
//! Waits go through `tokio::time`, so the whole protocol can be driven by a
//! paused clock in tests.

use super::{CaptureResult, CapturedPhoto, FrameCapturer};
use crate::backends::camera::FrameSource;
use crate::config::CaptureConfig;
use crate::constants::{BurstPreset, TimerSetting};
use crate::errors::SequenceError;
use crate::filters::FilterProvider;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Observable sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerState {
    #[default]
    Idle,
    /// Countdown before `shot`, `remaining` seconds left
    CountingDown { shot: u32, remaining: u32 },
    /// Frame being captured
    Capturing { shot: u32 },
    /// Pause after `shot` before the next one
    InterShotWait { shot: u32 },
    Done,
    Cancelled,
}

impl SequencerState {
    /// Whether a sequence is in progress
    pub fn is_running(&self) -> bool {
        !matches!(
            self,
            SequencerState::Idle | SequencerState::Done | SequencerState::Cancelled
        )
    }
}

/// Parameters of one burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstRequest {
    /// Number of shots to attempt (at least one)
    pub burst_target: u32,
    /// Countdown before every shot
    pub timer: TimerSetting,
}

impl BurstRequest {
    pub fn new(burst_target: u32, timer: TimerSetting) -> Self {
        Self {
            burst_target,
            timer,
        }
    }

    pub fn from_preset(preset: BurstPreset, timer: TimerSetting) -> Self {
        Self::new(preset.count(), timer)
    }
}

impl Default for BurstRequest {
    fn default() -> Self {
        Self::from_preset(BurstPreset::default(), TimerSetting::default())
    }
}

/// Notifications emitted while a sequence runs
#[derive(Debug, Clone)]
pub enum SequenceEvent {
    StateChanged(SequencerState),
    /// Countdown value to display
    Countdown(u32),
    /// The "smile" prompt is up; the shot follows after the ready pause
    Ready,
    /// Countdown overlay should be removed
    CountdownCleared,
    /// A shot succeeded
    PhotoCaptured(CapturedPhoto),
    /// The frame source was not ready for this shot
    ShotSkipped { index: u32 },
    /// The burst finished with at least one photo
    Completed(Vec<CapturedPhoto>),
}

/// Result of a sequence
#[derive(Debug, Clone, Default)]
pub struct SequenceOutcome {
    /// Captured photos in capture order
    pub photos: Vec<CapturedPhoto>,
    /// Shots requested
    pub requested: u32,
    /// Indices of shots that produced nothing
    pub skipped: Vec<u32>,
    /// The sequence was cancelled before finishing
    pub cancelled: bool,
}

impl SequenceOutcome {
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.photos.len() as u32 == self.requested
    }
}

/// Clears the active flag when the sequence ends, however it ends
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs timer/burst capture sequences against a frame source
pub struct CaptureSequencer {
    config: CaptureConfig,
    capturer: FrameCapturer,
    active: AtomicBool,
    state: watch::Sender<SequencerState>,
    events: Option<mpsc::UnboundedSender<SequenceEvent>>,
}

impl CaptureSequencer {
    pub fn new(config: CaptureConfig) -> Self {
        let (state, _) = watch::channel(SequencerState::Idle);
        Self {
            capturer: FrameCapturer::new(&config),
            config,
            active: AtomicBool::new(false),
            state,
            events: None,
        }
    }

    /// Send progress events to `events`
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SequenceEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> SequencerState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SequencerState> {
        self.state.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Run a burst to completion or cancellation
    ///
    /// The filter is read from `filter` right before each shot. Shots for
    /// which the source has no frame are skipped, so the outcome may hold
    /// fewer photos than requested. Fails only if the request is invalid or
    /// another sequence is running.
    pub async fn run_sequence(
        &self,
        request: BurstRequest,
        filter: &dyn FilterProvider,
        source: &dyn FrameSource,
        cancel: CancellationToken,
    ) -> Result<SequenceOutcome, SequenceError> {
        if request.burst_target == 0 {
            return Err(SequenceError::InvalidBurst(request.burst_target));
        }

        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Burst requested while another is running");
            return Err(SequenceError::AlreadyActive);
        }
        let _guard = ActiveGuard(&self.active);

        let session = Uuid::new_v4();
        info!(
            %session,
            burst_target = request.burst_target,
            timer = request.timer.seconds(),
            "Starting capture sequence"
        );

        let mut outcome = SequenceOutcome {
            photos: Vec::with_capacity(request.burst_target as usize),
            requested: request.burst_target,
            ..Default::default()
        };

        for shot in 0..request.burst_target {
            if cancel.is_cancelled() || !self.countdown(shot, request.timer, &cancel).await {
                return Ok(self.cancelled(session, outcome));
            }

            self.set_state(SequencerState::Capturing { shot });
            let active_filter = filter.current_filter();

            match self.capturer.capture(source, &active_filter).await {
                Ok(CaptureResult::Captured(image)) => {
                    let photo = CapturedPhoto {
                        image,
                        filter: active_filter,
                        index: shot,
                        captured_at: chrono::Local::now(),
                    };
                    debug!(%session, shot, size = photo.image.len(), "Shot captured");
                    self.emit(SequenceEvent::PhotoCaptured(photo.clone()));
                    outcome.photos.push(photo);
                }
                Ok(CaptureResult::NotReady) => {
                    warn!(%session, shot, "Frame source not ready, shot skipped");
                    outcome.skipped.push(shot);
                    self.emit(SequenceEvent::ShotSkipped { index: shot });
                }
                Err(e) => {
                    error!(%session, shot, error = %e, "Capture failed, shot skipped");
                    outcome.skipped.push(shot);
                    self.emit(SequenceEvent::ShotSkipped { index: shot });
                }
            }

            if shot + 1 < request.burst_target {
                self.set_state(SequencerState::InterShotWait { shot });
                if !self.pause(self.config.inter_shot_pause(), &cancel).await {
                    return Ok(self.cancelled(session, outcome));
                }
            }
        }

        self.set_state(SequencerState::Done);
        info!(
            %session,
            captured = outcome.photos.len(),
            skipped = outcome.skipped.len(),
            "Capture sequence finished"
        );

        if !outcome.photos.is_empty() {
            self.emit(SequenceEvent::Completed(outcome.photos.clone()));
        }

        Ok(outcome)
    }

    /// Count down before `shot`; false if cancelled
    async fn countdown(&self, shot: u32, timer: TimerSetting, cancel: &CancellationToken) -> bool {
        let seconds = timer.seconds();
        if seconds == 0 {
            return true;
        }

        for remaining in (1..=seconds).rev() {
            self.set_state(SequencerState::CountingDown { shot, remaining });
            self.emit(SequenceEvent::Countdown(remaining));
            if !self.pause(self.config.countdown_tick(), cancel).await {
                return false;
            }
        }

        self.emit(SequenceEvent::Ready);
        let completed = self.pause(self.config.ready_pause(), cancel).await;
        self.emit(SequenceEvent::CountdownCleared);
        completed
    }

    /// Sleep for `duration` unless cancelled first; false if cancelled
    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    fn cancelled(&self, session: Uuid, mut outcome: SequenceOutcome) -> SequenceOutcome {
        info!(
            %session,
            captured = outcome.photos.len(),
            "Capture sequence cancelled"
        );
        outcome.cancelled = true;
        self.set_state(SequencerState::Cancelled);
        outcome
    }

    fn set_state(&self, state: SequencerState) {
        self.state.send_replace(state);
        self.emit(SequenceEvent::StateChanged(state));
    }

    fn emit(&self, event: SequenceEvent) {
        if let Some(events) = &self.events {
            // Receiver gone means nobody is watching; the burst carries on
            let _ = events.send(event);
        }
    }
}

impl Default for CaptureSequencer {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}
