//! Gesture state machine.
//!
//! Thumb-wheel ticks arrive as discrete events; the compositor needs a held
//! Mod + middle-button drag. The first tick starts the gesture, every tick
//! moves the virtual pointer, and the gesture is released once no tick has
//! arrived for the release delay.
//!
//! Event handling, the timer-triggered release and the shutdown release all
//! run under one lock, so a start is always paired with exactly one end.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thumb_gesture_input::GestureEmitter;
use thumb_gesture_types::GestureEvent;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::GestureConfig;
use crate::error::DaemonError;
use crate::state::{GestureState, StatusReporter};
use crate::timer::DebounceTimer;

/// Timing and sensitivity of the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureSettings {
    pub release_delay: Duration,
    pub pixels_per_tick: u32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self::from(&GestureConfig::default())
    }
}

impl From<&GestureConfig> for GestureSettings {
    fn from(config: &GestureConfig) -> Self {
        Self {
            release_delay: config.release_delay(),
            pixels_per_tick: config.pixels_per_tick,
        }
    }
}

struct GestureCore {
    state: GestureState,
    emitter: GestureEmitter,
    timer: DebounceTimer,
    gestures_started: u64,
}

/// Clonable handle to the single gesture state machine.
#[derive(Clone)]
pub struct GestureMachine {
    core: Arc<Mutex<GestureCore>>,
    settings: GestureSettings,
    status: StatusReporter,
}

impl GestureMachine {
    pub fn new(emitter: GestureEmitter, settings: GestureSettings, status: StatusReporter) -> Self {
        Self {
            core: Arc::new(Mutex::new(GestureCore {
                state: GestureState::default(),
                emitter,
                timer: DebounceTimer::new(),
                gestures_started: 0,
            })),
            settings,
            status,
        }
    }

    /// Apply one tick: start the gesture if needed, move, and rearm the release.
    ///
    /// Only a virtual pointer failure is returned; it is fatal. The release is
    /// armed even then, so the gesture does not stay held.
    pub async fn handle_event(&self, event: GestureEvent) -> Result<(), DaemonError> {
        let dx = event.displacement(self.settings.pixels_per_tick);
        let mut core = self.core.lock().await;

        if core.state.begin() {
            info!(direction = %event.direction, "starting pan gesture");
            core.emitter.start_gesture().await;
            core.gestures_started += 1;
            let started = core.gestures_started;
            self.status.update(|s| {
                s.gesture_active = true;
                s.gestures_started = started;
            });
        }

        let moved = core.emitter.move_horizontal(dx).await;
        core.state.touch();
        self.arm_release(&mut core);
        drop(core);

        moved.map_err(|e| {
            error!(error = %e, dx, "virtual pointer write failed");
            DaemonError::from(e)
        })
    }

    /// Release the gesture now if it is held. Idempotent.
    ///
    /// Returns whether a gesture was actually ended.
    pub async fn force_end(&self) -> bool {
        let mut core = self.core.lock().await;
        core.timer.cancel();
        Self::end_locked(&mut core, &self.status).await
    }

    pub async fn is_active(&self) -> bool {
        self.core.lock().await.state.is_active()
    }

    pub async fn last_activity(&self) -> Option<Instant> {
        self.core.lock().await.state.last_activity()
    }

    /// Unregister the virtual pointer. Call after [`force_end`](Self::force_end).
    pub async fn close_device(&self) -> Result<(), DaemonError> {
        let mut core = self.core.lock().await;
        core.timer.cancel();
        core.emitter.close().await?;
        Ok(())
    }

    fn arm_release(&self, core: &mut GestureCore) {
        let weak = Arc::downgrade(&self.core);
        let status = self.status.clone();
        core.timer
            .rearm(self.settings.release_delay, move |generation| async move {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let mut core = shared.lock().await;
                if core.timer.claim(generation) {
                    debug!(generation, "release delay elapsed");
                    Self::end_locked(&mut core, &status).await;
                }
            });
    }

    async fn end_locked(core: &mut GestureCore, status: &StatusReporter) -> bool {
        if !core.state.finish() {
            return false;
        }
        info!("ending pan gesture");
        core.emitter.end_gesture().await;
        status.update(|s| s.gesture_active = false);
        true
    }
}
