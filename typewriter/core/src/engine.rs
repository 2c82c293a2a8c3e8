//! TypeWriter Engine
//!
//! Types a list of terms character by character, pauses, optionally erases
//! them again and moves on to the next term. All timing goes through the
//! engine's own [`TimerQueue`]; the host moves time forward with
//! [`TypeWriterEngine::advance`] (tests, frame loops) or lets
//! [`crate::task::TypeWriterTask`] do it in real time.
//!
//! # State Machine
//!
//! ```text
//!            configure
//!                │
//!                ▼
//!   ┌──────── Typing ◄──────────────────────┐
//!   │   (type interval, 1 char/tick)        │
//!   ▼                                       │ next term
//! Paused ── delay ──► Erasing ──────────────┘
//!   │    (loop only)  (erase interval)
//!   │ no loop
//!   ▼
//!  Done (cursor hidden)
//! ```
//!
//! # Liveness
//!
//! Every armed timer captures the engine's epoch. `configure` and
//! `teardown` bump the epoch, so a timer that was already due when the
//! cycle was cancelled is dropped without touching state.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::messages::Frame;
use crate::text::TermText;
use crate::timer::{FiredTimer, TimerId, TimerKind, TimerQueue};
use std::time::Duration;

/// Receives every visible change of an engine
pub trait TypeWriterDisplay {
    /// Called with the new visible text and cursor flag
    fn on_change(&mut self, visible_text: &str, cursor_visible: bool);
}

impl<F> TypeWriterDisplay for F
where
    F: FnMut(&str, bool),
{
    fn on_change(&mut self, visible_text: &str, cursor_visible: bool) {
        self(visible_text, cursor_visible);
    }
}

/// Stage of the current cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Not started, or nothing to type
    #[default]
    Idle,
    /// Revealing the active term
    Typing,
    /// Full term shown, waiting for the delay
    Paused,
    /// Removing the active term
    Erasing,
    /// Finished; nothing more happens until reconfigured
    Done,
}

#[derive(Clone, Debug, Default)]
struct EngineState {
    active_index: usize,
    visible_text: String,
    cursor_visible: bool,
    phase: Phase,
    string_index: usize,
    erase_index: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct TimerHandles {
    typing: Option<TimerId>,
    erasing: Option<TimerId>,
    phase_delay: Option<TimerId>,
}

/// The typewriter animation engine
///
/// One instance drives one display. Instances share nothing, so any
/// number of them can run side by side.
pub struct TypeWriterEngine<D> {
    display: D,
    terms: Vec<TermText>,
    config: EngineConfig,
    state: EngineState,
    handles: TimerHandles,
    timers: TimerQueue,
    /// Liveness token; bumped on configure and teardown
    epoch: u64,
    live: bool,
}

impl<D: TypeWriterDisplay> TypeWriterEngine<D> {
    /// Create an idle engine; nothing happens until [`configure`](Self::configure)
    pub fn new(display: D) -> Self {
        Self {
            display,
            terms: Vec::new(),
            config: EngineConfig::default(),
            state: EngineState::default(),
            handles: TimerHandles::default(),
            timers: TimerQueue::new(),
            epoch: 0,
            live: false,
        }
    }

    /// Create an engine and start it right away
    pub fn with_terms<I, S>(display: D, terms: I, config: EngineConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut engine = Self::new(display);
        engine.configure(terms, config);
        engine
    }

    /// (Re)start from the first term
    ///
    /// Pending timers of the previous configuration are cancelled before
    /// anything else, so none of them can fire afterwards.
    pub fn configure<I, S>(&mut self, terms: I, config: EngineConfig)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cancel_all();
        self.epoch += 1;
        self.live = true;

        self.terms = terms.into_iter().map(TermText::new).collect();
        self.config = config;
        self.state = EngineState {
            cursor_visible: config.cursor,
            ..EngineState::default()
        };

        debug!(
            epoch = self.epoch,
            terms = self.terms.len(),
            speed = config.speed.get(),
            delay_secs = config.delay.get(),
            looping = config.looping,
            "Configuring typewriter"
        );

        self.notify();

        if self.terms.iter().all(TermText::is_empty) {
            debug!("No characters to type, staying idle");
            return;
        }

        self.begin_term();
    }

    /// Cancel all timers; no callback has any effect afterwards
    ///
    /// The visible text and cursor keep their last values. Safe to call any
    /// number of times.
    pub fn teardown(&mut self) {
        if !self.live {
            return;
        }
        self.cancel_all();
        self.epoch += 1;
        self.live = false;
        debug!(epoch = self.epoch, phase = ?self.state.phase, "Typewriter torn down");
    }

    /// Move time forward by `by`, firing every timer that comes due
    pub fn advance(&mut self, by: Duration) {
        self.advance_to(self.timers.now() + by);
    }

    /// Move time forward to `until` (measured from engine creation)
    pub fn advance_to(&mut self, until: Duration) {
        while let Some(fired) = self.timers.pop_due(until) {
            self.on_timer(fired);
        }
        self.timers.settle(until);
    }

    /// Current engine time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// When the next timer fires, if any is armed
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Number of armed timers
    #[must_use]
    pub fn armed_timers(&self) -> usize {
        self.timers.armed()
    }

    /// Text currently shown
    #[must_use]
    pub fn visible_text(&self) -> &str {
        &self.state.visible_text
    }

    /// Whether the cursor is currently shown
    #[must_use]
    pub fn cursor_visible(&self) -> bool {
        self.state.cursor_visible
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Index of the active term
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.state.active_index
    }

    /// The active term, or `None` once a non-looping engine ran past the end
    #[must_use]
    pub fn active_term(&self) -> Option<&str> {
        self.terms.get(self.state.active_index).map(TermText::as_str)
    }

    /// Whether the engine is configured and not torn down
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot of what the display should show
    #[must_use]
    pub fn frame(&self) -> Frame {
        Frame::new(self.state.visible_text.clone(), self.state.cursor_visible)
    }

    /// The display this engine reports to
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Mutable access to the display
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Tear down and hand back the display
    pub fn into_display(mut self) -> D {
        self.teardown();
        self.display
    }

    fn notify(&mut self) {
        self.display
            .on_change(&self.state.visible_text, self.state.cursor_visible);
    }

    fn cancel_all(&mut self) {
        for id in [
            self.handles.typing.take(),
            self.handles.erasing.take(),
            self.handles.phase_delay.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.timers.cancel(id);
        }
        self.timers.clear();
    }

    fn on_timer(&mut self, fired: FiredTimer) {
        if !self.live || fired.epoch != self.epoch {
            trace!(epoch = fired.epoch, current = self.epoch, "Ignoring stale timer");
            return;
        }

        let expected = match fired.kind {
            TimerKind::Type => self.handles.typing,
            TimerKind::Erase => self.handles.erasing,
            TimerKind::PhaseDelay => self.handles.phase_delay,
        };
        if expected != Some(fired.id) {
            trace!(kind = ?fired.kind, "Ignoring disarmed timer");
            return;
        }

        match fired.kind {
            TimerKind::Type => self.type_tick(),
            TimerKind::Erase => self.erase_tick(),
            TimerKind::PhaseDelay => self.delay_elapsed(),
        }
    }

    /// Start typing the term at `active_index`, skipping empty terms
    ///
    /// Only called while at least one term has characters, so the skip
    /// loop always ends.
    fn begin_term(&mut self) {
        loop {
            if self.state.active_index >= self.terms.len() {
                if !self.config.looping {
                    self.finish();
                    return;
                }
                self.state.active_index = 0;
            }
            if !self.terms[self.state.active_index].is_empty() {
                break;
            }
            trace!(index = self.state.active_index, "Skipping empty term");
            self.state.active_index += 1;
        }

        debug!(index = self.state.active_index, "Typing term");
        self.state.phase = Phase::Typing;
        self.state.string_index = 0;
        self.handles.typing = Some(self.timers.arm_interval(
            TimerKind::Type,
            self.config.interval(),
            self.epoch,
        ));
    }

    fn type_tick(&mut self) {
        let term = &self.terms[self.state.active_index];
        self.state.string_index += 1;
        self.state.visible_text = term.prefix(self.state.string_index).to_string();
        let complete = self.state.string_index >= term.len();
        trace!(chars = self.state.string_index, "Typed");
        self.notify();

        if complete {
            if let Some(id) = self.handles.typing.take() {
                self.timers.cancel(id);
            }
            self.state.phase = Phase::Paused;
            self.handles.phase_delay = Some(self.timers.arm_timeout(
                TimerKind::PhaseDelay,
                self.config.delay.duration(),
                self.epoch,
            ));
            debug!(index = self.state.active_index, "Term typed, pausing");
        }
    }

    fn delay_elapsed(&mut self) {
        self.handles.phase_delay = None;

        if self.config.looping {
            self.state.phase = Phase::Erasing;
            self.state.erase_index = self.terms[self.state.active_index].len();
            self.handles.erasing = Some(self.timers.arm_interval(
                TimerKind::Erase,
                self.config.interval(),
                self.epoch,
            ));
            debug!(index = self.state.active_index, "Erasing term");
        } else {
            self.finish();
        }
    }

    fn erase_tick(&mut self) {
        self.state.erase_index = self.state.erase_index.saturating_sub(1);
        self.state.visible_text = self.terms[self.state.active_index]
            .prefix(self.state.erase_index)
            .to_string();
        trace!(chars = self.state.erase_index, "Erased");
        self.notify();

        if self.state.erase_index == 0 {
            if let Some(id) = self.handles.erasing.take() {
                self.timers.cancel(id);
            }
            self.state.active_index += 1;
            self.begin_term();
        }
    }

    fn finish(&mut self) {
        self.state.phase = Phase::Done;
        debug!(text = %self.state.visible_text, "Typewriter done");
        if self.state.cursor_visible {
            self.state.cursor_visible = false;
            self.notify();
        }
    }
}

impl<D> std::fmt::Debug for TypeWriterEngine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeWriterEngine")
            .field("terms", &self.terms.len())
            .field("config", &self.config)
            .field("state", &self.state)
            .field("armed_timers", &self.timers.armed())
            .field("epoch", &self.epoch)
            .field("live", &self.live)
            .finish()
    }
}
