//! Real-Time Typewriter Task
//!
//! Runs a [`TypeWriterEngine`] against the tokio clock. The engine keeps its
//! own virtual timeline; this task only sleeps until the engine's next
//! deadline and then advances the engine to the real elapsed time.
//!
//! # Usage
//!
//! ```ignore
//! let (handle, mut frames, task) = TypeWriterTask::spawn(16);
//! handle.configure(vec!["Hello".into()], EngineConfig::default()).await?;
//!
//! while let Some(frame) = frames.recv().await {
//!     // draw frame.visible_text and, if frame.cursor_visible, a cursor
//! }
//!
//! handle.shutdown().await?;
//! let last = task.await?;
//! ```
//!
//! Commands are handled before due timers when both are ready, so a
//! reconfiguration always wins over a tick of the old cycle.

use std::future;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::config::EngineConfig;
use crate::engine::{Phase, TypeWriterDisplay, TypeWriterEngine};
use crate::messages::{EngineCommand, Frame};

/// Errors returned by [`TypeWriterHandle`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The task has finished and no longer accepts commands
    #[error("typewriter task has stopped")]
    Stopped,
}

/// Display that forwards every change as a [`Frame`]
#[derive(Debug)]
pub struct FrameSink {
    tx: mpsc::UnboundedSender<Frame>,
}

impl FrameSink {
    /// Wrap a frame channel
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<Frame>) -> Self {
        Self { tx }
    }
}

impl TypeWriterDisplay for FrameSink {
    fn on_change(&mut self, visible_text: &str, cursor_visible: bool) {
        if self
            .tx
            .send(Frame::new(visible_text, cursor_visible))
            .is_err()
        {
            tracing::trace!("Frame receiver dropped");
        }
    }
}

/// Cloneable handle for controlling a running [`TypeWriterTask`]
#[derive(Clone, Debug)]
pub struct TypeWriterHandle {
    tx: mpsc::Sender<EngineCommand>,
    phase: watch::Receiver<Phase>,
}

impl TypeWriterHandle {
    /// Restart the typewriter with new inputs
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Stopped`] if the task is gone.
    pub async fn configure(&self, terms: Vec<String>, config: EngineConfig) -> Result<(), TaskError> {
        self.send(EngineCommand::Configure { terms, config }).await
    }

    /// Cancel all pending timers, keeping the task alive
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Stopped`] if the task is gone.
    pub async fn teardown(&self) -> Result<(), TaskError> {
        self.send(EngineCommand::Teardown).await
    }

    /// Tear down and end the task
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Stopped`] if the task is already gone.
    pub async fn shutdown(&self) -> Result<(), TaskError> {
        self.send(EngineCommand::Shutdown).await
    }

    /// Send a raw command
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Stopped`] if the task is gone.
    pub async fn send(&self, command: EngineCommand) -> Result<(), TaskError> {
        self.tx.send(command).await.map_err(|_| TaskError::Stopped)
    }

    /// Whether the task has stopped
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Phase of the engine as of its last change
    #[must_use]
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Wait until the engine reaches `target`
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Stopped`] if the task ends first.
    pub async fn wait_for_phase(&self, target: Phase) -> Result<(), TaskError> {
        let mut phase = self.phase.clone();
        phase
            .wait_for(|current| *current == target)
            .await
            .map(|_| ())
            .map_err(|_| TaskError::Stopped)
    }
}

/// Async task owning one engine
pub struct TypeWriterTask {
    engine: TypeWriterEngine<FrameSink>,
    commands: mpsc::Receiver<EngineCommand>,
    phase: watch::Sender<Phase>,
}

impl TypeWriterTask {
    /// Create a task, its control handle and its frame stream
    ///
    /// `command_buffer` bounds the number of queued commands.
    #[must_use]
    pub fn new(
        command_buffer: usize,
    ) -> (Self, TypeWriterHandle, mpsc::UnboundedReceiver<Frame>) {
        let (command_tx, command_rx) = mpsc::channel(command_buffer.max(1));
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (phase_tx, phase_rx) = watch::channel(Phase::Idle);

        let task = Self {
            engine: TypeWriterEngine::new(FrameSink::new(frame_tx)),
            commands: command_rx,
            phase: phase_tx,
        };
        let handle = TypeWriterHandle {
            tx: command_tx,
            phase: phase_rx,
        };
        (task, handle, frame_rx)
    }

    /// Create the task and spawn it on the current runtime
    #[must_use]
    pub fn spawn(
        command_buffer: usize,
    ) -> (
        TypeWriterHandle,
        mpsc::UnboundedReceiver<Frame>,
        JoinHandle<Frame>,
    ) {
        let (task, handle, frames) = Self::new(command_buffer);
        (handle, frames, tokio::spawn(task.run()))
    }

    /// Run until shut down or every handle is dropped
    ///
    /// Returns the last frame the engine showed.
    pub async fn run(mut self) -> Frame {
        tracing::info!("Starting typewriter task");
        let started = Instant::now();

        loop {
            let deadline = self.engine.next_deadline().map(|d| started + d);
            let wake = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    // Let everything that was due before the command happen first
                    self.engine.advance_to(started.elapsed());
                    match command {
                        Some(EngineCommand::Configure { terms, config }) => {
                            self.engine.configure(terms, config);
                        }
                        Some(EngineCommand::Teardown) => self.engine.teardown(),
                        Some(EngineCommand::Shutdown) | None => {
                            self.engine.teardown();
                            break;
                        }
                    }
                }

                () = wake => {
                    self.engine.advance_to(started.elapsed());
                }
            }

            self.publish_phase();
        }

        self.publish_phase();
        tracing::info!(phase = ?self.engine.phase(), "Typewriter task stopped");
        self.engine.frame()
    }

    fn publish_phase(&self) {
        let phase = self.engine.phase();
        self.phase.send_if_modified(|current| {
            if *current == phase {
                false
            } else {
                *current = phase;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Delay, Speed};
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::time::sleep;

    fn fast(delay: u32, looping: bool) -> EngineConfig {
        EngineConfig::new()
            .with_speed(Speed::MAX)
            .with_delay(Delay::new(delay).unwrap())
            .with_loop(looping)
    }

    fn drain(frames: &mut mpsc::UnboundedReceiver<Frame>) -> Vec<Frame> {
        std::iter::from_fn(|| frames.try_recv().ok()).collect()
    }

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| (*t).to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_types_in_real_time() {
        let (handle, mut frames, task) = TypeWriterTask::spawn(8);
        handle.configure(terms(&["hi"]), fast(2, false)).await.unwrap();

        sleep(Duration::from_millis(15)).await;
        assert_eq!(
            drain(&mut frames),
            vec![Frame::new("", true), Frame::new("h", true)]
        );

        sleep(Duration::from_millis(10)).await;
        assert_eq!(drain(&mut frames), vec![Frame::new("hi", true)]);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(drain(&mut frames), vec![Frame::new("hi", false)]);

        handle.shutdown().await.unwrap();
        assert_eq!(task.await.unwrap(), Frame::new("hi", false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loops_through_terms() {
        let (handle, mut frames, _task) = TypeWriterTask::spawn(8);
        handle.configure(terms(&["hi", "bye"]), fast(1, true)).await.unwrap();

        sleep(Duration::from_millis(1055)).await;
        let texts: Vec<String> = drain(&mut frames)
            .into_iter()
            .map(|f| f.visible_text)
            .collect();
        assert_eq!(texts, vec!["", "h", "hi", "h", "", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_stops_frames() {
        let (handle, mut frames, task) = TypeWriterTask::spawn(8);
        handle.configure(terms(&["hello"]), fast(1, true)).await.unwrap();

        sleep(Duration::from_millis(25)).await;
        handle.teardown().await.unwrap();
        sleep(Duration::from_secs(5)).await;

        let seen = drain(&mut frames);
        assert_eq!(seen.last(), Some(&Frame::new("he", true)));

        drop(handle);
        assert_eq!(task.await.unwrap(), Frame::new("he", true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_mid_cycle() {
        let (handle, mut frames, _task) = TypeWriterTask::spawn(8);
        handle.configure(terms(&["abcdef"]), fast(1, true)).await.unwrap();
        sleep(Duration::from_millis(35)).await;
        drain(&mut frames);

        handle.configure(terms(&["xy"]), fast(1, true)).await.unwrap();
        sleep(Duration::from_millis(25)).await;

        let texts: Vec<String> = drain(&mut frames)
            .into_iter()
            .map(|f| f.visible_text)
            .collect();
        assert_eq!(texts, vec!["", "x", "xy"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_terms_never_tick() {
        let (handle, mut frames, _task) = TypeWriterTask::spawn(8);
        handle.configure(Vec::new(), fast(1, true)).await.unwrap();

        sleep(Duration::from_secs(60)).await;
        assert_eq!(drain(&mut frames), vec![Frame::new("", true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_done() {
        let (handle, _frames, _task) = TypeWriterTask::spawn(8);
        handle.configure(terms(&["ok"]), fast(1, false)).await.unwrap();

        let start = tokio::time::Instant::now();
        handle.wait_for_phase(Phase::Done).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(1020));
        assert_eq!(handle.phase(), Phase::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_errors_after_shutdown() {
        let (handle, _frames, task) = TypeWriterTask::spawn(8);
        handle.shutdown().await.unwrap();
        task.await.unwrap();

        assert!(handle.is_closed());
        assert_eq!(handle.teardown().await, Err(TaskError::Stopped));
    }
}
