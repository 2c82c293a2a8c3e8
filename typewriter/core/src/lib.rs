//! TypeWriter Core - Headless Text Typing Animation
//!
//! This crate types a list of terms one character at a time, pauses,
//! erases them again and moves on, forever or just once. It knows nothing
//! about terminals, DOM nodes or widgets: a display surface receives
//! `(visible_text, cursor_visible)` on every change and draws it however it
//! likes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Display Surfaces                          │
//! │   terminal (typewriter-cli) · test recorder · any callback   │
//! └───────────────────────────┬──────────────────────────────────┘
//!                             │ on_change(text, cursor) / Frame
//! ┌───────────────────────────┼──────────────────────────────────┐
//! │                    TYPEWRITER CORE                           │
//! │  ┌────────────────────────┴─────────────────────────────┐    │
//! │  │                 TypeWriterEngine                     │    │
//! │  │   state machine · TimerQueue · grapheme-aware text   │    │
//! │  └────────────────────────▲─────────────────────────────┘    │
//! │                           │ advance_to(elapsed)              │
//! │  ┌────────────────────────┴─────────────────────────────┐    │
//! │  │        TypeWriterTask (tokio, real time)             │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use typewriter_core::{EngineConfig, Speed, TypeWriterEngine};
//!
//! let config = EngineConfig::new().with_speed(Speed::MAX).with_loop(false);
//! let mut engine = TypeWriterEngine::with_terms(|_: &str, _: bool| {}, ["hi"], config);
//!
//! engine.advance(Duration::from_millis(20));
//! assert_eq!(engine.visible_text(), "hi");
//! ```
//!
//! # Module Overview
//!
//! - [`engine`]: The typing/erasing state machine
//! - [`timer`]: Virtual-clock timer queue owned by each engine
//! - [`text`]: Grapheme-aware prefixes of a term
//! - [`config`]: Speed/delay validation and TOML configuration
//! - [`messages`]: Frames and lifecycle commands
//! - [`task`]: tokio task driving an engine in real time

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod engine;
pub mod messages;
pub mod task;
pub mod text;
pub mod timer;

// Re-exports for convenience
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, Delay, EngineConfig, Speed, TypeWriterConfigFile, TypeWriterToml,
};
pub use engine::{Phase, TypeWriterDisplay, TypeWriterEngine};
pub use messages::{EngineCommand, Frame};
pub use task::{FrameSink, TaskError, TypeWriterHandle, TypeWriterTask};
pub use text::TermText;
pub use timer::{FiredTimer, TimerId, TimerKind, TimerQueue};
