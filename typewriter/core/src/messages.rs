//! Engine Messages
//!
//! Values exchanged between a running typewriter and its host. The engine
//! never renders anything itself; a display surface receives [`Frame`]s and
//! decides how to show the text and the cursor.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// One observable state of the typewriter
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Prefix of the active term that is currently shown
    pub visible_text: String,
    /// Whether the host should draw a cursor after the text
    pub cursor_visible: bool,
}

impl Frame {
    /// Create a frame
    pub fn new(visible_text: impl Into<String>, cursor_visible: bool) -> Self {
        Self {
            visible_text: visible_text.into(),
            cursor_visible,
        }
    }
}

/// Lifecycle commands from the host to a running typewriter task
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EngineCommand {
    /// Restart from the first term with new inputs (mount or input change)
    Configure {
        /// Terms to type, in order
        terms: Vec<String>,
        /// Timing and behaviour
        config: EngineConfig,
    },

    /// Cancel every pending timer and freeze the current frame (unmount)
    Teardown,

    /// Tear down and stop the task
    Shutdown,
}
