//! Frame rendering for the terminal
//!
//! Every frame replaces the current line. In JSON mode each frame is written
//! as one line of JSON instead, for piping into other tools.

use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};

use typewriter_core::Frame;

/// Glyph drawn after the text while the cursor is visible
pub const CURSOR_GLYPH: char = '▌';

/// How frames are written
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Redraw a single terminal line
    Line,
    /// One JSON object per frame
    Json,
}

/// Text of a frame as it appears on the terminal line
pub fn line_for(frame: &Frame) -> String {
    let mut line = frame.visible_text.clone();
    if frame.cursor_visible {
        line.push(CURSOR_GLYPH);
    }
    line
}

/// Writes frames to an output stream
pub struct Renderer<W: Write> {
    out: W,
    mode: OutputMode,
    drawn: usize,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self {
            out,
            mode,
            drawn: 0,
        }
    }

    /// Number of frames written so far
    pub fn drawn(&self) -> usize {
        self.drawn
    }

    pub fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        match self.mode {
            OutputMode::Line => {
                queue!(
                    self.out,
                    MoveToColumn(0),
                    Clear(ClearType::CurrentLine),
                    Print(line_for(frame))
                )?;
            }
            OutputMode::Json => {
                serde_json::to_writer(&mut self.out, frame)?;
                writeln!(self.out)?;
            }
        }
        self.drawn += 1;
        self.out.flush()
    }

    /// Leave the terminal on a fresh line
    pub fn finish(&mut self) -> io::Result<()> {
        if self.mode == OutputMode::Line && self.drawn > 0 {
            execute!(self.out, Print("\n"))?;
        }
        self.out.flush()
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}
