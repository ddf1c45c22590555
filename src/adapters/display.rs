//! Front-panel display adapter.
//!
//! The domain pushes a [`DisplayFrame`] at the refresh rate; this adapter
//! owns the view state — most recently the scroll-plot ring buffer, whose
//! capacity equals the plot's pixel width so one sample maps to one column.
//! When the buffer is full the oldest column falls off and the plot scrolls.
//!
//! The rendering itself (SSD1306 framebuffer, fonts, axis ticks) lives on
//! the device side and has no control responsibility; this module keeps the
//! view model and a console renderer used on the host.

use heapless::HistoryBuffer;
use log::debug;

use crate::app::events::{DisplayFrame, PLOT_WIDTH};
use crate::app::ports::DisplayPort;

/// Fixed-capacity scroll-plot buffer: one quantized pixel row per column.
#[derive(Default)]
pub struct PlotBuffer {
    samples: HistoryBuffer<u8, PLOT_WIDTH>,
}

impl PlotBuffer {
    pub fn new() -> Self {
        Self {
            samples: HistoryBuffer::new(),
        }
    }

    /// Append a sample, evicting the oldest column when full.
    pub fn push(&mut self, row: u8) {
        self.samples.write(row);
    }

    /// Drop all samples (new run).
    pub fn clear(&mut self) {
        self.samples = HistoryBuffer::new();
    }

    /// Number of plotted columns.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    /// Columns in time order, oldest first.
    pub fn columns(&self) -> impl Iterator<Item = u8> + '_ {
        self.samples.oldest_ordered().copied()
    }
}

/// Console display adapter: logs each frame and maintains the plot buffer.
///
/// Stands in for the OLED panel on host builds; the view model it keeps is
/// exactly what a framebuffer renderer consumes.
#[derive(Default)]
pub struct ConsoleDisplay {
    last_frame: Option<DisplayFrame>,
    plot: PlotBuffer,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered frame.
    pub fn last_frame(&self) -> Option<&DisplayFrame> {
        self.last_frame.as_ref()
    }

    /// The scroll-plot view model.
    pub fn plot(&self) -> &PlotBuffer {
        &self.plot
    }
}

impl DisplayPort for ConsoleDisplay {
    fn update(&mut self, frame: &DisplayFrame) {
        if let Some(row) = frame.plot_sample {
            self.plot.push(row);
        }
        match frame.reading_c {
            Some(c) => debug!(
                "display: {} [{}] {:.1}C",
                frame.state.label(),
                frame.profile.abbrev(),
                c
            ),
            None => debug!(
                "display: {} [{}] TC Error",
                frame.state.label(),
                frame.profile.abbrev()
            ),
        }
        self.last_frame = Some(*frame);
    }
}
