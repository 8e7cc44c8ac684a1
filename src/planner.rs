//! The drawing planner.
//!
//! A state machine that walks the canvas and decides, tick by tick, what
//! the virtual controller should report. Calibration brings the post
//! editor into a known state with the cursor at the origin, Drawing runs a
//! serpentine raster scan over the canvas, Complete is terminal until an
//! explicit [`Planner::reset`].

use log::{debug, info};

use crate::{
    report::{Buttons, Hat},
    Canvas, CANVAS_HEIGHT, CANVAS_WIDTH,
};

// Calibration schedule, in ticks. A presses dismiss the controller
// connection prompt, L presses walk the brush size down to the smallest,
// the stick click wipes the page. The total leaves room for the cursor to
// glide from the far corner back to the origin in the worst case.
const CONNECT_WINDOW: u32 = 30;
const BRUSH_WINDOW: u32 = 50;
const CLEAR_TICK: u32 = 50;
const CALIBRATION_TICKS: u32 = 450;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Calibration,
    Drawing,
    Complete,
}

/// What the controller should report for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intent {
    pub buttons: Buttons,
    pub hat: Hat,
    /// Pin the left stick to minimum on both axes (calibration cursor
    /// reset). Outside calibration the sticks stay centered.
    pub hold_origin: bool,
}

impl Intent {
    fn idle() -> Self {
        Intent {
            buttons: Buttons::empty(),
            hat: Hat::Center,
            hold_origin: false,
        }
    }
}

pub struct Planner {
    phase: Phase,
    tick: u32,
    row: usize,
    col: i32,
    last_row: usize,
    last_col: i32,
    reversing: bool,
}

impl Planner {
    pub fn new() -> Self {
        Planner {
            phase: Phase::Calibration,
            tick: 0,
            row: 0,
            col: 0,
            last_row: 0,
            last_col: 0,
            reversing: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drop all progress and start over from calibration tick 0.
    ///
    /// Called when the transport reports the console is not listening; a
    /// resumed draw restarts the full raster scan from the origin.
    pub fn reset(&mut self) {
        *self = Planner::new();
    }

    /// Produce the intent for the next tick, or `None` once the picture
    /// is complete.
    pub fn tick(&mut self, canvas: &Canvas) -> Option<Intent> {
        let t = self.tick;
        self.tick = self.tick + 1;
        match self.phase {
            Phase::Calibration => Some(self.calibrate(t)),
            // inputs are only recognized reliably every other report
            Phase::Drawing => {
                if t & 1 == 1 {
                    self.step(canvas)
                } else {
                    Some(Intent::idle())
                }
            }
            Phase::Complete => None,
        }
    }

    fn calibrate(&mut self, t: u32) -> Intent {
        if t == 1 {
            info!("cleaning drawing state");
        }
        let mut buttons = Buttons::empty();
        // spam A presses to get past the controller connection screen
        if t < CONNECT_WINDOW && t & 1 == 1 {
            buttons |= Buttons::A;
        // press the left stick to clear the page
        } else if t == CLEAR_TICK {
            buttons |= Buttons::LCLICK;
        // press L a few times (alternating) to get to the smallest brush
        } else if t & 1 == 1 && t < BRUSH_WINDOW {
            buttons |= Buttons::L;
        }
        if t >= CALIBRATION_TICKS {
            self.phase = Phase::Drawing;
            self.row = 0;
            self.col = 0;
            self.last_row = 0;
            self.last_col = 0;
            self.reversing = false;
            debug!("calibration finished, cursor at origin");
        }
        Intent {
            buttons,
            hat: Hat::Center,
            hold_origin: true,
        }
    }

    /// One active drawing step.
    fn step(&mut self, canvas: &Canvas) -> Option<Intent> {
        // if we're at the end of a line, move onto the next one
        if self.col >= CANVAS_WIDTH as i32 {
            self.col = CANVAS_WIDTH as i32 - 1;
            self.row += 1;
            self.reversing = true;
        } else if self.col < 0 {
            self.col = 0;
            self.row += 1;
            self.reversing = false;
        }

        // Early end of line: nothing left to draw ahead of the cursor in
        // this row or the next. The two-row window is a heuristic — an
        // isolated cell more than two rows down, reached only after the
        // sweep turns, could be passed near the turn — but the device
        // timing was tuned with it, so it stays.
        if !self.window_has_ink(canvas) {
            self.row += 1;
            self.reversing = !self.reversing;
        }

        // past the bottom edge the picture is done
        if self.row >= CANVAS_HEIGHT {
            self.phase = Phase::Complete;
            return None;
        }

        let hat = Hat::from_delta(
            self.col - self.last_col,
            self.row as i32 - self.last_row as i32,
        );
        let mut buttons = Buttons::empty();
        if canvas.ink(self.row, self.col as usize) {
            buttons |= Buttons::A;
        }
        debug!("x: {}, y: {}", self.col, self.row);

        self.last_row = self.row;
        self.last_col = self.col;
        if self.reversing {
            self.col -= 1;
        } else {
            self.col += 1;
        }

        Some(Intent {
            buttons,
            hat,
            hold_origin: false,
        })
    }

    /// Scan the rest of the current row and the whole of the next one, in
    /// the sweep direction, for any remaining ink.
    fn window_has_ink(&self, canvas: &Canvas) -> bool {
        let start = self.col as usize;
        for row in self.row..self.row + 2 {
            if self.reversing {
                for col in 0..=start {
                    if canvas.ink(row, col) {
                        return true;
                    }
                }
            } else {
                for col in start..CANVAS_WIDTH {
                    if canvas.ink(row, col) {
                        return true;
                    }
                }
            }
        }
        false
    }

    #[cfg(test)]
    fn position(&self) -> (usize, i32) {
        (self.row, self.col)
    }
}
