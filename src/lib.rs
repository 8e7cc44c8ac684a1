//! Virtual Gamepad Bitmap Printer
//!
//! This crate drives the Switch post editor through an emulated HORI Pokken
//! gamepad and redraws a 1-bit bitmap on it, one cell at a time.
//!
//! # Example
//!
//! ```rust,no_run
//! use padprint::{bitmap, Config, HidGadget, InputReport, Planner, Transport};
//!
//! let canvas = bitmap::decode(&std::fs::read("post.bmp").unwrap()).unwrap();
//! let config = Config::from_env();
//! let mut gadget = HidGadget::open(config.device()).unwrap();
//! let mut planner = Planner::new();
//! while let Some(intent) = planner.tick(&canvas) {
//!     let report = InputReport::from_intent(&intent);
//!     gadget.write_report(&report.to_bytes(), config.timeout());
//! }
//! ```

pub mod bitmap;
mod canvas;
mod error;
pub mod gadget;
mod planner;
mod report;

pub use crate::{
    canvas::Canvas,
    error::{Error, FormatError},
    gadget::{Config, HidGadget, Transport, WriteStatus},
    planner::{Intent, Phase, Planner},
    report::{Buttons, Hat, InputReport, REPORT_SIZE, STICK_CENTER, STICK_MAX, STICK_MIN},
};

/// Width in pixels of the post editor drawing surface.
///
/// The remote canvas is fixed; bitmaps of any other width are rejected by
/// the decoder rather than scaled.
pub const CANVAS_WIDTH: usize = 320;

/// Height in pixels of the post editor drawing surface.
pub const CANVAS_HEIGHT: usize = 120;
