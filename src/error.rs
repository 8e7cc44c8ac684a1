//! Error types for the gadget printer.
//!
//! This module defines all possible errors that can occur while decoding
//! the input bitmap and while setting up the USB gadget.

use thiserror::Error;

/// Main error type for gadget printer operations.
///
/// This enum encompasses everything that can go wrong before the drawing
/// loop starts, from bitmap decoding to configfs setup. Transport
/// conditions inside the loop are not errors — see
/// [`WriteStatus`](crate::WriteStatus).
#[derive(Error, Debug)]
pub enum Error {
    /// The input bitmap was rejected by the decoder.
    ///
    /// Decoding happens once at startup; a rejected bitmap means the
    /// drawing loop is never entered.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Filesystem or device I/O failure.
    ///
    /// Raised while reading the bitmap file, writing the configfs gadget
    /// tree, or opening the HID gadget device.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("no UDC found under /sys/class/udc, is this a gadget-capable board ?")]
    NoUdc,
}

/// Structural problems in the input bitmap.
///
/// Each variant corresponds to one validation step; the decoder stops at
/// the first violation and never reads pixel data past a bad header.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid bitmap format (header size: {0}, expected 40)")]
    BadHeaderSize(u32),

    /// Resolution must match the remote drawing surface exactly.
    ///
    /// The post editor canvas is 320x120; nothing is scaled or cropped.
    #[error("invalid bitmap resolution ({width}x{height}, expected 320x120)")]
    BadResolution { width: i32, height: i32 },

    #[error("compressed bitmap files are not supported")]
    UnsupportedCompression(u32),

    #[error("invalid bitmap color depth ({0}, expected 1)")]
    BadBitDepth(u16),

    #[error("invalid bitmap color count ({0}, expected 2)")]
    BadColorCount(u32),

    /// The file ends before the declared headers, palette or pixel rows.
    #[error("bitmap file is truncated")]
    Truncated,
}
