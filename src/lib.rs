//! # qrpath
//!
//! A Rust library for encoding text into QR Code symbols and rendering them as compact SVG paths.
//!
//! `qrpath` builds symbols that follow the QR Code Model 2 standard (ISO/IEC 18004). It
//! supports versions 1 to 40 and all four error correction levels, computes Reed-Solomon
//! error correction over GF(256), and picks the data mask with the lowest penalty score.
//! The finished module grid can be rendered as an SVG path, a grayscale image, or terminal art.
//!
//! ## Features
//!
//! - Encode UTF-8 text or raw bytes as a byte-mode segment.
//! - Choose the smallest version that fits, then boost the ECC level for free.
//! - Force a specific mask pattern or let the encoder choose one.
//! - Render as SVG path data, full SVG documents, PNG images or ASCII art.
//! - Optional `parallel` feature scores the eight mask candidates on separate threads.
//!
//! ## Example
//!
//! ```rust
//! use qrpath::{encode, helper::to_svg_string, EncodeOptions, QrCodeEcc};
//!
//! let options = EncodeOptions::default().with_ecl(QrCodeEcc::Quartile);
//! let qr = encode("https://example.com", &options).unwrap();
//! assert!(qr.error_correction_level() >= QrCodeEcc::Quartile);
//!
//! let svg = to_svg_string(&qr, 8);
//! assert!(svg.contains("<path"));
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Symbol encoder and module grid builder.
//! - [`segment`]: Data segments and bit packing.
//! - [`reed_solomon`]: GF(256) arithmetic and Reed-Solomon ECC.
//! - [`mask`]: Mask patterns and penalty scoring.
//! - [`tables`]: Versions, ECC levels and capacity tables.
//! - [`helper`]: Utilities for rendering QR codes in various formats.

#![forbid(unsafe_code)]

pub mod error;
pub mod helper;
pub mod mask;
pub mod qrcode;
pub mod reed_solomon;
pub mod segment;
pub mod tables;

pub use error::{DataTooLong, Error, Result};
pub use mask::Mask;
pub use qrcode::{EncodeOptions, QrCode};
pub use segment::{QrSegment, QrSegmentMode};
pub use tables::{QrCodeEcc, Version};

/// Encodes `text` into a QR Code symbol.
///
/// This is shorthand for [`QrCode::encode`].
///
/// # Errors
///
/// Returns [`Error::DataTooLong`] if the text does not fit any version in
/// `options.min_version..=options.max_version`.
pub fn encode(text: &str, options: &EncodeOptions) -> Result<QrCode> {
    QrCode::encode(text, options)
}
