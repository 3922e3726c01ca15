//! Error types returned by the encoder.

/// Result type for qrpath operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a QR Code symbol.
///
/// Every variant is a validation failure detected synchronously at the call site; none of them
/// are transient. Internal invariant violations are not represented here, they panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("version {0} out of range (must be 1..=40)")]
    VersionOutOfRange(i32),

    #[error("invalid version range: min {min} > max {max}")]
    InvalidVersionRange { min: u8, max: u8 },

    #[error("mask {0} out of range (must be 0..=7, or -1 for automatic)")]
    MaskOutOfRange(i32),

    #[error("Reed-Solomon degree {0} out of range (must be 1..=255)")]
    DegreeOutOfRange(usize),

    #[error("bit length {bitlength} does not fit a {buffer_len}-byte buffer")]
    InvalidBitLength { bitlength: usize, buffer_len: usize },

    #[error("expected {expected} data codewords, got {actual}")]
    InvalidCodewordCount { expected: usize, actual: usize },

    #[error("value {value:#x} does not fit in {len} bits")]
    InvalidAppend { value: u32, len: u8 },

    #[error(transparent)]
    DataTooLong(#[from] DataTooLong),
}

/// Error type for when data exceeds QR code capacity.
///
/// Ways to handle this exception include:
///
/// - Decrease the error correction level if it was greater than `QrCodeEcc::Low`.
/// - Increase the `max_version` option if it was less than `Version::MAX`.
/// - Change the text or binary data to be shorter.
/// - Propagate the error upward to the caller/user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataTooLong {
    /// A segment's character count does not fit its count field at any version tried.
    #[error("Segment too long")]
    SegmentTooLong,
    /// Data length exceeds capacity.
    #[error("Data length = {0} bits, Max capacity = {1} bits")]
    DataOverCapacity(usize, usize),
}
