//! Error types for specchart-core.

use thiserror::Error;

/// Result type alias for specchart data-model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation errors raised at the data boundary.
///
/// The chart never surfaces these to its host; setters log them and fall
/// back to an empty or default state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Spectrum has no channels.
    #[error("spectrum has no channels")]
    EmptySpectrum,

    /// Counts array is neither the same length as the energies nor one shorter.
    #[error("energy/count length mismatch: {x} energies, {y} counts")]
    LengthMismatch { x: usize, y: usize },

    /// Energies decrease (or are not finite) at the given index.
    #[error("channel energies are not monotonic at index {index}")]
    NonMonotonicEnergies { index: usize },

    /// A count is NaN or infinite.
    #[error("channel {index} has a non-finite count")]
    NonFiniteCounts { index: usize },

    /// Negative or non-finite y scale factor.
    #[error("invalid y scale factor: {0}")]
    InvalidScaleFactor(f64),

    /// ROI bounds are reversed, equal, or not finite.
    #[error("invalid ROI bounds: [{lower}, {upper}]")]
    InvalidRoiBounds { lower: f64, upper: f64 },

    /// Continuum definition is unusable.
    #[error("invalid continuum: {0}")]
    InvalidContinuum(String),

    /// Peak definition is unusable.
    #[error("invalid peak: {0}")]
    InvalidPeak(String),

    /// Reference line set contains non-numeric fields.
    #[error("invalid reference line: {0}")]
    InvalidReferenceLine(String),

    /// Chart option out of range.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}
