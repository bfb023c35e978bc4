use crate::errors::{ExtendError, Result};

/// Tuning knobs for the extension engine.
///
/// The defaults match the values the engine was calibrated with on PacBio
/// data; all of them are exposed on the command line.
#[derive(Debug, Clone)]
pub struct ExtensionConfig {
    /// Per-side cap on harvested candidate length and on the total number of
    /// consensus bases appended to a contig side.
    pub max_ext: usize,
    /// A soft clip counts as sitting directly on the contig end when the
    /// alignment starts (ends) within this many bases of it.
    pub inner_margin: i64,
    /// A soft clip within this many bases of the contig end is still tracked,
    /// but only as a realignment marker.
    pub outer_margin: i64,
    /// Minimum number of live reads tallying a column for the consensus walk
    /// to keep going.
    pub min_coverage: usize,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self { max_ext: 1000, inner_margin: 5, outer_margin: 15, min_coverage: 5 }
    }
}

impl ExtensionConfig {
    /// Reject impossible parameter combinations before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.max_ext == 0 {
            return Err(ExtendError::invalid_config("max-ext must be positive"));
        }
        if self.min_coverage == 0 {
            return Err(ExtendError::invalid_config("min-coverage must be positive"));
        }
        if self.inner_margin < 0 {
            return Err(ExtendError::invalid_config("inner-margin must not be negative"));
        }
        if self.outer_margin < self.inner_margin {
            return Err(ExtendError::invalid_config(format!(
                "outer-margin ({}) must be at least inner-margin ({})",
                self.outer_margin, self.inner_margin
            )));
        }
        Ok(())
    }
}
