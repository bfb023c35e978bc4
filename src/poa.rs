//! Partial-order-alignment consensus primitive.
//!
//! The POA extension path collapses all candidate overhangs of a contig side
//! into one consensus string in a single call, instead of walking them base
//! by base. The heavy lifting happens in the abPOA library, reached through
//! its native bindings; the trait keeps the engine testable with an
//! in-process double.

use crate::errors::{ExtendError, Result};
use abpoa::{Aligner, OutputMode, Parameters, SequenceBatch};

pub trait PoaConsensus: Sync {
    /// Collapse candidate sequences into a single consensus sequence.
    /// An empty input yields an empty consensus.
    fn consensus(&self, sequences: &[Vec<u8>]) -> Result<Vec<u8>>;
}

/// Consensus through the abPOA partial-order aligner bindings.
///
/// The abPOA handle is not thread-safe, so each call builds its own aligner;
/// the type itself stays stateless and `Sync`, letting every worker reuse
/// one instance across contigs.
#[derive(Debug, Default)]
pub struct AbpoaConsensus;

impl AbpoaConsensus {
    pub fn new() -> Self {
        Self
    }
}

impl PoaConsensus for AbpoaConsensus {
    fn consensus(&self, sequences: &[Vec<u8>]) -> Result<Vec<u8>> {
        if sequences.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = Parameters::configure().map_err(poa_error)?;
        // Only the single best consensus is wanted; skip the MSA rows.
        params.set_outputs(OutputMode::CONSENSUS);
        params.set_max_consensus(1).map_err(poa_error)?;

        let mut aligner = Aligner::with_params(params).map_err(poa_error)?;
        let refs: Vec<&[u8]> = sequences.iter().map(Vec::as_slice).collect();
        let batch = SequenceBatch::from_sequences(&refs).map_err(poa_error)?;
        let result = aligner.msa(batch).map_err(poa_error)?;

        let mut consensus = result
            .clusters
            .into_iter()
            .next()
            .map(|cluster| cluster.consensus.into_bytes())
            .unwrap_or_default();
        consensus.make_ascii_uppercase();
        Ok(consensus)
    }
}

fn poa_error(e: abpoa::Error) -> ExtendError {
    ExtendError::AlignerFailed { command: "abpoa".to_string(), reason: e.to_string() }
}
