//! Contig extension: the drop-and-realign loop and the POA alternative.

use crate::aligner::Aligner;
use crate::config::ExtensionConfig;
use crate::consensus::consensus_mv_realign;
use crate::extension::Extension;
use crate::fasta::{self, ReadDb};
use crate::harvest::find_extension_candidates;
use crate::poa::PoaConsensus;
use crate::sam_input::{self, AlnRecord};
use crate::types::{HashMap, ReadId};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Scratch file locations for one extension run.
///
/// Callers hand each worker its own directory, so contig-level parallelism
/// never shares paths with another extension in flight.
#[derive(Debug, Clone)]
pub struct ScratchPaths {
    pub contig_fasta: PathBuf,
    pub reads_fasta: PathBuf,
    pub sam: PathBuf,
}

impl ScratchPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            contig_fasta: dir.join("extend_contig.fasta"),
            reads_fasta: dir.join("realign_reads.fasta"),
            sam: dir.join("realign.sam"),
        }
    }
}

/// Extension strings produced for one contig, in the contig's own 5'→3'
/// orientation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContigExtension {
    pub left: Vec<u8>,
    pub right: Vec<u8>,
}

impl ContigExtension {
    /// Extended sequence: left extension, original contig, right extension.
    pub fn apply(&self, contig: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.left.len() + contig.len() + self.right.len());
        out.extend_from_slice(&self.left);
        out.extend_from_slice(contig);
        out.extend_from_slice(&self.right);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Extend one contig on both sides with the majority-vote walk, feeding
/// reads the walk dropped back through the aligner against the partially
/// extended contig until nothing more can be gained.
///
/// Each round walks both pools, grows the contig, and collects every read
/// that is marked dropped in either pool. Those reads are realigned against
/// the grown contig and re-harvested; records that stayed live carry their
/// cursors over, so their walk resumes exactly where it stopped. The loop
/// ends when both sides stop producing bases (or hit the per-side cap), when
/// no read needs realignment, or when realignment brings back too few
/// records to ever reach the coverage floor.
pub fn extend_contig(
    contig_id: &str,
    contig: &[u8],
    records: &[AlnRecord],
    reads: &ReadDb,
    config: &ExtensionConfig,
    aligner: &dyn Aligner,
    scratch: &ScratchPaths,
) -> Result<ContigExtension> {
    let mut contig_seq = contig.to_vec();
    let (mut left_pool, mut right_pool) =
        find_extension_candidates(records, &reads.name_to_id, contig_seq.len(), config)?;

    let mut result = ContigExtension::default();

    loop {
        // Walk both pools. The left walk emits bases outward from the contig
        // start, so its output is reversed before it is prepended. A side
        // that already reached the cap is not walked again.
        let left_walk = walk_side(&mut left_pool, result.left.len(), config);
        let right_walk = walk_side(&mut right_pool, result.right.len(), config);

        let left_closed =
            left_walk.is_empty() || result.left.len() + left_walk.len() >= config.max_ext;
        let right_closed =
            right_walk.is_empty() || result.right.len() + right_walk.len() >= config.max_ext;

        if !left_walk.is_empty() {
            let mut new_left = left_walk;
            new_left.reverse();
            let mut grown = new_left.clone();
            grown.extend_from_slice(&contig_seq);
            contig_seq = grown;
            new_left.extend_from_slice(&result.left);
            result.left = new_left;
        }
        if !right_walk.is_empty() {
            contig_seq.extend_from_slice(&right_walk);
            result.right.extend_from_slice(&right_walk);
        }

        tracing::debug!(
            contig = contig_id,
            left = result.left.len(),
            right = result.right.len(),
            "extension round complete"
        );

        if left_closed && right_closed {
            break;
        }

        // Persist the partially extended contig for the aligner.
        fasta::write_fasta(&scratch.contig_fasta, contig_id, &contig_seq)?;

        // Collect dropped reads, once each, for realignment.
        let mut marked = vec![false; reads.len()];
        let mut realign: Vec<ReadId> = Vec::new();
        for ext in left_pool.iter().chain(right_pool.iter()) {
            if ext.dropped && !marked[ext.read_id as usize] {
                marked[ext.read_id as usize] = true;
                realign.push(ext.read_id);
            }
        }
        if realign.is_empty() {
            break;
        }

        fasta::write_fasta_records(
            &scratch.reads_fasta,
            realign
                .iter()
                .map(|&id| (reads.ids[id as usize].as_str(), reads.seqs[id as usize].as_slice())),
        )?;

        aligner.index(&scratch.contig_fasta)?;
        aligner.align(&scratch.contig_fasta, &scratch.reads_fasta, &scratch.sam, true)?;

        let contents = sam_input::read_sam(&scratch.sam, true)?;
        let (fresh_left, fresh_right) =
            find_extension_candidates(&contents.records, &reads.name_to_id, contig_seq.len(), config)?;

        // Live records carry over with their cursors; dropped ones are
        // replaced by whatever their fresh alignments harvested.
        left_pool.retain(|ext| !ext.dropped);
        right_pool.retain(|ext| !ext.dropped);
        tracing::debug!(
            contig = contig_id,
            realigned = realign.len(),
            fresh_left = fresh_left.len(),
            fresh_right = fresh_right.len(),
            "realigned dropped reads"
        );
        left_pool.extend(fresh_left);
        right_pool.extend(fresh_right);

        if left_pool.len() < config.min_coverage && right_pool.len() < config.min_coverage {
            break;
        }
    }

    Ok(result)
}

fn walk_side(pool: &mut [Extension], emitted: usize, config: &ExtensionConfig) -> Vec<u8> {
    if emitted >= config.max_ext {
        return Vec::new();
    }
    let mut walk = consensus_mv_realign(pool, config.min_coverage);
    walk.truncate(config.max_ext - emitted);
    walk
}

/// Single-shot alternative to the drop-and-realign loop: hand every
/// non-empty candidate of a side to a partial-order-alignment consensus.
///
/// Left candidates are stored reversed, so the POA result for that side is
/// reversed back into the contig's orientation. The input contig is not
/// touched and no realignment happens; what the first harvest finds is all
/// the POA gets.
pub fn extend_contig_poa(
    contig: &[u8],
    records: &[AlnRecord],
    read_name_to_id: &HashMap<String, ReadId>,
    config: &ExtensionConfig,
    poa: &dyn PoaConsensus,
) -> Result<ContigExtension> {
    let (left_pool, right_pool) =
        find_extension_candidates(records, read_name_to_id, contig.len(), config)?;

    let left_candidates = poa_candidates(&left_pool, config.max_ext);
    tracing::debug!(candidates = left_candidates.len(), "running left extension consensus");
    let mut left = poa.consensus(&left_candidates)?;
    left.reverse();

    let right_candidates = poa_candidates(&right_pool, config.max_ext);
    tracing::debug!(candidates = right_candidates.len(), "running right extension consensus");
    let right = poa.consensus(&right_candidates)?;

    Ok(ContigExtension { left, right })
}

fn poa_candidates(pool: &[Extension], max_ext: usize) -> Vec<Vec<u8>> {
    pool.iter()
        .filter(|ext| !ext.seq.is_empty())
        .map(|ext| ext.seq[..ext.seq.len().min(max_ext)].to_vec())
        .collect()
}
