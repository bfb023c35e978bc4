//! Majority-vote consensus walks over extension pools.

use crate::extension::{Extension, WalkOp, count_bases, count_bases_filtered, idx_to_base};

/// Fraction of the coverage floor the lookahead tally must reach for the
/// walk to continue past the base it just emitted.
const LOOKAHEAD_FACTOR: f64 = 0.6;

/// Emit one consensus base per iteration, locally realigning every live read
/// against the emitted base and a one-base lookahead.
///
/// The walk stops when fewer than `min_coverage` reads tally the current
/// column, or when the reads that agreed on the emitted base no longer reach
/// 60% of `min_coverage` one base ahead. Reads whose bases can no longer be
/// reconciled with the consensus are marked dropped and left for the
/// realignment pass; everything else keeps its cursor, so the walk can resume
/// where it stopped once fresh reads join the pool.
pub fn consensus_mv_realign(extensions: &mut [Extension], min_coverage: usize) -> Vec<u8> {
    let mut consensus = Vec::new();

    loop {
        let bases = count_bases(extensions, 0);
        if (bases.coverage as usize) < min_coverage {
            tracing::trace!(
                coverage = bases.coverage,
                emitted = consensus.len(),
                "consensus walk stopped: coverage below floor"
            );
            break;
        }

        let output_base = idx_to_base(bases.max_idx);
        consensus.push(output_base);
        tracing::trace!(
            column = consensus.len() - 1,
            base = %(output_base as char),
            a = bases.counts[0],
            t = bases.counts[1],
            g = bases.counts[2],
            c = bases.counts[3],
            "consensus column"
        );

        // Majority vote one base ahead, restricted to reads that agree on the
        // base just emitted.
        let next_bases = count_bases_filtered(extensions, 1, |b| b == output_base);
        if (next_bases.coverage as f64) < LOOKAHEAD_FACTOR * min_coverage as f64 {
            tracing::trace!(
                coverage = next_bases.coverage,
                emitted = consensus.len(),
                "consensus walk stopped: lookahead coverage below floor"
            );
            break;
        }
        let next_mv = idx_to_base(next_bases.max_idx);

        for ext in extensions.iter_mut() {
            if ext.dropped {
                continue;
            }
            // Classification needs the current base and the one after it.
            if ext.cursor + 1 >= ext.seq.len() {
                ext.dropped = true;
                continue;
            }
            let current = ext.seq[ext.cursor];
            let next = ext.seq[ext.cursor + 1];

            if current == output_base {
                ext.advance(WalkOp::Match);
            } else if current == next_mv {
                ext.advance(WalkOp::Deletion);
            } else if next == next_mv {
                ext.advance(WalkOp::Mismatch);
            } else if next == output_base {
                ext.advance(WalkOp::Insertion);
            } else {
                ext.dropped = true;
            }
        }
    }

    consensus
}

/// Baseline walk without lookahead or local realignment: emit the plain
/// majority base and step every live read forward one position.
///
/// Kept for comparison runs; the production path is
/// [`consensus_mv_realign`].
pub fn consensus_mv_simple(extensions: &mut [Extension], min_coverage: usize) -> Vec<u8> {
    let mut consensus = Vec::new();

    loop {
        let bases = count_bases(extensions, 0);
        if (bases.coverage as usize) < min_coverage {
            break;
        }
        consensus.push(idx_to_base(bases.max_idx));

        for ext in extensions.iter_mut() {
            if !ext.dropped && ext.cursor < ext.seq.len() {
                ext.cursor += 1;
            }
        }
    }

    consensus
}
