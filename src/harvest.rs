//! Scan alignment records for soft-clipped overhangs past the contig ends.

use crate::cigar::{consumes_read, consumes_reference};
use crate::config::ExtensionConfig;
use crate::errors::{ExtendError, Result};
use crate::extension::Extension;
use crate::sam_input::AlnRecord;
use crate::types::{HashMap, ReadId};
use noodles::sam::alignment::record::cigar::op::Kind;

/// Build the left and right extension pools for one contig.
///
/// A record can contribute to both pools when it is soft-clipped on both
/// ends. Unmapped records are skipped. Reads whose clip sits close to a
/// contig end but not directly on it (between the inner and outer margin)
/// are entered as empty, dropped records so the realignment pass picks them
/// up again later.
pub fn find_extension_candidates(
    records: &[AlnRecord],
    read_name_to_id: &HashMap<String, ReadId>,
    contig_len: usize,
    config: &ExtensionConfig,
) -> Result<(Vec<Extension>, Vec<Extension>)> {
    let mut left: Vec<Extension> = Vec::new();
    let mut right: Vec<Extension> = Vec::new();

    for record in records {
        if record.unmapped {
            continue;
        }
        let read_id = *read_name_to_id.get(&record.name).ok_or_else(|| {
            ExtendError::invalid_alignment(&record.name, "read name missing from read table")
        })?;

        harvest_left(record, read_id, config, &mut left);
        harvest_right(record, read_id, contig_len as i64, config, &mut right);
    }

    Ok((left, right))
}

// A read extends the contig to the left when its alignment starts near the
// contig start and its leading soft clip reaches past position zero:
//
//   contig ->      ------------
//   read   ->  ----------
fn harvest_left(
    record: &AlnRecord,
    read_id: ReadId,
    config: &ExtensionConfig,
    pool: &mut Vec<Extension>,
) {
    let Some(&(count, kind)) = record.cigar.first() else { return };
    if kind != Kind::SoftClip {
        return;
    }
    let clip = count as i64;
    let begin_pos = record.pos;
    if begin_pos >= config.outer_margin || clip <= begin_pos {
        return;
    }

    // Clip bases that stick out past the contig start.
    let overhang = (clip - begin_pos) as usize;

    if begin_pos < config.inner_margin {
        // Keep the overhang bases nearest the boundary, reversed so that the
        // walk proceeds from the contig start outward.
        let take = overhang.min(config.max_ext);
        let mut seq = record.seq[overhang - take..overhang].to_vec();
        seq.reverse();
        pool.push(Extension::new(read_id, seq, false));
    } else {
        pool.push(Extension::new(read_id, Vec::new(), true));
    }
}

// The right-side mirror image:
//
//   contig ->  ------------
//   read   ->          ----------
fn harvest_right(
    record: &AlnRecord,
    read_id: ReadId,
    contig_len: i64,
    config: &ExtensionConfig,
    pool: &mut Vec<Extension>,
) {
    let Some(&(count, kind)) = record.cigar.last() else { return };
    if kind != Kind::SoftClip {
        return;
    }
    let right_clip = count as i64;

    let mut used_read: i64 = 0;
    let mut used_ref: i64 = 0;
    for &(n, k) in &record.cigar {
        if consumes_read(k) {
            used_read += n as i64;
        }
        if consumes_reference(k) {
            used_ref += n as i64;
        }
    }
    used_read -= right_clip;

    // Distance between where the alignment ends and where the contig ends.
    // Negative means the record was aligned against a different (longer)
    // sequence than the contig at hand; nothing useful can be cut from it.
    let margin = contig_len - (record.pos + used_ref);
    if margin < 0 || margin > config.outer_margin {
        return;
    }

    // Clip bases that actually stick out past the contig end.
    let overhang = right_clip - margin;
    if overhang <= 0 {
        return;
    }

    if margin > config.inner_margin {
        pool.push(Extension::new(read_id, Vec::new(), true));
        return;
    }

    let start = (used_read + (right_clip - overhang)) as usize;
    let take = (overhang as usize).min(config.max_ext);
    let seq = record.seq[start..start + take].to_vec();
    pool.push(Extension::new(read_id, seq, false));
}
