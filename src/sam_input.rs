//! SAM input: the semantic subset of alignment records the engine consumes.

use crate::cigar::consumes_read;
use crate::errors::{ExtendError, Result};
use crate::types::{HashMap, HashMapExt};
use noodles::sam;
use noodles::sam::alignment::record::cigar::op::Kind;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One alignment record, reduced to the fields the harvester reads.
#[derive(Debug, Clone)]
pub struct AlnRecord {
    pub name: String,
    pub unmapped: bool,
    /// 0-based reference start.
    pub pos: i64,
    pub cigar: Vec<(u32, Kind)>,
    /// Read bases, uppercased. Hard-clipped records carry the truncated SEQ
    /// exactly as the aligner emitted it.
    pub seq: Vec<u8>,
    /// Index into the SAM header's reference sequence table.
    pub ref_id: Option<usize>,
}

/// A parsed SAM file: reference names from the header plus all usable
/// records.
#[derive(Debug, Default)]
pub struct SamContents {
    pub ref_names: Vec<String>,
    pub records: Vec<AlnRecord>,
}

/// Read a SAM file.
///
/// Secondary records are always skipped (aligners omit SEQ on them);
/// `primary_only` additionally drops supplementary records. Unmapped records
/// are kept as name-only markers. A mapped record with a missing CIGAR, or
/// whose SEQ length disagrees with its CIGAR, is a hard error: the engine's
/// offset arithmetic cannot survive it.
pub fn read_sam(path: &Path, primary_only: bool) -> Result<SamContents> {
    let file = File::open(path)?;
    let mut reader = sam::io::Reader::new(BufReader::new(file));
    let header = reader
        .read_header()
        .map_err(|e| ExtendError::invalid_alignment("<header>", e.to_string()))?;

    let ref_names = header
        .reference_sequences()
        .keys()
        .map(|name| String::from_utf8_lossy(name.as_ref()).into_owned())
        .collect();

    let mut records = Vec::new();
    for result in reader.record_bufs(&header) {
        let record =
            result.map_err(|e| ExtendError::invalid_alignment("<record>", e.to_string()))?;
        let flags = record.flags();
        if flags.is_secondary() || (primary_only && flags.is_supplementary()) {
            continue;
        }
        let name = record
            .name()
            .map(|n| String::from_utf8_lossy(n.as_ref()).into_owned())
            .unwrap_or_default();

        if flags.is_unmapped() {
            records.push(AlnRecord {
                name,
                unmapped: true,
                pos: 0,
                cigar: Vec::new(),
                seq: Vec::new(),
                ref_id: None,
            });
            continue;
        }

        let pos = record
            .alignment_start()
            .map(|p| usize::from(p) as i64 - 1)
            .ok_or_else(|| ExtendError::invalid_alignment(&name, "mapped record has no position"))?;

        let cigar: Vec<(u32, Kind)> = record
            .cigar()
            .as_ref()
            .iter()
            .map(|op| (op.len() as u32, op.kind()))
            .collect();
        if cigar.is_empty() {
            return Err(ExtendError::invalid_alignment(&name, "mapped record has an empty CIGAR"));
        }

        let mut seq = record.sequence().as_ref().to_vec();
        seq.make_ascii_uppercase();
        let read_len: usize = cigar
            .iter()
            .filter(|&&(_, kind)| consumes_read(kind))
            .map(|&(count, _)| count as usize)
            .sum();
        if seq.len() != read_len {
            return Err(ExtendError::invalid_alignment(
                &name,
                format!("SEQ length {} does not match the {} read bases in the CIGAR", seq.len(), read_len),
            ));
        }

        records.push(AlnRecord {
            name,
            unmapped: false,
            pos,
            cigar,
            seq,
            ref_id: record.reference_sequence_id(),
        });
    }

    Ok(SamContents { ref_names, records })
}

/// Group mapped records by the contig they align to, using `contig_name_to_id`
/// to translate reference names into contig indices.
///
/// Records aligned to references absent from the contig table are dropped
/// with a warning; unmapped records are dropped silently (the harvester
/// would skip them anyway).
pub fn cluster_by_contig(
    contents: SamContents,
    contig_name_to_id: &HashMap<String, usize>,
) -> HashMap<usize, Vec<AlnRecord>> {
    let mut clusters: HashMap<usize, Vec<AlnRecord>> = HashMap::new();

    for record in contents.records {
        let Some(ref_id) = record.ref_id else { continue };
        let Some(ref_name) = contents.ref_names.get(ref_id) else { continue };
        match contig_name_to_id.get(ref_name) {
            Some(&contig_idx) => clusters.entry(contig_idx).or_default().push(record),
            None => {
                tracing::warn!(reference = %ref_name, "alignment references an unknown contig; skipped");
            }
        }
    }

    clusters
}
