//! tendril-rs: extend draft assembly contigs using soft-clipped long-read
//! overhangs.
//!
//! Long reads aligned near a contig end often carry soft-clipped tails that
//! reach past it. This crate harvests those overhangs, walks them into a
//! per-base majority-vote consensus that tolerates the indel-heavy error
//! profile of PacBio/ONT reads, and feeds reads the walk could not place
//! back through the aligner against the partially extended contig until no
//! further bases can be called.
//!
//! # Library usage
//!
//! ```no_run
//! use tendril_rs::config::ExtensionConfig;
//! use tendril_rs::fasta::ReadDb;
//! use tendril_rs::scaffold::{ScratchPaths, extend_contig};
//!
//! // let records = sam_input::read_sam(aln_path, false)?.records;
//! // let reads = ReadDb::from_set(FastaSet::load(reads_path)?);
//! // let config = ExtensionConfig::default();
//! //
//! // // Any `aligner::Aligner` works; production uses BwaMem or GraphMap.
//! // let ext = extend_contig("contig_1", &contig_seq, &records, &reads,
//! //                         &config, &aligner, &ScratchPaths::in_dir(dir))?;
//! // let extended = ext.apply(&contig_seq);
//! ```

pub mod aligner;
pub mod cigar;
pub mod cli;
pub mod config;
pub mod consensus;
pub mod errors;
pub mod extension;
pub mod fasta;
pub mod harvest;
pub mod pipeline;
pub mod poa;
pub mod sam_input;
pub mod scaffold;
pub mod types;

// Flat re-exports for the most commonly used types.
pub use config::ExtensionConfig;
pub use errors::ExtendError;
pub use extension::{BaseCounts, Extension};
pub use scaffold::{ContigExtension, ScratchPaths, extend_contig, extend_contig_poa};
