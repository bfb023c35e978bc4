use crate::aligner::{AlignerBackend, ReadType};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tendril-rs",
    about = "Extend draft assembly contigs using soft-clipped long-read overhangs",
    version
)]
pub struct Args {
    /// Draft assembly contigs (FASTA)
    pub contigs: PathBuf,

    /// Long reads to extend with (FASTA)
    pub reads: PathBuf,

    /// Output FASTA with extended contigs
    #[arg(short = 'o', long = "out", value_name = "FASTA")]
    pub out: PathBuf,

    /// Reuse an existing SAM of the reads aligned to the contigs instead of
    /// running the initial alignment
    #[arg(long, value_name = "SAM")]
    pub alignment: Option<PathBuf>,

    /// Aligner backend for the initial and realignment passes
    #[arg(long, value_enum, default_value_t = AlignerBackend::Bwa)]
    pub aligner: AlignerBackend,

    /// Sequencing technology of the reads
    #[arg(long, value_enum, default_value_t = ReadType::PacBio)]
    pub read_type: ReadType,

    /// Use the partial-order-alignment consensus instead of the
    /// majority-vote walk (no realignment rounds)
    #[arg(long)]
    pub poa: bool,

    /// Maximum bases appended to each contig side
    #[arg(long, default_value_t = 1000)]
    pub max_ext: usize,

    /// Clips aligned within this distance of a contig end are used directly
    #[arg(long, default_value_t = 5)]
    pub inner_margin: i64,

    /// Clips aligned within this distance of a contig end are kept for
    /// realignment
    #[arg(long, default_value_t = 15)]
    pub outer_margin: i64,

    /// Minimum read support for each consensus base
    #[arg(long, default_value_t = 5)]
    pub min_coverage: usize,

    /// Pass contigs shorter than this through unextended (0 disables)
    #[arg(long, default_value_t = 0)]
    pub min_contig_len: usize,

    /// Number of worker threads (contigs are extended in parallel)
    #[arg(short = 'p', long = "threads", default_value_t = 1)]
    pub threads: usize,

    /// Scratch directory for temporary FASTA/SAM files
    #[arg(long, default_value = "tmp")]
    pub scratch: PathBuf,

    /// Suppress the progress bar and set the logging level to WARN
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
