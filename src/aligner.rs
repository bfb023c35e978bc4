//! External aligner wrappers.
//!
//! The extension loop needs to index a growing contig and align dropped
//! reads back against it. Both operations shell out to a long-read aligner;
//! the `Aligner` trait keeps the engine independent of which one, and lets
//! tests substitute a scripted double.

use crate::errors::{ExtendError, Result};
use clap::ValueEnum;
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

/// Sequencing technology of the input reads; selects the aligner preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReadType {
    #[value(name = "pacbio")]
    PacBio,
    #[value(name = "ont")]
    Ont,
}

/// Which external aligner to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlignerBackend {
    Bwa,
    Graphmap,
}

pub trait Aligner: Sync {
    /// Build the on-disk index for a FASTA reference.
    fn index(&self, reference: &Path) -> Result<()>;

    /// Align `reads` against an indexed `reference`, writing SAM to
    /// `sam_out`. With `primary_only`, supplementary and secondary records
    /// are suppressed as far as the backend allows.
    fn align(&self, reference: &Path, reads: &Path, sam_out: &Path, primary_only: bool)
    -> Result<()>;

    /// Name of the external binary, for availability checks and messages.
    fn name(&self) -> &str;
}

pub fn create_aligner(
    backend: AlignerBackend,
    read_type: ReadType,
    threads: usize,
) -> Box<dyn Aligner> {
    match backend {
        AlignerBackend::Bwa => Box::new(BwaMem { read_type, threads }),
        AlignerBackend::Graphmap => Box::new(GraphMap { threads }),
    }
}

/// True when `command` can be spawned at all.
pub fn is_command_available(command: &str) -> bool {
    match Command::new(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => true,
        Err(e) => e.kind() != std::io::ErrorKind::NotFound,
    }
}

fn run_command(name: &str, mut command: Command) -> Result<()> {
    tracing::debug!(command = ?command, "running external command");
    let output = command.output().map_err(|e| ExtendError::AlignerFailed {
        command: name.to_string(),
        reason: format!("failed to spawn: {e}"),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostic = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("no diagnostic output")
            .to_string();
        return Err(ExtendError::AlignerFailed {
            command: name.to_string(),
            reason: format!("{}: {diagnostic}", output.status),
        });
    }
    Ok(())
}

/// `bwa index` / `bwa mem` with the long-read presets.
pub struct BwaMem {
    pub read_type: ReadType,
    pub threads: usize,
}

impl Aligner for BwaMem {
    fn index(&self, reference: &Path) -> Result<()> {
        let mut command = Command::new("bwa");
        command.arg("index").arg(reference).stdout(Stdio::null());
        run_command("bwa index", command)
    }

    fn align(
        &self,
        reference: &Path,
        reads: &Path,
        sam_out: &Path,
        primary_only: bool,
    ) -> Result<()> {
        let sam = File::create(sam_out)?;
        let mut command = Command::new("bwa");
        command
            .arg("mem")
            .arg("-t")
            .arg(self.threads.to_string())
            .arg("-x")
            .arg(match self.read_type {
                ReadType::PacBio => "pacbio",
                ReadType::Ont => "ont2d",
            });
        if !primary_only {
            // Report supplementary alignments soft-clipped so their SEQ
            // stays usable for harvesting.
            command.arg("-Y");
        }
        command.arg(reference).arg(reads).stdout(Stdio::from(sam));
        run_command("bwa mem", command)
    }

    fn name(&self) -> &str {
        "bwa"
    }
}

/// `graphmap align`; the preferred backend for nanopore reads.
pub struct GraphMap {
    pub threads: usize,
}

impl Aligner for GraphMap {
    fn index(&self, _reference: &Path) -> Result<()> {
        // graphmap builds (and caches) its index on the first alignment run
        // against a reference, so there is nothing to do up front.
        tracing::debug!("graphmap indexes on first use; skipping explicit index step");
        Ok(())
    }

    fn align(
        &self,
        reference: &Path,
        reads: &Path,
        sam_out: &Path,
        _primary_only: bool,
    ) -> Result<()> {
        let mut command = Command::new("graphmap");
        command
            .arg("align")
            .arg("-t")
            .arg(self.threads.to_string())
            .arg("-r")
            .arg(reference)
            .arg("-d")
            .arg(reads)
            .arg("-o")
            .arg(sam_out)
            .stdout(Stdio::null());
        run_command("graphmap align", command)?;

        if !sam_out.exists() {
            return Err(ExtendError::AlignerFailed {
                command: "graphmap align".to_string(),
                reason: format!("produced no output file at {}", sam_out.display()),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "graphmap"
    }
}
