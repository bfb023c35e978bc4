//! Whole-run driver: initial alignment, contig fan-out, output.

use crate::aligner::{Aligner, create_aligner, is_command_available};
use crate::cli::Args;
use crate::config::ExtensionConfig;
use crate::fasta::{self, FastaSet, ReadDb};
use crate::poa::AbpoaConsensus;
use crate::sam_input::{self, AlnRecord};
use crate::scaffold::{self, ContigExtension, ScratchPaths};
use crate::types::{HashMap, HashMapExt};
use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::thread;

#[derive(Debug, Default)]
pub struct Stats {
    pub contigs: usize,
    pub extended: usize,
    pub failed: usize,
    pub left_bases: u64,
    pub right_bases: u64,
}

struct WorkItem {
    idx: usize,
    id: String,
    seq: Vec<u8>,
    records: Vec<AlnRecord>,
}

pub fn run(args: &Args) -> Result<Stats> {
    let config = ExtensionConfig {
        max_ext: args.max_ext,
        inner_margin: args.inner_margin,
        outer_margin: args.outer_margin,
        min_coverage: args.min_coverage,
    };
    config.validate()?;

    let worker_count = args.threads.max(1);
    let aligner = create_aligner(args.aligner, args.read_type, worker_count);

    // The majority-vote path shells out to the aligner for every realignment
    // round; the POA path only needs it when no initial alignment was
    // supplied. Catch a missing binary before doing any work.
    let needs_aligner = !args.poa || args.alignment.is_none();
    if needs_aligner && !is_command_available(aligner.name()) {
        bail!("aligner '{}' is not available on PATH", aligner.name());
    }

    let contigs = FastaSet::load(&args.contigs)
        .with_context(|| format!("loading contigs from {}", args.contigs.display()))?;
    let reads = ReadDb::from_set(
        FastaSet::load(&args.reads)
            .with_context(|| format!("loading reads from {}", args.reads.display()))?,
    );
    tracing::info!(contigs = contigs.len(), reads = reads.len(), "inputs loaded");

    fs::create_dir_all(&args.scratch)?;

    // Align all reads against the draft once, unless the caller brought a
    // precomputed SAM.
    let aln_sam: PathBuf = match &args.alignment {
        Some(path) => path.clone(),
        None => {
            let path = args.scratch.join("aln.sam");
            tracing::info!(aligner = aligner.name(), "aligning reads to the draft assembly");
            aligner.index(&args.contigs)?;
            aligner.align(&args.contigs, &args.reads, &path, false)?;
            path
        }
    };

    let mut contig_name_to_id = HashMap::with_capacity(contigs.len());
    for (idx, id) in contigs.ids.iter().enumerate() {
        contig_name_to_id.insert(id.clone(), idx);
    }
    let contents = sam_input::read_sam(&aln_sam, false)
        .with_context(|| format!("reading alignments from {}", aln_sam.display()))?;
    let mut clusters = sam_input::cluster_by_contig(contents, &contig_name_to_id);

    let progress = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(contigs.len() as u64);
        pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(2));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                .expect("Failed to set progress bar template"),
        );
        pb.set_message("Extending contigs...");
        Some(pb)
    };

    let mut stats = Stats { contigs: contigs.len(), ..Stats::default() };
    let mut extensions: Vec<ContigExtension> = vec![ContigExtension::default(); contigs.len()];

    let cap = worker_count.saturating_mul(4).max(8);
    let (tx_work, rx_work) = flume::bounded::<WorkItem>(cap);
    let (tx_res, rx_res) = flume::bounded::<(usize, Result<ContigExtension>)>(cap);

    let mut work: Vec<WorkItem> = Vec::new();
    for (idx, (id, seq)) in contigs.ids.iter().zip(&contigs.seqs).enumerate() {
        if seq.len() < args.min_contig_len {
            tracing::debug!(contig = %id, len = seq.len(), "below minimum length; passed through");
            continue;
        }
        let records = clusters.remove(&idx).unwrap_or_default();
        work.push(WorkItem { idx, id: id.clone(), seq: seq.clone(), records });
    }
    let queued = work.len();

    let aligner_ref: &dyn Aligner = aligner.as_ref();
    let reads_ref = &reads;
    let config_ref = &config;

    thread::scope(|scope| -> Result<()> {
        for worker_id in 0..worker_count {
            let rx_work = rx_work.clone();
            let tx_res = tx_res.clone();
            let worker_dir = args.scratch.join(format!("worker_{worker_id}"));
            fs::create_dir_all(&worker_dir)?;
            let use_poa = args.poa;

            scope.spawn(move || {
                let scratch = ScratchPaths::in_dir(&worker_dir);
                let poa = AbpoaConsensus::new();
                while let Ok(item) = rx_work.recv() {
                    let result = if use_poa {
                        scaffold::extend_contig_poa(
                            &item.seq,
                            &item.records,
                            &reads_ref.name_to_id,
                            config_ref,
                            &poa,
                        )
                    } else {
                        scaffold::extend_contig(
                            &item.id,
                            &item.seq,
                            &item.records,
                            reads_ref,
                            config_ref,
                            aligner_ref,
                            &scratch,
                        )
                    };
                    if tx_res.send((item.idx, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx_res);
        // The workers hold their own receiver clones; dropping this one lets
        // the feeder's send fail instead of blocking if they all exit early.
        drop(rx_work);

        // Feed from a dedicated thread so the bounded work queue never
        // stalls the result drain below.
        scope.spawn(move || {
            for item in work {
                if tx_work.send(item).is_err() {
                    break;
                }
            }
        });

        for _ in 0..queued {
            let (idx, result) = rx_res.recv().context("worker thread exited unexpectedly")?;
            match result {
                Ok(extension) => {
                    if !extension.is_empty() {
                        stats.extended += 1;
                    }
                    stats.left_bases += extension.left.len() as u64;
                    stats.right_bases += extension.right.len() as u64;
                    extensions[idx] = extension;
                }
                Err(e) => {
                    // The contig goes out unextended; the batch continues.
                    tracing::warn!(
                        contig = %contigs.ids[idx],
                        error = %format!("{e:#}"),
                        "extension failed; emitting the original contig"
                    );
                    stats.failed += 1;
                }
            }
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }
        Ok(())
    })?;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let extended: Vec<Vec<u8>> = contigs
        .seqs
        .iter()
        .zip(&extensions)
        .map(|(seq, ext)| ext.apply(seq))
        .collect();
    fasta::write_fasta_records(
        &args.out,
        contigs.ids.iter().map(String::as_str).zip(extended.iter().map(Vec::as_slice)),
    )
    .with_context(|| format!("writing extended contigs to {}", args.out.display()))?;

    Ok(stats)
}
