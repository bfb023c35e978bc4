use crate::types::{HashMap, HashMapExt, ReadId};
use anyhow::Result;
use needletail::parse_fastx_file;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const FASTA_LINE_WIDTH: usize = 80;

/// Sequences from one FASTA file, in file order. `ids` and `seqs` are
/// parallel vectors.
#[derive(Debug, Default)]
pub struct FastaSet {
    pub ids: Vec<String>,
    pub seqs: Vec<Vec<u8>>,
}

impl FastaSet {
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = parse_fastx_file(path)
            .map_err(|e| anyhow::anyhow!("failed to open FASTA {}: {}", path.display(), e))?;
        let mut set = FastaSet::default();

        while let Some(result) = reader.next() {
            let record =
                result.map_err(|e| anyhow::anyhow!("failed to parse FASTA record: {}", e))?;
            let id = std::str::from_utf8(record.id())
                .unwrap_or("")
                .split_ascii_whitespace()
                .next()
                .unwrap_or("")
                .to_string();
            let mut seq = record.seq().to_vec();
            seq.make_ascii_uppercase();
            set.ids.push(id);
            set.seqs.push(seq);
        }

        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// All input reads, indexed by dense id, plus the name lookup used by the
/// harvester.
#[derive(Debug, Default)]
pub struct ReadDb {
    pub ids: Vec<String>,
    pub seqs: Vec<Vec<u8>>,
    pub name_to_id: HashMap<String, ReadId>,
}

impl ReadDb {
    pub fn from_set(set: FastaSet) -> Self {
        let mut name_to_id = HashMap::with_capacity(set.ids.len());
        for (i, id) in set.ids.iter().enumerate() {
            name_to_id.insert(id.clone(), i as ReadId);
        }
        Self { ids: set.ids, seqs: set.seqs, name_to_id }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Write a single sequence as FASTA.
pub fn write_fasta(path: &Path, id: &str, seq: &[u8]) -> Result<()> {
    write_fasta_records(path, [(id, seq)])
}

/// Write multiple (id, sequence) pairs as FASTA, 80 columns per line.
pub fn write_fasta_records<'a, I>(path: &Path, records: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    for (id, seq) in records {
        writeln!(writer, ">{id}")?;
        for chunk in seq.chunks(FASTA_LINE_WIDTH) {
            writer.write_all(chunk)?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;
    Ok(())
}
