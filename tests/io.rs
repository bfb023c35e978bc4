/// FASTA round trips and the SAM input contract.
use noodles::sam::alignment::record::cigar::op::Kind;
use tendril_rs::errors::ExtendError;
use tendril_rs::fasta::{FastaSet, ReadDb, write_fasta, write_fasta_records};
use tendril_rs::sam_input::{cluster_by_contig, read_sam};
use tendril_rs::types::{HashMap, HashMapExt};

// ── FASTA ────────────────────────────────────────────────────────────────────

#[test]
fn fasta_round_trip_preserves_order_and_uppercases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.fasta");

    let long_seq: Vec<u8> = b"acgt".iter().copied().cycle().take(205).collect();
    write_fasta_records(
        &path,
        [("first", b"ACGTACGT".as_slice()), ("second", long_seq.as_slice())],
    )
    .unwrap();

    let set = FastaSet::load(&path).unwrap();
    assert_eq!(set.ids, vec!["first", "second"]);
    assert_eq!(set.seqs[0], b"ACGTACGT");
    // Lines were wrapped on write and uppercased on load.
    assert_eq!(set.seqs[1].len(), 205);
    assert!(set.seqs[1].iter().all(|b| b"ACGT".contains(b)));
}

#[test]
fn fasta_ids_stop_at_whitespace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("described.fasta");
    std::fs::write(&path, ">contig_1 length=8 coverage=12\nACGTACGT\n").unwrap();

    let set = FastaSet::load(&path).unwrap();
    assert_eq!(set.ids, vec!["contig_1"]);
}

#[test]
fn read_db_maps_names_to_dense_ids() {
    let set = FastaSet {
        ids: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        seqs: vec![b"AA".to_vec(), b"CC".to_vec(), b"GG".to_vec()],
    };
    let db = ReadDb::from_set(set);
    assert_eq!(db.len(), 3);
    assert_eq!(db.name_to_id["b"], 1);
    assert_eq!(db.seqs[db.name_to_id["c"] as usize], b"GG");
}

#[test]
fn single_record_writer_matches_multi() {
    let dir = tempfile::tempdir().unwrap();
    let single = dir.path().join("single.fasta");
    let multi = dir.path().join("multi.fasta");
    write_fasta(&single, "ctg", b"ACGT").unwrap();
    write_fasta_records(&multi, [("ctg", b"ACGT".as_slice())]).unwrap();
    assert_eq!(
        std::fs::read_to_string(&single).unwrap(),
        std::fs::read_to_string(&multi).unwrap()
    );
}

// ── SAM input ────────────────────────────────────────────────────────────────

fn write_sam(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("test.sam");
    let mut sam = String::from("@HD\tVN:1.6\tSO:unsorted\n@SQ\tSN:ctg1\tLN:200\n@SQ\tSN:ctg2\tLN:300\n");
    sam.push_str(body);
    std::fs::write(&path, sam).unwrap();
    path
}

#[test]
fn mapped_records_come_back_zero_based() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sam(dir.path(), "r1\t0\tctg1\t1\t60\t4M\t*\t0\t0\tACGT\t*\n");

    let contents = read_sam(&path, false).unwrap();
    assert_eq!(contents.ref_names, vec!["ctg1", "ctg2"]);
    assert_eq!(contents.records.len(), 1);
    let record = &contents.records[0];
    assert_eq!(record.name, "r1");
    assert_eq!(record.pos, 0);
    assert_eq!(record.cigar, vec![(4, Kind::Match)]);
    assert_eq!(record.seq, b"ACGT");
}

#[test]
fn unmapped_records_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sam(dir.path(), "r1\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t*\n");

    let contents = read_sam(&path, false).unwrap();
    assert_eq!(contents.records.len(), 1);
    assert!(contents.records[0].unmapped);
}

#[test]
fn mapped_record_without_a_cigar_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sam(dir.path(), "r1\t0\tctg1\t1\t60\t*\t*\t0\t0\tACGT\t*\n");

    let err = read_sam(&path, false).unwrap_err();
    assert!(matches!(err, ExtendError::InvalidAlignment { .. }));
}

#[test]
fn seq_shorter_than_the_cigar_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sam(dir.path(), "r1\t0\tctg1\t1\t60\t10M\t*\t0\t0\tACGT\t*\n");

    let err = read_sam(&path, false).unwrap_err();
    assert!(matches!(err, ExtendError::InvalidAlignment { .. }));
}

#[test]
fn secondary_records_are_always_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let body = "r1\t0\tctg1\t1\t60\t4M\t*\t0\t0\tACGT\t*\n\
                r1\t256\tctg2\t1\t0\t4M\t*\t0\t0\t*\t*\n";
    let path = write_sam(dir.path(), body);

    let contents = read_sam(&path, false).unwrap();
    assert_eq!(contents.records.len(), 1);
}

#[test]
fn supplementary_records_are_dropped_only_in_primary_mode() {
    let dir = tempfile::tempdir().unwrap();
    let body = "r1\t0\tctg1\t1\t60\t4M\t*\t0\t0\tACGT\t*\n\
                r1\t2048\tctg2\t1\t60\t2M2S\t*\t0\t0\tACGT\t*\n";
    let path = write_sam(dir.path(), body);

    assert_eq!(read_sam(&path, false).unwrap().records.len(), 2);
    assert_eq!(read_sam(&path, true).unwrap().records.len(), 1);
}

#[test]
fn records_cluster_by_contig_and_unknown_references_drop() {
    let dir = tempfile::tempdir().unwrap();
    let body = "r1\t0\tctg1\t1\t60\t4M\t*\t0\t0\tACGT\t*\n\
                r2\t0\tctg2\t1\t60\t4M\t*\t0\t0\tACGT\t*\n\
                r3\t0\tctg2\t5\t60\t4M\t*\t0\t0\tACGT\t*\n";
    let path = write_sam(dir.path(), body);
    let contents = read_sam(&path, false).unwrap();

    // Only ctg2 is a known contig here; ctg1 alignments are discarded.
    let mut contig_name_to_id: HashMap<String, usize> = HashMap::new();
    contig_name_to_id.insert("ctg2".to_string(), 0);

    let clusters = cluster_by_contig(contents, &contig_name_to_id);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[&0].len(), 2);
    assert!(clusters[&0].iter().all(|r| r.name.starts_with('r')));
}
