use noodles::sam::alignment::record::cigar::op::Kind;

/// True for operations that consume bases of the read: M, I, S, X, =.
pub fn consumes_read(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Match | Kind::Insertion | Kind::SoftClip | Kind::SequenceMismatch | Kind::SequenceMatch
    )
}

/// True for operations that consume bases of the reference: M, D, N, X, =.
///
/// N does not normally show up in long-read alignments against contigs, but
/// when it does it must advance the reference cursor or every downstream
/// offset goes wrong.
pub fn consumes_reference(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Match | Kind::Deletion | Kind::Skip | Kind::SequenceMismatch | Kind::SequenceMatch
    )
}
