// This software is released under the MIT license.
// See file LICENSE for full license details.
use log::trace;

/// Position of a record within its read pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mate {
    First,
    Second,
    Unpaired,
}

///////////////////////////////
/// One read, as stored in the input archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRecord {
    pub name: Vec<u8>,
    pub mate: Mate,
    pub is_reverse: bool,
    pub seq: Vec<u8>,
    /// Phred+33 encoded, same length as seq
    pub qual: Vec<u8>,
    /// Raw composite barcode `seg1-seg2-seg3`, if the record carries one
    pub barcode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPair {
    pub r1: ReadRecord,
    pub r2: ReadRecord,
}

impl std::fmt::Display for ReadPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            String::from_utf8_lossy(&self.r1.name),
            String::from_utf8_lossy(&self.r1.seq),
            String::from_utf8_lossy(&self.r2.seq)
        )
    }
}

///////////////////////////////
/// Records that could not be paired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairingCounts {
    pub records: u64,
    pub pairs: u64,
    /// First-of-pair records replaced by a later first, mismatched, or left at end of input
    pub orphan_first: u64,
    /// Second-of-pair records without a pending first of the same name
    pub orphan_second: u64,
    /// Records flagged neither first nor second
    pub unpaired: u64,
}

#[derive(Debug)]
enum PairingState {
    AwaitingFirst,
    HaveFirst(ReadRecord),
}

///////////////////////////////
/// Pairs up records that arrive as first-of-pair immediately followed by its second-of-pair.
/// Anything out of that order is dropped and counted
#[derive(Debug)]
pub struct ReadPairer {
    state: PairingState,
    counts: PairingCounts,
}

impl Default for ReadPairer {
    fn default() -> Self {
        ReadPairer::new()
    }
}

impl ReadPairer {
    pub fn new() -> ReadPairer {
        ReadPairer {
            state: PairingState::AwaitingFirst,
            counts: PairingCounts::default(),
        }
    }

    pub fn push(&mut self, record: ReadRecord) -> Option<ReadPair> {
        self.counts.records += 1;
        match record.mate {
            Mate::First => {
                if let PairingState::HaveFirst(prev) = &self.state {
                    trace!(
                        "Dropping unpaired first read {}",
                        String::from_utf8_lossy(&prev.name)
                    );
                    self.counts.orphan_first += 1;
                }
                self.state = PairingState::HaveFirst(record);
                None
            }
            Mate::Second => {
                match std::mem::replace(&mut self.state, PairingState::AwaitingFirst) {
                    PairingState::HaveFirst(r1) if r1.name == record.name => {
                        self.counts.pairs += 1;
                        Some(ReadPair { r1, r2: record })
                    }
                    PairingState::HaveFirst(r1) => {
                        trace!(
                            "Read names differ within pair: {} vs {}",
                            String::from_utf8_lossy(&r1.name),
                            String::from_utf8_lossy(&record.name)
                        );
                        self.counts.orphan_first += 1;
                        self.counts.orphan_second += 1;
                        None
                    }
                    PairingState::AwaitingFirst => {
                        self.counts.orphan_second += 1;
                        None
                    }
                }
            }
            Mate::Unpaired => {
                self.counts.unpaired += 1;
                None
            }
        }
    }

    /// Signal end of input. A pending first-of-pair is discarded
    pub fn finish(&mut self) {
        if let PairingState::HaveFirst(_) =
            std::mem::replace(&mut self.state, PairingState::AwaitingFirst)
        {
            self.counts.orphan_first += 1;
        }
    }

    pub fn counts(&self) -> PairingCounts {
        self.counts
    }
}

///////////////////////////////
/// Iterator of read pairs over an ordered record source
pub struct ReadPairStream<I> {
    source: I,
    pairer: ReadPairer,
    done: bool,
}

impl<I> ReadPairStream<I>
where
    I: Iterator<Item = anyhow::Result<ReadRecord>>,
{
    pub fn new(source: I) -> ReadPairStream<I> {
        ReadPairStream {
            source,
            pairer: ReadPairer::new(),
            done: false,
        }
    }

    pub fn counts(&self) -> PairingCounts {
        self.pairer.counts()
    }
}

impl<I> Iterator for ReadPairStream<I>
where
    I: Iterator<Item = anyhow::Result<ReadRecord>>,
{
    type Item = anyhow::Result<ReadPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.source.next() {
                Some(Ok(record)) => {
                    if let Some(pair) = self.pairer.push(record) {
                        return Some(Ok(pair));
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.pairer.finish();
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, mate: Mate) -> ReadRecord {
        ReadRecord {
            name: name.as_bytes().to_vec(),
            mate,
            is_reverse: false,
            seq: b"ACGT".to_vec(),
            qual: b"IIII".to_vec(),
            barcode: None,
        }
    }

    fn pair_all(records: Vec<ReadRecord>) -> (Vec<ReadPair>, PairingCounts) {
        let mut stream = ReadPairStream::new(records.into_iter().map(Ok));
        let pairs: Vec<ReadPair> = stream.by_ref().map(|p| p.unwrap()).collect();
        (pairs, stream.counts())
    }

    #[test]
    fn test_adjacent_pairs() {
        let (pairs, counts) = pair_all(vec![
            rec("a", Mate::First),
            rec("a", Mate::Second),
            rec("b", Mate::First),
            rec("b", Mate::Second),
        ]);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].r1.name, b"a");
        assert_eq!(pairs[0].r2.mate, Mate::Second);
        assert_eq!(pairs[1].r1.name, b"b");
        assert_eq!(counts.records, 4);
        assert_eq!(counts.pairs, 2);
        assert_eq!(counts.orphan_first + counts.orphan_second, 0);
    }

    #[test]
    fn test_name_mismatch_emits_nothing() {
        let (pairs, counts) = pair_all(vec![rec("a", Mate::First), rec("b", Mate::Second)]);
        assert!(pairs.is_empty());
        assert_eq!(counts.orphan_first, 1);
        assert_eq!(counts.orphan_second, 1);
    }

    #[test]
    fn test_first_replaces_pending_first() {
        let (pairs, counts) = pair_all(vec![
            rec("a", Mate::First),
            rec("b", Mate::First),
            rec("b", Mate::Second),
        ]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].r1.name, b"b");
        assert_eq!(counts.orphan_first, 1);
    }

    #[test]
    fn test_second_without_first_ignored() {
        let (pairs, counts) = pair_all(vec![
            rec("a", Mate::Second),
            rec("b", Mate::First),
            rec("b", Mate::Second),
            rec("b", Mate::Second),
        ]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(counts.orphan_second, 2);
    }

    #[test]
    fn test_dangling_first_at_end() {
        let (pairs, counts) = pair_all(vec![
            rec("a", Mate::First),
            rec("a", Mate::Second),
            rec("b", Mate::First),
        ]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(counts.orphan_first, 1);
    }

    #[test]
    fn test_unpaired_records_skipped() {
        let (pairs, counts) = pair_all(vec![
            rec("a", Mate::First),
            rec("x", Mate::Unpaired),
            rec("a", Mate::Second),
        ]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(counts.unpaired, 1);
    }

    #[test]
    fn test_source_error_stops_stream() {
        let source = vec![
            Ok(rec("a", Mate::First)),
            Err(anyhow::anyhow!("truncated file")),
            Ok(rec("a", Mate::Second)),
        ];
        let mut stream = ReadPairStream::new(source.into_iter());
        assert!(stream.next().unwrap().is_err());
        assert!(stream.next().is_none());
    }
}
