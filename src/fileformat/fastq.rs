// This software is released under the MIT license.
// See file LICENSE for full license details.
use std::io::Write;

use crate::barcode::trim_pairwise::revcomp_n;
use crate::common::ReadRecord;

///////////////////////////////
/// Sequence and quality of a read in sequencing orientation, cut to `trim` bases if given.
/// Reverse strand reads are reverse complemented; their qualities are only reversed
pub fn oriented_seq_qual(read: &ReadRecord, trim: Option<usize>) -> (Vec<u8>, Vec<u8>) {
    let (mut seq, mut qual) = if read.is_reverse {
        (
            revcomp_n(&read.seq),
            read.qual.iter().rev().copied().collect::<Vec<u8>>(),
        )
    } else {
        (read.seq.clone(), read.qual.clone())
    };

    if let Some(len) = trim {
        seq.truncate(len);
        qual.truncate(len);
    }
    (seq, qual)
}

///////////////////////////////
/// Write a read as one 4-line FASTQ record
pub fn write_fastq_record<W: Write>(
    writer: &mut W,
    read: &ReadRecord,
    trim: Option<usize>,
) -> std::io::Result<()> {
    let (seq, qual) = oriented_seq_qual(read, trim);
    write_fastq_read(writer, &read.name, &seq, &qual)
}

////////// Write one FASTQ read
pub fn write_fastq_read<W: Write>(
    writer: &mut W,
    head: &[u8],
    seq: &[u8],
    qual: &[u8],
) -> std::io::Result<()> {
    writer.write_all(b"@")?;
    writer.write_all(head)?;
    writer.write_all(b"\n")?;
    writer.write_all(seq)?;
    writer.write_all(b"\n+\n")?;
    writer.write_all(qual)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Mate;

    fn read(is_reverse: bool) -> ReadRecord {
        ReadRecord {
            name: b"read_1_AAAAAAAA,CCCCCCCC,GGGGGGGG".to_vec(),
            mate: Mate::First,
            is_reverse,
            seq: b"AACGTN".to_vec(),
            qual: b"ABCDEF".to_vec(),
            barcode: None,
        }
    }

    fn format(read: &ReadRecord, trim: Option<usize>) -> String {
        let mut out = Vec::new();
        write_fastq_record(&mut out, read, trim).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_forward_record() {
        assert_eq!(
            format(&read(false), None),
            "@read_1_AAAAAAAA,CCCCCCCC,GGGGGGGG\nAACGTN\n+\nABCDEF\n"
        );
    }

    #[test]
    fn test_reverse_record() {
        // Qualities are reversed, not complemented
        assert_eq!(
            format(&read(true), None),
            "@read_1_AAAAAAAA,CCCCCCCC,GGGGGGGG\nNACGTT\n+\nFEDCBA\n"
        );
    }

    #[test]
    fn test_trim_applies_after_orientation() {
        let (seq, qual) = oriented_seq_qual(&read(true), Some(3));
        assert_eq!(seq, b"NAC");
        assert_eq!(qual, b"FED");

        let (seq, qual) = oriented_seq_qual(&read(false), Some(4));
        assert_eq!(seq, b"AACG");
        assert_eq!(qual, b"ABCD");
    }

    #[test]
    fn test_trim_longer_than_read() {
        let (seq, qual) = oriented_seq_qual(&read(false), Some(100));
        assert_eq!(seq.len(), 6);
        assert_eq!(seq.len(), qual.len());
    }
}
