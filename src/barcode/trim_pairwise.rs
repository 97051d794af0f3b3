// This software is released under the MIT license.
// See file LICENSE for full license details.
use bio::alignment::distance::levenshtein;

/// Number of R2 bases whose reverse complement is searched for in R1
pub const ADAPTER_QUERY_LEN: usize = 20;

/// Largest edit distance accepted by the fuzzy search
pub const MAX_FUZZY_DISTANCE: u32 = 1;

/// Using the trick from https://doi.org/10.1101/082214 , extended to handle N
/// This function handles ATCGN
pub fn revcomp_n(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|c| if c & 2 != 0 {
            if c & 8 != 0 {
                //N
                b'N'
            } else {
                //G or C
                c ^ 4 
            }
        } else { 
            //A or T
            c ^ 21 
        })
        .collect()
}

// C and G have their bit 2 set, whereas A and T do not
// C hex 43 bin 01000011
// G hex 47 bin 01000111
// A hex 41 bin 01000001
// T hex 54 bin 01010100
// N hex 4e bin 01001110  //4th bit is set to 1 ; 2nd bit is 1



///////////////////////////////
/// Finds where read-through into the ATAC adapter begins, by locating the start of R2
/// (reverse complemented) inside R1.
///
/// An exact hit is searched from the right end of R1 first. Without one, R1 is scanned
/// left to right and the first window within edit distance 1 is taken.
///
/// A hit at position 0 is ignored unless `trim_match_at_start` is set. Older runs of this
/// pipeline ignored it, so it stays off by default to keep outputs comparable.
#[derive(Clone, Copy, Debug, Default)]
pub struct AdapterTrimmer {
    pub trim_match_at_start: bool,
}

impl AdapterTrimmer {
    pub fn new(trim_match_at_start: bool) -> AdapterTrimmer {
        AdapterTrimmer {
            trim_match_at_start,
        }
    }

    ///////////////////////////////
    /// Length R1 and R2 should be cut to, or None to keep the reads whole
    pub fn trim_offset(&self, seq1: &[u8], seq2: &[u8]) -> Option<usize> {
        let query = revcomp_n(&seq2[..seq2.len().min(ADAPTER_QUERY_LEN)]);
        if query.is_empty() {
            return None;
        }

        let pos = rfind_exact(seq1, &query).or_else(|| find_fuzzy(seq1, &query))?;
        if pos > 0 || self.trim_match_at_start {
            Some(pos + ADAPTER_QUERY_LEN - 1)
        } else {
            None
        }
    }
}

/// Rightmost exact occurrence of needle
fn rfind_exact(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Leftmost window within MAX_FUZZY_DISTANCE edits of needle. Windows near the end of the
/// haystack are cut short rather than skipped
fn find_fuzzy(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    (0..haystack.len()).find(|&i| {
        let end = (i + needle.len()).min(haystack.len());
        levenshtein(&haystack[i..end], needle) <= MAX_FUZZY_DISTANCE
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    const R2_START: &[u8] = b"ACGTTGCAAGGCTTAACCGT";

    #[test]
    fn test_revcomp_n() {

        let seq = b"ATGCTTCCAGNAA";
        let actual = revcomp_n(seq);
        let expected = b"TTNCTGGAAGCAT";
        assert_eq!(actual, expected)  
    }

    #[test]
    fn test_exact_match_inside_read() {
        let adapter = revcomp_n(R2_START);
        let mut seq1 = b"GGGGG".to_vec();
        seq1.extend_from_slice(&adapter);
        seq1.extend_from_slice(b"TTTTTTTTTT");

        let mut seq2 = R2_START.to_vec();
        seq2.extend_from_slice(b"CCCCC");

        let trimmer = AdapterTrimmer::default();
        assert_eq!(trimmer.trim_offset(&seq1, &seq2), Some(5 + 19));
    }

    #[test]
    fn test_rightmost_exact_match_wins() {
        let adapter = revcomp_n(R2_START);
        let mut seq1 = b"A".to_vec();
        seq1.extend_from_slice(&adapter);
        seq1.extend_from_slice(b"CC");
        seq1.extend_from_slice(&adapter);

        let trimmer = AdapterTrimmer::default();
        assert_eq!(trimmer.trim_offset(&seq1, R2_START), Some(1 + 20 + 2 + 19));
    }

    #[test]
    fn test_match_at_start_ignored_by_default() {
        let mut seq1 = revcomp_n(R2_START);
        seq1.extend_from_slice(b"TTTTTTTTTT");

        assert_eq!(AdapterTrimmer::default().trim_offset(&seq1, R2_START), None);
        assert_eq!(AdapterTrimmer::new(true).trim_offset(&seq1, R2_START), Some(19));
    }

    #[test]
    fn test_fuzzy_match_with_one_mismatch() {
        let mut adapter = revcomp_n(R2_START);
        adapter[10] = if adapter[10] == b'A' { b'C' } else { b'A' };
        let mut seq1 = b"GGG".to_vec();
        seq1.extend_from_slice(&adapter);

        let trimmer = AdapterTrimmer::default();
        assert_eq!(trimmer.trim_offset(&seq1, R2_START), Some(3 + 19));
    }

    #[test]
    fn test_no_match() {
        let seq1 = vec![b'G'; 60];
        let seq2 = vec![b'G'; 40];
        assert_eq!(AdapterTrimmer::default().trim_offset(&seq1, &seq2), None);
        assert_eq!(AdapterTrimmer::default().trim_offset(&seq1, b""), None);
    }

    #[test]
    fn test_find_fuzzy_is_leftmost() {
        // An approximate hit on the left beats an exact hit further right
        assert_eq!(find_fuzzy(b"ACGTTTACGA", b"ACGA"), Some(0));
        assert_eq!(find_fuzzy(b"TTTTACGTTTT", b"ACGT"), Some(4));
        assert_eq!(find_fuzzy(b"TTTTTTTT", b"ACGT"), None);
    }
}
