// This software is released under the MIT license.
// See file LICENSE for full license details.
use anyhow::Context;
use log::debug;
use std::path::Path;

use rust_htslib::bam::record::Aux;
use rust_htslib::bam::record::Record as BamRecord;
use rust_htslib::bam::Read;

use crate::common::{Mate, ReadRecord};
use crate::runtime::Error;

/// Tag holding the composite barcode
pub const DEFAULT_BARCODE_TAG: &str = "RX";

///////////////////////////////
/// Streams the records of a BAM/CRAM file, in file order, as owned ReadRecords
pub struct BamReadSource {
    reader: rust_htslib::bam::Reader,
    record: BamRecord,
    barcode_tag: Vec<u8>,
}

impl BamReadSource {
    pub fn new(path: &Path, barcode_tag: &str, num_threads: usize) -> anyhow::Result<BamReadSource> {
        if !path.exists() {
            return Err(Error::file_not_found(path).into());
        }

        //Unaligned BAMs carry no @SQ lines; htslib reads them fine
        let mut reader = rust_htslib::bam::Reader::from_path(path)
            .with_context(|| format!("Could not open BAM file {}", path.display()))?;

        //Decompression threads only; records still come out in file order
        if num_threads > 1 {
            reader
                .set_threads(num_threads)
                .context("Could not set BAM reader threads")?;
        }
        debug!("Opened {} using {} threads", path.display(), num_threads);

        Ok(BamReadSource {
            reader,
            record: BamRecord::new(),
            barcode_tag: barcode_tag.as_bytes().to_vec(),
        })
    }
}

impl Iterator for BamReadSource {
    type Item = anyhow::Result<ReadRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read(&mut self.record) {
            None => None,
            Some(Err(e)) => Some(Err(anyhow::Error::from(e).context("Failed to parse BAM record"))),
            Some(Ok(())) => Some(Ok(bam_to_read_record(&self.record, &self.barcode_tag))),
        }
    }
}

////////////////////////
/// Convert one BAM entry to a ReadRecord
pub fn bam_to_read_record(record: &BamRecord, barcode_tag: &[u8]) -> ReadRecord {
    let mate = if record.is_first_in_template() {
        Mate::First
    } else if record.is_last_in_template() {
        Mate::Second
    } else {
        Mate::Unpaired
    };

    let barcode = match record.aux(barcode_tag) {
        Ok(Aux::String(s)) => Some(s.to_string()),
        _ => None,
    };

    ReadRecord {
        name: record.qname().to_vec(),
        mate,
        is_reverse: record.is_reverse(),
        seq: record.seq().as_bytes(),
        qual: phred_to_ascii(record.qual()),
        barcode,
    }
}

///////////////////////////////
/// Raw Phred scores to Phred+33. htslib fills a missing quality string with 0xFF
pub fn phred_to_ascii(qual: &[u8]) -> Vec<u8> {
    if qual.first() == Some(&0xff) {
        return vec![b'!'; qual.len()];
    }
    qual.iter().map(|q| q.saturating_add(33)).collect()
}
