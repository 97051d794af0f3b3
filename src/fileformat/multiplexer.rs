// This software is released under the MIT license.
// See file LICENSE for full license details.
use anyhow::{bail, Context};
use log::{debug, info};
use rustc_hash::FxHashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::fastq::write_fastq_record;
use crate::common::ReadRecord;

///////////////////////////////
/// `<prefix>_<label>_R<mate>.fastq`
pub fn output_path(prefix: &Path, label: &str, mate: u8) -> PathBuf {
    let mut name: OsString = prefix.as_os_str().to_owned();
    name.push(format!("_{}_R{}.fastq", label, mate));
    PathBuf::from(name)
}

/// Output streams of one sample group
#[derive(Debug)]
pub struct GroupWriters<W> {
    pub r1: W,
    pub r2: Option<W>,
}

///////////////////////////////
/// Routes FASTQ records to the output streams of their sample group.
///
/// All streams are opened up front. Dropping the multiplexer closes them, flushing what it
/// can; [`OutputMultiplexer::finish`] does the same but reports flush errors
#[derive(Debug)]
pub struct OutputMultiplexer<W: Write> {
    writers: FxHashMap<String, GroupWriters<W>>,
}

impl OutputMultiplexer<BufWriter<File>> {
    ///////////////////////////////
    /// Create R1 (and, if paired, R2) FASTQ files for every label
    pub fn create(prefix: &Path, labels: &[&str], paired: bool) -> anyhow::Result<Self> {
        let open = |label: &str, mate: u8| -> anyhow::Result<BufWriter<File>> {
            let path = output_path(prefix, label, mate);
            debug!("Creating FASTQ output file: {}", path.display());
            let file = File::create(&path)
                .with_context(|| format!("Could not create output file {}", path.display()))?;
            Ok(BufWriter::new(file))
        };

        let mut writers = Vec::with_capacity(labels.len());
        for &label in labels {
            let r1 = open(label, 1)?;
            let r2 = if paired { Some(open(label, 2)?) } else { None };
            writers.push((label.to_string(), r1, r2));
        }
        info!(
            "Writing {} sample groups to {}_*",
            labels.len(),
            prefix.display()
        );
        Ok(OutputMultiplexer::from_writers(writers))
    }
}

impl<W: Write> OutputMultiplexer<W> {
    pub fn from_writers<I>(writers: I) -> Self
    where
        I: IntoIterator<Item = (String, W, Option<W>)>,
    {
        OutputMultiplexer {
            writers: writers
                .into_iter()
                .map(|(label, r1, r2)| (label, GroupWriters { r1, r2 }))
                .collect(),
        }
    }

    pub fn num_groups(&self) -> usize {
        self.writers.len()
    }

    fn group(&mut self, label: &str) -> anyhow::Result<&mut GroupWriters<W>> {
        match self.writers.get_mut(label) {
            Some(w) => Ok(w),
            None => bail!("No output stream for sample group '{}'", label),
        }
    }

    pub fn write_r1(&mut self, label: &str, read: &ReadRecord, trim: Option<usize>) -> anyhow::Result<()> {
        let group = self.group(label)?;
        write_fastq_record(&mut group.r1, read, trim)
            .with_context(|| format!("Failed writing R1 for sample group '{}'", label))
    }

    pub fn write_r2(&mut self, label: &str, read: &ReadRecord, trim: Option<usize>) -> anyhow::Result<()> {
        let group = self.group(label)?;
        let Some(r2) = group.r2.as_mut() else {
            bail!("Sample group '{}' has no R2 output", label);
        };
        write_fastq_record(r2, read, trim)
            .with_context(|| format!("Failed writing R2 for sample group '{}'", label))
    }

    ///////////////////////////////
    /// Flush every stream and hand them back, keyed by label
    pub fn finish(self) -> anyhow::Result<FxHashMap<String, GroupWriters<W>>> {
        let mut writers = self.writers;
        for (label, group) in writers.iter_mut() {
            group
                .r1
                .flush()
                .with_context(|| format!("Failed flushing R1 for sample group '{}'", label))?;
            if let Some(r2) = group.r2.as_mut() {
                r2.flush()
                    .with_context(|| format!("Failed flushing R2 for sample group '{}'", label))?;
            }
        }
        Ok(writers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Mate;

    fn read(name: &str) -> ReadRecord {
        ReadRecord {
            name: name.as_bytes().to_vec(),
            mate: Mate::First,
            is_reverse: false,
            seq: b"ACGT".to_vec(),
            qual: b"IIII".to_vec(),
            barcode: None,
        }
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("out/run1"), "S1", 2),
            PathBuf::from("out/run1_S1_R2.fastq")
        );
    }

    #[test]
    fn test_routes_by_label() {
        let mut mux = OutputMultiplexer::from_writers(vec![
            ("S1".to_string(), Vec::<u8>::new(), Some(Vec::<u8>::new())),
            ("S2".to_string(), Vec::<u8>::new(), Some(Vec::<u8>::new())),
        ]);
        mux.write_r1("S2", &read("a"), None).unwrap();
        mux.write_r2("S2", &read("a"), Some(2)).unwrap();
        mux.write_r1("S1", &read("b"), None).unwrap();

        let out = mux.finish().unwrap();
        assert_eq!(out["S1"].r1, b"@b\nACGT\n+\nIIII\n");
        assert!(out["S1"].r2.as_ref().unwrap().is_empty());
        assert_eq!(out["S2"].r1, b"@a\nACGT\n+\nIIII\n");
        assert_eq!(out["S2"].r2.as_ref().unwrap(), b"@a\nAC\n+\nII\n");
    }

    #[test]
    fn test_unknown_group_and_missing_r2() {
        let mut mux = OutputMultiplexer::from_writers(vec![("S1".to_string(), Vec::<u8>::new(), None)]);
        assert!(mux.write_r1("S9", &read("a"), None).is_err());
        assert!(mux.write_r2("S1", &read("a"), None).is_err());
    }

    #[test]
    fn test_create_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("lib");
        let mux = OutputMultiplexer::create(&prefix, &["S1", "S2"], true).unwrap();
        assert_eq!(mux.num_groups(), 2);
        drop(mux);

        for label in ["S1", "S2"] {
            assert!(output_path(&prefix, label, 1).exists());
            assert!(output_path(&prefix, label, 2).exists());
        }
    }
}
