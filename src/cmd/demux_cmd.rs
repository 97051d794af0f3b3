// This software is released under the MIT license.
// See file LICENSE for full license details.
use anyhow::bail;
use anyhow::Result;
use clap::Args;
use log::info;
use std::path::PathBuf;

use crate::command::{Demux, DemuxParams, SampleType};
use crate::fileformat::bam::DEFAULT_BARCODE_TAG;

#[derive(Args, Debug)]
pub struct DemuxCMD {
    /// File in BAM format to extract reads from
    #[arg(value_name = "BAM_FILE", value_parser)]
    pub path_bam: PathBuf,

    /// File containing biosample splits in R1 barcodes
    #[arg(value_name = "R1_BARCODE_SETS", value_parser)]
    pub path_r1_barcode_sets: PathBuf,

    /// File containing R2 barcodes
    #[arg(value_name = "R2_BARCODE_FILE", value_parser)]
    pub path_r2_barcodes: PathBuf,

    /// File containing R3 barcodes
    #[arg(value_name = "R3_BARCODE_FILE", value_parser)]
    pub path_r3_barcodes: PathBuf,

    /// Prefix for FASTQ files (default: BAM_FILE without extension)
    #[arg(short = 'p', value_name = "FILE_PREFIX", value_parser)]
    pub file_prefix: Option<PathBuf>,

    /// Sample type in this library
    #[arg(short = 's', value_enum, default_value = "ATAC")]
    pub sample_type: SampleType,

    /// BAM tag holding the composite barcode
    #[arg(long = "barcode-tag", default_value = DEFAULT_BARCODE_TAG)]
    pub barcode_tag: String,

    /// Trim ATAC reads also when the adapter match starts at the first base.
    /// Off by default for compatibility with earlier outputs
    #[arg(long = "trim-match-at-start")]
    pub trim_match_at_start: bool,

    /// Fail if barcodes are ambiguous within one substitution, or listed under several sample groups
    #[arg(long = "reject-ambiguous")]
    pub reject_ambiguous: bool,

    /// Write run statistics to this CSV file
    #[arg(long = "stats", value_parser)]
    pub path_stats: Option<PathBuf>,

    //Thread settings
    #[arg(short = '@', value_parser = clap::value_parser!(usize))]
    num_threads_total: Option<usize>,
}
impl DemuxCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        if self.barcode_tag.len() != 2 || !self.barcode_tag.is_ascii() {
            bail!("Barcode tag must be two characters, got '{}'", self.barcode_tag);
        }

        let params = DemuxParams {
            path_bam: self.path_bam.clone(),
            path_r1_barcode_sets: self.path_r1_barcode_sets.clone(),
            path_r2_barcodes: self.path_r2_barcodes.clone(),
            path_r3_barcodes: self.path_r3_barcodes.clone(),
            file_prefix: self.resolve_file_prefix(),
            sample_type: self.sample_type,
            barcode_tag: self.barcode_tag.clone(),
            trim_match_at_start: self.trim_match_at_start,
            reject_ambiguous: self.reject_ambiguous,
            path_stats: self.path_stats.clone(),
            num_threads: self.num_threads_total.unwrap_or(1).max(1),
        };

        Demux::run(&params)?;

        info!("Demux has finished successfully");
        Ok(())
    }

    fn resolve_file_prefix(&self) -> PathBuf {
        match &self.file_prefix {
            Some(prefix) => prefix.clone(),
            None => self.path_bam.with_extension(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        cmd: DemuxCMD,
    }

    fn parse(args: &[&str]) -> DemuxCMD {
        TestCli::try_parse_from(args).unwrap().cmd
    }

    #[test]
    fn test_defaults() {
        let cmd = parse(&["bamdemux", "data/run.bam", "r1.txt", "r2.txt", "r3.txt"]);
        assert_eq!(cmd.sample_type, SampleType::Atac);
        assert_eq!(cmd.barcode_tag, "RX");
        assert!(!cmd.trim_match_at_start);
        assert_eq!(cmd.resolve_file_prefix(), PathBuf::from("data/run"));
    }

    #[test]
    fn test_options() {
        let cmd = parse(&[
            "bamdemux", "run.bam", "r1.txt", "r2.txt", "r3.txt", "-p", "out/lib", "-s", "RNA",
            "-@", "4",
        ]);
        assert_eq!(cmd.sample_type, SampleType::Rna);
        assert_eq!(cmd.resolve_file_prefix(), PathBuf::from("out/lib"));
        assert_eq!(cmd.num_threads_total, Some(4));
    }

    #[test]
    fn test_unknown_sample_type() {
        let res = TestCli::try_parse_from(["bamdemux", "a.bam", "r1", "r2", "r3", "-s", "WGS"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_bad_barcode_tag() {
        let mut cmd = parse(&[
            "bamdemux", "run.bam", "r1.txt", "r2.txt", "r3.txt", "--barcode-tag", "RXX",
        ]);
        assert!(cmd.try_execute().is_err());
    }
}
