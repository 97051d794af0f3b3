// This software is released under the MIT license.
// See file LICENSE for full license details.
use log::{debug, info, trace};
use std::io::Write;
use std::path::PathBuf;

use crate::barcode::{AdapterTrimmer, BarcodeCatalog, CompositeBarcodeResolver, SampleBarcodeSet};
use crate::common::{ReadPair, ReadPairStream, ReadRecord};
use crate::fileformat::{BamReadSource, OutputMultiplexer};

use super::stats::DemuxStats;

/// Bases taken from the start of R2 as the UMI in RNA mode
pub const UMI_LEN: usize = 10;

pub const PROGRESS_INTERVAL: u64 = 1_000_000;

///////////////////////////////
/// Library type; decides which mates are written and whether adapters are trimmed
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SampleType {
    /// Both mates, adapter trimmed, to _R1 and _R2 files
    #[value(name = "ATAC")]
    Atac,
    /// First mate only, UMI appended to the read name
    #[value(name = "RNA")]
    Rna,
}

impl SampleType {
    pub fn writes_both_mates(&self) -> bool {
        matches!(self, SampleType::Atac)
    }
}

#[derive(Clone, Debug)]
pub struct DemuxParams {
    pub path_bam: PathBuf,
    pub path_r1_barcode_sets: PathBuf,
    pub path_r2_barcodes: PathBuf,
    pub path_r3_barcodes: PathBuf,
    pub file_prefix: PathBuf,
    pub sample_type: SampleType,
    pub barcode_tag: String,
    pub trim_match_at_start: bool,
    pub reject_ambiguous: bool,
    pub path_stats: Option<PathBuf>,
    pub num_threads: usize,
}

///////////////////////////////
/// Splits read pairs into per-sample FASTQ files by their corrected barcodes
pub struct Demux {
    resolver: CompositeBarcodeResolver,
    trimmer: AdapterTrimmer,
    sample_type: SampleType,
}

impl Demux {
    pub fn new(
        resolver: CompositeBarcodeResolver,
        trimmer: AdapterTrimmer,
        sample_type: SampleType,
    ) -> Demux {
        Demux {
            resolver,
            trimmer,
            sample_type,
        }
    }

    ///////////////////////////////
    /// Run the algorithm
    pub fn run(params: &DemuxParams) -> anyhow::Result<DemuxStats> {
        info!("Running command: demux");

        let samples = SampleBarcodeSet::from_path(&params.path_r1_barcode_sets)?;
        let seg2 = BarcodeCatalog::from_path(&params.path_r2_barcodes)?;
        let seg3 = BarcodeCatalog::from_path(&params.path_r3_barcodes)?;
        info!(
            "Barcodes loaded: {} R1 in {} sample groups, {} R2, {} R3",
            samples.catalog().num_barcodes(),
            samples.labels().len(),
            seg2.num_barcodes(),
            seg3.num_barcodes()
        );

        let resolver = CompositeBarcodeResolver::new(samples, seg2, seg3);
        resolver.check_ambiguity(params.reject_ambiguous)?;

        let demux = Demux::new(
            resolver,
            AdapterTrimmer::new(params.trim_match_at_start),
            params.sample_type,
        );

        let source = BamReadSource::new(&params.path_bam, &params.barcode_tag, params.num_threads)?;

        //Output files stay open for the whole run; they are closed on drop if anything fails
        let mut mux = OutputMultiplexer::create(
            &params.file_prefix,
            &demux.resolver.samples().labels(),
            params.sample_type.writes_both_mates(),
        )?;
        let stats = demux.demux_records(source, &mut mux)?;
        mux.finish()?;

        stats.log_summary();
        if let Some(path_stats) = &params.path_stats {
            stats.write_csv(path_stats)?;
            info!("Wrote run statistics to {}", path_stats.display());
        }
        Ok(stats)
    }

    ///////////////////////////////
    /// Pair up records and write every pair whose barcode resolves
    pub fn demux_records<I, W>(
        &self,
        records: I,
        mux: &mut OutputMultiplexer<W>,
    ) -> anyhow::Result<DemuxStats>
    where
        I: Iterator<Item = anyhow::Result<ReadRecord>>,
        W: Write,
    {
        let mut stats = DemuxStats::default();
        let mut stream = ReadPairStream::new(records);

        let mut n_pairs: u64 = 0;
        for pair in stream.by_ref() {
            self.process_pair(pair?, mux, &mut stats)?;

            n_pairs += 1;
            if n_pairs % PROGRESS_INTERVAL == 0 {
                info!(
                    "#read pairs processed: {} ({} written)",
                    n_pairs, stats.pairs_written
                );
            }
        }

        stats.add_pairing(stream.counts());
        Ok(stats)
    }

    ///////////////////////////////
    /// Resolve, rename and write one pair. Unresolvable pairs are counted and skipped
    pub fn process_pair<W: Write>(
        &self,
        pair: ReadPair,
        mux: &mut OutputMultiplexer<W>,
        stats: &mut DemuxStats,
    ) -> anyhow::Result<()> {
        let bc = match self.resolver.resolve_pair(&pair) {
            Ok(Some(bc)) => bc,
            Ok(None) => {
                trace!("No barcode match for {}", pair);
                stats.unresolved_barcode += 1;
                return Ok(());
            }
            Err(e) => {
                debug!("{}", e);
                stats.malformed_tag += 1;
                return Ok(());
            }
        };

        let ReadPair { mut r1, mut r2 } = pair;

        let mut name = std::mem::take(&mut r1.name);
        name.push(b'_');
        name.extend_from_slice(bc.cell_id().as_bytes());

        match self.sample_type {
            SampleType::Atac => {
                let trim = self.trimmer.trim_offset(&r1.seq, &r2.seq);
                r2.name = name.clone();
                r1.name = name;
                mux.write_r1(bc.group, &r1, trim)?;
                mux.write_r2(bc.group, &r2, trim)?;
            }
            SampleType::Rna => {
                name.push(b'_');
                name.extend_from_slice(&r2.seq[..r2.seq.len().min(UMI_LEN)]);
                r1.name = name;
                mux.write_r1(bc.group, &r1, None)?;
            }
        }

        stats.inc_group(bc.group);
        Ok(())
    }
}
