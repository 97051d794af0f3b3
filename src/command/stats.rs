// This software is released under the MIT license.
// See file LICENSE for full license details.
use anyhow::Context;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::common::PairingCounts;

///////////////////////////////
/// What happened to the reads of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemuxStats {
    pub records: u64,
    pub pairs: u64,
    pub pairs_written: u64,
    pub unresolved_barcode: u64,
    pub malformed_tag: u64,
    pub orphan_first: u64,
    pub orphan_second: u64,
    pub unpaired: u64,
    pub pairs_per_group: BTreeMap<String, u64>,
}

/// One row of the stats table
#[derive(Debug, Serialize)]
struct StatsRow<'a> {
    metric: &'a str,
    value: u64,
}

impl DemuxStats {
    pub fn inc_group(&mut self, label: &str) {
        self.pairs_written += 1;
        match self.pairs_per_group.get_mut(label) {
            Some(n) => *n += 1,
            None => {
                self.pairs_per_group.insert(label.to_string(), 1);
            }
        }
    }

    pub fn add_pairing(&mut self, counts: PairingCounts) {
        self.records += counts.records;
        self.pairs += counts.pairs;
        self.orphan_first += counts.orphan_first;
        self.orphan_second += counts.orphan_second;
        self.unpaired += counts.unpaired;
    }

    /// Pairs that were formed but not written
    pub fn dropped_pairs(&self) -> u64 {
        self.unresolved_barcode + self.malformed_tag
    }

    pub fn log_summary(&self) {
        info!(
            "Read {} records into {} pairs; wrote {} pairs",
            self.records, self.pairs, self.pairs_written
        );
        info!(
            "Dropped {} pairs: {} with unresolved barcode, {} with malformed barcode tag",
            self.dropped_pairs(),
            self.unresolved_barcode,
            self.malformed_tag
        );
        info!(
            "Unpaired records: {} first-of-pair, {} second-of-pair, {} without mate flag",
            self.orphan_first, self.orphan_second, self.unpaired
        );
        for (label, n) in self.pairs_per_group.iter() {
            info!("Sample group {}: {} pairs", label, n);
        }
        if self.malformed_tag > 0 {
            warn!(
                "{} pairs had a missing or malformed barcode tag",
                self.malformed_tag
            );
        }
    }

    ///////////////////////////////
    /// Write all counters as a metric,value CSV table
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Could not create stats file {}", path.display()))?;

        let group_metrics: Vec<(String, u64)> = self
            .pairs_per_group
            .iter()
            .map(|(label, n)| (format!("group_{}", label), *n))
            .collect();

        let totals = [
            ("records", self.records),
            ("pairs", self.pairs),
            ("pairs_written", self.pairs_written),
            ("pairs_dropped", self.dropped_pairs()),
            ("unresolved_barcode", self.unresolved_barcode),
            ("malformed_tag", self.malformed_tag),
            ("orphan_first", self.orphan_first),
            ("orphan_second", self.orphan_second),
            ("unpaired", self.unpaired),
        ];

        for (metric, value) in totals {
            writer.serialize(StatsRow { metric, value })?;
        }
        for (metric, value) in group_metrics.iter() {
            writer.serialize(StatsRow {
                metric: metric.as_str(),
                value: *value,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}
