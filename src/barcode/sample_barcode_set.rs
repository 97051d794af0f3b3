// This software is released under the MIT license.
// See file LICENSE for full license details.
use log::debug;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::catalog::open_definition_file;
use super::BarcodeCatalog;
use crate::runtime::Error;

///////////////////////////////
/// Barcodes of the first segment, grouped into named samples.
///
/// Definition rows are whitespace separated: the sample group label, followed by the barcodes
/// of that group. A barcode listed again under another label moves to that label.
#[derive(Clone, Debug)]
pub struct SampleBarcodeSet {
    map_barcode_to_group: FxHashMap<String, String>,
    catalog: BarcodeCatalog,

    //Barcodes that were moved from one group to another while reading
    num_reassigned: usize,
}

impl SampleBarcodeSet {
    ///////////////////////////////
    /// Build from (label, barcodes) rows, in file order
    pub fn from_groups<'a, I, B>(rows: I) -> SampleBarcodeSet
    where
        I: IntoIterator<Item = (&'a str, B)>,
        B: IntoIterator<Item = &'a str>,
    {
        let mut map_barcode_to_group: FxHashMap<String, String> = FxHashMap::default();
        let mut barcode_list: Vec<&str> = Vec::new();
        let mut num_reassigned = 0;

        for (label, barcodes) in rows {
            for bc in barcodes {
                if let Some(prev) = map_barcode_to_group.insert(bc.to_string(), label.to_string()) {
                    if prev != label {
                        num_reassigned += 1;
                    }
                }
                barcode_list.push(bc);
            }
        }

        SampleBarcodeSet {
            map_barcode_to_group,
            catalog: BarcodeCatalog::from_barcodes(barcode_list),
            num_reassigned,
        }
    }

    ///////////////////////////////
    /// Parse a group definition file
    pub fn read_groups(src: impl BufRead, path: &Path) -> Result<SampleBarcodeSet, Error> {
        let mut rows: Vec<(String, Vec<String>)> = Vec::new();
        for (line_no, line) in src.lines().enumerate() {
            let line = line.map_err(|e| Error::file_not_valid(path, Some(e.to_string())))?;
            let mut tokens = line.split_whitespace();
            let Some(label) = tokens.next() else {
                continue;
            };
            let barcodes: Vec<String> = tokens.map(|t| t.to_string()).collect();
            if barcodes.is_empty() {
                return Err(Error::file_not_valid(
                    path,
                    Some(format!(
                        "line {}: group '{}' lists no barcodes",
                        line_no + 1,
                        label
                    )),
                ));
            }
            rows.push((label.to_string(), barcodes));
        }

        if rows.is_empty() {
            return Err(Error::file_not_valid(path, Some("no sample groups defined")));
        }

        Ok(SampleBarcodeSet::from_groups(rows.iter().map(|(label, bcs)| {
            (label.as_str(), bcs.iter().map(|b| b.as_str()))
        })))
    }

    pub fn from_path(path: &Path) -> Result<SampleBarcodeSet, Error> {
        let file = open_definition_file(path)?;
        let set = SampleBarcodeSet::read_groups(BufReader::new(file), path)?;
        debug!(
            "Loaded {} sample groups, {} barcodes from {}",
            set.labels().len(),
            set.catalog.num_barcodes(),
            path.display()
        );
        Ok(set)
    }

    /// Sample group of a canonical barcode
    #[inline(always)]
    pub fn group_of(&self, barcode: &str) -> Option<&str> {
        self.map_barcode_to_group.get(barcode).map(|g| g.as_str())
    }

    /// Distinct group labels that own at least one barcode, sorted
    pub fn labels(&self) -> Vec<&str> {
        let labels: BTreeSet<&str> = self
            .map_barcode_to_group
            .values()
            .map(|g| g.as_str())
            .collect();
        labels.into_iter().collect()
    }

    pub fn catalog(&self) -> &BarcodeCatalog {
        &self.catalog
    }

    pub fn num_reassigned(&self) -> usize {
        self.num_reassigned
    }
}
