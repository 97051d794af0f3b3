// This software is released under the MIT license.
// See file LICENSE for full license details.
use itertools::Itertools;
use log::warn;

use super::{BarcodeCatalog, SampleBarcodeSet};
use crate::common::ReadPair;
use crate::runtime::Error;

/// Length of every barcode segment
pub const BC_LEN: usize = 8;

/// Raw segments shorter than this have an N appended before the right-shifted lookup
pub const FULL_SEGMENT_LEN: usize = BC_LEN + 2;

#[inline(always)]
fn clamped(seq: &[u8], from: usize, to: usize) -> &[u8] {
    let to = to.min(seq.len());
    let from = from.min(to);
    &seq[from..to]
}

///////////////////////////////
/// Correct one raw barcode segment against a catalog.
///
/// The barcode is expected one base into the segment. If that does not match, the segment is
/// tried shifted one base left, then one base right. The right shift pads short segments with N.
pub fn resolve<'a>(segment: &[u8], catalog: &'a BarcodeCatalog) -> Option<&'a str> {
    if let Some(bc) = catalog.get(clamped(segment, 1, 1 + BC_LEN)) {
        return Some(bc);
    }
    if let Some(bc) = catalog.get(clamped(segment, 0, BC_LEN)) {
        return Some(bc);
    }

    let shifted = clamped(segment, 2, segment.len());
    if segment.len() < FULL_SEGMENT_LEN {
        let mut padded = Vec::with_capacity(shifted.len() + 1);
        padded.extend_from_slice(shifted);
        padded.push(b'N');
        catalog.get(&padded)
    } else {
        catalog.get(shifted)
    }
}

///////////////////////////////
/// Split a composite tag `seg1-seg2-seg3` into its three raw segments
pub fn split_composite_tag(tag: &str) -> Option<(&str, &str, &str)> {
    tag.split('-').collect_tuple()
}

///////////////////////////////
/// The corrected barcodes of one read pair, and the sample group it routes to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedBarcode<'a> {
    pub seg1: &'a str,
    pub seg2: &'a str,
    pub seg3: &'a str,
    pub group: &'a str,
}

impl ResolvedBarcode<'_> {
    /// The three canonical barcodes joined by commas
    pub fn cell_id(&self) -> String {
        [self.seg1, self.seg2, self.seg3].join(",")
    }
}

///////////////////////////////
/// Catalogs for all three barcode segments
#[derive(Clone, Debug)]
pub struct CompositeBarcodeResolver {
    samples: SampleBarcodeSet,
    seg2: BarcodeCatalog,
    seg3: BarcodeCatalog,
}

impl CompositeBarcodeResolver {
    pub fn new(
        samples: SampleBarcodeSet,
        seg2: BarcodeCatalog,
        seg3: BarcodeCatalog,
    ) -> CompositeBarcodeResolver {
        CompositeBarcodeResolver {
            samples,
            seg2,
            seg3,
        }
    }

    pub fn samples(&self) -> &SampleBarcodeSet {
        &self.samples
    }

    ///////////////////////////////
    /// Resolve a composite tag. Ok(None) if any segment fails to resolve
    pub fn resolve_tag(&self, tag: &str) -> Result<Option<ResolvedBarcode<'_>>, &'static str> {
        let (raw1, raw2, raw3) =
            split_composite_tag(tag).ok_or("expected three '-' separated segments")?;

        let Some(seg1) = resolve(raw1.as_bytes(), self.samples.catalog()) else {
            return Ok(None);
        };
        let Some(seg2) = resolve(raw2.as_bytes(), &self.seg2) else {
            return Ok(None);
        };
        let Some(seg3) = resolve(raw3.as_bytes(), &self.seg3) else {
            return Ok(None);
        };
        let Some(group) = self.samples.group_of(seg1) else {
            return Ok(None);
        };

        Ok(Some(ResolvedBarcode {
            seg1,
            seg2,
            seg3,
            group,
        }))
    }

    ///////////////////////////////
    /// Resolve the composite barcode carried by the second read of the pair
    pub fn resolve_pair(&self, pair: &ReadPair) -> Result<Option<ResolvedBarcode<'_>>, Error> {
        let tag = pair
            .r2
            .barcode
            .as_deref()
            .ok_or_else(|| Error::malformed_barcode_tag(&pair.r2.name, Some("tag missing")))?;
        self.resolve_tag(tag)
            .map_err(|msg| Error::malformed_barcode_tag(&pair.r2.name, Some(msg)))
    }

    ///////////////////////////////
    /// Report barcodes that resolve ambiguously. With `reject`, any ambiguity is an error
    pub fn check_ambiguity(&self, reject: bool) -> Result<(), Error> {
        let checks = [
            ("R1", self.samples.catalog().num_collisions()),
            ("R2", self.seg2.num_collisions()),
            ("R3", self.seg3.num_collisions()),
        ];

        let mut problems = Vec::new();
        for (name, n) in checks {
            if n > 0 {
                problems.push(format!(
                    "{} {} barcode spellings are shared by more than one barcode",
                    n, name
                ));
            }
        }
        if self.samples.num_reassigned() > 0 {
            problems.push(format!(
                "{} R1 barcodes are listed under more than one sample group",
                self.samples.num_reassigned()
            ));
        }

        if problems.is_empty() {
            return Ok(());
        }
        if reject {
            return Err(Error::ambiguous_barcodes(problems.join("; ")));
        }
        for p in problems {
            warn!("{}; the last definition wins", p);
        }
        Ok(())
    }
}
