// This software is released under the MIT license.
// See file LICENSE for full license details.
use log::debug;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::runtime::Error;

/// Symbols a barcode position may be substituted with
pub const BARCODE_ALPHABET: [u8; 5] = *b"ACGTN";

///////////////////////////////
/// Error-tolerant lookup from any observed spelling of a barcode to its canonical spelling.
///
/// Every barcode is registered together with all of its single-substitution variants over
/// [`BARCODE_ALPHABET`]. Entries are inserted in order; when two barcodes share a variant,
/// the barcode inserted last owns it.
#[derive(Clone, Debug, Default)]
pub struct BarcodeCatalog {
    //Canonical barcodes, in insertion order
    barcode_list: Vec<String>,

    //Observed spelling -> index in barcode_list
    seq2barcode: FxHashMap<Vec<u8>, usize>,

    //Entries taken over from a different canonical barcode
    num_collisions: usize,
}

impl BarcodeCatalog {
    pub fn new() -> BarcodeCatalog {
        BarcodeCatalog::default()
    }

    pub fn from_barcodes<I, S>(barcodes: I) -> BarcodeCatalog
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = BarcodeCatalog::new();
        for bc in barcodes {
            catalog.add_bc(bc.as_ref());
        }
        catalog
    }

    ///////////////////////////////
    /// Register a barcode and all its single-substitution variants
    pub fn add_bc(&mut self, sequence: &str) {
        let bc_index = self.barcode_list.len();
        self.barcode_list.push(sequence.to_string());

        let bytes = sequence.as_bytes();
        self.insert(bytes.to_vec(), bc_index);

        let mut variant = bytes.to_vec();
        for (i, &orig) in bytes.iter().enumerate() {
            for &base in BARCODE_ALPHABET.iter() {
                if base != orig {
                    variant[i] = base;
                    self.insert(variant.clone(), bc_index);
                }
            }
            variant[i] = orig;
        }
    }

    fn insert(&mut self, spelling: Vec<u8>, bc_index: usize) {
        if let Some(prev) = self.seq2barcode.insert(spelling, bc_index) {
            if self.barcode_list[prev] != self.barcode_list[bc_index] {
                self.num_collisions += 1;
            }
        }
    }

    ///////////////////////////////
    /// Canonical barcode for an observed spelling, if it is within one substitution of a registered barcode
    #[inline(always)]
    pub fn get(&self, observed: &[u8]) -> Option<&str> {
        self.seq2barcode
            .get(observed)
            .map(|&i| self.barcode_list[i].as_str())
    }

    pub fn num_barcodes(&self) -> usize {
        self.barcode_list.len()
    }

    /// Number of distinct spellings that resolve to some barcode
    pub fn num_spellings(&self) -> usize {
        self.seq2barcode.len()
    }

    pub fn num_collisions(&self) -> usize {
        self.num_collisions
    }

    pub fn barcodes(&self) -> &[String] {
        &self.barcode_list
    }

    ///////////////////////////////
    /// Read a flat list of barcodes, one per line
    pub fn from_path(path: &Path) -> Result<BarcodeCatalog, Error> {
        let list = read_barcode_list(path)?;
        let catalog = BarcodeCatalog::from_barcodes(&list);
        debug!(
            "Loaded {} barcodes ({} spellings) from {}",
            catalog.num_barcodes(),
            catalog.num_spellings(),
            path.display()
        );
        Ok(catalog)
    }
}

///////////////////////////////
/// Read one barcode per line. Blank lines are skipped
pub fn read_barcode_list(path: &Path) -> Result<Vec<String>, Error> {
    let file = open_definition_file(path)?;
    parse_barcode_list(BufReader::new(file), path)
}

pub(crate) fn open_definition_file(path: &Path) -> Result<File, Error> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    File::open(path).map_err(|e| Error::file_not_valid(path, Some(e.to_string())))
}

pub fn parse_barcode_list(src: impl BufRead, path: &Path) -> Result<Vec<String>, Error> {
    let mut list = Vec::new();
    for line in src.lines() {
        let line = line.map_err(|e| Error::file_not_valid(path, Some(e.to_string())))?;
        let bc = line.trim();
        if !bc.is_empty() {
            list.push(bc.to_string());
        }
    }
    if list.is_empty() {
        return Err(Error::file_not_valid(path, Some("no barcodes listed")));
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_all_substitutions() {
        let bc = "ACGTACGT";
        let catalog = BarcodeCatalog::from_barcodes([bc]);

        assert_eq!(catalog.get(bc.as_bytes()), Some(bc));
        assert_eq!(catalog.num_spellings(), 1 + bc.len() * 4);

        let mut n_variants = 0;
        for i in 0..bc.len() {
            for &base in BARCODE_ALPHABET.iter() {
                let mut variant = bc.as_bytes().to_vec();
                if variant[i] == base {
                    continue;
                }
                variant[i] = base;
                assert_eq!(catalog.get(&variant), Some(bc));
                n_variants += 1;
            }
        }
        assert_eq!(n_variants, 32);
    }

    #[test]
    fn test_two_substitutions_miss() {
        let catalog = BarcodeCatalog::from_barcodes(["ACGTACGT"]);
        assert_eq!(catalog.get(b"TTGTACGT"), None);
        assert_eq!(catalog.get(b"ACGTACG"), None);
    }

    #[test]
    fn test_shared_variant_goes_to_last_inserted() {
        // AAAAAAAA and AAAAAAAC share the variant AAAAAAAG
        let catalog = BarcodeCatalog::from_barcodes(["AAAAAAAA", "AAAAAAAC"]);
        assert_eq!(catalog.get(b"AAAAAAAG"), Some("AAAAAAAC"));

        let catalog = BarcodeCatalog::from_barcodes(["AAAAAAAC", "AAAAAAAA"]);
        assert_eq!(catalog.get(b"AAAAAAAG"), Some("AAAAAAAA"));
        assert!(catalog.num_collisions() > 0);
    }

    #[test]
    fn test_distant_barcodes_do_not_collide() {
        let catalog = BarcodeCatalog::from_barcodes(["AAAAAAAA", "CCCCCCCC"]);
        assert_eq!(catalog.num_collisions(), 0);
        assert_eq!(catalog.num_spellings(), 2 * 33);
    }

    #[test]
    fn test_parse_barcode_list_skips_blank_lines() {
        let src = "ACGTACGT\n\n  TTTTTTTT  \n";
        let list = parse_barcode_list(src.as_bytes(), Path::new("r2.txt")).unwrap();
        assert_eq!(list, vec!["ACGTACGT".to_string(), "TTTTTTTT".to_string()]);
    }

    #[test]
    fn test_parse_empty_barcode_list() {
        let res = parse_barcode_list("\n".as_bytes(), Path::new("r2.txt"));
        assert!(matches!(res, Err(Error::FileNotValid { .. })));
    }
}
