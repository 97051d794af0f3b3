pub mod catalog;
pub mod sample_barcode_set;
pub mod resolver;
pub mod trim_pairwise;

pub use catalog::BarcodeCatalog;
pub use sample_barcode_set::SampleBarcodeSet;
pub use resolver::CompositeBarcodeResolver;
pub use resolver::ResolvedBarcode;
pub use trim_pairwise::AdapterTrimmer;
