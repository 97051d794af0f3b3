pub mod bam;
pub mod fastq;
pub mod multiplexer;

pub use bam::BamReadSource;
pub use multiplexer::OutputMultiplexer;
