pub mod demux;
pub mod stats;

pub use demux::Demux;
pub use demux::DemuxParams;
pub use demux::SampleType;
pub use stats::DemuxStats;
