pub mod demux_cmd;

pub use demux_cmd::DemuxCMD;
