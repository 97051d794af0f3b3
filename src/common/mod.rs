pub mod readpair;

pub use readpair::Mate;
pub use readpair::PairingCounts;
pub use readpair::ReadPair;
pub use readpair::ReadPairStream;
pub use readpair::ReadPairer;
pub use readpair::ReadRecord;
