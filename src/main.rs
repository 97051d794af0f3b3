use std::process::ExitCode;

use bamdemux::cmd::DemuxCMD;
use bamdemux::runtime::Config;
use clap::Parser;

/// Write paired end reads from an unmapped BAM file to per-sample FASTQ files,
/// keeping only reads whose barcodes match within one mismatch
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(flatten)]
    demux: DemuxCMD,
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();
    cli.config.init_logging();

    if let Err(e) = cli.demux.try_execute() {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }
    return ExitCode::SUCCESS;
}
