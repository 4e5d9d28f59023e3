use birb_libscan::cli::Cli;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Cli::parse();

    birb_libscan::cli::main(&args)
}
