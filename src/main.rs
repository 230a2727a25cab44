use anyhow::Context;
use clap::Parser;
use icon_cleaner::cli::{self, CliArgs};
use icon_cleaner::logger;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    logger::init(args.verbose);

    let report = cli::run(&args)
        .with_context(|| format!("failed to clean {}", args.input_path().display()))?;
    println!("{}", report);

    Ok(())
}
