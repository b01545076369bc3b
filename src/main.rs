use std::path::PathBuf;

use clap::Parser;
use log::info;

use chronotag::date::ExtractorSet;
use chronotag::writer;

#[derive(Parser)]
#[command(
    name = "chronotag",
    version,
    about = "Add EXIF capture dates to images based on filename patterns"
)]
struct Cli {
    /// Directory of images whose names encode a date
    source: PathBuf,

    /// Directory for the patched copies (created if absent)
    #[arg(short, long)]
    output: PathBuf,

    /// Increase verbosity (-v=DEBUG, -vv=TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    info!(
        "patching images from {} into {}",
        cli.source.display(),
        cli.output.display()
    );

    let extractors = ExtractorSet::standard();
    let report = writer::process_directory(&cli.source, &cli.output, &extractors)?;

    eprintln!("Done. {} entries:", report.total());
    eprintln!("  patched:           {}", report.patched);
    eprintln!("  already in output: {}", report.skipped_existing);
    eprintln!("  not regular files: {}", report.skipped_not_file);
    eprintln!("  no date in name:   {}", report.no_date);
    eprintln!("  invalid date:      {}", report.invalid_date);
    eprintln!("  errors:            {}", report.failed);
    Ok(())
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
