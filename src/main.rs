mod cli;

use clap::Parser;
use stock_feed::{
    clock::{Clock, FixedClock, SystemClock},
    dashboard::Dashboard,
    extract::{Extractor, ExtractorConfig},
    feed::{write_feed, FileFeed},
    loader::{preview, SheetLoader, WorkbookLoader},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ExtractArgs, InspectArgs, SheetArgs, ShowArgs};

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Command::Extract(args) => match args.now {
            Some(now) => extract(&args, FixedClock(now)),
            None => extract(&args, SystemClock),
        },
        Command::Inspect(args) => inspect(&args),
        Command::Show(args) => {
            show(&args);
            Ok(())
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn workbook(args: &SheetArgs) -> WorkbookLoader {
    WorkbookLoader::new(&args.input).with_sheet(args.sheet.clone())
}

fn extract<C: Clock>(args: &ExtractArgs, clock: C) -> eyre::Result<()> {
    let loader = workbook(&args.sheet);
    info!(path = %loader.path().display(), "reading workbook");
    let rows = loader.load()?;

    let config = ExtractorConfig::default().with_strict_headers(args.strict_headers);
    let extraction = Extractor::new(config, clock).extract(&rows)?;

    let report = extraction.report;
    info!(
        rows = report.rows_read,
        kept = report.kept,
        missing_identity = report.missing_identity,
        bad_date = report.bad_date,
        "processed records"
    );

    write_feed(&args.output, &extraction.feed)
}

fn inspect(args: &InspectArgs) -> eyre::Result<()> {
    let rows = workbook(&args.sheet).load()?;
    println!("{}", serde_json::to_string_pretty(&preview(&rows, args.rows))?);
    Ok(())
}

fn show(args: &ShowArgs) {
    let mut dashboard = Dashboard::new().with_search(args.search.clone());
    dashboard.load(&FileFeed::new(&args.feed));
    print!("{}", dashboard.render());
}
