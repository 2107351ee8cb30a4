use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use methcov::{
    config::{BatchConfig, CatalogOptions, DepthThresholds},
    io::{write_csv, OutputFile},
    prelude::{BatchDriver, MethCovError, RegionCatalog, SampleOutput},
    reporting::Report,
};

const INFO: &str = "\
methcov: region-restricted CpG methylation summaries of coverage files
usage: methcov [--help] <subcommand>

Subcommands:

  run: filter every sample of a directory to the regions of a catalog,
       writing per-sample filtered records, per-region summaries and a
       batch summary.

  stats: whole-sample depth-thresholded methylation summaries.

";

#[derive(Parser)]
#[clap(name = "methcov")]
#[clap(about = INFO)]
struct Cli {
    /// increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct DepthArgs {
    /// minimum read depth of the lenient depth view
    #[arg(long, default_value_t = 2)]
    min_depth: u64,

    /// maximum read depth of both depth views
    #[arg(long, default_value_t = 100)]
    max_depth: u64,

    /// minimum read depth of the strict depth view
    #[arg(long, default_value_t = 5)]
    strict_min_depth: u64,
}

impl From<&DepthArgs> for DepthThresholds {
    fn from(args: &DepthArgs) -> Self {
        DepthThresholds {
            min_depth: args.min_depth,
            max_depth: args.max_depth,
            strict_min_depth: args.strict_min_depth,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    Run {
        /// a directory of (gzip-compressed) coverage files, named
        /// <source>_<subject>_<age>_<tissue>.<ext>
        #[arg(required = true)]
        samples: PathBuf,

        /// a CSV or TSV region catalog with name, chromosome, start_loc and end_loc columns
        #[arg(required = true)]
        catalog: PathBuf,

        /// directory for per-sample output files (the current directory if not specified)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// batch summary file (<output-dir>/summary.csv if not specified)
        #[arg(long)]
        summary: Option<PathBuf>,

        /// number of worker threads (all cores if not specified)
        #[arg(long)]
        threads: Option<usize>,

        /// tag CpG sites in file order, without sorting by position first
        #[arg(long)]
        no_sort: bool,

        /// remove a 'chr' prefix from catalog chromosome names
        #[arg(long)]
        strip_chr: bool,

        /// only process samples of this tissue (may be repeated)
        #[arg(long)]
        tissue: Vec<String>,

        #[command(flatten)]
        depth: DepthArgs,
    },
    Stats {
        /// one or more (gzip-compressed) coverage files
        #[arg(required = true)]
        coverage: Vec<PathBuf>,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// tag CpG sites in file order, without sorting by position first
        #[arg(long)]
        no_sort: bool,

        #[command(flatten)]
        depth: DepthArgs,
    },
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, if set, takes precedence
    let _ = pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Write one sample's filtered records and region summaries.
fn write_sample_outputs(output_dir: &Path, sample: &SampleOutput) -> Result<(), MethCovError> {
    let filtered = OutputFile::new(output_dir.join(sample.filtered_filename()));
    write_csv(&sample.filtered, &filtered)?;
    let regions = OutputFile::new(output_dir.join(sample.region_summary_filename()));
    write_csv(&sample.region_summaries, &regions)?;
    Ok(())
}

fn print_report(report: &Report) {
    if !report.is_empty() {
        eprint!("{}", report);
    }
}

/// Returns whether every sample succeeded.
fn run() -> Result<bool, MethCovError> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match &cli.command {
        Some(Commands::Run {
            samples,
            catalog,
            output_dir,
            summary,
            threads,
            no_sort,
            strip_chr,
            tissue,
            depth,
        }) => {
            let options = CatalogOptions {
                strip_chr_prefix: *strip_chr,
            };
            let catalog = RegionCatalog::from_path_with(catalog, &options)?;
            let config = BatchConfig {
                thresholds: depth.into(),
                presort: !*no_sort,
                threads: *threads,
                tissues: tissue.clone(),
            };
            let output_dir = output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&output_dir)?;

            let driver = BatchDriver::new(config, catalog);
            let (outcome, report) = driver
                .run(samples, |sample| write_sample_outputs(&output_dir, sample))?
                .into_parts();

            let summary_path = summary
                .clone()
                .unwrap_or_else(|| output_dir.join("summary.csv"));
            write_csv(&outcome.summaries, &OutputFile::new(summary_path))?;

            print_report(&report);
            eprintln!(
                "{} samples succeeded, {} failed, {} skipped",
                outcome.succeeded(),
                outcome.failed(),
                outcome.skipped.len()
            );
            Ok(outcome.failed() == 0)
        }
        Some(Commands::Stats {
            coverage,
            output,
            no_sort,
            depth,
        }) => {
            let config = BatchConfig {
                thresholds: depth.into(),
                presort: !*no_sort,
                ..Default::default()
            };
            let driver = BatchDriver::new(config, RegionCatalog::default());
            let (outcome, report) = driver.run_paths(coverage, |_| Ok(()))?.into_parts();

            let output_stream = output.as_ref().map_or(OutputFile::new_stdout(), |file| {
                OutputFile::new(file)
            });
            write_csv(&outcome.summaries, &output_stream)?;
            print_report(&report);
            Ok(outcome.failed() == 0)
        }
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    }
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
