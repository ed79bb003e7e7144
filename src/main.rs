use clap::{Parser, Subcommand};
use haml2erb::{convert_with_stats, Conversion, Error, Result};
use serde::Serialize;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "haml2erb")]
#[command(about = "Convert HAML templates to ERB")]
struct Cli {
    /// Log conversion details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert .haml files to .erb
    Convert {
        /// Path to .haml file or directory
        #[arg(required_unless_present = "stdin")]
        path: Option<PathBuf>,

        /// Read one template from stdin and print the result
        #[arg(long)]
        stdin: bool,

        /// Print a JSON report with the output and conversion statistics
        #[arg(long)]
        json: bool,

        /// Convert without writing any file
        #[arg(long)]
        dry_run: bool,

        /// Remove each .haml file once its .erb file is written
        #[arg(long, conflicts_with = "dry_run")]
        delete_source: bool,
    },
}

/// Where converted files go and what happens to the sources.
#[derive(Debug, Clone, Copy)]
struct WriteOptions {
    dry_run: bool,
    delete_source: bool,
}

/// One converted file in the `--json` report.
#[derive(Serialize)]
struct FileReport {
    source: PathBuf,
    output: PathBuf,
    written: bool,
    #[serde(flatten)]
    conversion: Conversion,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        print_error(&err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            path,
            stdin,
            json,
            dry_run,
            delete_source,
        } => {
            if stdin {
                return convert_stdin(json);
            }
            let path = path.ok_or(Error::MissingInput)?;
            let options = WriteOptions {
                dry_run,
                delete_source,
            };
            convert_path(&path, options, json)
        }
    }
}

/// Stderr logging; `warn` unless `--verbose` or `RUST_LOG` says otherwise.
fn init_tracing(verbose: bool) {
    let default = if verbose { "haml2erb=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_filter(filter),
        )
        .init();
}

fn convert_stdin(json_output: bool) -> Result<()> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| Error::io("<stdin>", e))?;

    let conversion = convert_with_stats(&source);
    if json_output {
        println!("{}", serde_json::to_string(&conversion)?);
    } else {
        print!("{}", conversion.erb);
    }
    Ok(())
}

fn convert_path(path: &Path, options: WriteOptions, json_output: bool) -> Result<()> {
    let start = Instant::now();

    let sources = if path.is_file() {
        if !is_haml(path) {
            return Err(Error::NotHaml(path.to_path_buf()));
        }
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        let sources = collect_templates(path);
        if sources.is_empty() {
            return Err(Error::NoTemplates(path.to_path_buf()));
        }
        sources
    } else {
        return Err(Error::io(path, io::Error::from(io::ErrorKind::NotFound)));
    };

    let mut reports = Vec::with_capacity(sources.len());
    for source in &sources {
        reports.push(convert_file(source, options)?);
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    print_summary(reports.len(), options.dry_run, start.elapsed());
    Ok(())
}

/// Every `.haml` file below `dir`, in file-name order.
fn collect_templates(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_haml(e.path()))
        .map(|e| e.into_path())
        .collect()
}

fn convert_file(path: &Path, options: WriteOptions) -> Result<FileReport> {
    let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let conversion = convert_with_stats(&source);
    let output = output_path(path);

    debug!(
        source = %path.display(),
        frames = conversion.stats.frames_opened,
        passthrough = conversion.stats.passthrough_lines,
        "converted"
    );

    if !options.dry_run {
        fs::write(&output, &conversion.erb).map_err(|e| Error::io(&output, e))?;
        if options.delete_source {
            fs::remove_file(path).map_err(|e| Error::io(path, e))?;
            info!(source = %path.display(), "removed source");
        }
    }
    print_converted(&output.display().to_string(), options.dry_run);

    Ok(FileReport {
        source: path.to_path_buf(),
        output,
        written: !options.dry_run,
        conversion,
    })
}

fn is_haml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "haml")
}

/// `show.html.haml` -> `show.html.erb`, `_row.haml` -> `_row.erb`
fn output_path(path: &Path) -> PathBuf {
    path.with_extension("erb")
}

fn print_converted(path: &str, dry_run: bool) {
    let mark = if dry_run { "·" } else { "✓" };
    if io::stderr().is_terminal() {
        eprintln!("  \x1b[32m{}\x1b[0m {}", mark, path);
    } else {
        eprintln!("  {} {}", mark, path);
    }
}

fn print_summary(count: usize, dry_run: bool, elapsed: std::time::Duration) {
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "file" } else { "files" };
    let verb = if dry_run { "Checked" } else { "Converted" };

    if io::stderr().is_terminal() {
        eprintln!("\n\x1b[1m✨ {} {} {} in {}\x1b[0m", verb, count, files_word, time_str);
    } else {
        eprintln!("\n✨ {} {} {} in {}", verb, count, files_word, time_str);
    }
}

fn print_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("\x1b[1;31merror:\x1b[0m {}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
