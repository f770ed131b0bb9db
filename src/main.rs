use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use gengou::{
    BuildReport, DateArray, EraRegistry, EraTable, ParsedEraDate, build_registry, julian_to_gregorian,
    load_sources, parse_era_date, resolve,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const OUTPUT_DIR: &str = "output";
const SOURCES_DIR: &str = "sources";
const TABLE_NAME: &str = "era-info";

#[derive(Parser)]
#[command(name = "gengou", about = "Japanese era date to Gregorian date converter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the era table from scraped sources → output/era-info.{json,ts}
    Build {
        /// Directory holding eras.json, readings.json and pages/
        #[arg(long, default_value = SOURCES_DIR)]
        sources: PathBuf,
        #[arg(long, default_value = OUTPUT_DIR)]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Convert era dates, e.g. "令和2年5月1日", "文政13年閏3月1日"
    Convert {
        #[arg(required = true)]
        text: Vec<String>,
        /// Generated table (JSON or TS module)
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Convert a proleptic Julian date to the Gregorian calendar
    Julian {
        #[arg(allow_negative_numbers = true)]
        year: i32,
        month: u32,
        day: u32,
    },
    /// Print one era's record from the generated table
    Info {
        era: String,
        #[arg(long)]
        table: Option<PathBuf>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            sources,
            out,
            format,
        } => run_build(&sources, &out, format),
        Command::Convert { text, table } => run_convert(&text, table.as_deref()),
        Command::Julian { year, month, day } => run_julian(year, month, day),
        Command::Info { era, table } => run_info(&era, table.as_deref()),
    }
}

/// Build diagnostics go through `tracing`; `RUST_LOG=debug` shows per-era progress.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Cannot install log subscriber: {e}");
    }
}

// ── Output formats ──────────────────────────────────────────────────

const TS_HEADER: &str = "// Generated by gengou. Do not edit by hand.

export type DateArray = [year: number, month: number, day: number];

// Keys are month numbers. An intercalary month is the negated number of the
// month it follows, so the order of a year with 閏4月 is ..., 4, -4, 5, ...
type Months = Record<number, DateArray>;

type EraInfo = {
  reading: string;
  yomi: string;
  start: DateArray;
  end: DateArray;
  years: Record<number, Months>;
};

";

const TS_EXPORT: &str = "export const eraInfo: Record<string, EraInfo> = ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    /// TypeScript module with type declarations
    Ts,
}

impl OutputFormat {
    fn file_name(self) -> String {
        match self {
            Self::Json => format!("{TABLE_NAME}.json"),
            Self::Ts => format!("{TABLE_NAME}.ts"),
        }
    }

    fn render(self, table: &EraTable) -> String {
        let json = serde_json::to_string(table).unwrap_or_else(|e| {
            eprintln!("Cannot serialize era table: {e}");
            std::process::exit(1);
        });
        match self {
            Self::Json => json,
            Self::Ts => format!("{TS_HEADER}{TS_EXPORT}{json}\n"),
        }
    }
}

// ── Table file helpers ──────────────────────────────────────────────

fn default_table_path() -> PathBuf {
    Path::new(OUTPUT_DIR).join(OutputFormat::Json.file_name())
}

fn read_table(path: Option<&Path>) -> EraRegistry {
    let path = path.map_or_else(default_table_path, Path::to_path_buf);
    let text = std::fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("Cannot read {}: {e}", path.display());
        eprintln!("Run `gengou build` first to generate the table.");
        std::process::exit(1);
    });
    // A TS module is the JSON table behind a fixed export line.
    let json = text.split_once(TS_EXPORT).map_or(text.as_str(), |(_, body)| body);
    let table: EraTable = serde_json::from_str(json).unwrap_or_else(|e| {
        eprintln!("Cannot parse {}: {e}", path.display());
        eprintln!("The table may be from an older format. Re-run `gengou build`.");
        std::process::exit(1);
    });
    EraRegistry::new(table)
}

fn write_table(out: &Path, format: OutputFormat, table: &EraTable) {
    std::fs::create_dir_all(out).unwrap_or_else(|e| {
        eprintln!("Cannot create {}: {e}", out.display());
        std::process::exit(1);
    });
    let path = out.join(format.file_name());
    let text = format.render(table);
    std::fs::write(&path, &text).unwrap_or_else(|e| {
        eprintln!("Cannot write {}: {e}", path.display());
        std::process::exit(1);
    });
    eprintln!("  {} ({} bytes)", path.display(), text.len());
}

fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Cannot serialize result: {e}");
            std::process::exit(1);
        }
    }
}

// ── BUILD ───────────────────────────────────────────────────────────

fn run_build(sources: &Path, out: &Path, format: OutputFormat) {
    eprintln!("Loading sources from {}", sources.display());
    let source_set = load_sources(sources).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });
    eprintln!(
        "  {} eras, {} readings, {} pages",
        source_set.eras.len(),
        source_set.readings.len(),
        source_set.pages.len()
    );

    let report = build_registry(&source_set);
    print_summary(&report);

    eprintln!("Writing:");
    write_table(out, format, report.registry.table());
}

fn print_summary(report: &BuildReport) {
    let incomplete = report.incomplete_eras();
    eprintln!(
        "Built {} eras: {} complete, {} incomplete, {} warnings",
        report.registry.len(),
        report.registry.len() - incomplete.len(),
        incomplete.len(),
        report.warnings().count()
    );
    if !incomplete.is_empty() {
        eprintln!("  incomplete: {}", incomplete.join(", "));
    }
}

// ── CONVERT ─────────────────────────────────────────────────────────

#[derive(serde::Serialize)]
struct Conversion<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parsed: Option<ParsedEraDate>,
    gregorian: Option<DateArray>,
}

fn run_convert(texts: &[String], table: Option<&Path>) {
    let registry = read_table(table);

    let results: Vec<Conversion> = texts
        .iter()
        .map(|text| {
            let parsed = parse_era_date(text, &registry);
            let gregorian = parsed.as_ref().and_then(|p| resolve(p, &registry));
            Conversion {
                input: text,
                parsed,
                gregorian,
            }
        })
        .collect();

    let failed = results.iter().filter(|r| r.gregorian.is_none()).count();
    if failed > 0 {
        eprintln!("{failed} of {} expression(s) did not resolve", results.len());
    }
    print_json(&results);
}

// ── JULIAN ──────────────────────────────────────────────────────────

fn run_julian(year: i32, month: u32, day: u32) {
    match julian_to_gregorian(DateArray(year, month, day)) {
        Some(date) => println!("{date}"),
        None => {
            eprintln!("Not a convertible Julian date: {year}/{month}/{day}");
            std::process::exit(1);
        }
    }
}

// ── INFO ────────────────────────────────────────────────────────────

fn run_info(era: &str, table: Option<&Path>) {
    let registry = read_table(table);
    let Some(info) = registry.era(era) else {
        eprintln!("Unknown era: {era}");
        let names: Vec<&str> = registry.iter().map(|(name, _)| name).collect();
        eprintln!("  available eras: {}", names.join(", "));
        std::process::exit(1);
    };
    eprintln!(
        "{era}: {} years, {}",
        info.years.len(),
        if info.is_complete() { "complete" } else { "incomplete" }
    );
    print_json(info);
}
