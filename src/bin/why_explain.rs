use std::fs;
use std::io::Read;

use resolve_why::config::{ConfigOverrides, SummaryOverrides, WhyConfig};
use resolve_why::{MatchedRecord, WhyExplainer};
use tracing_subscriber::EnvFilter;

fn parse_arg(flag: &str) -> Option<String> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}

fn has_flag(flag: &str) -> bool {
    std::env::args().any(|arg| arg == flag)
}

fn print_help() {
    eprintln!(
        r#"why_explain - Explain engine match telemetry

USAGE:
    why_explain [OPTIONS]

OPTIONS:
    -c, --config <FILE>     Path to config file (TOML)
    -i, --input <FILE>      Read input from FILE instead of stdin
        --summarize         Input is a JSON array of matched records; print data source summaries
        --top <N>           Record IDs kept per data source, 1 to 10 [default: 10]
        --pretty            Pretty-print JSON output
    -h, --help              Print help

ENVIRONMENT:
    RESOLVE_WHY_CONFIG                      Path to config file
    RESOLVE_WHY_RELATIONS__LINK             Link feature type
    RESOLVE_WHY_SUMMARY__TOP_RECORD_LIMIT   Record IDs kept per data source
    RUST_LOG                                Log filter [default: warn]
"#
    );
}

fn read_input(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

fn main() -> anyhow::Result<()> {
    if has_flag("-h") || has_flag("--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Build CLI overrides
    let mut overrides = ConfigOverrides::default();
    if let Some(top) = parse_arg("--top") {
        overrides.summary = Some(SummaryOverrides {
            top_record_limit: Some(top.parse()?),
        });
    }

    // Load config: CLI > Env > File > Defaults
    let config_path = parse_arg("--config")
        .or_else(|| parse_arg("-c"))
        .or_else(|| std::env::var("RESOLVE_WHY_CONFIG").ok());
    let config = WhyConfig::load(config_path.as_deref(), overrides)?;
    let explainer = WhyExplainer::new(config);

    let input_path = parse_arg("--input").or_else(|| parse_arg("-i"));
    let input = read_input(input_path.as_deref())?;
    let pretty = has_flag("--pretty");

    let output = if has_flag("--summarize") {
        let records: Vec<MatchedRecord> = serde_json::from_str(&input)?;
        to_json(&explainer.summarize_records(&records), pretty)?
    } else {
        to_json(&explainer.explain_json(&input)?, pretty)?
    };
    println!("{output}");

    Ok(())
}
