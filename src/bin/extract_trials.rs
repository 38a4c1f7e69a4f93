use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mitrials::{extract, io::write_trials, EventCodeTable, ExtractConfig, Recording};

#[derive(Parser, Debug)]
#[command(name = "extract_trials", about = "Extract labelled motor-imagery trials")]
struct Args {
    /// Recording in safetensors layout (s, etyp, epos, edur[, artifacts])
    #[arg(long)]
    input: PathBuf,

    /// trials.safetensors output path
    #[arg(long)]
    output: PathBuf,

    /// Channel rows to extract (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "7,9,11")]
    channels: Vec<usize>,

    /// Start-of-trial event code
    #[arg(long, default_value_t = 768)]
    start_code: i32,

    /// Only keep trials valid on every channel
    #[arg(long)]
    strict: bool,

    /// JSON file replacing the default code table, e.g. {"769": "left"}
    #[arg(long)]
    table: Option<PathBuf>,

    /// Extra or overriding label, CODE=NAME (repeatable)
    #[arg(long = "label")]
    labels: Vec<String>,

    /// trace, debug, info, warn or error
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn parse_label(spec: &str) -> Result<(i32, String)> {
    let Some((code, name)) = spec.split_once('=') else {
        bail!("label '{spec}' is not CODE=NAME");
    };
    let code: i32 = code.trim().parse().with_context(|| format!("bad event code in '{spec}'"))?;
    Ok((code, name.trim().to_string()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut table = match &args.table {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            EventCodeTable::from_json_str(&text)?
        }
        None => EventCodeTable::default(),
    };
    for spec in &args.labels {
        let (code, name) = parse_label(spec)?;
        table.insert(code, name);
    }

    let rec = Recording::load(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    info!(
        channels = rec.n_channels(),
        samples = rec.n_samples(),
        events = rec.events.len(),
        sfreq = rec.sfreq,
        "loaded recording"
    );

    let cfg = ExtractConfig {
        start_code: args.start_code,
        channels: args.channels.clone(),
        strict: args.strict,
        table,
    };
    let sets = extract(&rec, &cfg).into_trial_sets();

    let markers = rec.events.count(cfg.start_code);
    for (ch, set) in cfg.channels.iter().zip(&sets) {
        let secs = set
            .trials()
            .first()
            .map(|t| rec.samples_to_secs(t.len()))
            .unwrap_or(0.0);
        println!(
            "channel {ch:>3}: {:>4}/{markers} trials, {secs:.2} s each, {:?}",
            set.len(),
            set.class_counts()
        );
    }

    write_trials(&sets, &cfg.channels, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("Written → {}", args.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_spec_parses() {
        assert_eq!(parse_label("1072=eyes").unwrap(), (1072, "eyes".to_string()));
        assert_eq!(parse_label(" 769 = L ").unwrap(), (769, "L".to_string()));
        assert!(parse_label("769").is_err());
        assert!(parse_label("x=left").is_err());
    }

    fn args(extra: &[&str]) -> Result<Args, clap::Error> {
        let base = ["extract_trials", "--input", "a.npz", "--output", "t.safetensors"];
        Args::try_parse_from(base.iter().chain(extra))
    }

    #[test]
    fn log_level_is_validated() {
        assert_eq!(args(&[]).unwrap().log_level, Level::INFO);
        assert_eq!(args(&["--log-level", "DEBUG"]).unwrap().log_level, Level::DEBUG);
        assert!(args(&["--log-level", "loud"]).is_err());
    }

    #[test]
    fn channels_are_comma_separated() {
        assert_eq!(args(&[]).unwrap().channels, vec![7, 9, 11]);
        assert_eq!(args(&["--channels", "0,21"]).unwrap().channels, vec![0, 21]);
    }
}
