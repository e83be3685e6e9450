//! `rowlink group` / `rowlink validate`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use rowlink_grouping::config::DEFAULT_OUTPUT_SUFFIX;
use rowlink_grouping::{output_path, Engine, GroupingConfig, Matcher, RunSummary, SequentialIds};

use crate::CliError;

pub struct GroupArgs {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub match_as: Option<String>,
    pub fields: Vec<String>,
    pub output: Option<PathBuf>,
    pub suffix: Option<String>,
    pub sequential_ids: bool,
    pub json: bool,
    pub quiet: bool,
}

enum Sink {
    Stdout,
    File(PathBuf),
}

pub fn cmd_group(args: GroupArgs) -> Result<(), CliError> {
    // Configuration is fully validated before the input is opened
    let (matcher, config_suffix) = resolve_matcher(&args)?;
    let suffix = args.suffix.clone().or(config_suffix).unwrap_or_else(|| DEFAULT_OUTPUT_SUFFIX.to_string());
    if suffix.trim().is_empty() {
        return Err(CliError::args("--suffix cannot be empty"));
    }

    let sink = match &args.output {
        Some(p) if p.as_os_str() == "-" => Sink::Stdout,
        Some(p) => Sink::File(p.clone()),
        None => Sink::File(output_path(&args.input, &suffix)),
    };

    if args.json && matches!(sink, Sink::Stdout) {
        return Err(CliError::args("--json cannot be combined with --output -")
            .with_hint("write the grouped CSV to a file, or drop --json"));
    }
    if let Sink::File(ref path) = sink {
        if same_file(&args.input, path) {
            return Err(CliError::args(format!(
                "output {} would overwrite the input",
                path.display()
            )));
        }
    }

    let input = File::open(&args.input)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", args.input.display())))?;
    let input = BufReader::new(input);

    let mut engine = if args.sequential_ids {
        Engine::with_minter(matcher, Box::new(SequentialIds::default()))
    } else {
        Engine::new(matcher)
    };

    let summary = match &sink {
        Sink::Stdout => engine.run(input, io::stdout().lock())?,
        Sink::File(path) => {
            let output = File::create(path)
                .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
            engine.run(input, BufWriter::new(output))?
        }
    };

    if !args.quiet {
        eprintln!("{}", human_summary(&summary, &sink));
    }

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let matcher = config.matcher();
    let fields: Vec<String> = matcher
        .fields()
        .entries()
        .iter()
        .map(|e| match e.matcher_type {
            Some(t) if matcher.is_composite() => format!("{}={t}", e.name),
            _ => e.name.clone(),
        })
        .collect();
    eprintln!(
        "valid: match_as {} on {} field(s): {}",
        matcher.match_as(),
        fields.len(),
        fields.join(", "),
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<GroupingConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config: {e}")))?;
    Ok(GroupingConfig::from_toml(&config_str)?)
}

/// Matcher from `--config` or from `--match-as` + `--field`, plus the
/// config's output suffix when there is one.
fn resolve_matcher(args: &GroupArgs) -> Result<(Matcher, Option<String>), CliError> {
    if let Some(ref path) = args.config {
        let (matcher, suffix) = load_config(path)?.into_parts();
        return Ok((matcher, Some(suffix)));
    }

    let Some(ref match_as) = args.match_as else {
        return Err(CliError::args("either --config or --match-as is required")
            .with_hint("e.g. --match-as email --field Email"));
    };

    let fields = args.fields.iter().map(|f| parse_field_arg(f));
    Ok((Matcher::new(match_as, fields)?, None))
}

/// `NAME` or `NAME=TYPE`.
fn parse_field_arg(arg: &str) -> (&str, Option<&str>) {
    match arg.split_once('=') {
        Some((name, t)) => (name, Some(t)),
        None => (arg, None),
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn human_summary(summary: &RunSummary, sink: &Sink) -> String {
    let mut line = format!(
        "grouped {} row(s) into {} group(s)",
        summary.rows_processed, summary.groups_created
    );
    if summary.conflicts > 0 {
        line.push_str(&format!(
            ", {} row(s) matched more than one existing group (first match kept)",
            summary.conflicts
        ));
    }
    if let Sink::File(path) = sink {
        line.push_str(&format!(", wrote {}", path.display()));
    }
    line
}
