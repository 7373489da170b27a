use anyhow::Context;
use clap::{ArgAction, Parser};
use is_terminal::IsTerminal;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;

use logsift::config::{self, ErrorStrategy, ExtractorSpec, MonitorConfig, RulesFile};
use logsift::feed::FeedFormat;
use logsift::history;
use logsift::monitor::LogMonitor;
use logsift::render::{OutputFormat, RenderSink, ScreenSink, WriteSink};

#[derive(Parser)]
#[command(name = "logsift")]
#[command(about = "Extract live status values from streaming log output")]
#[command(version = "0.3.0")]
struct Args {
    /// Input log files (default: stdin)
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Extraction rule as NAME=PATTERN (or a bare PATTERN)
    #[arg(short = 'e', long = "extract", action = ArgAction::Append, value_name = "NAME=PATTERN")]
    extract: Vec<String>,

    /// Preset rule key (error, warning, progress, epoch, loss, accuracy)
    #[arg(short = 'p', long = "preset", action = ArgAction::Append, value_name = "KEY")]
    preset: Vec<String>,

    /// YAML rules file with extractor definitions
    #[arg(short = 'f', long = "rules", value_name = "FILE")]
    rules_file: Option<PathBuf>,

    /// History payload to replay before the live feed
    #[arg(long = "history", value_name = "FILE")]
    history_file: Option<PathBuf>,

    /// Number of trailing history lines to replay
    #[arg(long, default_value = "50", value_name = "N")]
    history_limit: usize,

    /// Feed configuration payload gating history loading
    #[arg(long = "feed-config", value_name = "FILE")]
    feed_config: Option<PathBuf>,

    /// Live input format
    #[arg(long = "input-format", value_enum, default_value = "raw")]
    input_format: FeedFormat,

    /// Output format for extraction rows
    #[arg(long = "format", value_enum, default_value = "table")]
    format: OutputFormat,

    /// Output file for extraction rows (default: stdout)
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,

    /// Redraw a live dashboard instead of appending output
    #[arg(long)]
    screen: bool,

    /// Do not echo log lines
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Log lines kept in the dashboard window
    #[arg(long, default_value = "500", value_name = "N")]
    window_lines: usize,

    /// Debug mode - show processing details
    #[arg(long)]
    debug: bool,

    /// Fail on first error instead of skipping lines
    #[arg(long)]
    fail_fast: bool,

    /// Maximum line length
    #[arg(long, default_value = "1048576")] // 1MB
    max_line_length: usize,

    /// Buffer size for I/O
    #[arg(long, default_value = "65536")] // 64KB
    buffer_size: usize,
}

impl Args {
    fn validate(&self) -> Result<(), String> {
        if self.extract.is_empty() && self.preset.is_empty() && self.rules_file.is_none() {
            return Err(
                "Must provide at least one extractor (--extract, --preset, or --rules)"
                    .to_string(),
            );
        }
        if self.screen && self.output_file.is_some() {
            return Err(
                "--screen draws to the terminal and cannot be combined with --output".to_string(),
            );
        }
        Ok(())
    }

    /// Collect extractor definitions in column order: rules file first,
    /// then presets, then --extract rules.
    fn specs(&self) -> anyhow::Result<Vec<ExtractorSpec>> {
        let mut specs = Vec::new();

        if let Some(path) = &self.rules_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read rules file '{}'", path.display()))?;
            specs.extend(RulesFile::parse(&content)?.extractors);
        }

        for key in &self.preset {
            specs.push(ExtractorSpec {
                preset: Some(key.clone()),
                active: true,
                ..Default::default()
            });
        }

        for rule in &self.extract {
            let (name, pattern) = match rule.split_once('=') {
                Some((name, pattern)) => (Some(name.to_string()), pattern.to_string()),
                None => (None, rule.clone()),
            };
            specs.push(ExtractorSpec {
                name,
                pattern: Some(pattern),
                active: true,
                ..Default::default()
            });
        }

        Ok(specs)
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("logsift: {}", e);
        process::exit(1);
    }

    match run(args) {
        Ok(matched_any) => {
            if !matched_any {
                // Nothing ever matched - same convention as "no output"
                process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("logsift: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(args: Args) -> anyhow::Result<bool> {
    let specs = args.specs()?;
    let session = config::session_from_specs(&specs)?;

    let config = MonitorConfig {
        error_strategy: if args.fail_fast {
            ErrorStrategy::FailFast
        } else {
            ErrorStrategy::Skip
        },
        debug: args.debug,
        buffer_size: args.buffer_size,
        max_line_length: args.max_line_length,
        history_limit: args.history_limit,
        window_lines: args.window_lines,
        feed_format: args.input_format,
    };

    let mut sink: Box<dyn RenderSink> = if args.screen {
        let use_colors = io::stdout().is_terminal();
        Box::new(ScreenSink::new(
            Box::new(io::stdout()),
            config.window_lines,
            use_colors,
        ))
    } else {
        let rows: Box<dyn Write> = match &args.output_file {
            Some(path) => {
                let file = File::create(path).with_context(|| {
                    format!("Failed to create output file '{}'", path.display())
                })?;
                Box::new(io::BufWriter::with_capacity(args.buffer_size, file))
            }
            None => Box::new(io::stdout()),
        };
        let echo: Option<Box<dyn Write>> = if args.quiet {
            None
        } else {
            Some(Box::new(io::stdout()))
        };
        Box::new(WriteSink::new(args.format, rows, echo))
    };

    let mut monitor = LogMonitor::new(session, config);

    // History replay runs to completion before any live line is read
    if let Some(path) = &args.history_file {
        if history_load_enabled(args.feed_config.as_deref()) {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    let lines = history::parse_history(&content);
                    let replayed = monitor.replay_history(&lines, sink.as_mut())?;
                    if args.debug {
                        eprintln!("logsift: replayed {} history lines", replayed);
                    }
                }
                Err(e) => {
                    eprintln!(
                        "logsift: failed to read history file '{}': {}; continuing without history",
                        path.display(),
                        e
                    );
                }
            }
        } else if args.debug {
            eprintln!("logsift: history loading disabled by feed config");
        }
    }

    if args.inputs.is_empty() {
        if io::stdin().is_terminal() {
            eprintln!("logsift: reading from stdin");
        }
        let input = BufReader::with_capacity(args.buffer_size, io::stdin());
        monitor.process_stream(input, sink.as_mut())?;
    } else {
        for path in &args.inputs {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file '{}'", path.display()))?;
            let input = BufReader::with_capacity(args.buffer_size, file);
            monitor.process_stream(input, sink.as_mut())?;
        }
    }

    let stats = monitor.stats();
    if args.debug {
        eprintln!("Final statistics:");
        eprintln!("  Lines ingested: {}", stats.lines_ingested);
        eprintln!("  Lines matched: {}", stats.lines_matched);
        eprintln!("  Renders: {}", stats.renders);
        eprintln!("  Errors: {}", stats.errors);
        eprintln!("  Processing time: {:?}", stats.processing_time);
    }

    Ok(stats.renders > 0)
}

fn history_load_enabled(config_path: Option<&Path>) -> bool {
    match config_path {
        None => true,
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => history::history_enabled(&content),
            Err(e) => {
                // An unreadable feed config still loads history, matching
                // the upstream fallback
                eprintln!(
                    "logsift: failed to read feed config '{}': {}; loading history anyway",
                    path.display(),
                    e
                );
                true
            }
        },
    }
}
