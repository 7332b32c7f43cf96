use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use loglayout::{
    DeferredOpts, Layout, LayoutConfig, LogEvent, StreamTarget, WriterSink,
    collect_layouts,
};

#[derive(Parser, Debug)]
#[command(name = "loglayout", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render newline-delimited JSON events through a layout config.
    Render(RenderArgs),
    /// List every layout reachable from a config's root.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Layout config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Events as JSON lines. Reads stdin when omitted.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Render on a worker pool after precalculating on the reading thread.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Events per chunk (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Print a summary line to stderr when done.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Layout config JSON.
    #[arg(long)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn read_events(path: Option<&Path>) -> anyhow::Result<Vec<LogEvent>> {
    let reader: Box<dyn BufRead> = match path {
        Some(p) => Box::new(BufReader::new(
            File::open(p).with_context(|| format!("open events '{}'", p.display()))?,
        )),
        None => Box::new(std::io::stdin().lock()),
    };
    Ok(LogEvent::from_json_lines(reader)?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = LayoutConfig::from_path(&args.config)?;
    let layout = config
        .build_stream()
        .with_context(|| format!("build layout from '{}'", args.config.display()))?;
    let events = read_events(args.events.as_deref())?;

    let opts = DeferredOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
    };

    let stdout = BufWriter::new(std::io::stdout());
    let mut target = StreamTarget::new(layout, WriterSink::new(stdout));
    let context = LogEvent::default();
    target.open(&context)?;
    let stats = target.write_all(&events, &opts)?;
    target.close(&context)?;

    if args.stats {
        eprintln!(
            "events={} precalculated={} chunks={} lines={}",
            stats.events_total,
            stats.events_precalculated,
            stats.chunks,
            target.lines_written()
        );
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let config = LayoutConfig::from_path(&args.config)?;
    let root = config
        .build()
        .with_context(|| format!("build layout from '{}'", args.config.display()))?;

    let mut out = std::io::stdout().lock();
    for layout in collect_layouts(root.as_ref()) {
        writeln!(
            out,
            "{}\t{}\tstack_trace={}\tvolatile={}",
            layout.id(),
            layout.kind(),
            layout.stack_trace_usage(),
            layout.is_volatile()
        )?;
    }
    writeln!(
        out,
        "root\tstack_trace={}\tvolatile={}",
        root.stack_trace_usage(),
        root.is_volatile()
    )?;
    Ok(())
}
