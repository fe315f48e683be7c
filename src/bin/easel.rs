use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "easel", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render canvases and print their `url(...)` values.
    Render(RenderArgs),
    /// Validate a document and every action list without drawing.
    Check(CheckArgs),
    /// Print the renderer calls a canvas makes, as JSON.
    Trace(TraceArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Only render this canvas (default: all).
    #[arg(long)]
    canvas: Option<String>,

    /// Directory generated PNGs are written to.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Backend to use (default: the document's setting).
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct TraceArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Canvas to trace.
    #[arg(long)]
    canvas: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
    Recording,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Check(args) => cmd_check(args),
        Command::Trace(args) => cmd_trace(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "easel=debug",
        _ => "easel=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct Loaded {
    settings: easel::Settings,
    canvases: std::collections::BTreeMap<String, easel::Canvas>,
}

/// Reads a document and builds its canvases. Document and environment paths are relative to
/// the document's directory.
fn load(in_path: &Path, out_dir: Option<&Path>) -> anyhow::Result<Loaded> {
    let doc = easel::Document::from_path(in_path)
        .with_context(|| format!("load document '{}'", in_path.display()))?;
    let root = in_path.parent().unwrap_or_else(|| Path::new("."));
    let mut settings = doc.settings.clone().with_env().relative_to(root);
    if let Some(dir) = out_dir {
        settings.generated_images_path = dir.to_path_buf();
    }

    let registry = easel::Registry::with_builtins();
    let canvases = doc.build(&settings, &registry)?;
    Ok(Loaded { settings, canvases })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let Loaded {
        mut settings,
        canvases,
    } = load(&args.in_path, args.out_dir.as_deref())?;
    if let Some(choice) = args.backend {
        settings.backend = match choice {
            BackendChoice::Cpu => easel::BackendKind::Cpu,
            BackendChoice::Recording => easel::BackendKind::Recording,
        };
    }

    let selected: Vec<(&String, &easel::Canvas)> = match &args.canvas {
        Some(name) => {
            let canvas = canvases
                .get_key_value(name)
                .with_context(|| format!("no canvas named '{name}'"))?;
            vec![canvas]
        }
        None => canvases.iter().collect(),
    };

    let mut renderer = easel::create_renderer(settings.backend);
    for (name, canvas) in selected {
        let value = canvas
            .value(renderer.as_mut(), &settings)
            .with_context(|| format!("render canvas '{name}'"))?;
        println!("{name}: {value}");
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let Loaded { canvases, .. } = load(&args.in_path, None)?;
    for (name, canvas) in &canvases {
        canvas
            .check()
            .with_context(|| format!("check canvas '{name}'"))?;
    }
    eprintln!("ok: {} canvases", canvases.len());
    Ok(())
}

fn cmd_trace(args: TraceArgs) -> anyhow::Result<()> {
    let Loaded { canvases, .. } = load(&args.in_path, None)?;
    let canvas = canvases
        .get(&args.canvas)
        .with_context(|| format!("no canvas named '{}'", args.canvas))?;

    let mut recorder = easel::RecordingRenderer::new();
    canvas.execute(&mut recorder)?;
    let json = serde_json::to_string_pretty(recorder.calls()).context("serialize calls")?;
    println!("{json}");
    Ok(())
}
