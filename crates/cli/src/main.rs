use anyhow::{bail, Context, Result};
use atlas_frame::{collect_export, PanelPath};
use atlas_graph::records::GridPos;
use atlas_graph::{
    find_path, AtlasSnapshot, BuildPolicy, SnapshotBuilder, TransformResolver, Vec2,
    BASE_RESOLUTION,
};
use atlas_memory::{ImageSource, RemoteReader};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "atlas")]
#[command(about = "Inspect a game's atlas panel from outside the process", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode the atlas graph once and print it as JSON
    Export(ExportArgs),

    /// Find the shortest route between two atlas grid slots
    Route(RouteArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// Pid of the running game process
    #[arg(long, conflicts_with = "dump")]
    pid: Option<u32>,

    /// Raw memory dump to read instead of a live process
    #[arg(long, requires = "base")]
    dump: Option<PathBuf>,

    /// Virtual address the dump starts at (hex or decimal)
    #[arg(long, value_parser = parse_address)]
    base: Option<u64>,

    /// Atlas panel address, bypassing the UI-root walk
    #[arg(long, value_parser = parse_address, conflicts_with = "ui_root")]
    panel: Option<u64>,

    /// UI root element address to walk down from
    #[arg(long, value_parser = parse_address)]
    ui_root: Option<u64>,

    /// Walk the controller UI layout instead of keyboard/mouse
    #[arg(long)]
    controller: bool,

    /// Display width in pixels
    #[arg(long, default_value_t = 2560.0)]
    width: f32,

    /// Display height in pixels
    #[arg(long, default_value_t = 1600.0)]
    height: f32,

    /// Drop graph edges touching completed nodes
    #[arg(long)]
    skip_completed: bool,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct RouteArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Origin grid slot, as X,Y
    #[arg(long, value_parser = parse_grid)]
    from: (i32, i32),

    /// Destination grid slot, as X,Y
    #[arg(long, value_parser = parse_grid)]
    to: (i32, i32),

    /// Routes longer than this many nodes are treated as unreachable
    #[arg(long, default_value_t = 24)]
    max_nodes: usize,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

fn parse_address(value: &str) -> Result<u64, String> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|_| format!("invalid address: {value}"))
}

fn parse_grid(value: &str) -> Result<(i32, i32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y grid slot, got: {value}"))?;
    let x = x.trim().parse().map_err(|_| format!("invalid grid X: {value}"))?;
    let y = y.trim().parse().map_err(|_| format!("invalid grid Y: {value}"))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Export(args) => run_export(args),
        Commands::Route(args) => run_route(args),
    }
}

fn open_reader(target: &TargetArgs) -> Result<RemoteReader> {
    if let Some(path) = &target.dump {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read dump {}", path.display()))?;
        // `requires = "base"` guarantees the base accompanies the dump.
        let base = target.base.context("--dump requires --base")?;
        log::debug!("loaded dump: {} bytes at {base:#x}", bytes.len());
        return Ok(RemoteReader::from_image(ImageSource::new(base, bytes)));
    }
    if let Some(pid) = target.pid {
        let mut reader = RemoteReader::new();
        reader.ensure_attached(pid);
        if !reader.is_attached() {
            bail!("cannot attach to pid {pid} (is the game running, and do you have permission?)");
        }
        return Ok(reader);
    }
    bail!("either --pid or --dump is required");
}

fn resolve_panel(reader: &RemoteReader, target: &TargetArgs) -> Result<u64> {
    if let Some(panel) = target.panel {
        return Ok(panel);
    }
    let Some(ui_root) = target.ui_root else {
        bail!("either --panel or --ui-root is required");
    };
    let path = if target.controller {
        PanelPath::controller()
    } else {
        PanelPath::keyboard()
    };
    let panel = path.resolve(reader, ui_root);
    if panel == 0 {
        bail!("atlas panel not found under the UI root (is the map screen open?)");
    }
    Ok(panel)
}

fn build_snapshot(reader: &RemoteReader, target: &TargetArgs) -> Result<AtlasSnapshot> {
    let panel = resolve_panel(reader, target)?;
    let transform = TransformResolver::new(
        Vec2::new(target.width, target.height),
        BASE_RESOLUTION,
    );
    let policy = BuildPolicy {
        skip_completed: target.skip_completed,
    };
    SnapshotBuilder::new(reader, &transform)
        .build(panel, policy)
        .context("atlas data is unavailable (empty or malformed node vector)")
}

fn run_export(args: ExportArgs) -> Result<()> {
    let reader = open_reader(&args.target)?;
    let snapshot = build_snapshot(&reader, &args.target)?;
    let export = collect_export(&snapshot);

    let output = if args.pretty {
        serde_json::to_string_pretty(&export)?
    } else {
        serde_json::to_string(&export)?
    };
    println!("{output}");
    eprintln!(
        "Exported {} nodes, {} edges",
        export.nodes.len(),
        export.edges.len()
    );
    Ok(())
}

fn run_route(args: RouteArgs) -> Result<()> {
    let reader = open_reader(&args.target)?;
    let snapshot = build_snapshot(&reader, &args.target)?;

    let (fx, fy) = args.from;
    let (tx, ty) = args.to;
    let origin = snapshot
        .node_index(GridPos::new(fx, fy))
        .with_context(|| format!("origin slot {fx},{fy} is not on the atlas"))?;
    let dest = snapshot
        .node_index(GridPos::new(tx, ty))
        .with_context(|| format!("destination slot {tx},{ty} is not on the atlas"))?;

    let Some(path) = find_path(&snapshot, origin, dest, args.max_nodes) else {
        bail!(
            "no route from {fx},{fy} to {tx},{ty} within {} nodes",
            args.max_nodes
        );
    };

    if args.json {
        let hops: Vec<serde_json::Value> = path
            .iter()
            .filter_map(|&idx| snapshot.node(idx))
            .map(|node| {
                let grid = node.grid;
                let (gx, gy) = (grid.x, grid.y);
                serde_json::json!({
                    "grid": { "x": gx, "y": gy },
                    "name": node.name,
                    "center": node.center,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&hops)?);
    } else {
        for (i, &idx) in path.iter().enumerate() {
            let Some(node) = snapshot.node(idx) else {
                continue;
            };
            let grid = node.grid;
            let (gx, gy) = (grid.x, grid.y);
            println!("{}. ({gx},{gy}) {}", i + 1, node.name);
        }
        eprintln!("{} hops", path.len().saturating_sub(1));
    }
    Ok(())
}
