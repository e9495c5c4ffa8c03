use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use neoncity_common::CellCoord;
use neoncity_input::{DragPhase, InputEvent};
use neoncity_kernel::camera::yaw_pitch_towards;
use neoncity_kernel::{Mode, NeonCityConfig, Session, SessionCommand, SessionEvent};
use neoncity_layout::{FaceMode, seed};
use neoncity_render::{DebugTextRenderer, Palette, Renderer};
use neoncity_scores::{
    HttpScoreService, Leaderboard, LocalScoreService, ScoreService, ScoreSubmission,
};
use neoncity_tools::LayoutInspector;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neoncity-cli", about = "CLI tool for NeonCity")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON config file; defaults are used when omitted
    #[arg(short, long, global = true, env = "NEONCITY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Generate the layout and describe it
    Layout {
        /// Print the ASCII map
        #[arg(short, long)]
        map: bool,
        /// Describe one cell, given as ROW,COL
        #[arg(long, value_parser = parse_cell)]
        cell: Option<CellCoord>,
    },
    /// Evaluate the spatial seed at a world position
    Seed {
        #[arg(allow_hyphen_values = true)]
        x: f32,
        #[arg(allow_hyphen_values = true)]
        z: f32,
    },
    /// Run a headless session through loading, menu and intro
    Simulate {
        /// Ticks to run once manual control is engaged
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Seconds per tick
        #[arg(long, default_value = "0.016666")]
        dt: f32,
        /// Print a frame every N ticks (0 prints none)
        #[arg(long, default_value = "30")]
        every: u64,
        /// Aim at the special building, click it and finish the mini game
        #[arg(long)]
        play: bool,
        /// Alias to record the played run under
        #[arg(long, requires = "play")]
        alias: Option<String>,
        #[command(flatten)]
        backend: Backend,
    },
    /// Talk to a score service
    Scores {
        #[command(flatten)]
        backend: Backend,
        #[command(subcommand)]
        action: ScoresAction,
    },
}

#[derive(clap::Args)]
struct Backend {
    /// Base URL of a running score service
    #[arg(long, env = "NEONCITY_SERVER", conflicts_with = "data_dir")]
    server: Option<String>,
    /// Use a local score store instead of a server
    #[arg(long, env = "NEONCITY_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ScoresAction {
    /// Prepare the store (idempotent)
    Init,
    /// Record a run time
    Submit {
        alias: String,
        time_ms: u64,
    },
    /// Show the leaderboard, fastest first
    List {
        /// Pages of 50 rows to fetch
        #[arg(short, long, default_value = "1")]
        pages: usize,
    },
}

fn parse_cell(text: &str) -> Result<CellCoord, String> {
    let (row, col) = text
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {text:?}"))?;
    let parse = |v: &str| v.trim().parse::<i32>().map_err(|e| format!("{v:?}: {e}"));
    Ok(CellCoord::new(parse(row)?, parse(col)?))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("neoncity-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", neoncity_common::crate_info());
            println!("layout: {}", neoncity_layout::crate_info());
            println!("input: {}", neoncity_input::crate_info());
            println!("kernel: {}", neoncity_kernel::crate_info());
            println!("render: {}", neoncity_render::crate_info());
            println!("persist: {}", neoncity_persist::crate_info());
            println!("scores: {}", neoncity_scores::crate_info());
            println!("tools: {}", neoncity_tools::crate_info());
        }
        Commands::Layout { map, cell } => {
            let config = load_config(cli.config.as_deref())?;
            let session = Session::new(&config)?;
            let layout = session.layout();
            println!("{}", LayoutInspector::summary(layout));
            if let Some(coord) = cell {
                match LayoutInspector::inspect_cell(layout, coord) {
                    Some(info) => println!("{info}"),
                    None => bail!("cell {coord} lies outside the grid"),
                }
            }
            if map {
                print!("{}", LayoutInspector::ascii_map(layout));
            }
        }
        Commands::Seed { x, z } => {
            let value = seed(x, z);
            let face = FaceMode::from_seed(value);
            println!("seed({x}, {z}) = {value:.6}");
            println!("face: {face:?} (static: {})", face.is_static());
        }
        Commands::Simulate {
            ticks,
            dt,
            every,
            play,
            alias,
            backend,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let time_ms = simulate(&config, ticks, dt, every, play)?;
            if let (Some(time_ms), Some(alias)) = (time_ms, alias) {
                let score = ScoreSubmission::new(&alias, time_ms)?;
                backend.run(ScoresAction::Submit {
                    alias: score.alias().to_owned(),
                    time_ms: score.time_ms(),
                })?;
            }
        }
        Commands::Scores { backend, action } => backend.run(action)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<NeonCityConfig> {
    NeonCityConfig::load(path).with_context(|| match path {
        Some(p) => format!("loading {}", p.display()),
        None => "validating default config".to_owned(),
    })
}

/// Drive a session to manual control and run it for `ticks` more ticks.
/// With `play`, returns the completed mini-game time.
fn simulate(
    config: &NeonCityConfig,
    ticks: u64,
    dt: f32,
    every: u64,
    play: bool,
) -> anyhow::Result<Option<u64>> {
    if !(dt.is_finite() && dt > 0.0) {
        bail!("dt must be a positive number of seconds (got {dt})");
    }
    let mut session = Session::new(config)?;
    let mut palette_rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
    let palette = Palette::generate(
        config.layout.theme_count,
        config.layout.variants_per_theme,
        &mut palette_rng,
    );
    let mut renderer = DebugTextRenderer::new();
    renderer.prepare(session.layout(), &palette);

    session.command(SessionCommand::LoadingComplete);
    session.command(SessionCommand::Start);
    let intro_ticks = (config.flight.intro_duration / dt).ceil() as u64 + 2;
    for _ in 0..intro_ticks {
        session.tick(dt, []);
    }
    if session.mode() != Mode::Running {
        bail!("intro did not finish after {intro_ticks} ticks");
    }
    print!("{}", renderer.render(session.camera()));

    if play {
        click_special(&mut session, dt, config.controls.mouse_sensitivity)?;
    }

    let mut completed = None;
    for tick in 1..=ticks {
        let camera = session.tick(dt, []);
        if every > 0 && tick % every == 0 {
            if let Some(line) = renderer.render(&camera).lines().last() {
                println!("{line}");
            }
        }
        for event in session.drain_events() {
            match event {
                SessionEvent::GarbageCompleted { time_ms, .. } => completed = Some(time_ms),
                other => tracing::debug!(?other, "session event"),
            }
        }
        if completed.is_some() {
            break;
        }
    }

    println!("{}", LayoutInspector::session(&session));
    match (play, completed) {
        (true, Some(time_ms)) => {
            println!("run time: {}", neoncity_scores::format_time(time_ms));
            session.command(SessionCommand::CloseModal);
        }
        (true, None) => bail!("mini game did not complete within {ticks} ticks"),
        _ => {}
    }
    Ok(completed)
}

/// Turn towards the special entity with a synthetic mouse drag, then click
/// the screen centre.
fn click_special(session: &mut Session, dt: f32, sensitivity: f32) -> anyhow::Result<()> {
    let target = session
        .layout()
        .special()
        .context("this layout has no special building")?
        .position;
    let camera = *session.camera();
    let (yaw, pitch) =
        yaw_pitch_towards(target - camera.position).context("camera sits on the special building")?;
    let dx = -(yaw - camera.yaw) / sensitivity;
    let dy = -(pitch - camera.pitch) / sensitivity;
    session.tick(
        dt,
        [
            InputEvent::PointerDrag { phase: DragPhase::Start, x: 0.0, y: 0.0 },
            InputEvent::PointerDrag { phase: DragPhase::Move, x: dx, y: dy },
            InputEvent::PointerDrag { phase: DragPhase::End, x: dx, y: dy },
        ],
    );
    let viewport = session.viewport();
    session.tick(
        dt,
        [InputEvent::Click {
            x: viewport.width / 2.0,
            y: viewport.height / 2.0,
        }],
    );
    if !session.modal_open() {
        bail!("click missed the special building");
    }
    Ok(())
}

impl Backend {
    fn run(self, action: ScoresAction) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        match (self.server, self.data_dir) {
            (Some(url), _) => runtime.block_on(scores(&HttpScoreService::new(url)?, action)),
            (None, Some(dir)) => runtime.block_on(scores(&LocalScoreService::open(dir)?, action)),
            (None, None) => bail!("pass --server URL or --data-dir PATH"),
        }
    }
}

async fn scores<S: ScoreService>(service: &S, action: ScoresAction) -> anyhow::Result<()> {
    match action {
        ScoresAction::Init => {
            service.init().await?;
            println!("score store ready");
        }
        ScoresAction::Submit { alias, time_ms } => {
            let score = ScoreSubmission::new(&alias, time_ms)?;
            service.submit(&score).await?;
            println!(
                "submitted {} {}",
                score.alias(),
                neoncity_scores::format_time(score.time_ms())
            );
        }
        ScoresAction::List { pages } => {
            let mut board = Leaderboard::new(None);
            for _ in 0..pages {
                if !board.load_more(service).await {
                    break;
                }
                if let Some(err) = board.last_error() {
                    bail!("leaderboard fetch failed: {err}");
                }
            }
            for row in board.rows() {
                println!("{:>3}  {:<16} {}", row.rank, row.alias, row.time);
            }
            if board.has_more() {
                println!("... more rows available");
            }
        }
    }
    Ok(())
}
