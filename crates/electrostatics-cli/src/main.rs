use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use electrostatics_core::{ChargeEdit, FieldConfig, FieldEngine, FieldRenderer, PlotFrame, Session};
use glam::DVec2;
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "electrostatics")]
#[command(about = "Evaluate 2D point-charge fields and emit plot frames as JSON")]
struct Cli {
    /// JSON field configuration; unspecified keys take their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Full width of the square domain in meters
    #[arg(long, global = true)]
    extent: Option<f64>,

    /// Samples per axis
    #[arg(long, global = true)]
    resolution: Option<usize>,

    /// Exclusion radius around each charge in meters
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Evaluate lattice points on the current thread only
    #[arg(long, global = true)]
    serial: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate the grid once and print a plot frame
    Grid,
    /// Print field and potential at a single point
    Probe {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Drag one charge's magnitude across a range, printing one frame per step
    Sweep {
        #[arg(long, default_value_t = 0)]
        charge: usize,
        /// Start magnitude in nanocoulombs
        #[arg(long, default_value_t = -5.0, allow_negative_numbers = true)]
        from: f64,
        /// End magnitude in nanocoulombs
        #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
        to: f64,
        #[arg(long, default_value_t = 11)]
        steps: usize,
    },
    /// Print the effective configuration
    Config,
}

/// Writes each frame as one JSON document followed by a newline.
struct JsonLinesRenderer<W: Write> {
    out: W,
    pretty: bool,
}

impl<W: Write> JsonLinesRenderer<W> {
    fn new(out: W, pretty: bool) -> Self {
        Self { out, pretty }
    }

    fn emit<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, value)?;
        } else {
            serde_json::to_writer(&mut self.out, value)?;
        }
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write> FieldRenderer for JsonLinesRenderer<W> {
    type Error = io::Error;

    fn render(&mut self, frame: &PlotFrame) -> io::Result<()> {
        self.emit(frame)
    }
}

#[derive(Serialize)]
struct ProbeReport {
    point: DVec2,
    field: DVec2,
    field_magnitude: f64,
    potential: f64,
}

fn load_config(cli: &Cli) -> Result<FieldConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            FieldConfig::from_json_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => FieldConfig::default(),
    };
    if let Some(extent) = cli.extent {
        config.grid_extent = extent;
    }
    if let Some(resolution) = cli.resolution {
        config.grid_resolution = resolution;
    }
    if let Some(threshold) = cli.threshold {
        config.proximity_threshold = threshold;
    }
    if cli.serial {
        config.parallel = false;
    }
    Ok(config)
}

/// Magnitudes visited by a sweep, endpoints included.
fn sweep_values(from: f64, to: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![from],
        _ => (0..steps)
            .map(|i| from + (to - from) * i as f64 / (steps - 1) as f64)
            .collect(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "electrostatics=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let stdout = io::stdout();
    let mut renderer = JsonLinesRenderer::new(BufWriter::new(stdout.lock()), cli.pretty);

    match cli.command {
        Command::Config => {
            config.validate().context("invalid field configuration")?;
            renderer.emit(&config)?;
        }
        Command::Grid => {
            let engine = FieldEngine::try_new(config).context("invalid field configuration")?;
            info!(
                resolution = engine.lattice().resolution(),
                charges = engine.charges().len(),
                "evaluating grid"
            );
            Session::new(engine, renderer).refresh()?;
        }
        Command::Probe { x, y } => {
            let engine = FieldEngine::try_new(config).context("invalid field configuration")?;
            let point = DVec2::new(x, y);
            let field = engine.field_at(point);
            renderer.emit(&ProbeReport {
                point,
                field,
                field_magnitude: field.length(),
                potential: engine.potential_at(point),
            })?;
        }
        Command::Sweep {
            charge,
            from,
            to,
            steps,
        } => {
            if steps == 0 {
                bail!("--steps must be at least 1");
            }
            let engine = FieldEngine::try_new(config).context("invalid field configuration")?;
            let mut session = Session::new(engine, renderer);
            info!(charge, from, to, steps, "sweeping charge magnitude");
            for nanocoulombs in sweep_values(from, to, steps) {
                session
                    .apply(ChargeEdit::Magnitude {
                        index: charge,
                        nanocoulombs,
                    })
                    .with_context(|| format!("sweep step at {nanocoulombs} nC failed"))?;
            }
            info!(frames = session.revision(), "sweep finished");
        }
    }
    Ok(())
}
