// main.rs
//
// Command line driver: buffers every congress in a range and writes one
// `{NNN}.geojson.zip` per congress.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use unclipped_districts::buffer::{ProgressObserver, TracingProgress};
use unclipped_districts::config::PipelineConfig;
use unclipped_districts::fixups::DEFAULT_FIXUPS;
use unclipped_districts::io::archive::RemoteArchiveSource;
use unclipped_districts::io::geojson::GeoJsonZipSink;
use unclipped_districts::io::shapefile::ShapefileBoundaries;
use unclipped_districts::landmass::ShapefileLandmass;
use unclipped_districts::pipeline::Pipeline;
use unclipped_districts::store::{DiskResultStore, NullStore, ResultStore};

#[derive(Parser)]
#[command(name = "unclipped-districts")]
#[command(about = "Buffer historical congressional districts into the water")]
#[command(version)]
struct Cli {
    /// TOML configuration file; flags override its values
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Do not read or write the result store
    #[arg(long, conflicts_with = "cache_dir")]
    no_cache: bool,

    /// Single-feature landmass shapefile
    #[arg(long, value_name = "PATH")]
    landmass: Option<PathBuf>,

    /// Directory holding `<State>/<State>.shp` outlines
    #[arg(long, value_name = "DIR")]
    boundaries: Option<PathBuf>,

    /// Buffer distance in degrees
    #[arg(long)]
    buffer: Option<f64>,

    #[arg(long)]
    first: Option<u32>,

    #[arg(long)]
    last: Option<u32>,

    #[arg(long, value_name = "URL")]
    url_template: Option<String>,

    /// Log per-feature progress at debug level instead of drawing a bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(dir) = self.cache_dir {
            config.cache_dir = Some(dir);
        }
        if self.no_cache {
            config.cache_dir = None;
        }
        if let Some(path) = self.landmass {
            config.landmass = path;
        }
        if let Some(dir) = self.boundaries {
            config.boundaries = Some(dir);
        }
        if let Some(distance) = self.buffer {
            config.buffer.distance = distance;
        }
        if let Some(first) = self.first {
            config.first = first;
        }
        if let Some(last) = self.last {
            config.last = last;
        }
        if let Some(template) = self.url_template {
            config.url_template = template;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Progress bar over the features of the collection being buffered.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg} [{elapsed}]")
                .context("progress bar template")?,
        );
        Ok(BarProgress { bar })
    }
}

impl ProgressObserver for BarProgress {
    fn start(&self, total: usize) {
        self.bar.reset();
        self.bar.set_length(total as u64);
    }

    fn feature(&self, position: usize, label: &str) {
        self.bar.set_position(position as u64);
        self.bar.set_message(label.to_string());
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn default_boundaries() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locating the executable")?;
    Ok(exe.parent().map(PathBuf::from).unwrap_or_default())
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let quiet = cli.no_progress;
    let config = cli.into_config()?;

    let source = RemoteArchiveSource::new(config.url_template.clone())?;
    let landmass = ShapefileLandmass::new(&config.landmass);
    let boundaries = ShapefileBoundaries::new(match &config.boundaries {
        Some(dir) => dir.clone(),
        None => default_boundaries()?,
    });
    let sink = GeoJsonZipSink::new(&config.output_dir);
    let store: Box<dyn ResultStore> = match &config.cache_dir {
        Some(dir) => Box::new(DiskResultStore::new(dir)),
        None => Box::new(NullStore),
    };
    // without a bar, per-feature progress goes to the debug log
    let observer: Box<dyn ProgressObserver> = if quiet {
        Box::new(TracingProgress)
    } else {
        Box::new(BarProgress::new()?)
    };

    let pipeline = Pipeline {
        source: &source,
        landmass: &landmass,
        boundaries: &boundaries,
        sink: &sink,
        store: store.as_ref(),
        fixups: DEFAULT_FIXUPS,
        settings: config.buffer,
        observer: observer.as_ref(),
    };
    let summary = pipeline.run(config.congresses())?;

    for (congress, error) in &summary.failed {
        eprintln!("Failed for {congress}: {error}");
    }
    Ok(if summary.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(code) => code,
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        },
    }
}
