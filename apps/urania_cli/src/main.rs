mod output;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use urania::forecast::CacheKey;
use urania::{
    compute_chart, generate_yearly_forecast, merge_transits, moon_phase, BirthChartService,
    ForecastCache, JsonFileStore, MeanElementsProvider, Observer, PositionProvider, WriteMode,
};
use urania_config::{EphemerisBackend, Settings};

#[derive(Parser, Debug)]
#[command(name = "urania", author, version, about = "Tropical zodiac charts and yearly forecasts")]
struct Cli {
    /// Config file (otherwise URANIA_CONFIG or configs/urania.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Placements of all tracked bodies at one moment.
    Chart {
        /// RFC 3339 timestamp (default: now).
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Moon phase at one moment.
    Moon {
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Compute and store a natal chart, keeping any existing record.
    BirthChart {
        /// Identity the record is stored under.
        #[arg(long)]
        id: String,
        /// Birth moment, RFC 3339.
        #[arg(long)]
        at: DateTime<Utc>,
        #[command(flatten)]
        location: LocationArgs,
        /// Replace an existing record.
        #[arg(long, default_value_t = false)]
        overwrite: bool,
        /// Store directory override.
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Ingresses, conjunctions and stations for whole years.
    Forecast {
        /// Calendar year; repeat for several.
        #[arg(long, required = true)]
        year: Vec<i32>,
        /// Authored transit content to merge with computed ingresses.
        #[arg(long)]
        content: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct LocationArgs {
    /// Observer latitude in degrees.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Observer longitude in degrees, east positive.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
    /// Observer height in meters.
    #[arg(long, default_value_t = 0.0)]
    height: f64,
}

impl LocationArgs {
    fn observer(&self, settings: &Settings) -> anyhow::Result<Observer> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Observer::new(lat, lon, self.height)?),
            _ => Ok(settings.observer),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("[urania] error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = urania_config::load_settings(cli.config.as_deref())?;
    if let Some(source) = &settings.source {
        log::info!("Loaded settings from {}", source.display());
    }
    let (provider, version) = build_provider(&settings)?;

    match cli.command {
        Command::Chart { at, location } => {
            let observer = location.observer(&settings)?;
            let chart = compute_chart(&provider, at.unwrap_or_else(Utc::now), Some(&observer));
            output::chart(&chart, cli.json)
        }
        Command::Moon { at } => {
            let phase = moon_phase(&provider, at.unwrap_or_else(Utc::now))?;
            output::moon(&phase, cli.json)
        }
        Command::BirthChart {
            id,
            at,
            location,
            overwrite,
            store,
        } => {
            let observer = location.observer(&settings)?;
            let dir = store.unwrap_or_else(|| settings.store_dir.clone());
            let store = JsonFileStore::new(&dir)
                .with_context(|| format!("opening birth chart store {}", dir.display()))?;
            let service = BirthChartService::new(provider, store);
            let record = if overwrite {
                service.regenerate(&id, at, Some(&observer), WriteMode::Overwrite)?
            } else {
                service.ensure(&id, at, Some(&observer))?
            };
            let stored_at = service.store().path_for(&id)?;
            output::birth_chart(&id, &record, &stored_at, cli.json)
        }
        Command::Forecast { year, content } => {
            let authored = match &content {
                Some(path) => urania_config::load_transit_content(path)?,
                None => Vec::new(),
            };
            let cache = ForecastCache::new(settings.cache.ttl, settings.cache.capacity);
            for y in year {
                let forecast = cache.get_or_try_insert_with(CacheKey::new(y, version), || {
                    generate_yearly_forecast(&provider, y, &settings.forecast)
                })?;
                let merged = merge_transits(&forecast.ingresses, &authored);
                output::forecast(&forecast, &merged, cli.json)?;
            }
            Ok(())
        }
    }
}

/// Position provider selected by the settings, with its cache version tag.
fn build_provider(
    settings: &Settings,
) -> anyhow::Result<(Box<dyn PositionProvider>, &'static str)> {
    match settings.ephemeris.backend {
        EphemerisBackend::MeanElements => Ok((
            Box::new(MeanElementsProvider::new()),
            MeanElementsProvider::VERSION,
        )),
        #[cfg(feature = "swisseph")]
        EphemerisBackend::SwissEph => {
            let adapter = urania::ephemeris::SwissEphemerisAdapter::new(
                settings.ephemeris.path.clone(),
            )?;
            Ok((
                Box::new(adapter),
                urania::ephemeris::SwissEphemerisAdapter::VERSION,
            ))
        }
        #[cfg(not(feature = "swisseph"))]
        EphemerisBackend::SwissEph => {
            anyhow::bail!(
                "This build has no Swiss Ephemeris support (rebuild with --features swisseph)"
            )
        }
    }
}
