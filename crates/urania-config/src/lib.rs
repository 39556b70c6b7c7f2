use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use urania::{CelestialBody, ForecastConfig, Observer, StaticTransit, ZodiacSign};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "URANIA_CONFIG";

/// Relative locations tried when no explicit path is given, from the
/// workspace root and from a crate directory.
const SEARCH_PATHS: [&str; 2] = ["configs/urania.toml", "../../configs/urania.toml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EphemerisBackend {
    MeanElements,
    SwissEph,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisSettings {
    pub backend: EphemerisBackend,
    /// Data directory for the Swiss Ephemeris backend
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub capacity: usize,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub observer: Observer,
    pub forecast: ForecastConfig,
    pub cache: CacheSettings,
    pub store_dir: PathBuf,
    pub ephemeris: EphemerisSettings,
    /// File the settings were read from, if any
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RootConfigToml {
    #[serde(default)]
    observer: Option<ObserverToml>,
    #[serde(default)]
    forecast: Option<ForecastToml>,
    #[serde(default)]
    cache: Option<CacheToml>,
    #[serde(default)]
    store: Option<StoreToml>,
    #[serde(default)]
    ephemeris: Option<EphemerisToml>,
}

#[derive(Debug, Clone, Deserialize)]
struct ObserverToml {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    height: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastToml {
    #[serde(default = "default_cadence_hours")]
    cadence_hours: u32,
    #[serde(default = "default_margin_days")]
    margin_days: u32,
    #[serde(default = "default_resolution_seconds")]
    resolution_seconds: u32,
    #[serde(default = "default_max_iterations")]
    max_iterations: u32,
    #[serde(default = "default_conjunction_threshold")]
    conjunction_threshold_deg: f64,
    #[serde(default)]
    major_bodies: Option<Vec<String>>,
}

fn default_cadence_hours() -> u32 {
    ForecastConfig::default().cadence_hours
}

fn default_margin_days() -> u32 {
    ForecastConfig::default().margin_days
}

fn default_resolution_seconds() -> u32 {
    ForecastConfig::default().resolution_seconds
}

fn default_max_iterations() -> u32 {
    ForecastConfig::default().max_iterations
}

fn default_conjunction_threshold() -> f64 {
    ForecastConfig::default().conjunction_threshold_deg
}

#[derive(Debug, Clone, Deserialize)]
struct CacheToml {
    #[serde(default = "default_ttl_secs")]
    ttl_secs: u64,
    #[serde(default = "default_capacity")]
    capacity: usize,
}

fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_capacity() -> usize {
    8
}

#[derive(Debug, Clone, Deserialize)]
struct StoreToml {
    dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct EphemerisToml {
    #[serde(default = "default_backend")]
    backend: String,
    #[serde(default)]
    path: Option<PathBuf>,
}

fn default_backend() -> String {
    "mean-elements".to_string()
}

/// Default birth chart directory: the platform data dir, else `./birth-charts`.
pub fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("urania").join("birth-charts"))
        .unwrap_or_else(|| PathBuf::from("birth-charts"))
}

/// Locate and read the config file.
///
/// An explicit path or `URANIA_CONFIG` must exist. Otherwise the relative
/// search paths are tried and `None` means "use defaults".
pub fn read_config_text(explicit: Option<&Path>) -> anyhow::Result<Option<(PathBuf, String)>> {
    let requested = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    if let Some(path) = requested {
        let text = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Could not read config {}: {e}", path.display()))?;
        return Ok(Some((path, text)));
    }
    for p in &SEARCH_PATHS {
        if let Ok(text) = fs::read_to_string(p) {
            return Ok(Some((PathBuf::from(p), text)));
        }
    }
    Ok(None)
}

/// Load settings from the resolved config file, or defaults when none exists.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    match read_config_text(explicit)? {
        Some((path, text)) => {
            let mut settings = parse_settings(&text)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))?;
            settings.source = Some(path);
            Ok(settings)
        }
        None => parse_settings(""),
    }
}

/// Parse settings from TOML text. Missing sections take defaults.
pub fn parse_settings(text: &str) -> anyhow::Result<Settings> {
    let root: RootConfigToml = toml::from_str(text)?;

    let observer = match root.observer {
        Some(o) => Observer::new(o.latitude, o.longitude, o.height)?,
        None => Observer::default(),
    };

    let mut forecast = ForecastConfig {
        observer,
        ..ForecastConfig::default()
    };
    if let Some(f) = root.forecast {
        forecast.cadence_hours = f.cadence_hours;
        forecast.margin_days = f.margin_days;
        forecast.resolution_seconds = f.resolution_seconds;
        forecast.max_iterations = f.max_iterations;
        forecast.conjunction_threshold_deg = f.conjunction_threshold_deg;
        if let Some(names) = f.major_bodies {
            forecast.major_bodies = names
                .iter()
                .map(|n| parse_body(n))
                .collect::<anyhow::Result<Vec<_>>>()?;
        }
    }
    forecast.validate()?;

    let cache = root.cache.map_or(
        CacheSettings {
            ttl: Duration::from_secs(default_ttl_secs()),
            capacity: default_capacity(),
        },
        |c| CacheSettings {
            ttl: Duration::from_secs(c.ttl_secs),
            capacity: c.capacity,
        },
    );

    let store_dir = root.store.map(|s| s.dir).unwrap_or_else(default_store_dir);

    let ephemeris = match root.ephemeris {
        Some(e) => EphemerisSettings {
            backend: parse_backend(&e.backend)?,
            path: e.path,
        },
        None => EphemerisSettings {
            backend: EphemerisBackend::MeanElements,
            path: None,
        },
    };

    Ok(Settings {
        observer,
        forecast,
        cache,
        store_dir,
        ephemeris,
        source: None,
    })
}

fn parse_backend(name: &str) -> anyhow::Result<EphemerisBackend> {
    match name.trim().to_ascii_lowercase().as_str() {
        "mean-elements" | "mean_elements" => Ok(EphemerisBackend::MeanElements),
        "swisseph" | "swiss" => Ok(EphemerisBackend::SwissEph),
        other => anyhow::bail!(
            "Unknown ephemeris backend '{other}' (expected mean-elements or swisseph)"
        ),
    }
}

fn parse_body(name: &str) -> anyhow::Result<CelestialBody> {
    CelestialBody::from_name(name).ok_or_else(|| anyhow::anyhow!("Unknown body '{name}'"))
}

fn parse_sign(name: &str) -> anyhow::Result<ZodiacSign> {
    ZodiacSign::from_name(name).ok_or_else(|| anyhow::anyhow!("Unknown sign '{name}'"))
}

#[derive(Debug, Clone, Deserialize)]
struct TransitFileToml {
    #[serde(default)]
    transit: Vec<TransitToml>,
}

#[derive(Debug, Clone, Deserialize)]
struct TransitToml {
    body: String,
    to_sign: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    date_hint: Option<toml::value::Datetime>,
}

/// Parse authored transit content (`[[transit]]` tables).
pub fn parse_transit_content(text: &str) -> anyhow::Result<Vec<StaticTransit>> {
    let file: TransitFileToml = toml::from_str(text)?;
    file.transit
        .into_iter()
        .map(|t| {
            let date_hint = match t.date_hint {
                Some(dt) => {
                    let raw = dt.to_string();
                    Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                        anyhow::anyhow!("date_hint for '{}' must be a date: {raw} ({e})", t.title)
                    })?)
                }
                None => None,
            };
            Ok(StaticTransit {
                body: parse_body(&t.body)?,
                to_sign: parse_sign(&t.to_sign)?,
                title: t.title,
                description: t.description,
                date_hint,
            })
        })
        .collect()
}

pub fn load_transit_content(path: &Path) -> anyhow::Result<Vec<StaticTransit>> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Could not read transit content {}: {e}", path.display()))?;
    parse_transit_content(&text)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))
}
