//! Astronomical-to-astrological computation engine.
//!
//! Converts a timestamp (and optionally an observer) into zodiac placements,
//! retrograde status and moon phase, and scans whole years for sign ingresses,
//! conjunctions and retrograde stations.

pub mod chart;
pub mod ephemeris;
pub mod error;
pub mod forecast;
pub mod zodiac;

pub use chart::{
    compute_chart, generate_birth_chart, moon_phase, moon_phase_name, BirthChartRecord,
    BirthChartService, BirthChartStore, BirthPlacement, Chart, ChartEntry, JsonFileStore,
    MemoryStore, MissingBody, WriteMode,
};
pub use ephemeris::{
    CelestialBody, MeanElementsProvider, Observer, PositionProvider, ProviderError,
    DEFAULT_OBSERVER,
};
pub use error::{AstroError, Result};
pub use forecast::{
    generate_yearly_forecast, merge_transits, Conjunction, ForecastCache, ForecastConfig,
    Ingress, MergedTransit, RetrogradePeriod, Significance, StaticTransit, Station,
    YearlyForecast,
};
pub use zodiac::{
    is_retrograde, normalize_degrees, separation, signed_delta, FormattedDegree, MoonPhase,
    MoonPhaseName, ZodiacSign,
};
