pub mod cache;
pub mod engine;
pub mod merge;
pub mod types;

mod conjunction;
mod ingress;
mod sampling;
mod search;
mod stations;

pub use cache::{CacheKey, ForecastCache};
pub use engine::generate_yearly_forecast;
pub use merge::{merge_transits, MergedTransit, StaticTransit, TransitSource};
pub use types::{
    Conjunction, ForecastConfig, ForecastEvent, Ingress, IngressSignificance, MonthlyEvents,
    RetrogradePeriod, SampleCoverage, SeasonMarker, Significance, Station, StationKind,
    YearlyForecast,
};
