pub mod mean_elements;
pub mod provider;
pub mod time;
pub mod types;

#[cfg(feature = "swisseph")]
pub mod adapter;

pub use mean_elements::MeanElementsProvider;
pub use provider::{PositionProvider, ProviderError};
pub use types::{CelestialBody, Observer, DEFAULT_OBSERVER};

#[cfg(feature = "swisseph")]
pub use adapter::SwissEphemerisAdapter;
