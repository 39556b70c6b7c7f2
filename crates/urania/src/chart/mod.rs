pub mod assembler;
pub mod birth;
pub mod store;

pub use assembler::{compute_chart, moon_phase, moon_phase_name, Chart, ChartEntry, MissingBody};
pub use birth::{generate_birth_chart, BirthChartRecord, BirthChartService, BirthPlacement};
pub use store::{BirthChartStore, JsonFileStore, MemoryStore, WriteMode};
