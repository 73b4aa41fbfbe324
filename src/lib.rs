pub mod benchmark;
pub mod config;
pub mod curve;
pub mod error;
pub mod extraction;
pub mod matcher;
pub mod normalize;
pub mod readers;

pub use benchmark::{Benchmark, Comparison, Report};
pub use config::Config;
pub use error::{BenchError, Result};
pub use extraction::{Extraction, ExtractionMap};
pub use matcher::{MatchPolicy, Matcher};
