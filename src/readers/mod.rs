//! Readers turning extraction files into sentence-keyed mappings.
//!
//! All supported formats are tab separated, one extraction per line.

pub mod clausie;
pub mod gold;
pub mod ollie;
pub mod openie4;

pub use clausie::ClausieReader;
pub use gold::GoldReader;
pub use ollie::OllieReader;
pub use openie4::OpenieFourReader;

use crate::error::{BenchError, Result};
use crate::extraction::ExtractionMap;
use std::path::Path;

/// Trait for extraction file readers
pub trait Reader {
    /// Display name, used in logs and reports
    fn name(&self) -> &str;

    /// Parse file content; `path` is only used in error messages
    fn read_str(&self, content: &str, path: &str) -> Result<ExtractionMap>;

    /// Read and parse a file
    fn read(&self, path: &Path) -> Result<ExtractionMap> {
        let content = std::fs::read_to_string(path)?;
        let map = self.read_str(&content, &path.display().to_string())?;
        log::debug!(
            "{} reader loaded {} sentences from {}",
            self.name(),
            map.len(),
            path.display()
        );
        Ok(map)
    }
}

/// Output formats accepted for the system under test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictedFormat {
    Clausie,
    Ollie,
    OpenieFour,
}

impl PredictedFormat {
    pub fn reader(self) -> Box<dyn Reader> {
        match self {
            PredictedFormat::Clausie => Box::new(ClausieReader),
            PredictedFormat::Ollie => Box::new(OllieReader),
            PredictedFormat::OpenieFour => Box::new(OpenieFourReader),
        }
    }
}

/// Parse a confidence field, reporting file and 1-based line on failure.
pub(crate) fn parse_confidence(field: &str, path: &str, line_no: usize) -> Result<f64> {
    field.trim().parse::<f64>().map_err(|e| {
        BenchError::Parse(format!(
            "Invalid confidence {:?} in {} line {}: {}",
            field, path, line_no, e
        ))
    })
}
