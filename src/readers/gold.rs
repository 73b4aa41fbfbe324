use super::Reader;
use crate::error::{BenchError, Result};
use crate::extraction::{Extraction, ExtractionMap};

/// Gold reference reader
///
/// One extraction per line: `sentence \t predicate \t arg0 \t arg1 ...`.
/// Gold extractions carry no confidence; 1.0 is stored.
pub struct GoldReader;

impl Reader for GoldReader {
    fn name(&self) -> &str {
        "Gold"
    }

    fn read_str(&self, content: &str, path: &str) -> Result<ExtractionMap> {
        let mut map = ExtractionMap::new();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 2 {
                return Err(BenchError::Parse(format!(
                    "Gold line needs a sentence and a predicate in {} line {}",
                    path,
                    idx + 1
                )));
            }

            let mut extraction = Extraction::new(fields[0], fields[1], 1.0);
            for arg in &fields[2..] {
                extraction.add_arg(*arg);
            }
            map.push(extraction);
        }

        Ok(map)
    }
}
