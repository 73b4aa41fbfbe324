use super::{parse_confidence, Reader};
use crate::error::Result;
use crate::extraction::{Extraction, ExtractionMap};

/// OLLIE tabbed output reader
///
/// The first line is a header. Rows are
/// `confidence \t arg1 \t rel \t arg2 \t enabler \t attribution \t sentence`.
pub struct OllieReader;

impl Reader for OllieReader {
    fn name(&self) -> &str {
        "OLLIE"
    }

    fn read_str(&self, content: &str, path: &str) -> Result<ExtractionMap> {
        let mut map = ExtractionMap::new();

        for (idx, line) in content.lines().enumerate().skip(1) {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 7 {
                log::warn!("Skipping short OLLIE row in {} line {}", path, line_no);
                continue;
            }
            let confidence = parse_confidence(fields[0], path, line_no)?;
            let extraction = Extraction::new(fields[6].trim(), fields[2].trim(), confidence)
                .with_arg(fields[1].trim())
                .with_arg(fields[3].trim());
            map.push(extraction);
        }

        Ok(map)
    }
}
