use super::{parse_confidence, Reader};
use crate::error::{BenchError, Result};
use crate::extraction::{Extraction, ExtractionMap};

/// Open IE 4 output reader
///
/// Rows are `confidence \t context \t arg1 \t rel \t arg2 \t sentence`, with
/// each slot written as `SimpleArgument(text,List([0, 3)))`.
pub struct OpenieFourReader;

/// Text between the first `(` and `,List(`.
fn slot_text<'a>(slot: &'a str, path: &str, line_no: usize) -> Result<&'a str> {
    let start = slot.find('(').map(|i| i + 1);
    let end = slot.find(",List(");
    match (start, end) {
        (Some(start), Some(end)) if start <= end => Ok(&slot[start..end]),
        _ => Err(BenchError::Parse(format!(
            "Malformed Open IE 4 slot {:?} in {} line {}",
            slot, path, line_no
        ))),
    }
}

impl Reader for OpenieFourReader {
    fn name(&self) -> &str {
        "OpenIE-4"
    }

    fn read_str(&self, content: &str, path: &str) -> Result<ExtractionMap> {
        let mut map = ExtractionMap::new();

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 6 {
                log::warn!("Skipping short Open IE 4 row in {} line {}", path, line_no);
                continue;
            }
            if fields[2..5].iter().any(|slot| slot.is_empty()) {
                continue;
            }
            let confidence = parse_confidence(fields[0], path, line_no)?;
            let arg1 = slot_text(fields[2], path, line_no)?;
            let rel = slot_text(fields[3], path, line_no)?;
            let arg2 = slot_text(fields[4], path, line_no)?;
            let extraction = Extraction::new(fields[5], rel, confidence)
                .with_arg(arg1)
                .with_arg(arg2);
            map.push(extraction);
        }

        Ok(map)
    }
}
