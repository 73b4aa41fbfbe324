use super::{parse_confidence, Reader};
use crate::error::{BenchError, Result};
use crate::extraction::{Extraction, ExtractionMap};

/// ClausIE output reader
///
/// A single-field line starts a new sentence. Five-field lines are
/// `id \t "arg1" \t "rel" \t "arg2" \t confidence` for the current sentence.
/// ClausIE splits conjunctions, so its extractions are flagged as such.
pub struct ClausieReader;

fn unquote(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

impl Reader for ClausieReader {
    fn name(&self) -> &str {
        "ClausIE"
    }

    fn read_str(&self, content: &str, path: &str) -> Result<ExtractionMap> {
        let mut map = ExtractionMap::new();
        let mut sentence: Option<&str> = None;

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            match fields.len() {
                1 => sentence = Some(fields[0]),
                5 => {
                    let text = sentence.ok_or_else(|| {
                        BenchError::Parse(format!(
                            "ClausIE triple before any sentence in {} line {}",
                            path, line_no
                        ))
                    })?;
                    let confidence = parse_confidence(fields[4], path, line_no)?;
                    let extraction = Extraction::new(text, unquote(fields[2]), confidence)
                        .with_arg(unquote(fields[1]))
                        .with_arg(unquote(fields[3]))
                        .with_splits_conjunctions(true);
                    map.push(extraction);
                }
                n => {
                    log::warn!(
                        "Skipping ClausIE line with {} fields in {} line {}",
                        n,
                        path,
                        line_no
                    );
                }
            }
        }

        Ok(map)
    }
}
