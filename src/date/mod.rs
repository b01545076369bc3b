pub mod guess;

use chrono::NaiveDateTime;

/// Textual layout EXIF expects for datetime fields, zero-padded, 24-hour.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Outcome of matching one filename against the known grammars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The filename encodes a date; this is the derived capture timestamp.
    Dated(NaiveDateTime),
    /// The filename fits no known grammar. Expected for most files.
    NoMatch,
    /// A grammar matched but no timestamp could be constructed (bad
    /// calendar date, numeric overflow). Skipped like `NoMatch`, reported
    /// apart so the operator can spot broken names.
    Invalid(String),
}

/// One filename grammar.
pub trait DateExtractor {
    fn try_extract(&self, filename: &str) -> Extraction;
}

/// Ordered extractor list. The first extractor returning anything other
/// than `NoMatch` decides the outcome, so narrower grammars go first.
pub struct ExtractorSet {
    extractors: Vec<Box<dyn DateExtractor>>,
}

impl ExtractorSet {
    pub fn new(extractors: Vec<Box<dyn DateExtractor>>) -> Self {
        Self { extractors }
    }

    /// The built-in grammars.
    pub fn standard() -> Self {
        Self::new(vec![Box::new(guess::WhatsAppMedia)])
    }

    pub fn extract(&self, filename: &str) -> Extraction {
        for extractor in &self.extractors {
            match extractor.try_extract(filename) {
                Extraction::NoMatch => continue,
                decided => return decided,
            }
        }
        Extraction::NoMatch
    }
}
