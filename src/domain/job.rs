/// Marker emitted for a field no strategy could resolve. Kept as the literal
/// string for compatibility with the tabular output contract.
pub const MISSING: &str = "-1";

pub const COLUMNS: [&str; 4] = ["Job Title", "Company Name", "Location", "Job Description"];

/// Partial record parsed from a page's JSON-LD. Absent fields stay `None`,
/// never an empty string and never the sentinel.
#[derive(Debug, Default, PartialEq)]
pub struct StructuredPosting {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// One finished row. Every field is either genuine content or `MISSING`.
#[derive(Debug, PartialEq)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
}

impl JobRecord {
    pub fn row(&self) -> [&str; 4] {
        [&self.title, &self.company, &self.location, &self.description]
    }
}

/// Outcome of a single DOM fallback attempt. Driver errors and empty text
/// both collapse into `NotFound`.
#[derive(Debug, PartialEq)]
pub enum Lookup {
    Found(String),
    NotFound,
}

impl Lookup {
    pub fn from_text(text: String) -> Self {
        let text = text.trim();
        match text.is_empty() {
            true => Lookup::NotFound,
            false => Lookup::Found(text.to_string()),
        }
    }

    pub fn or_missing(self) -> String {
        match self {
            Lookup::Found(text) => text,
            Lookup::NotFound => MISSING.to_string(),
        }
    }
}

/// Structured metadata wins over the DOM lookup; a failed lookup yields the
/// sentinel. The result is never empty.
pub fn resolve_field(structured: Option<String>, fallback: Lookup) -> String {
    match structured {
        Some(text) if !text.is_empty() => text,
        _ => fallback.or_missing(),
    }
}
