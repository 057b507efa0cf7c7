use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FieldValue – a single loosely-typed cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell for columns that have no fixed schema
/// (everything in the enrolments table besides `school_name` and `year`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl FieldValue {
    /// Guess the narrowest type for a raw text cell.
    pub fn guess(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return FieldValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return FieldValue::Float(f);
        }
        if s == "true" || s == "false" {
            return FieldValue::Bool(s == "true");
        }
        FieldValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Domain – assessed skill category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Domain {
    Reading,
    Writing,
    Spelling,
    Grammar,
    Numeracy,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Reading,
        Domain::Writing,
        Domain::Spelling,
        Domain::Grammar,
        Domain::Numeracy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Reading => "Reading",
            Domain::Writing => "Writing",
            Domain::Spelling => "Spelling",
            Domain::Grammar => "Grammar",
            Domain::Numeracy => "Numeracy",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label is not one of the five domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDomain(pub String);

impl fmt::Display for UnknownDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown NAPLAN domain '{}'", self.0)
    }
}

impl std::error::Error for UnknownDomain {}

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reading" => Ok(Domain::Reading),
            "writing" => Ok(Domain::Writing),
            "spelling" => Ok(Domain::Spelling),
            "grammar" | "grammar and punctuation" | "grammar & punctuation" => Ok(Domain::Grammar),
            "numeracy" => Ok(Domain::Numeracy),
            _ => Err(UnknownDomain(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Domain {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Records – one row of each source table
// ---------------------------------------------------------------------------

/// One row of `enrolments`. Not charted, but loaded and validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrolmentRecord {
    pub school_name: String,
    pub year: Option<i32>,
    /// Remaining columns: column_name → value.
    pub fields: BTreeMap<String, FieldValue>,
}

/// One row of `naplan_results`. Rows may repeat for the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaplanResultRecord {
    pub school_name: String,
    pub domain: Domain,
    pub results_year: i32,
    pub year_level: String,
    pub avg: f64,
}

impl NaplanResultRecord {
    pub const COLUMNS: [&'static str; 5] =
        ["school_name", "domain", "results_year", "year_level", "avg"];
}

/// One row of `recurrent_income`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrentIncomeRecord {
    pub school_name: String,
    pub year: i32,
    #[serde(rename = "Net recurrent income")]
    pub income_source: String,
    #[serde(rename = "$ per student")]
    pub per_student: f64,
}

impl RecurrentIncomeRecord {
    pub const COLUMNS: [&'static str; 4] =
        ["school_name", "year", "Net recurrent income", "$ per student"];
}

// ---------------------------------------------------------------------------
// Income source labels
// ---------------------------------------------------------------------------

/// The aggregate row every school reports alongside its funding sources.
pub const TOTAL_GROSS_INCOME: &str = "Total gross income";

/// Funding sources shown in the income distribution, in colour order.
pub const INCOME_SOURCES: [&str; 4] = [
    "Australian government recurrent funding",
    "State / territory government recurring funding",
    "Fees, charges and parent contributions",
    "Other private sources",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_parsing_is_lenient_about_case_and_grammar_aliases() {
        assert_eq!("reading".parse::<Domain>(), Ok(Domain::Reading));
        assert_eq!(" Numeracy ".parse::<Domain>(), Ok(Domain::Numeracy));
        assert_eq!("Grammar and Punctuation".parse::<Domain>(), Ok(Domain::Grammar));
        assert_eq!(
            "Science".parse::<Domain>(),
            Err(UnknownDomain("Science".to_string()))
        );
    }

    #[test]
    fn field_value_guess_picks_narrowest_type() {
        assert_eq!(FieldValue::guess("42"), FieldValue::Integer(42));
        assert_eq!(FieldValue::guess("4.5"), FieldValue::Float(4.5));
        assert_eq!(FieldValue::guess("true"), FieldValue::Bool(true));
        assert_eq!(FieldValue::guess(""), FieldValue::Null);
        assert_eq!(
            FieldValue::guess("Primary"),
            FieldValue::String("Primary".to_string())
        );
    }
}
