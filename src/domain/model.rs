use serde::{Deserialize, Serialize};
use std::fmt;

pub const ADDRESS_NOT_FOUND: &str = "Address not found";
pub const NETWORK_ID_NOT_FOUND: &str = "NetworkId not found";

/// A trimmed, non-empty ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    /// Normalizes a raw cell. Scalars are rendered to text and trimmed;
    /// null, empty, and structured values are not tickers.
    pub fn normalize(raw: &serde_json::Value) -> Option<Ticker> {
        let text = match raw {
            serde_json::Value::Null => return None,
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => return None,
        };

        if text.is_empty() {
            None
        } else {
            Some(Ticker(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row-scoped failure tag written in place of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentinel {
    InvalidTicker,
    NotFound,
    ApiError,
    ProcessingError,
}

impl Sentinel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentinel::InvalidTicker => "Invalid Ticker",
            Sentinel::NotFound => "Not Found",
            Sentinel::ApiError => "API Error",
            Sentinel::ProcessingError => "Processing Error",
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        address: String,
        network_id: Option<String>,
    },
    Failed(Sentinel),
}

impl Resolution {
    /// Value for the `token address` column.
    pub fn address_cell(&self) -> &str {
        match self {
            Resolution::Resolved { address, .. } => address,
            Resolution::Failed(sentinel) => sentinel.as_str(),
        }
    }

    /// Value for the `Blockchain` column.
    pub fn network_cell(&self) -> &str {
        match self {
            Resolution::Resolved {
                network_id: Some(network_id),
                ..
            } => network_id,
            Resolution::Resolved {
                network_id: None, ..
            } => NETWORK_ID_NOT_FOUND,
            Resolution::Failed(sentinel) => sentinel.as_str(),
        }
    }

    pub fn sentinel(&self) -> Option<Sentinel> {
        match self {
            Resolution::Failed(sentinel) => Some(*sentinel),
            Resolution::Resolved { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    pub total: usize,
    pub resolved: usize,
    pub invalid_ticker: usize,
    pub not_found: usize,
    pub api_error: usize,
    pub processing_error: usize,
}

impl ResolutionSummary {
    pub fn from_resolutions(resolutions: &[Resolution]) -> Self {
        let mut summary = Self::default();
        for resolution in resolutions {
            summary.record(resolution);
        }
        summary
    }

    pub fn record(&mut self, resolution: &Resolution) {
        self.total += 1;
        match resolution.sentinel() {
            None => self.resolved += 1,
            Some(Sentinel::InvalidTicker) => self.invalid_ticker += 1,
            Some(Sentinel::NotFound) => self.not_found += 1,
            Some(Sentinel::ApiError) => self.api_error += 1,
            Some(Sentinel::ProcessingError) => self.processing_error += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.resolved
    }
}
