/// Visit records and the URL -> Visit map loaded from the history export
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// One entry of the history export. Both fields are kept exactly as they
/// appear in the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    pub visits: Value,
    pub contexts: Value,
}

impl Visit {
    pub fn new(visits: Value, contexts: Value) -> Visit {
        Visit { visits, contexts }
    }
}

impl fmt::Display for Visit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.visits {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

/// Mapping from exact URL string to its visit record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitMap {
    visits: HashMap<String, Visit>,
}

impl VisitMap {
    /// Parse the history export: a JSON object whose values are all
    /// two-element arrays. Any other shape rejects the whole file.
    pub fn from_json(text: &str) -> Result<VisitMap, serde_json::Error> {
        let raw: HashMap<String, (Value, Value)> = serde_json::from_str(text)?;

        let visits = raw
            .into_iter()
            .map(|(url, (visits, contexts))| (url, Visit::new(visits, contexts)))
            .collect();

        Ok(VisitMap { visits })
    }

    pub fn get(&self, url: &str) -> Option<&Visit> {
        self.visits.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.visits.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}
