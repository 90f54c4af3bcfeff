/// Runtime messages accepted by the background script
use crate::visit::Visit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Request {
    /// Visit record for the active tab's URL
    GetVisits,
    /// Reload the history export unconditionally
    RefreshMap,
}

impl Request {
    /// `None` for messages this script doesn't handle
    pub fn parse(message: &serde_json::Value) -> Option<Request> {
        serde_json::from_value(message.clone()).ok()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Visits(Option<Visit>),
    Refreshed { urls: usize },
}

impl Response {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
