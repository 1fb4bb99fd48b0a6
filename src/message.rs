use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;
use crate::label::LabelClass;

/// Event notification pushed by the console endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub socket: String,
    pub details: String,
    pub time: EventTime,
}

impl ConsoleEvent {
    /// Parse a raw text frame
    pub fn parse(raw: &str) -> Result<Self, ConsoleError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn label(&self) -> LabelClass {
        LabelClass::for_event_type(&self.event_type)
    }
}

/// Server timestamp, shown as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Text(text) => f.write_str(text),
            EventTime::Number(number) => write!(f, "{}", number),
        }
    }
}
