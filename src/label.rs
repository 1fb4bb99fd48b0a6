use std::fmt;

/// Style category of the type cell in the events table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelClass {
    Success,
    Danger,
    Info,
    Warning,
}

const KNOWN_TYPES: [(&str, LabelClass); 6] = [
    ("Connection", LabelClass::Success),
    ("Disconnection", LabelClass::Danger),
    ("Subscribed", LabelClass::Info),
    ("Unsubscribed", LabelClass::Info),
    ("Occupied", LabelClass::Info),
    ("Vacated", LabelClass::Info),
];

impl LabelClass {
    /// Look up the category for an event type; unknown types are warnings
    pub fn for_event_type(event_type: &str) -> Self {
        KNOWN_TYPES
            .iter()
            .find(|(name, _)| *name == event_type)
            .map(|(_, label)| *label)
            .unwrap_or(LabelClass::Warning)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelClass::Success => "success",
            LabelClass::Danger => "danger",
            LabelClass::Info => "info",
            LabelClass::Warning => "warning",
        }
    }
}

impl fmt::Display for LabelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_lifecycle_types() {
        assert_eq!(LabelClass::for_event_type("Connection"), LabelClass::Success);
        assert_eq!(LabelClass::for_event_type("Disconnection"), LabelClass::Danger);
        for event_type in ["Subscribed", "Unsubscribed", "Occupied", "Vacated"] {
            assert_eq!(LabelClass::for_event_type(event_type), LabelClass::Info);
        }
    }

    #[test]
    fn unknown_types_are_warnings() {
        assert_eq!(LabelClass::for_event_type("Foo"), LabelClass::Warning);
        assert_eq!(LabelClass::for_event_type("connection"), LabelClass::Warning);
        assert_eq!(LabelClass::for_event_type(""), LabelClass::Warning);
    }

    #[test]
    fn renders_css_class_names() {
        assert_eq!(LabelClass::Danger.to_string(), "danger");
        assert_eq!(LabelClass::Info.as_str(), "info");
    }
}
