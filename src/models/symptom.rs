use serde::{Deserialize, Serialize};

use super::enums::Frequency;

/// Highest severity a symptom can carry (0–10 scale).
pub const MAX_SEVERITY: u8 = 10;

/// A single named complaint supplied by the user.
///
/// Created when the user commits free text or a suggestion chip. Only
/// severity/frequency/location are mutated in place afterwards; symptoms are
/// never deleted mid-session, only superseded by starting a new check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    /// Opaque, caller-assigned id, unique within a session.
    pub id: String,
    pub name: String,
    /// 0–10 scale.
    pub severity: u8,
    pub frequency: Frequency,
    pub body_part: Option<String>,
}

impl Symptom {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            severity: 5,
            frequency: Frequency::default(),
            body_part: None,
        }
    }

    /// Parse a committed free-text entry, picking up optional
    /// "severity N" and "frequency F" hints:
    /// `"Headache, severity 6, frequency Often"` → name "Headache", 6, Often.
    ///
    /// Segments that don't match a hint are folded back into the name.
    pub fn from_free_text(id: impl Into<String>, raw: &str) -> Option<Self> {
        let mut name_parts: Vec<&str> = Vec::new();
        let mut severity = None;
        let mut frequency = None;
        let mut body_part = None;

        for segment in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let lower = segment.to_ascii_lowercase();
            if let Some(rest) = lower.strip_prefix("severity") {
                if let Ok(value) = rest.trim().trim_end_matches("/10").parse::<u8>() {
                    severity = Some(value.min(MAX_SEVERITY));
                    continue;
                }
            }
            if let Some(rest) = lower.strip_prefix("frequency") {
                if let Some(value) = Frequency::parse_loose(rest) {
                    frequency = Some(value);
                    continue;
                }
            }
            if let Some(rest) = lower.strip_prefix("location") {
                let loc = rest.trim_start_matches(':').trim();
                if !loc.is_empty() {
                    // Preserve the user's original casing for the location.
                    let offset = segment.len() - loc.len();
                    body_part = Some(segment[offset..].trim().to_string());
                    continue;
                }
            }
            name_parts.push(segment);
        }

        let name = name_parts.join(", ");
        if name.is_empty() {
            return None;
        }

        let mut symptom = Self::new(id, name);
        if let Some(s) = severity {
            symptom.severity = s;
        }
        if let Some(f) = frequency {
            symptom.frequency = f;
        }
        symptom.body_part = body_part;
        Some(symptom)
    }

    /// Render for the consolidated symptom summary sent to the AI backend:
    /// `"Headache (Severity: 6/10, Frequency: Often, Location: head)"`.
    pub fn describe(&self) -> String {
        match &self.body_part {
            Some(part) => format!(
                "{} (Severity: {}/10, Frequency: {}, Location: {})",
                self.name, self.severity, self.frequency, part
            ),
            None => format!(
                "{} (Severity: {}/10, Frequency: {})",
                self.name, self.severity, self.frequency
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_symptom_defaults() {
        let s = Symptom::new("s1", "Headache");
        assert_eq!(s.severity, 5);
        assert_eq!(s.frequency, Frequency::Sometimes);
        assert!(s.body_part.is_none());
    }

    #[test]
    fn from_free_text_full_hints() {
        let s = Symptom::from_free_text("s1", "Headache, severity 6, frequency Often").unwrap();
        assert_eq!(s.name, "Headache");
        assert_eq!(s.severity, 6);
        assert_eq!(s.frequency, Frequency::Often);
    }

    #[test]
    fn from_free_text_name_only() {
        let s = Symptom::from_free_text("s1", "Sore throat").unwrap();
        assert_eq!(s.name, "Sore throat");
        assert_eq!(s.severity, 5);
    }

    #[test]
    fn from_free_text_location_hint() {
        let s = Symptom::from_free_text("s1", "Sharp pain, location: Lower Back").unwrap();
        assert_eq!(s.name, "Sharp pain");
        assert_eq!(s.body_part.as_deref(), Some("Lower Back"));
    }

    #[test]
    fn from_free_text_clamps_severity() {
        let s = Symptom::from_free_text("s1", "Migraine, severity 14").unwrap();
        assert_eq!(s.severity, MAX_SEVERITY);
    }

    #[test]
    fn from_free_text_unknown_segments_join_name() {
        let s = Symptom::from_free_text("s1", "Cough, dry, worse at night").unwrap();
        assert_eq!(s.name, "Cough, dry, worse at night");
    }

    #[test]
    fn from_free_text_empty_is_none() {
        assert!(Symptom::from_free_text("s1", "").is_none());
        assert!(Symptom::from_free_text("s1", " , ,").is_none());
        assert!(Symptom::from_free_text("s1", "severity 6").is_none());
    }

    #[test]
    fn describe_without_location() {
        let mut s = Symptom::new("s1", "Headache");
        s.severity = 6;
        s.frequency = Frequency::Often;
        assert_eq!(s.describe(), "Headache (Severity: 6/10, Frequency: Often)");
    }

    #[test]
    fn describe_with_location() {
        let mut s = Symptom::new("s1", "Pain");
        s.severity = 8;
        s.frequency = Frequency::Always;
        s.body_part = Some("left knee".into());
        assert_eq!(
            s.describe(),
            "Pain (Severity: 8/10, Frequency: Always, Location: left knee)"
        );
    }
}
