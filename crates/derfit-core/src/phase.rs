//! Phase types and the escalation map that ties them to connection categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;
use crate::text::normalize;

/// Electrical service type of a consumer unit.
///
/// The declaration order is the escalation order: a customer can move from single- to
/// two- to three-phase service, never backward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    Single,
    Two,
    Three,
}

impl PhaseType {
    /// All phase types in escalation order
    pub const ALL: [PhaseType; 3] = [PhaseType::Single, PhaseType::Two, PhaseType::Three];

    /// This phase type followed by every later one.
    pub fn escalation_path(self) -> impl Iterator<Item = PhaseType> {
        Self::ALL.into_iter().filter(move |phase| *phase >= self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseType::Single => "single",
            PhaseType::Two => "two",
            PhaseType::Three => "three",
        }
    }

    /// Label used by the project update form and the history log.
    pub fn form_label(self) -> &'static str {
        match self {
            PhaseType::Single => "Monofásico",
            PhaseType::Two => "Bifásico",
            PhaseType::Three => "Trifásico",
        }
    }
}

impl fmt::Display for PhaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-phase", self.as_str())
    }
}

impl FromStr for PhaseType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "monofasico" | "mono" | "single" | "single-phase" | "single_phase" | "1" => {
                Ok(PhaseType::Single)
            }
            "bifasico" | "bi" | "two" | "two-phase" | "two_phase" | "2" => Ok(PhaseType::Two),
            "trifasico" | "tri" | "three" | "three-phase" | "three_phase" | "3" => {
                Ok(PhaseType::Three)
            }
            _ => Err(InputError::UnknownPhaseType {
                phase: s.trim().to_string(),
            }),
        }
    }
}

/// Category codes (or code prefixes) admitted by each phase type.
///
/// An entry ending in a letter is a prefix: `"M"` admits `M0`, `M1`, `M12` but not `MX`.
/// An entry ending in a digit only admits that exact code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationMap {
    single: Vec<String>,
    two: Vec<String>,
    three: Vec<String>,
}

impl Default for EscalationMap {
    fn default() -> Self {
        Self::new(["M"], ["B"], ["T"])
    }
}

impl EscalationMap {
    pub fn new<S, I>(single: I, two: I, three: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        let clean = |codes: I| -> Vec<String> {
            codes
                .into_iter()
                .map(|code| canonical_category(code.as_ref()))
                .filter(|code| !code.is_empty())
                .collect()
        };
        Self {
            single: clean(single),
            two: clean(two),
            three: clean(three),
        }
    }

    /// Codes and prefixes configured for a phase type.
    pub fn admitted(&self, phase: PhaseType) -> &[String] {
        match phase {
            PhaseType::Single => &self.single,
            PhaseType::Two => &self.two,
            PhaseType::Three => &self.three,
        }
    }

    /// Whether `category` is reachable under `phase`.
    pub fn admits(&self, phase: PhaseType, category: &str) -> bool {
        let code = canonical_category(category);
        self.admitted(phase)
            .iter()
            .any(|entry| entry_matches(entry, &code))
    }

    /// Phase type whose admitted set contains `category`, if any.
    pub fn phase_of(&self, category: &str) -> Option<PhaseType> {
        PhaseType::ALL
            .into_iter()
            .find(|phase| self.admits(*phase, category))
    }
}

/// Canonical form of a category code: trimmed, uppercase, no inner whitespace.
pub fn canonical_category(code: &str) -> String {
    code.split_whitespace().collect::<String>().to_uppercase()
}

fn entry_matches(entry: &str, code: &str) -> bool {
    if entry == code {
        return true;
    }
    let is_prefix = entry
        .chars()
        .last()
        .is_some_and(|c| c.is_alphabetic());
    is_prefix
        && code
            .strip_prefix(entry)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_parsing_accepts_form_labels() {
        assert_eq!("Monofásico".parse::<PhaseType>().unwrap(), PhaseType::Single);
        assert_eq!("BIFÁSICO".parse::<PhaseType>().unwrap(), PhaseType::Two);
        assert_eq!(" trifasico ".parse::<PhaseType>().unwrap(), PhaseType::Three);
        assert_eq!("three-phase".parse::<PhaseType>().unwrap(), PhaseType::Three);
        assert_eq!("1".parse::<PhaseType>().unwrap(), PhaseType::Single);
    }

    #[test]
    fn test_unknown_phase_is_input_error() {
        let err = "quadrifásico".parse::<PhaseType>().unwrap_err();
        assert_eq!(
            err,
            InputError::UnknownPhaseType {
                phase: "quadrifásico".to_string()
            }
        );
    }

    #[test]
    fn test_escalation_path_never_goes_backward() {
        let path: Vec<_> = PhaseType::Two.escalation_path().collect();
        assert_eq!(path, vec![PhaseType::Two, PhaseType::Three]);

        let path: Vec<_> = PhaseType::Single.escalation_path().collect();
        assert_eq!(path, PhaseType::ALL.to_vec());

        let path: Vec<_> = PhaseType::Three.escalation_path().collect();
        assert_eq!(path, vec![PhaseType::Three]);
    }

    #[test]
    fn test_default_map_uses_letter_prefixes() {
        let map = EscalationMap::default();
        assert!(map.admits(PhaseType::Single, "M1"));
        assert!(map.admits(PhaseType::Single, " m 2 "));
        assert!(map.admits(PhaseType::Three, "T12"));
        assert!(!map.admits(PhaseType::Single, "T3"));
        assert!(!map.admits(PhaseType::Single, "MX"));
        assert_eq!(map.phase_of("B2"), Some(PhaseType::Two));
        assert_eq!(map.phase_of("A4"), None);
    }

    #[test]
    fn test_exact_codes_do_not_act_as_prefixes() {
        let map = EscalationMap::new(vec!["M1", "M2"], vec!["B1"], vec!["T"]);
        assert!(map.admits(PhaseType::Single, "M1"));
        assert!(!map.admits(PhaseType::Single, "M10"));
        assert!(!map.admits(PhaseType::Two, "B2"));
        assert_eq!(map.admitted(PhaseType::Three), ["T".to_string()]);
    }

    #[test]
    fn test_display() {
        assert_eq!(PhaseType::Single.to_string(), "single-phase");
        assert_eq!(PhaseType::Three.form_label(), "Trifásico");
    }
}
