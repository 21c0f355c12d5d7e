//! Prospective scenarios and the process-wide scenario selector
//!
//! Prospective metrics depend on an IAM-SSP-RCP scenario. Each integrated assessment
//! model is paired with a single SSP and a subset of RCPs; only those combinations
//! have radiative efficiency tables.
//!
//! Computations take the scenario explicitly. The global selector exists for
//! convenience: it is guarded by a lock, but overlapping `set_scenario` and
//! `characterize` calls from different threads still observe each other, so callers
//! that need isolation should pass the scenario explicitly instead.

use crate::errors::{CharacterizationError, CharacterizationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

/// Integrated Assessment Model
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Iam {
    Image,
    Aim,
    Gcam4,
    Message,
    Remind,
}

/// Shared Socioeconomic Pathway
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ssp {
    Ssp1,
    Ssp2,
    Ssp3,
    Ssp4,
    Ssp5,
}

/// Representative Concentration Pathway, identified by its 2100 forcing level
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rcp {
    #[serde(rename = "2.6")]
    Rcp26,
    #[serde(rename = "4.5")]
    Rcp45,
    #[serde(rename = "6.0")]
    Rcp60,
    #[serde(rename = "8.5")]
    Rcp85,
}

impl Iam {
    pub fn as_str(&self) -> &'static str {
        match self {
            Iam::Image => "IMAGE",
            Iam::Aim => "AIM",
            Iam::Gcam4 => "GCAM4",
            Iam::Message => "MESSAGE",
            Iam::Remind => "REMIND",
        }
    }
}

impl Ssp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ssp::Ssp1 => "SSP1",
            Ssp::Ssp2 => "SSP2",
            Ssp::Ssp3 => "SSP3",
            Ssp::Ssp4 => "SSP4",
            Ssp::Ssp5 => "SSP5",
        }
    }
}

impl Rcp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rcp::Rcp26 => "2.6",
            Rcp::Rcp45 => "4.5",
            Rcp::Rcp60 => "6.0",
            Rcp::Rcp85 => "8.5",
        }
    }
}

impl FromStr for Iam {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IMAGE" => Ok(Iam::Image),
            "AIM" => Ok(Iam::Aim),
            "GCAM4" => Ok(Iam::Gcam4),
            "MESSAGE" => Ok(Iam::Message),
            "REMIND" => Ok(Iam::Remind),
            _ => Err(()),
        }
    }
}

impl FromStr for Ssp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SSP1" => Ok(Ssp::Ssp1),
            "SSP2" => Ok(Ssp::Ssp2),
            "SSP3" => Ok(Ssp::Ssp3),
            "SSP4" => Ok(Ssp::Ssp4),
            "SSP5" => Ok(Ssp::Ssp5),
            _ => Err(()),
        }
    }
}

impl FromStr for Rcp {
    type Err = ();

    /// Accepts "2.6", "26", "RCP2.6" and "RCP26" spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_uppercase();
        let s = s.strip_prefix("RCP").unwrap_or(&s);
        match s.replace('.', "").as_str() {
            "26" => Ok(Rcp::Rcp26),
            "45" => Ok(Rcp::Rcp45),
            "60" => Ok(Rcp::Rcp60),
            "85" => Ok(Rcp::Rcp85),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Iam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Ssp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Rcp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Valid IAM-SSP-RCP combinations
pub const VALID_SCENARIOS: [(Iam, Ssp, Rcp); 11] = [
    (Iam::Image, Ssp::Ssp1, Rcp::Rcp26),
    (Iam::Image, Ssp::Ssp1, Rcp::Rcp45),
    (Iam::Aim, Ssp::Ssp3, Rcp::Rcp45),
    (Iam::Aim, Ssp::Ssp3, Rcp::Rcp60),
    (Iam::Gcam4, Ssp::Ssp4, Rcp::Rcp26),
    (Iam::Gcam4, Ssp::Ssp4, Rcp::Rcp45),
    (Iam::Gcam4, Ssp::Ssp4, Rcp::Rcp60),
    (Iam::Message, Ssp::Ssp2, Rcp::Rcp45),
    (Iam::Message, Ssp::Ssp2, Rcp::Rcp60),
    (Iam::Remind, Ssp::Ssp5, Rcp::Rcp45),
    (Iam::Remind, Ssp::Ssp5, Rcp::Rcp85),
];

/// A validated IAM-SSP-RCP scenario
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "ScenarioFields")]
pub struct Scenario {
    iam: Iam,
    ssp: Ssp,
    rcp: Rcp,
}

#[derive(Deserialize)]
struct ScenarioFields {
    iam: Iam,
    ssp: Ssp,
    rcp: Rcp,
}

impl TryFrom<ScenarioFields> for Scenario {
    type Error = CharacterizationError;

    fn try_from(value: ScenarioFields) -> Result<Self, Self::Error> {
        Scenario::new(value.iam, value.ssp, value.rcp)
    }
}

impl Scenario {
    /// Create a scenario, checking the combination is one with published data
    pub fn new(iam: Iam, ssp: Ssp, rcp: Rcp) -> CharacterizationResult<Self> {
        if VALID_SCENARIOS.contains(&(iam, ssp, rcp)) {
            Ok(Self { iam, ssp, rcp })
        } else {
            Err(CharacterizationError::InvalidScenario {
                iam: iam.to_string(),
                ssp: ssp.to_string(),
                rcp: rcp.to_string(),
            })
        }
    }

    /// Parse and validate a scenario from its string identifiers
    pub fn parse(iam: &str, ssp: &str, rcp: &str) -> CharacterizationResult<Self> {
        let invalid = || CharacterizationError::InvalidScenario {
            iam: iam.to_string(),
            ssp: ssp.to_string(),
            rcp: rcp.to_string(),
        };
        let parsed_iam = iam.parse().map_err(|_| invalid())?;
        let parsed_ssp = ssp.parse().map_err(|_| invalid())?;
        let parsed_rcp = rcp.parse().map_err(|_| invalid())?;
        Self::new(parsed_iam, parsed_ssp, parsed_rcp)
    }

    /// All valid scenarios
    pub fn all() -> Vec<Scenario> {
        VALID_SCENARIOS
            .iter()
            .map(|&(iam, ssp, rcp)| Scenario { iam, ssp, rcp })
            .collect()
    }

    pub fn iam(&self) -> Iam {
        self.iam
    }

    pub fn ssp(&self) -> Ssp {
        self.ssp
    }

    pub fn rcp(&self) -> Rcp {
        self.rcp
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.iam, self.ssp, self.rcp)
    }
}

static CURRENT_SCENARIO: RwLock<Option<Scenario>> = RwLock::new(None);

/// Select the process-wide scenario used by prospective metrics.
///
/// On failure the previously selected scenario is left unchanged.
pub fn set_scenario(iam: &str, ssp: &str, rcp: &str) -> CharacterizationResult<Scenario> {
    let scenario = Scenario::parse(iam, ssp, rcp)?;
    select_scenario(scenario);
    Ok(scenario)
}

/// Select an already validated scenario
pub fn select_scenario(scenario: Scenario) {
    let mut current = CURRENT_SCENARIO
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *current = Some(scenario);
    log::debug!("Selected scenario {scenario}");
}

/// The currently selected scenario, `None` when unset
pub fn get_scenario() -> Option<Scenario> {
    *CURRENT_SCENARIO
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Clear the selected scenario
pub fn reset_scenario() {
    let mut current = CURRENT_SCENARIO
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *current = None;
}

/// The explicit scenario if given, otherwise the selected one
pub fn resolve_scenario(explicit: Option<Scenario>) -> CharacterizationResult<Scenario> {
    explicit
        .or_else(get_scenario)
        .ok_or(CharacterizationError::MissingScenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scenarios_are_unique() {
        let mut scenarios = Scenario::all();
        scenarios.sort();
        scenarios.dedup();
        assert_eq!(scenarios.len(), VALID_SCENARIOS.len());
    }

    #[test]
    fn test_parse_valid() {
        let scenario = Scenario::parse("IMAGE", "SSP1", "2.6").unwrap();
        assert_eq!(scenario.iam(), Iam::Image);
        assert_eq!(scenario.ssp(), Ssp::Ssp1);
        assert_eq!(scenario.rcp(), Rcp::Rcp26);
        assert_eq!(scenario.to_string(), "IMAGE-SSP1-2.6");
    }

    #[test]
    fn test_parse_rcp_spellings() {
        for spelling in ["8.5", "85", "RCP8.5", "rcp85"] {
            assert_eq!(spelling.parse::<Rcp>(), Ok(Rcp::Rcp85));
        }
    }

    #[test]
    fn test_parse_unknown_iam() {
        let err = Scenario::parse("FOO", "SSP1", "2.6").unwrap_err();
        assert!(matches!(err, CharacterizationError::InvalidScenario { .. }));
    }

    #[test]
    fn test_mismatched_ssp() {
        // IMAGE is only paired with SSP1
        let err = Scenario::new(Iam::Image, Ssp::Ssp3, Rcp::Rcp26).unwrap_err();
        assert!(err.to_string().contains("(IMAGE, SSP3, 2.6)"));
    }

    #[test]
    fn test_unsupported_rcp() {
        assert!(Scenario::parse("IMAGE", "SSP1", "8.5").is_err());
        assert!(Scenario::parse("REMIND", "SSP5", "8.5").is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Scenario =
            serde_json::from_str(r#"{"iam": "GCAM4", "ssp": "SSP4", "rcp": "6.0"}"#).unwrap();
        assert_eq!(ok.to_string(), "GCAM4-SSP4-6.0");

        let invalid =
            serde_json::from_str::<Scenario>(r#"{"iam": "AIM", "ssp": "SSP1", "rcp": "4.5"}"#);
        assert!(invalid.is_err());
    }
}
