//! Challenger personas
//!
//! A persona narrows the challenger to one critical lens (investor, security,
//! user, regulator, contrarian). It is combined with an [`Intensity`] when the
//! system prompt is built.
//!
//! [`Intensity`]: super::Intensity

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Persona {
    VcSkeptic,
    SecurityAuditor,
    EndUser,
    Regulator,
    Contrarian,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::VcSkeptic,
        Persona::SecurityAuditor,
        Persona::EndUser,
        Persona::Regulator,
        Persona::Contrarian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::VcSkeptic => "vc-skeptic",
            Persona::SecurityAuditor => "security-auditor",
            Persona::EndUser => "end-user",
            Persona::Regulator => "regulator",
            Persona::Contrarian => "contrarian",
        }
    }

    /// The focus paragraph prepended to the challenger structure
    pub fn lens(&self) -> &'static str {
        match self {
            Persona::VcSkeptic => {
                "You are a skeptical venture investor. Interrogate market sizing, unit economics, \
and competitive moat. Ask what makes this defensible and who pays for it."
            }
            Persona::SecurityAuditor => {
                "You are a security auditor. Map the attack surface, every trust boundary, \
and each failure mode. Estimate the blast radius when something goes wrong."
            }
            Persona::EndUser => {
                "You are the end user who has to live with this. Question whether it meets a real need, \
how adoption would actually happen, and where friction breaks actual behavior."
            }
            Persona::Regulator => {
                "You are a regulator. Look for regulatory exposure, liability, compliance gaps, \
and stakeholder harm that the answer glosses over."
            }
            Persona::Contrarian => {
                "You are a principled contrarian. Argue the opposite of the consensus, cite historical \
failure of similar conventional wisdom, and trace second-order effects."
            }
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Persona {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Persona::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DomainError::InvalidPersona(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_personas_parse() {
        for persona in Persona::ALL {
            assert_eq!(persona.as_str().parse::<Persona>().unwrap(), persona);
        }
    }

    #[test]
    fn test_invalid_persona_names() {
        assert!("unknown".parse::<Persona>().is_err());
        assert!("".parse::<Persona>().is_err());
        assert!("vc_skeptic".parse::<Persona>().is_err());
    }

    #[test]
    fn test_lens_focus_areas() {
        assert!(Persona::VcSkeptic.lens().contains("unit economics"));
        assert!(Persona::SecurityAuditor.lens().contains("attack surface"));
        assert!(Persona::EndUser.lens().contains("adoption"));
        assert!(Persona::Regulator.lens().contains("liability"));
        assert!(Persona::Contrarian.lens().contains("second-order"));
    }
}
