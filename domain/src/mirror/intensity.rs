//! Challenger intensity levels

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Severity of the challenger's critique
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Mild,
    #[default]
    Moderate,
    Aggressive,
}

impl Intensity {
    pub const ALL: [Intensity; 3] = [Intensity::Mild, Intensity::Moderate, Intensity::Aggressive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Mild => "mild",
            Intensity::Moderate => "moderate",
            Intensity::Aggressive => "aggressive",
        }
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Intensity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Ok(Intensity::Mild),
            "moderate" => Ok(Intensity::Moderate),
            "aggressive" => Ok(Intensity::Aggressive),
            other => Err(DomainError::InvalidIntensity(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_parse() {
        assert_eq!("Mild".parse::<Intensity>().unwrap(), Intensity::Mild);
        assert_eq!("aggressive".parse::<Intensity>().unwrap(), Intensity::Aggressive);
        assert!("brutal".parse::<Intensity>().is_err());
    }

    #[test]
    fn test_intensity_default_is_moderate() {
        assert_eq!(Intensity::default(), Intensity::Moderate);
    }
}
