//! City subsystem identifiers.

use crate::error::CityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A monitored city subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Traffic,
    Energy,
    Environmental,
    Population,
}

impl Module {
    /// Modules the forecaster produces predictions for.
    pub const FORECASTED: [Module; 3] = [Module::Traffic, Module::Energy, Module::Environmental];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Traffic => "traffic",
            Module::Energy => "energy",
            Module::Environmental => "environmental",
            Module::Population => "population",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Module {
    type Err = CityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "traffic" => Ok(Module::Traffic),
            "energy" => Ok(Module::Energy),
            "environmental" => Ok(Module::Environmental),
            "population" => Ok(Module::Population),
            _ => Err(CityError::UnknownModule { name: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_parse() {
        assert_eq!("traffic".parse::<Module>().unwrap(), Module::Traffic);
        assert_eq!("Energy".parse::<Module>().unwrap(), Module::Energy);
        assert_eq!(" environmental ".parse::<Module>().unwrap(), Module::Environmental);
        assert!(matches!("weather".parse::<Module>(), Err(CityError::UnknownModule { .. })));
    }

    #[test]
    fn test_forecasted_excludes_population() {
        assert!(!Module::FORECASTED.contains(&Module::Population));
        assert_eq!(Module::FORECASTED.len(), 3);
    }
}
