//! Deployment environments tracked per service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One of the three deployment tiers a service version can be deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Business-as-usual (staging-like).
    Bau,
    /// User acceptance test.
    Uat,
    /// Production.
    Prod,
}

impl Environment {
    /// Every environment, in promotion order.
    pub const ALL: [Environment; 3] = [Environment::Bau, Environment::Uat, Environment::Prod];

    /// Wire / column representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Bau => "bau",
            Environment::Uat => "uat",
            Environment::Prod => "prod",
        }
    }

    /// Human-readable label used in activity text.
    pub fn label(self) -> &'static str {
        match self {
            Environment::Bau => "BAU",
            Environment::Uat => "UAT",
            Environment::Prod => "PROD",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bau" => Ok(Environment::Bau),
            "uat" => Ok(Environment::Uat),
            "prod" => Ok(Environment::Prod),
            other => Err(CoreError::Validation(format!(
                "Unknown environment '{other}'. Must be one of: bau, uat, prod"
            ))),
        }
    }
}
