use crate::error::ConsoleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target environment label. The mock backend only records it; the HTTP
/// backend uses it to pick a base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    #[default]
    Dev,
    Test,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Dev, Environment::Test, Environment::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "DEV",
            Environment::Test => "TEST",
            Environment::Prod => "PROD",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Dev => "https://api-dev.finance-debug.internal/v1",
            Environment::Test => "https://api-test.finance-debug.internal/v1",
            Environment::Prod => "https://api-prod.finance-debug.internal/v1",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEV" => Ok(Environment::Dev),
            "TEST" => Ok(Environment::Test),
            "PROD" => Ok(Environment::Prod),
            _ => Err(ConsoleError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Base URL per environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseUrls {
    pub dev: String,
    pub test: String,
    pub prod: String,
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self {
            dev: Environment::Dev.default_base_url().to_string(),
            test: Environment::Test.default_base_url().to_string(),
            prod: Environment::Prod.default_base_url().to_string(),
        }
    }
}

impl BaseUrls {
    /// Same URL for every environment; handy for pointing at a local stub.
    pub fn uniform(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            dev: url.clone(),
            test: url.clone(),
            prod: url,
        }
    }

    pub fn get(&self, env: Environment) -> &str {
        match env {
            Environment::Dev => &self.dev,
            Environment::Test => &self.test,
            Environment::Prod => &self.prod,
        }
    }

    pub fn set(&mut self, env: Environment, url: String) {
        match env {
            Environment::Dev => self.dev = url,
            Environment::Test => self.test = url,
            Environment::Prod => self.prod = url,
        }
    }
}
