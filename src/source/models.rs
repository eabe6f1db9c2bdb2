// EB Env Backup: Configuration record models
//
// Field names are the ones every existing backup was written with; changing
// them breaks restores of old artifacts. Order of environments and variables
// is preserved exactly as the platform reported it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single environment variable.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    #[serde(rename = "VariableName")]
    pub name: String,
    #[serde(rename = "VariableValue")]
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Values are configuration secrets; keep them out of Debug output.
impl fmt::Debug for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVar")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// All application environment variables of one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariables {
    #[serde(rename = "EnvironmentName")]
    pub environment_name: String,
    #[serde(rename = "EnvVarDetails")]
    pub variables: Vec<EnvVar>,
}

/// The whole snapshot: every environment of every application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    #[serde(rename = "EnvironmentDetails")]
    pub environments: Vec<EnvironmentVariables>,
}

impl BackupRecord {
    pub fn variable_count(&self) -> usize {
        self.environments.iter().map(|e| e.variables.len()).sum()
    }

    /// Pretty JSON with a four-space indent, the layout of existing backups.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}
