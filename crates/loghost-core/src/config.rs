use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use derive_builder::Builder;

use crate::error::ControlError;

/// Maximum length, in characters, of an instance identifier.
pub const MAX_INSTANCE_ID_LEN: usize = 16;

/// A short, caller-chosen identifier scoping one logical logger instance.
///
/// The identifier is a naming key only, never a security token. The empty
/// identifier denotes the default, unscoped instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for InstanceId {
    type Err = ControlError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.chars().count() > MAX_INSTANCE_ID_LEN {
            return Err(ControlError::Usage(format!(
                "the instance id '{raw}' is too long; the max length is \
                 {MAX_INSTANCE_ID_LEN} characters"
            )));
        }
        Ok(InstanceId(raw.to_string()))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the logger writes its output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogDestination {
    #[default]
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogDestination {
    /// Parse a destination argument. The literals `stdout` and `stderr`
    /// (case-insensitive) select the standard streams; anything else is a
    /// file path.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("stdout") {
            LogDestination::Stdout
        } else if raw.eq_ignore_ascii_case("stderr") {
            LogDestination::Stderr
        } else {
            LogDestination::File(PathBuf::from(raw))
        }
    }
}

/// Configuration for one control-plane invocation.
#[derive(Debug, Clone, Default, PartialEq, Builder)]
#[builder(setter(into), default)]
pub struct LoggerConfig {
    /// Identifier of the logger instance being started, spawned or stopped.
    pub instance_id: InstanceId,
    /// Output destination for a started logger.
    pub destination: LogDestination,
    /// Append to (instead of truncating) a file destination.
    pub append: bool,
}

impl LoggerConfig {
    pub fn builder() -> LoggerConfigBuilder {
        LoggerConfigBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_id_boundary() {
        let sixteen = "a".repeat(16);
        assert!(sixteen.parse::<InstanceId>().is_ok());

        let seventeen = "a".repeat(17);
        let err = seventeen.parse::<InstanceId>().unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn empty_id_is_default_instance() {
        let id: InstanceId = "".parse().unwrap();
        assert!(id.is_empty());
        assert_eq!(id, InstanceId::default());
    }

    #[test]
    fn destination_literals_are_case_insensitive() {
        assert_eq!(LogDestination::parse("stdout"), LogDestination::Stdout);
        assert_eq!(LogDestination::parse("STDERR"), LogDestination::Stderr);
        assert_eq!(
            LogDestination::parse("/var/log/out.log"),
            LogDestination::File(PathBuf::from("/var/log/out.log"))
        );
    }

    #[test]
    fn config_builder_defaults() {
        let config = LoggerConfig::builder()
            .instance_id("t1".parse::<InstanceId>().unwrap())
            .build()
            .unwrap();
        assert_eq!(config.destination, LogDestination::Stdout);
        assert!(!config.append);
    }
}
