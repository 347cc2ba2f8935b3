use clap::Parser;
use loghost_core::{InstanceId, LogDestination, LoggerConfig};

/// Command-line surface for the service half of a split command line.
///
/// The action is a plain positional rather than a subcommand: it is resolved
/// against the sorted action table after parsing, so an unrecognized keyword
/// surfaces as the same usage error the original tooling produced.
#[derive(Debug, Parser)]
#[command(
    name = "loghost",
    about = "Control plane for a singleton background logger",
    after_help = "\
Supported actions:
  start   Run a logger instance in the foreground (blocking). An optional
          external command, introduced by --, is run behind the logger; the
          logger returns once that command terminates or the logger is
          externally stopped. Without a command, Ctrl-C or the stop action
          stops the logger.
  spawn   Run a logger instance in the background and wait until it is ready.
  stop    Stop a separately running logger instance.
  status  Report on a running logger instance (not yet implemented)."
)]
pub struct Cli {
    /// A unique (up to 16 character) id for the logger instance.
    #[arg(long, value_name = "ID", default_value = "", value_parser = parse_instance_id)]
    pub instance_id: InstanceId,

    /// Where logs are written: stdout (the default), stderr, or a file path.
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<String>,

    /// Append to (instead of truncating) the output file.
    #[arg(long)]
    pub append: bool,

    /// The action to perform: start, spawn, stop or status.
    #[arg(value_name = "ACTION")]
    pub action: String,
}

impl Cli {
    pub fn into_config(self) -> LoggerConfig {
        LoggerConfig {
            instance_id: self.instance_id,
            destination: self
                .output_file
                .as_deref()
                .map(LogDestination::parse)
                .unwrap_or_default(),
            append: self.append,
        }
    }
}

fn parse_instance_id(raw: &str) -> Result<InstanceId, String> {
    raw.parse().map_err(|err: loghost_core::ControlError| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["loghost", "start"]).unwrap();
        assert!(cli.instance_id.is_empty());
        assert_eq!(cli.action, "start");
        let config = cli.into_config();
        assert_eq!(config.destination, LogDestination::Stdout);
        assert!(!config.append);
    }

    #[test]
    fn options_are_collected() {
        let cli = Cli::try_parse_from([
            "loghost",
            "--instance-id",
            "t1",
            "--output-file",
            "/tmp/out.log",
            "--append",
            "start",
        ])
        .unwrap();
        let config = cli.into_config();
        assert_eq!(config.instance_id.as_str(), "t1");
        assert_eq!(
            config.destination,
            LogDestination::File(PathBuf::from("/tmp/out.log"))
        );
        assert!(config.append);
    }

    #[test]
    fn oversized_instance_id_is_rejected() {
        let long = "a".repeat(17);
        let result = Cli::try_parse_from(["loghost", "--instance-id", long.as_str(), "start"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_action_is_an_error() {
        assert!(Cli::try_parse_from(["loghost", "--append"]).is_err());
    }
}
