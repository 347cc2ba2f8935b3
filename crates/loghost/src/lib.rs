pub mod cli;
pub mod logger;
pub mod runner;

use clap::Parser;
use clap::error::ErrorKind;
use loghost_core::{ControlError, InstanceNames, SplitCommandLine, find_action};

use cli::Cli;
use runner::ControlPlane;

/// Execute one control-plane invocation from a raw argument list.
pub async fn run(raw: &[String]) -> Result<(), ControlError> {
    let split = SplitCommandLine::split(raw)?;

    let cli = match Cli::try_parse_from(&split.service) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return Ok(());
        }
        Err(err) => return Err(ControlError::Usage(err.to_string())),
    };

    let action = find_action(&cli.action)
        .ok_or_else(|| ControlError::Usage(format!("unrecognized action: {}", cli.action)))?;

    let config = cli.into_config();
    let names = InstanceNames::derive(&config.instance_id);
    ControlPlane::new(config, names, split.child).run(action).await
}
