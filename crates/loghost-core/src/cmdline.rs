use crate::error::ControlError;

/// A raw argument list partitioned into the service's own arguments and an
/// optional child command to supervise.
///
/// The split happens before option parsing: everything up to and including
/// the first non-switch token (the action) belongs to the service, the rest
/// is the child command. An optional `--` sentinel directly after the action
/// is consumed by the split. Without this, switches intended for the child
/// would be folded into the service's own option set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitCommandLine {
    pub service: Vec<String>,
    pub child: Option<Vec<String>>,
}

impl SplitCommandLine {
    /// Split a raw argument list. The first token must be the program name;
    /// an empty list is a caller bug and fails fast as a usage error.
    pub fn split(raw: &[String]) -> Result<Self, ControlError> {
        let Some(program) = raw.first() else {
            return Err(ControlError::Usage("empty command line".into()));
        };

        let mut service = vec![program.clone()];
        let mut rest_start = raw.len();
        for (index, token) in raw.iter().enumerate().skip(1) {
            service.push(token.clone());
            if !token.starts_with('-') {
                rest_start = index + 1;
                break;
            }
        }

        let mut rest = &raw[rest_start..];
        if rest.first().map(String::as_str) == Some("--") {
            rest = &rest[1..];
        }

        let child = if rest.is_empty() {
            None
        } else {
            Some(rest.to_vec())
        };

        Ok(SplitCommandLine { service, child })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn empty_command_line_fails_fast() {
        let err = SplitCommandLine::split(&[]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn action_only() {
        let split = SplitCommandLine::split(&args(&["loghost", "start"])).unwrap();
        assert_eq!(split.service, args(&["loghost", "start"]));
        assert_eq!(split.child, None);
    }

    #[test]
    fn switches_before_action_stay_with_the_service() {
        let split = SplitCommandLine::split(&args(&[
            "loghost",
            "--instance-id",
            "--append",
            "start",
        ]))
        .unwrap();
        assert_eq!(
            split.service,
            args(&["loghost", "--instance-id", "--append", "start"])
        );
        assert_eq!(split.child, None);
    }

    #[test]
    fn everything_after_the_action_is_the_child_command() {
        let split = SplitCommandLine::split(&args(&[
            "loghost", "--append", "start", "worker", "--verbose",
        ]))
        .unwrap();
        assert_eq!(split.service, args(&["loghost", "--append", "start"]));
        assert_eq!(split.child, Some(args(&["worker", "--verbose"])));
    }

    #[test]
    fn sentinel_is_consumed_and_excluded_from_both_halves() {
        let split = SplitCommandLine::split(&args(&[
            "loghost", "start", "--", "worker", "--flag",
        ]))
        .unwrap();
        assert_eq!(split.service, args(&["loghost", "start"]));
        assert_eq!(split.child, Some(args(&["worker", "--flag"])));
    }

    #[test]
    fn trailing_sentinel_alone_means_no_child() {
        let split = SplitCommandLine::split(&args(&["loghost", "start", "--"])).unwrap();
        assert_eq!(split.child, None);
    }

    #[test]
    fn all_switches_and_no_action() {
        let split = SplitCommandLine::split(&args(&["loghost", "--append"])).unwrap();
        assert_eq!(split.service, args(&["loghost", "--append"]));
        assert_eq!(split.child, None);
    }

    #[test]
    fn split_reproduces_the_original_semantics() {
        // service ++ "--" ++ child is equivalent to the original input.
        let original = args(&["loghost", "--append", "start", "worker", "-x"]);
        let split = SplitCommandLine::split(&original).unwrap();
        let mut rejoined = split.service.clone();
        rejoined.push("--".into());
        rejoined.extend(split.child.clone().unwrap());
        let resplit = SplitCommandLine::split(&rejoined).unwrap();
        assert_eq!(resplit, split);
    }
}
