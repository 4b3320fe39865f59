//! # Navigation Scripts
//!
//! Host actions for the `simulate` and `trace` commands.
//!
//! | Token              | Action                              |
//! |--------------------|-------------------------------------|
//! | `forward`, `f`     | `go_forward()`                      |
//! | `back`, `b`        | `go_backward()`                     |
//! | `goto:N`           | `go_to(N)`                          |
//! | `wait`             | wait until the transition settles   |
//! | `wait:MS`          | let `MS` milliseconds pass          |
//! | `dispose`          | tear the controller down            |
//!
//! Tokens may be passed as separate arguments or comma-separated.

use stagewise_core::StageError;
use std::str::FromStr;

/// One scripted host action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Forward,
    Backward,
    GoTo(usize),
    Settle,
    Wait(u64),
    Dispose,
}

impl ScriptStep {
    /// Short label used in frame output.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Forward => "forward".to_string(),
            Self::Backward => "back".to_string(),
            Self::GoTo(n) => format!("goto:{}", n),
            Self::Settle => "wait".to_string(),
            Self::Wait(ms) => format!("wait:{}", ms),
            Self::Dispose => "dispose".to_string(),
        }
    }
}

impl FromStr for ScriptStep {
    type Err = StageError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim().to_ascii_lowercase();
        let (name, arg) = match token.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (token.as_str(), None),
        };

        match (name, arg) {
            ("forward" | "f" | "next", None) => Ok(Self::Forward),
            ("back" | "b" | "backward", None) => Ok(Self::Backward),
            ("wait" | "w", None) => Ok(Self::Settle),
            ("dispose", None) => Ok(Self::Dispose),
            ("goto" | "g", Some(arg)) => arg
                .parse()
                .map(Self::GoTo)
                .map_err(|_| StageError::Script(format!("Invalid stage index '{}'", arg))),
            ("wait" | "w", Some(arg)) => arg
                .parse()
                .map(Self::Wait)
                .map_err(|_| StageError::Script(format!("Invalid wait duration '{}'", arg))),
            _ => Err(StageError::Script(format!("Unknown step '{}'", token))),
        }
    }
}

/// Parse script arguments, splitting each on commas.
pub fn parse_script<S: AsRef<str>>(args: &[S]) -> Result<Vec<ScriptStep>, StageError> {
    args.iter()
        .flat_map(|arg| arg.as_ref().split(','))
        .filter(|token| !token.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_tokens() {
        let steps = parse_script(&["f,f", "wait", "goto:3", "wait:250", "B", "dispose"])
            .expect("parse");
        assert_eq!(
            steps,
            vec![
                ScriptStep::Forward,
                ScriptStep::Forward,
                ScriptStep::Settle,
                ScriptStep::GoTo(3),
                ScriptStep::Wait(250),
                ScriptStep::Backward,
                ScriptStep::Dispose,
            ]
        );
    }

    #[test]
    fn negative_index_is_a_script_error() {
        assert!(matches!(
            "goto:-1".parse::<ScriptStep>(),
            Err(StageError::Script(_))
        ));
    }

    #[test]
    fn unknown_token_rejected() {
        assert!(parse_script(&["sideways"]).is_err());
    }

    #[test]
    fn labels_round_trip_through_parser() {
        for step in [ScriptStep::GoTo(2), ScriptStep::Wait(40), ScriptStep::Backward] {
            assert_eq!(step.label().parse::<ScriptStep>().expect("parse"), step);
        }
    }
}
