//! Input scripts: one controller state per line, optionally repeated.
//!
//! ```text
//! # walk right for half a second, then jump
//! R x30
//! R J x12
//! .           # one idle tick
//! D
//! ```

use std::path::Path;

use platformer_core::{GameError, InputIntent, InputParseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: {source}")]
    Input {
        line: usize,
        #[source]
        source: InputParseError,
    },

    #[error("line {line}: invalid repeat count '{count}'")]
    Repeat { line: usize, count: String },

    #[error("failed to read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parsed input track.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputScript {
    steps: Vec<(InputIntent, u32)>,
}

impl InputScript {
    /// Short tour of the demo level: run, jump onto the crates, dash and attack.
    pub const DEMO: &'static str = "\
# settle
. x10
R x40
R J x14
R x30
A
. x20
R D
R x20
L J x10
. x60
";

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        let mut steps = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let (tokens, repeat) = match content.rsplit_once(char::is_whitespace) {
                Some((head, tail)) if tail.starts_with(['x', 'X']) => {
                    let count = tail[1..].parse::<u32>().ok().filter(|&n| n > 0).ok_or_else(|| {
                        ScriptError::Repeat {
                            line,
                            count: tail.to_string(),
                        }
                    })?;
                    (head, count)
                }
                _ => (content, 1),
            };
            let intent = tokens
                .parse::<InputIntent>()
                .map_err(|source| ScriptError::Input { line, source })?;
            steps.push((intent, repeat));
        }
        Ok(Self { steps })
    }

    /// Total ticks covered by the script.
    pub fn len(&self) -> u64 {
        self.steps.iter().map(|&(_, n)| u64::from(n)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// One intent per tick.
    pub fn ticks(&self) -> impl Iterator<Item = InputIntent> + '_ {
        self.steps
            .iter()
            .flat_map(|&(intent, n)| std::iter::repeat_n(intent, n as usize))
    }
}

impl ScriptError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Input { source, .. } => source.error_code(),
            Self::Repeat { .. } => "SCRIPT_INVALID_REPEAT",
            Self::Io { .. } => "SCRIPT_IO",
        }
    }
}
