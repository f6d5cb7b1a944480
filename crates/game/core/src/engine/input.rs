use std::str::FromStr;

use crate::error::{ErrorSeverity, GameError};

/// Controller state sampled once per tick.
///
/// `left`, `right` and `jump` are held keys. The ability fields are presses:
/// the engine acts on them during the tick they are set and treats a cleared
/// `dash` as the dash key being released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
    pub dash: bool,
    pub block: bool,
    pub spell: bool,
    pub transform: bool,
}

impl InputIntent {
    pub const IDLE: Self = Self {
        left: false,
        right: false,
        jump: false,
        attack: false,
        dash: false,
        block: false,
        spell: false,
        transform: false,
    };

    pub fn right() -> Self {
        Self { right: true, ..Self::IDLE }
    }

    pub fn left() -> Self {
        Self { left: true, ..Self::IDLE }
    }

    #[must_use]
    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    #[must_use]
    pub fn with_dash(mut self) -> Self {
        self.dash = true;
        self
    }

    #[must_use]
    pub fn with_attack(mut self) -> Self {
        self.attack = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InputParseError {
    #[error("unknown input token '{0}', expected one of L R J A D B S T")]
    UnknownToken(char),
}

impl GameError for InputParseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownToken(_) => "INPUT_UNKNOWN_TOKEN",
        }
    }
}

/// Parses a compact token string such as `"R J"` or `"L+D"`.
///
/// Tokens are case-insensitive single letters: `L`eft, `R`ight, `J`ump,
/// `A`ttack, `D`ash, `B`lock, `S`pell, `T`ransform. `.`, `+`, `,` and
/// whitespace are separators; an empty string is an idle tick.
impl FromStr for InputIntent {
    type Err = InputParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut intent = Self::IDLE;
        for c in s.chars() {
            match c.to_ascii_uppercase() {
                'L' => intent.left = true,
                'R' => intent.right = true,
                'J' => intent.jump = true,
                'A' => intent.attack = true,
                'D' => intent.dash = true,
                'B' => intent.block = true,
                'S' => intent.spell = true,
                'T' => intent.transform = true,
                '.' | '+' | ',' => {}
                c if c.is_whitespace() => {}
                other => return Err(InputParseError::UnknownToken(other)),
            }
        }
        Ok(intent)
    }
}
