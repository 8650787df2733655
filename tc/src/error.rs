//! Errors raised while configuring a target or laying out a frame.
//!
//! Running out of memory or temporaries is not represented here: those abort
//! the compilation outright.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("word size must be positive, got {0}")]
    InvalidWordSize(i64),

    #[error("word size {word_size} is larger than the supported maximum of {max}")]
    WordSizeTooLarge { word_size: i64, max: i64 },

    #[error("stack alignment {alignment} is larger than the supported maximum of {max}")]
    StackAlignmentTooLarge { alignment: i64, max: i64 },

    #[error("at least one argument register is required")]
    NoArgumentRegisters,

    #[error("stack alignment {alignment} is not a positive multiple of the word size {word_size}")]
    InvalidStackAlignment { alignment: i64, word_size: i64 },

    #[error("register table has an empty register name in role `{role}`")]
    EmptyRegisterName { role: &'static str },

    #[error("register `{name}` is assigned to more than one role")]
    DuplicateRegister { name: String },

    #[error("frame `{name}` declares {expected} formals but {found} escape flags were given")]
    FormalCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, FrameError>;
