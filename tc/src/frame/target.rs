//! Architecture parameters the frame layer is retargeted with.
//!
//! Nothing downstream hard-codes the word size, the argument register budget
//! or register names; they are all read off a validated [`Target`].

use itertools::Itertools;

use crate::error::{FrameError, Result};

pub const RBP: &str = "rbp";
pub const RSP: &str = "rsp";
pub const RAX: &str = "rax";
pub const RBX: &str = "rbx";
pub const RDI: &str = "rdi";
pub const RSI: &str = "rsi";
pub const RDX: &str = "rdx";
pub const RCX: &str = "rcx";
pub const R8: &str = "r8";
pub const R9: &str = "r9";
pub const R10: &str = "r10";
pub const R11: &str = "r11";
pub const R12: &str = "r12";
pub const R13: &str = "r13";
pub const R14: &str = "r14";
pub const R15: &str = "r15";

/// Largest word size a [`Target`] accepts, in bytes. Offsets are computed as
/// plain `i64` products of the word size, so it has to stay far from overflow.
pub const MAX_WORD_SIZE: i64 = 64;

/// Largest stack alignment a [`Target`] accepts, in bytes.
pub const MAX_STACK_ALIGNMENT: i64 = 4096;

/// Which physical register plays which calling-convention role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterTable {
    pub frame_pointer: String,
    pub stack_pointer: String,
    pub return_value: String,
    /// In calling order. Its length is the register budget for formals.
    pub arguments: Vec<String>,
    /// General purpose callee-saved registers. The frame and stack pointer are
    /// added by the register catalog and must not be listed here.
    pub callee_saved: Vec<String>,
    /// Caller-saved registers that are neither the return value nor arguments.
    pub scratch: Vec<String>,
}

impl RegisterTable {
    /// System V AMD64.
    pub fn system_v() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            frame_pointer: RBP.into(),
            stack_pointer: RSP.into(),
            return_value: RAX.into(),
            arguments: owned(&[RDI, RSI, RDX, RCX, R8, R9]),
            callee_saved: owned(&[RBX, R12, R13, R14, R15]),
            scratch: owned(&[R10, R11]),
        }
    }

    fn roles(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("frame pointer", self.frame_pointer.as_str()),
            ("stack pointer", self.stack_pointer.as_str()),
            ("return value", self.return_value.as_str()),
        ]
        .into_iter()
        .chain(self.arguments.iter().map(|r| ("argument", r.as_str())))
        .chain(self.callee_saved.iter().map(|r| ("callee saved", r.as_str())))
        .chain(self.scratch.iter().map(|r| ("scratch", r.as_str())))
    }

    fn validate(&self) -> Result<()> {
        if self.arguments.is_empty() {
            return Err(FrameError::NoArgumentRegisters);
        }
        if let Some((role, _)) = self.roles().find(|(_, name)| name.is_empty()) {
            return Err(FrameError::EmptyRegisterName { role });
        }
        if let Some(name) = self.roles().map(|(_, name)| name).duplicates().next() {
            return Err(FrameError::DuplicateRegister {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    word_size: i64,
    stack_alignment: i64,
    registers: RegisterTable,
}

impl Target {
    /// Validates the parameters. The frame layer relies on every `Target` it
    /// sees having gone through here.
    pub fn new(word_size: i64, stack_alignment: i64, registers: RegisterTable) -> Result<Self> {
        if word_size <= 0 {
            return Err(FrameError::InvalidWordSize(word_size));
        }
        if word_size > MAX_WORD_SIZE {
            return Err(FrameError::WordSizeTooLarge {
                word_size,
                max: MAX_WORD_SIZE,
            });
        }
        if stack_alignment > MAX_STACK_ALIGNMENT {
            return Err(FrameError::StackAlignmentTooLarge {
                alignment: stack_alignment,
                max: MAX_STACK_ALIGNMENT,
            });
        }
        if stack_alignment <= 0 || stack_alignment % word_size != 0 {
            return Err(FrameError::InvalidStackAlignment {
                alignment: stack_alignment,
                word_size,
            });
        }
        registers.validate()?;
        Ok(Self {
            word_size,
            stack_alignment,
            registers,
        })
    }

    /// x86-64 with the System V register assignment: 8 byte words, 6 argument
    /// registers, 16 byte aligned stack.
    pub fn x86_64() -> Self {
        Self {
            word_size: 8,
            stack_alignment: 16,
            registers: RegisterTable::system_v(),
        }
    }

    pub fn with_word_size(self, word_size: i64) -> Result<Self> {
        let alignment = if self.stack_alignment % word_size.max(1) == 0 {
            self.stack_alignment
        } else {
            // a word size this large is rejected below anyway.
            word_size.checked_mul(2).unwrap_or(i64::MAX)
        };
        Self::new(word_size, alignment, self.registers)
    }

    pub fn with_argument_registers<S: Into<String>>(
        self,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let registers = RegisterTable {
            arguments: names.into_iter().map(Into::into).collect(),
            ..self.registers
        };
        Self::new(self.word_size, self.stack_alignment, registers)
    }

    #[inline]
    pub fn word_size(&self) -> i64 {
        self.word_size
    }

    #[inline]
    pub fn stack_alignment(&self) -> i64 {
        self.stack_alignment
    }

    /// How many formals can live in registers before the rest go to the stack.
    #[inline]
    pub fn max_register_formals(&self) -> usize {
        self.registers.arguments.len()
    }

    #[inline]
    pub fn registers(&self) -> &RegisterTable {
        &self.registers
    }
}
