//! Activation records and calling conventions for the tiger compiler backend.
//!
//! The translator asks a [`frame::Frame`] where each formal and local lives,
//! collects its output as [`frame::Frag`]s, and a backend implementing
//! [`frame::ProcEntryExit`] wraps each procedure for its calling convention.
//!
//! Nothing here is synchronized. Independent compilations each own their
//! generator, frames and fragments and may share a [`frame::RegisterCatalog`].

pub mod assem;
pub mod error;
pub mod frame;
pub mod ir;
pub mod symbol;
pub mod temp;

pub use error::{FrameError, Result};
pub use temp::{Uuids, UuidsImpl};
