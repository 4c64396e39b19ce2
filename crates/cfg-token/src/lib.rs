//! Token definitions and the injectable token-block FIFO consumed by the
//! configuration lexer.
//!
//! A [`Token`] carries its kind plus a [`Location`] that back-references the
//! include frame it came from, so diagnostics can climb the include chain.
//! [`TokenBlock`] is the write-once/read-once FIFO block generators and the
//! lexer's own pending-token queue are built from.

mod block;
mod token;

pub use block::TokenBlock;
pub use token::{FrameId, Location, Token, TokenKind};
