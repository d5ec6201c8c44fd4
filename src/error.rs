//! Errors surfaced by interactive commands.
//!
//! None of these end the session: `update` turns them into a status message.

use thiserror::Error;

use crate::expr::ExprError;
use crate::hex::HexError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("not writable (reopen with --writable)")]
    NotWritable,
    #[error("could not parse hex string: {0}")]
    MalformedHex(#[from] HexError),
    #[error("invalid expression: {0}")]
    InvalidExpression(#[from] ExprError),
    #[error("invalid number of columns: {0}")]
    InvalidColumns(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}
