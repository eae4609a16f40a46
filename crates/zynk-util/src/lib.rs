//! zynk-util - Shared infrastructure for the Zynk interpreter.
//!
//! Every phase of the pipeline (lexer, parser, type checker, evaluator,
//! driver) reports failures through the single [`ZynkError`] type defined
//! here. Errors are fatal: the first one aborts the run and is rendered to
//! stderr by the driver in the `Error[<Kind>]: At line: <N>. <message>`
//! format.

pub mod error;

pub use error::{ErrorKind, Result, ZynkError};
