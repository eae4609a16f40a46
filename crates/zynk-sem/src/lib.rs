//! zynk-sem - Scoping and static type rules for the Zynk interpreter.
//!
//! Two pieces live here:
//!
//! - [`scope`]: the runtime environment, a stack of lexical blocks, each
//!   holding independent variable and function tables, plus the call-depth
//!   counter behind the recursion ceiling.
//! - [`checker`]: pure functions that compute the static type of an
//!   expression against the current environment and enforce the
//!   declaration, assignment and return rules.

pub mod checker;
pub mod scope;

pub use checker::{check_return, check_type, determine_type};
pub use scope::{Binding, Block, Environment};
