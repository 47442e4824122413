//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Non-fatal problems found while scanning or generating (an include that
//! cannot be resolved, a missing optional template file) are reported as
//! structured [`Diagnostic`]s. The [`DiagnosticSink`] collects them so the
//! library never prints, and the CLI renders them through a [`DiagnosticRenderer`].

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
