//! View state for browsing and searching the recipe catalog.
//!
//! [ViewController] owns the state shown to the user and is the only writer
//! of it. User input arrives as [Action]s, every action that needs data
//! issues exactly one catalog request, and only the response to the most
//! recently issued request may change what is displayed.
//!
//! Rendering is left to implementors of [Render], which receive a
//! read-only [View] of the state.

mod controller;
mod mode;
mod render;
mod state;

pub use controller::{ControllerOptions, Outcome, RequestSeq, ViewController};
pub use mode::{Action, Mode};
pub use render::Render;
pub use state::{LastError, View, ViewState};
