//! Plugin contracts and the tool-chain driver.
//!
//! - [`Tool`] — an executable unit of work declaring a parameter schema.
//! - [`FrontEnd`] — the user-facing side: messages, questions, progress,
//!   and parameter prompting.
//! - [`Interface`] — binds a front-end to a queue of tools and drives
//!   them in order over a shared data bag.

mod frontend;
mod interface;
mod tool;

pub use frontend::{FrontEnd, FrontEndEvent, NullFrontEnd, RecordingFrontEnd, RecordingLog};
pub use interface::Interface;
pub use tool::{Tool, ToolDecl, default_plugin_name};
