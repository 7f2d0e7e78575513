//! The front-end (interface plugin) contract and the shipped headless
//! implementations.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ToolError;
use crate::param::Parameter;
use crate::plugin::default_plugin_name;

/// The user-facing half of an [`Interface`](crate::plugin::Interface).
///
/// Every method has a headless default: notifications are dropped,
/// questions answer `true`, and prompting keeps the parameter's current
/// value. Interactive implementations override what they surface; a
/// prompting front-end should loop prompt → validate → report-and-retry,
/// and convert an input interrupt or end-of-input into
/// [`ToolError::Cancelled`].
pub trait FrontEnd {
    /// Registry name. Defaults to the lowercased type name.
    fn name() -> String
    where
        Self: Sized,
    {
        default_plugin_name::<Self>()
    }

    fn help() -> String
    where
        Self: Sized,
    {
        String::new()
    }

    fn collection() -> String
    where
        Self: Sized,
    {
        "interface".to_string()
    }

    fn message(&mut self, _message: &str) {}

    fn warning(&mut self, _message: &str) {}

    fn error(&mut self, _message: &str, _details: Option<&str>) {}

    /// Ask a yes/no question. Headless front-ends say yes.
    fn ask(&mut self, _question: &str) -> bool {
        true
    }

    fn progress_start(&mut self) {}

    fn progress_update(&mut self, _message: &str, _fraction: f64) {}

    fn progress_end(&mut self) {}

    /// Obtain a value for one visible parameter. The default keeps the
    /// current value untouched.
    fn prompt_parameter(&mut self, _param: &Rc<Parameter>) -> Result<(), ToolError> {
        Ok(())
    }
}

/// A front-end that does nothing: the stand-in used when no interactive
/// surface is attached, so tools always run against a real interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFrontEnd;

impl FrontEnd for NullFrontEnd {
    fn name() -> String {
        "null".to_string()
    }

    fn help() -> String {
        "headless front-end that drops all output".to_string()
    }
}

/// One captured [`RecordingFrontEnd`] interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum FrontEndEvent {
    Message(String),
    Warning(String),
    Error {
        message: String,
        details: Option<String>,
    },
    Ask(String),
    ProgressStart,
    ProgressUpdate { message: String, fraction: f64 },
    ProgressEnd,
    Prompt(String),
}

/// Shared handle to a recording front-end's captured events.
pub type RecordingLog = Rc<RefCell<Vec<FrontEndEvent>>>;

/// A front-end that records every interaction for assertions.
///
/// The event log is shared: clone [`RecordingFrontEnd::log`] before
/// boxing the front-end into an interface, then inspect it after the
/// run. Prompting keeps current values; `ask` returns a configurable
/// canned answer.
#[derive(Debug, Default)]
pub struct RecordingFrontEnd {
    log: RecordingLog,
    ask_answer: bool,
}

impl RecordingFrontEnd {
    pub fn new(ask_answer: bool) -> Self {
        Self {
            log: RecordingLog::default(),
            ask_answer,
        }
    }

    pub fn log(&self) -> RecordingLog {
        Rc::clone(&self.log)
    }
}

impl FrontEnd for RecordingFrontEnd {
    fn name() -> String {
        "recording".to_string()
    }

    fn help() -> String {
        "records every interaction; intended for tests".to_string()
    }

    fn message(&mut self, message: &str) {
        self.log
            .borrow_mut()
            .push(FrontEndEvent::Message(message.to_string()));
    }

    fn warning(&mut self, message: &str) {
        self.log
            .borrow_mut()
            .push(FrontEndEvent::Warning(message.to_string()));
    }

    fn error(&mut self, message: &str, details: Option<&str>) {
        self.log.borrow_mut().push(FrontEndEvent::Error {
            message: message.to_string(),
            details: details.map(str::to_string),
        });
    }

    fn ask(&mut self, question: &str) -> bool {
        self.log
            .borrow_mut()
            .push(FrontEndEvent::Ask(question.to_string()));
        self.ask_answer
    }

    fn progress_start(&mut self) {
        self.log.borrow_mut().push(FrontEndEvent::ProgressStart);
    }

    fn progress_update(&mut self, message: &str, fraction: f64) {
        self.log.borrow_mut().push(FrontEndEvent::ProgressUpdate {
            message: message.to_string(),
            fraction,
        });
    }

    fn progress_end(&mut self) {
        self.log.borrow_mut().push(FrontEndEvent::ProgressEnd);
    }

    fn prompt_parameter(&mut self, param: &Rc<Parameter>) -> Result<(), ToolError> {
        self.log
            .borrow_mut()
            .push(FrontEndEvent::Prompt(param.name().to_string()));
        Ok(())
    }
}
