//! The interactive shell as a pure state machine.
//!
//! A [`Session`] never mutates in place: [`Session::update`] consumes it and
//! hands back the next one, so the input loop only ever feeds events in and
//! draws what comes out.

use tracing::debug;

use crate::evaluate;

/// Longest input the prompt accepts, in characters.
pub const INPUT_LIMIT: usize = 50;

pub const HELP: &str = "Press Enter to evaluate, Ctrl+C to quit.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    input: String,
    expression: String,
    result: String,
    intermediate: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Submit,
    Quit,
    Edit(Edit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Backspace,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(Session),
    Quit,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(self, event: Event) -> Step {
        match event {
            Event::Quit => Step::Quit,
            Event::Submit => {
                let (result, intermediate) = evaluate(&self.input);
                debug!(input = %self.input, %result, %intermediate, "submitted");
                Step::Continue(Session {
                    input: String::new(),
                    expression: self.input,
                    result,
                    intermediate,
                })
            }
            Event::Edit(edit) => Step::Continue(self.edit(edit)),
        }
    }

    fn edit(mut self, edit: Edit) -> Self {
        match edit {
            Edit::Insert(c) if self.input.chars().count() < INPUT_LIMIT => self.input.push(c),
            Edit::Insert(_) => {}
            Edit::Backspace => {
                self.input.pop();
            }
            Edit::Clear => self.input.clear(),
        }
        self
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The last submitted expression, as typed.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn intermediate(&self) -> &str {
        &self.intermediate
    }

    pub fn view(&self) -> String {
        format!(
            "Result: {}\nIntermediate: {}\n> {}\n{HELP}",
            self.result, self.intermediate, self.input
        )
    }
}
