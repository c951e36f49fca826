//! Serial command protocol
//!
//! Line-oriented text commands with fixed-width fields. Each received byte
//! is echoed; a complete line is parsed into a [`command::Command`] and run
//! against the aquarium by the interpreter.

pub mod command;
pub mod interpreter;
pub mod line;

pub use command::{Command, CommandError};
pub use line::{Feed, LineBuffer};

/// Serial receiver that knows how many bytes are waiting
pub trait Buffered {
    fn buffered(&self) -> usize;
}

/// What the scheduler should do after the interpreter ran
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop feeding the watchdog and let it restart the controller
    Restart,
}

/// Literal one-line replies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Error,
    Unknown,
}

impl Reply {
    pub fn as_str(self) -> &'static str {
        match self {
            Reply::Ok => "OK\r\n",
            Reply::Error => "ERROR\r\n",
            Reply::Unknown => "UNKNOWN\r\n",
        }
    }
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Unknown => Reply::Unknown,
            CommandError::Malformed => Reply::Error,
        }
    }
}
