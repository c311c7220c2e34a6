//! Input system: command parsing, scheduling and the command log.
//!
//! ## Key Types
//!
//! - `Command` / `CommandKind` / `RawCommand`: the command catalogue and wire format
//! - `Scheduler`: internal and external job queues plus the single pause slot
//! - `CommandLog` / `LoggedCommand`: successfully executed commands
//! - `ReproductionDump`: config plus log, published on fatal errors

pub mod command;
pub mod log;
pub mod scheduler;

pub use command::{Command, CommandKind, RawCommand};
pub use log::{CommandId, CommandLog, LoggedCommand, ReproductionDump};
pub use scheduler::{Job, Pause, QueuedCommand, Scheduler};
