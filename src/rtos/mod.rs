pub mod scheduler;

pub use scheduler::{due_tasks, DueTasks, Scheduler};
