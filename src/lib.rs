// todolist - Interactive single-user to-do list with CSV export

pub mod console;
pub mod csv_file;
pub mod models;
pub mod store;

// Re-export main types for convenience
pub use console::{Console, DEFAULT_EXPORT_FILE, Exit, MenuChoice, State};
pub use models::{Task, TaskStatus};
pub use store::TaskStore;
