// Port Layer - Interfaces for the OS facilities the launcher drives

pub mod file_store;
pub mod process_control;
pub mod process_launcher;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use file_store::FileStore;
pub use process_control::{ProcessControl, Termination};
pub use process_launcher::ProcessLauncher;
pub use time_provider::TimeProvider;
