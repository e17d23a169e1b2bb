// Domain Layer - Startup script, launch plan and process matching

pub mod launch_plan;
pub mod process_match;
pub mod startup_script;

// Re-exports
pub use launch_plan::LaunchPlan;
pub use process_match::{ProcessInfo, ProcessMatch};
pub use startup_script::StartupScript;
