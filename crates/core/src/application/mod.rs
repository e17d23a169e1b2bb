// Application Layer - Launch sequence orchestration

pub mod bootstrap;
pub mod constants;

pub use bootstrap::{Bootstrap, IocStatus, PreflightReport};
