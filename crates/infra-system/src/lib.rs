// AuxIOC Infrastructure - System Adapters
// Implements: ProcessControl, FileStore, ProcessLauncher

#[cfg(not(unix))]
compile_error!("the AuxIOC launcher only supports unix hosts (signals and exec)");

pub mod exec_launcher;
pub mod fs_file_store;
pub mod process_control_impl;

pub use exec_launcher::ExecLauncher;
pub use fs_file_store::FsFileStore;
pub use process_control_impl::SysinfoProcessControl;
