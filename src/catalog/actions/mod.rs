//! Built-in repair actions
//!
//! - `control` - Service/component restarts, commands, retry and panic wrappers, memory release
//! - `filesystem` - Directory/file creation, log rotation and aged-file cleanup

pub mod control;
pub mod filesystem;

pub use control::{
    MemoryReleaser, free_memory, recover_panic, restart_component, restart_service, retry,
    run_command,
};
pub use filesystem::{cleanup_files, create_directory, create_file, rotate_log};
