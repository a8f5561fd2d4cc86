//! Built-in checks
//!
//! - `system` - Resource probes backed by `sysinfo` and the filesystem
//! - `service` - HTTP, TCP, process, database, file and command probes

pub mod service;
pub mod system;

pub use service::{
    HttpCheckOptions, command, database, file_exists, http_endpoint, mask_dsn, process, tcp_port,
};
pub use system::{
    cpu_usage, disk_space, disk_usage, memory_usage, process_memory, temp_dir_cleanup,
    thread_count,
};
