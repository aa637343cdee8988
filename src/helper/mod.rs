//! Key notifier helper process management
//!
//! The helper is a separately built executable that captures keystrokes
//! and posts them as distributed notifications.

mod supervisor;

pub use supervisor::{
    default_fallback_dir, HelperConfig, HelperError, ProcessSupervisor, DEFAULT_HELPER_PROGRAM,
};
