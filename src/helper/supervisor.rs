//! Launching and interrupting the key notifier helper

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, error, info, warn};

/// How long an interrupted helper gets to exit before it is killed
const EXIT_GRACE: Duration = Duration::from_secs(2);

const EXIT_POLL: Duration = Duration::from_millis(10);

/// Executable name of the key notifier helper
pub const DEFAULT_HELPER_PROGRAM: &str = "EnsoKeyNotifier";

/// Where to find the helper executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperConfig {
    /// Program name, looked up on the search path first
    pub program: String,
    /// Directory tried when the program is not on the search path
    pub fallback_dir: Option<PathBuf>,
}

impl HelperConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            fallback_dir: None,
        }
    }

    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = Some(dir.into());
        self
    }

    /// Full path of the helper inside the fallback directory
    pub fn fallback_path(&self) -> Option<PathBuf> {
        self.fallback_dir.as_ref().map(|dir| dir.join(&self.program))
    }
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_HELPER_PROGRAM.to_string(),
            fallback_dir: default_fallback_dir(),
        }
    }
}

/// The `bin` directory next to the one holding the running executable
pub fn default_fallback_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let install_dir = exe.parent()?.parent()?;
    Some(install_dir.join("bin"))
}

/// Errors raised while starting or stopping the helper
#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    #[error("failed to launch key notifier '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to interrupt key notifier (pid {pid}): {source}")]
    Termination {
        pid: u32,
        #[source]
        source: Errno,
    },

    #[error("key notifier is already running (pid {0})")]
    AlreadyRunning(u32),
}

/// Running helper, owned by the supervisor
#[derive(Debug)]
struct HelperProcessHandle {
    pid: u32,
    child: Child,
}

/// Starts the helper and interrupts it on shutdown
///
/// Launch failures are fatal; a helper that is already gone when stopped
/// is only worth a warning.
#[derive(Debug)]
pub struct ProcessSupervisor {
    config: HelperConfig,
    handle: Option<HelperProcessHandle>,
}

impl ProcessSupervisor {
    pub fn new(config: HelperConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }

    /// Pid of the running helper
    pub fn pid(&self) -> Option<u32> {
        self.handle.as_ref().map(|handle| handle.pid)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Launch the helper, falling back to the configured directory
    pub fn start(&mut self) -> Result<(), HelperError> {
        if let Some(pid) = self.pid() {
            return Err(HelperError::AlreadyRunning(pid));
        }

        let child = match spawn(Path::new(&self.config.program)) {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(program = %self.config.program, "key notifier not found on search path");
                let Some(path) = self.config.fallback_path() else {
                    return Err(self.launch_error(e));
                };
                spawn(&path).map_err(|e| self.launch_error(e))?
            }
            Err(e) => return Err(self.launch_error(e)),
        };

        let pid = child.id();
        info!(pid, "key notifier started");
        self.handle = Some(HelperProcessHandle { pid, child });
        Ok(())
    }

    /// Interrupt the helper
    ///
    /// A helper that has already exited is logged and treated as stopped.
    /// Does nothing when no helper was started.
    pub fn stop(&mut self) -> Result<(), HelperError> {
        let Some(mut handle) = self.handle.take() else {
            return Ok(());
        };
        info!(pid = handle.pid, "stopping key notifier");

        if let Ok(Some(status)) = handle.child.try_wait() {
            warn!(pid = handle.pid, %status, "key notifier process no longer exists");
            return Ok(());
        }

        let pid = Pid::from_raw(handle.pid as i32);
        match kill(pid, Signal::SIGINT) {
            Ok(()) => {}
            Err(Errno::ESRCH) => {
                warn!(pid = handle.pid, "key notifier process no longer exists");
                return Ok(());
            }
            Err(source) => {
                return Err(HelperError::Termination {
                    pid: handle.pid,
                    source,
                })
            }
        }

        reap(&mut handle);
        Ok(())
    }

    fn launch_error(&self, source: io::Error) -> HelperError {
        HelperError::Launch {
            program: self.config.program.clone(),
            source,
        }
    }
}

/// Wait for an interrupted helper to exit, killing it after the grace period
fn reap(handle: &mut HelperProcessHandle) {
    let deadline = Instant::now() + EXIT_GRACE;
    loop {
        match handle.child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = handle.pid, %status, "key notifier exited");
                return;
            }
            Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL),
            Ok(None) => break,
            Err(e) => {
                error!(pid = handle.pid, ?e, "failed to wait for key notifier");
                return;
            }
        }
    }

    warn!(pid = handle.pid, "key notifier ignored interrupt, killing it");
    if let Err(e) = handle.child.kill() {
        error!(pid = handle.pid, ?e, "failed to kill key notifier");
    }
    match handle.child.wait() {
        Ok(status) => debug!(pid = handle.pid, %status, "key notifier killed"),
        Err(e) => error!(pid = handle.pid, ?e, "failed to wait for key notifier"),
    }
}

fn spawn(path: &Path) -> io::Result<Child> {
    info!(path = %path.display(), "trying to launch key notifier");
    Command::new(path).spawn()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::count_warnings;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    const MISSING_PROGRAM: &str = "enso-input-missing-helper";
    const FALLBACK_PROGRAM: &str = "enso-input-fallback-helper";

    /// Directory holding a long-running helper script that is not on PATH
    fn fallback_helper_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("enso-input-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(FALLBACK_PROGRAM);
        fs::write(&path, "#!/bin/sh\nexec sleep 30\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        dir
    }

    fn process_exists(pid: u32) -> bool {
        kill(Pid::from_raw(pid as i32), None::<Signal>).is_ok()
    }

    #[test]
    fn test_fallback_path() {
        let config = HelperConfig::new("EnsoKeyNotifier").with_fallback_dir("/opt/enso/bin");
        assert_eq!(
            config.fallback_path(),
            Some(PathBuf::from("/opt/enso/bin/EnsoKeyNotifier"))
        );
        assert_eq!(HelperConfig::new("x").fallback_path(), None);
    }

    #[test]
    fn test_default_config() {
        let config = HelperConfig::default();
        assert_eq!(config.program, DEFAULT_HELPER_PROGRAM);
        assert!(config.fallback_dir.unwrap().ends_with("bin"));
    }

    #[test]
    fn test_launch_error_when_missing_everywhere() {
        let config =
            HelperConfig::new(MISSING_PROGRAM).with_fallback_dir("/nonexistent/enso-input/bin");
        let mut supervisor = ProcessSupervisor::new(config);

        let err = supervisor.start().unwrap_err();
        assert!(matches!(err, HelperError::Launch { .. }));
        assert_eq!(supervisor.pid(), None);
    }

    #[test]
    fn test_launch_error_without_fallback() {
        let mut supervisor = ProcessSupervisor::new(HelperConfig::new(MISSING_PROGRAM));
        assert!(matches!(supervisor.start(), Err(HelperError::Launch { .. })));
        assert!(!supervisor.is_running());
    }

    #[test]
    fn test_start_records_pid_and_stop_clears_it() {
        let mut supervisor = ProcessSupervisor::new(HelperConfig::new("true"));

        supervisor.start().unwrap();
        assert!(supervisor.pid().is_some());
        assert!(matches!(
            supervisor.start(),
            Err(HelperError::AlreadyRunning(_))
        ));

        supervisor.stop().unwrap();
        assert_eq!(supervisor.pid(), None);
    }

    #[test]
    fn test_stop_when_process_is_gone() {
        let mut supervisor = ProcessSupervisor::new(HelperConfig::new("true"));
        supervisor.start().unwrap();

        // `true` exits immediately
        thread::sleep(Duration::from_millis(200));

        let (result, warnings) = count_warnings(|| supervisor.stop());
        assert!(result.is_ok());
        assert_eq!(warnings, 1);
        assert!(!supervisor.is_running());
    }

    #[test]
    fn test_start_from_fallback_dir() {
        let dir = fallback_helper_dir("fallback");
        let config = HelperConfig::new(FALLBACK_PROGRAM).with_fallback_dir(&dir);
        let mut supervisor = ProcessSupervisor::new(config);

        supervisor.start().unwrap();
        let pid = supervisor.pid().unwrap();
        assert!(process_exists(pid));

        supervisor.stop().unwrap();
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_stop_reaps_interrupted_helper() {
        let dir = fallback_helper_dir("reap");
        let config = HelperConfig::new(FALLBACK_PROGRAM).with_fallback_dir(&dir);
        let mut supervisor = ProcessSupervisor::new(config);

        supervisor.start().unwrap();
        let pid = supervisor.pid().unwrap();

        let (result, warnings) = count_warnings(|| supervisor.stop());
        assert!(result.is_ok());
        assert_eq!(warnings, 0);

        // A reaped child leaves no zombie behind
        assert!(!process_exists(pid));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_stop_without_start() {
        let mut supervisor = ProcessSupervisor::new(HelperConfig::default());
        assert!(supervisor.stop().is_ok());
    }
}
