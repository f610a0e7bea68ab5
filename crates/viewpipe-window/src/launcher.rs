//! Native binary resolution and process spawning.
//!
//! One precompiled window binary exists per architecture/OS pair. The
//! launcher maps the running platform to a [`Target`], builds the executable
//! path from [`LauncherConfig`], and spawns it with all three stdio streams
//! piped.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tracing::{debug, info};
use viewpipe_common::WindowError;
use viewpipe_config::LauncherConfig;

/// A supported architecture/OS pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    X86_64Linux,
    Aarch64Linux,
    X86_64Macos,
    Aarch64Macos,
}

impl Target {
    pub const ALL: [Target; 4] = [
        Target::X86_64Linux,
        Target::Aarch64Linux,
        Target::X86_64Macos,
        Target::Aarch64Macos,
    ];

    /// Map an architecture and OS name (as in `std::env::consts`) to a target.
    pub fn resolve(arch: &str, os: &str) -> Result<Self, WindowError> {
        match (arch, os) {
            ("x86_64", "linux") => Ok(Target::X86_64Linux),
            ("aarch64", "linux") => Ok(Target::Aarch64Linux),
            ("x86_64", "macos") => Ok(Target::X86_64Macos),
            ("aarch64", "macos") => Ok(Target::Aarch64Macos),
            _ => Err(WindowError::UnsupportedPlatform {
                arch: arch.to_string(),
                os: os.to_string(),
            }),
        }
    }

    /// The target of the running process.
    pub fn current() -> Result<Self, WindowError> {
        Self::resolve(std::env::consts::ARCH, std::env::consts::OS)
    }

    /// Identifier used in the binary file name.
    pub fn as_str(self) -> &'static str {
        match self {
            Target::X86_64Linux => "x86_64-linux",
            Target::Aarch64Linux => "aarch64-linux",
            Target::X86_64Macos => "x86_64-macos",
            Target::Aarch64Macos => "aarch64-macos",
        }
    }

    pub fn is_macos(self) -> bool {
        matches!(self, Target::X86_64Macos | Target::Aarch64Macos)
    }

    /// Whether `MIN`/`MAX` size hints work. The macOS webview ignores them.
    pub fn supports_bound_size_hints(self) -> bool {
        !self.is_macos()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sole means of terminating a native process.
pub trait Terminate: Send {
    /// Ask the process to exit. Must not block.
    fn terminate(&mut self) -> std::io::Result<()>;

    /// OS process id, when there is one.
    fn pid(&self) -> Option<u32> {
        None
    }
}

impl Terminate for Child {
    fn terminate(&mut self) -> std::io::Result<()> {
        self.start_kill()
    }

    fn pid(&self) -> Option<u32> {
        self.id()
    }
}

/// Live handle on a spawned native window process.
pub struct NativeProcess {
    pub stdin: Box<dyn AsyncWrite + Send + Unpin>,
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    pub stderr: Box<dyn AsyncRead + Send + Unpin>,
    pub terminator: Box<dyn Terminate>,
}

impl fmt::Debug for NativeProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeProcess")
            .field("pid", &self.terminator.pid())
            .finish_non_exhaustive()
    }
}

/// Resolves and starts the native window binary.
#[derive(Debug, Clone)]
pub struct Launcher {
    target: Target,
    executable: PathBuf,
}

impl Launcher {
    /// Build a launcher for the running platform.
    ///
    /// Fails with [`WindowError::UnsupportedPlatform`] before touching the
    /// filesystem when the platform has no binary.
    pub fn new(config: &LauncherConfig) -> Result<Self, WindowError> {
        let target = Target::current()?;
        let dir = match &config.binary_dir {
            Some(dir) => dir.clone(),
            None => default_binary_dir()?,
        };
        Ok(Self::with_target(target, &dir, &config.binary_prefix))
    }

    /// Build a launcher for an explicit target and binary directory.
    pub fn with_target(target: Target, binary_dir: &Path, prefix: &str) -> Self {
        Self {
            target,
            executable: binary_dir.join(executable_name(prefix, target)),
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Spawn the native binary with piped stdin, stdout and stderr.
    ///
    /// Must be called from within a tokio runtime.
    pub fn launch(&self) -> Result<NativeProcess, WindowError> {
        debug!(path = %self.executable.display(), "spawning native window");

        let mut child = Command::new(&self.executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| WindowError::Spawn {
                path: self.executable.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        info!(
            pid = child.id(),
            target = %self.target,
            "native window process started"
        );

        Ok(NativeProcess {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            terminator: Box::new(child),
        })
    }
}

/// `<prefix>-<target>` with the platform executable suffix.
pub fn executable_name(prefix: &str, target: Target) -> String {
    format!("{prefix}-{target}{}", std::env::consts::EXE_SUFFIX)
}

fn default_binary_dir() -> Result<PathBuf, WindowError> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

fn missing_pipe(name: &str) -> WindowError {
    WindowError::Io(std::io::Error::other(format!(
        "native process {name} was not piped"
    )))
}
