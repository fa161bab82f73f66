//! `docker` symlink management
//!
//! Rind can stand in for the Docker CLI through a `docker` symlink placed
//! next to its own binary.

use crate::error::{Result, RindError};
use std::path::{Path, PathBuf};

/// Name of the link created next to the binary
pub const LINK_NAME: &str = "docker";

/// What currently occupies the link path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistingFile {
    /// Nothing
    None,
    /// A symlink resolving to our binary
    OurSymlink,
    /// A symlink pointing elsewhere; carries its destination
    OtherSymlink(String),
    /// A regular file or directory, typically a real Docker install
    RegularFile,
}

/// Result of a create request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new symlink was written
    Created,
    /// The symlink already pointed at us
    AlreadyLinked,
}

/// Manages the symlink for one binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linker {
    /// Binary the link points at
    binary: PathBuf,
    /// Where the link lives
    link: PathBuf,
}

impl Linker {
    /// Linker placing `docker` in the binary's directory
    pub fn for_binary(binary: impl Into<PathBuf>) -> Self {
        let binary = binary.into();
        let link = binary
            .parent()
            .map(|dir| dir.join(LINK_NAME))
            .unwrap_or_else(|| PathBuf::from(LINK_NAME));
        Self { binary, link }
    }

    /// Linker for the running executable, with symlinks resolved
    pub fn current() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let binary = std::fs::canonicalize(&exe).unwrap_or(exe);
        Ok(Self::for_binary(binary))
    }

    /// Binary the link points at
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Path of the link
    pub fn link_path(&self) -> &Path {
        &self.link
    }

    /// Classify whatever is at the link path without following it
    pub fn status(&self) -> ExistingFile {
        let metadata = match std::fs::symlink_metadata(&self.link) {
            Ok(metadata) => metadata,
            Err(_) => return ExistingFile::None,
        };

        if !metadata.file_type().is_symlink() {
            return ExistingFile::RegularFile;
        }

        let destination = match std::fs::read_link(&self.link) {
            Ok(destination) => destination,
            Err(_) => return ExistingFile::OtherSymlink("(unknown)".to_string()),
        };

        // Relative destinations resolve against the link's directory
        let target = match self.link.parent() {
            Some(dir) => dir.join(&destination),
            None => destination.clone(),
        };
        let Ok(resolved) = std::fs::canonicalize(&target) else {
            return ExistingFile::OtherSymlink("(broken)".to_string());
        };
        let ours = std::fs::canonicalize(&self.binary).unwrap_or_else(|_| self.binary.clone());

        if resolved == ours {
            ExistingFile::OurSymlink
        } else {
            ExistingFile::OtherSymlink(destination.display().to_string())
        }
    }

    /// Create the link; anything else in the way needs `force`
    pub fn create(&self, force: bool) -> Result<LinkOutcome> {
        match self.status() {
            ExistingFile::None => {}
            ExistingFile::OurSymlink => return Ok(LinkOutcome::AlreadyLinked),
            ExistingFile::OtherSymlink(dest) => {
                if !force {
                    return Err(RindError::Link(format!(
                        "existing symlink found at {} -> {} (use --force to overwrite)",
                        self.link.display(),
                        dest
                    )));
                }
                tracing::debug!("removing symlink {} -> {}", self.link.display(), dest);
                std::fs::remove_file(&self.link)?;
            }
            ExistingFile::RegularFile => {
                if !force {
                    return Err(RindError::Link(format!(
                        "existing Docker installation found at {} (use --force to overwrite)",
                        self.link.display()
                    )));
                }
                remove_any(&self.link)?;
            }
        }

        symlink(&self.binary, &self.link)?;
        Ok(LinkOutcome::Created)
    }

    /// Remove the link; only our own symlink is ever removed
    pub fn remove(&self) -> Result<()> {
        match self.status() {
            ExistingFile::OurSymlink => {
                std::fs::remove_file(&self.link)?;
                Ok(())
            }
            ExistingFile::None => Err(RindError::Link(format!(
                "no docker symlink found at {}",
                self.link.display()
            ))),
            ExistingFile::OtherSymlink(dest) => Err(RindError::Link(format!(
                "{} is a symlink to {}, not rind; refusing to remove",
                self.link.display(),
                dest
            ))),
            ExistingFile::RegularFile => Err(RindError::Link(format!(
                "{} is not a rind symlink; refusing to remove",
                self.link.display()
            ))),
        }
    }
}

fn remove_any(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(not(unix))]
fn symlink(_original: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks are only supported on unix hosts",
    ))
}
