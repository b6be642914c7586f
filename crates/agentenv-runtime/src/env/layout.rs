//! Platform layout of an environment: where its interpreter lives.
//!
//! This is the only platform-conditional lookup; everything else works on
//! the paths returned here.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvLayout {
    /// `<env>/bin/python`
    Posix,
    /// `<env>/Scripts/python.exe`
    Windows,
}

impl EnvLayout {
    /// Layout used by the platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    pub fn interpreter(&self, env_root: &Path) -> PathBuf {
        match self {
            Self::Posix => env_root.join("bin").join("python"),
            Self::Windows => env_root.join("Scripts").join("python.exe"),
        }
    }
}

impl Default for EnvLayout {
    fn default() -> Self {
        Self::current()
    }
}
