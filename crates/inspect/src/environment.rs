// crates/inspect/src/environment.rs

use std::env;
use std::ffi::{OsStr, OsString};
use std::fs::{self, Metadata};
use std::io;
use std::path::PathBuf;

/// Process state the dispatcher reads: environment variables and the
/// working directory.
pub trait Environment {
    /// Value of `name`, or `None` when unset.
    fn var(&self, name: &OsStr) -> Option<OsString>;

    fn current_dir(&self) -> io::Result<PathBuf>;
}

/// The real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &OsStr) -> Option<OsString> {
        env::var_os(name)
    }

    /// Prefers `$PWD` when it is absolute and names the same directory as
    /// `.`, so a directory entered through a symlink reports its logical
    /// path. Falls back to the kernel's answer otherwise.
    fn current_dir(&self) -> io::Result<PathBuf> {
        let dot = fs::metadata(".")?;

        if let Some(logical) = env::var_os("PWD").map(PathBuf::from) {
            if logical.is_absolute()
                && fs::metadata(&logical).is_ok_and(|meta| same_file(&meta, &dot))
            {
                log::trace!("using $PWD {:?} as working directory", logical);
                return Ok(logical);
            }
        }

        env::current_dir()
    }
}

#[cfg(unix)]
fn same_file(a: &Metadata, b: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(_a: &Metadata, _b: &Metadata) -> bool {
    false
}
