// crates/inspect/src/dispatcher.rs

use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::InspectConfig;
use crate::environment::Environment;
use crate::error::InspectError;

/// Variable naming the file for `-read-file` and `-write-file`.
pub const FILE_VAR: &str = "FILE";
/// Variable holding the bytes `-write-file` stores.
pub const CONTENT_VAR: &str = "CONTENT";

/// Runs every enabled step in order and returns the exit code to finish
/// with. The first failing step ends the run; nothing after it executes.
///
/// Order: extra arguments, message, environment variable, write file,
/// read file, working directory.
pub fn run<E, W>(config: &InspectConfig, env: &E, out: &mut W) -> Result<i32, InspectError>
where
    E: Environment + ?Sized,
    W: Write + ?Sized,
{
    if !config.extra_args.is_empty() {
        log::debug!("rejecting positional arguments: {:?}", config.extra_args);
        return Err(InspectError::WrongParameters);
    }

    if !config.print_msg.is_empty() {
        print_msg(&config.print_msg, out)?;
    }

    if !config.print_env.is_empty() {
        print_env(&config.print_env, env, out)?;
    }

    if config.write_file {
        write_file(env)?;
    }

    if config.read_file {
        read_file(env, out)?;
    }

    if !config.check_cwd.is_empty() {
        check_cwd(&config.check_cwd, env)?;
    }

    log::debug!("all checks passed, exiting with {}", config.exit_code);
    Ok(config.exit_code)
}

fn print_msg<W>(message: &OsStr, out: &mut W) -> Result<(), InspectError>
where
    W: Write + ?Sized,
{
    let mut line = os_bytes(message).into_owned();
    line.push(b'\n');
    out.write_all(&line).map_err(InspectError::Output)
}

fn print_env<E, W>(name: &OsStr, env: &E, out: &mut W) -> Result<(), InspectError>
where
    E: Environment + ?Sized,
    W: Write + ?Sized,
{
    let value = env.var(name).unwrap_or_default();
    log::debug!("{:?} is {:?}", name, value);

    let mut line = os_bytes(name).into_owned();
    line.push(b'=');
    line.extend_from_slice(&os_bytes(&value));
    line.push(b'\n');
    out.write_all(&line).map_err(InspectError::Output)
}

fn write_file<E>(env: &E) -> Result<(), InspectError>
where
    E: Environment + ?Sized,
{
    let path = file_path(env);
    let content = env.var(OsStr::new(CONTENT_VAR)).unwrap_or_default();
    log::debug!("writing {} byte(s) to {:?}", content.len(), path);

    create_private(&path)
        .and_then(|mut file| file.write_all(&os_bytes(&content)))
        .map_err(|source| InspectError::WriteFile { path, source })
}

fn read_file<E, W>(env: &E, out: &mut W) -> Result<(), InspectError>
where
    E: Environment + ?Sized,
    W: Write + ?Sized,
{
    let path = file_path(env);
    log::debug!("reading {:?}", path);

    let data = fs::read(&path).map_err(|source| InspectError::ReadFile { path, source })?;

    let mut block = Vec::with_capacity(data.len() + 7);
    block.extend_from_slice(b"<<<");
    block.extend_from_slice(&data);
    block.extend_from_slice(b">>>\n");
    out.write_all(&block).map_err(InspectError::Output)
}

fn check_cwd<E>(expected: &OsStr, env: &E) -> Result<(), InspectError>
where
    E: Environment + ?Sized,
{
    let actual = env.current_dir().map_err(InspectError::WorkingDirectory)?;
    log::debug!("working directory is {:?}, expected {:?}", actual, expected);

    if actual.as_os_str() != expected {
        return Err(InspectError::WorkingDirectoryMismatch {
            actual,
            expected: expected.to_os_string(),
        });
    }
    Ok(())
}

/// `$FILE`, or the empty path when unset (which then fails to open).
fn file_path<E>(env: &E) -> PathBuf
where
    E: Environment + ?Sized,
{
    env.var(OsStr::new(FILE_VAR)).map(PathBuf::from).unwrap_or_default()
}

/// Creates or truncates `path`. New files are readable and writable by the
/// owner only.
fn create_private(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

#[cfg(unix)]
fn os_bytes(value: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(value.as_bytes())
}

#[cfg(not(unix))]
fn os_bytes(value: &OsStr) -> Cow<'_, [u8]> {
    match value.to_string_lossy() {
        Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
        Cow::Owned(text) => Cow::Owned(text.into_bytes()),
    }
}
