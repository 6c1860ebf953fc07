// crates/inspect/src/config.rs

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::{OsStr, OsString};

/// Flags that take a value. Written without `=`, the next argument is the
/// value even when it starts with `-`.
const VALUE_FLAGS: &[&str] = &["print-msg", "print-env", "check-cwd", "exit-code"];

/// Invocation configuration, built once from the command line and only read
/// afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InspectConfig {
    /// Message to print on stdout.
    pub print_msg: OsString,
    /// Name of the environment variable to print as `NAME=VALUE`.
    pub print_env: OsString,
    /// Expected working directory.
    pub check_cwd: OsString,
    /// Exit status when every check passes.
    pub exit_code: i32,
    /// Echo the file named by `$FILE`.
    pub read_file: bool,
    /// Write `$CONTENT` into the file named by `$FILE`.
    pub write_file: bool,
    /// Positional arguments left after the flags.
    pub extra_args: Vec<OsString>,
}

impl InspectConfig {
    /// Parses a full argument list (program name first).
    ///
    /// Help and malformed flags come back as a `clap::Error`.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let matches = command().try_get_matches_from(normalize_args(args))?;
        Ok(Self::from_matches(&matches))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let text = |id: &str| matches.get_one::<OsString>(id).cloned().unwrap_or_default();
        let flag = |id: &str| matches.get_one::<bool>(id).copied().unwrap_or(false);

        InspectConfig {
            print_msg: text("print_msg"),
            print_env: text("print_env"),
            check_cwd: text("check_cwd"),
            exit_code: matches.get_one::<i32>("exit_code").copied().unwrap_or(0),
            read_file: flag("read_file"),
            write_file: flag("write_file"),
            extra_args: matches
                .get_many::<OsString>("args")
                .unwrap_or_default()
                .cloned()
                .collect(),
        }
    }
}

/// The flag grammar of the probe.
pub fn command() -> Command {
    Command::new("inspect")
        .about("Diagnostic probe for container tests: prints, checks and touches files")
        .disable_version_flag(true)
        .args_override_self(true)
        .arg(
            text_flag("print_msg", "print-msg")
                .value_name("MSG")
                .help("Print the message given as parameter"),
        )
        .arg(
            text_flag("check_cwd", "check-cwd")
                .value_name("DIR")
                .help("Check if the current working directory is the one specified"),
        )
        .arg(
            text_flag("print_env", "print-env")
                .value_name("NAME")
                .help("Print the specified environment variable"),
        )
        .arg(
            Arg::new("exit_code")
                .long("exit-code")
                .value_name("CODE")
                .allow_hyphen_values(true)
                .value_parser(parse_exit_code)
                .default_value("0")
                .help("Return this exit code"),
        )
        .arg(bool_flag("read_file", "read-file").help("Print the content of the file $FILE"))
        .arg(bool_flag("write_file", "write-file").help("Write $CONTENT in the file $FILE"))
        .arg(
            Arg::new("args")
                .action(ArgAction::Append)
                .num_args(1..)
                .trailing_var_arg(true)
                .value_parser(value_parser!(OsString))
                .hide(true),
        )
}

/// A flag whose value is kept as raw OS bytes.
fn text_flag(id: &'static str, long: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .allow_hyphen_values(true)
        .value_parser(value_parser!(OsString))
}

/// A switch that also accepts an explicit `=true` / `=false`.
fn bool_flag(id: &'static str, long: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .action(ArgAction::Set)
        .num_args(0..=1)
        .require_equals(true)
        .default_missing_value("true")
        .default_value("false")
        .value_parser(parse_bool)
        .hide_default_value(true)
        .hide_possible_values(true)
}

/// Rewrites single-dash long flags (`-print-msg`) into the double-dash form
/// clap understands. Stops at `--` or at the first positional argument;
/// everything from there on is passed through untouched. Flag values may
/// be arbitrary bytes.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        let Some(bytes) = arg_bytes(&arg) else {
            normalized.push(arg);
            break;
        };
        if bytes == b"--" || bytes == b"-" || !bytes.starts_with(b"-") {
            normalized.push(arg);
            break;
        }

        let double_dash = bytes.starts_with(b"--");
        let body = if double_dash { &bytes[2..] } else { &bytes[1..] };
        let takes_next = !body.contains(&b'=')
            && VALUE_FLAGS.iter().any(|flag| flag.as_bytes() == body);
        let short = body.len() == 1;

        if double_dash || short {
            normalized.push(arg);
        } else {
            let mut long = OsString::from("-");
            long.push(&arg);
            normalized.push(long);
        }

        if takes_next {
            if let Some(value) = args.next() {
                normalized.push(value);
            }
        }
    }

    normalized.extend(args);
    normalized
}

#[cfg(unix)]
fn arg_bytes(arg: &OsStr) -> Option<&[u8]> {
    use std::os::unix::ffi::OsStrExt;
    Some(arg.as_bytes())
}

#[cfg(not(unix))]
fn arg_bytes(arg: &OsStr) -> Option<&[u8]> {
    arg.to_str().map(str::as_bytes)
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(format!("invalid boolean value {other:?}")),
    }
}

/// Signed integer with an optional `0x`, `0o`, `0b` or leading-`0` base.
/// Single underscores may separate digits (`1_000`, `0x_ff`).
fn parse_exit_code(value: &str) -> Result<i32, String> {
    let invalid = || format!("invalid integer value {value:?}");

    let (negative, unsigned) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    if !underscores_ok(unsigned) {
        return Err(invalid());
    }

    let (radix, digits) = if let Some(rest) = strip_base(unsigned, 'x') {
        (16, rest)
    } else if let Some(rest) = strip_base(unsigned, 'o') {
        (8, rest)
    } else if let Some(rest) = strip_base(unsigned, 'b') {
        (2, rest)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    let digits = digits.replace('_', "");
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(invalid());
    }
    let magnitude = i64::from_str_radix(&digits, radix).map_err(|_| invalid())?;
    let code = if negative { -magnitude } else { magnitude };

    // Only the low bits of the status reach the parent anyway.
    Ok(code as i32)
}

fn strip_base(value: &str, marker: char) -> Option<&str> {
    let rest = value.strip_prefix('0')?;
    rest.strip_prefix(marker)
        .or_else(|| rest.strip_prefix(marker.to_ascii_uppercase()))
}

/// Every `_` sits between two digits, or between a base prefix and a digit.
fn underscores_ok(unsigned: &str) -> bool {
    let bytes = unsigned.as_bytes();
    let hex = matches!(bytes, [b'0', b'x' | b'X', ..]);
    let (mut after_digit, rest) = match bytes {
        [b'0', b'x' | b'X' | b'o' | b'O' | b'b' | b'B', rest @ ..] => (true, rest),
        _ => (false, bytes),
    };
    let mut after_underscore = false;

    for &byte in rest {
        if byte.is_ascii_digit() || (hex && byte.is_ascii_hexdigit()) {
            after_digit = true;
            after_underscore = false;
        } else if byte == b'_' {
            if !after_digit {
                return false;
            }
            after_digit = false;
            after_underscore = true;
        } else if after_underscore {
            return false;
        } else {
            after_digit = false;
        }
    }
    !after_underscore
}
