use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;
use std::str::FromStr;

pub use clap::{crate_version, App, AppSettings, Arg, ArgMatches};
use fs2::FileExt;
use tempfile::NamedTempFile;

pub const DEFAULT_OUTPUT: &str = "operations.txt";

/// Sets up `env_logger` for a workload binary. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

/// Parses an optional argument, falling back to `default` when absent.
/// Prints usage and exits when the value does not parse.
pub fn value_or_default<T: FromStr>(matches: &ArgMatches, name: &str, default: T) -> T {
    match matches.value_of(name) {
        Some(raw) => value_or_exit(matches, raw),
        None => default,
    }
}

pub fn optional_value<T: FromStr>(matches: &ArgMatches, name: &str) -> Option<T> {
    matches.value_of(name).map(|raw| value_or_exit(matches, raw))
}

fn value_or_exit<T: FromStr>(matches: &ArgMatches, raw: &str) -> T {
    if let Ok(value) = raw.parse() {
        value
    } else {
        eprintln!("{}", matches.usage());
        process::exit(1);
    }
}

/// Writes a file so that `path` either ends up holding everything `fill`
/// wrote, or is left exactly as it was.
///
/// The data goes to a temporary file in the same directory, which is renamed
/// over `path` only after `fill` succeeds and the contents are synced. When
/// `size_hint` is given, that many bytes are reserved up front so running out
/// of space fails before anything is written. `fill` returns the number of
/// bytes it wrote.
pub fn write_atomically<P, F>(path: P, size_hint: Option<u64>, fill: F) -> io::Result<u64>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<&File>) -> io::Result<u64>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir)?;
    if let Some(len) = size_hint {
        if len > 0 {
            temp.as_file().allocate(len)?;
        }
    }

    let written = {
        let mut writer = BufWriter::new(temp.as_file());
        let written = fill(&mut writer)?;
        writer.flush()?;
        written
    };

    // a hint larger than the real output must not leave zeroed padding behind
    temp.as_file().set_len(written)?;
    temp.as_file().sync_all()?;
    set_default_permissions(temp.as_file())?;

    log::debug!("renaming {:?} to {:?}", temp.path(), path);
    temp.persist(path)?;
    Ok(written)
}

#[cfg(unix)]
fn set_default_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}
