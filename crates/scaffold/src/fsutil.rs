//! Idempotent, permission- and mtime-aware file writing shared by every
//! scaffolded artifact.
//!
//! Every output path is checked the way the distilled spec describes an
//! `os.Stat`-equivalent check: absent -> write; present and `force=false`
//! -> skip with a warning; present and `force=true` -> overwrite and force
//! the mtime to strictly advance, since some downstream watch loops key on
//! mtime equality.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use filetime::FileTime;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// File mode for every scaffolded file.
pub const FILE_MODE: u32 = 0o600;
/// Directory mode for every scaffolded directory.
pub const DIR_MODE: u32 = 0o750;

/// What happened when [`write_file`] was asked to materialise one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The path did not exist; it was created.
    Created,
    /// The path existed and `force` was false; left untouched.
    Skipped,
    /// The path existed and `force` was true; overwritten with its mtime
    /// forced to strictly advance past the prior value.
    Overwritten,
}

impl WriteOutcome {
    /// A short notification line matching this workspace's `ui::print_*`
    /// conventions (the caller decides how to surface it).
    #[must_use]
    pub fn notification(&self, path: &Path) -> String {
        match self {
            Self::Created => format!("created {}", path.display()),
            Self::Skipped => format!("skipped {} (use --force to overwrite)", path.display()),
            Self::Overwritten => format!("overwrote {}", path.display()),
        }
    }
}

/// Write `content` to `path`, applying idempotence and mtime-fencing
/// rules. Creates parent directories (mode [`DIR_MODE`]) as needed.
pub fn write_file(path: &Path, content: &str, force: bool) -> Result<WriteOutcome> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    if path.exists() {
        if !force {
            return Ok(WriteOutcome::Skipped);
        }
        let prior_mtime = fs::metadata(path)
            .with_context(|| format!("reading metadata for {}", path.display()))?
            .modified()
            .with_context(|| format!("reading mtime for {}", path.display()))?;

        fs::write(path, content)
            .with_context(|| format!("overwriting {}", path.display()))?;
        set_mode(path, FILE_MODE)?;
        advance_mtime_past(path, prior_mtime)?;
        return Ok(WriteOutcome::Overwritten);
    }

    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    set_mode(path, FILE_MODE)?;
    Ok(WriteOutcome::Created)
}

/// Create `dir` (and parents) with [`DIR_MODE`] if it does not exist.
pub fn create_dir_all(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir).with_context(|| format!("creating directory {}", dir.display()))?;
    set_mode(dir, DIR_MODE)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    let mut perms = fs::metadata(path)
        .with_context(|| format!("reading metadata for {}", path.display()))?
        .permissions();
    perms.set_mode(mode);
    fs::set_permissions(path, perms)
        .with_context(|| format!("setting permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Force `path`'s mtime to strictly exceed `prior`: add 1ms over the
/// prior mtime, or use "now" if the clock has moved forward past that.
fn advance_mtime_past(path: &Path, prior: SystemTime) -> Result<()> {
    let candidate = prior + std::time::Duration::from_millis(1);
    let now = SystemTime::now();
    let target = candidate.max(now.max(candidate));
    let file_time = FileTime::from_system_time(target);
    filetime::set_file_mtime(path, file_time)
        .with_context(|| format!("advancing mtime on {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn creates_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ksail.yaml");
        let outcome = write_file(&path, "hello", false).unwrap();
        assert_eq!(outcome, WriteOutcome::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn skips_existing_file_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ksail.yaml");
        write_file(&path, "v1", false).unwrap();
        let outcome = write_file(&path, "v2", false).unwrap();
        assert_eq!(outcome, WriteOutcome::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), "v1");
    }

    #[test]
    fn overwrites_and_advances_mtime_with_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ksail.yaml");
        write_file(&path, "v1", false).unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();
        sleep(Duration::from_millis(5));
        let outcome = write_file(&path, "v2", true).unwrap();
        assert_eq!(outcome, WriteOutcome::Overwritten);
        let after = fs::metadata(&path).unwrap().modified().unwrap();
        assert!(after > before);
        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    }

    #[test]
    fn second_no_force_run_is_a_pure_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ksail.yaml");
        write_file(&path, "v1", false).unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();
        let outcome = write_file(&path, "v1", false).unwrap();
        assert_eq!(outcome, WriteOutcome::Skipped);
        let after = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[cfg(unix)]
    #[test]
    fn sets_file_and_directory_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ksail.yaml");
        write_file(&path, "hello", false).unwrap();
        let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, FILE_MODE);
        let dir_mode = fs::metadata(path.parent().unwrap()).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, DIR_MODE);
    }
}
