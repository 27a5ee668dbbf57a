use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cfg_if::cfg_if;

/// Locates `program` the way a shell would: directly if it contains a path
/// separator, otherwise by walking `PATH`.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    metadata.is_file() && has_exec_bit(&metadata)
}

cfg_if! {
    if #[cfg(unix)] {
        fn has_exec_bit(metadata: &fs::Metadata) -> bool {
            use std::os::unix::fs::PermissionsExt;
            metadata.permissions().mode() & 0o111 != 0
        }
    } else {
        fn has_exec_bit(_metadata: &fs::Metadata) -> bool {
            true
        }
    }
}

/// Existence only; the content is never inspected.
pub fn artifact_exists(dir: &Path, name: &str) -> io::Result<()> {
    fs::metadata(dir.join(name)).map(|_| ())
}

/// Removes a file or directory, ignoring any failure.
pub fn remove_best_effort(path: &Path) {
    let _ = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
}
