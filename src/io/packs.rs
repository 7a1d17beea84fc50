//! Science pack lookup.
//!
//! A pack may be named symbolically (`scipack_ExGal_SpitzerIRSSLLL`), with an
//! extension (`scipack_ExGal_SpitzerIRSSLLL.ipac`), or given as a path.
//! Symbolic names are searched, in order, in:
//!
//! 1. `$PAHFIT_PACK_DIR` (also read from a `.env` file)
//! 2. `./packs`
//! 3. the `packs/` directory shipped with this crate

use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Environment variable naming an extra pack directory.
pub const PACK_DIR_ENV: &str = "PAHFIT_PACK_DIR";

/// Extensions tried, in order, when a name has none.
const PACK_EXTENSIONS: [&str; 3] = ["ipac", "tbl", "csv"];

/// Resolve a pack name or path to an existing table file.
pub fn find_packfile(name: &str) -> Result<PathBuf, AppError> {
    // Missing `.env` is fine; it only supplements the process environment.
    let _ = dotenvy::dotenv();
    let env_dir = std::env::var_os(PACK_DIR_ENV).map(PathBuf::from);
    find_packfile_in(name, &search_dirs(env_dir))
}

/// Pack directories in search order.
pub fn search_dirs(env_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = env_dir {
        dirs.push(dir);
    }
    dirs.push(PathBuf::from("packs"));
    dirs.push(bundled_pack_dir());
    dirs
}

/// The `packs/` directory shipped with the crate.
pub fn bundled_pack_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("packs")
}

/// Resolve `name` against an explicit list of directories.
pub fn find_packfile_in(name: &str, dirs: &[PathBuf]) -> Result<PathBuf, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::new(2, "Empty science pack name."));
    }

    let direct = PathBuf::from(name);
    if direct.is_file() {
        return Ok(direct);
    }

    let has_ext = Path::new(name).extension().is_some();
    for dir in dirs {
        if has_ext {
            let candidate = dir.join(name);
            if candidate.is_file() {
                log::debug!("resolved pack '{name}' to {}", candidate.display());
                return Ok(candidate);
            }
        }
        for ext in PACK_EXTENSIONS {
            let candidate = dir.join(format!("{name}.{ext}"));
            if candidate.is_file() {
                log::debug!("resolved pack '{name}' to {}", candidate.display());
                return Ok(candidate);
            }
        }
    }

    let searched: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
    Err(AppError::new(
        2,
        format!(
            "Science pack '{name}' not found (searched: {}). Set `{PACK_DIR_ENV}` to add a directory.",
            searched.join(", ")
        ),
    ))
}
