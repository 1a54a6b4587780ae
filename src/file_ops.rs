//! Resolution of shapefile and table paths given on the command line.

use crate::error::{MapError, Result};
use std::path::{Path, PathBuf};

/// Paths of the geometry file and its attribute table.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefilePaths {
    pub shp: PathBuf,
    /// Present only when the table exists next to the geometry
    pub dbf: Option<PathBuf>,
}

/// Appends `.ext` without replacing dots already in the file name.
fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Lower and upper case spellings of an extension, lower case first.
fn spellings(ext: &str) -> [String; 2] {
    [ext.to_ascii_lowercase(), ext.to_ascii_uppercase()]
}

/// Resolves `arg` to an existing file with extension `ext` in any case,
/// returning the file and its path without the extension. An extension
/// given by the caller is kept as written.
fn resolve_with_extension(arg: &Path, ext: &str) -> Result<(PathBuf, PathBuf)> {
    if arg
        .extension()
        .is_some_and(|found| found.eq_ignore_ascii_case(ext))
    {
        if !arg.is_file() {
            return Err(MapError::FileNotFound(arg.to_path_buf()));
        }
        return Ok((arg.to_path_buf(), arg.with_extension("")));
    }

    spellings(ext)
        .iter()
        .map(|spelling| with_suffix(arg, spelling))
        .find(|candidate| candidate.is_file())
        .map(|file| (file, arg.to_path_buf()))
        .ok_or_else(|| MapError::FileNotFound(with_suffix(arg, ext)))
}

/// Resolves a shapefile given as `name` or `name.shp`, in either case.
pub fn resolve_shapefile(arg: &Path) -> Result<ShapefilePaths> {
    let (shp, base) = resolve_with_extension(arg, "shp")?;

    // Prefer the table spelled like the geometry file
    let mut tables = spellings("dbf");
    if shp.extension().is_some_and(|ext| ext == "SHP") {
        tables.reverse();
    }
    let dbf = tables
        .iter()
        .map(|spelling| with_suffix(&base, spelling))
        .find(|candidate| candidate.is_file());
    if dbf.is_none() {
        log::debug!("No attribute table next to {}", shp.display());
    }
    Ok(ShapefilePaths { shp, dbf })
}

/// Resolves an attribute table given as `name` or `name.dbf`, in either case.
pub fn resolve_dbf(arg: &Path) -> Result<PathBuf> {
    resolve_with_extension(arg, "dbf").map(|(dbf, _)| dbf)
}
