//! Private utility module
use std::path::Path;

/// Check whether the file's name ends with ".gz".
pub fn is_gz_file<P>(path: P) -> bool
where
    P: AsRef<Path>,
{
    path.as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}

/// The file name of `path` with a trailing ".gz" removed.
pub fn base_file_name<P>(path: P) -> String
where
    P: AsRef<Path>,
{
    let name = path
        .as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(".gz") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Check whether the file's name ends with `suffix`, optionally
/// followed by ".gz".
pub fn has_suffix<P>(path: P, suffix: &str) -> bool
where
    P: AsRef<Path>,
{
    base_file_name(path).ends_with(suffix)
}

/// Second to last dot-separated segment of the file name, ignoring a
/// trailing ".gz". For "subj.dconn.nii" this is "dconn".
pub fn compound_extension<P>(path: P) -> Option<String>
where
    P: AsRef<Path>,
{
    let name = base_file_name(path);
    let mut parts = name.rsplit('.');
    let _ = parts.next()?;
    parts.next().map(String::from)
}
