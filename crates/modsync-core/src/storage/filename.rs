//! File-name safety for names taken from the remote catalog.
//!
//! A release's `file_name` is joined onto the download directory, so it must
//! be a single plain path component. Names are rejected rather than rewritten:
//! the declared name is the artifact's identity on disk.

const NAME_MAX: usize = 255;

/// Returns `name` unchanged if it is safe to use as a file inside the
/// download directory, or a reason why it is not.
///
/// Rejects empty names, `.` and `..`, NUL, `/`, `\`, control characters,
/// names ending in `.part`, and names longer than 255 bytes (Linux NAME_MAX).
pub fn checked_file_name(name: &str) -> Result<&str, String> {
    if name.is_empty() {
        return Err("empty file name".to_string());
    }
    if name == "." || name == ".." {
        return Err(format!("{:?} is not a file name", name));
    }
    if let Some(c) = name
        .chars()
        .find(|&c| c == '\0' || c == '/' || c == '\\' || c.is_control())
    {
        return Err(format!("file name contains forbidden character {:?}", c));
    }
    if name.ends_with(super::TEMP_SUFFIX) {
        return Err(format!("file name may not end in {}", super::TEMP_SUFFIX));
    }
    if name.len() > NAME_MAX {
        return Err(format!("file name is {} bytes (max {})", name.len(), NAME_MAX));
    }
    Ok(name)
}
