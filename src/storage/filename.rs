/// Characters no common filesystem accepts in a file name
const INVALID_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Device names Windows reserves regardless of extension
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Longest file name most filesystems accept, in bytes
pub const MAX_FILENAME_BYTES: usize = 255;

/// Makes a book title usable as a file name
///
/// Invalid and control characters are removed (not replaced), the result is
/// cut to `max_bytes` on a character boundary, surrounding whitespace and
/// trailing dots are dropped, and reserved device names get a `_` suffix.
/// Callers that append an extension pass a cap that leaves room for it.
/// The result may be empty; callers decide what an empty name means.
pub fn sanitize_filename(name: &str, max_bytes: usize) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !INVALID_CHARS.contains(c) && !c.is_control())
        .collect();

    let mut end = cleaned.len().min(max_bytes);
    while !cleaned.is_char_boundary(end) {
        end -= 1;
    }

    let trimmed = cleaned[..end]
        .trim()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    let stem = trimmed.split('.').next().unwrap_or("");
    if RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
    {
        return format!("{}_", trimmed);
    }

    trimmed.to_string()
}
