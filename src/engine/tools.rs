//! Name filters used when enumerating work items

use std::path::Path;

/// Check if a file is an OS metadata file that never counts as a work item
pub fn is_os_hidden_file(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        // macOS resource forks and Finder state, Windows shell files, KDE dir files
        Some(name) => {
            matches!(
                name,
                ".DS_Store" | ".AppleDouble" | "Thumbs.db" | "Desktop.ini" | ".directory"
            ) || name.starts_with("._")
        }
        None => false,
    }
}

/// True when the file extension equals `ext` (no leading dot, case-insensitive).
pub fn has_extension(path: &Path, ext: &str) -> bool {
    let ext = ext.trim_start_matches('.');
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Returns true if the path should become a work item.
pub fn should_include_item(path: &Path, extension: &str, exclude_patterns: &[String]) -> bool {
    if is_os_hidden_file(path) || !has_extension(path, extension) {
        return false;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !exclude_patterns.iter().any(|p| glob_match(p, name))
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_chars(&pattern, &text)
}

fn glob_match_chars(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => {
            if rest.is_empty() {
                return true; // trailing * matches everything
            }
            (0..=text.len()).any(|i| glob_match_chars(rest, &text[i..]))
        }
        Some(('?', rest)) => !text.is_empty() && glob_match_chars(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && glob_match_chars(rest, &text[1..]),
    }
}
