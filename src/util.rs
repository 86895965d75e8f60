//! Small utility helpers used across modules.

/// Option labels in display order, for fallback explanations that name the
/// correct choice ("Réponse correcte : B").
pub const LETTERS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

pub fn option_letter(i: usize) -> char {
  *LETTERS.get(i).unwrap_or(&'?')
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", cut, s.len())
  }
}
