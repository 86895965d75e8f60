//! French free-text normalization and accept-list matching.
//!
//! Matching rule: two strings match if they are equal as-is, or equal after
//! both are normalized. The short-circuit keeps exact accented input cheap
//! while still accepting accent-dropped input ("eleve" for "élève").

use unicode_normalization::UnicodeNormalization;

/// Canonicalize free text for comparison: trim, lowercase, NFD-decompose and
/// strip combining marks (é ≈ e), expand the French ligatures œ→oe and æ→ae,
/// collapse whitespace runs to a single space.
pub fn normalize(s: &str) -> String {
  let stripped: String = s
    .trim()
    .to_lowercase()
    .nfd()
    .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
    .collect();

  let mut out = String::with_capacity(stripped.len());
  let mut pending_space = false;
  for ch in stripped.chars() {
    if ch.is_whitespace() {
      pending_space = !out.is_empty();
      continue;
    }
    if pending_space {
      out.push(' ');
      pending_space = false;
    }
    match ch {
      'œ' => out.push_str("oe"),
      'æ' => out.push_str("ae"),
      _ => out.push(ch),
    }
  }
  out
}

/// True if `submitted` matches any accepted string, exactly or normalized.
pub fn matches(submitted: &str, accepted: &[String]) -> bool {
  accepted.iter().any(|a| a == submitted)
    || accepted.iter().any(|a| normalize(a) == normalize(submitted))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_accents() {
    assert_eq!(normalize("élève"), "eleve");
    assert_eq!(normalize("Être"), "etre");
    assert_eq!(normalize("ÇA VA"), "ca va");
  }

  #[test]
  fn expands_ligatures() {
    assert_eq!(normalize("sœur"), "soeur");
    assert_eq!(normalize("curriculum vitæ"), "curriculum vitae");
  }

  #[test]
  fn collapses_whitespace() {
    assert_eq!(normalize("  il  y   a "), "il y a");
    assert_eq!(normalize("\tvas \n voir"), "vas voir");
  }

  #[test]
  fn normalization_is_idempotent() {
    for s in ["élève", "  SŒUR  d'à côté ", "vue", "", "vas   voir"] {
      let once = normalize(s);
      assert_eq!(normalize(&once), once);
    }
  }

  #[test]
  fn accent_insensitive_match() {
    let accepted = vec!["élève".to_string()];
    assert!(matches("eleve", &accepted));
    assert!(matches("élève", &accepted));
    assert!(!matches("eleves", &accepted));
  }

  #[test]
  fn exact_match_short_circuits() {
    // Equal before normalization also counts, whatever the accepted casing.
    let accepted = vec!["Vue".to_string()];
    assert!(matches("Vue", &accepted));
  }

  #[test]
  fn trimmed_uppercase_accented_input() {
    // "VUÉ " normalizes to "vue".
    assert!(matches("VUÉ ", &["vue".to_string()]));
  }
}
