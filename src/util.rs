//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Keys are substituted in order, so a value containing `{other}` is only
/// expanded if `other` comes later in `pairs`.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings.
/// Cuts on a char boundary so multi-byte text never panics.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

/// Strip trailing slashes so `format!("{base}/path")` never doubles them.
pub fn trim_base_url(url: &str) -> String {
  url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("{a} and {a}, then {b}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and x, then y");
  }

  #[test]
  fn fill_template_leaves_unknown_keys() {
    assert_eq!(fill_template("{missing}", &[("a", "x")]), "{missing}");
  }

  #[test]
  fn trunc_for_log_respects_char_boundaries() {
    let s = "ééééé"; // 10 bytes
    let out = trunc_for_log(s, 3);
    assert!(out.starts_with("é…"));
    assert!(out.ends_with("(10 bytes total)"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }

  #[test]
  fn trim_base_url_drops_trailing_slashes() {
    assert_eq!(trim_base_url("http://ollama:11434//"), "http://ollama:11434");
    assert_eq!(trim_base_url(" http://ocr:8001 "), "http://ocr:8001");
  }
}
