//! File name sanitization for article output.

/// Longest file name produced for a per-article file, extension included.
pub const DEFAULT_MAX_FILENAME_LENGTH: usize = 100;

const FORBIDDEN: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Makes `name` safe to use as a file name on Windows, macOS and Linux.
///
/// - Replaces `\ / * ? : " < > |` with `_`
/// - Trims leading/trailing whitespace
/// - Truncates the stem so the whole name fits in `max_length` characters,
///   keeping the extension (unless the extension alone is too long)
pub fn sanitize_filename(name: &str, max_length: usize) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim();

    if trimmed.chars().count() <= max_length {
        return trimmed.to_string();
    }

    let (stem, ext) = split_extension(trimmed);
    let ext_len = ext.chars().count();

    let truncated = if ext_len > max_length {
        take_chars(trimmed, max_length).to_string()
    } else {
        format!("{}{}", take_chars(stem, max_length - ext_len), ext)
    };

    truncated.trim_end().to_string()
}

/// Splits at the last `.`, ignoring leading dots (`.bashrc` has no extension).
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => name.split_at(idx),
        _ => (name, ""),
    }
}

fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_forbidden_characters() {
        let out = sanitize_filename(r#"a\b/c*d?e:f"g<h>i|j.txt"#, DEFAULT_MAX_FILENAME_LENGTH);
        assert_eq!(out, "a_b_c_d_e_f_g_h_i_j.txt");
        assert!(!out.chars().any(|c| FORBIDDEN.contains(&c)));
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize_filename("  article.txt \t", 100), "article.txt");
    }

    #[test]
    fn url_path_name() {
        assert_eq!(sanitize_filename("_a_b.txt", 100), "_a_b.txt");
    }

    #[test]
    fn truncates_keeping_extension() {
        let long = format!("{}.txt", "x".repeat(300));
        let out = sanitize_filename(&long, 100);
        assert_eq!(out.chars().count(), 100);
        assert!(out.ends_with(".txt"));
        assert_eq!(out, format!("{}.txt", "x".repeat(96)));
    }

    #[test]
    fn extension_longer_than_limit() {
        let out = sanitize_filename("a.abcdefghij", 5);
        assert_eq!(out, "a.abc");
    }

    #[test]
    fn leading_dot_is_not_an_extension() {
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("notes.tar.gz"), ("notes.tar", ".gz"));
        assert_eq!(sanitize_filename(".bashrc", 3), ".ba");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let name = format!("{}.txt", "é".repeat(200));
        let out = sanitize_filename(&name, 100);
        assert_eq!(out.chars().count(), 100);
        assert!(out.ends_with(".txt"));
    }

    #[test]
    fn truncation_does_not_leave_trailing_space() {
        assert_eq!(sanitize_filename("abc def", 4), "abc");
    }

    #[test]
    fn length_bound_holds_for_every_limit() {
        let inputs = [
            "",
            "plain",
            "_kb_articles_how-to-reset-your-password.txt",
            "  spaced  name  .md ",
            "no/ext/at/all",
            "a.verylongextension",
            "ünïcödé/päth.txt",
        ];
        for input in inputs {
            for max in 0..60 {
                let out = sanitize_filename(input, max);
                assert!(out.chars().count() <= max, "{input:?} with {max} gave {out:?}");
            }
        }
    }

    #[test]
    fn idempotent_on_own_output() {
        let inputs = [
            "_kb_s_article_Reset-Your-Password.txt",
            "  what?  is: this  .txt",
            "abc def ghi",
            "x.abcdefghijk",
        ];
        for input in inputs {
            for max in [3, 5, 8, 12, 100] {
                let once = sanitize_filename(input, max);
                assert_eq!(sanitize_filename(&once, max), once, "{input:?} with {max}");
            }
        }
    }
}
