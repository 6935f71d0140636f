//! Destination file naming

use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("file name pattern is valid"));

const FALLBACK_NAME: &str = "model.gguf";

/// Derive the file name an imported model is stored under.
///
/// Keeps only the last path component of `display_name`, replaces anything
/// outside `[A-Za-z0-9._-]` with `_` and strips leading dots so the result
/// can never escape or hide inside the models directory. The result always
/// ends in a lowercase `.gguf`, appended when missing.
pub fn destination_file_name(display_name: &str) -> String {
    let base = display_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let sanitized = UNSAFE_CHARS.replace_all(base, "_");
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '_') {
        return FALLBACK_NAME.to_string();
    }

    // Only ASCII survives the pattern above, so byte slicing is safe
    let stem = if sanitized.to_ascii_lowercase().ends_with(".gguf") {
        &sanitized[..sanitized.len() - ".gguf".len()]
    } else {
        sanitized
    };
    format!("{}.gguf", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_is_kept() {
        assert_eq!(
            destination_file_name("SmolLM2-360M-Instruct-Q8_0.gguf"),
            "SmolLM2-360M-Instruct-Q8_0.gguf"
        );
    }

    #[test]
    fn test_extension_is_appended() {
        assert_eq!(destination_file_name("qwen2.5-0.5b"), "qwen2.5-0.5b.gguf");
    }

    #[test]
    fn test_extension_case_is_normalized() {
        assert_eq!(destination_file_name("Model.GGUF"), "Model.gguf");
        assert_eq!(destination_file_name("Phi-3.Gguf"), "Phi-3.gguf");
    }

    #[test]
    fn test_path_components_are_dropped() {
        assert_eq!(destination_file_name("../../etc/passwd"), "passwd.gguf");
        assert_eq!(destination_file_name(r"C:\Downloads\phi.gguf"), "phi.gguf");
    }

    #[test]
    fn test_unsafe_characters_are_replaced() {
        assert_eq!(destination_file_name("my model (1).gguf"), "my_model__1_.gguf");
    }

    #[test]
    fn test_hidden_and_empty_names_fall_back() {
        assert_eq!(destination_file_name(".gguf"), "gguf.gguf");
        assert_eq!(destination_file_name(".."), FALLBACK_NAME);
        assert_eq!(destination_file_name(""), FALLBACK_NAME);
        assert_eq!(destination_file_name("dir/"), FALLBACK_NAME);
        assert_eq!(destination_file_name("???"), FALLBACK_NAME);
    }
}
