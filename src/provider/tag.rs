// Language tag normalization: "en-gb.UTF-8@euro" -> "en_GB"

/// Normalize a dictionary tag.
///
/// Strips surrounding whitespace, any `@modifier` and `.charset` suffix,
/// turns the first `-` into `_`, lower-cases the language part and upper-cases
/// the region part.
pub fn normalize(tag: &str) -> String {
    let mut tag = tag.trim();
    if let Some(at) = tag.find('@') {
        tag = &tag[..at];
    }
    if let Some(dot) = tag.find('.') {
        tag = &tag[..dot];
    }

    let tag = tag.replacen('-', "_", 1);
    match tag.split_once('_') {
        Some((language, region)) => format!(
            "{}_{}",
            language.to_ascii_lowercase(),
            region.to_ascii_uppercase()
        ),
        None => tag.to_ascii_lowercase(),
    }
}

/// A valid tag is non-empty and contains only ASCII alphanumerics and `_`.
pub fn is_valid(tag: &str) -> bool {
    !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The ISO-639 language part of a normalized tag ("en_US" -> "en").
pub fn iso_639(tag: &str) -> &str {
    tag.split('_').next().unwrap_or(tag)
}

#[cfg(test)]
#[path = "tag_test.rs"]
mod tests;
