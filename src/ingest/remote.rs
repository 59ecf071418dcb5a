use std::sync::OnceLock;

use regex::Regex;
use url::Url;

fn image_extension_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.(png|jpe?g|webp|gif|bmp|svg)$").expect("static regex"))
}

fn image_format_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(png|jpe?g|webp|gif|bmp|svg)$").expect("static regex"))
}

/// Whether `candidate` is an absolute URL that points straight at an image:
/// either the path ends in an image extension, or a `format` / `fm` query
/// parameter names an image format. Page URLs (search results etc.) fail.
pub fn looks_like_image_url(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate.trim()) else {
        return false;
    };

    if image_extension_re().is_match(url.path()) {
        return true;
    }

    let format = url
        .query_pairs()
        .find(|(key, _)| key == "format")
        .or_else(|| url.query_pairs().find(|(key, _)| key == "fm"))
        .map(|(_, value)| value.to_lowercase())
        .unwrap_or_default();
    image_format_re().is_match(&format)
}
