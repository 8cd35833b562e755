/// Suffix appended to every exported cover.
pub const EXPORT_SUFFIX: &str = "_thumbnail.png";

/// `<business name with whitespace runs as "_">_thumbnail.png`.
///
/// Only whitespace is replaced; every other character is kept as typed.
pub fn export_filename(business_name: &str) -> String {
    let mut out = String::with_capacity(business_name.len() + EXPORT_SUFFIX.len());
    let mut in_space = false;
    for ch in business_name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out.push_str(EXPORT_SUFFIX);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/export/filename.rs"]
mod tests;
