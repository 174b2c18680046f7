/// Normalizes a human-readable carline/stage name into the identifier used
/// to build storage keys: lowercase, runs of non-alphanumerics collapsed to
/// a single hyphen, no leading/trailing hyphen.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_carline_names() {
        assert_eq!(slugify("T Line"), "t-line");
        assert_eq!(slugify("S MOPF Line"), "s-mopf-line");
        assert_eq!(slugify("Stage 1"), "stage-1");
    }

    #[test]
    fn slugify_collapses_and_trims_separators() {
        assert_eq!(slugify("  RB -- Line  "), "rb-line");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }
}
