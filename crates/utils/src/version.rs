use std::sync::LazyLock;

/// Defines the application version.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    format_version(
        env!("IMAGE_VERSION"),
        option_env!("VERGEN_GIT_SHA"),
        option_env!("VERGEN_GIT_DIRTY"),
    )
});

fn format_version(image_version: &str, sha: Option<&str>, dirty: Option<&str>) -> String {
    format!(
        "{}-{}{}",
        image_version,
        sha.unwrap_or("unknown"),
        if dirty == Some("true") { "-dirty" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn version_without_git_metadata() {
        assert_eq!(format_version("latest", None, None), "latest-unknown");
    }

    #[test]
    fn version_marks_dirty_tree() {
        assert_eq!(
            format_version("v1.2.0", Some("abc123"), Some("true")),
            "v1.2.0-abc123-dirty"
        );
        assert_eq!(
            format_version("v1.2.0", Some("abc123"), Some("false")),
            "v1.2.0-abc123"
        );
    }
}
