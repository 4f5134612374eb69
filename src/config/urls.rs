//! Distribution mirror URLs

/// Official PHP distribution mirror
pub const PHP_DISTRIBUTIONS: &str = "https://www.php.net/distributions";

/// Build the source archive URL for a version on a mirror
pub fn source_archive_url(mirror: &str, version: &str) -> String {
    format!("{}/php-{version}.tar.gz", mirror.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_archive_url() {
        assert_eq!(
            source_archive_url(PHP_DISTRIBUTIONS, "5.4.1"),
            "https://www.php.net/distributions/php-5.4.1.tar.gz"
        );
    }

    #[test]
    fn test_source_archive_url_trims_trailing_slash() {
        assert_eq!(
            source_archive_url("https://mirror.example/php/", "7.0.0RC1"),
            "https://mirror.example/php/php-7.0.0RC1.tar.gz"
        );
    }
}
