//! Default configuration values

/// Maximum number of download retry attempts
pub const MAX_DOWNLOAD_RETRIES: u32 = 3;

/// Variants enabled when a build asks for none at all.
///
/// `openssl` carries a value so it renders as `--with-openssl=yes`.
pub const DEFAULT_VARIANTS: &[(&str, Option<&str>)] = &[
    ("json", None),
    ("xml", None),
    ("pcre", None),
    ("pdo", None),
    ("phar", None),
    ("posix", None),
    ("sockets", None),
    ("fileinfo", None),
    ("curl", None),
    ("zip", None),
    ("openssl", Some("yes")),
];

/// Variant enabled for every build unless pear is switched off
pub const PROJECT_DEFAULT_VARIANT: &str = "xml";

/// Raw configure option that suppresses [`PROJECT_DEFAULT_VARIANT`]
pub const PROJECT_DEFAULT_OPT_OUT: &str = "--without-pear";

/// File name of the persisted variant record inside an install prefix
pub const VARIANT_RECORD_FILE: &str = "phpbuild.variants";

/// File name of the build log inside a source directory
pub const BUILD_LOG_FILE: &str = "build.log";

/// Unix permissions for directories created by phpbuild
pub const DIR_MODE: u32 = 0o755;

/// Unix permissions for files written by phpbuild
pub const FILE_MODE: u32 = 0o644;

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
