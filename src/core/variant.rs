//! Variant registry
//!
//! Static catalog of known variants. Each variant maps to the configure
//! flags it enables, and may name variants it conflicts with or requires.
//! The table is read-only and shared; lookups never mutate it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value of an enabled variant
///
/// Plain `+name` is `Flag(true)`. `+name=value` carries the value, which
/// is appended to the variant's first flag (`--with-openssl=yes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantValue {
    /// Enabled (`true`) or explicitly off (`false`)
    Flag(bool),
    /// Enabled with a parameter
    Value(String),
}

impl VariantValue {
    /// Whether the value turns the variant on
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Flag(false))
    }
}

impl Default for VariantValue {
    fn default() -> Self {
        Self::Flag(true)
    }
}

impl fmt::Display for VariantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Value(v) => f.write_str(v),
        }
    }
}

/// Variant name to value, ordered by name
pub type VariantMap = BTreeMap<String, VariantValue>;

/// Definition of one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    /// Variant name as typed after `+`
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Configure flags enabled by this variant
    pub flags: &'static [&'static str],
    /// Whether `+name=value` is meaningful
    pub accepts_value: bool,
    /// Variants that should not be enabled together with this one
    pub conflicts: &'static [&'static str],
    /// Variants this one needs
    pub requires: &'static [&'static str],
}

impl VariantSpec {
    const fn new(name: &'static str, description: &'static str, flags: &'static [&'static str]) -> Self {
        Self {
            name,
            description,
            flags,
            accepts_value: false,
            conflicts: &[],
            requires: &[],
        }
    }

    const fn with_value(mut self) -> Self {
        self.accepts_value = true;
        self
    }

    const fn conflicts_with(mut self, names: &'static [&'static str]) -> Self {
        self.conflicts = names;
        self
    }

    const fn requiring(mut self, names: &'static [&'static str]) -> Self {
        self.requires = names;
        self
    }

    /// Configure flags for this variant with the given value
    pub fn render(&self, value: &VariantValue) -> Vec<String> {
        match value {
            VariantValue::Flag(false) => Vec::new(),
            VariantValue::Value(v) if self.accepts_value && !v.is_empty() => self
                .flags
                .iter()
                .enumerate()
                .map(|(i, flag)| {
                    if i == 0 {
                        format!("{flag}={v}")
                    } else {
                        (*flag).to_string()
                    }
                })
                .collect(),
            _ => self.flags.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

/// A named group of variants (`+default`, `+dbs`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualVariant {
    /// Group name
    pub name: &'static str,
    /// Member variant names
    pub members: &'static [&'static str],
}

/// Advisory finding about a variant set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantAdvice {
    /// Name not present in the registry
    Unknown { name: String },
    /// Two enabled variants conflict
    Conflict { name: String, other: String },
    /// An enabled variant requires one that is not enabled
    MissingRequirement { name: String, required: String },
    /// A value was given to a variant that takes none
    IgnoredValue { name: String, value: String },
}

impl fmt::Display for VariantAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { name } => write!(f, "unknown variant '{name}' (passed through without flags)"),
            Self::Conflict { name, other } => write!(f, "variant '{name}' conflicts with '{other}'"),
            Self::MissingRequirement { name, required } => {
                write!(f, "variant '{name}' requires '{required}', which is not enabled")
            }
            Self::IgnoredValue { name, value } => {
                write!(f, "variant '{name}' takes no value, ignoring '{value}'")
            }
        }
    }
}

const XML_FLAGS: &[&str] = &[
    "--enable-dom",
    "--enable-libxml",
    "--enable-simplexml",
    "--enable-xml",
    "--enable-xmlreader",
    "--enable-xmlwriter",
    "--with-xsl",
];

const BUILTIN_VARIANTS: &[VariantSpec] = &[
    VariantSpec::new("apxs2", "Build the Apache 2 module", &["--with-apxs2"])
        .with_value()
        .conflicts_with(&["fpm"]),
    VariantSpec::new("bcmath", "Arbitrary precision math", &["--enable-bcmath"]),
    VariantSpec::new("bz2", "bzip2 compression", &["--with-bz2"]).with_value(),
    VariantSpec::new("calendar", "Calendar conversion", &["--enable-calendar"]),
    VariantSpec::new("cli", "Command line SAPI", &["--enable-cli"]),
    VariantSpec::new("ctype", "Character type checking", &["--enable-ctype"]),
    VariantSpec::new("curl", "cURL support", &["--with-curl"]).with_value(),
    VariantSpec::new("debug", "Debug build", &["--enable-debug"]),
    VariantSpec::new("dom", "DOM extension", &["--enable-dom"]),
    VariantSpec::new("fileinfo", "File information", &["--enable-fileinfo"]),
    VariantSpec::new("filter", "Data filtering", &["--enable-filter"]),
    VariantSpec::new("fpm", "FastCGI process manager", &["--enable-fpm"])
        .conflicts_with(&["apxs2"]),
    VariantSpec::new("ftp", "FTP support", &["--enable-ftp"]),
    VariantSpec::new("gd", "Image processing", &["--with-gd"]).with_value(),
    VariantSpec::new("gettext", "GNU gettext", &["--with-gettext"]).with_value(),
    VariantSpec::new("gmp", "GNU multiple precision", &["--with-gmp"]).with_value(),
    VariantSpec::new("iconv", "Character set conversion", &["--with-iconv"]).with_value(),
    VariantSpec::new("intl", "Internationalization (ICU)", &["--enable-intl"]),
    VariantSpec::new("json", "JSON support", &["--enable-json"]),
    VariantSpec::new("mbregex", "Multibyte regular expressions", &["--enable-mbregex"])
        .requiring(&["mbstring"]),
    VariantSpec::new("mbstring", "Multibyte strings", &["--enable-mbstring"]),
    VariantSpec::new("mcrypt", "mcrypt encryption", &["--with-mcrypt"]).with_value(),
    VariantSpec::new("mhash", "mhash hashing", &["--with-mhash"]).with_value(),
    VariantSpec::new("mysql", "MySQL drivers", &["--with-mysql", "--with-mysqli", "--with-pdo-mysql"])
        .with_value()
        .requiring(&["pdo"]),
    VariantSpec::new("openssl", "OpenSSL support", &["--with-openssl"]).with_value(),
    VariantSpec::new("pcntl", "Process control", &["--enable-pcntl"]),
    VariantSpec::new("pcre", "Perl compatible regular expressions", &["--with-pcre-regex"])
        .with_value(),
    VariantSpec::new("pdo", "PHP data objects", &["--enable-pdo"]),
    VariantSpec::new("pear", "PEAR installer", &["--with-pear"]).with_value(),
    VariantSpec::new("pgsql", "PostgreSQL drivers", &["--with-pgsql", "--with-pdo-pgsql"])
        .with_value()
        .requiring(&["pdo"]),
    VariantSpec::new("phar", "Phar archives", &["--enable-phar"]),
    VariantSpec::new("posix", "POSIX functions", &["--enable-posix"]),
    VariantSpec::new("readline", "Readline for the interactive shell", &["--with-readline"])
        .with_value(),
    VariantSpec::new("session", "Session handling", &["--enable-session"]),
    VariantSpec::new("soap", "SOAP support", &["--enable-soap"]),
    VariantSpec::new("sockets", "Socket functions", &["--enable-sockets"]),
    VariantSpec::new("sqlite", "SQLite drivers", &["--with-sqlite3", "--with-pdo-sqlite"])
        .with_value()
        .requiring(&["pdo"]),
    VariantSpec::new("tokenizer", "Tokenizer", &["--enable-tokenizer"]),
    VariantSpec::new("xml", "XML extensions", XML_FLAGS),
    VariantSpec::new("zip", "Zip archives", &["--enable-zip"]),
    VariantSpec::new("zlib", "zlib compression", &["--with-zlib"]).with_value(),
];

const BUILTIN_VIRTUAL: &[VirtualVariant] = &[
    VirtualVariant {
        name: "default",
        members: &[
            "bcmath", "bz2", "calendar", "cli", "ctype", "dom", "fileinfo", "filter", "json",
            "mbregex", "mbstring", "mhash", "pcntl", "pcre", "pdo", "phar", "posix", "readline",
            "sockets", "tokenizer", "xml", "curl", "zip", "openssl",
        ],
    },
    VirtualVariant {
        name: "dbs",
        members: &["sqlite", "mysql", "pgsql", "pdo"],
    },
    VirtualVariant {
        name: "mb",
        members: &["mbstring", "mbregex"],
    },
];

/// Read-only lookup table of variants
#[derive(Debug, Clone, Copy)]
pub struct VariantRegistry {
    variants: &'static [VariantSpec],
    virtuals: &'static [VirtualVariant],
}

impl VariantRegistry {
    /// The built-in PHP variant table
    pub const fn builtin() -> Self {
        Self {
            variants: BUILTIN_VARIANTS,
            virtuals: BUILTIN_VIRTUAL,
        }
    }

    /// Look up a variant by name
    pub fn get(&self, name: &str) -> Option<&'static VariantSpec> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Look up a virtual variant by name
    pub fn virtual_variant(&self, name: &str) -> Option<&'static VirtualVariant> {
        self.virtuals.iter().find(|v| v.name == name)
    }

    /// Whether the registry knows `name`
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All variant definitions
    pub fn variants(&self) -> &'static [VariantSpec] {
        self.variants
    }

    /// All virtual variants
    pub fn virtuals(&self) -> &'static [VirtualVariant] {
        self.virtuals
    }

    /// Translate a variant map into configure flags
    ///
    /// Variants are visited in name order. Unknown names contribute no flags.
    pub fn configure_flags(&self, variants: &VariantMap) -> Vec<String> {
        variants
            .iter()
            .filter_map(|(name, value)| self.get(name).map(|spec| spec.render(value)))
            .flatten()
            .collect()
    }

    /// Advisory checks: unknown names, conflicts, missing requirements
    pub fn check(&self, variants: &VariantMap) -> Vec<VariantAdvice> {
        let mut advice = Vec::new();

        for (name, value) in variants.iter().filter(|(_, v)| v.is_enabled()) {
            let Some(spec) = self.get(name) else {
                advice.push(VariantAdvice::Unknown { name: name.clone() });
                continue;
            };

            if let VariantValue::Value(v) = value {
                if !spec.accepts_value {
                    advice.push(VariantAdvice::IgnoredValue {
                        name: name.clone(),
                        value: v.clone(),
                    });
                }
            }

            for other in spec.conflicts {
                // Report each conflicting pair once
                if name.as_str() < *other && variants.get(*other).is_some_and(VariantValue::is_enabled) {
                    advice.push(VariantAdvice::Conflict {
                        name: name.clone(),
                        other: (*other).to_string(),
                    });
                }
            }

            for required in spec.requires {
                if !variants.get(*required).is_some_and(VariantValue::is_enabled) {
                    advice.push(VariantAdvice::MissingRequirement {
                        name: name.clone(),
                        required: (*required).to_string(),
                    });
                }
            }
        }

        advice
    }
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
