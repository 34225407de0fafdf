/// Application name, used for well-known directories.
pub const APP_NAME: &str = "sdkpack";

/// Configuration file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "sdkpack.toml";

/// Marker file written into a staged prefix once a package completed.
pub const COMPLETE_MARKER: &str = ".sdkpack-complete";

/// Install prefix of the assembled bundle.
pub const DEFAULT_PACKAGE_PREFIX: &str = "/Library/Frameworks/Mono.framework/Versions/Current";

/// Fixed timestamp exported to build commands (1980-01-01, the ZIP epoch).
pub const SOURCE_DATE_EPOCH: &str = "315532800";
