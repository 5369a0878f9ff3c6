// src/constants.rs

/// The name of the devtree configuration directory under the system config dir.
pub const CONFIG_DIR_NAME: &str = "devtree";

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "DEVTREE_CONFIG_DIR";

/// The name of the global configuration file (in ~/.config/devtree/).
pub const GLOBAL_CONFIG_FILENAME: &str = "config.toml";

/// The default name of the hierarchy store file (in ~/.config/devtree/).
pub const STORE_FILENAME: &str = "store.bin";

/// Theme used when no level of the hierarchy, nor the global config, sets one.
pub const DEFAULT_THEME: &str = "coolnight-ocean";

/// Storage key of the theme override.
pub const THEME_KEY: &str = "theme";

/// Prefix of every credential override key (`credential.<NAME>`).
pub const CREDENTIAL_KEY_PREFIX: &str = "credential.";

/// Separator used when rendering a resolved path.
pub const PATH_SEPARATOR: &str = "/";
