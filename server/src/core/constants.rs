// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "StudioFit";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "studiofit";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "studiofit.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "STUDIOFIT_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "STUDIOFIT_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "STUDIOFIT_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "STUDIOFIT_LOG";

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "STUDIOFIT_DATA_DIR";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5600;

/// Default data directory (relative to the working directory)
pub const DEFAULT_DATA_DIR: &str = "data";

/// Body limit for API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Authentication
// =============================================================================

/// Environment variable for the JWT signing secret
pub const ENV_AUTH_SECRET: &str = "STUDIOFIT_AUTH_SECRET";

/// Environment variable for the bootstrap admin password
pub const ENV_ADMIN_PASSWORD: &str = "STUDIOFIT_ADMIN_PASSWORD";

/// Login of the admin account created on first run
pub const DEFAULT_ADMIN_LOGIN: &str = "admin";

/// Default access token TTL in hours
pub const DEFAULT_TOKEN_TTL_HOURS: u32 = 24;

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "studiofit.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Query Limits
// =============================================================================

/// Hard cap on rows returned by a single listing query
pub const MAX_LIST_ROWS: u32 = 1000;
