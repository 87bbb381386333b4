// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_MAIL_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_MAIL_FROM_NAME: &str = "Soporte Beta LCA";

// Token lifetime constants (seconds)
pub const ACCESS_TOKEN_TTL_SECS: usize = 15 * 60;
pub const REFRESH_TOKEN_TTL_SECS: usize = 7 * 24 * 3600;
pub const RESET_TOKEN_TTL_SECS: usize = 15 * 60;

// Invite flow constants
pub const TEMP_PASSWORD_LEN: usize = 10;

// Datastore constants
pub const USER_TABLE: &str = "usuario";

// Request body limit for the JSON API
pub const MAX_JSON_BODY_BYTES: u64 = 16 * 1024;
