use std::env;
use std::sync::LazyLock;

macro_rules! lazy_env_var {
    ($name:ident) => {
        pub static $name: LazyLock<String> = LazyLock::new(|| {
            let var_name = stringify!($name);
            env::var(var_name).expect(&format!("{} must be set", var_name))
        });
    };
}

lazy_env_var!(MONGODB_URI);
lazy_env_var!(DB_NAME);
lazy_env_var!(USERS_COL_NAME);
lazy_env_var!(WORKSPACES_COL_NAME);
lazy_env_var!(PROJECTS_COL_NAME);
lazy_env_var!(NOTIFICATIONS_COL_NAME);
lazy_env_var!(FRONTEND_URL);
lazy_env_var!(EMAIL_API_URL);
lazy_env_var!(EMAIL_API_KEY);

/// Invite tokens expire this many days after creation.
pub const INVITE_TTL_DAYS: i64 = 7;

/// Delivery attempts allowed per notification before the failure is terminal.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound on a single delivery provider call, in seconds.
pub const PROVIDER_TIMEOUT_SECS: u64 = 10;
