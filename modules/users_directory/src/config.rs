use serde::{Deserialize, Serialize};

/// Configuration for the users_directory module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersDirectoryConfig {
    /// Insert the sample users when the table is empty at startup.
    #[serde(default = "default_seed_on_startup")]
    pub seed_on_startup: bool,
}

impl Default for UsersDirectoryConfig {
    fn default() -> Self {
        Self {
            seed_on_startup: default_seed_on_startup(),
        }
    }
}

fn default_seed_on_startup() -> bool {
    true
}
