use serde::{Deserialize, Serialize};

use crate::domain::validator::ValidationRules;

/// Configuration for the users_projects module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersProjectsConfig {
    #[serde(default = "default_min_user_name_length")]
    pub min_user_name_length: usize,
    #[serde(default = "default_max_user_name_length")]
    pub max_user_name_length: usize,
    #[serde(default = "default_min_age")]
    pub min_age: i32,
    #[serde(default = "default_max_age")]
    pub max_age: i32,
    #[serde(default = "default_max_project_name_length")]
    pub max_project_name_length: usize,
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
}

impl Default for UsersProjectsConfig {
    fn default() -> Self {
        Self {
            min_user_name_length: default_min_user_name_length(),
            max_user_name_length: default_max_user_name_length(),
            min_age: default_min_age(),
            max_age: default_max_age(),
            max_project_name_length: default_max_project_name_length(),
            max_description_length: default_max_description_length(),
        }
    }
}

impl UsersProjectsConfig {
    /// Deserialize the module's entry from the application config bag.
    /// A missing entry yields the defaults.
    pub fn from_value(value: Option<&serde_json::Value>) -> anyhow::Result<Self> {
        match value {
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| anyhow::anyhow!("invalid users_projects config: {e}")),
            None => Ok(Self::default()),
        }
    }

    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            min_user_name_length: self.min_user_name_length,
            max_user_name_length: self.max_user_name_length,
            min_age: self.min_age,
            max_age: self.max_age,
            max_project_name_length: self.max_project_name_length,
            max_description_length: self.max_description_length,
        }
    }
}

fn default_min_user_name_length() -> usize {
    2
}

fn default_max_user_name_length() -> usize {
    50
}

fn default_min_age() -> i32 {
    19
}

fn default_max_age() -> i32 {
    120
}

fn default_max_project_name_length() -> usize {
    100
}

fn default_max_description_length() -> usize {
    300
}
