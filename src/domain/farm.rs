// Farm domain model
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFarm {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewFarm {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("farm name must not be empty".to_string());
        }
        Ok(())
    }
}
