use super::config::is_yaml;
use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Payloads driven through the item stages (`test_data.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestData {
    pub lost_items: Vec<Value>,
    pub found_items: Vec<Value>,
    #[serde(default)]
    pub lost_item_updates: Vec<ItemUpdate>,
    #[serde(default)]
    pub found_item_updates: Vec<ItemUpdate>,
    pub search_queries: Vec<Map<String, Value>>,
}

/// A PATCH payload aimed at one of the items created earlier in the run.
///
/// `target` is the 1-based position of the item in `lost_items` /
/// `found_items`; the real ID is resolved from the run context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(alias = "id")]
    pub target: usize,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ItemUpdate {
    pub fn payload(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl TestData {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::TestData(format!("cannot read {}: {}", path.display(), e))
        })?;
        let data = Self::parse(&content, is_yaml(path))?;
        data.validate()?;
        Ok(data)
    }

    pub fn parse(content: &str, yaml: bool) -> Result<Self> {
        let parsed = if yaml {
            serde_yaml::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(content).map_err(|e| e.to_string())
        };
        parsed.map_err(HarnessError::TestData)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lost_items.is_empty() {
            return Err(HarnessError::TestData("lost_items is empty".into()));
        }
        if self.found_items.is_empty() {
            return Err(HarnessError::TestData("found_items is empty".into()));
        }
        if self.search_queries.is_empty() {
            return Err(HarnessError::TestData("search_queries is empty".into()));
        }

        check_targets("lost_item_updates", &self.lost_item_updates, self.lost_items.len())?;
        check_targets("found_item_updates", &self.found_item_updates, self.found_items.len())?;
        Ok(())
    }
}

fn check_targets(field: &str, updates: &[ItemUpdate], created: usize) -> Result<()> {
    for update in updates {
        if update.target == 0 || update.target > created {
            return Err(HarnessError::TestData(format!(
                "{} targets item {} but only {} are created",
                field, update.target, created
            )));
        }
    }
    Ok(())
}
