use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::document::{Fields, Translations};
use super::kind::{Entity, EntityKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form: a single line or a structured address object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Translations>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Entity for Restaurant {
    const KIND: EntityKind = EntityKind::Restaurant;
}

impl fmt::Display for Restaurant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("(unnamed restaurant)");
        writeln!(f, "{}", name)?;
        writeln!(f, "{}", "=".repeat(name.len()))?;

        if let Some(cuisine) = &self.cuisine {
            writeln!(f, "Cuisine: {}", cuisine)?;
        }
        if let Some(rating) = self.rating {
            writeln!(f, "Rating: {:.1}", rating)?;
        }
        match &self.address {
            Some(Value::String(line)) => writeln!(f, "Address: {}", line)?,
            Some(other) => writeln!(f, "Address: {}", other)?,
            None => {}
        }
        if let Some(description) = &self.description {
            writeln!(f, "\n{}", description)?;
        }

        Ok(())
    }
}
