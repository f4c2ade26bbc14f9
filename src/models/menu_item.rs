use serde::{Deserialize, Serialize};
use std::fmt;

use super::document::{Fields, Translations};
use super::kind::{Entity, EntityKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Translations>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Entity for MenuItem {
    const KIND: EntityKind = EntityKind::MenuItem;
}

impl MenuItem {
    /// Items without an explicit flag are treated as available.
    pub fn is_available(&self) -> bool {
        self.available.unwrap_or(true)
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.title.as_deref().unwrap_or("(untitled item)");
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;

        if let Some(price) = self.price {
            writeln!(f, "Price: {:.2}", price)?;
        }
        if !self.is_available() {
            writeln!(f, "Currently unavailable")?;
        }
        if let Some(category) = &self.category_id {
            writeln!(f, "Category: {}", category)?;
        }
        if let Some(restaurant) = &self.restaurant_id {
            writeln!(f, "Restaurant: {}", restaurant)?;
        }
        if let Some(description) = &self.description {
            writeln!(f, "\n{}", description)?;
        }

        Ok(())
    }
}
