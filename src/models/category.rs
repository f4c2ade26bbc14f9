use serde::{Deserialize, Serialize};
use std::fmt;

use super::document::{Fields, Translations};
use super::kind::{Entity, EntityKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Translations>,
    /// Fields outside the known set, kept verbatim.
    #[serde(flatten)]
    pub extra: Fields,
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Category;
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.title.as_deref().unwrap_or("(untitled category)");
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;

        if let Some(description) = &self.description {
            writeln!(f, "{}", description)?;
        }
        if let Some(translations) = &self.translations {
            let locales: Vec<&str> = translations.keys().map(String::as_str).collect();
            writeln!(f, "Locales: {}", locales.join(", "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_round_trip() {
        let value = json!({"title": "Pizza", "sortOrder": 3, "legacy": {"a": 1}});
        let category: Category = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(category.title.as_deref(), Some("Pizza"));
        assert_eq!(category.extra["sortOrder"], 3);
        assert_eq!(serde_json::to_value(&category).unwrap(), value);
    }

    #[test]
    fn test_translations_decode() {
        let category: Category = serde_json::from_value(json!({
            "title": "Drinks",
            "translations": {"fr": {"title": "Boissons"}}
        }))
        .unwrap();
        let translations = category.translations.unwrap();
        assert_eq!(translations["fr"]["title"], "Boissons");
    }

    #[test]
    fn test_display() {
        let category = Category {
            title: Some("Pizza".to_string()),
            description: Some("Stone baked".to_string()),
            ..Category::default()
        };
        let output = category.to_string();
        assert!(output.starts_with("Pizza\n=====\n"));
        assert!(output.contains("Stone baked"));
    }
}
