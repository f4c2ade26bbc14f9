use clap::Args;
use std::fmt::Display;

use super::OutputFormat;
use foodstore::db::Store;
use foodstore::models::{
    Category, Document, Drone, Entity, EntityKind, MenuItem, Order, Restaurant, User,
};
use foodstore::store::ResourceStore;

/// List every document of one kind
#[derive(Args)]
pub struct ListCommand {
    /// Entity kind (e.g. categories, menu-items, drones)
    kind: EntityKind,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ListCommand {
    pub async fn run(&self, store: &Store) -> Result<(), Box<dyn std::error::Error>> {
        let documents = store.collection(self.kind).list_all().await?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&documents)?);
            }
            OutputFormat::Text => {
                if documents.is_empty() {
                    println!("No {} found.", self.kind.collection());
                    return Ok(());
                }
                for document in &documents {
                    println!("{}", render(self.kind, document));
                }
                println!("{} {}", documents.len(), self.kind.collection());
            }
        }

        Ok(())
    }
}

fn render(kind: EntityKind, document: &Document) -> String {
    match kind {
        EntityKind::Category => render_as::<Category>(document),
        EntityKind::MenuItem => render_as::<MenuItem>(document),
        EntityKind::Restaurant => render_as::<Restaurant>(document),
        EntityKind::Order => render_as::<Order>(document),
        EntityKind::User => render_as::<User>(document),
        EntityKind::Drone => render_as::<Drone>(document),
    }
}

/// Uses the typed view when the document fits it, raw JSON otherwise.
fn render_as<E: Entity + Display>(document: &Document) -> String {
    match document.decode::<E>() {
        Ok(entity) => format!("{}id: {}\n", entity, document.id),
        Err(e) => {
            tracing::debug!(id = %document.id, "Showing raw {}: {}", E::KIND, e);
            let raw = serde_json::to_string_pretty(document).unwrap_or_default();
            format!("{}\n", raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_render_typed() {
        let output = render(
            EntityKind::Category,
            &document(json!({"id": "c1", "title": "Pizza"})),
        );
        assert!(output.starts_with("Pizza\n"));
        assert!(output.contains("id: c1"));
    }

    #[test]
    fn test_render_falls_back_to_json() {
        let output = render(
            EntityKind::MenuItem,
            &document(json!({"id": "m1", "price": "cheap"})),
        );
        assert!(output.contains("\"price\": \"cheap\""));
        assert!(output.contains("\"id\": \"m1\""));
    }
}
