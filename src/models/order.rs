use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::document::Fields;
use super::kind::{Entity, EntityKind};

/// One line of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl OrderLine {
    pub fn subtotal(&self) -> Option<f64> {
        self.price
            .map(|price| price * f64::from(self.quantity.unwrap_or(1)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Entity for Order {
    const KIND: EntityKind = EntityKind::Order;
}

impl Order {
    /// The stored total, or the sum of line subtotals when none was stored.
    pub fn effective_total(&self) -> Option<f64> {
        self.total.or_else(|| {
            self.items
                .iter()
                .map(OrderLine::subtotal)
                .sum::<Option<f64>>()
        })
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = format!("Order ({})", self.status.as_deref().unwrap_or("unknown"));
        writeln!(f, "{}", header)?;
        writeln!(f, "{}", "=".repeat(header.len()))?;

        if let Some(created_at) = self.created_at {
            writeln!(f, "Placed: {}", created_at.format("%Y-%m-%d %H:%M"))?;
        }
        if let Some(user) = &self.user_id {
            writeln!(f, "Customer: {}", user)?;
        }
        if let Some(restaurant) = &self.restaurant_id {
            writeln!(f, "Restaurant: {}", restaurant)?;
        }
        if let Some(drone) = &self.drone_id {
            writeln!(f, "Drone: {}", drone)?;
        }

        if !self.items.is_empty() {
            writeln!(f, "\nItems:")?;
            for line in &self.items {
                let title = line
                    .title
                    .as_deref()
                    .or(line.menu_item_id.as_deref())
                    .unwrap_or("?");
                writeln!(f, "  - {} x{}", title, line.quantity.unwrap_or(1))?;
            }
        }
        if let Some(total) = self.effective_total() {
            writeln!(f, "Total: {:.2}", total)?;
        }

        Ok(())
    }
}
