use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::document::Fields;
use super::kind::{Entity, EntityKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    /// Usually `{"lat": .., "lng": ..}`, kept as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Entity for Drone {
    const KIND: EntityKind = EntityKind::Drone;
}

impl fmt::Display for Drone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("(unnamed drone)");
        writeln!(f, "{}", name)?;
        writeln!(f, "{}", "=".repeat(name.len()))?;

        if let Some(status) = &self.status {
            writeln!(f, "Status: {}", status)?;
        }
        if let Some(battery) = self.battery_level {
            writeln!(f, "Battery: {:.0}%", battery)?;
        }
        if let Some(restaurant) = &self.restaurant_id {
            writeln!(f, "Base: {}", restaurant)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display() {
        let drone: Drone = serde_json::from_value(json!({
            "name": "Falcon",
            "status": "idle",
            "batteryLevel": 87,
            "location": {"lat": 1.0, "lng": 2.0}
        }))
        .unwrap();

        let output = drone.to_string();
        assert!(output.contains("Status: idle"));
        assert!(output.contains("Battery: 87%"));
        assert!(drone.location.is_some());
    }
}
