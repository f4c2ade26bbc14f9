use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::document::Fields;
use super::kind::{Entity, EntityKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("(anonymous user)");
        writeln!(f, "{}", name)?;
        writeln!(f, "{}", "=".repeat(name.len()))?;

        if let Some(email) = &self.email {
            writeln!(f, "Email: {}", email)?;
        }
        if let Some(phone) = &self.phone {
            writeln!(f, "Phone: {}", phone)?;
        }
        if let Some(role) = &self.role {
            writeln!(f, "Role: {}", role)?;
        }

        Ok(())
    }
}
