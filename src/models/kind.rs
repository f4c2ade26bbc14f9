use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of entity kinds the store knows about.
///
/// Each kind owns one collection, which doubles as its HTTP base path and its
/// key in a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Category,
    MenuItem,
    Restaurant,
    Order,
    User,
    Drone,
}

impl EntityKind {
    /// All kinds, in the order the synchronizer processes them.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Category,
        EntityKind::MenuItem,
        EntityKind::Restaurant,
        EntityKind::Order,
        EntityKind::User,
        EntityKind::Drone,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::MenuItem => "menuItem",
            EntityKind::Restaurant => "restaurant",
            EntityKind::Order => "order",
            EntityKind::User => "user",
            EntityKind::Drone => "drone",
        }
    }

    /// Collection name, used as the base path and snapshot key.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Category => "categories",
            EntityKind::MenuItem => "menuItems",
            EntityKind::Restaurant => "restaurants",
            EntityKind::Order => "orders",
            EntityKind::User => "users",
            EntityKind::Drone => "drones",
        }
    }

    /// Fields a document of this kind is expected to carry.
    ///
    /// Advisory only: documents with other fields are stored as-is.
    pub fn known_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Category => &["title", "description", "image", "translations"],
            EntityKind::MenuItem => &[
                "title",
                "description",
                "price",
                "image",
                "categoryId",
                "restaurantId",
                "available",
                "translations",
            ],
            EntityKind::Restaurant => &[
                "name",
                "description",
                "address",
                "image",
                "rating",
                "cuisine",
                "translations",
            ],
            EntityKind::Order => &[
                "userId",
                "restaurantId",
                "items",
                "total",
                "status",
                "address",
                "droneId",
                "createdAt",
            ],
            EntityKind::User => &["name", "email", "phone", "address", "role"],
            EntityKind::Drone => &["name", "status", "batteryLevel", "location", "restaurantId"],
        }
    }

    /// Exact lookup by collection name (snapshot keys are case-sensitive).
    pub fn from_collection(collection: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection() == collection)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    /// Accepts either the kind name or its collection, ignoring case and dashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.replace(['-', '_'], "").to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.name().to_lowercase() == wanted || kind.collection().to_lowercase() == wanted
            })
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|k| k.collection()).collect();
                format!(
                    "Invalid entity kind '{}'. Valid options: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// Typed view of one entity kind's documents.
pub trait Entity: Serialize + DeserializeOwned {
    const KIND: EntityKind;
}
