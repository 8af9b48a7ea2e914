use super::money::Money;
use super::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-wide record identifier. Allocated in increasing order, so sorting
/// by id sorts by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    Chocolate,
    CocoaPowder,
}

impl ProductType {
    pub const ALL: [ProductType; 2] = [ProductType::Chocolate, ProductType::CocoaPowder];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub id: RecordId,
    pub price: Money,
    pub expires_at: DateTime<Utc>,
    pub owner: ParticipantId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bean {
    pub id: RecordId,
    /// Inherited from the seed this bean was harvested from.
    pub price: Money,
    pub harvested_at: DateTime<Utc>,
    pub owner: ParticipantId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    pub kind: ProductType,
    pub price: Money,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub owner: ParticipantId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommodityKind {
    Seed,
    Bean,
    Product,
}

impl fmt::Display for CommodityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommodityKind::Seed => "seed",
            CommodityKind::Bean => "bean",
            CommodityKind::Product => "product",
        };
        f.write_str(name)
    }
}

/// A tradable asset, owned by exactly one participant at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Commodity {
    Seed(Seed),
    Bean(Bean),
    Product(Product),
}

impl Commodity {
    pub fn id(&self) -> RecordId {
        match self {
            Commodity::Seed(s) => s.id,
            Commodity::Bean(b) => b.id,
            Commodity::Product(p) => p.id,
        }
    }

    pub fn kind(&self) -> CommodityKind {
        match self {
            Commodity::Seed(_) => CommodityKind::Seed,
            Commodity::Bean(_) => CommodityKind::Bean,
            Commodity::Product(_) => CommodityKind::Product,
        }
    }

    pub fn owner(&self) -> &ParticipantId {
        match self {
            Commodity::Seed(s) => &s.owner,
            Commodity::Bean(b) => &b.owner,
            Commodity::Product(p) => &p.owner,
        }
    }

    pub fn set_owner(&mut self, owner: ParticipantId) {
        match self {
            Commodity::Seed(s) => s.owner = owner,
            Commodity::Bean(b) => b.owner = owner,
            Commodity::Product(p) => p.owner = owner,
        }
    }

    /// Unit price of the commodity.
    pub fn price(&self) -> Money {
        match self {
            Commodity::Seed(s) => s.price,
            Commodity::Bean(b) => b.price,
            Commodity::Product(p) => p.price,
        }
    }

    pub fn as_product(&self) -> Option<&Product> {
        match self {
            Commodity::Product(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_owned_by(&self, owner: &ParticipantId, kind: CommodityKind) -> bool {
        self.kind() == kind && self.owner() == owner
    }
}

/// Per-owner, per-product quantity. Exactly one exists for each product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: RecordId,
    pub owner: ParticipantId,
    pub product: RecordId,
    pub quantity: u64,
}

/// A `{name, quantity}` request line, as sent by the caller.
///
/// The quantity stays signed here so that a bad value can be reported back
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// A retail sale. Created once and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: RecordId,
    pub issued_at: DateTime<Utc>,
    pub total_price: Money,
    pub lines: Vec<LineItem>,
    pub market: ParticipantId,
    pub customer: ParticipantId,
}
