use super::commodity::{Commodity, CommodityKind, Order, Product, RecordId, Stock};
use super::participant::{Participant, ParticipantId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Every write a single request makes, applied by the store all at once.
///
/// A commodity mapped to `None` is removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    pub participants: BTreeMap<ParticipantId, Participant>,
    pub commodities: BTreeMap<RecordId, Option<Commodity>>,
    pub stocks: BTreeMap<RecordId, Stock>,
    pub orders: Vec<Order>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
            && self.commodities.is_empty()
            && self.stocks.is_empty()
            && self.orders.is_empty()
    }

    /// Number of records this changeset writes or removes.
    pub fn len(&self) -> usize {
        self.participants.len() + self.commodities.len() + self.stocks.len() + self.orders.len()
    }
}

/// Keyed record storage.
///
/// `commit` must apply a changeset atomically: either every write in it
/// becomes visible or none does. Orders are append-only, so committing an
/// order whose id already exists fails the whole changeset.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn participant(&self, id: &ParticipantId) -> Result<Option<Participant>>;
    async fn participants(&self) -> Result<Vec<Participant>>;
    async fn commodity(&self, id: RecordId) -> Result<Option<Commodity>>;
    /// Highest record id in use across commodities, stocks and orders.
    async fn max_record_id(&self) -> Result<Option<RecordId>>;
    async fn commit(&self, changes: Changeset) -> Result<()>;
}

/// Predicate lookups over the same records a [`RecordStore`] holds.
#[async_trait]
pub trait CatalogIndex: Send + Sync {
    /// Commodities of `kind` owned by `owner`, oldest (lowest id) first.
    async fn holdings(&self, owner: &ParticipantId, kind: CommodityKind)
    -> Result<Vec<Commodity>>;
    async fn product_named(&self, owner: &ParticipantId, name: &str) -> Result<Option<Product>>;
    async fn stock_of(&self, product: RecordId) -> Result<Option<Stock>>;
    async fn orders_of(&self, customer: &ParticipantId) -> Result<Vec<Order>>;
}

pub type RecordStoreBox = Box<dyn RecordStore>;
pub type CatalogIndexBox = Box<dyn CatalogIndex>;
