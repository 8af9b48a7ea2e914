use crate::domain::commodity::{Commodity, CommodityKind, Order, Product, RecordId, Stock};
use crate::domain::participant::{Participant, ParticipantId};
use crate::domain::ports::{CatalogIndex, Changeset, RecordStore};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct LedgerState {
    participants: HashMap<ParticipantId, Participant>,
    commodities: BTreeMap<RecordId, Commodity>,
    stocks: BTreeMap<RecordId, Stock>,
    orders: BTreeMap<RecordId, Order>,
}

/// A thread-safe in-memory ledger.
///
/// Uses `Arc<RwLock<..>>` so clones share the same records; one clone can
/// serve as the record store and another as the catalog index. A changeset
/// is applied under a single write lock, which makes commits atomic.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryLedger {
    async fn participant(&self, id: &ParticipantId) -> Result<Option<Participant>> {
        let state = self.state.read().await;
        Ok(state.participants.get(id).cloned())
    }

    async fn participants(&self) -> Result<Vec<Participant>> {
        let state = self.state.read().await;
        let mut all: Vec<Participant> = state.participants.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn commodity(&self, id: RecordId) -> Result<Option<Commodity>> {
        let state = self.state.read().await;
        Ok(state.commodities.get(&id).cloned())
    }

    async fn max_record_id(&self) -> Result<Option<RecordId>> {
        let state = self.state.read().await;
        Ok([
            state.commodities.keys().next_back(),
            state.stocks.keys().next_back(),
            state.orders.keys().next_back(),
        ]
        .into_iter()
        .flatten()
        .max()
        .copied())
    }

    async fn commit(&self, changes: Changeset) -> Result<()> {
        let mut state = self.state.write().await;

        // Check before touching anything so a refused changeset leaves no trace.
        for order in &changes.orders {
            if state.orders.contains_key(&order.id) {
                return Err(PipelineError::StoreError(format!(
                    "order {} already exists",
                    order.id
                )));
            }
        }

        state.participants.extend(changes.participants);
        for (id, commodity) in changes.commodities {
            match commodity {
                Some(commodity) => {
                    state.commodities.insert(id, commodity);
                }
                None => {
                    state.commodities.remove(&id);
                }
            }
        }
        state.stocks.extend(changes.stocks);
        for order in changes.orders {
            state.orders.insert(order.id, order);
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogIndex for InMemoryLedger {
    async fn holdings(
        &self,
        owner: &ParticipantId,
        kind: CommodityKind,
    ) -> Result<Vec<Commodity>> {
        let state = self.state.read().await;
        Ok(state
            .commodities
            .values()
            .filter(|c| c.is_owned_by(owner, kind))
            .cloned()
            .collect())
    }

    async fn product_named(&self, owner: &ParticipantId, name: &str) -> Result<Option<Product>> {
        let state = self.state.read().await;
        Ok(state
            .commodities
            .values()
            .filter_map(Commodity::as_product)
            .find(|p| &p.owner == owner && p.name == name)
            .cloned())
    }

    async fn stock_of(&self, product: RecordId) -> Result<Option<Stock>> {
        let state = self.state.read().await;
        Ok(state
            .stocks
            .values()
            .find(|s| s.product == product)
            .cloned())
    }

    async fn orders_of(&self, customer: &ParticipantId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .values()
            .filter(|o| &o.customer == customer)
            .cloned()
            .collect())
    }
}
