use crate::domain::commodity::{Commodity, CommodityKind, Order, Product, RecordId, Stock};
use crate::domain::outcome::Rejection;
use crate::domain::participant::{Participant, ParticipantId, Role};
use crate::domain::ports::{CatalogIndex, Changeset, RecordStore};
use crate::error::Result;
use std::collections::BTreeMap;

/// The writes of one request, staged until [`UnitOfWork::commit`].
///
/// Reads go through the staged changeset first and the store second, so a
/// handler sees its own earlier writes (a product created for one bean is
/// found again for the next). Dropping the unit of work without committing
/// discards every staged write.
pub struct UnitOfWork<'a> {
    store: &'a dyn RecordStore,
    index: &'a dyn CatalogIndex,
    staged: Changeset,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(store: &'a dyn RecordStore, index: &'a dyn CatalogIndex) -> Self {
        Self {
            store,
            index,
            staged: Changeset::default(),
        }
    }

    pub async fn participant(&self, id: &ParticipantId) -> Result<Option<Participant>> {
        if let Some(p) = self.staged.participants.get(id) {
            return Ok(Some(p.clone()));
        }
        self.store.participant(id).await
    }

    /// Loads a participant and checks its role.
    pub async fn participant_as(
        &self,
        id: &ParticipantId,
        expected: Role,
    ) -> Result<std::result::Result<Participant, Rejection>> {
        let Some(participant) = self.participant(id).await? else {
            return Ok(Err(Rejection::UnknownParticipant(id.clone())));
        };
        if participant.role() != expected {
            return Ok(Err(Rejection::RoleMismatch {
                participant: id.clone(),
                expected,
                actual: participant.role(),
            }));
        }
        Ok(Ok(participant))
    }

    /// Commodities of `kind` owned by `owner`, oldest first, staged
    /// transfers, creations and removals included.
    pub async fn holdings(
        &self,
        owner: &ParticipantId,
        kind: CommodityKind,
    ) -> Result<Vec<Commodity>> {
        let mut held: BTreeMap<RecordId, Commodity> = self
            .index
            .holdings(owner, kind)
            .await?
            .into_iter()
            .map(|c| (c.id(), c))
            .collect();

        for (id, staged) in &self.staged.commodities {
            match staged {
                Some(c) if c.is_owned_by(owner, kind) => {
                    held.insert(*id, c.clone());
                }
                _ => {
                    held.remove(id);
                }
            }
        }
        Ok(held.into_values().collect())
    }

    pub async fn product_named(
        &self,
        owner: &ParticipantId,
        name: &str,
    ) -> Result<Option<Product>> {
        let staged = self
            .staged
            .commodities
            .values()
            .flatten()
            .filter_map(Commodity::as_product)
            .find(|p| &p.owner == owner && p.name == name);
        if let Some(product) = staged {
            return Ok(Some(product.clone()));
        }
        self.index.product_named(owner, name).await
    }

    pub async fn stock_of(&self, product: RecordId) -> Result<Option<Stock>> {
        if let Some(stock) = self.staged.stocks.values().find(|s| s.product == product) {
            return Ok(Some(stock.clone()));
        }
        self.index.stock_of(product).await
    }

    pub fn put_participant(&mut self, participant: Participant) {
        self.staged
            .participants
            .insert(participant.id.clone(), participant);
    }

    pub fn put_commodity(&mut self, commodity: Commodity) {
        self.staged
            .commodities
            .insert(commodity.id(), Some(commodity));
    }

    pub fn remove_commodity(&mut self, id: RecordId) {
        self.staged.commodities.insert(id, None);
    }

    pub fn put_stock(&mut self, stock: Stock) {
        self.staged.stocks.insert(stock.id, stock);
    }

    pub fn append_order(&mut self, order: Order) {
        self.staged.orders.push(order);
    }

    /// Hands every staged write to the store in one atomic commit.
    pub async fn commit(self) -> Result<()> {
        if self.staged.is_empty() {
            return Ok(());
        }
        tracing::debug!(records = self.staged.len(), "committing unit of work");
        self.store.commit(self.staged).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commodity::{ProductType, Seed};
    use crate::domain::money::Money;
    use crate::infrastructure::in_memory::InMemoryLedger;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn seed(id: u64, owner: &str) -> Commodity {
        Commodity::Seed(Seed {
            id: RecordId(id),
            price: Money::new(dec!(10)),
            expires_at: Utc::now(),
            owner: owner.into(),
        })
    }

    async fn ledger_with_seeds(owner: &str, ids: &[u64]) -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        let mut changes = Changeset::default();
        for id in ids {
            changes.commodities.insert(RecordId(*id), Some(seed(*id, owner)));
        }
        ledger.commit(changes).await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_holdings_reflect_staged_transfers_and_removals() {
        let ledger = ledger_with_seeds("t1", &[1, 2, 3]).await;
        let mut uow = UnitOfWork::new(&ledger, &ledger);

        let mut moved = seed(3, "t1");
        moved.set_owner("f1".into());
        uow.put_commodity(moved);
        uow.remove_commodity(RecordId(1));
        uow.put_commodity(seed(4, "t1"));

        let trader: Vec<RecordId> = uow
            .holdings(&"t1".into(), CommodityKind::Seed)
            .await
            .unwrap()
            .iter()
            .map(Commodity::id)
            .collect();
        assert_eq!(trader, vec![RecordId(2), RecordId(4)]);

        let farmer = uow
            .holdings(&"f1".into(), CommodityKind::Seed)
            .await
            .unwrap();
        assert_eq!(farmer.len(), 1);
        assert_eq!(farmer[0].id(), RecordId(3));
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_writes_nothing() {
        let ledger = ledger_with_seeds("t1", &[1]).await;
        {
            let mut uow = UnitOfWork::new(&ledger, &ledger);
            uow.remove_commodity(RecordId(1));
        }
        assert!(ledger.commodity(RecordId(1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_staged_product_and_stock_are_visible() {
        let ledger = InMemoryLedger::new();
        let mut uow = UnitOfWork::new(&ledger, &ledger);
        let now = Utc::now();
        uow.put_commodity(Commodity::Product(Product {
            id: RecordId(10),
            name: "Salt - Sea".to_string(),
            kind: ProductType::Chocolate,
            price: Money::new(dec!(50)),
            issued_at: now,
            expires_at: now,
            owner: "fa1".into(),
        }));
        uow.put_stock(Stock {
            id: RecordId(11),
            owner: "fa1".into(),
            product: RecordId(10),
            quantity: 1,
        });

        let product = uow
            .product_named(&"fa1".into(), "Salt - Sea")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.id, RecordId(10));
        assert!(
            uow.product_named(&"m1".into(), "Salt - Sea")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(uow.stock_of(RecordId(10)).await.unwrap().unwrap().quantity, 1);

        uow.commit().await.unwrap();
        assert!(ledger.stock_of(RecordId(10)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_participant_role_check() {
        let ledger = InMemoryLedger::new();
        let mut uow = UnitOfWork::new(&ledger, &ledger);
        uow.put_participant(Participant::new("f1", Role::Farmer, Money::ZERO));

        let ok = uow.participant_as(&"f1".into(), Role::Farmer).await.unwrap();
        assert!(ok.is_ok());

        let wrong = uow.participant_as(&"f1".into(), Role::Trader).await.unwrap();
        assert!(matches!(wrong, Err(Rejection::RoleMismatch { .. })));

        let missing = uow.participant_as(&"x".into(), Role::Trader).await.unwrap();
        assert_eq!(missing, Err(Rejection::UnknownParticipant("x".into())));
    }
}
