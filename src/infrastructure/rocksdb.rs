use crate::domain::commodity::{Commodity, CommodityKind, Order, Product, RecordId, Stock};
use crate::domain::participant::{Participant, ParticipantId};
use crate::domain::ports::{CatalogIndex, Changeset, RecordStore};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for participant records.
pub const CF_PARTICIPANTS: &str = "participants";
/// Column Family for seeds, beans and products.
pub const CF_COMMODITIES: &str = "commodities";
/// Column Family for stock records.
pub const CF_STOCKS: &str = "stocks";
/// Column Family for retail orders.
pub const CF_ORDERS: &str = "orders";

/// A persistent ledger implementation using RocksDB.
///
/// Each record type lives in its own Column Family, keyed by big-endian
/// record id (participant id bytes for participants) so iteration follows
/// creation order. A changeset is written as one `WriteBatch`.
///
/// The catalog index queries scan their column family; there are no
/// secondary indexes.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
/// Commits are serialized through `commit_lock` so the duplicate-order
/// check and the batch write happen as one step.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// any missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_PARTICIPANTS, CF_COMMODITIES, CF_STOCKS, CF_ORDERS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PipelineError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Last key of a column family keyed by big-endian record id.
    fn last_record_id(&self, cf_name: &str) -> Result<Option<RecordId>> {
        let cf = self.cf(cf_name)?;
        let Some(item) = self.db.iterator_cf(cf, IteratorMode::End).next() else {
            return Ok(None);
        };
        let (key, _value) = item?;
        let bytes: [u8; 8] = key[..].try_into().map_err(|_| {
            PipelineError::StoreError(format!("malformed record key in {cf_name}"))
        })?;
        Ok(Some(RecordId(u64::from_be_bytes(bytes))))
    }

    /// Decodes every value of a column family that passes `keep`.
    fn scan<T, F>(&self, cf_name: &str, mut keep: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: FnMut(&T) -> bool,
    {
        let cf = self.cf(cf_name)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| {
                PipelineError::InternalError(Box::new(std::io::Error::other(format!(
                    "RocksDB iteration error: {}",
                    e
                ))))
            })?;
            let record: T = decode(&value)?;
            if keep(&record) {
                out.push(record);
            }
        }
        Ok(out)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        PipelineError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        PipelineError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl RecordStore for RocksDBStore {
    async fn participant(&self, id: &ParticipantId) -> Result<Option<Participant>> {
        self.get_json(CF_PARTICIPANTS, id.as_str().as_bytes())
    }

    async fn participants(&self) -> Result<Vec<Participant>> {
        self.scan(CF_PARTICIPANTS, |_: &Participant| true)
    }

    async fn commodity(&self, id: RecordId) -> Result<Option<Commodity>> {
        self.get_json(CF_COMMODITIES, &id.to_be_bytes())
    }

    async fn max_record_id(&self) -> Result<Option<RecordId>> {
        let mut max = None;
        for cf_name in [CF_COMMODITIES, CF_STOCKS, CF_ORDERS] {
            max = max.max(self.last_record_id(cf_name)?);
        }
        Ok(max)
    }

    async fn commit(&self, changes: Changeset) -> Result<()> {
        let _guard = self.commit_lock.lock().await;
        let cf_orders = self.cf(CF_ORDERS)?;
        for order in &changes.orders {
            if self.db.get_pinned_cf(cf_orders, order.id.to_be_bytes())?.is_some() {
                return Err(PipelineError::StoreError(format!(
                    "order {} already exists",
                    order.id
                )));
            }
        }

        let cf_participants = self.cf(CF_PARTICIPANTS)?;
        let cf_commodities = self.cf(CF_COMMODITIES)?;
        let cf_stocks = self.cf(CF_STOCKS)?;

        let mut batch = WriteBatch::default();
        for (id, participant) in &changes.participants {
            batch.put_cf(cf_participants, id.as_str().as_bytes(), encode(participant)?);
        }
        for (id, commodity) in &changes.commodities {
            match commodity {
                Some(commodity) => batch.put_cf(cf_commodities, id.to_be_bytes(), encode(commodity)?),
                None => batch.delete_cf(cf_commodities, id.to_be_bytes()),
            }
        }
        for (id, stock) in &changes.stocks {
            batch.put_cf(cf_stocks, id.to_be_bytes(), encode(stock)?);
        }
        for order in &changes.orders {
            batch.put_cf(cf_orders, order.id.to_be_bytes(), encode(order)?);
        }

        self.db.write(batch)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogIndex for RocksDBStore {
    async fn holdings(
        &self,
        owner: &ParticipantId,
        kind: CommodityKind,
    ) -> Result<Vec<Commodity>> {
        self.scan(CF_COMMODITIES, |c: &Commodity| c.is_owned_by(owner, kind))
    }

    async fn product_named(&self, owner: &ParticipantId, name: &str) -> Result<Option<Product>> {
        let products = self.scan(CF_COMMODITIES, |c: &Commodity| {
            c.as_product()
                .is_some_and(|p| &p.owner == owner && p.name == name)
        })?;
        Ok(products.into_iter().find_map(|c| match c {
            Commodity::Product(p) => Some(p),
            _ => None,
        }))
    }

    async fn stock_of(&self, product: RecordId) -> Result<Option<Stock>> {
        let stocks = self.scan(CF_STOCKS, |s: &Stock| s.product == product)?;
        Ok(stocks.into_iter().next())
    }

    async fn orders_of(&self, customer: &ParticipantId) -> Result<Vec<Order>> {
        self.scan(CF_ORDERS, |o: &Order| &o.customer == customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commodity::Seed;
    use crate::domain::money::Money;
    use crate::domain::participant::Role;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in [CF_PARTICIPANTS, CF_COMMODITIES, CF_STOCKS, CF_ORDERS] {
            assert!(store.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_rocksdb_commit_and_query() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let trader = Participant::new("t1", Role::Trader, Money::new(dec!(100.0)));
        let seed = Commodity::Seed(Seed {
            id: RecordId(1),
            price: Money::new(dec!(10)),
            expires_at: Utc::now(),
            owner: "t1".into(),
        });

        let mut changes = Changeset::default();
        changes.participants.insert(trader.id.clone(), trader.clone());
        changes.commodities.insert(RecordId(1), Some(seed.clone()));
        store.commit(changes).await.unwrap();

        assert_eq!(store.participant(&"t1".into()).await.unwrap(), Some(trader));
        assert_eq!(store.commodity(RecordId(1)).await.unwrap(), Some(seed));
        let held = store
            .holdings(&"t1".into(), CommodityKind::Seed)
            .await
            .unwrap();
        assert_eq!(held.len(), 1);

        let mut changes = Changeset::default();
        changes.commodities.insert(RecordId(1), None);
        store.commit(changes).await.unwrap();
        assert!(store.commodity(RecordId(1)).await.unwrap().is_none());
    }

    fn order(id: u64) -> Order {
        Order {
            id: RecordId(id),
            issued_at: Utc::now(),
            total_price: Money::new(dec!(5)),
            lines: Vec::new(),
            market: "m1".into(),
            customer: "c1".into(),
        }
    }

    #[tokio::test]
    async fn test_rocksdb_max_record_id_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            assert_eq!(store.max_record_id().await.unwrap(), None);

            let mut changes = Changeset::default();
            changes.commodities.insert(
                RecordId(300),
                Some(Commodity::Seed(Seed {
                    id: RecordId(300),
                    price: Money::new(dec!(10)),
                    expires_at: Utc::now(),
                    owner: "t1".into(),
                })),
            );
            changes.orders.push(order(7));
            store.commit(changes).await.unwrap();
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        assert_eq!(store.max_record_id().await.unwrap(), Some(RecordId(300)));
    }

    #[tokio::test]
    async fn test_rocksdb_concurrent_duplicate_orders_commit_once() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut changes = Changeset::default();
                changes.orders.push(order(42));
                store.commit(changes).await.is_ok()
            }));
        }
        let mut committed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                committed += 1;
            }
        }

        assert_eq!(committed, 1);
        assert_eq!(store.orders_of(&"c1".into()).await.unwrap().len(), 1);
    }
}
