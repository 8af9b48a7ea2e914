use super::unit_of_work::UnitOfWork;
use crate::config::EngineConfig;
use crate::domain::commodity::CommodityKind;
use crate::domain::money::Money;
use crate::domain::outcome::Outcome;
use crate::domain::participant::{Participant, ParticipantId, Role};
use crate::domain::ports::{CatalogIndexBox, Changeset, RecordStoreBox};
use crate::domain::request::Request;
use crate::domain::sources::{
    Clock, IdAllocator, MonotonicIds, RandomSource, StdRandom, SystemClock,
};
use crate::error::Result;
use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// The main entry point for running the supply chain.
///
/// `PipelineEngine` handles one transaction request at a time per call. It
/// owns the storage ports and the capabilities it draws on (randomness,
/// time, id allocation) and keeps no domain state of its own: everything
/// lives in the record store.
pub struct PipelineEngine {
    pub(crate) store: RecordStoreBox,
    pub(crate) index: CatalogIndexBox,
    pub(crate) random: Box<dyn RandomSource>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) ids: Box<dyn IdAllocator>,
    pub(crate) config: EngineConfig,
}

/// Per-participant view of the ledger, as reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantSummary {
    pub participant: ParticipantId,
    pub role: Role,
    pub balance: Money,
    pub seeds: usize,
    pub beans: usize,
    pub products: usize,
    pub orders: usize,
    pub harvesters: Option<u32>,
}

impl PipelineEngine {
    /// Creates a new `PipelineEngine` with the default configuration, an
    /// entropy-seeded random source, the system clock and wall-clock seeded
    /// record ids.
    ///
    /// The ids do not look at what `store` already holds; use
    /// [`PipelineEngine::open`] over a store that may have records.
    ///
    /// # Arguments
    ///
    /// * `store` - The record store all writes are committed to.
    /// * `index` - The catalog index over the same records.
    pub fn new(store: RecordStoreBox, index: CatalogIndexBox) -> Self {
        Self {
            store,
            index,
            random: Box::new(StdRandom::from_entropy()),
            clock: Box::new(SystemClock),
            ids: Box::new(MonotonicIds::new()),
            config: EngineConfig::default(),
        }
    }

    /// Like [`PipelineEngine::new`], but record ids continue after the
    /// highest id `store` already holds, so records from an earlier run are
    /// never overwritten.
    pub async fn open(store: RecordStoreBox, index: CatalogIndexBox) -> Result<Self> {
        let stored_max = store.max_record_id().await?;
        Ok(Self::new(store, index).with_ids(MonotonicIds::resuming_after(stored_max)))
    }

    /// Replaces the configuration. A configured `rng_seed` also reseeds the
    /// random source.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        if let Some(seed) = config.rng_seed {
            self.random = Box::new(StdRandom::seeded(seed));
        }
        self.config = config;
        self
    }

    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_ids(mut self, ids: impl IdAllocator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stores a participant record, replacing any record with the same id.
    pub async fn register_participant(&self, participant: Participant) -> Result<()> {
        let mut changes = Changeset::default();
        changes
            .participants
            .insert(participant.id.clone(), participant);
        self.store.commit(changes).await
    }

    pub async fn participant(&self, id: &ParticipantId) -> Result<Option<Participant>> {
        self.store.participant(id).await
    }

    /// Runs one request through its handler.
    ///
    /// Domain rule violations come back as [`Outcome::Rejected`] with
    /// nothing written. A store failure comes back as `Err`; the request's
    /// staged writes are discarded, nothing is retried.
    #[tracing::instrument(skip(self, request), fields(request = request.name()))]
    pub async fn process_request(&self, request: Request) -> Result<Outcome> {
        let outcome = match &request {
            Request::GenerateSeeds { trader } => self.generate_seeds(trader).await?,
            Request::TradeSeed {
                trader,
                farmer,
                quantity,
            } => self.trade_seed(trader, farmer, *quantity).await?,
            Request::Harvest { farmer } => self.harvest(farmer).await?,
            Request::TradeBean {
                farmer,
                factory,
                quantity,
            } => self.trade_bean(farmer, factory, *quantity).await?,
            Request::Transformation { factory } => self.transform(factory).await?,
            Request::TradeProduct {
                factory,
                market,
                records,
            } => self.trade_product(factory, market, records).await?,
            Request::ProcessOrder {
                market,
                customer,
                records,
            } => self.process_order(market, customer, records).await?,
        };

        match &outcome {
            Outcome::Applied(receipt) => info!(?receipt, "request committed"),
            Outcome::Rejected(rejection) => warn!(%rejection, "request rejected"),
        }
        Ok(outcome)
    }

    /// Current balances and holdings of every participant, ordered by id.
    pub async fn snapshot(&self) -> Result<Vec<ParticipantSummary>> {
        let mut summaries = Vec::new();
        for participant in self.store.participants().await? {
            let id = &participant.id;
            summaries.push(ParticipantSummary {
                seeds: self.index.holdings(id, CommodityKind::Seed).await?.len(),
                beans: self.index.holdings(id, CommodityKind::Bean).await?.len(),
                products: self.index.holdings(id, CommodityKind::Product).await?.len(),
                orders: self.index.orders_of(id).await?.len(),
                harvesters: participant.harvesters_count(),
                role: participant.role(),
                balance: participant.balance,
                participant: participant.id,
            });
        }
        Ok(summaries)
    }

    pub(crate) fn unit_of_work(&self) -> UnitOfWork<'_> {
        UnitOfWork::new(self.store.as_ref(), self.index.as_ref())
    }

    /// Expiry of a product issued at `issued_at`.
    pub(crate) fn expiry_from(&self, issued_at: DateTime<Utc>) -> DateTime<Utc> {
        issued_at
            .checked_add_months(Months::new(self.config.shelf_life_months))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
