use super::engine::PipelineEngine;
use crate::domain::catalog::sample_batch_size;
use crate::domain::commodity::{Commodity, Seed};
use crate::domain::outcome::{Outcome, Receipt};
use crate::domain::participant::{ParticipantId, Role};
use crate::error::Result;
use tracing::debug;

impl PipelineEngine {
    /// Issues a fresh batch of seeds to a trader.
    ///
    /// Seeds the trader already holds are kept.
    pub async fn generate_seeds(&self, trader: &ParticipantId) -> Result<Outcome> {
        let mut uow = self.unit_of_work();
        let trader = accept!(uow.participant_as(trader, Role::Trader).await?);

        let count = sample_batch_size(
            self.random.as_ref(),
            self.config.min_seed_batch,
            self.config.max_seed_batch,
        );
        let now = self.clock.now();

        let mut seeds = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let seed = Seed {
                id: self.ids.next_id(),
                price: self.config.seed_unit_price,
                expires_at: now,
                owner: trader.id.clone(),
            };
            seeds.push(seed.id);
            uow.put_commodity(Commodity::Seed(seed));
        }
        debug!(trader = %trader.id, count, "generated seed batch");

        uow.commit().await?;
        Ok(Outcome::Applied(Receipt::SeedsGenerated { seeds }))
    }
}
