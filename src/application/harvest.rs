use super::engine::PipelineEngine;
use crate::domain::commodity::{Bean, Commodity, CommodityKind};
use crate::domain::outcome::{Outcome, Receipt};
use crate::domain::participant::{ParticipantId, Profile, Role};
use crate::error::Result;
use tracing::debug;

impl PipelineEngine {
    /// Turns every seed a farmer holds into a bean of the same price.
    pub async fn harvest(&self, farmer: &ParticipantId) -> Result<Outcome> {
        let mut uow = self.unit_of_work();
        let mut farmer = accept!(uow.participant_as(farmer, Role::Farmer).await?);

        let seeds = uow.holdings(&farmer.id, CommodityKind::Seed).await?;
        let now = self.clock.now();

        let mut beans = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let bean = Bean {
                id: self.ids.next_id(),
                price: seed.price(),
                harvested_at: now,
                owner: seed.owner().clone(),
            };
            debug!(seed = %seed.id(), bean = %bean.id, "harvested");
            beans.push(bean.id);
            uow.put_commodity(Commodity::Bean(bean));
            uow.remove_commodity(seed.id());
        }

        // Overwritten with this harvest's count, not accumulated.
        farmer.profile = Profile::Farmer {
            harvesters_count: u32::try_from(beans.len()).unwrap_or(u32::MAX),
        };
        uow.put_participant(farmer);
        uow.commit().await?;

        Ok(Outcome::Applied(Receipt::Harvested { beans }))
    }
}
