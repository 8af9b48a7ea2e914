use super::engine::PipelineEngine;
use crate::domain::commodity::CommodityKind;
use crate::domain::outcome::{Outcome, Receipt, Rejection};
use crate::domain::participant::{ParticipantId, Role};
use crate::error::Result;
use tracing::debug;

/// One side of a seed or bean trade.
struct Party<'a> {
    id: &'a ParticipantId,
    role: Role,
}

impl PipelineEngine {
    /// A trader sells `quantity` seeds to a farmer.
    pub async fn trade_seed(
        &self,
        trader: &ParticipantId,
        farmer: &ParticipantId,
        quantity: i64,
    ) -> Result<Outcome> {
        self.trade_raw(
            CommodityKind::Seed,
            Party {
                id: trader,
                role: Role::Trader,
            },
            Party {
                id: farmer,
                role: Role::Farmer,
            },
            quantity,
        )
        .await
    }

    /// A farmer sells `quantity` beans to a factory.
    pub async fn trade_bean(
        &self,
        farmer: &ParticipantId,
        factory: &ParticipantId,
        quantity: i64,
    ) -> Result<Outcome> {
        self.trade_raw(
            CommodityKind::Bean,
            Party {
                id: farmer,
                role: Role::Farmer,
            },
            Party {
                id: factory,
                role: Role::Factory,
            },
            quantity,
        )
        .await
    }

    /// Moves unprocessed goods (seeds or beans) from seller to buyer.
    ///
    /// The whole trade is billed at the unit price of the seller's oldest
    /// holding, while the units handed over are the newest ones. Holdings of
    /// one owner are expected to share a price; when they don't, the charge
    /// follows the oldest unit.
    async fn trade_raw(
        &self,
        kind: CommodityKind,
        seller: Party<'_>,
        buyer: Party<'_>,
        quantity: i64,
    ) -> Result<Outcome> {
        let mut uow = self.unit_of_work();
        let mut seller = accept!(uow.participant_as(seller.id, seller.role).await?);
        let mut buyer = accept!(uow.participant_as(buyer.id, buyer.role).await?);

        if quantity <= 0 {
            return Ok(Rejection::InvalidQuantity(quantity).into());
        }
        let requested = quantity.unsigned_abs();

        let mut held = uow.holdings(&seller.id, kind).await?;
        let insufficient = Rejection::InsufficientHoldings {
            seller: seller.id.clone(),
            kind,
            requested,
            held: held.len() as u64,
        };
        if requested > held.len() as u64 {
            return Ok(insufficient.into());
        }
        let Some(reference) = held.first() else {
            return Ok(insufficient.into());
        };

        let unit_price = reference.price();
        let total_price = unit_price.times(requested);
        if total_price > buyer.balance {
            return Ok(Rejection::InsufficientFunds {
                buyer: buyer.id.clone(),
                required: total_price,
                available: buyer.balance,
            }
            .into());
        }

        let sold = held.split_off(held.len() - requested as usize);
        let mut transferred = Vec::with_capacity(sold.len());
        for mut commodity in sold.into_iter().rev() {
            commodity.set_owner(buyer.id.clone());
            transferred.push(commodity.id());
            uow.put_commodity(commodity);
        }
        debug!(
            %kind,
            seller = %seller.id,
            buyer = %buyer.id,
            units = transferred.len(),
            "transferring ownership"
        );

        buyer.pay(&mut seller, total_price);
        uow.put_participant(seller);
        uow.put_participant(buyer);
        uow.commit().await?;

        Ok(Outcome::Applied(Receipt::Traded {
            kind,
            transferred,
            unit_price,
            total_price,
        }))
    }
}
