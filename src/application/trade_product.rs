use super::engine::PipelineEngine;
use super::inventory::{reserve_lines, take_from_stock};
use crate::domain::commodity::{LineItem, Product};
use crate::domain::outcome::{Outcome, Receipt, Rejection};
use crate::domain::participant::{ParticipantId, Role};
use crate::error::Result;
use tracing::debug;

impl PipelineEngine {
    /// Wholesale: a factory sells product lines to a market.
    ///
    /// Either every line is served or none is. The market lists products it
    /// has not carried before at the factory price plus the wholesale markup,
    /// and restocks the ones it already carries.
    pub async fn trade_product(
        &self,
        factory: &ParticipantId,
        market: &ParticipantId,
        records: &[LineItem],
    ) -> Result<Outcome> {
        let mut uow = self.unit_of_work();
        let mut factory = accept!(uow.participant_as(factory, Role::Factory).await?);
        let mut market = accept!(uow.participant_as(market, Role::Market).await?);

        let reservation = accept!(reserve_lines(&uow, &factory.id, records).await?);
        let total_price = reservation.total_price;
        if total_price > market.balance {
            return Ok(Rejection::InsufficientFunds {
                buyer: market.id.clone(),
                required: total_price,
                available: market.balance,
            }
            .into());
        }

        let mut created = Vec::new();
        for line in &reservation.lines {
            let source = &line.product;
            match uow.product_named(&market.id, &source.name).await? {
                Some(listed) => self.add_to_stock(&mut uow, &listed, line.quantity).await?,
                None => {
                    let listed = Product {
                        id: self.ids.next_id(),
                        name: source.name.clone(),
                        kind: source.kind,
                        price: source.price.scaled(self.config.wholesale_markup),
                        issued_at: source.issued_at,
                        expires_at: source.expires_at,
                        owner: market.id.clone(),
                    };
                    created.push(self.list_product(&mut uow, listed, line.quantity));
                }
            }
            take_from_stock(&mut uow, source, line.quantity).await?;
            debug!(product_name = %source.name, units = line.quantity, "wholesaled");
        }

        market.pay(&mut factory, total_price);
        uow.put_participant(factory);
        uow.put_participant(market);
        uow.commit().await?;

        Ok(Outcome::Applied(Receipt::ProductsTraded {
            created,
            total_price,
        }))
    }
}
