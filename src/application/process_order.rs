use super::engine::PipelineEngine;
use super::inventory::{reserve_lines, take_from_stock};
use crate::domain::commodity::{LineItem, Order};
use crate::domain::outcome::{Outcome, Receipt, Rejection};
use crate::domain::participant::{ParticipantId, Role};
use crate::error::Result;

impl PipelineEngine {
    /// Retail: a customer buys product lines from a market.
    ///
    /// The customer receives an order record, not products. The market's
    /// stock goes down by each line's quantity.
    pub async fn process_order(
        &self,
        market: &ParticipantId,
        customer: &ParticipantId,
        records: &[LineItem],
    ) -> Result<Outcome> {
        let mut uow = self.unit_of_work();
        let mut market = accept!(uow.participant_as(market, Role::Market).await?);
        let mut customer = accept!(uow.participant_as(customer, Role::Customer).await?);

        let reservation = accept!(reserve_lines(&uow, &market.id, records).await?);
        let total_price = reservation.total_price;
        if total_price > customer.balance {
            return Ok(Rejection::InsufficientFunds {
                buyer: customer.id.clone(),
                required: total_price,
                available: customer.balance,
            }
            .into());
        }

        for line in &reservation.lines {
            take_from_stock(&mut uow, &line.product, line.quantity).await?;
        }

        let order = Order {
            id: self.ids.next_id(),
            issued_at: self.clock.now(),
            total_price,
            lines: records.to_vec(),
            market: market.id.clone(),
            customer: customer.id.clone(),
        };
        let order_id = order.id;
        uow.append_order(order);

        customer.pay(&mut market, total_price);
        uow.put_participant(market);
        uow.put_participant(customer);
        uow.commit().await?;

        Ok(Outcome::Applied(Receipt::OrderPlaced {
            order: order_id,
            total_price,
        }))
    }
}
