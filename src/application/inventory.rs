//! Stock bookkeeping shared by transformation, wholesale and retail.

use super::engine::PipelineEngine;
use super::unit_of_work::UnitOfWork;
use crate::domain::commodity::{Commodity, LineItem, Product, RecordId, Stock};
use crate::domain::money::Money;
use crate::domain::outcome::{LineFailure, LineProblem, Rejection};
use crate::domain::participant::ParticipantId;
use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use tracing::warn;

/// A request line that passed validation, with the product it draws on.
pub(crate) struct ReservedLine {
    pub product: Product,
    pub quantity: u64,
}

pub(crate) struct Reservation {
    pub lines: Vec<ReservedLine>,
    pub total_price: Money,
}

/// Validates every line of a multi-line request against `owner`'s stock.
///
/// All lines are checked before anything is decided, so the rejection lists
/// every failing line. Lines naming the same product draw on the same stock.
pub(crate) async fn reserve_lines(
    uow: &UnitOfWork<'_>,
    owner: &ParticipantId,
    records: &[LineItem],
) -> Result<std::result::Result<Reservation, Rejection>> {
    let mut failures = Vec::new();
    let mut lines = Vec::with_capacity(records.len());
    let mut claimed: HashMap<RecordId, u64> = HashMap::new();
    let mut total_price = Money::ZERO;

    for record in records {
        let fail = |problem| LineFailure {
            name: record.name.clone(),
            problem,
        };
        if record.quantity <= 0 {
            failures.push(fail(LineProblem::InvalidQuantity(record.quantity)));
            continue;
        }
        let requested = record.quantity.unsigned_abs();

        let Some(product) = uow.product_named(owner, &record.name).await? else {
            failures.push(fail(LineProblem::DoesNotExist));
            continue;
        };
        let in_stock = uow
            .stock_of(product.id)
            .await?
            .map_or(0, |stock| stock.quantity);
        let already = claimed.entry(product.id).or_default();
        let available = in_stock.saturating_sub(*already);
        if available < requested {
            failures.push(fail(LineProblem::InsufficientQuantity {
                requested,
                available,
            }));
            continue;
        }

        *already += requested;
        total_price += product.price.times(requested);
        lines.push(ReservedLine {
            product,
            quantity: requested,
        });
    }

    if !failures.is_empty() {
        return Ok(Err(Rejection::UnavailableLines(failures)));
    }
    if lines.is_empty() {
        return Ok(Err(Rejection::EmptyRequest));
    }
    Ok(Ok(Reservation { lines, total_price }))
}

/// Removes `quantity` units of `product` from its owner's stock.
pub(crate) async fn take_from_stock(
    uow: &mut UnitOfWork<'_>,
    product: &Product,
    quantity: u64,
) -> Result<()> {
    let mut stock = uow.stock_of(product.id).await?.ok_or_else(|| {
        PipelineError::StoreError(format!("stock for product {} not found", product.id))
    })?;
    stock.quantity = stock.quantity.checked_sub(quantity).ok_or_else(|| {
        PipelineError::StoreError(format!(
            "stock for product {} holds {} units, cannot take {}",
            product.id, stock.quantity, quantity
        ))
    })?;
    uow.put_stock(stock);
    Ok(())
}

impl PipelineEngine {
    /// Adds `quantity` units to the stock of an existing product.
    ///
    /// A product without a stock record gets one.
    pub(crate) async fn add_to_stock(
        &self,
        uow: &mut UnitOfWork<'_>,
        product: &Product,
        quantity: u64,
    ) -> Result<()> {
        let stock = match uow.stock_of(product.id).await? {
            Some(mut stock) => {
                stock.quantity += quantity;
                stock
            }
            None => {
                warn!(product = %product.id, owner = %product.owner, "product had no stock record");
                Stock {
                    id: self.ids.next_id(),
                    owner: product.owner.clone(),
                    product: product.id,
                    quantity,
                }
            }
        };
        uow.put_stock(stock);
        Ok(())
    }

    /// A new product record with a stock of `quantity`, both staged.
    pub(crate) fn list_product(
        &self,
        uow: &mut UnitOfWork<'_>,
        product: Product,
        quantity: u64,
    ) -> RecordId {
        let product_id = product.id;
        uow.put_stock(Stock {
            id: self.ids.next_id(),
            owner: product.owner.clone(),
            product: product_id,
            quantity,
        });
        uow.put_commodity(Commodity::Product(product));
        product_id
    }
}
