use super::engine::PipelineEngine;
use crate::domain::catalog::{sample_markup_factor, sample_product_name, sample_product_type};
use crate::domain::commodity::{CommodityKind, Product};
use crate::domain::outcome::{Outcome, Receipt};
use crate::domain::participant::{ParticipantId, Role};
use crate::error::Result;
use tracing::debug;

impl PipelineEngine {
    /// Consumes every bean a factory holds, turning each into one unit of a
    /// randomly drawn catalog product.
    ///
    /// A factory owns at most one product per name: a bean whose drawn name
    /// the factory already makes only tops up that product's stock.
    pub async fn transform(&self, factory: &ParticipantId) -> Result<Outcome> {
        let mut uow = self.unit_of_work();
        let factory = accept!(uow.participant_as(factory, Role::Factory).await?);

        let beans = uow.holdings(&factory.id, CommodityKind::Bean).await?;
        let now = self.clock.now();
        let mut created = Vec::new();
        let mut restocked = 0;

        for bean in beans {
            let name = sample_product_name(self.random.as_ref());
            match uow.product_named(&factory.id, name).await? {
                Some(product) => {
                    debug!(
                        bean = %bean.id(),
                        product = %product.id,
                        product_name = name,
                        "restocking"
                    );
                    self.add_to_stock(&mut uow, &product, 1).await?;
                    restocked += 1;
                }
                None => {
                    let kind = sample_product_type(self.random.as_ref());
                    let factor =
                        sample_markup_factor(self.random.as_ref(), self.config.max_markup_factor);
                    let product = Product {
                        id: self.ids.next_id(),
                        name: name.to_string(),
                        kind,
                        price: bean.price().times(u64::from(factor)),
                        issued_at: now,
                        expires_at: self.expiry_from(now),
                        owner: factory.id.clone(),
                    };
                    debug!(
                        bean = %bean.id(),
                        product = %product.id,
                        product_name = name,
                        factor,
                        "new product"
                    );
                    created.push(self.list_product(&mut uow, product, 1));
                }
            }
            uow.remove_commodity(bean.id());
        }

        uow.commit().await?;
        Ok(Outcome::Applied(Receipt::Transformed { created, restocked }))
    }
}
