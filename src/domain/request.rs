use super::commodity::LineItem;
use super::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// A transaction request handled by the pipeline engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    GenerateSeeds {
        trader: ParticipantId,
    },
    TradeSeed {
        trader: ParticipantId,
        farmer: ParticipantId,
        quantity: i64,
    },
    Harvest {
        farmer: ParticipantId,
    },
    TradeBean {
        farmer: ParticipantId,
        factory: ParticipantId,
        quantity: i64,
    },
    Transformation {
        factory: ParticipantId,
    },
    TradeProduct {
        factory: ParticipantId,
        market: ParticipantId,
        records: Vec<LineItem>,
    },
    ProcessOrder {
        market: ParticipantId,
        customer: ParticipantId,
        records: Vec<LineItem>,
    },
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::GenerateSeeds { .. } => "generate_seeds",
            Request::TradeSeed { .. } => "trade_seed",
            Request::Harvest { .. } => "harvest",
            Request::TradeBean { .. } => "trade_bean",
            Request::Transformation { .. } => "transformation",
            Request::TradeProduct { .. } => "trade_product",
            Request::ProcessOrder { .. } => "process_order",
        }
    }
}
