use super::commodity::{CommodityKind, RecordId};
use super::money::Money;
use super::participant::{ParticipantId, Role};
use std::fmt;
use thiserror::Error;

/// Result of a request that reached the engine without a store failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied(Receipt),
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Outcome::Applied(receipt) => Some(receipt),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Rejected(rejection) => Some(rejection),
        }
    }
}

impl From<Rejection> for Outcome {
    fn from(rejection: Rejection) -> Self {
        Outcome::Rejected(rejection)
    }
}

/// What a committed request changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Receipt {
    SeedsGenerated {
        seeds: Vec<RecordId>,
    },
    Traded {
        kind: CommodityKind,
        transferred: Vec<RecordId>,
        unit_price: Money,
        total_price: Money,
    },
    Harvested {
        beans: Vec<RecordId>,
    },
    Transformed {
        created: Vec<RecordId>,
        restocked: u64,
    },
    ProductsTraded {
        created: Vec<RecordId>,
        total_price: Money,
    },
    OrderPlaced {
        order: RecordId,
        total_price: Money,
    },
}

/// A domain rule that stopped a request. Nothing was written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("participant {0} does not exist")]
    UnknownParticipant(ParticipantId),
    #[error("participant {participant} is a {actual}, expected a {expected}")]
    RoleMismatch {
        participant: ParticipantId,
        expected: Role,
        actual: Role,
    },
    #[error("wrong quantity {0}")]
    InvalidQuantity(i64),
    #[error("{seller} holds {held} {kind}(s), {requested} requested")]
    InsufficientHoldings {
        seller: ParticipantId,
        kind: CommodityKind,
        requested: u64,
        held: u64,
    },
    #[error("{buyer} does not have sufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        buyer: ParticipantId,
        required: Money,
        available: Money,
    },
    #[error("request has no lines to process")]
    EmptyRequest,
    #[error("{}", LineReport(.0))]
    UnavailableLines(Vec<LineFailure>),
}

/// Why one line of a multi-line request could not be served.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFailure {
    pub name: String,
    pub problem: LineProblem,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineProblem {
    InvalidQuantity(i64),
    DoesNotExist,
    InsufficientQuantity { requested: u64, available: u64 },
}

impl fmt::Display for LineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            LineProblem::InvalidQuantity(q) => {
                write!(f, "wrong quantity {q} for {{{}}}", self.name)
            }
            LineProblem::DoesNotExist => {
                write!(f, "product with name {{{}}} does not exist in stock", self.name)
            }
            LineProblem::InsufficientQuantity {
                requested,
                available,
            } => write!(
                f,
                "not enough {{{}}}: {requested} requested, {available} available",
                self.name
            ),
        }
    }
}

struct LineReport<'a>(&'a [LineFailure]);

impl fmt::Display for LineReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            failure.fmt(f)?;
        }
        Ok(())
    }
}
