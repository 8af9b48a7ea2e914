use super::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a participant, as supplied by whoever registers it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Role tag of a participant in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Trader,
    Farmer,
    Factory,
    Market,
    Customer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Trader => "trader",
            Role::Farmer => "farmer",
            Role::Factory => "factory",
            Role::Market => "market",
            Role::Customer => "customer",
        };
        f.write_str(name)
    }
}

/// Role-specific participant data. Only farmers carry extra state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
    Trader,
    Farmer {
        /// Bean count of the most recent harvest (overwritten, not summed).
        harvesters_count: u32,
    },
    Factory,
    Market,
    Customer,
}

impl Profile {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Trader => Profile::Trader,
            Role::Farmer => Profile::Farmer {
                harvesters_count: 0,
            },
            Role::Factory => Profile::Factory,
            Role::Market => Profile::Market,
            Role::Customer => Profile::Customer,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Profile::Trader => Role::Trader,
            Profile::Farmer { .. } => Role::Farmer,
            Profile::Factory => Role::Factory,
            Profile::Market => Role::Market,
            Profile::Customer => Role::Customer,
        }
    }
}

/// An economic actor in the chain.
///
/// Holds identity, balance and role only. What a participant owns is always
/// read from the catalog index, never cached here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Signed: nothing floors it at zero, the handlers check funds instead.
    pub balance: Money,
    pub profile: Profile,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, role: Role, balance: Money) -> Self {
        Self {
            id: id.into(),
            balance,
            profile: Profile::for_role(role),
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn harvesters_count(&self) -> Option<u32> {
        match self.profile {
            Profile::Farmer { harvesters_count } => Some(harvesters_count),
            _ => None,
        }
    }

    /// Moves `amount` from `self` to `payee`.
    pub fn pay(&mut self, payee: &mut Participant, amount: Money) {
        self.balance -= amount;
        payee.balance += amount;
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
