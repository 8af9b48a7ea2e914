//! Domain model: participants, commodities, requests and the storage ports
//! the engine is written against.

pub mod catalog;
pub mod commodity;
pub mod money;
pub mod outcome;
pub mod participant;
pub mod ports;
pub mod request;
pub mod sources;
