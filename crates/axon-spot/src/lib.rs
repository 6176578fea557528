//! Spot-market provisioning backend.
//!
//! Translates a [`axon_model::NodeTemplate`] with a spot section into one
//! batched market request, tags the resulting requests, creates and
//! registers node objects on a serialized executor, and hands the requests
//! to a fulfillment supervisor that later drives normal connection
//! handling.
mod error;
pub use error::SpotError;

mod client;
pub use client::SpotMarketClient;

mod request;
pub use request::{LaunchSpec, MarketRequest};

mod provider;
pub use provider::{FulfillmentSupervisor, SpotInstanceProvider, SpotNodeFactory};
