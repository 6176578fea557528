mod template;
pub use template::{BidKind, NodeTemplate, SpotConfig};
