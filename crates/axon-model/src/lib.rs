mod domain;
pub use domain::{Env, KeyValue, SlotLabel, SpotRequest, Tag, template_prefix};
pub use domain::{MATRIX_ENV_VAR, SLOT_INDEX_WIDTH, SLOT_SEPARATOR, TEMPLATE_SEPARATOR};

mod error;
pub use error::{ModelError, ModelResult};

mod spec;
pub use spec::{BidKind, NodeTemplate, SpotConfig};

mod strategy;
pub use strategy::RetryStrategy;
