mod constants;
pub use constants::{MATRIX_ENV_VAR, SLOT_INDEX_WIDTH, SLOT_SEPARATOR, TEMPLATE_SEPARATOR};

mod env;
pub use env::{Env, KeyValue};

mod label;
pub use label::{SlotLabel, template_prefix};

mod spot;
pub use spot::SpotRequest;

mod tag;
pub use tag::Tag;
