pub mod conditions;
pub mod loader;
pub mod profile;
pub mod schema;

pub use conditions::{ConditionMap, ServiceCodePolicy};
pub use loader::{load_config, load_config_from_str, validate_config};
pub use profile::Profile;
pub use schema::{
    BusinessUnit, Callback, Config, FieldSpec, FlagPositions, MappingRule, Trim,
};
