//! Test list definitions and profile resolution.

mod definition;
mod error;
mod resolve;
mod retrieval;

pub use definition::{Grouping, InstallTagOverride, ListDefinition, ListMetadata};
pub use error::ListError;
pub use resolve::{
    apply_macro_profiles, collapse_groupings, derive_profile, expand_exclusions, union_of,
    with_all_profile, without_repeats, ProfileTable, Resolver,
};
pub use retrieval::ResolvedLists;

use crate::config::Config;

/// Load the configured list definition and resolve it.
pub fn resolve_lists(config: &Config) -> Result<ResolvedLists, ListError> {
    let definition = ListDefinition::from_file(config.paths.lists_path())?;
    Resolver::from_config(config)?.resolve(definition)
}
