//! CLI command implementations.

mod display;

pub mod analyze;
pub mod inspect;

use clap::ValueEnum;
use impact_engine::domain::{ChangeType, EntityRef};

/// Change type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTypeArg {
    /// Purely additive change
    Additive,
    /// Backwards-compatible modification
    Modification,
    /// Backwards-incompatible change
    Breaking,
    /// Entity removed
    Removal,
}

impl From<ChangeTypeArg> for ChangeType {
    fn from(arg: ChangeTypeArg) -> Self {
        match arg {
            ChangeTypeArg::Additive => Self::Additive,
            ChangeTypeArg::Modification => Self::Modification,
            ChangeTypeArg::Breaking => Self::Breaking,
            ChangeTypeArg::Removal => Self::Removal,
        }
    }
}

/// Parse a `type:id` entity reference for clap.
pub fn parse_entity_ref(s: &str) -> Result<EntityRef, String> {
    s.trim().parse().map_err(|e: impact_engine::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_entity_ref_trims_and_validates() {
        let entity = parse_entity_ref("  service:billing ").unwrap();
        assert_eq!(entity, EntityRef::new("service", "billing"));

        let err = parse_entity_ref("billing").unwrap_err();
        assert!(err.contains("type:id"));
    }

    #[test]
    fn change_type_arg_maps_to_domain() {
        assert_eq!(ChangeType::from(ChangeTypeArg::Removal), ChangeType::Removal);
        assert_eq!(
            ChangeType::from(ChangeTypeArg::Modification),
            ChangeType::Modification
        );
    }
}
