//! Import policies and record lifecycle status

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Which reconciliation actions a record class allows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImportMode {
    /// Create, update and remove
    #[default]
    Full,
    CreateOnly,
    UpdateOnly,
    CreateOrUpdateOnly,
    RemoveOnly,
}

impl ImportMode {
    pub const ALL: [ImportMode; 5] = [
        ImportMode::Full,
        ImportMode::CreateOnly,
        ImportMode::UpdateOnly,
        ImportMode::CreateOrUpdateOnly,
        ImportMode::RemoveOnly,
    ];

    pub fn allows_create(&self) -> bool {
        matches!(
            self,
            ImportMode::Full | ImportMode::CreateOnly | ImportMode::CreateOrUpdateOnly
        )
    }

    pub fn allows_update(&self) -> bool {
        matches!(
            self,
            ImportMode::Full | ImportMode::UpdateOnly | ImportMode::CreateOrUpdateOnly
        )
    }

    pub fn allows_remove(&self) -> bool {
        matches!(self, ImportMode::Full | ImportMode::RemoveOnly)
    }
}

impl FromStr for ImportMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "full" => Ok(ImportMode::Full),
            "create_only" => Ok(ImportMode::CreateOnly),
            "update_only" => Ok(ImportMode::UpdateOnly),
            "create_or_update_only" => Ok(ImportMode::CreateOrUpdateOnly),
            "remove_only" => Ok(ImportMode::RemoveOnly),
            _ => Err(Error::InvalidMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Full => write!(f, "full"),
            ImportMode::CreateOnly => write!(f, "create_only"),
            ImportMode::UpdateOnly => write!(f, "update_only"),
            ImportMode::CreateOrUpdateOnly => write!(f, "create_or_update_only"),
            ImportMode::RemoveOnly => write!(f, "remove_only"),
        }
    }
}

/// Lifecycle flag reported by the inventory for an element record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalStatus {
    Operational,
    NonOperational,
}

impl ExternalStatus {
    /// Derive the status from the evaluated status field.
    ///
    /// Records without a status value are treated as operational.
    pub fn from_value(value: Option<&str>, operational_value: &str) -> Self {
        match value {
            None | Some("") => ExternalStatus::Operational,
            Some(v) if v == operational_value => ExternalStatus::Operational,
            Some(_) => ExternalStatus::NonOperational,
        }
    }
}

impl fmt::Display for ExternalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalStatus::Operational => write!(f, "operational"),
            ExternalStatus::NonOperational => write!(f, "non-operational"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("full", ImportMode::Full)]
    #[case("Create_Only", ImportMode::CreateOnly)]
    #[case("update-only", ImportMode::UpdateOnly)]
    #[case(" create_or_update_only ", ImportMode::CreateOrUpdateOnly)]
    #[case("remove_only", ImportMode::RemoveOnly)]
    fn parse_modes(#[case] text: &str, #[case] expected: ImportMode) {
        assert_eq!(text.parse::<ImportMode>().unwrap(), expected);
    }

    #[test]
    fn display_round_trips() {
        for mode in ImportMode::ALL {
            assert_eq!(mode.to_string().parse::<ImportMode>().unwrap(), mode);
        }
        assert!(matches!(
            "sometimes".parse::<ImportMode>(),
            Err(Error::InvalidMode { .. })
        ));
    }

    #[rstest]
    #[case(None, ExternalStatus::Operational)]
    #[case(Some(""), ExternalStatus::Operational)]
    #[case(Some("1"), ExternalStatus::Operational)]
    #[case(Some("2"), ExternalStatus::NonOperational)]
    #[case(Some("retired"), ExternalStatus::NonOperational)]
    fn status_from_value(#[case] value: Option<&str>, #[case] expected: ExternalStatus) {
        assert_eq!(ExternalStatus::from_value(value, "1"), expected);
    }
}
