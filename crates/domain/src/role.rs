use std::str::FromStr;

use serde::{Deserialize, Serialize};
use terreno_core::AppError;

/// Identity categories a dashboard session may act as.
///
/// A session holds exactly one role at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Top authority across the whole organization.
    SuperAdmin,
    /// Platform administrator.
    Admin,
    /// Department-level leader.
    LiderDepartamental,
    /// Municipality-level leader.
    LiderMunicipal,
    /// Zone-level leader.
    LiderZona,
    /// Community-level leader.
    LiderComunal,
    /// Base-level data entry operator.
    Digitador,
    /// Citizen end user.
    Ciudadano,
}

impl Role {
    /// Returns a stable transport value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::LiderDepartamental => "lider_departamental",
            Self::LiderMunicipal => "lider_municipal",
            Self::LiderZona => "lider_zona",
            Self::LiderComunal => "lider_comunal",
            Self::Digitador => "digitador",
            Self::Ciudadano => "ciudadano",
        }
    }

    /// Returns the human-readable label shown next to hierarchy nodes.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super administrador",
            Self::Admin => "Administrador",
            Self::LiderDepartamental => "Líder departamental",
            Self::LiderMunicipal => "Líder municipal",
            Self::LiderZona => "Líder de zona",
            Self::LiderComunal => "Líder comunal",
            Self::Digitador => "Digitador",
            Self::Ciudadano => "Ciudadano",
        }
    }

    /// Returns the regional leadership tier, `1` being the highest.
    ///
    /// Roles outside the regional leadership ladder return `None`.
    #[must_use]
    pub fn leadership_tier(&self) -> Option<u8> {
        match self {
            Self::LiderDepartamental => Some(1),
            Self::LiderMunicipal => Some(2),
            Self::LiderZona => Some(3),
            Self::LiderComunal => Some(4),
            Self::SuperAdmin | Self::Admin | Self::Digitador | Self::Ciudadano => None,
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::SuperAdmin,
            Role::Admin,
            Role::LiderDepartamental,
            Role::LiderMunicipal,
            Role::LiderZona,
            Role::LiderComunal,
            Role::Digitador,
            Role::Ciudadano,
        ];

        ALL
    }

    /// Parses a transport value into a role.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown role value '{value}'")))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
