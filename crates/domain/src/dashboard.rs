use std::str::FromStr;

use serde::{Deserialize, Serialize};
use terreno_core::AppError;

/// Transport value used by configuration documents for sections without a widget gate.
pub const UNGATED_WIDGET_KEY: &str = "none";

/// Renderable dashboard sections.
///
/// Every section carries an entry in the visibility table returned by
/// [`DashboardSection::requirement`]; the match there is exhaustive, so a new
/// variant cannot ship without its permission and widget keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardSection {
    /// Registered people totals.
    People,
    /// Leader totals.
    Leaders,
    /// Citizen report tracker.
    CitizenReports,
    /// Upcoming events.
    Events,
    /// General statistics charts.
    Statistics,
    /// Organizational hierarchy chart.
    NetworkStructure,
    /// Current user's profile card.
    Profile,
}

/// Widget gating requirement of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetGate {
    /// The section renders without a widget entry.
    Ungated,
    /// The section requires this widget key to be enabled.
    Widget(&'static str),
}

impl WidgetGate {
    /// Returns the transport key, `"none"` for ungated sections.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ungated => UNGATED_WIDGET_KEY,
            Self::Widget(key) => key,
        }
    }
}

/// Join row between the feature permission document and the widget document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionRequirement {
    /// Feature key that must be present in the role's permission set.
    pub permission_key: &'static str,
    /// Widget key that must be enabled for the role.
    pub widget: WidgetGate,
}

impl DashboardSection {
    /// Returns a stable transport value for this section.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::People => "personas",
            Self::Leaders => "lideres",
            Self::CitizenReports => "reportes",
            Self::Events => "eventos",
            Self::Statistics => "estadisticas",
            Self::NetworkStructure => "estructura-red",
            Self::Profile => "perfil",
        }
    }

    /// Returns the permission and widget keys this section requires.
    #[must_use]
    pub fn requirement(&self) -> SectionRequirement {
        let (permission_key, widget) = match self {
            Self::People => ("personas", WidgetGate::Widget("total-personas")),
            Self::Leaders => ("lideres", WidgetGate::Widget("total-lideres")),
            Self::CitizenReports => ("reportes", WidgetGate::Widget("reportes-ciudadanos")),
            Self::Events => ("eventos", WidgetGate::Widget("proximos-eventos")),
            Self::Statistics => ("estadisticas", WidgetGate::Widget("estadisticas-generales")),
            Self::NetworkStructure => ("estructura-red", WidgetGate::Widget("estructura-red")),
            Self::Profile => ("perfil", WidgetGate::Ungated),
        };

        SectionRequirement {
            permission_key,
            widget,
        }
    }

    /// Returns all sections in dashboard rendering order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[DashboardSection] = &[
            DashboardSection::Profile,
            DashboardSection::People,
            DashboardSection::Leaders,
            DashboardSection::Statistics,
            DashboardSection::CitizenReports,
            DashboardSection::Events,
            DashboardSection::NetworkStructure,
        ];

        ALL
    }

    /// Parses a transport value into a section.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for DashboardSection {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|section| section.as_str() == value)
            .ok_or_else(|| {
                AppError::Validation(format!("unknown dashboard section '{value}'"))
            })
    }
}

impl std::fmt::Display for DashboardSection {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
