use super::{HierarchyNode, HierarchyTree, NetworkSummary};

/// Which totals a consumer wants to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregateSource {
    /// Totals re-derived from the tree.
    #[default]
    Derived,
    /// Totals sent by the upstream, falling back to derived ones when absent.
    Reported,
}

/// Where a reported total disagrees with the derived one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchScope {
    /// A single node, by identifier.
    Node(String),
    /// The network summary.
    Network,
}

/// One reported total that differs from its derived value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateMismatch {
    /// Node or network.
    pub scope: MismatchScope,
    /// Payload field name.
    pub field: &'static str,
    /// Value sent by the upstream.
    pub reported: u64,
    /// Value derived locally.
    pub derived: u64,
}

impl HierarchyNode {
    /// Returns the subtree people total from the requested source.
    #[must_use]
    pub fn person_total(&self, source: AggregateSource) -> u64 {
        match source {
            AggregateSource::Derived => self.total_person_count,
            AggregateSource::Reported => self
                .reported
                .total_personas
                .unwrap_or(self.total_person_count),
        }
    }

    /// Returns the subtree subordinate total from the requested source.
    #[must_use]
    pub fn subordinate_total(&self, source: AggregateSource) -> u64 {
        match source {
            AggregateSource::Derived => self.total_subordinate_count,
            AggregateSource::Reported => self
                .reported
                .total_subordinados
                .unwrap_or(self.total_subordinate_count),
        }
    }
}

impl HierarchyTree {
    /// Returns network totals from the requested source.
    #[must_use]
    pub fn summary_from(&self, source: AggregateSource) -> NetworkSummary {
        let derived = self.summary();
        match source {
            AggregateSource::Derived => derived,
            AggregateSource::Reported => NetworkSummary {
                total_people: self
                    .reported_summary
                    .total_people
                    .unwrap_or(derived.total_people),
                total_leaders: self
                    .reported_summary
                    .total_leaders
                    .unwrap_or(derived.total_leaders),
                levels: self.reported_summary.levels.unwrap_or(derived.levels),
            },
        }
    }

    /// Lists every upstream total that disagrees with the locally derived value.
    #[must_use]
    pub fn verify_reported(&self) -> Vec<AggregateMismatch> {
        let mut mismatches = Vec::new();

        for (node, _) in self.traverse() {
            let checks = [
                (
                    "total_personas",
                    node.reported.total_personas,
                    node.total_person_count,
                ),
                (
                    "total_subordinados",
                    node.reported.total_subordinados,
                    node.total_subordinate_count,
                ),
            ];
            for (field, reported, derived) in checks {
                if let Some(reported) = reported.filter(|value| *value != derived) {
                    mismatches.push(AggregateMismatch {
                        scope: MismatchScope::Node(node.id().to_owned()),
                        field,
                        reported,
                        derived,
                    });
                }
            }
        }

        let derived = self.summary();
        let network_checks = [
            (
                "total_personas_red",
                self.reported_summary.total_people,
                derived.total_people,
            ),
            (
                "total_lideres_red",
                self.reported_summary.total_leaders,
                derived.total_leaders,
            ),
            (
                "niveles_jerarquia",
                self.reported_summary.levels,
                derived.levels,
            ),
        ];
        for (field, reported, derived) in network_checks {
            if let Some(reported) = reported.filter(|value| *value != derived) {
                mismatches.push(AggregateMismatch {
                    scope: MismatchScope::Network,
                    field,
                    reported,
                    derived,
                });
            }
        }

        mismatches
    }
}
