use std::sync::Arc;

use terreno_core::{AppError, AppResult, SessionIdentity};
use terreno_domain::{AggregateMismatch, AggregateSource, HierarchyTree, NetworkSummary};
use tracing::{info, warn};

use crate::DashboardConfigSource;

/// Built hierarchy ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchySnapshot {
    /// Validated and aggregated tree.
    pub tree: HierarchyTree,
    /// Which totals the display should show.
    pub aggregate_source: AggregateSource,
    /// Upstream totals that disagree with the derived ones.
    pub mismatches: Vec<AggregateMismatch>,
}

impl HierarchySnapshot {
    /// Returns the network summary from the configured source.
    #[must_use]
    pub fn summary(&self) -> NetworkSummary {
        self.tree.summary_from(self.aggregate_source)
    }
}

/// Application service materializing the leadership hierarchy.
#[derive(Clone)]
pub struct HierarchyService {
    source: Arc<dyn DashboardConfigSource>,
    aggregate_source: AggregateSource,
}

impl HierarchyService {
    /// Creates a hierarchy service over a document source.
    #[must_use]
    pub fn new(source: Arc<dyn DashboardConfigSource>, aggregate_source: AggregateSource) -> Self {
        Self {
            source,
            aggregate_source,
        }
    }

    /// Fetches and builds the hierarchy visible to the session.
    ///
    /// Malformed payloads surface as [`AppError::Unavailable`]; no partial tree is
    /// returned.
    pub async fn load_hierarchy(&self, identity: &SessionIdentity) -> AppResult<HierarchySnapshot> {
        let payload = self.source.fetch_hierarchy(identity).await?;

        let tree = HierarchyTree::build(&payload).map_err(|error| {
            warn!(error = %error, "rejecting malformed hierarchy payload");
            AppError::from(error)
        })?;

        let mismatches = tree.verify_reported();
        for mismatch in &mismatches {
            warn!(
                scope = ?mismatch.scope,
                field = mismatch.field,
                reported = mismatch.reported,
                derived = mismatch.derived,
                "upstream hierarchy total differs from derived total"
            );
        }

        let summary = tree.summary();
        info!(
            leaders = summary.total_leaders,
            people = summary.total_people,
            levels = summary.levels,
            mismatches = mismatches.len(),
            "hierarchy built"
        );

        Ok(HierarchySnapshot {
            tree,
            aggregate_source: self.aggregate_source,
            mismatches,
        })
    }
}
