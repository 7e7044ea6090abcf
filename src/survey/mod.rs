// ABOUTME: Fleet survey: find instances and clusters running outdated engines.
// ABOUTME: Pure filtering over provider summaries, sorted oldest first.

use tracing::debug;

use crate::provider::{DatabaseError, DatabaseOps, DbSummary};
use crate::types::EngineVersion;

/// Instances and clusters running below the version ceiling.
#[derive(Debug, Clone, Default)]
pub struct SurveyReport {
    pub instances: Vec<DbSummary>,
    pub clusters: Vec<DbSummary>,
}

impl SurveyReport {
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty() && self.clusters.is_empty()
    }
}

/// Survey the fleet for resources running older engine versions.
///
/// Aurora members show up in the instance listing too; they are reported
/// once, under their cluster. Without a ceiling every PostgreSQL resource
/// is listed.
pub async fn outdated<P: DatabaseOps>(
    provider: &P,
    max: Option<&EngineVersion>,
) -> Result<SurveyReport, DatabaseError> {
    let instances = provider.list_instances().await?;
    let clusters = provider.list_clusters().await?;
    debug!(
        instances = instances.len(),
        clusters = clusters.len(),
        "fleet listed"
    );

    let standalone: Vec<DbSummary> = instances
        .into_iter()
        .filter(|db| !db.engine.contains("aurora"))
        .collect();

    Ok(SurveyReport {
        instances: below_ceiling(standalone, max),
        clusters: below_ceiling(clusters, max),
    })
}

fn below_ceiling(summaries: Vec<DbSummary>, max: Option<&EngineVersion>) -> Vec<DbSummary> {
    let mut kept: Vec<DbSummary> = summaries
        .into_iter()
        .filter(|db| match max {
            Some(ceiling) => db.engine_version < *ceiling,
            None => true,
        })
        .collect();
    kept.sort_by(|a, b| a.engine_version.cmp(&b.engine_version));
    kept
}
