// ABOUTME: Retargets metric alarms from the superseded resource to its successor.
// ABOUTME: Pure rewrite of names and dimensions, then recreation through the provider.

use tracing::{info, warn};

use crate::provider::{AlarmDefinition, AlarmDimension, AlarmError, AlarmOps};

/// Rewrite every alarm whose name references `source` so it watches
/// `target` instead. Each matching alarm yields exactly one copy: its name
/// gains the `{target}-alarm-writer` marker and its dimensions collapse to
/// the single identifier dimension pointing at the target.
pub fn retarget(alarms: &[AlarmDefinition], source: &str, target: &str) -> Vec<AlarmDefinition> {
    let marker = format!("{target}-alarm");

    alarms
        .iter()
        .filter(|alarm| alarm.name.contains(source))
        .map(|alarm| {
            let mut copy = alarm.clone();
            copy.name = alarm.name.replace(source, &format!("{marker}-writer"));

            // Cluster alarms keep watching at the cluster level; anything
            // else falls back to the instance dimension.
            let dimension = if alarm
                .dimensions
                .iter()
                .any(|d| d.name == "DBClusterIdentifier")
            {
                AlarmDimension {
                    name: "DBClusterIdentifier".to_string(),
                    value: target.to_string(),
                }
            } else {
                AlarmDimension {
                    name: "DBInstanceIdentifier".to_string(),
                    value: target.to_string(),
                }
            };
            copy.dimensions = vec![dimension];
            copy
        })
        .collect()
}

/// List the region's alarms, retarget the ones referencing `source`, and
/// recreate them. A failed put is logged and skipped; the rest proceed.
pub async fn recreate<P: AlarmOps>(
    provider: &P,
    source: &str,
    target: &str,
) -> Result<Vec<String>, AlarmError> {
    let alarms = provider.list_alarms().await?;

    let retargeted = retarget(&alarms, source, target);
    info!(
        total = alarms.len(),
        matched = retargeted.len(),
        "alarms retargeted"
    );
    let mut created = Vec::with_capacity(retargeted.len());

    for alarm in &retargeted {
        match provider.put_alarm(alarm).await {
            Ok(()) => created.push(alarm.name.clone()),
            Err(e) => warn!(alarm = %alarm.name, error = %e, "failed to create alarm"),
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarm(name: &str, dimensions: Vec<(&str, &str)>) -> AlarmDefinition {
        AlarmDefinition {
            name: name.to_string(),
            metric_name: Some("CPUUtilization".to_string()),
            namespace: Some("AWS/RDS".to_string()),
            statistic: Some("Average".to_string()),
            period: Some(300),
            evaluation_periods: Some(3),
            threshold: Some(80.0),
            comparison_operator: Some("GreaterThanThreshold".to_string()),
            dimensions: dimensions
                .into_iter()
                .map(|(name, value)| AlarmDimension {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn unrelated_alarms_are_left_alone() {
        let alarms = vec![alarm("billing-high-cpu", vec![("DBInstanceIdentifier", "billing")])];
        assert!(retarget(&alarms, "orders-prod", "orders-prod-green").is_empty());
    }

    #[test]
    fn matching_alarm_yields_exactly_one_copy() {
        let alarms = vec![alarm(
            "orders-prod-high-cpu",
            vec![("DBInstanceIdentifier", "orders-prod")],
        )];
        let out = retarget(&alarms, "orders-prod", "orders-new");

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "orders-new-alarm-writer-high-cpu");
        assert_eq!(
            out[0].dimensions,
            vec![AlarmDimension {
                name: "DBInstanceIdentifier".to_string(),
                value: "orders-new".to_string(),
            }]
        );
        // Metric configuration is preserved.
        assert_eq!(out[0].threshold, Some(80.0));
        assert_eq!(out[0].period, Some(300));
    }

    #[test]
    fn cluster_dimension_is_preserved_at_cluster_level() {
        let alarms = vec![alarm(
            "orders-prod-replica-lag",
            vec![
                ("DBClusterIdentifier", "orders-prod"),
                ("Role", "WRITER"),
            ],
        )];
        let out = retarget(&alarms, "orders-prod", "orders-new");

        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].dimensions,
            vec![AlarmDimension {
                name: "DBClusterIdentifier".to_string(),
                value: "orders-new".to_string(),
            }]
        );
    }

    #[test]
    fn multiple_matches_each_yield_one_copy() {
        let alarms = vec![
            alarm("orders-prod-high-cpu", vec![("DBInstanceIdentifier", "orders-prod")]),
            alarm("orders-prod-low-storage", vec![("DBInstanceIdentifier", "orders-prod")]),
            alarm("billing-high-cpu", vec![("DBInstanceIdentifier", "billing")]),
        ];
        let out = retarget(&alarms, "orders-prod", "orders-new");
        assert_eq!(out.len(), 2);
    }
}
