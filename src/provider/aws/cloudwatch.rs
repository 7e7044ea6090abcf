// ABOUTME: CloudWatch-backed implementation of the alarm operations trait.
// ABOUTME: Maps between metric alarms and the provider-neutral alarm definition.

use async_trait::async_trait;
use tracing::info;

use aws_sdk_cloudwatch::types::{
    ComparisonOperator, Dimension, MetricAlarm, StandardUnit, Statistic,
};

use super::AwsProvider;
use crate::provider::traits::{AlarmDefinition, AlarmDimension, AlarmError, AlarmOps};

#[async_trait]
impl AlarmOps for AwsProvider {
    async fn list_alarms(&self) -> Result<Vec<AlarmDefinition>, AlarmError> {
        let mut alarms = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .cloudwatch()
                .describe_alarms()
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| AlarmError::Api(e.to_string()))?;

            alarms.extend(output.metric_alarms().iter().map(alarm_definition));

            next_token = output.next_token().map(|t| t.to_string());
            if next_token.is_none() {
                break;
            }
        }
        info!(count = alarms.len(), "alarms fetched");
        Ok(alarms)
    }

    async fn put_alarm(&self, alarm: &AlarmDefinition) -> Result<(), AlarmError> {
        let dimensions = alarm
            .dimensions
            .iter()
            .map(|d| {
                Dimension::builder()
                    .name(&d.name)
                    .value(&d.value)
                    .build()
            })
            .collect::<Vec<_>>();

        self.cloudwatch()
            .put_metric_alarm()
            .alarm_name(&alarm.name)
            .set_alarm_description(alarm.description.clone())
            .set_actions_enabled(alarm.actions_enabled)
            .set_ok_actions(Some(alarm.ok_actions.clone()))
            .set_alarm_actions(Some(alarm.alarm_actions.clone()))
            .set_insufficient_data_actions(Some(alarm.insufficient_data_actions.clone()))
            .set_metric_name(alarm.metric_name.clone())
            .set_namespace(alarm.namespace.clone())
            .set_statistic(alarm.statistic.as_deref().map(Statistic::from))
            .set_extended_statistic(alarm.extended_statistic.clone())
            .set_dimensions(Some(dimensions))
            .set_period(alarm.period)
            .set_unit(alarm.unit.as_deref().map(StandardUnit::from))
            .set_evaluation_periods(alarm.evaluation_periods)
            .set_datapoints_to_alarm(alarm.datapoints_to_alarm)
            .set_threshold(alarm.threshold)
            .set_comparison_operator(
                alarm
                    .comparison_operator
                    .as_deref()
                    .map(ComparisonOperator::from),
            )
            .set_treat_missing_data(alarm.treat_missing_data.clone())
            .send()
            .await
            .map_err(|e| AlarmError::PutFailed {
                name: alarm.name.clone(),
                message: e.to_string(),
            })?;

        info!(alarm = %alarm.name, "alarm created");
        Ok(())
    }
}

fn alarm_definition(alarm: &MetricAlarm) -> AlarmDefinition {
    AlarmDefinition {
        name: alarm.alarm_name().unwrap_or_default().to_string(),
        description: alarm.alarm_description().map(|s| s.to_string()),
        actions_enabled: alarm.actions_enabled(),
        ok_actions: alarm.ok_actions().to_vec(),
        alarm_actions: alarm.alarm_actions().to_vec(),
        insufficient_data_actions: alarm.insufficient_data_actions().to_vec(),
        metric_name: alarm.metric_name().map(|s| s.to_string()),
        namespace: alarm.namespace().map(|s| s.to_string()),
        statistic: alarm.statistic().map(|s| s.as_str().to_string()),
        extended_statistic: alarm.extended_statistic().map(|s| s.to_string()),
        dimensions: alarm
            .dimensions()
            .iter()
            .map(|d| AlarmDimension {
                name: d.name().unwrap_or_default().to_string(),
                value: d.value().unwrap_or_default().to_string(),
            })
            .collect(),
        period: alarm.period(),
        unit: alarm.unit().map(|u| u.as_str().to_string()),
        evaluation_periods: alarm.evaluation_periods(),
        datapoints_to_alarm: alarm.datapoints_to_alarm(),
        threshold: alarm.threshold(),
        comparison_operator: alarm
            .comparison_operator()
            .map(|c| c.as_str().to_string()),
        treat_missing_data: alarm.treat_missing_data().map(|s| s.to_string()),
    }
}
