use crate::bottleneck::{BottleneckAnalysisResult, BottleneckDetector};
use crate::config::AnalyticsConfig;
use crate::density::{classify, DensityLevel, DensityResult};
use crate::error::{ensure_positive, Result};
use crate::flow::{FlowMetricsAnalyzer, FlowMetricsResult, FlowTrend, Variability};
use crate::spatial::{SpatialDistributionAnalyzer, SpatialDistributionResult};
use crate::stats::{mean, to_f64};
use crate::summary::{peak_frames, CountStatistics, PeakFrame};
use crate::timeseries::{TimeSeriesAggregator, VisualizationSeries};
use chrono::{DateTime, Utc};
use common::detections::{count_series, Detection, VideoContext};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use telemetry::metrics::{
    CROWD_ANALYTICS_BOTTLENECKS, CROWD_ANALYTICS_REPORTS, CROWD_ANALYTICS_REPORT_DURATION,
    CROWD_ANALYTICS_SAMPLES,
};
use tracing::{info, info_span, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ReviewStaffing,
    IncreasePresence,
    FlagHighDensity,
    MonitorEscalation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub kind: ActionKind,
    pub message: String,
}

impl RecommendedAction {
    fn new(kind: ActionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveReport {
    pub generated_at: DateTime<Utc>,
    pub sample_count: usize,
    pub count_statistics: CountStatistics,
    /// Busiest sampled frames, most people first
    pub peak_frames: Vec<PeakFrame>,
    pub crowd_density: DensityResult,
    pub spatial_distribution: SpatialDistributionResult,
    pub bottleneck_analysis: BottleneckAnalysisResult,
    pub flow_metrics: FlowMetricsResult,
    pub visualization: VisualizationSeries,
    /// Most urgent first
    pub actions: Vec<RecommendedAction>,
}

/// Runs every analysis over one detection set and assembles the report
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    config: AnalyticsConfig,
    spatial: SpatialDistributionAnalyzer,
    bottleneck: BottleneckDetector,
    flow: FlowMetricsAnalyzer,
    timeseries: TimeSeriesAggregator,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::with_config(AnalyticsConfig::default())
    }
}

impl ReportGenerator {
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: AnalyticsConfig) -> Self {
        Self {
            spatial: SpatialDistributionAnalyzer::new(config.spatial.clone()),
            bottleneck: BottleneckDetector::new(config.bottleneck.clone()),
            flow: FlowMetricsAnalyzer::new(config.flow.clone()),
            timeseries: TimeSeriesAggregator::new(config.visualization.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn generate(
        &self,
        detections: &[Detection],
        context: &VideoContext,
    ) -> Result<ComprehensiveReport> {
        self.generate_at(detections, context, Utc::now())
    }

    /// Same as [`generate`](Self::generate) with a fixed timestamp, so identical
    /// input yields an identical report
    pub fn generate_at(
        &self,
        detections: &[Detection],
        context: &VideoContext,
        generated_at: DateTime<Utc>,
    ) -> Result<ComprehensiveReport> {
        let span = info_span!("crowd_report", samples = detections.len());
        let _enter = span.enter();
        let timer = CROWD_ANALYTICS_REPORT_DURATION.start_timer();

        let result = self.build(detections, context, generated_at);
        timer.observe_duration();

        match &result {
            Ok(report) => {
                CROWD_ANALYTICS_REPORTS.with_label_values(&["success"]).inc();
                CROWD_ANALYTICS_SAMPLES.inc_by(report.sample_count as u64);
                for period in &report.bottleneck_analysis.periods {
                    CROWD_ANALYTICS_BOTTLENECKS
                        .with_label_values(&[period.severity.as_str()])
                        .inc();
                }
                info!(
                    density = report.crowd_density.level.label(),
                    hotspots = report.spatial_distribution.hotspots.len(),
                    bottlenecks = report.bottleneck_analysis.periods.len(),
                    actions = report.actions.len(),
                    "crowd report generated"
                );
            }
            Err(e) => {
                CROWD_ANALYTICS_REPORTS.with_label_values(&["invalid"]).inc();
                warn!(error = %e, "crowd report rejected");
            }
        }

        result
    }

    fn build(
        &self,
        detections: &[Detection],
        context: &VideoContext,
        generated_at: DateTime<Utc>,
    ) -> Result<ComprehensiveReport> {
        let area = ensure_positive(context.monitored_area_sqm, "monitored_area_sqm")?;
        let fps = ensure_positive(context.fps, "fps")?;

        let detections = time_ordered(detections);
        let (counts, timestamps) = count_series(&detections);

        let mean_count = mean(&to_f64(&counts)).unwrap_or(0.0);
        let crowd_density = classify(mean_count.trunc() as u32, area)?;
        let spatial_distribution = self.spatial.analyze(&detections, context);
        let mut bottleneck_analysis = self.bottleneck.detect(&counts, &timestamps, fps)?;
        for period in &mut bottleneck_analysis.periods {
            if let Some(d) = detections.get(period.start_frame) {
                period.start_frame_index = d.frame_index;
            }
            if let Some(d) = detections.get(period.end_frame) {
                period.end_frame_index = d.frame_index;
            }
        }
        let flow_metrics = self.flow.analyze(&counts, &timestamps);
        let visualization = self
            .timeseries
            .bucket(&counts, &timestamps, context.duration_seconds)?;

        let actions = self.recommend(
            &crowd_density,
            &spatial_distribution,
            &bottleneck_analysis,
            &flow_metrics,
        );

        Ok(ComprehensiveReport {
            generated_at,
            sample_count: counts.len(),
            count_statistics: CountStatistics::from_counts(&counts),
            peak_frames: peak_frames(&detections, self.config.peak_frame_count),
            crowd_density,
            spatial_distribution,
            bottleneck_analysis,
            flow_metrics,
            visualization,
            actions,
        })
    }

    fn recommend(
        &self,
        density: &DensityResult,
        spatial: &SpatialDistributionResult,
        bottlenecks: &BottleneckAnalysisResult,
        flow: &FlowMetricsResult,
    ) -> Vec<RecommendedAction> {
        let mut candidates = Vec::new();

        let mut urgent: Vec<_> = bottlenecks
            .periods
            .iter()
            .filter(|p| p.severity.is_urgent())
            .collect();
        urgent.sort_by(|a, b| b.severity_score.total_cmp(&a.severity_score));
        for period in urgent {
            candidates.push(RecommendedAction::new(
                ActionKind::ReviewStaffing,
                format!("Review staffing during {}", period.time_range),
            ));
        }

        for zone in &spatial.hotspots {
            candidates.push(RecommendedAction::new(
                ActionKind::IncreasePresence,
                format!("Increase staff presence in {}", zone),
            ));
        }

        if density.level >= DensityLevel::High {
            candidates.push(RecommendedAction::new(
                ActionKind::FlagHighDensity,
                format!(
                    "Flag high crowd density: {:.2} people/m² ({})",
                    density.density_per_sqm,
                    density.level.label()
                ),
            ));
        }

        if flow.trend == FlowTrend::Increasing && flow.variability == Variability::High {
            candidates.push(RecommendedAction::new(
                ActionKind::MonitorEscalation,
                format!(
                    "Monitor for continued escalation: count rising {:.2} people/s with high variability",
                    flow.flow_rate
                ),
            ));
        }

        let mut actions: Vec<RecommendedAction> = Vec::with_capacity(self.config.max_actions);
        for action in candidates {
            if actions.len() == self.config.max_actions {
                break;
            }
            if !actions.contains(&action) {
                actions.push(action);
            }
        }
        actions
    }
}

/// Borrow the input when already sorted by timestamp, otherwise sort a copy
fn time_ordered(detections: &[Detection]) -> Cow<'_, [Detection]> {
    let in_order = detections
        .windows(2)
        .all(|w| w[0].timestamp_seconds <= w[1].timestamp_seconds);
    if in_order {
        return Cow::Borrowed(detections);
    }

    warn!(samples = detections.len(), "detections out of time order, re-sorting");
    let mut sorted = detections.to_vec();
    sorted.sort_by(|a, b| a.timestamp_seconds.total_cmp(&b.timestamp_seconds));
    Cow::Owned(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bottleneck::BottleneckSeverity;
    use crate::error::AnalyticsError;
    use crate::zone_grid::Zone;
    use chrono::TimeZone;
    use common::detections::BoundingBox;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn context(duration_seconds: f64) -> VideoContext {
        VideoContext {
            frame_width: 900,
            frame_height: 900,
            fps: 1.0,
            duration_seconds,
            monitored_area_sqm: 100.0,
        }
    }

    fn series(counts: &[u32]) -> Vec<Detection> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &c)| Detection::new(i as u64, i as f64, c))
            .collect()
    }

    #[test]
    fn test_empty_input_yields_neutral_report() {
        let report = ReportGenerator::default()
            .generate_at(&[], &context(0.0), fixed_time())
            .unwrap();

        assert_eq!(report.sample_count, 0);
        assert_eq!(report.crowd_density.person_count, 0);
        assert_eq!(report.crowd_density.level, DensityLevel::VeryLow);
        assert_eq!(report.spatial_distribution.pattern_description, "No detections");
        assert!(report.bottleneck_analysis.periods.is_empty());
        assert_eq!(report.flow_metrics.trend, FlowTrend::Stable);
        assert!(report.visualization.buckets.is_empty());
        assert!(report.actions.is_empty());
    }

    #[test]
    fn test_density_uses_truncated_mean() {
        // mean 29.5 -> 29 people -> Moderate
        let report = ReportGenerator::default()
            .generate_at(&series(&[29, 30]), &context(2.0), fixed_time())
            .unwrap();

        assert_eq!(report.crowd_density.person_count, 29);
        assert_eq!(report.crowd_density.level, DensityLevel::Moderate);
    }

    #[test]
    fn test_invalid_context_propagates() {
        let mut ctx = context(10.0);
        ctx.monitored_area_sqm = 0.0;
        assert_eq!(
            ReportGenerator::default().generate_at(&series(&[1]), &ctx, fixed_time()),
            Err(AnalyticsError::invalid_configuration("monitored_area_sqm", 0.0))
        );

        let mut ctx = context(10.0);
        ctx.fps = -30.0;
        assert_eq!(
            ReportGenerator::default().generate_at(&series(&[1]), &ctx, fixed_time()),
            Err(AnalyticsError::invalid_configuration("fps", -30.0))
        );
    }

    #[test]
    fn test_new_validates_config() {
        let mut config = AnalyticsConfig::default();
        config.visualization.interval_seconds = 0.0;
        assert!(ReportGenerator::new(config).is_err());
        assert!(ReportGenerator::new(AnalyticsConfig::default()).is_ok());
    }

    #[test]
    fn test_out_of_order_detections_are_sorted() {
        let ordered = series(&[5, 5, 20, 22, 21, 5, 5]);
        let mut shuffled = ordered.clone();
        shuffled.swap(0, 6);
        shuffled.swap(2, 4);

        let generator = ReportGenerator::default();
        let a = generator.generate_at(&ordered, &context(7.0), fixed_time()).unwrap();
        let b = generator.generate_at(&shuffled, &context(7.0), fixed_time()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_actions_follow_rule_order() {
        // a long, intense surge with every box in the top-left zone
        let mut counts = vec![1u32; 50];
        counts.extend(std::iter::repeat(100).take(10));
        let detections: Vec<Detection> = series(&counts)
            .into_iter()
            .map(|d| d.with_boxes(vec![BoundingBox::new(10.0, 10.0, 50.0, 50.0)]))
            .collect();

        let report = ReportGenerator::default()
            .generate_at(&detections, &context(60.0), fixed_time())
            .unwrap();

        assert_eq!(report.bottleneck_analysis.periods.len(), 1);
        assert_eq!(
            report.bottleneck_analysis.periods[0].severity,
            BottleneckSeverity::Critical
        );

        let kinds: Vec<ActionKind> = report.actions.iter().map(|a| a.kind).collect();
        assert_eq!(kinds[0], ActionKind::ReviewStaffing);
        assert_eq!(kinds[1], ActionKind::IncreasePresence);
        assert_eq!(report.actions[0].message, "Review staffing during 00:50 - 00:59");
        assert_eq!(report.actions[1].message, format!("Increase staff presence in {}", Zone::TopLeft));
        assert!(kinds.contains(&ActionKind::MonitorEscalation));
    }

    #[test]
    fn test_flag_high_density() {
        let report = ReportGenerator::default()
            .generate_at(&series(&[60, 60, 60]), &context(3.0), fixed_time())
            .unwrap();

        assert_eq!(report.crowd_density.level, DensityLevel::VeryHigh);
        assert_eq!(
            report.actions,
            vec![RecommendedAction::new(
                ActionKind::FlagHighDensity,
                "Flag high crowd density: 0.60 people/m² (Very High)"
            )]
        );
    }

    #[test]
    fn test_actions_capped_and_unique() {
        let mut config = AnalyticsConfig::default();
        config.max_actions = 2;
        let generator = ReportGenerator::new(config).unwrap();

        // three hotspots plus very high density
        let boxes = vec![
            BoundingBox::new(0.0, 0.0, 100.0, 100.0),
            BoundingBox::new(400.0, 0.0, 500.0, 100.0),
            BoundingBox::new(800.0, 0.0, 900.0, 100.0),
        ];
        let detections: Vec<Detection> = series(&[80, 80])
            .into_iter()
            .map(|d| d.with_boxes(boxes.clone()))
            .collect();

        let report = generator.generate_at(&detections, &context(2.0), fixed_time()).unwrap();
        assert_eq!(report.actions.len(), 2);
        assert_ne!(report.actions[0], report.actions[1]);
        assert!(report.actions.iter().all(|a| a.kind == ActionKind::IncreasePresence));
    }

    #[test]
    fn test_generate_at_is_idempotent() {
        let detections = series(&[3, 8, 13, 9, 4, 2, 15, 16, 17, 3]);
        let generator = ReportGenerator::default();
        let first = generator.generate_at(&detections, &context(10.0), fixed_time()).unwrap();
        let second = generator.generate_at(&detections, &context(10.0), fixed_time()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_serializes_snake_case() {
        let report = ReportGenerator::default()
            .generate_at(&series(&[60, 60, 60]), &context(3.0), fixed_time())
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["crowd_density"]["level"], "very_high");
        assert_eq!(json["flow_metrics"]["trend"], "stable");
        assert_eq!(json["actions"][0]["kind"], "flag_high_density");
        assert_eq!(json["generated_at"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_bottleneck_reports_source_frame_numbers() {
        // detector sampled every 30th frame at 30 fps
        let detections: Vec<Detection> = [5u32, 5, 20, 22, 21, 5, 5]
            .iter()
            .enumerate()
            .map(|(i, &c)| Detection::new(i as u64 * 30, i as f64, c))
            .collect();
        let ctx = VideoContext {
            fps: 30.0,
            ..context(7.0)
        };

        let report = ReportGenerator::default()
            .generate_at(&detections, &ctx, fixed_time())
            .unwrap();

        let period = &report.bottleneck_analysis.periods[0];
        assert_eq!(period.start_frame, 2);
        assert_eq!(period.end_frame, 4);
        assert_eq!(period.start_frame_index, 60);
        assert_eq!(period.end_frame_index, 120);
    }

    #[test]
    fn test_report_includes_count_statistics_and_peaks() {
        let mut config = AnalyticsConfig::default();
        config.peak_frame_count = 2;
        let generator = ReportGenerator::new(config).unwrap();

        let report = generator
            .generate_at(&series(&[4, 10, 2, 8, 10]), &context(5.0), fixed_time())
            .unwrap();

        let stats = &report.count_statistics;
        assert_eq!(stats.total_frames, 5);
        assert_eq!(stats.total_detections, 34);
        assert_eq!(stats.median_count, 8.0);
        assert_eq!(stats.min_count, 2);
        assert_eq!(stats.max_count, 10);

        let peaks: Vec<(u64, u32)> = report
            .peak_frames
            .iter()
            .map(|p| (p.frame_index, p.person_count))
            .collect();
        assert_eq!(peaks, vec![(1, 10), (4, 10)]);
        assert_eq!(report.peak_frames[1].timestamp_label, "00:04");
    }
}
