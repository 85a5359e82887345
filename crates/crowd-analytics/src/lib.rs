//! Crowd analytics engine.
//!
//! Turns the per-frame person counts and boxes of one video into a
//! [`ComprehensiveReport`]: density level, zone occupancy and hotspots,
//! bottleneck periods with severity scores, flow trend and variability, and a
//! chart-ready time series. Every component is a pure computation over
//! immutable inputs; nothing here performs I/O.

pub mod bottleneck;
pub mod config;
pub mod density;
pub mod error;
pub mod flow;
pub mod report;
pub mod spatial;
pub mod stats;
pub mod summary;
pub mod timeseries;
pub mod zone_grid;

pub use bottleneck::{BottleneckAnalysisResult, BottleneckDetector, BottleneckPeriod, BottleneckSeverity};
pub use config::AnalyticsConfig;
pub use density::{classify, DensityLevel, DensityResult};
pub use error::{AnalyticsError, Result};
pub use flow::{FlowMetricsAnalyzer, FlowMetricsResult, FlowTrend, Variability};
pub use report::{ActionKind, ComprehensiveReport, RecommendedAction, ReportGenerator};
pub use spatial::{SpatialDistributionAnalyzer, SpatialDistributionResult, ZoneSummary};
pub use summary::{peak_frames, CountStatistics, PeakFrame};
pub use timeseries::{SeriesBucket, SeriesSummary, TimeSeriesAggregator, VisualizationSeries};
pub use zone_grid::{zone_of, Zone};
