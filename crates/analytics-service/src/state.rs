use crowd_analytics::ReportGenerator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AnalyticsServiceState {
    inner: Arc<AnalyticsServiceStateInner>,
}

struct AnalyticsServiceStateInner {
    node_id: String,
    generator: ReportGenerator,
}

impl AnalyticsServiceState {
    pub fn new(node_id: impl Into<String>, generator: ReportGenerator) -> Self {
        Self {
            inner: Arc::new(AnalyticsServiceStateInner {
                node_id: node_id.into(),
                generator,
            }),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.inner.node_id
    }

    pub fn generator(&self) -> &ReportGenerator {
        &self.inner.generator
    }
}
