//! Prometheus registry exposed at `/metrics`.
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    dispatch_total: IntCounterVec,
    cache_builds_total: IntCounter,
    cache_chunks_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let dispatch_total = IntCounterVec::new(
            Opts::new("advisor_dispatch_total", "Operation dispatches by outcome"),
            &["operation", "outcome"],
        )?;
        let cache_builds_total = IntCounter::new(
            "advisor_cache_builds_total",
            "Embedding cache builds performed",
        )?;
        let cache_chunks_total = IntCounter::new(
            "advisor_cache_chunks_total",
            "Memory records written by cache builds",
        )?;

        registry.register(Box::new(dispatch_total.clone()))?;
        registry.register(Box::new(cache_builds_total.clone()))?;
        registry.register(Box::new(cache_chunks_total.clone()))?;

        Ok(Self {
            registry,
            dispatch_total,
            cache_builds_total,
            cache_chunks_total,
        })
    }

    /// `outcome` is one of `success`, `failure`, `not_found`, `error`.
    pub fn record_dispatch(&self, operation: &str, outcome: &str) {
        self.dispatch_total
            .with_label_values(&[operation, outcome])
            .inc();
    }

    pub fn record_cache_build(&self, chunks: usize) {
        self.cache_builds_total.inc();
        self.cache_chunks_total.inc_by(chunks as u64);
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        encode(&self.registry)
    }
}

pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_exposed() {
        let metrics = Metrics::new().unwrap();
        metrics.record_dispatch("MemoryQuery", "success");
        metrics.record_cache_build(3);

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"advisor_dispatch_total{operation="MemoryQuery",outcome="success"} 1"#));
        assert!(text.contains("advisor_cache_builds_total 1"));
        assert!(text.contains("advisor_cache_chunks_total 3"));
    }
}
