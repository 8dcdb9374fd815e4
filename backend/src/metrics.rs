use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters exposed on `/metrics`.
#[derive(Debug, Default)]
pub struct Metrics {
    requests_total: AtomicU64,
    predict_requests_total: AtomicU64,
    predict_failures_total: AtomicU64,
    // f64 bits
    last_predict_latency_ms: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_predict(&self) {
        self.predict_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.predict_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_latency(&self, millis: f64) {
        self.last_predict_latency_ms
            .store(millis.to_bits(), Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn predict_requests_total(&self) -> u64 {
        self.predict_requests_total.load(Ordering::Relaxed)
    }

    pub fn predict_failures_total(&self) -> u64 {
        self.predict_failures_total.load(Ordering::Relaxed)
    }

    pub fn last_predict_latency_ms(&self) -> f64 {
        f64::from_bits(self.last_predict_latency_ms.load(Ordering::Relaxed))
    }

    /// One `key value` pair per line.
    pub fn render(&self) -> String {
        format!(
            "requests_total {}\n\
             predict_requests_total {}\n\
             predict_failures_total {}\n\
             last_predict_latency_ms {:.3}\n",
            self.requests_total(),
            self.predict_requests_total(),
            self.predict_failures_total(),
            self.last_predict_latency_ms()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_at_zero() {
        let m = Metrics::new();
        assert_eq!(
            m.render(),
            "requests_total 0\npredict_requests_total 0\npredict_failures_total 0\nlast_predict_latency_ms 0.000\n"
        );
    }

    #[test]
    fn latency_keeps_the_latest_value() {
        let m = Metrics::new();
        m.record_latency(12.5);
        m.record_latency(3.25);
        assert_eq!(m.last_predict_latency_ms(), 3.25);
        assert!(m.render().contains("last_predict_latency_ms 3.250\n"));
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let m = Arc::new(Metrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = m.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        m.record_request();
                        m.record_predict();
                        m.record_failure();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(m.requests_total(), 8000);
        assert_eq!(m.predict_requests_total(), 8000);
        assert_eq!(m.predict_failures_total(), 8000);
    }
}
