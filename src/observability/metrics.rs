use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounter,
    pub claims_total: IntCounterVec,
    pub payments_total: IntCounterVec,
    pub dispatch_query_seconds: HistogramVec,
    pub active_deliveries: IntGauge,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total =
            IntCounter::new("orders_created_total", "Orders successfully placed")
                .expect("valid orders_created_total metric");

        let claims_total = IntCounterVec::new(
            Opts::new("claims_total", "Driver claim attempts by outcome"),
            &["outcome"],
        )
        .expect("valid claims_total metric");

        let payments_total = IntCounterVec::new(
            Opts::new("payments_total", "Payment captures by outcome"),
            &["outcome"],
        )
        .expect("valid payments_total metric");

        let dispatch_query_seconds = HistogramVec::new(
            HistogramOpts::new(
                "dispatch_query_seconds",
                "Latency of location scans in seconds",
            ),
            &["query"],
        )
        .expect("valid dispatch_query_seconds metric");

        let active_deliveries =
            IntGauge::new("active_deliveries", "Orders currently on the way")
                .expect("valid active_deliveries metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(claims_total.clone()))
            .expect("register claims_total");
        registry
            .register(Box::new(payments_total.clone()))
            .expect("register payments_total");
        registry
            .register(Box::new(dispatch_query_seconds.clone()))
            .expect("register dispatch_query_seconds");
        registry
            .register(Box::new(active_deliveries.clone()))
            .expect("register active_deliveries");

        Self {
            registry,
            orders_created_total,
            claims_total,
            payments_total,
            dispatch_query_seconds,
            active_deliveries,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
