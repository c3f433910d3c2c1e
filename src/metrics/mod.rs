// Private module declaration
mod server;

use prometheus::{IntCounterVec, IntGauge, Opts, Registry};

// Re-export for public API
pub use server::{health_handler, metrics_handler};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order status changes and rejected changes
// - Barcode scan outcomes
// - Chat sends and optimistic-message reconciliation
// - Live channel fan-out
// - API errors by kind
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Order Metrics
    pub status_changes: IntCounterVec,
    pub status_change_rejections: IntCounterVec,
    pub orders_placed: IntCounterVec,

    // Scan Metrics
    pub scan_outcomes: IntCounterVec,

    // Chat Metrics
    pub chat_messages_sent: IntCounterVec,
    pub chat_reconciliations: IntCounterVec,
    pub open_chat_views: IntGauge,

    // Live Channel Metrics
    pub live_events_published: IntCounterVec,

    // API Metrics
    pub api_errors: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Order Metrics
        let status_changes = IntCounterVec::new(
            Opts::new("order_status_changes_total", "Total committed order status changes"),
            &["from", "to"],
        )?;
        registry.register(Box::new(status_changes.clone()))?;

        let status_change_rejections = IntCounterVec::new(
            Opts::new("order_status_change_rejections_total", "Status changes rejected by business rules"),
            &["reason"],
        )?;
        registry.register(Box::new(status_change_rejections.clone()))?;

        let orders_placed = IntCounterVec::new(
            Opts::new("orders_placed_total", "Total orders placed"),
            &["initial_status"],
        )?;
        registry.register(Box::new(orders_placed.clone()))?;

        // Scan Metrics
        let scan_outcomes = IntCounterVec::new(
            Opts::new("scan_outcomes_total", "Barcode scans by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(scan_outcomes.clone()))?;

        // Chat Metrics
        let chat_messages_sent = IntCounterVec::new(
            Opts::new("chat_messages_sent_total", "Staff chat messages by send result"),
            &["result"],
        )?;
        registry.register(Box::new(chat_messages_sent.clone()))?;

        let chat_reconciliations = IntCounterVec::new(
            Opts::new("chat_reconciliations_total", "Live message events by reconciliation outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(chat_reconciliations.clone()))?;

        let open_chat_views = IntGauge::new("open_chat_views", "Chat views with an open conversation")?;
        registry.register(Box::new(open_chat_views.clone()))?;

        // Live Channel Metrics
        let live_events_published = IntCounterVec::new(
            Opts::new("live_events_published_total", "Events published on the live channel"),
            &["event"],
        )?;
        registry.register(Box::new(live_events_published.clone()))?;

        // API Metrics
        let api_errors = IntCounterVec::new(
            Opts::new("api_errors_total", "API error responses by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(api_errors.clone()))?;

        Ok(Self {
            registry,
            status_changes,
            status_change_rejections,
            orders_placed,
            scan_outcomes,
            chat_messages_sent,
            chat_reconciliations,
            open_chat_views,
            live_events_published,
            api_errors,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a committed status change
    pub fn record_status_change(&self, from: &str, to: &str) {
        self.status_changes.with_label_values(&[from, to]).inc();
    }

    /// Helper to record a rejected status change
    pub fn record_status_rejection(&self, reason: &str) {
        self.status_change_rejections.with_label_values(&[reason]).inc();
    }

    pub fn record_order_placed(&self, initial_status: &str) {
        self.orders_placed.with_label_values(&[initial_status]).inc();
    }

    /// Helper to record one barcode scan
    pub fn record_scan(&self, outcome: &str) {
        self.scan_outcomes.with_label_values(&[outcome]).inc();
    }

    /// Helper to record a staff chat send
    pub fn record_chat_send(&self, success: bool) {
        let result = if success { "delivered" } else { "failed" };
        self.chat_messages_sent.with_label_values(&[result]).inc();
    }

    /// Helper to record how a live message event was merged
    pub fn record_reconciliation(&self, outcome: &str) {
        self.chat_reconciliations.with_label_values(&[outcome]).inc();
    }

    pub fn record_live_event(&self, event: &str) {
        self.live_events_published.with_label_values(&[event]).inc();
    }

    pub fn record_api_error(&self, kind: &str) {
        self.api_errors.with_label_values(&[kind]).inc();
    }
}
