//! Relay counters, published through the `metrics` facade.

use metrics::counter;

/// Record an inbound pipeline event.
pub fn event_received() {
    counter!("relay_events_received_total").increment(1);
}

/// Record a commit status accepted by GitHub.
pub fn status_posted(state: &str) {
    counter!("relay_statuses_posted_total", "state" => state.to_string()).increment(1);
}

/// Record an aborted invocation.
pub fn relay_failed(stage: &str) {
    counter!("relay_failures_total", "stage" => stage.to_string()).increment(1);
}
