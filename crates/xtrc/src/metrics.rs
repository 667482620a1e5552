//! Trace writer metrics using metrics-rs.
//!
//! The writer reports through the global recorder, so metrics cost nothing
//! unless a recorder is installed. The CLI installs `CliRecorder` for
//! `--metrics` and prints the totals on exit.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter,
};
use parking_lot::RwLock;
use xtrc_format::RecordTag;

pub const RECORDS_TOTAL: &str = "xtrc_records_total";
pub const BYTES_WRITTEN_TOTAL: &str = "xtrc_bytes_written_total";
pub const STRINGS_INTERNED_TOTAL: &str = "xtrc_strings_interned_total";

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!(RECORDS_TOTAL, Unit::Count, "Trace records written, by tag");
    describe_counter!(
        BYTES_WRITTEN_TOTAL,
        Unit::Bytes,
        "Bytes handed to trace sinks, preamble included"
    );
    describe_counter!(
        STRINGS_INTERNED_TOTAL,
        Unit::Count,
        "Distinct assembly tokens written as literals"
    );
}

pub(crate) fn record_written(tag: RecordTag, bytes: usize) {
    counter!(RECORDS_TOTAL, "kind" => tag.as_str()).increment(1);
    counter!(BYTES_WRITTEN_TOTAL).increment(bytes as u64);
}

pub(crate) fn preamble_written(bytes: usize) {
    counter!(BYTES_WRITTEN_TOTAL).increment(bytes as u64);
}

pub(crate) fn strings_interned(count: usize) {
    if count > 0 {
        counter!(STRINGS_INTERNED_TOTAL).increment(count as u64);
    }
}

// ============================================================================
// CLI Recorder for terminal output
// ============================================================================

type CounterStorage = RwLock<HashMap<String, u64>>;

struct CliCounter {
    key: String,
    storage: Arc<CounterStorage>,
}

impl metrics::CounterFn for CliCounter {
    fn increment(&self, value: u64) {
        *self.storage.write().entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        self.storage.write().insert(self.key.clone(), value);
    }
}

/// In-memory recorder for counters. Gauges and histograms are discarded.
#[derive(Default)]
pub struct CliRecorder {
    counters: Arc<CounterStorage>,
}

impl CliRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the global recorder. `None` if one is already installed.
    #[must_use]
    pub fn install(self) -> Option<CliRecorderHandle> {
        let counters = Arc::clone(&self.counters);
        metrics::set_global_recorder(self).ok()?;
        Some(CliRecorderHandle { counters })
    }
}

fn key_to_string(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl Recorder for CliRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CliCounter {
            key: key_to_string(key),
            storage: Arc::clone(&self.counters),
        }))
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

/// Access to counters collected by an installed `CliRecorder`.
pub struct CliRecorderHandle {
    counters: Arc<CounterStorage>,
}

impl CliRecorderHandle {
    #[must_use]
    pub fn get_counter(&self, key: &str) -> Option<u64> {
        self.counters.read().get(key).copied()
    }

    pub fn print_summary(&self) {
        let counters = self.counters.read();
        if counters.is_empty() {
            println!("No metrics collected.");
            return;
        }

        println!();
        println!("## Metrics Summary");
        let mut keys: Vec<_> = counters.keys().collect();
        keys.sort();
        for key in keys {
            println!("  {key}: {}", counters[key]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::Label;

    #[test]
    fn test_key_to_string() {
        let key = Key::from_name(BYTES_WRITTEN_TOTAL);
        assert_eq!(key_to_string(&key), "xtrc_bytes_written_total");

        let key = Key::from_parts(RECORDS_TOTAL, vec![Label::new("kind", "STEP")]);
        assert_eq!(key_to_string(&key), "xtrc_records_total{kind=STEP}");
    }

    #[test]
    fn test_counter_storage() {
        let recorder = CliRecorder::new();
        let counter = CliCounter {
            key: "records".to_string(),
            storage: Arc::clone(&recorder.counters),
        };
        metrics::CounterFn::increment(&counter, 2);
        metrics::CounterFn::increment(&counter, 3);
        assert_eq!(recorder.counters.read().get("records"), Some(&5));
        metrics::CounterFn::absolute(&counter, 1);
        assert_eq!(recorder.counters.read().get("records"), Some(&1));

        let handle = CliRecorderHandle {
            counters: Arc::clone(&recorder.counters),
        };
        assert_eq!(handle.get_counter("records"), Some(1));
        assert_eq!(handle.get_counter("missing"), None);
    }
}
