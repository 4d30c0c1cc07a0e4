use super::LogEntry;

/// Receives every recorded entry, e.g. to forward it to a collector.
///
/// Sinks cannot fail the caller; report problems through `tracing`.
pub trait TelemetrySink: Send + Sync {
    fn forward(&self, entry: &LogEntry);
}

impl<F> TelemetrySink for F
where
    F: Fn(&LogEntry) + Send + Sync,
{
    fn forward(&self, entry: &LogEntry) {
        self(entry)
    }
}

/// Emits each entry as a `tracing` event on the `adsdash::telemetry` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn forward(&self, entry: &LogEntry) {
        tracing::info!(
            target: "adsdash::telemetry",
            context = %entry.context,
            kind = %entry.kind,
            code = ?entry.code,
            subcode = ?entry.subcode,
            url = ?entry.url,
            "{}",
            entry.message
        );
    }
}
