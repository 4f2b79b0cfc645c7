/// Destinations for emitted records
use log::{info, warn};

use crate::models::FormattedRecord;

/// Receives one record per successful or weather-degraded tick
pub trait RecordSink: Send {
    fn emit(&mut self, record: FormattedRecord);
}

impl<F> RecordSink for F
where
    F: FnMut(FormattedRecord) + Send,
{
    fn emit(&mut self, record: FormattedRecord) {
        self(record)
    }
}

/// Logs every record as a single JSON line
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RecordSink for LogSink {
    fn emit(&mut self, record: FormattedRecord) {
        match serde_json::to_string(&record) {
            Ok(line) => info!("{}", line),
            Err(e) => {
                warn!("Could not serialize record: {}", e);
                info!("{:?}", record);
            }
        }
    }
}
