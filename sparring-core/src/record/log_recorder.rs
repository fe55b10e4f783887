use super::{Record, RecordValue, Recorder};
use log::info;

/// Writes records through the `log` facade at the info level.
///
/// Keys are sorted so that lines of the same kind line up in the log.
pub struct LogRecorder {
    target: String,
}

impl LogRecorder {
    /// Construct the recorder; `target` prefixes every line.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    fn format_value(v: &RecordValue) -> String {
        match v {
            RecordValue::Scalar(v) => format!("{}", v),
            RecordValue::DateTime(t) => t.to_rfc3339(),
            RecordValue::Array1(v) => format!("{:?}", v),
            RecordValue::String(s) => s.clone(),
        }
    }

    fn format(&self, record: &Record) -> String {
        let mut items = record.iter().collect::<Vec<_>>();
        items.sort_by(|a, b| a.0.cmp(b.0));
        let body = items
            .iter()
            .map(|(k, v)| format!("{}={}", k, Self::format_value(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{}] {}", self.target, body)
    }
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        info!("{}", self.format(&record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_sorted() {
        let recorder = LogRecorder::new("eval");
        let record = Record::from_slice(&[
            ("win_rate", RecordValue::Scalar(0.5)),
            ("env_steps", RecordValue::Scalar(10.0)),
        ]);
        assert_eq!(recorder.format(&record), "[eval] env_steps=10, win_rate=0.5");
    }

    #[test]
    fn timestamps_are_rfc3339() {
        use chrono::{Local, TimeZone};

        let recorder = LogRecorder::new("eval");
        let time = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let record = Record::from_slice(&[("time", RecordValue::DateTime(time))]);
        let line = recorder.format(&record);
        assert!(line.starts_with("[eval] time=2024-03-01T12:30:00"), "{}", line);
    }
}
