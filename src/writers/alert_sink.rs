use std::io::Write;
use tracing::info;

use crate::error::Result;
use crate::models::AlertSignal;

/// Destination for alert signals, e.g. an LED driver or a broker publisher
pub trait AlertSink {
    fn emit(&mut self, signal: AlertSignal) -> Result<()>;
}

/// Writes one `on`/`off` line per signal
pub struct LineAlertSink<W: Write> {
    output: W,
    topic: String,
}

impl<W: Write> LineAlertSink<W> {
    pub fn new(output: W, topic: impl Into<String>) -> Self {
        Self {
            output,
            topic: topic.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> AlertSink for LineAlertSink<W> {
    fn emit(&mut self, signal: AlertSignal) -> Result<()> {
        writeln!(self.output, "{}", signal)?;
        self.output.flush()?;
        if signal == AlertSignal::On {
            info!(topic = %self.topic, "alert raised");
        }
        Ok(())
    }
}

impl AlertSink for Vec<AlertSignal> {
    fn emit(&mut self, signal: AlertSignal) -> Result<()> {
        self.push(signal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_sink_output() {
        let mut sink = LineAlertSink::new(Vec::new(), "test/alerta");
        sink.emit(AlertSignal::On).unwrap();
        sink.emit(AlertSignal::Off).unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "on\noff\n");
    }

    #[test]
    fn test_collecting_sink() {
        let mut signals: Vec<AlertSignal> = Vec::new();
        signals.emit(AlertSignal::Off).unwrap();
        assert_eq!(signals, vec![AlertSignal::Off]);
    }
}
