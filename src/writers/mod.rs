pub mod alert_sink;
pub mod csv_writer;

pub use alert_sink::{AlertSink, LineAlertSink};
pub use csv_writer::{write_dataset, ClassifiedRecordWriter, DatasetFiles};
