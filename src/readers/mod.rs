pub mod record_parser;
pub mod training_reader;

pub use record_parser::RecordParser;
pub use training_reader::TrainingReader;
