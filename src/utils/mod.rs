pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::{quantize, round_to, GridQuantizer, QuantizedLocation};
pub use filename::generate_default_dataset_dir;
pub use progress::ProgressReporter;
