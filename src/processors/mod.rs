pub mod aggregator;
pub mod aggregator_service;
pub mod dataset_builder;
pub mod grid_mapper;
pub mod hourly_window;
pub mod partitioner;
pub mod peak_reducer;

pub use aggregator::{IngestMode, StreamingAggregator};
pub use aggregator_service::{AggregatorHandle, AggregatorService};
pub use dataset_builder::{classified_record, DatasetBuilder};
pub use grid_mapper::GridMapper;
pub use hourly_window::ReadingWindow;
pub use partitioner::{partition, partition_of, Dataset, Partition};
pub use peak_reducer::{Peak, PeakReducer};
