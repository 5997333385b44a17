pub mod atomic;
pub mod csv;
pub mod store;

pub use self::csv::{CsvEmitter, CsvOutput, FileOutput, StagedCsv};
pub use atomic::{write_bytes_atomic, write_json_atomic};
pub use store::DatasetStore;
