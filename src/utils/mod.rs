pub mod fs;

pub use fs::{read_lines, write_lines, LineSequence};
