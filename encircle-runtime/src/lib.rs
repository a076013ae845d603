pub mod memory;
pub mod suites;
pub use memory::PeakAlloc;
pub use suites::{measure, run_suite, Measurement, Suite};
