//! Validation Engine
//!
//! Clean separation of scanning logic from parsing and reporting concerns.

pub mod scanner;

pub use scanner::{
    scan, scan_all, scan_all_cancellable, scan_parallel, CancellationFlag, ScanError, Violation,
};
