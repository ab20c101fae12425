pub mod buffer;
pub mod connectivity;
pub mod log;
pub mod reconcile;
pub mod scan;
pub mod submission;
pub mod timer;
