pub mod barcode;
pub mod config;
pub mod db;
pub mod exams;
pub mod incident;
pub mod incidents;
pub mod init;
pub mod log;
pub mod login;
pub mod logout;
pub mod mark;
pub mod report;
pub mod scan;
pub mod status;
pub mod students;
pub mod sync;
pub mod timer;
pub mod watch;
