pub mod attendance;
pub mod exam;
pub mod incident;
pub mod student;
