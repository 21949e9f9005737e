pub mod attendance;
pub mod dashboard;
pub mod device;
pub mod division;
pub mod employee;
pub mod monitor;
pub mod office;
pub mod on_leave;
pub mod unknown_serial;
