pub mod attendance;
pub mod device;
pub mod division;
pub mod employee;
pub mod office;
pub mod on_leave;
pub mod role;
pub mod unknown_serial;
pub mod user;
