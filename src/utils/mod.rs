pub mod db_utils;
pub mod serial_cache;
pub mod serial_filter;
