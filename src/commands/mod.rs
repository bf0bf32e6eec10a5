pub mod cursor;
pub mod init;
pub mod options;
pub mod poll;
pub mod triggers;
