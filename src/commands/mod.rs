pub mod convert;
pub mod init;
pub mod menu;
pub mod show;
