pub mod batch;
pub mod check;
pub mod files;
pub mod generate;
pub mod init;
pub mod preview;
pub mod sync;
