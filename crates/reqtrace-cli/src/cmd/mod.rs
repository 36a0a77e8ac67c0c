pub mod changelog;
pub mod check;
pub mod gaps;
pub mod init;
pub mod matrix;
pub mod scan;
