//! FTP destination
//!
//! Transfers the export file to a directory on an FTP server.

mod session;
mod uploader;

pub use session::FtpSession;
pub use uploader::{FtpUploader, remote_file_name, upload_file};
