//! FTP uploader

use super::FtpSession;
use crate::config::FtpConfig;
use crate::etl::Uploader;
use eyre::{Result, WrapErr, eyre};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use suppaftp::types::FileType;

/// Uploader that stores a file in a directory of an FTP server
///
/// The remote file takes the local file's base name and is transferred in
/// binary mode. A failed transfer may leave a partial remote file behind.
pub struct FtpUploader {
    config: FtpConfig,
}

impl FtpUploader {
    pub fn new(config: FtpConfig) -> Self {
        Self { config }
    }
}

impl Uploader for FtpUploader {
    async fn upload(&self, file: &Path) -> Result<()> {
        let config = self.config.clone();
        let file = file.to_path_buf();

        // suppaftp is blocking; the pipeline still waits for the transfer to finish
        let bytes = tokio::task::spawn_blocking(move || upload_file(&config, &file))
            .await
            .wrap_err("FTP upload task failed")??;

        log::debug!("File successfully uploaded to FTP server ({} bytes)", bytes);
        Ok(())
    }
}

/// Upload `file` into the configured remote directory, returning the bytes sent
///
/// # Errors
/// Returns an error if connecting, logging in, changing directory, reading the
/// local file or storing it fails
pub fn upload_file(config: &FtpConfig, file: &Path) -> Result<u64> {
    let name = remote_file_name(file)?;

    log::debug!("Connecting to FTP server {}...", config.address());
    let mut session = FtpSession::open(config)?;

    session
        .cwd(config.directory.as_str())
        .wrap_err_with(|| format!("Failed to change to remote directory {}", config.directory))?;
    session
        .transfer_type(FileType::Binary)
        .wrap_err("Failed to switch to binary transfer mode")?;

    let mut reader = BufReader::new(
        File::open(file).wrap_err_with(|| format!("Failed to open {}", file.display()))?,
    );

    log::debug!("Uploading {} as {}/{}...", file.display(), config.directory, name);
    let bytes = session
        .put_file(name.as_str(), &mut reader)
        .wrap_err_with(|| format!("Failed to store {} on FTP server", name))?;

    session.close()?;
    Ok(bytes)
}

/// Name of the remote file: the local path's last component
pub fn remote_file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| eyre!("No file name in path: {}", path.display()))
}
