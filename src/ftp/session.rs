//! Scoped FTP control connection

use crate::config::FtpConfig;
use eyre::{Result, WrapErr};
use std::ops::{Deref, DerefMut};
use suppaftp::FtpStream;

/// An open FTP control connection that is always closed
///
/// [`close`](FtpSession::close) sends `QUIT` and reports its outcome. If the
/// session is dropped without being closed, `QUIT` is still sent and any
/// error is only logged.
pub struct FtpSession {
    stream: FtpStream,
    closed: bool,
}

impl FtpSession {
    /// Open the control connection and log in
    pub fn open(config: &FtpConfig) -> Result<Self> {
        let stream = FtpStream::connect(config.address())
            .wrap_err_with(|| format!("Failed to connect to FTP server {}", config.address()))?;
        let mut session = Self {
            stream,
            closed: false,
        };

        session
            .stream
            .login(config.user.as_str(), config.password.as_str())
            .wrap_err_with(|| format!("Failed to log in to FTP server as {}", config.user))?;

        Ok(session)
    }

    /// Send `QUIT` and close the connection
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.stream
            .quit()
            .wrap_err("Failed to close FTP connection")
    }
}

impl Deref for FtpSession {
    type Target = FtpStream;

    fn deref(&self) -> &Self::Target {
        &self.stream
    }
}

impl DerefMut for FtpSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.stream
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.stream.quit() {
            log::debug!("Ignoring error while closing FTP connection: {}", e);
        }
    }
}
