//! Integration tests for FTP uploads
//!
//! A minimal in-process FTP server records every command it receives and
//! the files stored through it.

use eyre::Result;
use pg_ftp_export::etl::{Extractor, Pipeline, Uploader};
use pg_ftp_export::ftp::FtpUploader;
use pg_ftp_export::storage::JsonFileWriter;
use pg_ftp_export::transform::ValueCoercer;
use pg_ftp_export::{ColumnValue, FtpConfig, Record, Stage};
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::JoinHandle;
use tempfile::TempDir;

const PASSWORD: &str = "secret";
const DIRECTORY: &str = "/exports";

#[derive(Debug, Default)]
struct Transcript {
    commands: Vec<String>,
    stored: Vec<(String, Vec<u8>)>,
}

struct FakeFtpServer {
    addr: SocketAddr,
    handle: JoinHandle<Transcript>,
}

impl FakeFtpServer {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || serve(listener));
        Self { addr, handle }
    }

    fn config(&self, password: &str) -> FtpConfig {
        FtpConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            user: "uploader".to_string(),
            password: password.to_string(),
            directory: DIRECTORY.to_string(),
        }
    }

    fn finish(self) -> Transcript {
        self.handle.join().unwrap()
    }
}

fn reply(stream: &mut TcpStream, line: &str) {
    write!(stream, "{}\r\n", line).unwrap();
    stream.flush().unwrap();
}

fn serve(listener: TcpListener) -> Transcript {
    let mut transcript = Transcript::default();
    let (mut control, _) = listener.accept().unwrap();
    let mut reader = BufReader::new(control.try_clone().unwrap());
    let mut data_listener: Option<TcpListener> = None;

    reply(&mut control, "220 fake ftp ready");

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap() == 0 {
            break;
        }
        let line = line.trim_end().to_string();
        transcript.commands.push(line.clone());
        let (command, arg) = line.split_once(' ').unwrap_or((line.as_str(), ""));

        match command.to_ascii_uppercase().as_str() {
            "USER" => reply(&mut control, "331 password required"),
            "PASS" if arg == PASSWORD => reply(&mut control, "230 logged in"),
            "PASS" => reply(&mut control, "530 login incorrect"),
            "CWD" if arg == DIRECTORY => reply(&mut control, "250 directory changed"),
            "CWD" => reply(&mut control, "550 no such directory"),
            "TYPE" => reply(&mut control, "200 type set"),
            "PASV" => {
                let data = TcpListener::bind("127.0.0.1:0").unwrap();
                let port = data.local_addr().unwrap().port();
                reply(
                    &mut control,
                    &format!(
                        "227 Entering Passive Mode (127,0,0,1,{},{})",
                        port >> 8,
                        port & 0xff
                    ),
                );
                data_listener = Some(data);
            }
            "STOR" => {
                reply(&mut control, "150 ok to send data");
                let (mut data, _) = data_listener.take().unwrap().accept().unwrap();
                let mut content = Vec::new();
                data.read_to_end(&mut content).unwrap();
                transcript.stored.push((arg.to_string(), content));
                reply(&mut control, "226 transfer complete");
            }
            "QUIT" => {
                reply(&mut control, "221 bye");
                break;
            }
            _ => reply(&mut control, "502 command not implemented"),
        }
    }

    transcript
}

#[tokio::test]
async fn test_upload_stores_file_under_base_name() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let local = temp_dir.path().join("saved_data");
    std::fs::create_dir_all(&local)?;
    let file = local.join("pg_data.json");
    std::fs::write(&file, b"[\n    {\"id\": 1}\n]\n")?;

    let server = FakeFtpServer::start();
    FtpUploader::new(server.config(PASSWORD))
        .upload(&file)
        .await?;
    let transcript = server.finish();

    assert_eq!(
        transcript.commands,
        vec![
            "USER uploader",
            "PASS secret",
            "CWD /exports",
            "TYPE I",
            "PASV",
            "STOR pg_data.json",
            "QUIT",
        ]
    );
    assert_eq!(transcript.stored.len(), 1);
    assert_eq!(transcript.stored[0].0, "pg_data.json");
    assert_eq!(transcript.stored[0].1, std::fs::read(&file)?);

    Ok(())
}

#[tokio::test]
async fn test_login_failure_still_closes_connection() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("pg_data.json");
    std::fs::write(&file, b"[]\n")?;

    let server = FakeFtpServer::start();
    let err = FtpUploader::new(server.config("wrong"))
        .upload(&file)
        .await
        .unwrap_err();
    let transcript = server.finish();

    assert!(err.to_string().contains("Failed to log in to FTP server as uploader"));
    assert_eq!(transcript.commands.last().map(String::as_str), Some("QUIT"));
    assert!(transcript.stored.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_missing_remote_directory_skips_transfer() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("pg_data.json");
    std::fs::write(&file, b"[]\n")?;

    let server = FakeFtpServer::start();
    let mut config = server.config(PASSWORD);
    config.directory = "/missing".to_string();

    let err = FtpUploader::new(config).upload(&file).await.unwrap_err();
    let transcript = server.finish();

    assert!(err.to_string().contains("Failed to change to remote directory /missing"));
    assert!(!transcript.commands.iter().any(|c| c.starts_with("STOR")));
    assert_eq!(transcript.commands.last().map(String::as_str), Some("QUIT"));

    Ok(())
}

struct UsersExtractor;

impl Extractor for UsersExtractor {
    type Item = Record;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        Ok(vec![
            [
                ("id", ColumnValue::Integer(1)),
                ("name", ColumnValue::Text("Ann".to_string())),
            ]
            .into_iter()
            .collect(),
            [
                ("id", ColumnValue::Integer(2)),
                ("name", ColumnValue::Text("Bo".to_string())),
            ]
            .into_iter()
            .collect(),
        ])
    }
}

#[tokio::test]
async fn test_export_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("saved_data").join("pg_data.json");

    let server = FakeFtpServer::start();
    let pipeline = Pipeline::new(
        UsersExtractor,
        ValueCoercer,
        JsonFileWriter::new(&file),
        FtpUploader::new(server.config(PASSWORD)),
    );

    let summary = pipeline.run().await?;
    let transcript = server.finish();

    assert_eq!(summary.records, 2);
    assert_eq!(summary.file, file);

    let expected = json!([{"id": 1, "name": "Ann"}, {"id": 2, "name": "Bo"}]);
    let local: Value = serde_json::from_slice(&std::fs::read(&file)?)?;
    assert_eq!(local, expected);

    assert_eq!(transcript.stored.len(), 1);
    let (name, content) = &transcript.stored[0];
    assert_eq!(name, "pg_data.json");
    let remote: Value = serde_json::from_slice(content)?;
    assert_eq!(remote, expected);

    Ok(())
}

#[tokio::test]
async fn test_export_reports_upload_stage() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("pg_data.json");

    let server = FakeFtpServer::start();
    let pipeline = Pipeline::new(
        UsersExtractor,
        ValueCoercer,
        JsonFileWriter::new(&file),
        FtpUploader::new(server.config("wrong")),
    );

    let err = pipeline.run().await.unwrap_err();
    server.finish();

    assert_eq!(err.stage, Stage::Upload);
    assert!(err.to_string().starts_with("upload step failed"));
    // The local export is kept after a failed upload
    assert!(file.exists());

    Ok(())
}
