//! Destinations for validated leads.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::fs;

use crate::{config::SubmissionCfg, lead::LeadRecord};

/// Receives finalized leads.
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Deliver one lead; returns a short description of where it went.
    async fn submit(&self, lead: &LeadRecord) -> Result<String>;
}

/// Pick the sink configured in `[submission]`.
pub fn from_config(cfg: &SubmissionCfg) -> Result<Box<dyn LeadSink>> {
    if cfg.endpoint.trim().is_empty() {
        Ok(Box::new(OutboxSink::new(&cfg.outbox_dir)))
    } else {
        Ok(Box::new(HttpSink::new(
            cfg.endpoint.trim(),
            Duration::from_secs(cfg.timeout_secs),
        )?))
    }
}

/// Posts leads as multipart: a `lead` JSON part plus one `photos` part per file.
pub struct HttpSink {
    http: Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl LeadSink for HttpSink {
    async fn submit(&self, lead: &LeadRecord) -> Result<String> {
        // Lead metadata goes first as a JSON part.
        let meta = serde_json::to_string(lead)?;
        let mut form = reqwest::multipart::Form::new().part(
            "lead",
            reqwest::multipart::Part::text(meta).mime_str("application/json; charset=UTF-8")?,
        );

        // One `photos` part per attached file, keeping its file name.
        for path in &lead.photos {
            let bytes = fs::read(path)
                .await
                .with_context(|| format!("read photo {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "photo".into());
            form = form.part(
                "photos",
                reqwest::multipart::Part::bytes(bytes).file_name(name),
            );
        }

        let resp = self.http.post(&self.endpoint).multipart(form).send().await?;
        // Non-2xx is a failure; keep the body for the error text.
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_else(|_| "".into());
            return Err(anyhow!("HTTP status {status} error: {body}"));
        }
        Ok(self.endpoint.clone())
    }
}

/// Writes leads to `<dir>/<id>.json` and copies photos to `<dir>/<id>/`.
pub struct OutboxSink {
    dir: PathBuf,
}

impl OutboxSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl LeadSink for OutboxSink {
    async fn submit(&self, lead: &LeadRecord) -> Result<String> {
        fs::create_dir_all(&self.dir).await?;

        if !lead.photos.is_empty() {
            let photo_dir = self.dir.join(lead.id.to_string());
            if let Err(e) = copy_photos(&photo_dir, &lead.photos).await {
                // No half-filled photo folder survives a failed copy.
                if let Err(cleanup) = fs::remove_dir_all(&photo_dir).await {
                    tracing::warn!("cleanup of {} failed: {cleanup}", photo_dir.display());
                }
                return Err(e);
            }
        }

        // JSON last: its presence means the lead is complete.
        let file = self.dir.join(format!("{}.json", lead.id));
        let body = serde_json::to_vec_pretty(lead)?;
        fs::write(&file, body).await?;
        Ok(file.display().to_string())
    }
}

/// Copy photos into `dir` as `NN_<name>`.
async fn copy_photos(dir: &Path, photos: &[PathBuf]) -> Result<()> {
    fs::create_dir_all(dir).await?;
    for (i, path) in photos.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".into());
        // Prefix with the index so identical names do not collide.
        let target = dir.join(format!("{i:02}_{name}"));
        fs::copy(path, &target)
            .await
            .with_context(|| format!("copy photo {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::LeadForm;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// Accept one request, answer with `status` and `body`, return the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/leads", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            while !request_complete(&buf) {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let resp = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
            String::from_utf8_lossy(&buf).into_owned()
        });
        (url, handle)
    }

    /// Headers received and the body is as long as `Content-Length` says.
    fn request_complete(buf: &[u8]) -> bool {
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let body_len = buf.len() - (end + 4);
        match head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            Some(len) => body_len >= len,
            None => buf.ends_with(b"--\r\n"),
        }
    }

    fn record(photos: Vec<PathBuf>) -> LeadRecord {
        let form = LeadForm::new("Moscow")
            .with_make("Audi")
            .with_model("RS6")
            .with_year("2020")
            .with_mileage("30000")
            .with_name("Marina")
            .with_phone("79990001234");
        LeadRecord::from_form(&form, 1_234_567, photos)
    }

    #[tokio::test]
    async fn test_outbox_writes_json_and_photos() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("front.jpg");
        std::fs::write(&photo, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let outbox = dir.path().join("leads");
        let sink = OutboxSink::new(&outbox);
        let lead = record(vec![photo]);

        let dest = sink.submit(&lead).await.unwrap();
        assert!(dest.ends_with(&format!("{}.json", lead.id)));

        let saved: LeadRecord =
            serde_json::from_slice(&std::fs::read(outbox.join(format!("{}.json", lead.id))).unwrap())
                .unwrap();
        assert_eq!(saved.id, lead.id);
        assert_eq!(saved.estimate, 1_234_567);
        assert_eq!(saved.contact.phone, "+7 (999) 000-12-34");
        assert!(outbox.join(lead.id.to_string()).join("00_front.jpg").exists());
    }

    #[tokio::test]
    async fn test_outbox_fails_on_missing_photo() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutboxSink::new(dir.path());
        let lead = record(vec![dir.path().join("missing.jpg")]);
        assert!(sink.submit(&lead).await.is_err());
    }

    #[tokio::test]
    async fn test_outbox_removes_partial_photo_dir() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("front.jpg");
        std::fs::write(&photo, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let outbox = dir.path().join("leads");
        let sink = OutboxSink::new(&outbox);
        let lead = record(vec![photo, dir.path().join("missing.jpg")]);

        assert!(sink.submit(&lead).await.is_err());
        assert!(!outbox.join(lead.id.to_string()).exists());
        assert!(!outbox.join(format!("{}.json", lead.id)).exists());
    }

    #[tokio::test]
    async fn test_http_posts_lead_and_photo_parts() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("front.jpg");
        std::fs::write(&photo, b"jpeg-bytes").unwrap();

        let (url, server) = serve_once("200 OK", "").await;
        let sink = HttpSink::new(&url, Duration::from_secs(5)).unwrap();
        let lead = record(vec![photo]);

        let dest = sink.submit(&lead).await.unwrap();
        assert_eq!(dest, url);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /leads"));
        assert!(request.contains("multipart/form-data"));
        assert!(request.contains("name=\"lead\""));
        assert!(request.contains(&lead.id.to_string()));
        assert!(request.contains("name=\"photos\"; filename=\"front.jpg\""));
        assert!(request.contains("jpeg-bytes"));
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let (url, server) = serve_once("500 Internal Server Error", "boom").await;
        let sink = HttpSink::new(&url, Duration::from_secs(5)).unwrap();

        let err = sink.submit(&record(vec![])).await.unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("500"), "{text}");
        assert!(text.contains("boom"), "{text}");
        server.await.unwrap();
    }

    #[test]
    fn test_sink_choice_follows_endpoint() {
        let mut cfg = crate::config::Config::default().submission;
        assert!(from_config(&cfg).is_ok());
        cfg.endpoint = "http://127.0.0.1:9/leads".into();
        assert!(from_config(&cfg).is_ok());
    }
}
