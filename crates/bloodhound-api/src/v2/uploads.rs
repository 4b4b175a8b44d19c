// File ingest: start a job, upload chunks, end the job
//
// Chunks are posted as multipart forms shaped like a resumable.js upload:
// a `file` part named `chunk.zip` plus 1-based `resumableChunkNumber` and
// `resumableTotalChunks` fields. Chunks go out strictly in order.

use std::path::Path;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::error::Error;
use crate::v2::client::{BloodHoundClient, RequestBody};
use crate::v2::envelope::DataEnvelope;
use crate::v2::models::FileUploadJob;

/// Default chunk size for [`BloodHoundClient::ingest`].
pub const DEFAULT_CHUNK_SIZE: usize = 5 * 1024 * 1024;

impl BloodHoundClient {
    /// Open a file-upload job.
    ///
    /// `POST /api/v2/file-upload/start`
    pub async fn start_file_upload(&self) -> Result<FileUploadJob, Error> {
        debug!("starting file upload job");
        let resp = self
            .execute(Method::POST, &["file-upload", "start"], &[], RequestBody::Empty)
            .await?;
        let envelope: DataEnvelope<FileUploadJob> = Self::decode(&resp)?;
        debug!(job_id = envelope.data.id, "file upload job started");
        Ok(envelope.data)
    }

    /// Upload one chunk. `chunk_number` is 1-based.
    ///
    /// `POST /api/v2/file-upload/{job}`
    pub async fn upload_file_chunk(
        &self,
        job_id: i64,
        chunk: &[u8],
        chunk_number: usize,
        total_chunks: usize,
    ) -> Result<(), Error> {
        if chunk_number == 0 || chunk_number > total_chunks {
            return Err(Error::InvalidArgument(format!(
                "chunk {chunk_number} is outside 1..={total_chunks}"
            )));
        }

        let part = Part::bytes(chunk.to_vec())
            .file_name("chunk.zip")
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .part("file", part)
            .text("resumableChunkNumber", chunk_number.to_string())
            .text("resumableTotalChunks", total_chunks.to_string());

        let job = job_id.to_string();
        debug!(job_id, chunk_number, total_chunks, bytes = chunk.len(), "uploading chunk");
        self.execute(
            Method::POST,
            &["file-upload", job.as_str()],
            &[],
            RequestBody::Multipart(form),
        )
        .await?;
        Ok(())
    }

    /// Close a job so the server starts ingesting it.
    ///
    /// `POST /api/v2/file-upload/{job}/end`
    pub async fn end_file_upload(&self, job_id: i64) -> Result<(), Error> {
        let job = job_id.to_string();
        debug!(job_id, "ending file upload job");
        self.execute(
            Method::POST,
            &["file-upload", job.as_str(), "end"],
            &[],
            RequestBody::Empty,
        )
        .await?;
        Ok(())
    }

    /// Upload `data` as a complete job: start, every chunk in order, end.
    ///
    /// A failed chunk aborts the sequence; the job is left open.
    pub async fn ingest(&self, data: &[u8], chunk_size: usize) -> Result<FileUploadJob, Error> {
        if data.is_empty() {
            return Err(Error::InvalidArgument("nothing to upload".into()));
        }
        if chunk_size == 0 {
            return Err(Error::InvalidArgument("chunk size must be positive".into()));
        }

        let job = self.start_file_upload().await?;
        let total = data.len().div_ceil(chunk_size);
        for (index, chunk) in data.chunks(chunk_size).enumerate() {
            self.upload_file_chunk(job.id, chunk, index + 1, total)
                .await?;
        }
        self.end_file_upload(job.id).await?;

        info!(job_id = job.id, chunks = total, bytes = data.len(), "ingest upload complete");
        Ok(job)
    }

    /// Read a collector archive from disk and [`ingest`](Self::ingest) it.
    pub async fn ingest_file(&self, path: &Path, chunk_size: usize) -> Result<FileUploadJob, Error> {
        debug!(path = %path.display(), "reading ingest file");
        let data = tokio::fs::read(path).await?;
        self.ingest(&data, chunk_size).await
    }
}
