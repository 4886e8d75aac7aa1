//! Exclusive capture devices (microphone, camera) behind a narrow trait.
//!
//! A [`CaptureSession`] holds the device from `start` until it is stopped or
//! discarded. Dropping a live session releases the device too, so every exit path
//! gives it back.

use std::path::PathBuf;
use thiserror::Error;

use crate::records::AudioBlob;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("permission to use the capture device was denied")]
    PermissionDenied,

    #[error("capture device is busy")]
    Busy,

    #[error("capture failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Hardware (or a stand-in) that produces media in chunks.
pub trait CaptureDevice: Send {
    fn mime_type(&self) -> &str;

    /// Acquire the device. Fails with [`CaptureError::PermissionDenied`] when access
    /// is refused.
    fn acquire(&mut self) -> Result<(), CaptureError>;

    /// Next chunk of captured bytes, or `None` when the device has nothing more.
    fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, CaptureError>;

    /// Give the device back. Must be safe to call on an already released device.
    fn release(&mut self);
}

pub struct CaptureSession<'d> {
    device: &'d mut dyn CaptureDevice,
    chunks: Vec<Vec<u8>>,
    released: bool,
}

impl<'d> CaptureSession<'d> {
    pub fn start(device: &'d mut dyn CaptureDevice) -> Result<Self, CaptureError> {
        device.acquire()?;
        tracing::debug!(mime = device.mime_type(), "capture started");
        Ok(Self {
            device,
            chunks: Vec::new(),
            released: false,
        })
    }

    /// Pull one chunk from the device. Returns `false` once the device is exhausted.
    pub fn poll(&mut self) -> Result<bool, CaptureError> {
        match self.device.read_chunk()? {
            Some(chunk) if !chunk.is_empty() => {
                self.chunks.push(chunk);
                Ok(true)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    /// Pull chunks until the device runs dry.
    pub fn drain(&mut self) -> Result<(), CaptureError> {
        while self.poll()? {}
        Ok(())
    }

    pub fn captured_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Stop capturing and assemble the final blob.
    pub fn stop(mut self) -> AudioBlob {
        self.release();
        AudioBlob {
            data: std::mem::take(&mut self.chunks).concat(),
            mime_type: self.device.mime_type().to_string(),
        }
    }

    /// Stop capturing and throw the recording away.
    pub fn discard(mut self) {
        self.release();
        self.chunks.clear();
    }

    fn release(&mut self) {
        if !self.released {
            self.device.release();
            self.released = true;
            tracing::debug!("capture device released");
        }
    }
}

impl Drop for CaptureSession<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Reads a recording from a file in fixed-size chunks. Used by the CLI in place of
/// a microphone.
pub struct FileDevice {
    path: PathBuf,
    mime_type: String,
    chunk_size: usize,
    data: Option<Vec<u8>>,
    offset: usize,
}

impl FileDevice {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
            chunk_size: 64 * 1024,
            data: None,
            offset: 0,
        }
    }

    /// Guess the MIME type from the file extension.
    pub fn guess_mime(path: &std::path::Path) -> &'static str {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("webm") => "audio/webm",
            Some("ogg" | "oga") => "audio/ogg",
            Some("mp3") => "audio/mpeg",
            Some("wav") => "audio/wav",
            Some("m4a" | "mp4") => "audio/mp4",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            _ => "application/octet-stream",
        }
    }
}

impl CaptureDevice for FileDevice {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn acquire(&mut self) -> Result<(), CaptureError> {
        if self.data.is_some() {
            return Err(CaptureError::Busy);
        }
        let data = std::fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => CaptureError::PermissionDenied,
            _ => CaptureError::Io(e),
        })?;
        self.data = Some(data);
        self.offset = 0;
        Ok(())
    }

    fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, CaptureError> {
        let Some(data) = &self.data else {
            return Ok(None);
        };
        if self.offset >= data.len() {
            return Ok(None);
        }
        let end = (self.offset + self.chunk_size).min(data.len());
        let chunk = data[self.offset..end].to_vec();
        self.offset = end;
        Ok(Some(chunk))
    }

    fn release(&mut self) {
        self.data = None;
        self.offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeMic {
        chunks: Vec<Vec<u8>>,
        deny: bool,
        held: bool,
        releases: Arc<AtomicUsize>,
    }

    impl FakeMic {
        fn new(chunks: Vec<Vec<u8>>) -> Self {
            Self {
                chunks,
                deny: false,
                held: false,
                releases: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl CaptureDevice for FakeMic {
        fn mime_type(&self) -> &str {
            "audio/webm"
        }

        fn acquire(&mut self) -> Result<(), CaptureError> {
            if self.deny {
                return Err(CaptureError::PermissionDenied);
            }
            self.held = true;
            Ok(())
        }

        fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, CaptureError> {
            if self.chunks.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.chunks.remove(0)))
            }
        }

        fn release(&mut self) {
            self.held = false;
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn stop_concatenates_chunks_and_releases() {
        let mut mic = FakeMic::new(vec![vec![1, 2], vec![], vec![3]]);
        let mut session = CaptureSession::start(&mut mic).unwrap();
        session.drain().unwrap();
        assert_eq!(session.captured_bytes(), 3);
        let blob = session.stop();

        assert_eq!(blob.data, vec![1, 2, 3]);
        assert_eq!(blob.mime_type, "audio/webm");
        assert!(!mic.held);
        assert_eq!(mic.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_and_discard_release_exactly_once() {
        let mut mic = FakeMic::new(vec![vec![1]]);
        {
            let mut session = CaptureSession::start(&mut mic).unwrap();
            session.poll().unwrap();
        }
        assert!(!mic.held);
        assert_eq!(mic.releases.load(Ordering::SeqCst), 1);

        CaptureSession::start(&mut mic).unwrap().discard();
        assert_eq!(mic.releases.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn denied_permission_surfaces_at_start() {
        let mut mic = FakeMic::new(vec![]);
        mic.deny = true;
        assert!(matches!(
            CaptureSession::start(&mut mic),
            Err(CaptureError::PermissionDenied)
        ));
        assert_eq!(mic.releases.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn file_device_streams_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.webm");
        std::fs::write(&path, vec![7u8; 150_000]).unwrap();

        let mut device = FileDevice::new(&path, FileDevice::guess_mime(&path));
        let mut session = CaptureSession::start(&mut device).unwrap();
        session.drain().unwrap();
        let blob = session.stop();
        assert_eq!(blob.data.len(), 150_000);
        assert_eq!(blob.mime_type, "audio/webm");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut device = FileDevice::new("/definitely/not/here.webm", "audio/webm");
        assert!(matches!(
            CaptureSession::start(&mut device),
            Err(CaptureError::Io(_))
        ));
    }
}
