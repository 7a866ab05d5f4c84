use std::collections::VecDeque;
use std::io::{Read, Seek, SeekFrom};

use flume::{Receiver, Sender};
use reqwest::Client;
use tracing::debug;

use crate::http::HttpError;

// Rolling window kept behind the read position so the decoder can probe
// backwards; live streams have no other seek target.
const BACK_BUFFER: usize = 512 * 1024;

enum Chunk {
    Data(Vec<u8>),
    End,
    Failed(String),
}

/// An endless HTTP stream exposed as a blocking reader for the decoder.
/// A background task pulls response chunks into a bounded channel; stream
/// faults are reported out-of-band through `fault_tx` as well as to the
/// reader itself.
pub struct LiveDataSource {
    chunk_rx: Receiver<Chunk>,
    buffer: VecDeque<u8>,
    start_pos: u64,
    position: u64,
    eof: bool,
    _task: tokio::task::JoinHandle<()>,
}

impl LiveDataSource {
    pub async fn new(
        client: Client,
        url: &str,
        fault_tx: Sender<String>,
    ) -> Result<Self, HttpError> {
        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(HttpError::Status(response.status()));
        }

        let (chunk_tx, chunk_rx) = flume::bounded(32);
        let task = tokio::spawn(async move {
            let mut response = response;
            loop {
                match response.chunk().await {
                    Ok(Some(bytes)) => {
                        if chunk_tx.send_async(Chunk::Data(bytes.to_vec())).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        let _ = chunk_tx.send_async(Chunk::End).await;
                        break;
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        let _ = fault_tx.send(reason.clone());
                        let _ = chunk_tx.send_async(Chunk::Failed(reason)).await;
                        break;
                    }
                }
            }
        });

        Ok(Self {
            chunk_rx,
            buffer: VecDeque::new(),
            start_pos: 0,
            position: 0,
            eof: false,
            _task: task,
        })
    }

    fn buffered_end(&self) -> u64 {
        self.start_pos + self.buffer.len() as u64
    }

    fn read_buffered(&mut self, buf: &mut [u8]) -> usize {
        let offset = (self.position - self.start_pos) as usize;
        let available = self.buffer.len() - offset;
        let len = buf.len().min(available);

        let (front, back) = self.buffer.as_slices();
        if offset + len <= front.len() {
            buf[..len].copy_from_slice(&front[offset..offset + len]);
        } else {
            let mut copied = 0;
            if offset < front.len() {
                let head = &front[offset..];
                buf[..head.len()].copy_from_slice(head);
                copied = head.len();
            }
            let need = len - copied;
            let start = offset.saturating_sub(front.len());
            buf[copied..len].copy_from_slice(&back[start..start + need]);
        }

        self.position += len as u64;
        len
    }

    fn trim_back_buffer(&mut self) {
        let keep_from = self.position.saturating_sub(BACK_BUFFER as u64);
        if keep_from <= self.start_pos {
            return;
        }
        let drop = ((keep_from - self.start_pos) as usize).min(self.buffer.len());
        self.buffer.drain(..drop);
        self.start_pos += drop as u64;
    }
}

impl Read for LiveDataSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.position < self.buffered_end() {
                let len = self.read_buffered(buf);
                self.trim_back_buffer();
                return Ok(len);
            }

            if self.eof {
                return Ok(0);
            }

            match self.chunk_rx.recv() {
                Ok(Chunk::Data(bytes)) => self.buffer.extend(bytes),
                Ok(Chunk::End) | Err(_) => self.eof = true,
                Ok(Chunk::Failed(reason)) => {
                    debug!("live stream fault: {reason}");
                    return Err(std::io::Error::other(reason));
                }
            }
        }
    }
}

impl Seek for LiveDataSource {
    fn seek(&mut self, from: SeekFrom) -> std::io::Result<u64> {
        let target = match from {
            SeekFrom::Start(offset) => offset,
            SeekFrom::Current(delta) => {
                if delta >= 0 {
                    self.position.saturating_add(delta as u64)
                } else {
                    self.position.saturating_sub(delta.unsigned_abs())
                }
            }
            SeekFrom::End(_) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "live stream has no end",
                ));
            }
        };

        if target < self.start_pos || target > self.buffered_end() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "seek target outside the buffered window",
            ));
        }

        self.position = target;
        Ok(target)
    }
}

impl Drop for LiveDataSource {
    fn drop(&mut self) {
        self._task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_with_chunks(chunks: Vec<Chunk>) -> LiveDataSource {
        let (tx, rx) = flume::unbounded();
        for chunk in chunks {
            tx.send(chunk).unwrap();
        }
        drop(tx);
        LiveDataSource {
            chunk_rx: rx,
            buffer: VecDeque::new(),
            start_pos: 0,
            position: 0,
            eof: false,
            _task: tokio::spawn(async {}),
        }
    }

    #[tokio::test]
    async fn reads_chunks_in_order_until_end() {
        let mut source = source_with_chunks(vec![
            Chunk::Data(vec![1, 2, 3]),
            Chunk::Data(vec![4, 5]),
            Chunk::End,
        ]);

        let mut out = Vec::new();
        source.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn seeking_back_within_the_window_replays_bytes() {
        let mut source = source_with_chunks(vec![Chunk::Data(vec![1, 2, 3, 4]), Chunk::End]);

        let mut buf = [0u8; 4];
        source.read(&mut buf).unwrap();
        source.seek(SeekFrom::Start(1)).unwrap();

        let mut tail = [0u8; 3];
        source.read(&mut tail).unwrap();
        assert_eq!(tail, [2, 3, 4]);
    }

    #[tokio::test]
    async fn seeking_past_the_buffer_is_unsupported() {
        let mut source = source_with_chunks(vec![Chunk::Data(vec![1]), Chunk::End]);
        let mut buf = [0u8; 1];
        source.read(&mut buf).unwrap();
        assert!(source.seek(SeekFrom::Start(100)).is_err());
        assert!(source.seek(SeekFrom::End(0)).is_err());
    }

    #[tokio::test]
    async fn stream_fault_surfaces_as_a_read_error() {
        let mut source = source_with_chunks(vec![
            Chunk::Data(vec![1]),
            Chunk::Failed("connection reset".to_string()),
        ]);

        let mut buf = [0u8; 1];
        source.read(&mut buf).unwrap();
        assert!(source.read(&mut buf).is_err());
    }
}
