// low-level stdin framing: newline-delimited lines out of arbitrary chunks
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Splits a byte stream on `\n`, holding the unterminated tail between pushes.
///
/// Bytes rather than text are buffered so a multi-byte character split
/// across two chunks is reassembled before anyone decodes it.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        LineFramer::default()
    }

    /// Append a chunk and return every line it completed, in arrival order.
    /// Returned lines do not include the newline and may be blank.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);

        let Some(last_newline) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let tail = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, tail);
        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(<[u8]>::to_vec)
            .collect()
    }

    /// Flush the retained tail once the stream has ended.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        let rest = std::mem::take(&mut self.buffer);
        trim_line(&rest).map(<[u8]>::to_vec)
    }

    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

/// Trim surrounding whitespace; `None` when nothing is left to dispatch.
pub fn trim_line(line: &[u8]) -> Option<&[u8]> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// A reader paired with a framer.
pub struct FramedReader<R> {
    reader: R,
    framer: LineFramer,
    chunk: Vec<u8>,
}

impl<R> FramedReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        FramedReader {
            reader,
            framer: LineFramer::new(),
            chunk: vec![0u8; READ_CHUNK_SIZE],
        }
    }

    /// Read one chunk and return the lines it completed.
    /// `Ok(None)` means end of stream; take the tail with [`FramedReader::finish`].
    ///
    /// Cancel safe: nothing is consumed unless the underlying read completes.
    pub async fn read_lines(&mut self) -> std::io::Result<Option<Vec<Vec<u8>>>> {
        let n = self.reader.read(&mut self.chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        let lines = self.framer.push(&self.chunk[..n]);
        debug!(
            bytes = n,
            lines = lines.len(),
            buffered = self.framer.pending().len(),
            "input chunk framed"
        );
        Ok(Some(lines))
    }

    pub fn finish(&mut self) -> Option<Vec<u8>> {
        self.framer.finish()
    }
}
