//! Transport layer for the line protocol.
//!
//! Reads newline-delimited JSON requests and writes one response line per
//! request. Generic over the reader and writer so tests can drive it with
//! in-memory buffers; the binary uses stdin and stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::handler::RequestHandler;
use super::responses::{ErrorBody, Response};
use crate::error::AppError;

/// Configuration for transport options.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum accepted line length in bytes.
    pub max_line_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Line-delimited JSON transport.
#[derive(Debug, Default)]
pub struct LineTransport {
    config: TransportConfig,
}

impl LineTransport {
    /// Creates a new transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new transport with custom configuration.
    #[must_use]
    pub const fn with_config(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Serve requests until `reader` reaches end of input.
    ///
    /// Blank lines are skipped. Oversized, non-UTF-8 or malformed lines get
    /// an error response; the loop keeps going. At most `max_line_bytes + 1`
    /// bytes of a line are buffered. Returns the number of responses written.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] if reading or writing fails.
    pub async fn serve<R, W>(
        &self,
        handler: &RequestHandler,
        mut reader: R,
        mut writer: W,
    ) -> Result<u64, AppError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let max_line_bytes = self.config.max_line_bytes;
        let limit = u64::try_from(max_line_bytes).unwrap_or(u64::MAX).saturating_add(1);
        let mut buf = Vec::new();
        let mut handled = 0u64;

        loop {
            buf.clear();
            let read = (&mut reader)
                .take(limit)
                .read_until(b'\n', &mut buf)
                .await
                .map_err(io_error)?;
            if read == 0 {
                break;
            }

            let terminated = buf.last() == Some(&b'\n');
            if terminated {
                buf.pop();
            }

            let response = if buf.len() > max_line_bytes {
                skip_line(&mut reader).await?;
                tracing::warn!(max_line_bytes, "request line too long");
                Response::error(ErrorBody::bad_request(format!(
                    "request line exceeds {max_line_bytes} bytes"
                )))
            } else {
                match std::str::from_utf8(&buf) {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => handler.handle_line(line.trim()).await,
                    Err(e) => {
                        tracing::warn!(error = %e, "request line is not valid UTF-8");
                        Response::error(ErrorBody::bad_request(format!(
                            "request line is not valid UTF-8: {e}"
                        )))
                    }
                }
            };

            let mut out = response.to_line();
            out.push('\n');
            writer.write_all(out.as_bytes()).await.map_err(io_error)?;
            writer.flush().await.map_err(io_error)?;
            handled += 1;
        }

        tracing::debug!(handled, "input closed");
        Ok(handled)
    }
}

/// Discard input up to and including the next newline.
async fn skip_line<R>(reader: &mut R) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await.map_err(io_error)?;
        if available.is_empty() {
            return Ok(());
        }
        let (consumed, done) = match available.iter().position(|&b| b == b'\n') {
            Some(end) => (end + 1, true),
            None => (available.len(), false),
        };
        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

fn io_error(e: std::io::Error) -> AppError {
    AppError::Io {
        message: e.to_string(),
    }
}
