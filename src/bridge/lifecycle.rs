//! Reading → Draining → Terminated.
//!
//! The coordinator is the only owner of the input framer, the set of
//! in-flight dispatches and the output stream. Dispatches run as tasks and
//! hand their response back through the `JoinSet`; the coordinator writes
//! each one as it completes, so output follows completion order.

use anyhow::Context;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::task::{JoinError, JoinSet};
use tracing::debug;

use crate::bridge::backend::RpcBackend;
use crate::bridge::dispatcher::Dispatcher;
use crate::bridge::framer::{trim_line, FramedReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Reading,
    Draining,
    Terminated,
}

pub struct Coordinator<R, W, B: ?Sized> {
    input: FramedReader<R>,
    output: W,
    dispatcher: Dispatcher<B>,
    // its length is the pending request count
    pending: JoinSet<Value>,
    state: LifecycleState,
}

impl<R, W, B> Coordinator<R, W, B>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin,
    B: RpcBackend + ?Sized + 'static,
{
    pub fn new(input: R, output: W, dispatcher: Dispatcher<B>) -> Self {
        Coordinator {
            input: FramedReader::new(input),
            output,
            dispatcher,
            pending: JoinSet::new(),
            state: LifecycleState::Reading,
        }
    }

    /// Run until input has ended and every dispatch has been answered.
    ///
    /// Errors are stream-level: a failed read, a failed write, or a
    /// dispatch task that panicked. Per-line failures never surface here.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match self.state {
                LifecycleState::Reading => self.step_reading().await?,
                LifecycleState::Draining => match self.pending.join_next().await {
                    Some(joined) => write_completion(&mut self.output, joined).await?,
                    None => self.transition(LifecycleState::Terminated),
                },
                LifecycleState::Terminated => return Ok(()),
            }
        }
    }

    async fn step_reading(&mut self) -> anyhow::Result<()> {
        tokio::select! {
            read = self.input.read_lines() => {
                match read.context("failed to read stdin")? {
                    Some(lines) => {
                        for line in lines {
                            self.spawn_dispatch(&line);
                        }
                    }
                    None => {
                        if let Some(tail) = self.input.finish() {
                            self.spawn_dispatch(&tail);
                        }
                        self.transition(LifecycleState::Draining);
                    }
                }
            }
            Some(joined) = self.pending.join_next(), if !self.pending.is_empty() => {
                write_completion(&mut self.output, joined).await?;
            }
        }
        Ok(())
    }

    fn spawn_dispatch(&mut self, line: &[u8]) {
        let Some(line) = trim_line(line) else {
            return;
        };
        let line = line.to_vec();
        let dispatcher = self.dispatcher.clone();
        self.pending
            .spawn(async move { dispatcher.dispatch(&line).await });
        debug!(pending = self.pending.len(), "dispatch started");
    }

    fn transition(&mut self, next: LifecycleState) {
        debug!(from = ?self.state, to = ?next, pending = self.pending.len(), "lifecycle");
        self.state = next;
    }
}

async fn write_completion<W>(output: &mut W, joined: Result<Value, JoinError>) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let response = joined.context("dispatch task failed")?;
    let mut line = serde_json::to_vec(&response).context("failed to encode response")?;
    line.push(b'\n');

    output
        .write_all(&line)
        .await
        .context("failed to write stdout")?;
    output.flush().await.context("failed to flush stdout")?;
    debug!(bytes = line.len(), "response written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::dispatcher::tests::ScriptedBackend;
    use std::io;
    use std::pin::Pin;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::task::{Context as TaskContext, Poll};
    use std::time::Duration;
    use tokio::io::ReadBuf;

    async fn bridge(input: &[u8], backend: Arc<ScriptedBackend>) -> anyhow::Result<Vec<String>> {
        let dispatcher = Dispatcher::new(backend, Duration::from_secs(60));
        let mut output = Vec::new();
        Coordinator::new(input, &mut output, dispatcher).run().await?;
        let text = String::from_utf8(output)?;
        Ok(text.lines().map(str::to_string).collect())
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin gone")))
        }
    }

    #[tokio::test]
    async fn test_ping_round_trip() {
        let backend = Arc::new(ScriptedBackend::default());
        let lines = bridge(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"pong\"}\n", backend)
            .await
            .unwrap();
        assert_eq!(lines, vec![r#"{"jsonrpc":"2.0","id":1,"result":"pong"}"#]);
    }

    #[tokio::test]
    async fn test_malformed_line_yields_error_line() {
        let backend = Arc::new(ScriptedBackend::default());
        let lines = bridge(b"not-json\n", backend.clone()).await.unwrap();

        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":""#
        ));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_lines_are_ignored() {
        let backend = Arc::new(ScriptedBackend::default());
        let lines = bridge(b"\n   \n\t\r\n\n", backend.clone()).await.unwrap();

        assert!(lines.is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_trailing_segment_dispatched_once() {
        let backend = Arc::new(ScriptedBackend::default());
        let input = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"a\"}\n{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"b\"}";
        let mut lines = bridge(input, backend.clone()).await.unwrap();
        lines.sort();

        assert_eq!(
            lines,
            vec![
                r#"{"jsonrpc":"2.0","id":1,"result":"a"}"#,
                r#"{"jsonrpc":"2.0","id":2,"result":"b"}"#,
            ]
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_input_terminates_cleanly() {
        let backend = Arc::new(ScriptedBackend::default());
        let lines = bridge(b"", backend).await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_order_not_input_order() {
        let backend = Arc::new(ScriptedBackend::default());
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"slow","params":{"delay_ms":90000}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"fast"}"#,
            "\n",
        );
        let lines = bridge(input.as_bytes(), backend).await.unwrap();

        assert_eq!(
            lines,
            vec![
                r#"{"jsonrpc":"2.0","id":2,"result":"fast"}"#.to_string(),
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32603,"message":"Request timeout"}}"#
                    .to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_draining_waits_for_in_flight_requests() {
        let backend = Arc::new(ScriptedBackend::default());
        let input = br#"{"jsonrpc":"2.0","id":"late","method":"late","params":{"delay_ms":30000}}"#;
        let lines = bridge(input, backend).await.unwrap();
        assert_eq!(lines, vec![r#"{"jsonrpc":"2.0","id":"late","result":"late"}"#]);
    }

    #[tokio::test]
    async fn test_input_error_is_fatal() {
        let backend = Arc::new(ScriptedBackend::default());
        let dispatcher = Dispatcher::new(backend, Duration::from_secs(60));
        let mut output = Vec::new();

        let err = Coordinator::new(FailingReader, &mut output, dispatcher)
            .run()
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("stdin gone"));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_dispatch_is_fatal() {
        let backend = Arc::new(ScriptedBackend::default());
        let result = bridge(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"panic\"}\n", backend).await;
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("dispatch task failed"));
    }
}
