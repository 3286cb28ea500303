//! Prompt enhancement from a streaming rewrite service.
//!
//! The service rewrites the user's input chunk by chunk. Each chunk is
//! appended to an accumulator that is published to the input field as
//! it grows, and the original text is kept so a mid-stream failure can
//! restore it verbatim.

use tokio::sync::mpsc;

use super::GenerateError;

/// - `Partial` replaces the input field with the text so far.
/// - `Done` carries the final enhanced text.
/// - `Failed` restores the original input and surfaces the error.
#[derive(Debug, Clone, PartialEq)]
pub enum EnhanceUpdate {
    Partial(String),
    Done(String),
    Failed { original: String, error: String },
}

/// Accumulates a chunked rewrite of one prompt. The session owns the
/// original text for the lifetime of the stream.
#[derive(Debug)]
pub struct EnhanceSession {
    original: String,
    accumulated: String,
}

impl EnhanceSession {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            accumulated: String::new(),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Append a chunk and return the update to publish.
    pub fn push_chunk(&mut self, chunk: &str) -> EnhanceUpdate {
        self.accumulated.push_str(chunk);
        EnhanceUpdate::Partial(self.accumulated.clone())
    }

    /// Close the stream. An empty rewrite falls back to the original.
    pub fn finish(self) -> EnhanceUpdate {
        if self.accumulated.trim().is_empty() {
            EnhanceUpdate::Done(self.original)
        } else {
            EnhanceUpdate::Done(self.accumulated)
        }
    }

    pub fn fail(self, error: &GenerateError) -> EnhanceUpdate {
        EnhanceUpdate::Failed {
            original: self.original,
            error: error.to_string(),
        }
    }
}

/// Drive a chunk stream to completion, publishing one update per
/// received chunk plus a terminal `Done` or `Failed`.
pub async fn consume_stream(
    original: String,
    mut chunks: mpsc::Receiver<Result<String, GenerateError>>,
    mut publish: impl FnMut(EnhanceUpdate),
) {
    let mut session = EnhanceSession::new(original);
    while let Some(item) = chunks.recv().await {
        match item {
            Ok(chunk) => {
                let update = session.push_chunk(&chunk);
                publish(update);
            }
            Err(error) => {
                publish(session.fail(&error));
                return;
            }
        }
    }
    publish(session.finish());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_accumulate_in_order() {
        let mut session = EnhanceSession::new("a cube");
        assert_eq!(
            session.push_chunk("a precise"),
            EnhanceUpdate::Partial("a precise".to_string())
        );
        assert_eq!(
            session.push_chunk(" 10mm cube"),
            EnhanceUpdate::Partial("a precise 10mm cube".to_string())
        );
        assert_eq!(
            session.finish(),
            EnhanceUpdate::Done("a precise 10mm cube".to_string())
        );
    }

    #[test]
    fn test_failure_restores_original() {
        let mut session = EnhanceSession::new("a cube");
        session.push_chunk("a pre");
        let update = session.fail(&GenerateError::Network("reset".into()));
        match update {
            EnhanceUpdate::Failed { original, .. } => assert_eq!(original, "a cube"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_stream_falls_back_to_original() {
        let session = EnhanceSession::new("a cube");
        assert_eq!(session.finish(), EnhanceUpdate::Done("a cube".to_string()));
    }

    #[tokio::test]
    async fn test_stream_publishes_every_chunk() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Ok("one ".to_string())).await.unwrap();
        tx.send(Ok("two".to_string())).await.unwrap();
        drop(tx);

        let mut updates = Vec::new();
        consume_stream("orig".to_string(), rx, |u| updates.push(u)).await;

        assert_eq!(
            updates,
            vec![
                EnhanceUpdate::Partial("one ".to_string()),
                EnhanceUpdate::Partial("one two".to_string()),
                EnhanceUpdate::Done("one two".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_error_ends_with_restore() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Ok("partial".to_string())).await.unwrap();
        tx.send(Err(GenerateError::Network("dropped".into())))
            .await
            .unwrap();
        drop(tx);

        let mut updates = Vec::new();
        consume_stream("orig".to_string(), rx, |u| updates.push(u)).await;

        assert_eq!(updates.len(), 2);
        assert!(matches!(updates[1], EnhanceUpdate::Failed { ref original, .. } if original == "orig"));
    }
}
