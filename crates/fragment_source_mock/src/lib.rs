//! Deterministic mock implementation of the `fragment_source` contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and contract-level integration testing. Emission is fully
//! synchronous; fragments are split at whitespace boundaries so downstream
//! assembly sees realistic token-shaped chunks.

use fragment_source::{FragmentEvent, FragmentSource, StreamRequest};

/// Deterministic mock source used by tests and local runs.
#[derive(Debug)]
pub struct MockSource {
    chunks: Vec<String>,
    failure: Option<String>,
}

impl MockSource {
    /// Creates a mock source with caller-provided chunks.
    #[must_use]
    pub fn new(chunks: Vec<String>) -> Self {
        Self {
            chunks,
            failure: None,
        }
    }

    /// Creates a mock source that emits its chunks and then fails.
    #[must_use]
    pub fn failing(chunks: Vec<String>, error: impl Into<String>) -> Self {
        Self {
            chunks,
            failure: Some(error.into()),
        }
    }

    /// Creates a mock source that streams `text` split into token-shaped
    /// fragments at whitespace boundaries, trailing whitespace attached to
    /// the preceding token.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut in_whitespace = false;
        for ch in text.chars() {
            if ch.is_whitespace() {
                in_whitespace = true;
                current.push(ch);
            } else {
                if in_whitespace && !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                in_whitespace = false;
                current.push(ch);
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        Self::new(chunks)
    }
}

impl Default for MockSource {
    /// A showcase reply exercising prose, plain code, and both registered
    /// diagram tags.
    fn default() -> Self {
        Self::from_text(concat!(
            "# Training Plan\n",
            "\n",
            "Here is the weekly structure, with **key sessions** in bold.\n",
            "\n",
            "- Monday: recovery\n",
            "- Wednesday: intervals\n",
            "- Saturday: long run\n",
            "\n",
            "```mermaid\n",
            "graph TD\n",
            "A[Base] --> B[Build]\n",
            "B --> C[Peak]\n",
            "```\n",
            "\n",
            "Weekly volume as a chart:\n",
            "\n",
            "```vega-lite\n",
            "{\"mark\": \"bar\", \"data\": {\"values\": [{\"week\": 1, \"km\": 40}]}}\n",
            "```\n",
            "\n",
            "Track it with:\n",
            "\n",
            "```bash\n",
            "coach log --week 1\n",
            "```\n",
        ))
    }
}

impl FragmentSource for MockSource {
    fn stream(
        &self,
        request: &StreamRequest,
        emit: &mut dyn FnMut(FragmentEvent),
    ) -> Result<(), String> {
        for chunk in &self.chunks {
            emit(FragmentEvent::Fragment {
                message_id: request.message_id,
                text: chunk.clone(),
            });
        }
        match &self.failure {
            Some(error) => emit(FragmentEvent::Failed {
                message_id: request.message_id,
                error: error.clone(),
            }),
            None => emit(FragmentEvent::Completed {
                message_id: request.message_id,
            }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fragment_source::{FragmentEvent, FragmentSource, StreamRequest};

    use super::MockSource;

    fn collect(source: &MockSource) -> Vec<FragmentEvent> {
        let mut events = Vec::new();
        source
            .stream(
                &StreamRequest {
                    message_id: 1,
                    prompt: "go".to_string(),
                },
                &mut |event| events.push(event),
            )
            .expect("stream should start");
        events
    }

    #[test]
    fn fragments_concatenate_to_original_text() {
        let text = "alpha beta\n\ngamma";
        let source = MockSource::from_text(text);
        let events = collect(&source);

        let mut rebuilt = String::new();
        for event in &events {
            if let FragmentEvent::Fragment { text, .. } = event {
                rebuilt.push_str(text);
            }
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn fragments_break_at_whitespace_boundaries() {
        let source = MockSource::from_text("alpha beta gamma");
        let events = collect(&source);
        let fragments: Vec<&str> = events
            .iter()
            .filter_map(|event| match event {
                FragmentEvent::Fragment { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fragments, vec!["alpha ", "beta ", "gamma"]);
    }

    #[test]
    fn last_event_is_completed() {
        let source = MockSource::from_text("done");
        let events = collect(&source);
        assert_eq!(
            events.last(),
            Some(&FragmentEvent::Completed { message_id: 1 })
        );
        assert!(events[..events.len() - 1]
            .iter()
            .all(|event| !event.is_terminal()));
    }

    #[test]
    fn failing_source_ends_with_failed_event() {
        let source = MockSource::failing(vec!["partial ".to_string()], "connection reset");
        let events = collect(&source);
        assert_eq!(
            events.last(),
            Some(&FragmentEvent::Failed {
                message_id: 1,
                error: "connection reset".to_string(),
            })
        );
    }

    #[test]
    fn default_showcase_contains_diagram_fences() {
        let source = MockSource::default();
        let events = collect(&source);
        let full: String = events
            .iter()
            .filter_map(|event| match event {
                FragmentEvent::Fragment { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(full.contains("```mermaid\n"));
        assert!(full.contains("```vega-lite\n"));
        assert!(full.contains("```bash\n"));
    }
}
