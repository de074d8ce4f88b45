//! Mock generator for testing.

use async_trait::async_trait;
use resume_types::Suggestion;

use super::{SuggesterError, SuggestionGenerator, SuggestionRequest};

/// Returns canned suggestions, or a canned failure.
///
/// Useful for exercising the personal suggestions stage without network
/// calls.
pub struct MockSuggester {
    suggestions: Vec<Suggestion>,
    failure: Option<String>,
}

impl MockSuggester {
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        Self {
            suggestions,
            failure: None,
        }
    }

    /// A generator whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            suggestions: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

impl Default for MockSuggester {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl SuggestionGenerator for MockSuggester {
    async fn generate(&self, _request: &SuggestionRequest) -> Result<Vec<Suggestion>, SuggesterError> {
        match &self.failure {
            Some(message) => Err(SuggesterError::ApiError(message.clone())),
            None => Ok(self.suggestions.clone()),
        }
    }

    fn model_name(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resume_types::Section;

    #[tokio::test]
    async fn test_mock_returns_suggestions() {
        let mock = MockSuggester::new(vec![Suggestion::add_bullet(Section::Skills, "Add Docker", "")]);
        let out = mock.generate(&SuggestionRequest::default()).await.unwrap();
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockSuggester::failing("offline");
        assert!(mock.generate(&SuggestionRequest::default()).await.is_err());
    }
}
