//! Results returned by the inference engine

use serde::{Deserialize, Serialize};

/// Output for one prompt of a generate call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOutput {
    /// Position of the prompt in the submitted batch
    pub request_id: usize,

    /// Token ids of the prompt
    pub prompt_token_ids: Vec<u32>,

    /// Generated sequences for this prompt
    pub outputs: Vec<CompletionOutput>,
}

/// One generated sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOutput {
    /// Index of the sequence within its request
    pub index: usize,

    /// Decoded text
    pub text: String,

    /// Generated token ids, empty when the engine does not report them
    #[serde(default)]
    pub token_ids: Vec<u32>,

    /// Number of generated tokens as reported by the engine
    #[serde(default)]
    pub num_tokens: Option<u32>,

    /// Why generation stopped
    pub finish_reason: Option<FinishReason>,
}

/// Reason why generation finished
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Hit a stop condition
    Stop,

    /// Hit the maximum token limit
    Length,

    /// Other reason
    Other(String),
}

impl FinishReason {
    pub fn parse(reason: &str) -> Self {
        match reason {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

impl CompletionOutput {
    /// Number of generated tokens, preferring explicit token ids.
    ///
    /// `None` when the engine reported neither ids nor a count.
    pub fn generated_tokens(&self) -> Option<usize> {
        if self.token_ids.is_empty() {
            self.num_tokens.map(|n| n as usize)
        } else {
            Some(self.token_ids.len())
        }
    }
}

impl RequestOutput {
    /// Total number of tokens generated for this prompt, `None` if any
    /// sequence has no known count
    pub fn generated_tokens(&self) -> Option<usize> {
        self.outputs.iter().map(CompletionOutput::generated_tokens).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(token_ids: Vec<u32>, num_tokens: Option<u32>) -> CompletionOutput {
        CompletionOutput {
            index: 0,
            text: String::new(),
            token_ids,
            num_tokens,
            finish_reason: Some(FinishReason::Length),
        }
    }

    #[test]
    fn test_generated_tokens_prefers_token_ids() {
        assert_eq!(completion(vec![1, 2, 3], Some(10)).generated_tokens(), Some(3));
        assert_eq!(completion(vec![], Some(10)).generated_tokens(), Some(10));
        assert_eq!(completion(vec![], None).generated_tokens(), None);
    }

    #[test]
    fn test_request_generated_tokens_sums_outputs() {
        let output = RequestOutput {
            request_id: 0,
            prompt_token_ids: vec![5, 6],
            outputs: vec![completion(vec![1], None), completion(vec![], Some(4))],
        };

        assert_eq!(output.generated_tokens(), Some(5));
    }

    #[test]
    fn test_request_generated_tokens_unknown_when_any_count_missing() {
        let output = RequestOutput {
            request_id: 0,
            prompt_token_ids: vec![5, 6],
            outputs: vec![completion(vec![1], None), completion(vec![], None)],
        };

        assert_eq!(output.generated_tokens(), None);
    }

    #[test]
    fn test_finish_reason_parse() {
        assert_eq!(FinishReason::parse("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::parse("length"), FinishReason::Length);
        assert_eq!(
            FinishReason::parse("abort"),
            FinishReason::Other("abort".to_string())
        );
    }
}
