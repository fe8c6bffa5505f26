use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 50))]
    pub question: String,
    /// Canonical correct answer text.
    #[validate(length(min = 1, max = 50))]
    pub answer: String,
    /// The correct option plus two distractors, exactly three in total.
    #[validate(length(equal = 3))]
    pub answers: Vec<AnswerPayload>,
}

// Serialize is required by the derived length validator, which attaches
// the offending value as an error param.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub answer: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RemoveQuestionRequest {
    #[validate(length(min = 1, max = 50))]
    pub question: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AcceptAnswerRequest {
    #[validate(length(min = 1))]
    pub answer: String,
}
