use crate::core::{InlineData, ModelResponse, ResponsePart};
use crate::utils::error::{Result, TryOnError};

/// Finish reason reported when generation ended normally.
pub const NORMAL_FINISH_REASON: &str = "STOP";

const NO_IMAGE_MESSAGE: &str = "The model did not produce an image.";

/// A model response reduced to the one thing the endpoint cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseClass {
    ImageFound(InlineData),
    Refused(RefusalDiagnostics),
    EmptyNoReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefusalDiagnostics {
    pub block_reason: Option<String>,
    /// Only set for reasons other than [`NORMAL_FINISH_REASON`].
    pub finish_reason: Option<String>,
    pub text: Option<String>,
}

impl RefusalDiagnostics {
    fn is_empty(&self) -> bool {
        self.block_reason.is_none() && self.finish_reason.is_none() && self.text.is_none()
    }

    pub fn message(&self) -> String {
        let mut message = NO_IMAGE_MESSAGE.to_string();
        if let Some(reason) = &self.block_reason {
            message.push_str(&format!(" Block reason: {}.", reason));
        }
        if let Some(reason) = &self.finish_reason {
            message.push_str(&format!(" Finish reason: {}.", reason));
        }
        if let Some(text) = &self.text {
            message.push_str(&format!(" Text response: {}", text));
        }
        message
    }
}

/// Only the first candidate is considered. Within it the first part carrying
/// inline data wins, even when text parts come before it.
pub fn classify(response: ModelResponse) -> ResponseClass {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
        .filter(|reason| !reason.is_empty());

    let Some(candidate) = response.candidates.into_iter().next() else {
        return match block_reason {
            Some(reason) => ResponseClass::Refused(RefusalDiagnostics {
                block_reason: Some(reason),
                ..Default::default()
            }),
            None => ResponseClass::EmptyNoReason,
        };
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    let mut texts = Vec::new();
    for part in parts {
        match part {
            ResponsePart::InlineData { inline_data } => {
                return ResponseClass::ImageFound(inline_data)
            }
            ResponsePart::Text { text } => texts.push(text),
            ResponsePart::Other(_) => {}
        }
    }

    let text = texts.concat();
    let diagnostics = RefusalDiagnostics {
        block_reason,
        finish_reason: candidate
            .finish_reason
            .filter(|reason| !reason.is_empty() && reason != NORMAL_FINISH_REASON),
        text: (!text.trim().is_empty()).then_some(text),
    };

    if diagnostics.is_empty() {
        ResponseClass::EmptyNoReason
    } else {
        ResponseClass::Refused(diagnostics)
    }
}

pub fn data_url(image: &InlineData) -> String {
    format!("data:{};base64,{}", image.mime_type, image.data)
}

/// Turns a model response into the data URL of the generated image, or a
/// `NoImageProduced` error carrying whatever the model said instead.
pub fn interpret(response: ModelResponse) -> Result<String> {
    match classify(response) {
        ResponseClass::ImageFound(image) => Ok(data_url(&image)),
        ResponseClass::Refused(diagnostics) => {
            tracing::error!(
                block_reason = ?diagnostics.block_reason,
                finish_reason = ?diagnostics.finish_reason,
                text = ?diagnostics.text,
                "Model returned no image"
            );
            Err(TryOnError::NoImageProduced {
                message: diagnostics.message(),
            })
        }
        ResponseClass::EmptyNoReason => {
            tracing::error!("Model returned no image and no diagnostics");
            Err(TryOnError::NoImageProduced {
                message: NO_IMAGE_MESSAGE.to_string(),
            })
        }
    }
}
