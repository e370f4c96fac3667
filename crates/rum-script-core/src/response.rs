use serde::Serialize;

use crate::model::{CustomResourceEvent, RequestType};

/// Longest reason sent back. CloudFormation rejects response documents over
/// 4096 bytes, and the ids alone can take a few hundred of those.
const MAX_REASON_BYTES: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Attributes exposed to the template through `Fn::GetAtt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseData {
    pub script_key: String,
    pub script_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}

/// The document PUT to the event's `ResponseURL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl CustomResourceResponse {
    pub fn success(event: &CustomResourceEvent, data: Option<ResponseData>) -> Self {
        let reason = match event.request_type {
            RequestType::Create | RequestType::Update => "Uploaded RUM script",
            RequestType::Delete => "Deleted RUM script",
        };
        Self::new(event, ResponseStatus::Success, reason.to_string(), data)
    }

    /// A `FAILED` response. The message is shortened to fit the response
    /// size limit; the log stream pointer, when given, is always kept whole.
    pub fn failure(
        event: &CustomResourceEvent,
        message: impl Into<String>,
        log_stream: Option<&str>,
    ) -> Self {
        let suffix = log_stream
            .map(|stream| format!(". See the details in CloudWatch Log Stream: {stream}"))
            .unwrap_or_default();
        let mut reason = truncate(message.into(), MAX_REASON_BYTES.saturating_sub(suffix.len()));
        reason.push_str(&suffix);

        Self::new(event, ResponseStatus::Failed, reason, None)
    }

    fn new(
        event: &CustomResourceEvent,
        status: ResponseStatus,
        reason: String,
        data: Option<ResponseData>,
    ) -> Self {
        Self {
            status,
            reason,
            physical_resource_id: event.physical_resource_id(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            data,
        }
    }
}

fn truncate(mut text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text
}
