use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

const MAX_APP_MONITOR_NAME_LENGTH: usize = 255;
const MIN_BUCKET_NAME_LENGTH: usize = 3;
const MAX_BUCKET_NAME_LENGTH: usize = 63;

/// A validated RUM app monitor name: 1-255 characters of letters, digits,
/// `.`, `-`, `_` and `#`, not starting with a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppMonitorName(String);

impl AppMonitorName {
    /// Create a new `AppMonitorName` after validation.
    pub fn new(s: impl Into<String>) -> Result<Self, NameError> {
        let s = s.into();

        if s.is_empty() {
            return Err(NameError::Empty);
        }

        if s.len() > MAX_APP_MONITOR_NAME_LENGTH {
            return Err(NameError::TooLong {
                len: s.len(),
                max: MAX_APP_MONITOR_NAME_LENGTH,
            });
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '#'))
        {
            return Err(NameError::InvalidCharacters);
        }

        if s.starts_with('.') {
            return Err(NameError::InvalidBoundary);
        }

        Ok(Self(s))
    }
}

/// A validated S3 bucket name: 3-63 characters of lowercase letters, digits,
/// dots and hyphens, beginning and ending with a letter or digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    /// Create a new `BucketName` after validation.
    pub fn new(s: impl Into<String>) -> Result<Self, NameError> {
        let s = s.into();

        if s.is_empty() {
            return Err(NameError::Empty);
        }

        if s.len() < MIN_BUCKET_NAME_LENGTH {
            return Err(NameError::TooShort {
                len: s.len(),
                min: MIN_BUCKET_NAME_LENGTH,
            });
        }

        if s.len() > MAX_BUCKET_NAME_LENGTH {
            return Err(NameError::TooLong {
                len: s.len(),
                max: MAX_BUCKET_NAME_LENGTH,
            });
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(NameError::InvalidCharacters);
        }

        let alnum = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
        if !alnum(s.chars().next()) || !alnum(s.chars().last()) {
            return Err(NameError::InvalidBoundary);
        }

        Ok(Self(s))
    }
}

macro_rules! string_newtype {
    ($name:ident) => {
        impl TryFrom<String> for $name {
            type Error = NameError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_newtype!(AppMonitorName);
string_newtype!(BucketName);

/// Errors that can occur when validating a resource name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name must not be empty")]
    Empty,

    #[error("name length {len} is below the minimum of {min}")]
    TooShort { len: usize, min: usize },

    #[error("name length {len} exceeds maximum of {max}")]
    TooLong { len: usize, max: usize },

    #[error("name contains characters that are not allowed")]
    InvalidCharacters,

    #[error("name starts or ends with a character that is not allowed there")]
    InvalidBoundary,
}

// ---------------------------------------------------------------------------
// Resource properties
// ---------------------------------------------------------------------------

/// The properties of the `UploadRumScriptToWebsiteBucket` custom resource.
///
/// CloudFormation forwards every property declared on the resource, including
/// `ServiceToken` and the deploy-time `trigger`; only the two names below are
/// used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceProperties {
    pub app_monitor_name: AppMonitorName,
    pub s3_bucket_name: BucketName,
}

impl ResourceProperties {
    pub const APP_MONITOR_NAME: &'static str = "appMonitorName";
    pub const S3_BUCKET_NAME: &'static str = "s3BucketName";

    /// Validate the raw `ResourceProperties` object of an event.
    pub fn parse(value: &serde_json::Value) -> Result<Self, PropertiesError> {
        let object = value.as_object().ok_or(PropertiesError::NotAnObject)?;

        let app_monitor_name = string_field(object, Self::APP_MONITOR_NAME)?;
        let app_monitor_name =
            AppMonitorName::new(app_monitor_name).map_err(|source| PropertiesError::InvalidName {
                key: Self::APP_MONITOR_NAME,
                source,
            })?;

        let s3_bucket_name = string_field(object, Self::S3_BUCKET_NAME)?;
        let s3_bucket_name =
            BucketName::new(s3_bucket_name).map_err(|source| PropertiesError::InvalidName {
                key: Self::S3_BUCKET_NAME,
                source,
            })?;

        Ok(Self {
            app_monitor_name,
            s3_bucket_name,
        })
    }
}

fn string_field<'a>(
    object: &'a serde_json::Map<String, serde_json::Value>,
    key: &'static str,
) -> Result<&'a str, PropertiesError> {
    match object.get(key) {
        None => Err(PropertiesError::Missing(key)),
        Some(v) => v.as_str().ok_or(PropertiesError::NotAString(key)),
    }
}

/// Errors from validating custom resource properties.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertiesError {
    #[error("resource properties must be a JSON object")]
    NotAnObject,

    #[error("resource property `{0}` is missing")]
    Missing(&'static str),

    #[error("resource property `{0}` must be a string")]
    NotAString(&'static str),

    #[error("resource property `{key}` is invalid: {source}")]
    InvalidName {
        key: &'static str,
        #[source]
        source: NameError,
    },
}

// ---------------------------------------------------------------------------
// Custom resource event
// ---------------------------------------------------------------------------

/// Prefix of the physical resource id reported for every request.
pub const PHYSICAL_ID_PREFIX: &str = "RumScriptUploader";

/// Lifecycle phase of a custom resource request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        };
        f.write_str(s)
    }
}

/// A CloudFormation custom resource request as delivered to the Lambda.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,

    #[serde(default)]
    pub service_token: Option<String>,

    /// Pre-signed S3 URL the response document is PUT to.
    #[serde(rename = "ResponseURL")]
    pub response_url: String,

    pub stack_id: String,

    pub request_id: String,

    pub logical_resource_id: String,

    /// Absent on `Create`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,

    #[serde(default)]
    pub resource_type: Option<String>,

    /// Left unparsed so that malformed properties can still be answered with
    /// a `FAILED` response.
    #[serde(default)]
    pub resource_properties: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<serde_json::Value>,
}

impl CustomResourceEvent {
    /// The physical id reported back to CloudFormation.
    ///
    /// Derived from the stack id alone, so Create, Update and Delete always
    /// agree and an Update never looks like a replacement.
    pub fn physical_resource_id(&self) -> String {
        format!("{PHYSICAL_ID_PREFIX}-{}", self.stack_id)
    }

    /// Validate the event's resource properties.
    pub fn properties(&self) -> Result<ResourceProperties, PropertiesError> {
        ResourceProperties::parse(&self.resource_properties)
    }
}
