pub mod config;
pub mod error;
pub mod model;
pub mod response;
pub mod rum;
pub mod store;
pub mod template;

pub use config::{ConfigError, UploaderConfig};
pub use error::CoreError;
pub use model::{
    AppMonitorName, BucketName, CustomResourceEvent, NameError, PropertiesError, RequestType,
    ResourceProperties,
};
pub use response::{CustomResourceResponse, ResponseData, ResponseStatus};
pub use rum::{MonitorSource, RumMonitorSource};
pub use store::{S3ScriptStore, ScriptStore};
pub use template::{AppMonitorSnapshot, MonitorConfiguration, ScriptSettings, render_script};
