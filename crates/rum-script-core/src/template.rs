use serde::Serialize;

use crate::error::CoreError;

/// Name of the global command queue function the web client installs.
const COMMAND_NAMESPACE: &str = "cwr";

/// Region the RUM web client bundle is served from, independent of the
/// data-plane region.
const CLIENT_CDN_REGION: &str = "us-east-1";

/// The parts of a RUM app monitor the bootstrap script needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppMonitorSnapshot {
    pub id: String,
    pub name: String,
    pub configuration: Option<MonitorConfiguration>,
}

/// Web client settings copied from the app monitor configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorConfiguration {
    pub session_sample_rate: Option<f64>,
    pub guest_role_arn: Option<String>,
    pub identity_pool_id: Option<String>,
    pub telemetries: Vec<String>,
    pub allow_cookies: Option<bool>,
    pub enable_xray: Option<bool>,
    pub excluded_pages: Vec<String>,
    pub included_pages: Vec<String>,
    pub favorite_pages: Vec<String>,
}

impl From<aws_sdk_rum::types::AppMonitor> for AppMonitorSnapshot {
    fn from(monitor: aws_sdk_rum::types::AppMonitor) -> Self {
        Self {
            id: monitor.id.unwrap_or_default(),
            name: monitor.name.unwrap_or_default(),
            configuration: monitor.app_monitor_configuration.map(Into::into),
        }
    }
}

impl From<aws_sdk_rum::types::AppMonitorConfiguration> for MonitorConfiguration {
    fn from(config: aws_sdk_rum::types::AppMonitorConfiguration) -> Self {
        Self {
            session_sample_rate: config.session_sample_rate.into(),
            guest_role_arn: config.guest_role_arn,
            identity_pool_id: config.identity_pool_id,
            telemetries: config
                .telemetries
                .unwrap_or_default()
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            allow_cookies: config.allow_cookies,
            enable_xray: config.enable_x_ray,
            excluded_pages: config.excluded_pages.unwrap_or_default(),
            included_pages: config.included_pages.unwrap_or_default(),
            favorite_pages: config.favorite_pages.unwrap_or_default(),
        }
    }
}

/// Deployment-level values baked into the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSettings {
    /// Region of the RUM data plane that receives events.
    pub region: String,
    /// Version reported for the instrumented application.
    pub application_version: String,
    /// Version of the `cwr.js` web client bundle.
    pub web_client_version: String,
}

impl ScriptSettings {
    pub fn client_url(&self) -> String {
        format!(
            "https://client.rum.{CLIENT_CDN_REGION}.amazonaws.com/{}/cwr.js",
            self.web_client_version
        )
    }

    pub fn endpoint(&self) -> String {
        format!("https://dataplane.rum.{}.amazonaws.com", self.region)
    }
}

/// The `config` argument of the web client snippet.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    session_sample_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guest_role_arn: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity_pool_id: Option<&'a str>,
    endpoint: String,
    telemetries: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    allow_cookies: Option<bool>,
    #[serde(rename = "enableXRay", skip_serializing_if = "Option::is_none")]
    enable_xray: Option<bool>,
    #[serde(skip_serializing_if = "no_pages")]
    pages_to_exclude: &'a [String],
    #[serde(skip_serializing_if = "no_pages")]
    pages_to_include: &'a [String],
    #[serde(skip_serializing_if = "no_pages")]
    favorite_pages: &'a [String],
}

fn no_pages(pages: &&[String]) -> bool {
    pages.is_empty()
}

impl<'a> ClientConfig<'a> {
    fn new(config: &'a MonitorConfiguration, endpoint: String) -> Self {
        Self {
            session_sample_rate: config.session_sample_rate,
            guest_role_arn: config.guest_role_arn.as_deref(),
            identity_pool_id: config.identity_pool_id.as_deref(),
            endpoint,
            telemetries: &config.telemetries,
            allow_cookies: config.allow_cookies,
            enable_xray: config.enable_xray,
            pages_to_exclude: &config.excluded_pages,
            pages_to_include: &config.included_pages,
            favorite_pages: &config.favorite_pages,
        }
    }
}

/// Render the RUM web client bootstrap script for an app monitor.
///
/// The snippet queues commands on `window.cwr` until the asynchronously
/// loaded `cwr.js` bundle takes over. All interpolated values are emitted as
/// JSON literals.
pub fn render_script(
    monitor: &AppMonitorSnapshot,
    settings: &ScriptSettings,
) -> Result<String, CoreError> {
    let fallback = MonitorConfiguration::default();
    let config = ClientConfig::new(
        monitor.configuration.as_ref().unwrap_or(&fallback),
        settings.endpoint(),
    );

    let args = [
        serde_json::to_string(COMMAND_NAMESPACE)?,
        serde_json::to_string(&monitor.id)?,
        serde_json::to_string(&settings.application_version)?,
        serde_json::to_string(&settings.region)?,
        serde_json::to_string(&settings.client_url())?,
        serde_json::to_string_pretty(&config)?,
    ]
    .join(",\n");

    Ok(format!(
        r#"(function (n, i, v, r, s, c, x, z) {{
  x = window.AwsRumClient = {{ q: [], n: n, i: i, v: v, r: r, c: c }};
  window[n] = function (c, p) {{
    x.q.push({{ c: c, p: p }});
  }};
  z = document.createElement('script');
  z.async = true;
  z.src = s;
  document.head.insertBefore(
    z,
    document.head.getElementsByTagName('script')[0]
  );
}})(
{args}
);
"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ScriptSettings {
        ScriptSettings {
            region: "eu-west-1".into(),
            application_version: "1.0.0".into(),
            web_client_version: "1.2.1".into(),
        }
    }

    fn monitor() -> AppMonitorSnapshot {
        AppMonitorSnapshot {
            id: "7bd4b1f6-0d0c-4a0e-9c4a-2f5f3e2d1c0b".into(),
            name: "canary-stack-rum".into(),
            configuration: Some(MonitorConfiguration {
                session_sample_rate: Some(1.0),
                guest_role_arn: Some(
                    "arn:aws:iam::123456789012:role/UnauthenticatedRumRole".into(),
                ),
                identity_pool_id: Some("eu-west-1:11111111-2222-3333-4444-555555555555".into()),
                telemetries: vec!["errors".into(), "performance".into(), "http".into()],
                allow_cookies: Some(true),
                enable_xray: Some(true),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn urls_follow_region_and_version() {
        let s = settings();
        assert_eq!(
            s.client_url(),
            "https://client.rum.us-east-1.amazonaws.com/1.2.1/cwr.js"
        );
        assert_eq!(s.endpoint(), "https://dataplane.rum.eu-west-1.amazonaws.com");
    }

    #[test]
    fn script_installs_command_queue() {
        let script = render_script(&monitor(), &settings()).unwrap();

        assert!(script.starts_with("(function (n, i, v, r, s, c, x, z) {"));
        assert!(script.contains("x = window.AwsRumClient = { q: [], n: n, i: i, v: v, r: r, c: c };"));
        assert!(script.contains("z.async = true;"));
        assert!(script.trim_end().ends_with(");"));
    }

    #[test]
    fn script_passes_monitor_arguments_in_order() {
        let script = render_script(&monitor(), &settings()).unwrap();

        let positions: Vec<usize> = [
            "\"cwr\"",
            "\"7bd4b1f6-0d0c-4a0e-9c4a-2f5f3e2d1c0b\"",
            "\"1.0.0\"",
            "\"eu-west-1\"",
            "\"https://client.rum.us-east-1.amazonaws.com/1.2.1/cwr.js\"",
            "\"sessionSampleRate\": 1.0",
        ]
        .iter()
        .map(|needle| script.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn script_config_uses_client_keys() {
        let script = render_script(&monitor(), &settings()).unwrap();

        assert!(script.contains(
            "\"guestRoleArn\": \"arn:aws:iam::123456789012:role/UnauthenticatedRumRole\""
        ));
        assert!(script.contains(
            "\"identityPoolId\": \"eu-west-1:11111111-2222-3333-4444-555555555555\""
        ));
        assert!(script.contains("\"endpoint\": \"https://dataplane.rum.eu-west-1.amazonaws.com\""));
        assert!(script.contains("\"allowCookies\": true"));
        assert!(script.contains("\"enableXRay\": true"));
        assert!(script.contains("\"errors\",\n    \"performance\",\n    \"http\""));
        assert!(!script.contains("pagesToExclude"));
    }

    #[test]
    fn absent_values_are_omitted_not_undefined() {
        let bare = AppMonitorSnapshot {
            id: "id".into(),
            name: "bare".into(),
            configuration: None,
        };

        let script = render_script(&bare, &settings()).unwrap();

        assert!(!script.contains("undefined"));
        assert!(!script.contains("guestRoleArn"));
        assert!(script.contains("\"telemetries\": []"));
    }

    #[test]
    fn page_lists_are_rendered_when_present() {
        let mut m = monitor();
        if let Some(config) = m.configuration.as_mut() {
            config.excluded_pages = vec!["https://example.com/admin".into()];
            config.favorite_pages = vec!["/checkout".into()];
        }

        let script = render_script(&m, &settings()).unwrap();

        assert!(script.contains("\"pagesToExclude\": [\n    \"https://example.com/admin\"\n  ]"));
        assert!(script.contains("\"favoritePages\""));
        assert!(!script.contains("pagesToInclude"));
    }

    #[test]
    fn interpolated_strings_are_escaped() {
        let mut m = monitor();
        m.id = "id'); alert('x".into();

        let script = render_script(&m, &settings()).unwrap();

        assert!(script.contains("\"id'); alert('x\""));
        assert!(!script.contains("'id'); alert('x'"));
    }

    #[test]
    fn converts_sdk_app_monitor() {
        use aws_sdk_rum::types::{AppMonitor, AppMonitorConfiguration, Telemetry};

        let sdk = AppMonitor::builder()
            .id("monitor-id")
            .name("canary-stack-rum")
            .app_monitor_configuration(
                AppMonitorConfiguration::builder()
                    .session_sample_rate(0.5)
                    .telemetries(Telemetry::Errors)
                    .telemetries(Telemetry::Http)
                    .enable_x_ray(false)
                    .build(),
            )
            .build();

        let snapshot = AppMonitorSnapshot::from(sdk);
        let config = snapshot.configuration.unwrap();

        assert_eq!(snapshot.id, "monitor-id");
        assert_eq!(config.session_sample_rate, Some(0.5));
        assert_eq!(config.telemetries, vec!["errors", "http"]);
        assert_eq!(config.enable_xray, Some(false));
        assert_eq!(config.allow_cookies, None);
    }
}
