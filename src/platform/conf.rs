//! Shell-style `KEY=VALUE` configuration format.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Text(s.to_string())
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        ConfigValue::Number(n)
    }
}

impl From<&[&str]> for ConfigValue {
    fn from(items: &[&str]) -> Self {
        ConfigValue::List(items.iter().map(|s| s.to_string()).collect())
    }
}

/// Ordered key/value configuration, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformConfig {
    entries: Vec<(String, ConfigValue)>,
}

impl PlatformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Set a value, keeping the original position of an existing key.
    pub fn insert<V: Into<ConfigValue>>(&mut self, key: &str, value: V) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PlatformConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PlatformConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ConfigVisitor;

        impl<'de> Visitor<'de> for ConfigVisitor {
            type Value = PlatformConfig;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of configuration keys to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut config = PlatformConfig::new();
                while let Some((key, value)) = access.next_entry::<String, ConfigValue>()? {
                    config.insert(&key, value);
                }
                Ok(config)
            }
        }

        deserializer.deserialize_map(ConfigVisitor)
    }
}

/// Parse configuration text.
///
/// Blank lines, comments and lines without a key are ignored.
pub fn parse_config(content: &str) -> PlatformConfig {
    static LINE: OnceLock<Regex> = OnceLock::new();
    let line_re = LINE.get_or_init(|| Regex::new(r"^([^=]+)=(.*)$").unwrap());

    let mut config = PlatformConfig::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some(caps) = line_re.captures(trimmed) else {
            continue;
        };
        let key = caps[1].trim();
        if key.is_empty() {
            continue;
        }

        config.insert(key, parse_value(caps[2].trim()));
    }

    config
}

fn parse_value(raw: &str) -> ConfigValue {
    let value = strip_quotes(raw);

    if let Some(inner) = value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return ConfigValue::List(parse_list(inner));
    }

    match value {
        "true" => return ConfigValue::Bool(true),
        "false" => return ConfigValue::Bool(false),
        _ => {}
    }

    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => ConfigValue::Number(n),
        _ => ConfigValue::Text(value.to_string()),
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Split a shell array body into items; quoted items may contain spaces.
fn parse_list(inner: &str) -> Vec<String> {
    static ITEM: OnceLock<Regex> = OnceLock::new();
    let item_re = ITEM.get_or_init(|| Regex::new(r#""([^"]*)"|'([^']*)'|(\S+)"#).unwrap());

    item_re
        .captures_iter(inner)
        .filter_map(|caps| caps.get(1).or(caps.get(2)).or(caps.get(3)))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Render configuration as file text.
pub fn generate_config(config: &PlatformConfig, generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![
        "# Network Monitor Configuration".to_string(),
        format!(
            "# Generated on {}",
            generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        String::new(),
    ];

    for (key, value) in config.iter() {
        lines.push(match value {
            ConfigValue::List(items) => {
                let quoted: Vec<String> = items.iter().map(|i| format!("\"{}\"", i)).collect();
                format!("{}=({})", key, quoted.join(" "))
            }
            ConfigValue::Text(s) => format!("{}=\"{}\"", key, s),
            ConfigValue::Number(n) => format!("{}={}", key, format_number(*n)),
            ConfigValue::Bool(b) => format!("{}={}", key, b),
        });
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Built-in configuration for a platform; unknown platforms get the base keys.
pub fn default_config(platform: &str) -> PlatformConfig {
    let mut config = PlatformConfig::new();
    config.insert("LOGFILE_PATH", "./logs/network_monitor_log.csv");
    config.insert(
        "EXTERNAL_TARGETS",
        &["8.8.8.8", "1.1.1.1", "208.67.222.222"][..],
    );
    config.insert("ROUTER_ADDRESS", "auto");
    config.insert("PING_COUNT", 3.0);
    config.insert("PING_TIMEOUT", 5.0);
    config.insert("DEBUG", false);

    let platform_keys = match platform {
        "macos" => Some((
            "system_profiler SPAirPortDataType",
            "system_profiler SPAirPortDataType",
            "launchd",
        )),
        "windows" => Some((
            "netsh interface show interface",
            "netsh wlan show interfaces",
            "Task Scheduler",
        )),
        "ubuntu" => Some(("ip route | grep default", "iwconfig", "systemd")),
        _ => None,
    };

    if let Some((detection, wifi_info, scheduler)) = platform_keys {
        config.insert("INTERFACE_DETECTION", detection);
        config.insert("WIFI_INFO_COMMAND", wifi_info);
        config.insert("SCHEDULER", scheduler);
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_values() {
        let content = r#"
# Network Monitor Configuration
LOGFILE_PATH="./logs/network_monitor_log.csv"
EXTERNAL_TARGETS=("8.8.8.8" "1.1.1.1")
ROUTER_ADDRESS=auto
PING_COUNT=3
PING_TIMEOUT='5'
DEBUG=false
WIFI_INFO_COMMAND="ip route | grep default"
QUERY=a=b
not a setting
=orphan
"#;
        let config = parse_config(content);

        assert_eq!(config.len(), 8);
        assert_eq!(
            config.get("LOGFILE_PATH"),
            Some(&ConfigValue::from("./logs/network_monitor_log.csv"))
        );
        assert_eq!(
            config.get("EXTERNAL_TARGETS"),
            Some(&ConfigValue::from(&["8.8.8.8", "1.1.1.1"][..]))
        );
        assert_eq!(config.get("ROUTER_ADDRESS"), Some(&ConfigValue::from("auto")));
        assert_eq!(config.get("PING_COUNT"), Some(&ConfigValue::Number(3.0)));
        assert_eq!(config.get("PING_TIMEOUT"), Some(&ConfigValue::Number(5.0)));
        assert_eq!(config.get("DEBUG"), Some(&ConfigValue::Bool(false)));
        assert_eq!(
            config.get("WIFI_INFO_COMMAND"),
            Some(&ConfigValue::from("ip route | grep default"))
        );
        assert_eq!(config.get("QUERY"), Some(&ConfigValue::from("a=b")));
    }

    #[test]
    fn test_parse_lists() {
        assert_eq!(parse_list(""), Vec::<String>::new());
        assert_eq!(parse_list(r#"a  "b c" 'd'"#), vec!["a", "b c", "d"]);
    }

    #[test]
    fn test_generate_and_reparse() {
        let config = default_config("ubuntu");
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let text = generate_config(&config, at);

        assert!(text.starts_with(
            "# Network Monitor Configuration\n# Generated on 2024-06-01T12:00:00.000Z\n\n"
        ));
        assert!(text.contains("EXTERNAL_TARGETS=(\"8.8.8.8\" \"1.1.1.1\" \"208.67.222.222\")\n"));
        assert!(text.contains("PING_COUNT=3\n"));
        assert!(text.contains("DEBUG=false\n"));
        assert!(text.contains("SCHEDULER=\"systemd\"\n"));

        assert_eq!(parse_config(&text), config);
    }

    #[test]
    fn test_generate_line_layout() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(
            generate_config(&PlatformConfig::new(), at),
            "# Network Monitor Configuration\n# Generated on 2024-06-01T12:00:00.000Z\n\n"
        );

        let mut config = PlatformConfig::new();
        config.insert("DEBUG", true);
        let text = generate_config(&config, at);
        assert!(text.ends_with("\n\nDEBUG=true\n"));
    }

    #[test]
    fn test_fractional_numbers() {
        let mut config = PlatformConfig::new();
        config.insert("PING_INTERVAL", 2.5);
        let text = generate_config(&config, Utc::now());
        assert!(text.contains("PING_INTERVAL=2.5\n"));
    }

    #[test]
    fn test_platform_defaults() {
        let mac = default_config("macos");
        assert_eq!(mac.get("SCHEDULER"), Some(&ConfigValue::from("launchd")));
        assert_eq!(mac.len(), 9);

        let win = default_config("windows");
        assert_eq!(
            win.get("WIFI_INFO_COMMAND"),
            Some(&ConfigValue::from("netsh wlan show interfaces"))
        );

        let other = default_config("freebsd");
        assert_eq!(other.len(), 6);
        assert!(other.get("SCHEDULER").is_none());
    }

    #[test]
    fn test_json_keeps_key_order() {
        let json = serde_json::to_string(&default_config("macos")).unwrap();
        assert!(json.starts_with(r#"{"LOGFILE_PATH":"./logs/network_monitor_log.csv","EXTERNAL_TARGETS":["#));

        let parsed: PlatformConfig =
            serde_json::from_str(r#"{"Z":1,"A":"x","M":[ "a" ],"B":true}"#).unwrap();
        let keys: Vec<&str> = parsed.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Z", "A", "M", "B"]);
        assert_eq!(parsed.get("Z"), Some(&ConfigValue::Number(1.0)));
    }
}
