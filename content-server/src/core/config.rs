use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::session::{MIN_SECRET_LEN, SessionConfig, generate_dev_secret};
use crate::content::LegacyQuantityPolicy;
use crate::content::store::DEFAULT_FILE_MODE;
use crate::utils::time::{DEFAULT_TIMEZONE, parse_timezone};

/// 配置文件名 (位于工作目录下)
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别 (RUST_LOG 优先)
    pub level: String,
    /// JSON 格式输出
    pub json: bool,
    /// 文件日志目录 (不设置则只输出到控制台)
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            dir: None,
        }
    }
}

/// 服务器配置
///
/// # 配置来源 (后者覆盖前者)
///
/// 1. 内置默认值
/// 2. TOML 配置文件: `CONFIG_FILE` 指定，否则 `<WORK_DIR>/config.toml` (存在时)
/// 3. 环境变量 (`.env` 由 main 预先加载)
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | CONTENT_PATH | <WORK_DIR>/content.json | 内容文档路径 |
/// | ENVIRONMENT | development | 运行环境 |
/// | BUSINESS_TIMEZONE | America/New_York | 业务时区 |
/// | LEGACY_QUANTITY | preserve | 旧 quantity 字段策略 |
/// | CONTENT_FILE_MODE | 644 | 内容文件权限 (八进制) |
/// | MAX_BODY_BYTES | 2097152 | 请求体上限 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志 |
/// | LOG_DIR | - | 文件日志目录 |
/// | SESSION_SECRET | - | 会话密钥 (生产环境必填) |
/// | SESSION_ISSUER | content-admin | 令牌签发者 |
/// | SESSION_AUDIENCE | content-server | 令牌受众 |
/// | SESSION_EXPIRATION_MINUTES | 120 | 令牌有效期 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/site HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: PathBuf,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 内容文档路径
    pub content_path: PathBuf,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 业务时区 (last_updated 渲染)
    pub business_timezone: Tz,
    /// 旧 quantity 字段策略
    pub legacy_quantity: LegacyQuantityPolicy,
    /// 写入后的文件权限
    pub content_file_mode: u32,
    /// 请求体大小上限 (字节)
    pub max_body_bytes: usize,
    /// 会话令牌配置
    pub session: SessionConfig,
    /// 日志配置
    pub log: LogConfig,
}

/// TOML 配置文件结构，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    http_port: Option<u16>,
    content_path: Option<PathBuf>,
    environment: Option<String>,
    business_timezone: Option<String>,
    legacy_quantity: Option<String>,
    content_file_mode: Option<String>,
    max_body_bytes: Option<usize>,
    #[serde(default)]
    session: FileSessionConfig,
    #[serde(default)]
    log: FileLogConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSessionConfig {
    secret: Option<String>,
    issuer: Option<String>,
    audience: Option<String>,
    expiration_minutes: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLogConfig {
    level: Option<String>,
    json: Option<bool>,
    dir: Option<PathBuf>,
}

impl Config {
    pub const DEFAULT_WORK_DIR: &'static str = "./data";
    pub const DEFAULT_HTTP_PORT: u16 = 8080;
    pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
    pub const CONTENT_FILE_NAME: &'static str = "content.json";

    /// 从进程环境加载配置
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// 从给定的环境变量来源加载配置
    ///
    /// 常用于测试场景
    pub fn load_with<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let work_dir = PathBuf::from(env("WORK_DIR").unwrap_or_else(|| Self::DEFAULT_WORK_DIR.into()));

        let file = match env("CONFIG_FILE") {
            Some(path) => Some(read_file_config(Path::new(&path))?),
            None => {
                let path = work_dir.join(CONFIG_FILE_NAME);
                if path.is_file() {
                    Some(read_file_config(&path)?)
                } else {
                    None
                }
            }
        }
        .unwrap_or_default();

        let environment = env("ENVIRONMENT")
            .or(file.environment)
            .unwrap_or_else(|| "development".into());

        let http_port = match env("HTTP_PORT") {
            Some(v) => parse_number("HTTP_PORT", &v)?,
            None => file.http_port.unwrap_or(Self::DEFAULT_HTTP_PORT),
        };

        let content_path = env("CONTENT_PATH")
            .map(PathBuf::from)
            .or(file.content_path)
            .map(|p| if p.is_relative() { work_dir.join(p) } else { p })
            .unwrap_or_else(|| work_dir.join(Self::CONTENT_FILE_NAME));

        let business_timezone = match env("BUSINESS_TIMEZONE").or(file.business_timezone) {
            Some(name) => {
                parse_timezone(&name).map_err(|e| ConfigError::invalid("BUSINESS_TIMEZONE", e))?
            }
            None => DEFAULT_TIMEZONE,
        };

        let legacy_quantity = match env("LEGACY_QUANTITY").or(file.legacy_quantity) {
            Some(v) => v
                .parse::<LegacyQuantityPolicy>()
                .map_err(|e: String| ConfigError::invalid("LEGACY_QUANTITY", e))?,
            None => LegacyQuantityPolicy::default(),
        };

        let content_file_mode = match env("CONTENT_FILE_MODE").or(file.content_file_mode) {
            Some(v) => parse_file_mode(&v)?,
            None => DEFAULT_FILE_MODE,
        };

        let max_body_bytes = match env("MAX_BODY_BYTES") {
            Some(v) => parse_number("MAX_BODY_BYTES", &v)?,
            None => file.max_body_bytes.unwrap_or(Self::DEFAULT_MAX_BODY_BYTES),
        };

        let log = LogConfig {
            level: env("LOG_LEVEL")
                .or(file.log.level)
                .unwrap_or_else(|| "info".into()),
            json: match env("LOG_JSON") {
                Some(v) => parse_bool("LOG_JSON", &v)?,
                None => file.log.json.unwrap_or(false),
            },
            dir: env("LOG_DIR").map(PathBuf::from).or(file.log.dir),
        };

        let is_production = environment == "production";
        let secret = match env("SESSION_SECRET").or(file.session.secret) {
            Some(secret) => {
                if is_production && secret.len() < MIN_SECRET_LEN {
                    return Err(ConfigError::invalid(
                        "SESSION_SECRET",
                        format!("must be at least {MIN_SECRET_LEN} characters long"),
                    ));
                }
                secret
            }
            None if is_production => {
                return Err(ConfigError::invalid(
                    "SESSION_SECRET",
                    "must be set in production",
                ));
            }
            None => {
                tracing::warn!("SESSION_SECRET not set, generating a temporary development key");
                generate_dev_secret()
            }
        };
        let session = SessionConfig {
            secret,
            issuer: env("SESSION_ISSUER")
                .or(file.session.issuer)
                .unwrap_or_else(|| SessionConfig::DEFAULT_ISSUER.into()),
            audience: env("SESSION_AUDIENCE")
                .or(file.session.audience)
                .unwrap_or_else(|| SessionConfig::DEFAULT_AUDIENCE.into()),
            expiration_minutes: match env("SESSION_EXPIRATION_MINUTES") {
                Some(v) => parse_number("SESSION_EXPIRATION_MINUTES", &v)?,
                None => file
                    .session
                    .expiration_minutes
                    .unwrap_or(SessionConfig::DEFAULT_EXPIRATION_MINUTES),
            },
        };

        Ok(Self {
            work_dir,
            http_port,
            content_path,
            environment,
            business_timezone,
            legacy_quantity,
            content_file_mode,
            max_body_bytes,
            session,
            log,
        })
    }

    /// 以工作目录构造默认配置，不读取环境变量
    ///
    /// 常用于测试场景
    pub fn with_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        Self {
            content_path: work_dir.join(Self::CONTENT_FILE_NAME),
            work_dir,
            http_port: Self::DEFAULT_HTTP_PORT,
            environment: "development".into(),
            business_timezone: DEFAULT_TIMEZONE,
            legacy_quantity: LegacyQuantityPolicy::default(),
            content_file_mode: DEFAULT_FILE_MODE,
            max_body_bytes: Self::DEFAULT_MAX_BODY_BYTES,
            session: SessionConfig::new(generate_dev_secret()),
            log: LogConfig::default(),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, format!("'{value}' is not a valid number")))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, format!("'{value}' is not a boolean"))),
    }
}

/// 八进制权限，接受 "644" / "0644" / "0o644"
fn parse_file_mode(value: &str) -> Result<u32, ConfigError> {
    let digits = value.trim().trim_start_matches("0o");
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|mode| *mode <= 0o777)
        .ok_or_else(|| {
            ConfigError::invalid("CONTENT_FILE_MODE", format!("'{value}' is not an octal mode"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::load_with(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&[("WORK_DIR", dir.path().to_str().unwrap())]).unwrap();

        assert_eq!(config.http_port, 8080);
        assert_eq!(config.content_path, dir.path().join("content.json"));
        assert_eq!(config.business_timezone, chrono_tz::America::New_York);
        assert_eq!(config.legacy_quantity, LegacyQuantityPolicy::Preserve);
        assert_eq!(config.content_file_mode, 0o644);
        assert!(config.is_development());
        assert!(config.session.secret.len() >= MIN_SECRET_LEN);
    }

    #[test]
    fn test_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&[
            ("WORK_DIR", dir.path().to_str().unwrap()),
            ("HTTP_PORT", "9000"),
            ("CONTENT_PATH", "site/content.json"),
            ("BUSINESS_TIMEZONE", "Europe/Madrid"),
            ("LEGACY_QUANTITY", "upgrade"),
            ("CONTENT_FILE_MODE", "0600"),
            ("LOG_JSON", "true"),
            ("SESSION_SECRET", "s3cr3t"),
            ("SESSION_EXPIRATION_MINUTES", "30"),
        ])
        .unwrap();

        assert_eq!(config.http_port, 9000);
        assert_eq!(config.content_path, dir.path().join("site/content.json"));
        assert_eq!(config.business_timezone, chrono_tz::Europe::Madrid);
        assert_eq!(config.legacy_quantity, LegacyQuantityPolicy::Upgrade);
        assert_eq!(config.content_file_mode, 0o600);
        assert!(config.log.json);
        assert_eq!(config.session.secret, "s3cr3t");
        assert_eq!(config.session.expiration_minutes, 30);
    }

    #[test]
    fn test_file_layer_under_env() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
http_port = 7000
legacy_quantity = "reject"
business_timezone = "America/Chicago"

[session]
issuer = "site-login"

[log]
level = "debug"
"#,
        )
        .unwrap();

        let config = load(&[
            ("WORK_DIR", dir.path().to_str().unwrap()),
            ("HTTP_PORT", "7100"),
        ])
        .unwrap();

        assert_eq!(config.http_port, 7100);
        assert_eq!(config.legacy_quantity, LegacyQuantityPolicy::Reject);
        assert_eq!(config.business_timezone, chrono_tz::America::Chicago);
        assert_eq!(config.session.issuer, "site-login");
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load(&[("CONFIG_FILE", missing.to_str().unwrap())]).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "colour = \"blue\"\n").unwrap();
        let err = load(&[("WORK_DIR", dir.path().to_str().unwrap())]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().to_str().unwrap();
        for (key, value) in [
            ("BUSINESS_TIMEZONE", "Mars/Base"),
            ("LEGACY_QUANTITY", "drop"),
            ("CONTENT_FILE_MODE", "999"),
            ("HTTP_PORT", "eighty"),
            ("LOG_JSON", "maybe"),
        ] {
            let err = load(&[("WORK_DIR", work_dir), (key, value)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{key}={value} -> {err}"
            );
        }
    }

    #[test]
    fn test_production_requires_strong_secret() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().to_str().unwrap();

        let err = load(&[("WORK_DIR", work_dir), ("ENVIRONMENT", "production")]).unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET"));

        let err = load(&[
            ("WORK_DIR", work_dir),
            ("ENVIRONMENT", "production"),
            ("SESSION_SECRET", "short"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("at least 32"));

        let config = load(&[
            ("WORK_DIR", work_dir),
            ("ENVIRONMENT", "production"),
            ("SESSION_SECRET", "0123456789abcdef0123456789abcdef"),
        ])
        .unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_parse_file_mode() {
        assert_eq!(parse_file_mode("644").unwrap(), 0o644);
        assert_eq!(parse_file_mode("0o640").unwrap(), 0o640);
        assert!(parse_file_mode("rw-r--r--").is_err());
    }
}
