use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub game: GameConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许跨域的前端地址；为空时放行任意来源
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 数据目录，存放 rewards.json / users.json / config.json
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// 每位访客最多摇树次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 倒计时未结束时是否拒绝摇树/领奖
    #[serde(default)]
    pub enforce_countdown: bool,
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            enforce_countdown: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    /// 明文或 bcrypt 哈希 ($2a$/$2b$/$2y$ 开头)
    pub password: String,
    pub session_secret: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64, // seconds
    /// 会话 cookie 加 Secure 标记 (部署在 HTTPS 之后时开启)
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_session_ttl() -> i64 {
    86_400
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("PORT", 4100u16),
                        cors_allowed_origins: Vec::new(),
                    },
                    storage: StorageConfig::default(),
                    game: GameConfig::default(),
                    admin: AdminConfig {
                        username: get_env("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
                        password: get_env("ADMIN_PASSWORD")
                            .unwrap_or_else(|| "change-me".to_string()),
                        session_secret: get_env("SESSION_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        session_ttl_secs: default_session_ttl(),
                        secure_cookie: false,
                    },
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT").or_else(|_| env::var("PORT"))
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            config.server.cors_allowed_origins = v
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("DATA_DIR") {
            config.storage.data_dir = v;
        }
        if let Ok(v) = env::var("MAX_ATTEMPTS")
            && let Ok(n) = v.parse()
        {
            config.game.max_attempts = n;
        }
        if let Ok(v) = env::var("ENFORCE_COUNTDOWN")
            && let Ok(b) = v.parse()
        {
            config.game.enforce_countdown = b;
        }
        if let Ok(v) = env::var("ADMIN_USERNAME") {
            config.admin.username = v;
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            config.admin.password = v;
        }
        if let Ok(v) = env::var("SESSION_SECRET") {
            config.admin.session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_TTL_SECS")
            && let Ok(n) = v.parse()
        {
            config.admin.session_ttl_secs = n;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE")
            && let Ok(b) = v.parse()
        {
            config.admin.secure_cookie = b;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.game.max_attempts == 0 {
            return Err("game.max_attempts must be at least 1".to_string());
        }
        if self.admin.session_ttl_secs <= 0 {
            return Err("admin.session_ttl_secs must be positive".to_string());
        }
        Ok(())
    }
}
