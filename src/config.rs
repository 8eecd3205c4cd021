//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `QUERY_ROUTER__*` 覆盖（双下划线表示嵌套，如 `QUERY_ROUTER__LLM__MODEL=gpt-4o-mini`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::agents::{default_roster, Agent};
use crate::classify::{default_intents, IntentMapping, DEFAULT_FALLBACK_TEAM};
use crate::core::error::RouterError;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub classification: ClassificationSection,
    pub routing: RoutingSection,
    pub web: WebSection,
}

/// [app] 段：应用名、对话日志路径
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 对话日志文件（批量分类 / Web 测试端点使用），未设置则不加载
    pub conversations_path: Option<PathBuf>,
}

/// [llm] 段：模型、端点、凭据、采样参数与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    /// 未设置时读 OPENAI_API_KEY
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次分类请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

/// [classification] 段：兜底团队与意图目录
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationSection {
    #[serde(default = "default_fallback_team")]
    pub fallback_team: String,
    #[serde(default = "default_intents")]
    pub intents: Vec<IntentMapping>,
}

impl Default for ClassificationSection {
    fn default() -> Self {
        Self {
            fallback_team: default_fallback_team(),
            intents: default_intents(),
        }
    }
}

fn default_fallback_team() -> String {
    DEFAULT_FALLBACK_TEAM.to_string()
}

/// [routing] 段：坐席名单
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingSection {
    #[serde(default = "default_roster")]
    pub agents: Vec<Agent>,
}

impl Default for RoutingSection {
    fn default() -> Self {
        Self {
            agents: default_roster(),
        }
    }
}

/// [web] 段：HTTP 监听地址与静态页面目录
#[derive(Debug, Clone, Deserialize)]
pub struct WebSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// 未匹配 API 的请求从这里取文件，`/` 对应 index.html
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl AppConfig {
    /// 凭据：llm.api_key 优先，其次 OPENAI_API_KEY；都没有则为配置错误
    pub fn api_key(&self) -> Result<String, RouterError> {
        self.llm
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                RouterError::Config(
                    "missing API key: set llm.api_key or OPENAI_API_KEY".to_string(),
                )
            })
    }

    /// 日志里使用的应用名，未配置时取包名
    pub fn app_name(&self) -> &str {
        self.app.name.as_deref().unwrap_or(env!("CARGO_PKG_NAME"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeouts.request.max(1))
    }
}

/// 加载 Query Router 的 AppConfig（坐席名单、意图目录、LLM 与 Web 设置），环境变量 QUERY_ROUTER__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 QUERY_ROUTER__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("QUERY_ROUTER")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
