use serde::{Deserialize, Serialize};

/// 默认配置文件名
pub const DEFAULT_CONFIG_PATH: &str = "headcounts.toml";

/// 环境变量前缀，例如 HC__SERVER__PORT=9000
pub const ENV_PREFIX: &str = "HC";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量
/// - data: 数据文件与缓存目录
/// - scraper: 课程搜索站点抓取参数
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > TOML 文件 > 默认值
    /// ENV 前缀：HC，分隔符：__
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> crate::errors::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::errors::HeadcountError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// Public URL root shown on the instructions page. Derived from the
    /// request when unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// 数据文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Cumulative table every scrape is merged into
    #[serde(default = "default_raw_file")]
    pub raw_file: String,
    /// Table the web server reads
    #[serde(default = "default_published_file")]
    pub published_file: String,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
    /// Where CSV downloads of rendered views are kept
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// CSV with `Rubric` and `CollegeCode` columns
    #[serde(default = "default_college_map")]
    pub college_map: String,
    #[serde(default = "default_semesters_file")]
    pub semesters_file: String,
}

/// 抓取配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_campus_id")]
    pub campus_id: u32,
    #[serde(default = "default_scraper_base_url")]
    pub base_url: String,
    #[serde(default = "default_scraper_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_result_number")]
    pub result_number: u32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_raw_file() -> String {
    "data/all_enrollments.csv".to_string()
}

fn default_published_file() -> String {
    "data/all_enrollments_published.csv".to_string()
}

fn default_backup_dir() -> String {
    "data/backups".to_string()
}

fn default_cache_dir() -> String {
    "viewed-csvs".to_string()
}

fn default_college_map() -> String {
    "setup/Rubric2College.csv".to_string()
}

fn default_semesters_file() -> String {
    "data/semesters.json".to_string()
}

fn default_campus_id() -> u32 {
    72
}

fn default_scraper_base_url() -> String {
    "https://eservices.minnstate.edu/registration/search/".to_string()
}

fn default_scraper_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("headcounts/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_result_number() -> u32 {
    250
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            base_url: None,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            raw_file: default_raw_file(),
            published_file: default_published_file(),
            backup_dir: default_backup_dir(),
            cache_dir: default_cache_dir(),
            college_map: default_college_map(),
            semesters_file: default_semesters_file(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            campus_id: default_campus_id(),
            base_url: default_scraper_base_url(),
            timeout_secs: default_scraper_timeout(),
            user_agent: default_user_agent(),
            result_number: default_result_number(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
