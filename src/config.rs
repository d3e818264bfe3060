// 配置管理模块

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::fs;
use crate::error::{AppError, AppResult};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{info, warn};

static CONFIG: OnceCell<RwLock<AppConfig>> = OnceCell::new();
static CONFIG_PATH: OnceCell<PathBuf> = OnceCell::new();

/// 日志级别
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    /// 转换为 tracing 过滤器字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// 检测稳定化参数（时间单位均为毫秒）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// 置信区间下限（含）
    pub confidence_threshold: f64,
    /// 置信区间上限（含）
    pub max_threshold: f64,
    /// 连续处于置信区间多久才确认
    pub hold_time_ms: u64,
    /// 同一类别两次触发的最小间隔
    pub cooldown_ms: u64,
    /// 平滑窗口长度
    pub buffer_size: usize,
    /// 确认后画面锁定时长
    pub display_hold_duration_ms: u64,
    /// 两次切回中性画面的最小间隔
    pub neutral_hold_duration_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.9,
            max_threshold: 1.0,
            hold_time_ms: 2000,
            cooldown_ms: 4000,
            buffer_size: 5,
            display_hold_duration_ms: 5000,
            neutral_hold_duration_ms: 500,
        }
    }
}

impl EngineConfig {
    /// 校验参数合法性
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("max_threshold", self.max_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::Config(format!("{} 必须在 0.0 - 1.0 之间: {}", name, value)));
            }
        }
        if self.confidence_threshold > self.max_threshold {
            return Err(AppError::Config(format!(
                "confidence_threshold ({}) 不能大于 max_threshold ({})",
                self.confidence_threshold, self.max_threshold
            )));
        }
        if self.buffer_size == 0 {
            return Err(AppError::Config("buffer_size 至少为 1".to_string()));
        }
        Ok(())
    }
}

/// 音效/图片资源映射
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// 音效目录，按文件名（不含扩展名）映射到类别
    pub sounds_dir: Option<PathBuf>,
    /// 图片目录，规则同上
    pub images_dir: Option<PathBuf>,
    /// 显式音效映射，优先于目录扫描结果
    pub label_to_sound: HashMap<String, PathBuf>,
    /// 显式图片映射
    pub label_to_image: HashMap<String, PathBuf>,
    /// 中性类别名（其图片作为无检测时的画面）
    pub neutral_label: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            sounds_dir: Some(PathBuf::from("my_sounds")),
            images_dir: Some(PathBuf::from("my_images")),
            label_to_sound: HashMap::new(),
            label_to_image: HashMap::new(),
            neutral_label: "Neutraal".to_string(),
        }
    }
}

/// 识别源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 回放文件（JSON lines）
    pub replay_path: Option<PathBuf>,
    /// 帧间隔，0 表示不限速
    pub frame_interval_ms: u64,
    /// 最多处理多少帧，None 表示直到识别源结束
    pub max_ticks: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            replay_path: None,
            frame_interval_ms: 33,
            max_ticks: None,
        }
    }
}

/// 音频播放配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    /// 外部播放器程序名
    pub player: String,
    /// 播放器参数，音频路径追加在最后
    pub player_args: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            player: "ffplay".to_string(),
            player_args: vec![
                "-nodisp".to_string(),
                "-autoexit".to_string(),
                "-loglevel".to_string(),
                "quiet".to_string(),
            ],
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// 检测稳定化参数
    #[serde(default)]
    pub engine: EngineConfig,
    /// 资源映射
    #[serde(default)]
    pub assets: AssetConfig,
    /// 识别源
    #[serde(default)]
    pub source: SourceConfig,
    /// 音频播放
    #[serde(default)]
    pub audio: AudioConfig,
    /// 日志级别
    #[serde(default)]
    pub log_level: LogLevel,
}

/// 配置来源（日志系统初始化之后再输出）
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOrigin {
    /// 读取自已有文件
    File,
    /// 文件不存在，已写入默认配置
    Created,
    /// 文件解析失败，使用默认配置
    Fallback(String),
}

impl ConfigOrigin {
    pub fn report(&self, config_path: &Path) {
        match self {
            ConfigOrigin::File => info!("[CONFIG] 配置已加载: {}", config_path.display()),
            ConfigOrigin::Created => info!("[CONFIG] 已写入默认配置: {}", config_path.display()),
            ConfigOrigin::Fallback(reason) => warn!(
                "[CONFIG] 配置文件 JSON 解析失败: {}，使用默认配置 ({})",
                reason,
                config_path.display()
            ),
        }
    }
}

/// 读取配置文件；不存在时写入默认配置，解析失败时回退到默认配置
pub fn load_config_file(config_path: &Path) -> AppResult<(AppConfig, ConfigOrigin)> {
    if config_path.exists() {
        let content = fs::read_to_string(config_path)?;
        Ok(match serde_json::from_str(&content) {
            Ok(config) => (config, ConfigOrigin::File),
            Err(e) => (AppConfig::default(), ConfigOrigin::Fallback(e.to_string())),
        })
    } else {
        let config = AppConfig::default();
        let content = serde_json::to_string_pretty(&config)?;
        fs::write(config_path, content)?;
        Ok((config, ConfigOrigin::Created))
    }
}

/// 初始化配置
///
/// 在日志系统之前调用，来源信息由调用方在日志就绪后通过 `ConfigOrigin::report` 输出。
pub fn init_config(config_path: &Path) -> AppResult<ConfigOrigin> {
    CONFIG_PATH.set(config_path.to_path_buf())
        .map_err(|_| AppError::Config("配置路径已初始化".to_string()))?;

    let (config, origin) = load_config_file(config_path)?;

    CONFIG.set(RwLock::new(config))
        .map_err(|_| AppError::Config("配置已初始化".to_string()))?;

    Ok(origin)
}

/// 获取配置
pub fn get_config() -> AppConfig {
    CONFIG.get()
        .map(|c| c.read().clone())
        .unwrap_or_default()
}
