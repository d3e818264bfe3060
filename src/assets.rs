// 资源映射模块
//
// 类别 → 音效文件 / 图片文件。没有音效映射的类别即使置信度达标也不会触发确认，
// 没有图片映射的类别确认时不切换画面。

use crate::config::AssetConfig;
use crate::error::{AppError, AppResult};
use crate::utils::resolve_relative;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// 支持的音频格式
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "aac"];

/// 支持的图片格式
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    sounds: HashMap<String, PathBuf>,
    images: HashMap<String, PathBuf>,
    neutral_label: String,
}

impl AssetCatalog {
    pub fn new(neutral_label: impl Into<String>) -> Self {
        Self {
            sounds: HashMap::new(),
            images: HashMap::new(),
            neutral_label: neutral_label.into(),
        }
    }

    /// 根据配置构建资源映射
    ///
    /// 先扫描目录，再用显式映射覆盖。相对路径以 `base_dir` 为基准。
    pub fn from_config(config: &AssetConfig, base_dir: &Path) -> AppResult<Self> {
        let mut catalog = Self::new(config.neutral_label.clone());

        if let Some(dir) = &config.sounds_dir {
            catalog.sounds = scan_dir(&resolve_relative(base_dir, dir), AUDIO_EXTENSIONS)?;
        }
        if let Some(dir) = &config.images_dir {
            catalog.images = scan_dir(&resolve_relative(base_dir, dir), IMAGE_EXTENSIONS)?;
        }

        for (label, path) in &config.label_to_sound {
            catalog.sounds.insert(label.clone(), resolve_relative(base_dir, path));
        }
        for (label, path) in &config.label_to_image {
            catalog.images.insert(label.clone(), resolve_relative(base_dir, path));
        }

        info!("[ASSETS] 音效 {} 个, 图片 {} 个, 中性类别: {}",
            catalog.sounds.len(), catalog.images.len(), catalog.neutral_label);
        Ok(catalog)
    }

    pub fn with_sound(mut self, label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.sounds.insert(label.into(), path.into());
        self
    }

    pub fn with_image(mut self, label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.images.insert(label.into(), path.into());
        self
    }

    pub fn sound_for(&self, label: &str) -> Option<&Path> {
        self.sounds.get(label).map(PathBuf::as_path)
    }

    pub fn image_for(&self, label: &str) -> Option<&Path> {
        self.images.get(label).map(PathBuf::as_path)
    }

    /// 中性画面使用中性类别的图片
    pub fn neutral_image(&self) -> Option<&Path> {
        self.image_for(&self.neutral_label)
    }

    pub fn neutral_label(&self) -> &str {
        &self.neutral_label
    }
}

/// 扫描目录，以文件名（不含扩展名）作为类别名
///
/// 目录不存在时只记录警告，返回空映射；路径存在但不是目录视为配置错误。
fn scan_dir(dir: &Path, extensions: &[&str]) -> AppResult<HashMap<String, PathBuf>> {
    if !dir.exists() {
        warn!("[ASSETS] 资源目录不存在，跳过: {}", dir.display());
        return Ok(HashMap::new());
    }
    if !dir.is_dir() {
        return Err(AppError::NotFound(format!("不是目录: {}", dir.display())));
    }

    let entries = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let path = e.path();
            let ext = path.extension()?.to_string_lossy().to_lowercase();
            if !extensions.contains(&ext.as_str()) {
                return None;
            }
            let label = path.file_stem()?.to_string_lossy().to_string();
            debug!("[ASSETS] {} -> {}", label, path.display());
            Some((label, path.to_path_buf()))
        })
        .collect();

    Ok(entries)
}
