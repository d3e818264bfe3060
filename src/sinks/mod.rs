// 输出效果模块
//
// 引擎只通过这两个 trait 产生副作用。调用均为“触发即返回”：
// 播放器/界面自己的耗时不阻塞逐帧处理，失败以 Result 返回，由引擎记录后忽略。
//
// 子模块：
// - audio: 调用外部播放器（ffplay）播放音效
// - display: 控制台画面/状态输出

pub mod audio;
pub mod display;

#[cfg(test)]
pub mod recording;

use crate::error::AppResult;
use std::path::Path;

/// 当前画面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scene {
    /// 无检测
    Neutral,
    /// 已确认的类别
    Detected(String),
}

impl Scene {
    pub fn label(&self) -> Option<&str> {
        match self {
            Scene::Neutral => None,
            Scene::Detected(label) => Some(label),
        }
    }
}

/// 音效输出
///
/// 每次播放都从头开始；上一次未结束的播放由实现自行打断。
pub trait AudioSink: Send {
    fn play(&mut self, label: &str, clip: &Path) -> AppResult<()>;
}

/// 画面输出
pub trait DisplaySink: Send {
    /// 切换画面，`image` 为该画面对应的图片（可能没有）
    fn render(&mut self, scene: &Scene, image: Option<&Path>) -> AppResult<()>;

    /// 更新状态文字
    fn render_status_text(&mut self, text: &str) -> AppResult<()>;
}
