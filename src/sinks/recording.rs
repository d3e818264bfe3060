// 测试用输出：记录所有调用，可配置为失败

use super::{AudioSink, DisplaySink, Scene};
use crate::error::{AppError, AppResult};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Render(Scene, Option<PathBuf>),
    Status(String),
}

#[derive(Clone, Default)]
pub struct RecordingAudioSink {
    pub plays: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl RecordingAudioSink {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn played(&self) -> Vec<String> {
        self.plays.lock().clone()
    }
}

impl AudioSink for RecordingAudioSink {
    fn play(&mut self, label: &str, _clip: &Path) -> AppResult<()> {
        self.plays.lock().push(label.to_string());
        if self.fail {
            return Err(AppError::SinkEffect(format!("播放失败: {}", label)));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingDisplaySink {
    pub events: Arc<Mutex<Vec<DisplayEvent>>>,
    pub fail: bool,
}

impl RecordingDisplaySink {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().clone()
    }

    /// 最后一次切换的画面
    pub fn last_scene(&self) -> Option<Scene> {
        self.events.lock().iter().rev().find_map(|e| match e {
            DisplayEvent::Render(scene, _) => Some(scene.clone()),
            DisplayEvent::Status(_) => None,
        })
    }

    pub fn last_status(&self) -> Option<String> {
        self.events.lock().iter().rev().find_map(|e| match e {
            DisplayEvent::Status(text) => Some(text.clone()),
            DisplayEvent::Render(..) => None,
        })
    }

    pub fn render_count(&self) -> usize {
        self.events.lock().iter().filter(|e| matches!(e, DisplayEvent::Render(..))).count()
    }
}

impl DisplaySink for RecordingDisplaySink {
    fn render(&mut self, scene: &Scene, image: Option<&Path>) -> AppResult<()> {
        self.events.lock().push(DisplayEvent::Render(scene.clone(), image.map(Path::to_path_buf)));
        if self.fail {
            return Err(AppError::SinkEffect("渲染失败".to_string()));
        }
        Ok(())
    }

    fn render_status_text(&mut self, text: &str) -> AppResult<()> {
        self.events.lock().push(DisplayEvent::Status(text.to_string()));
        if self.fail {
            return Err(AppError::SinkEffect("状态文字更新失败".to_string()));
        }
        Ok(())
    }
}
