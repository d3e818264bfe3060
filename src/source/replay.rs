// 录制回放识别源
//
// 每行一个 JSON 对象:
// {"t": 1200, "predictions": [{"label": "Hand omhoog", "probability": 0.93}, ...]}
// "t" 可省略；空行忽略。单行格式错误只影响该帧。

use super::{ClassifierSource, Tick};
use crate::error::{AppError, AppResult};
use std::collections::VecDeque;
use std::path::Path;
use tracing::{debug, info};

pub struct ReplaySource {
    lines: VecDeque<(usize, String)>,
}

impl ReplaySource {
    /// 打开录制文件，无法读取时返回 `SourceUnavailable`
    pub async fn open(path: &Path) -> AppResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::SourceUnavailable(format!("无法读取回放文件 {}: {}", path.display(), e))
        })?;
        let source = Self::from_lines(&content);
        info!("[SOURCE] 回放文件: {} ({} 帧)", path.display(), source.remaining());
        Ok(source)
    }

    pub fn from_lines(content: &str) -> Self {
        let lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| (index + 1, line.to_string()))
            .collect();
        Self { lines }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl ClassifierSource for ReplaySource {
    async fn next_prediction(&mut self) -> AppResult<Option<Tick>> {
        let Some((line_no, line)) = self.lines.pop_front() else {
            debug!("[SOURCE] 回放结束");
            return Ok(None);
        };
        serde_json::from_str::<Tick>(&line)
            .map(Some)
            .map_err(|e| AppError::Sample(format!("第 {} 行解析失败: {}", line_no, e)))
    }
}
