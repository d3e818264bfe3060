// 音效输出 - 调用外部播放器（默认 ffplay）
//
// 播放进程后台运行，play 立即返回。新的播放开始前终止上一个仍在运行的进程，
// 保证每次都从头播放。

use super::AudioSink;
use crate::config::AudioConfig;
use crate::error::{AppError, AppResult};
use crate::utils::{hidden_command, resolve_tool_path};
use std::path::Path;
use std::process::{Child, Stdio};
use tracing::{debug, info};

pub struct CommandAudioSink {
    program: String,
    args: Vec<String>,
    current: Option<Child>,
}

impl CommandAudioSink {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: resolve_tool_path(program),
            args,
            current: None,
        }
    }

    pub fn from_config(config: &AudioConfig) -> Self {
        let sink = Self::new(&config.player, config.player_args.clone());
        info!("[AUDIO] 播放器: {} {}", sink.program, sink.args.join(" "));
        sink
    }

    /// 终止上一次仍在播放的进程
    fn stop_current(&mut self) {
        if let Some(mut child) = self.current.take() {
            match child.try_wait() {
                Ok(Some(_)) => {}
                _ => {
                    debug!("[AUDIO] 打断上一次播放: pid={}", child.id());
                    if let Err(e) = child.kill() {
                        debug!("[AUDIO] 终止播放进程失败: {}", e);
                    }
                    if let Err(e) = child.wait() {
                        debug!("[AUDIO] 等待播放进程退出失败: {}", e);
                    }
                }
            }
        }
    }
}

impl AudioSink for CommandAudioSink {
    fn play(&mut self, label: &str, clip: &Path) -> AppResult<()> {
        self.stop_current();

        let child = hidden_command(&self.program)
            .args(&self.args)
            .arg(clip)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AppError::SinkEffect(format!("启动播放器 {} 失败: {}", self.program, e)))?;

        info!("[AUDIO] 播放 {} -> {} (pid={})", label, clip.display(), child.id());
        self.current = Some(child);
        Ok(())
    }
}

impl Drop for CommandAudioSink {
    fn drop(&mut self) {
        self.stop_current();
    }
}

/// 关闭音频时使用：只记录日志
#[derive(Debug, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn play(&mut self, label: &str, clip: &Path) -> AppResult<()> {
        info!("[AUDIO] 音频已关闭，跳过播放 {} ({})", label, clip.display());
        Ok(())
    }
}
