// 控制台画面输出
//
// 画面切换和状态文字写到标准输出，同时记录日志。
// 每帧都会刷新状态文字，相同内容只输出一次。

use super::{DisplaySink, Scene};
use crate::error::AppResult;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

pub struct ConsoleDisplaySink<W: Write + Send> {
    out: W,
    last_status: Option<String>,
    last_scene: Option<Scene>,
}

impl ConsoleDisplaySink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleDisplaySink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_status: None,
            last_scene: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DisplaySink for ConsoleDisplaySink<W> {
    fn render(&mut self, scene: &Scene, image: Option<&Path>) -> AppResult<()> {
        if self.last_scene.as_ref() == Some(scene) {
            return Ok(());
        }
        let name = scene.label().unwrap_or("(neutral)");
        let image = image.map(|p| p.display().to_string()).unwrap_or_default();
        info!("[DISPLAY] 画面: {} {}", name, image);
        writeln!(self.out, "[scene] {} {}", name, image)?;
        self.last_scene = Some(scene.clone());
        Ok(())
    }

    fn render_status_text(&mut self, text: &str) -> AppResult<()> {
        if self.last_status.as_deref() == Some(text) {
            return Ok(());
        }
        debug!("[DISPLAY] 状态: {}", text);
        writeln!(self.out, "{}", text)?;
        self.out.flush()?;
        self.last_status = Some(text.to_string());
        Ok(())
    }
}
