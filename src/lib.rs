// GestureCue - 手势识别稳定化与音效触发引擎
//
// 输入逐帧分类结果，输出去抖后的检测事件：确认时播放一次音效并切换画面，
// 冷却期内不重复触发。

pub mod assets;
pub mod config;
pub mod detection;
pub mod error;
pub mod logging;
pub mod runner;
pub mod sinks;
pub mod source;
pub mod utils;
