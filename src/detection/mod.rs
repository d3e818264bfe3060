// 检测稳定化模块
//
// 将逐帧的分类结果（类别 + 置信度）变成稳定、不闪烁的检测事件：
// 每个检测周期只触发一次音效，并在冷却期内抑制重复触发。
//
// 子模块：
// - sample: 预测样本与每帧最高项选择
// - smoother: 每个类别的滑动平均窗口
// - stabilizer: 每个类别的保持/冷却计时
// - arbiter: 全局画面仲裁（锁定、中性去抖）
// - engine: 串联以上各部分并调用输出
// - stats: 会话统计

pub mod arbiter;
pub mod engine;
pub mod sample;
pub mod smoother;
pub mod stabilizer;
pub mod stats;

pub use arbiter::{ArbiterState, DisplayDecision};
pub use engine::DetectionEngine;
pub use sample::{Prediction, PredictionSample, Timestamp};
pub use stats::SessionStats;
