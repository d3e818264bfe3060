// 识别源模块
//
// 摄像头采集与模型推理不在本 crate 内，统一抽象为 ClassifierSource：
// 每次调用返回一帧中所有类别的预测。
//
// 子模块：
// - replay: 从 JSON lines 录制文件回放预测

pub mod replay;

pub use replay::ReplaySource;

use crate::detection::{Prediction, Timestamp};
use crate::error::AppResult;
use serde::{Deserialize, Serialize};

/// 一帧的分类结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub predictions: Vec<Prediction>,
    /// 录制时的时间戳；实时源为 None，由运行循环的时钟补上
    #[serde(default, rename = "t", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

#[allow(async_fn_in_trait)]
pub trait ClassifierSource {
    /// 获取下一帧预测
    ///
    /// - `Ok(Some(tick))`: 正常的一帧
    /// - `Ok(None)`: 识别源已结束
    /// - `Err(AppError::Sample)`: 本帧失败，可跳过后继续
    async fn next_prediction(&mut self) -> AppResult<Option<Tick>>;
}
