// 预测样本
//
// 分类器每帧输出所有类别的概率，引擎只处理其中概率最高的一项。
// 只有胜出类别的平滑窗口会在该帧增长，很少胜出的类别平滑得更慢。

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 单调时钟毫秒数
pub type Timestamp = u64;

/// 分类器对单个类别的输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self { label: label.into(), probability }
    }
}

/// 送入引擎的单帧样本
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSample {
    pub label: String,
    pub probability: f64,
    pub timestamp: Timestamp,
}

impl PredictionSample {
    pub fn new(label: impl Into<String>, probability: f64, timestamp: Timestamp) -> Self {
        Self { label: label.into(), probability, timestamp }
    }

    /// 从一帧的全部预测中取概率最高的一项
    pub fn from_top(predictions: &[Prediction], timestamp: Timestamp) -> AppResult<Self> {
        let top = select_top(predictions)
            .ok_or_else(|| AppError::Sample("预测结果为空".to_string()))?;
        Ok(Self::new(top.label.clone(), top.probability, timestamp))
    }
}

/// 选出概率最高的预测
///
/// 概率相同时取序列中最先出现的一项，结果依赖分类器输出顺序。
/// NaN 不会胜过任何数值（严格大于比较），但也不会被过滤。
pub fn select_top(predictions: &[Prediction]) -> Option<&Prediction> {
    let mut iter = predictions.iter();
    let first = iter.next()?;
    Some(iter.fold(first, |best, candidate| {
        if candidate.probability > best.probability {
            candidate
        } else {
            best
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_highest() {
        let preds = vec![
            Prediction::new("Boek lezen", 0.1),
            Prediction::new("Hand omhoog", 0.7),
            Prediction::new("Duim omhoog", 0.2),
        ];
        assert_eq!(select_top(&preds).unwrap().label, "Hand omhoog");
    }

    #[test]
    fn test_tie_prefers_first() {
        let preds = vec![
            Prediction::new("A", 0.2),
            Prediction::new("B", 0.4),
            Prediction::new("C", 0.4),
        ];
        assert_eq!(select_top(&preds).unwrap().label, "B");

        let reversed: Vec<_> = preds.into_iter().rev().collect();
        assert_eq!(select_top(&reversed).unwrap().label, "C");
    }

    #[test]
    fn test_empty_is_sample_error() {
        assert!(select_top(&[]).is_none());
        assert!(matches!(PredictionSample::from_top(&[], 10), Err(AppError::Sample(_))));
    }

    #[test]
    fn test_nan_never_wins_against_number() {
        let preds = vec![Prediction::new("A", 0.3), Prediction::new("B", f64::NAN)];
        assert_eq!(select_top(&preds).unwrap().label, "A");
    }

    #[test]
    fn test_out_of_range_passes_through() {
        let sample = PredictionSample::from_top(&[Prediction::new("A", 1.2)], 5).unwrap();
        assert_eq!(sample, PredictionSample::new("A", 1.2, 5));
    }
}
