// 平滑窗口：每个类别最近 N 次概率的滑动平均

use std::collections::VecDeque;

/// 固定容量的先进先出窗口
#[derive(Debug, Clone)]
pub struct SmoothingBuffer {
    values: VecDeque<f64>,
    capacity: usize,
}

impl SmoothingBuffer {
    /// 容量至少为 1（由配置校验保证）
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 追加一个概率并返回当前窗口平均值
    ///
    /// 不做截断，超出 [0,1] 的输入原样参与平均。
    pub fn push(&mut self, probability: f64) -> f64 {
        self.values.push_back(probability);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn average(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
