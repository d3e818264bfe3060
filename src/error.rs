// 错误处理模块

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// 分类器或其上游（摄像头）无法获取，启动阶段致命
    #[error("识别源不可用: {0}")]
    SourceUnavailable(String),

    /// 单次预测失败，跳过该帧
    #[error("预测样本错误: {0}")]
    Sample(String),

    /// 播放/渲染失败，记录日志后忽略
    #[error("输出效果失败: {0}")]
    SinkEffect(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("未找到: {0}")]
    NotFound(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_message() {
        let err = AppError::Sample("空的预测列表".to_string());
        assert_eq!(err.to_string(), "预测样本错误: 空的预测列表");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
