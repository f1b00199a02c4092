use thiserror::Error;

/// 错误分类: 校验失败 / 解析失败 / 渲染失败
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, SplitError>;
