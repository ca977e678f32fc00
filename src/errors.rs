use std::fmt;

#[derive(Debug, Clone)]
pub enum HeadcountError {
    Config(String),
    FileOperation(String),
    Csv(String),
    Serialization(String),
    Http(String),
    Scrape(String),
    Validation(String),
    NotFound(String),
    DataIntegrity(String),
}

impl HeadcountError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            HeadcountError::Config(_) => "E001",
            HeadcountError::FileOperation(_) => "E002",
            HeadcountError::Csv(_) => "E003",
            HeadcountError::Serialization(_) => "E004",
            HeadcountError::Http(_) => "E005",
            HeadcountError::Scrape(_) => "E006",
            HeadcountError::Validation(_) => "E007",
            HeadcountError::NotFound(_) => "E008",
            HeadcountError::DataIntegrity(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            HeadcountError::Config(_) => "Configuration Error",
            HeadcountError::FileOperation(_) => "File Operation Error",
            HeadcountError::Csv(_) => "CSV Error",
            HeadcountError::Serialization(_) => "Serialization Error",
            HeadcountError::Http(_) => "HTTP Request Error",
            HeadcountError::Scrape(_) => "Scrape Error",
            HeadcountError::Validation(_) => "Validation Error",
            HeadcountError::NotFound(_) => "Resource Not Found",
            HeadcountError::DataIntegrity(_) => "Data Integrity Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            HeadcountError::Config(msg)
            | HeadcountError::FileOperation(msg)
            | HeadcountError::Csv(msg)
            | HeadcountError::Serialization(msg)
            | HeadcountError::Http(msg)
            | HeadcountError::Scrape(msg)
            | HeadcountError::Validation(msg)
            | HeadcountError::NotFound(msg)
            | HeadcountError::DataIntegrity(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for HeadcountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for HeadcountError {}

// 便捷的构造函数
impl HeadcountError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        HeadcountError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        HeadcountError::FileOperation(msg.into())
    }

    pub fn csv<T: Into<String>>(msg: T) -> Self {
        HeadcountError::Csv(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        HeadcountError::Serialization(msg.into())
    }

    pub fn http<T: Into<String>>(msg: T) -> Self {
        HeadcountError::Http(msg.into())
    }

    pub fn scrape<T: Into<String>>(msg: T) -> Self {
        HeadcountError::Scrape(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        HeadcountError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        HeadcountError::NotFound(msg.into())
    }

    pub fn data_integrity<T: Into<String>>(msg: T) -> Self {
        HeadcountError::DataIntegrity(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for HeadcountError {
    fn from(err: std::io::Error) -> Self {
        HeadcountError::FileOperation(err.to_string())
    }
}

impl From<csv::Error> for HeadcountError {
    fn from(err: csv::Error) -> Self {
        HeadcountError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for HeadcountError {
    fn from(err: serde_json::Error) -> Self {
        HeadcountError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HeadcountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(HeadcountError::scrape("x").code(), "E006");
        assert_eq!(HeadcountError::not_found("x").code(), "E008");
    }

    #[test]
    fn test_format_simple() {
        let err = HeadcountError::validation("Select a subject when using class codes");
        assert_eq!(
            err.to_string(),
            "Validation Error: Select a subject when using class codes"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HeadcountError = io.into();
        assert_eq!(err.code(), "E002");
        assert!(err.message().contains("gone"));
    }
}
