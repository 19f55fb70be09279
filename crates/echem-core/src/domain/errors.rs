use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EchemResult<T> = Result<T, EchemError>;
pub type AnalysisResult<T> = EchemResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EchemErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl EchemErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// Error raised at the batch and command boundary.
///
/// Analysis kernels report degenerate data through `Option`, empty
/// collections or NaN sentinels; this type only carries conditions that stop
/// a whole run, tagged with a stable placeholder code such as
/// `IO.NO_INPUT_FILES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchemError {
    category: EchemErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl EchemError {
    pub fn new(
        category: EchemErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            EchemErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(EchemErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(EchemErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(EchemErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> EchemErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for EchemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.name(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for EchemError {}

#[cfg(test)]
mod tests {
    use super::{EchemError, EchemErrorCategory};

    #[test]
    fn exit_codes_are_stable_per_category() {
        let cases = [
            (EchemErrorCategory::Success, 0, "Success"),
            (
                EchemErrorCategory::InputValidationError,
                2,
                "InputValidationError",
            ),
            (EchemErrorCategory::IoSystemError, 3, "IoSystemError"),
            (EchemErrorCategory::ComputationError, 4, "ComputationError"),
            (EchemErrorCategory::InternalError, 5, "InternalError"),
        ];

        for (category, exit_code, name) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.name(), name);
        }
    }

    #[test]
    fn fatal_error_renders_diagnostic_and_exit_lines() {
        let error = EchemError::input_validation(
            "INPUT.BATCH_EMPTY",
            "no .txt records found in 'run-07'",
        );

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.BATCH_EMPTY] no .txt records found in 'run-07'"
        );
        assert_eq!(
            error.fatal_exit_line().as_deref(),
            Some("FATAL EXIT CODE: 2")
        );
    }

    #[test]
    fn success_category_has_no_exit_line() {
        let notice = EchemError::new(EchemErrorCategory::Success, "RUN.DONE", "finished");
        assert_eq!(notice.diagnostic_line(), "INFO: [RUN.DONE] finished");
        assert_eq!(notice.fatal_exit_line(), None);
    }
}
