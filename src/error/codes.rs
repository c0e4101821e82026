#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    TargetNotFound = 3,
    PermissionError = 4,
    HistoryError = 5,
    Cancelled = 6,
    /// The run finished but some files could not be renamed or restored
    ItemErrors = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}
