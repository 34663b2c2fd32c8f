use std::cell::Cell;

pub type RasterResult<T> = Result<T, RasterError>;

#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    #[error("no framebuffer: {0}")]
    NoBuffer(String),

    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[error("invalid parameters: {0}")]
    InvalidParam(String),

    #[error("non-finite geometry: {0}")]
    NonFinite(String),

    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    #[error("matrix stack underflow")]
    StackUnderflow,

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RasterError {
    pub fn no_buffer(msg: impl Into<String>) -> Self {
        Self::NoBuffer(msg.into())
    }

    pub fn out_of_memory(msg: impl Into<String>) -> Self {
        Self::OutOfMemory(msg.into())
    }

    pub fn param(msg: impl Into<String>) -> Self {
        Self::InvalidParam(msg.into())
    }

    pub fn non_finite(msg: impl Into<String>) -> Self {
        Self::NonFinite(msg.into())
    }

    pub fn bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Numeric code reported through [`last_error`].
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoBuffer(_) => ErrorCode::NoBuffer,
            Self::OutOfMemory(_) => ErrorCode::NoMemory,
            Self::InvalidParam(_) => ErrorCode::Param,
            Self::NonFinite(_) => ErrorCode::Infinite,
            Self::OutOfBounds(_) => ErrorCode::Bounds,
            Self::StackUnderflow => ErrorCode::Underflow,
            Self::Corrupt(_) => ErrorCode::Corrupt,
            Self::Unsupported(_) => ErrorCode::Unsupported,
            Self::Other(_) => ErrorCode::Unknown,
        }
    }
}

/// Stable numeric error codes, shared with the sticky per-thread error state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ErrorCode {
    #[default]
    Ok = 0,
    Unknown = -1,
    NoBuffer = -2,
    NoMemory = -3,
    Param = -4,
    Infinite = -5,
    Bounds = -6,
    Underflow = -7,
    NoData = -8,
    Decode = -9,
    Unsupported = -10,
    Corrupt = -11,
    Encode = -12,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Ok => "Success",
            Self::Unknown => "Unknown error",
            Self::NoBuffer => "No framebuffer",
            Self::NoMemory => "No memory",
            Self::Param => "Invalid parameters",
            Self::Infinite => "Infinite parameters",
            Self::Bounds => "Out of bounds",
            Self::Underflow => "Matrix stack underflow",
            Self::NoData => "Out of data",
            Self::Decode => "Image decoding error",
            Self::Unsupported => "Unsupported operation",
            Self::Corrupt => "Corrupted data",
            Self::Encode => "Image encoding error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

thread_local! {
    static LAST_ERROR: Cell<ErrorCode> = const { Cell::new(ErrorCode::Ok) };
}

/// The error code left behind by the most recent public call on this thread.
pub fn last_error() -> ErrorCode {
    LAST_ERROR.with(Cell::get)
}

pub(crate) fn set_last_error(code: ErrorCode) {
    LAST_ERROR.with(|c| c.set(code));
}

/// Records the outcome of a public call in the sticky error state and passes it through.
pub(crate) fn track<T>(result: RasterResult<T>) -> RasterResult<T> {
    match &result {
        Ok(_) => set_last_error(ErrorCode::Ok),
        Err(e) => set_last_error(e.code()),
    }
    result
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
