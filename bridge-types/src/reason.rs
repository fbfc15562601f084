/// The taxonomy buckets from the error handling design: callers use `kind()`
/// to decide retry vs. drop vs. abort without matching on every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Decode,
    Business,
    Consistency,
    Fatal,
}

/// The single error type threaded through the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    // Transient
    RpcUnavailable(String),
    DbUnavailable(String),
    Timeout,

    // Decode
    MalformedEvent(String),
    BadMemo,
    UnparsableAmount,

    // Business
    UnknownAsset,
    WrappedToWrappedForbidden,
    InvalidReceiver,
    ZeroAmountAfterDecimals,
    InvalidSignature,
    UnknownValidator,
    ScheduledBurnFailed,

    // Consistency
    Duplicate,

    // Fatal
    BadConfig(String),
    ZeroPrecision,

    // generic lookups
    NotFound,
}

impl Reason {
    pub fn kind(&self) -> ErrorKind {
        use Reason::*;
        match self {
            RpcUnavailable(_) | DbUnavailable(_) | Timeout => ErrorKind::Transient,
            MalformedEvent(_) | BadMemo | UnparsableAmount => ErrorKind::Decode,
            UnknownAsset
            | WrappedToWrappedForbidden
            | InvalidReceiver
            | ZeroAmountAfterDecimals
            | InvalidSignature
            | UnknownValidator
            | ScheduledBurnFailed
            | NotFound => ErrorKind::Business,
            Duplicate => ErrorKind::Consistency,
            BadConfig(_) | ZeroPrecision => ErrorKind::Fatal,
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Reason {}
