use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ArbError {
    /// Pool state could not be fetched or was malformed (zero reserves, missing fields)
    #[error("Quote Unavailable: {0}")]
    QuoteUnavailable(String),

    /// Pool cannot fill the requested amount without exhausting its liquidity
    #[error("Insufficient Liquidity: {0}")]
    InsufficientLiquidity(String),

    /// Swap was not executed: signing failure, transport failure or on-chain revert
    #[error("Swap Rejected: {0}")]
    SwapRejected(String),

    /// Network gas price is above the configured ceiling
    #[error("Gas Price Exceeded: network price {current} > ceiling {ceiling}")]
    GasPriceExceeded { current: u64, ceiling: u64 },

    /// A trade on the same pool is still in flight
    #[error("Lock Contention: {0}")]
    LockContention(String),

    /// Configuration errors, fatal at startup
    #[error("Config Error: {0}")]
    ConfigError(String),

    /// Transport-level failures talking to the RPC node or signer
    #[error("Network Error: {0}")]
    NetworkError(String),

    /// Parsing errors for RPC payloads or pool data
    #[error("Parse Error: {0}")]
    ParseError(String),

    /// Invalid amount errors
    #[error("Invalid Amount: {0}")]
    InvalidAmount(String),

    /// Pool not found errors
    #[error("Pool Not Found: {0}")]
    PoolNotFound(String),

    /// Signer refused or failed to sign a payload
    #[error("Signing Error: {0}")]
    SigningError(String),
}

impl From<serde_json::Error> for ArbError {
    fn from(err: serde_json::Error) -> Self {
        ArbError::ParseError(format!("JSON serialization/deserialization error: {}", err))
    }
}

impl From<reqwest::Error> for ArbError {
    fn from(err: reqwest::Error) -> Self {
        ArbError::NetworkError(format!("HTTP client error: {}", err))
    }
}

impl From<std::io::Error> for ArbError {
    fn from(err: std::io::Error) -> Self {
        ArbError::ConfigError(format!("I/O error: {}", err))
    }
}

impl From<url::ParseError> for ArbError {
    fn from(err: url::ParseError) -> Self {
        ArbError::ConfigError(format!("Invalid URL: {}", err))
    }
}

impl ArbError {
    /// Everything except configuration problems is contained at its origin and
    /// only logged; the scheduling loop keeps going.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ArbError::ConfigError(_))
    }

    /// Short category label used in log lines and drop counters.
    pub fn category(&self) -> &'static str {
        match self {
            ArbError::QuoteUnavailable(_) => "quote_unavailable",
            ArbError::InsufficientLiquidity(_) => "insufficient_liquidity",
            ArbError::SwapRejected(_) => "swap_rejected",
            ArbError::GasPriceExceeded { .. } => "gas_price_exceeded",
            ArbError::LockContention(_) => "lock_contention",
            ArbError::ConfigError(_) => "config",
            ArbError::NetworkError(_) => "network",
            ArbError::ParseError(_) => "parse",
            ArbError::InvalidAmount(_) => "invalid_amount",
            ArbError::PoolNotFound(_) => "pool_not_found",
            ArbError::SigningError(_) => "signing",
        }
    }
}
