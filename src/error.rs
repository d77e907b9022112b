pub type BoothResult<T> = Result<T, BoothError>;

#[derive(thiserror::Error, Debug)]
pub enum BoothError {
    /// Camera absent or faulted. Fatal for the current cycle; no merge runs.
    #[error("device error: {0}")]
    Device(String),

    /// Merge invoked with zero images in the working directory.
    #[error("no images to merge: {0}")]
    EmptyInput(String),

    /// DNS or connection failure while talking to the WebDAV endpoint.
    #[error("network error: {0}")]
    Network(String),

    #[error("config error: {0}")]
    Config(String),

    /// External interrupt (Ctrl-C / SIGINT) observed between steps.
    #[error("interrupted")]
    Interrupted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoothError {
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Process exit code for this failure. Capture/merge problems exit 1,
    /// upload/network problems exit 2, a clean interrupt exits 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Interrupted => 0,
            Self::Network(_) => 2,
            Self::Device(_) | Self::EmptyInput(_) | Self::Config(_) | Self::Other(_) => 1,
        }
    }
}
