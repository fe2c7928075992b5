/// Crate-wide result type for reply routing.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The abort signal was already set; no adapter was contacted.
    #[error("reply routing aborted before send")]
    Aborted,

    /// Adapter lookup or send failure.
    #[error(transparent)]
    Channel(#[from] switchboard_channels::Error),
}
