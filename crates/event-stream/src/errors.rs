use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum StreamErrorKind {
    #[error("connect failed: {0}")]
    ConnectFailed(String),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

#[derive(Clone, Debug, Error)]
#[error(transparent)]
pub struct StreamError(pub StreamErrorKind);

impl StreamError {
    pub fn kind(&self) -> &StreamErrorKind {
        &self.0
    }
}

impl From<StreamErrorKind> for StreamError {
    fn from(kind: StreamErrorKind) -> Self {
        StreamError(kind)
    }
}
