use thiserror::Error;

use crate::upstream::FetchError;

/// Request-level failures, each mapping to one terminal error response.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("malformed request")]
    BadRequest,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("upstream connect timed out")]
    GatewayTimeout,

    #[error("bad gateway: {0}")]
    BadGateway(#[source] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProxyError {
    /// Status code and reason phrase for the synthesized error response.
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            Self::BadRequest => (400, "Bad Request"),
            Self::MethodNotAllowed => (405, "Method Not Allowed"),
            Self::GatewayTimeout => (504, "Gateway Timeout"),
            Self::BadGateway(_) => (502, "Bad Gateway"),
            Self::Internal(_) => (500, "Internal Server Error"),
        }
    }
}

impl From<FetchError> for ProxyError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::ConnectTimeout { .. } => Self::GatewayTimeout,
            FetchError::Connect { source, .. } | FetchError::Transfer { source, .. } => {
                Self::BadGateway(source)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProxyError;
    use crate::upstream::FetchError;
    use std::io;

    #[test]
    fn connect_timeout_maps_to_504() {
        let err = ProxyError::from(FetchError::ConnectTimeout {
            addr: "example.com:80".into(),
        });
        assert_eq!(err.status(), (504, "Gateway Timeout"));
    }

    #[test]
    fn refused_connection_maps_to_502() {
        let err = ProxyError::from(FetchError::Connect {
            addr: "example.com:80".into(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        });
        assert_eq!(err.status(), (502, "Bad Gateway"));
    }

    #[test]
    fn transfer_failure_maps_to_502() {
        let err = ProxyError::from(FetchError::Transfer {
            addr: "example.com:80".into(),
            source: io::Error::from(io::ErrorKind::ConnectionReset),
        });
        assert_eq!(err.status(), (502, "Bad Gateway"));
    }

    #[test]
    fn request_errors_map_to_4xx() {
        assert_eq!(ProxyError::BadRequest.status().0, 400);
        assert_eq!(ProxyError::MethodNotAllowed.status().0, 405);
    }
}
