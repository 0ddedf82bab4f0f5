use std::io;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a complete response
    #[error("error executing {context} request")]
    Network {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with an unexpected status
    #[error("error from API: {status} {body}")]
    Api { status: StatusCode, body: String },

    #[error("{context} response larger than {limit} bytes")]
    TooLarge { context: &'static str, limit: usize },

    #[error("error decoding {context} json")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("error writing movements")]
    Output(#[from] io::Error),
}
