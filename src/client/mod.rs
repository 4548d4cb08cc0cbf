//! Client side of the upload flow: the form model and the transport that
//! posts it to the gateway.

mod transport;
mod upload_form;

pub use transport::{
    GatewayErrorKind, HttpUploadTransport, TransportError, UploadPayload, UploadTransport,
};
pub use upload_form::{FormError, SelectedFile, UploadForm};
