//! Argo engine: transports, session thread and artifact delivery.
mod decode;
mod delivery;
mod engine;
mod http;
mod transport;
mod types;
mod ws;

pub use decode::decode_payload;
pub use delivery::{
    deliver, ensure_output_dir, prepare_download, sanitize_filename, synthesized_filename,
    write_download, DeliveryError, Download, CSV_MIME, UTF8_BOM,
};
pub use engine::{connector_for, SessionHandle};
pub use http::HttpConnector;
pub use transport::{parse_endpoint, Channel, ChannelEventSink, Connector, EventSink};
pub use types::{TransportError, TransportEvent, TransportKind, TransportSettings};
pub use ws::WsConnector;
