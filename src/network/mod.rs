pub mod api;
pub mod connection;
pub mod socketio;
pub mod transport;

pub use api::ApiClient;
pub use connection::{
    Connection, ConnectionHandle, ConnectionLink, ConnectionManager, Connector, EventSink,
    SubscriptionId,
};
pub use transport::SocketIoConnector;
