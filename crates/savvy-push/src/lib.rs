pub mod dispatcher;

pub use dispatcher::{PushDispatcher, VapidIdentity};
