mod authorize;
mod config;
mod directory;
mod discovery;
mod record;
mod session;

pub use authorize::*;
pub use config::*;
pub use directory::*;
pub use discovery::*;
pub use record::*;
pub use session::*;
