pub mod adapter;
pub mod error;
pub mod http;
pub mod listing;
pub mod model;
pub mod service;

pub use adapter::{Extracted, Extraction, SiteAdapter};
pub use error::{ResolveError, ResolveResult};
pub use model::{ChannelDescriptor, ResolvedChannel, ServerLookupResponse, StreamHeaders};
pub use service::{ChannelResolver, DaddyHdService, DynChannelResolver};
