//! Port definitions wiring the sync client to its host application.
//!
//! Ports keep the connection layer free of auth and presentation details:
//! the host supplies a bearer-token lookup and (optionally) a sink for the
//! server notices that bypass the store.

mod notice_sink;
mod token_provider;

pub use notice_sink::{NoopNoticeSink, NoticeSink};
pub use token_provider::{BearerTokenProvider, StaticTokenProvider};
