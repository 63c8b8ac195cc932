//! Messages crossing the UI boundary
//!
//! Both directions are closed tagged unions serialized with a `type` field.

mod inbound;
mod outbound;
mod sink;

pub use inbound::InboundEvent;
pub use outbound::{AgentStatus, NoticeLevel, OutboundEvent};
pub use sink::{ChannelSink, EventSink, NoopSink, RecordingSink};
