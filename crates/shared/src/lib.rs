//! Wire DTOs for the Coup REST façade and its outbound gateway/LLM push
//! contracts. No business logic lives here — see `coup-domain` for
//! entities and `coup-engine` for behavior.

pub mod gateway;
pub mod requests;
pub mod responses;

pub use gateway::{GatewayBroadcastPayload, GatewayMessage, LlmEventPayload};
pub use requests::*;
pub use responses::*;
