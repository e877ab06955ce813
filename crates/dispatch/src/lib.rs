//! Outbound side of the relay: the transport seam, single-shot dispatch and
//! the action orchestrator shared by the CLI binary and the HTTP service.

pub mod action;
pub mod dispatcher;
pub mod transport;

pub use action::{run_action, Collaborators, ACTION_ERROR_CONTEXT};
pub use dispatcher::{build_request, dispatch};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, MAX_REDIRECTS};
