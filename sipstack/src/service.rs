use crate::{
    transport::{IncomingRequest, IncomingResponse},
    Endpoint, Result,
};

/// A trait which provides a way to extend the SIP endpoint functionalities.
#[async_trait::async_trait]
#[allow(unused_variables)]
pub trait SipService: Sync + Send + 'static {
    /// Returns the service name.
    fn name(&self) -> &str;

    /// Called when an inbound SIP request is received.
    ///
    /// A service that fully handles the request takes it out of `request`
    /// (leaving `None`) so later services in the chain are skipped.
    async fn on_incoming_request(&self, endpoint: &Endpoint, request: &mut Option<IncomingRequest>) -> Result<bool> {
        Ok(false)
    }

    /// Called when an inbound SIP response is received.
    ///
    /// A service that fully handles the response takes it out of
    /// `response` (leaving `None`) so later services in the chain are
    /// skipped.
    async fn on_incoming_response(&self, endpoint: &Endpoint, response: &mut Option<IncomingResponse>) -> Result<bool> {
        Ok(false)
    }
}
