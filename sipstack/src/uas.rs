#![deny(missing_docs)]
//! UAS validation pipeline.
//!
//! Generalizes the per-request checks a User Agent Server runs before
//! handing a request to application logic (RFC 3261 §8.2): is the
//! method supported, is this a loop, are the required extensions
//! available. The application plugs in by implementing [`UasHandler`];
//! [`UasPipeline`] wires it into the endpoint as a [`SipService`].

use async_trait::async_trait;

use crate::{
    headers::{Allow, Header, Require, Server, Supported, Unsupported},
    message::{SipMethod, StatusCode},
    service::SipService,
    transport::{IncomingRequest, IncomingResponse, OutgoingResponse},
    ua, Endpoint, Result,
};

/// What a [`UasHandler`] wants done after a request clears validation.
#[derive(Debug, Clone, Copy)]
pub enum UasAction {
    /// The handler has taken ownership of replying (later, or via a
    /// different transaction/dialog); the pipeline sends nothing now.
    NoReply,
    /// Reply immediately with the given status.
    Reply {
        /// Status code to send.
        status_code: i32,
        /// Reason phrase to send.
        reason: &'static str,
    },
}

/// The capability set a UAS plugs into the validation pipeline.
///
/// Replaces the "callback module as polymorphism" pattern with a single
/// object implementors provide; the pipeline calls through to it at
/// each step of RFC 3261 §8.2 instead of hardcoding application policy.
#[async_trait]
pub trait UasHandler: Sync + Send + 'static {
    /// Called once when the handler is installed, to let it register
    /// whatever state or endpoint capabilities it needs up front.
    fn init(&self) {}

    /// Dispatches a validated request to application logic.
    async fn on_request(&self, endpoint: &Endpoint, request: &IncomingRequest) -> UasAction;

    /// Methods this handler accepts. Populates `Allow` on 405 responses
    /// and on any outgoing response that doesn't already carry one.
    fn allow(&self) -> Allow;

    /// Extensions this handler supports. Populates `Supported` on
    /// outgoing responses that don't already carry one, and is checked
    /// against incoming `Require` tags.
    fn supported(&self) -> Supported<'static>;

    /// Returns `true` if `request` should be checked against the
    /// transaction layer's loop-detection index. Opt-in: proxies and
    /// registrars generally want this, a simple UAS may not bother.
    fn detect_loops(&self, request: &IncomingRequest) -> bool;

    /// Value for the `Server` header on outgoing responses that don't
    /// already carry one. `None` leaves the header absent.
    fn server(&self) -> Option<&'static str> {
        None
    }

    /// Called for events the pipeline doesn't interpret itself, e.g.
    /// transaction-layer notices the handler may want to log or act on.
    async fn handle_info(&self, _endpoint: &Endpoint, _info: &str) {}
}

/// Wires a [`UasHandler`] into the endpoint as a [`SipService`],
/// running the RFC 3261 §8.2 validation chain in front of it:
///
/// 1. `validate_method` — unsupported method -> 405 with `Allow`.
/// 2. `validate_loop` — loop detected (if the handler opts in) -> 482.
/// 3. `validate_required` — unsupported `Require` tag -> 420 with
///    `Unsupported`. Skipped for `CANCEL` and `ACK`, which are never
///    replied to in a way `Require` could apply.
///
/// Requests that pass are handed to [`UasHandler::on_request`]. Replies,
/// whether from the pipeline or the handler, get `Allow`/`Supported`/
/// `Server` filled in if absent, and are checked against the dialog
/// layer for dialog establishment before being sent through whichever
/// server transaction is carrying the request.
pub struct UasPipeline<H> {
    name: &'static str,
    handler: H,
}

impl<H: UasHandler> UasPipeline<H> {
    /// Wraps `handler` into a pipeline service, running its `init` hook.
    pub fn new(handler: H) -> Self {
        handler.init();
        Self { name: "uas", handler }
    }

    fn method_allowed(&self, request: &IncomingRequest) -> bool {
        matches!(request.method(), SipMethod::Ack | SipMethod::Cancel) || self.handler.allow().iter().any(|m| m == request.method())
    }

    fn unsupported_tags<'r>(&self, request: &'r IncomingRequest<'r>) -> Vec<&'r str> {
        let supported = self.handler.supported();
        request
            .request
            .headers
            .iter()
            .find_map(|h| match h {
                Header::Require(require) => Some(require),
                _ => None,
            })
            .map(|require| require.iter().filter(|tag| !supported.contains(*tag)).collect())
            .unwrap_or_default()
    }

    fn populate_capabilities(&self, response: &mut OutgoingResponse) {
        let has_allow = response.response.headers.iter().any(|h| matches!(h, Header::Allow(_)));
        if !has_allow {
            response.headers_mut().push(Header::Allow(self.handler.allow()));
        }

        let has_supported = response.response.headers.iter().any(|h| matches!(h, Header::Supported(_)));
        if !has_supported {
            response.headers_mut().push(Header::Supported(self.handler.supported()));
        }

        if let Some(server) = self.handler.server() {
            let has_server = response.response.headers.iter().any(|h| matches!(h, Header::Server(_)));
            if !has_server {
                response.headers_mut().push(Header::Server(Server::new(server)));
            }
        }
    }

    async fn send(&self, endpoint: &Endpoint, request: &IncomingRequest<'_>, mut response: OutgoingResponse<'_>) -> Result<()> {
        self.populate_capabilities(&mut response);

        if ua::is_dialog_establishing(request, &response) {
            ua::validate_dialog_response(request, &response)?;
            let dialog = ua::create_dialog(request, &response)?;
            if let Some(tsx) = request.transaction.as_ref() {
                tsx.set_dialog(dialog);
            }
        }

        match request.transaction.as_ref() {
            Some(tsx) => tsx.respond(&mut response).await,
            None => endpoint.send_response(&response).await,
        }
    }

    async fn reply(&self, endpoint: &Endpoint, request: &IncomingRequest<'_>, status_code: i32, reason: &str) -> Result<()> {
        let response = endpoint.new_response(request, status_code, reason);
        self.send(endpoint, request, response).await
    }
}

#[async_trait]
impl<H: UasHandler> SipService for UasPipeline<H> {
    fn name(&self) -> &str {
        self.name
    }

    async fn on_incoming_request(&self, endpoint: &Endpoint, request: &mut Option<IncomingRequest>) -> Result<bool> {
        let mut req = request.take().expect("on_incoming_request called without a request");

        // Start the UAS transaction for this request if it doesn't have
        // one yet. ACK never gets one of its own: a 2xx ACK belongs to
        // the dialog layer, and an ACK to a non-2xx is absorbed by the
        // originating INVITE server transaction before reaching here.
        if req.tsx_key().is_none() && !req.is_method(&SipMethod::Ack) {
            let created = if req.is_method(&SipMethod::Invite) {
                endpoint.new_uas_inv_tsx(&mut req).map(|_| ())
            } else {
                endpoint.new_uas_tsx(&mut req).map(|_| ())
            };

            // A duplicate key means another transaction already owns this
            // request (a race on a retransmission); drop it rather than
            // creating a second one.
            if let Err(err) = created {
                log::warn!("Dropping request, transaction registration failed: {err}");
                return Ok(true);
            }
        }

        if !self.method_allowed(&req) {
            let allow = self.handler.allow();
            let mut response = endpoint.new_response(&req, StatusCode::MethodNotAllowed.into_i32(), StatusCode::MethodNotAllowed.reason());
            response.headers_mut().push(Header::Allow(allow));
            self.send(endpoint, &req, response).await?;
            return Ok(true);
        }

        if self.handler.detect_loops(&req) && endpoint.get_tsx_layer().is_loop(&req) {
            self.reply(endpoint, &req, StatusCode::LoopDetected.into_i32(), StatusCode::LoopDetected.reason())
                .await?;
            return Ok(true);
        }

        if !matches!(req.method(), SipMethod::Cancel | SipMethod::Ack) {
            let unsupported = self.unsupported_tags(&req);
            if !unsupported.is_empty() {
                let mut response = endpoint.new_response(&req, StatusCode::BadExtension.into_i32(), StatusCode::BadExtension.reason());
                response.headers_mut().push(Header::Unsupported(Unsupported::new(unsupported)));
                self.send(endpoint, &req, response).await?;
                return Ok(true);
            }
        }

        match self.handler.on_request(endpoint, &req).await {
            UasAction::NoReply => {}
            UasAction::Reply { status_code, reason } => {
                self.reply(endpoint, &req, status_code, reason).await?;
            }
        }

        Ok(true)
    }

    async fn on_incoming_response(&self, _endpoint: &Endpoint, _response: &mut Option<IncomingResponse>) -> Result<bool> {
        Ok(false)
    }
}
