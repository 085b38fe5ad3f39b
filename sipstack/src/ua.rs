//! Dialog layer interface (external collaborator).
//!
//! The transaction layer only needs an opaque handle to attach to a
//! transaction and three operations it treats as black boxes: deciding
//! whether a response establishes a dialog, validating an in-dialog
//! response and materializing a dialog from a 2xx. The dialog state
//! machine itself (early/confirmed/terminated, route sets, target
//! refresh, ...) lives above this crate.

use crate::headers::CallId;
use crate::transport::{IncomingRequest, OutgoingResponse};

/// Identifies a dialog by the triple that RFC 3261 §12 uses to key one:
/// Call-ID plus the local and remote tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DialogId {
    /// The `Call-ID` shared by every message in the dialog.
    pub call_id: CallId<'static>,
    /// Tag assigned by the local UA.
    pub local_tag: String,
    /// Tag assigned by the remote UA.
    pub remote_tag: String,
}

/// Opaque handle to a dialog, as seen from the transaction layer.
///
/// The transaction layer stores at most one of these per transaction
/// (see [`crate::transaction::TransactionInner::set_dialog`]) and never
/// inspects it beyond cloning and holding it; dialog semantics are the
/// UA layer's responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    id: DialogId,
}

impl Dialog {
    /// Wraps a dialog identity into the opaque handle the transaction
    /// layer carries.
    pub fn new(id: DialogId) -> Self {
        Self { id }
    }

    /// Returns the dialog's identity.
    pub fn id(&self) -> &DialogId {
        &self.id
    }
}

/// Returns `true` if `response`, sent in reply to `request`, establishes
/// a dialog per RFC 3261 §12.1 (chiefly a 2xx to INVITE).
pub fn is_dialog_establishing(request: &IncomingRequest<'_>, response: &OutgoingResponse<'_>) -> bool {
    use crate::message::SipMethod;

    let code = response.status_code().into_i32();
    request.is_method(&SipMethod::Invite) && (200..300).contains(&code)
}

/// Validates that `response` is consistent with the dialog `request`
/// belongs to (in-dialog CSeq ordering, route set, etc). The dialog
/// layer owns this check; the core only calls through to it.
pub fn validate_dialog_response(_request: &IncomingRequest<'_>, _response: &OutgoingResponse<'_>) -> crate::Result<()> {
    Ok(())
}

/// Materializes a [`Dialog`] for a dialog-establishing `response` to
/// `request`. The returned handle is attached to the UAS transaction.
pub fn create_dialog(request: &IncomingRequest<'_>, response: &OutgoingResponse<'_>) -> crate::Result<Dialog> {
    let from = &request.request_headers.from;
    let to = response
        .response
        .headers
        .iter()
        .find_map(|h| match h {
            crate::headers::Header::To(to) => Some(to),
            _ => None,
        });

    let id = DialogId {
        call_id: request.request_headers.call_id.clone().into_owned(),
        local_tag: to.and_then(|to| to.tag()).unwrap_or_default().to_owned(),
        remote_tag: from.tag().unwrap_or_default().to_owned(),
    };

    Ok(Dialog::new(id))
}

