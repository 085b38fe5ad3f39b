use crate::headers::Header;
use crate::message::HostPort;
use crate::message::SipMethod;
use crate::message::TransportProtocol;
use crate::transport::IncomingRequest;
use crate::transport::OutgoingRequest;
use crate::ArcStr;

const BRANCH_MAGIC_COOKIE: &str = "z9hG4bK";

/// Uniquely identifies a client or server transaction.
///
/// `Rfc3261` is used whenever the top Via carries the `z9hG4bK` magic
/// cookie. Senders that predate RFC 3261 (or simply omit the cookie) are
/// matched via the `Rfc2543` full-tuple fallback described in §17.2.3.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum TsxKey {
    Rfc2543(Rfc2543),
    Rfc3261(Rfc3261),
}

impl TsxKey {
    pub fn create_client_with(method: &SipMethod, branch: &str) -> Self {
        TsxKey::Rfc3261(Rfc3261::Client(ClientTransactionKey {
            branch: branch.into(),
            method: Some(*method),
        }))
    }

    pub fn create_client(request: &OutgoingRequest) -> Self {
        let via = request
            .msg
            .headers
            .iter()
            .filter_map(|header| match header {
                Header::Via(via_hdr) => Some(via_hdr),
                _ => None,
            })
            .next()
            .unwrap();

        let cseq = request
            .msg
            .headers
            .iter()
            .filter_map(|header| match header {
                Header::CSeq(cseq) => Some(cseq),
                _ => None,
            })
            .next()
            .unwrap();

        match via.branch() {
            Some(branch) => TsxKey::Rfc3261(Rfc3261::Client(ClientTransactionKey {
                branch: branch.into(),
                method: Some(*cseq.method()),
            })),
            // Outbound requests are always stamped with a fresh branch by the
            // endpoint before a client transaction is created; a missing
            // branch here means the caller built the request by hand.
            // Generate one so the transaction still gets a usable key.
            None => {
                log::warn!("outgoing request has no Via branch, generating one");
                TsxKey::Rfc3261(Rfc3261::Client(ClientTransactionKey {
                    branch: generate_branch(),
                    method: Some(*cseq.method()),
                }))
            }
        }
    }

    pub fn create_server(request: &IncomingRequest) -> Self {
        let via = &request.request_headers.via;
        let method = normalize_ack(*request.request_headers.cseq.method());

        match via.branch() {
            Some(branch) if branch.starts_with(BRANCH_MAGIC_COOKIE) => {
                TsxKey::Rfc3261(Rfc3261::Server(ServerTransactionKey {
                    branch: branch.into(),
                    via_sent_by: via.sent_by().clone(),
                    method: Some(method),
                }))
            }
            // Pre-RFC 3261 (RFC 2543) sender: the branch, if present at all,
            // carries no guaranteed uniqueness, so match on the full tuple
            // from §17.2.3 instead: top Via, Call-ID, CSeq number, From-tag,
            // To-tag, and Request-URI.
            _ => TsxKey::Rfc2543(Rfc2543 {
                cseq: request.request_headers.cseq.cseq(),
                from_tag: request.request_headers.from.tag().map(Into::into),
                to_tag: request.request_headers.to.tag().map(Into::into),
                call_id: request.request_headers.call_id.id().into(),
                via_host_port: via.sent_by().clone(),
                via_transport: via.transport(),
                request_uri: request.request.req_line.uri.to_string().into(),
                method: Some(method),
            }),
        }
    }
}

/// ACK is matched against its originating INVITE server transaction, not a
/// transaction of its own, so its key is derived as if it were an INVITE.
fn normalize_ack(method: SipMethod) -> SipMethod {
    if method == SipMethod::Ack {
        SipMethod::Invite
    } else {
        method
    }
}

fn generate_branch() -> ArcStr {
    use rand::Rng;
    let suffix: String = rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("{BRANCH_MAGIC_COOKIE}{suffix}").into()
}

/// Generates a random tag (From/To) with at least 64 bits of entropy.
pub(crate) fn generate_tag() -> String {
    use rand::Rng;
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// RFC 2543 (pre-RFC 3261) transaction key: the full tuple from §17.2.3,
/// used when the top Via branch lacks the `z9hG4bK` magic cookie.
///
/// `via_transport` is folded in alongside `via_host_port` so that two
/// requests differing only in the top Via's transport (e.g. UDP vs TCP
/// to the same host:port) don't collide on the same key.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct Rfc2543 {
    pub cseq: u32,
    pub from_tag: Option<ArcStr>,
    pub to_tag: Option<ArcStr>,
    pub call_id: ArcStr,
    pub via_host_port: HostPort,
    pub via_transport: TransportProtocol,
    pub request_uri: ArcStr,
    pub method: Option<SipMethod>,
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Rfc3261 {
    Client(ClientTransactionKey),
    Server(ServerTransactionKey),
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct ClientTransactionKey {
    branch: ArcStr,
    method: Option<SipMethod>,
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct ServerTransactionKey {
    branch: ArcStr,
    via_sent_by: HostPort,
    method: Option<SipMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_normalizes_to_invite_for_server_key() {
        assert_eq!(normalize_ack(SipMethod::Ack), SipMethod::Invite);
        assert_eq!(normalize_ack(SipMethod::Bye), SipMethod::Bye);
    }

    #[test]
    fn generated_branch_carries_magic_cookie() {
        let branch = generate_branch();
        assert!(branch.starts_with(BRANCH_MAGIC_COOKIE));
        assert!(branch.len() > BRANCH_MAGIC_COOKIE.len());
    }

    #[test]
    fn rfc2543_keys_with_same_tuple_are_equal() {
        let a = Rfc2543 {
            cseq: 1,
            from_tag: Some("abc".into()),
            to_tag: None,
            call_id: "call-1".into(),
            via_host_port: HostPort::from(crate::message::Host::DomainName("atlanta.example.com".into())),
            via_transport: TransportProtocol::Udp,
            request_uri: "sip:bob@biloxi.com".into(),
            method: Some(SipMethod::Invite),
        };
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn rfc2543_keys_differ_by_via_transport() {
        let udp = Rfc2543 {
            cseq: 1,
            from_tag: Some("abc".into()),
            to_tag: None,
            call_id: "call-1".into(),
            via_host_port: HostPort::from(crate::message::Host::DomainName("atlanta.example.com".into())),
            via_transport: TransportProtocol::Udp,
            request_uri: "sip:bob@biloxi.com".into(),
            method: Some(SipMethod::Invite),
        };
        let tcp = Rfc2543 {
            via_transport: TransportProtocol::Tcp,
            ..udp.clone()
        };

        assert_ne!(udp, tcp);
    }
}
