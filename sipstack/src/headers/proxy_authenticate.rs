use std::fmt;

use crate::{error::Result, headers::HeaderParser, message::Challenge, parser::ParseCtx};

/// The `Proxy-Authenticate` SIP header.
///
/// The authentication requirements from a proxy server to a
/// client.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ProxyAuthenticate(Challenge);

impl<'a> HeaderParser<'a> for ProxyAuthenticate {
    const NAME: &'static str = "Proxy-Authenticate";

    /*
     * Proxy-Authenticate  =  "Proxy-Authenticate" HCOLON
     * challenge challenge           =  ("Digest" LWS
     * digest-cln *(COMMA digest-cln))
     * / other-challenge other-challenge     =
     * auth-scheme LWS auth-param
     * *(COMMA auth-param) digest-cln          =  realm /
     * domain / nonce                         / opaque /
     * stale / algorithm                         /
     * qop-options / auth-param realm               =
     * "realm" EQUAL realm-value realm-value         =
     * quoted-string domain              =  "domain"
     * EQUAL LDQUOT URI                        *( 1*SP
     * URI ) RDQUOT URI                 =  absoluteURI /
     * abs-path nonce               =  "nonce" EQUAL
     * nonce-value nonce-value         =  quoted-string
     * opaque              =  "opaque" EQUAL quoted-string
     * stale               =  "stale" EQUAL ( "true" /
     * "false" ) algorithm           =  "algorithm" EQUAL
     * ( "MD5" / "MD5-sess"                        /
     * token ) qop-options         =  "qop" EQUAL LDQUOT
     * qop-value                        *("," qop-value)
     * RDQUOT qop-value           =  "auth" / "auth-int"
     * / token
     */
    fn parse(parser: &mut ParseCtx<'a>) -> Result<Self> {
        let challenge = parser.parse_auth_challenge()?;

        Ok(ProxyAuthenticate(challenge))
    }
}

impl fmt::Display for ProxyAuthenticate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", ProxyAuthenticate::NAME, self.0)
    }
}
