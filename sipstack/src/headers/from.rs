use crate::{
    error::Result,
    headers::TAG_PARAM,
    macros::parse_header_param,
    message::{Params, SipUri},
    parser::ParseCtx,
};

use crate::headers::SipHeaderParse;

use core::fmt;
use std::borrow::Cow;
use std::str::{self};

/// The `From` SIP header.
///
/// Indicates the initiator of the request.
///
/// # Examples
/// ```
/// # use sipstack::{headers::From};
/// # use sipstack::message::{HostPort, Host, UriUser, UriBuilder, SipUri, NameAddr};
/// let uri = SipUri::NameAddr(NameAddr {
///     display: None,
///     uri: UriBuilder::new()
///         .user(UriUser::new("alice", None))
///         .host(HostPort::from(Host::DomainName(
///             "client.atlanta.example.com".into(),
///         )))
///         .get(),
/// });
///
/// let f = From::new(uri);
///
/// assert_eq!(
///     "From: <sip:alice@client.atlanta.example.com>",
///     f.to_string()
/// );
///
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct From<'f> {
    uri: SipUri<'f>,
    tag: Option<Cow<'f, str>>,
    params: Option<Params<'f>>,
}

impl<'f> From<'f> {
    /// Create a new `From` instance.
    pub fn new(uri: SipUri<'f>) -> Self {
        Self {
            uri,
            tag: None,
            params: None,
        }
    }
    /// Get the URI of the `From` header.
    pub fn uri(&self) -> &SipUri {
        &self.uri
    }
    /// Returns the tag parameter.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Detaches this header from the buffer it was parsed from.
    pub fn into_owned(self) -> From<'static> {
        From {
            uri: self.uri.into_owned(),
            tag: self.tag.map(|t| Cow::Owned(t.into_owned())),
            params: None,
        }
    }
}

impl<'a> SipHeaderParse<'a> for From<'a> {
    const NAME: &'static str = "From";
    const SHORT_NAME: &'static str = "f";
    /*
     * From        =  ( "From" / "f" ) HCOLON from-spec
     * from-spec   =  ( name-addr / addr-spec )
     *                *( SEMI from-param )
     * from-param  =  tag-param / generic-param
     * tag-param   =  "tag" EQUAL token
     */
    fn parse(parser: &mut ParseCtx<'a>) -> Result<Self> {
        let uri = parser.parse_sip_uri(false)?;
        let mut tag = None;
        let params = parse_header_param!(parser, TAG_PARAM = tag);

        Ok(From { tag: tag.map(Cow::Borrowed), uri, params })
    }
}

impl fmt::Display for From<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.uri {
            SipUri::Uri(uri) => write!(f, "{}: {}", From::NAME, uri)?,
            SipUri::NameAddr(name_addr) => write!(f, "{}: {}", From::NAME, name_addr)?,
        }
        if let Some(tag) = &self.tag {
            write!(f, ";tag={}", tag)?;
        }
        if let Some(params) = &self.params {
            write!(f, "{}", params)?;
        }

        Ok(())
    }
}
