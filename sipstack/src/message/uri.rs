use std::borrow::Cow;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;

use super::{Param, Params, SipMethod, TransportProtocol};
use crate::error::{Error, Result};
use crate::parser::ParseCtx;

/// A SIP URI, either a plain `Uri` or a `NameAddr` (a named address with an
/// optional display name).
///
/// # Examples
///
/// ```rust
/// use sipstack::message::SipUri;
///
/// let uri: SipUri = "sip:alice@example.com".parse().unwrap();
/// assert!(uri.is_uri());
///
/// let name_addr: SipUri = "\"Alice\" <sip:alice@example.com>".parse().unwrap();
/// assert!(name_addr.is_name_addr());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SipUri<'a> {
    /// A plain SIP URI (e.g. `sip:user@example.com`)
    Uri(Uri<'a>),
    /// A named address (e.g. `"Alice" <sip:user@example.com>`)
    NameAddr(NameAddr<'a>),
}

impl<'a> SipUri<'a> {
    /// Parses a `SipUri` out of a `'static` string.
    pub fn from_static(s: &'static str) -> Result<Self> {
        ParseCtx::new(s.as_bytes()).parse_sip_uri(true)
    }

    /// Returns `true` if this is a [`SipUri::NameAddr`] variant, otherwise
    /// returns `false`.
    pub fn is_name_addr(&self) -> bool {
        matches!(self, SipUri::NameAddr(_))
    }

    /// Returns `true` if this is a [`SipUri::Uri`] variant, otherwise returns
    /// `false`.
    pub fn is_uri(&self) -> bool {
        matches!(self, SipUri::Uri(_))
    }

    /// Returns a reference to the [`Uri`].
    pub fn uri(&self) -> &Uri<'a> {
        match self {
            SipUri::Uri(uri) => uri,
            SipUri::NameAddr(name_addr) => &name_addr.uri,
        }
    }

    /// Returns a reference to the [`NameAddr`] if this is a
    /// [`SipUri::NameAddr`] variant.
    pub fn name_addr(&self) -> Option<&NameAddr<'a>> {
        if let SipUri::NameAddr(addr) = self {
            Some(addr)
        } else {
            None
        }
    }

    /// Returns the display part if present.
    pub fn display(&self) -> Option<&str> {
        if let SipUri::NameAddr(addr) = self {
            addr.display()
        } else {
            None
        }
    }

    /// Returns the scheme of the uri.
    pub fn scheme(&self) -> Scheme {
        self.uri().scheme
    }

    /// Returns the user part of the uri.
    pub fn user(&self) -> Option<&UriUser<'a>> {
        self.uri().user.as_ref()
    }

    /// Returns a reference to the [`HostPort`] of the uri.
    pub fn host_port(&self) -> &HostPort {
        &self.uri().host_port
    }

    /// Returns the `transport` parameter.
    pub fn transport_param(&self) -> Option<TransportProtocol> {
        self.uri().transport_param
    }

    /// Returns the user parameter of the uri.
    pub fn user_param(&self) -> Option<&Cow<'a, str>> {
        self.uri().user_param.as_ref()
    }

    /// Returns the method parameter of the uri.
    pub fn method_param(&self) -> Option<SipMethod> {
        self.uri().method_param
    }

    /// Returns the ttl parameter of the uri.
    pub fn ttl_param(&self) -> Option<u8> {
        self.uri().ttl_param
    }

    /// Returns the lr parameter of the uri.
    pub fn lr_param(&self) -> bool {
        self.uri().lr_param
    }

    /// Returns the maddr parameter of the uri.
    pub fn maddr_param(&self) -> Option<&Host> {
        self.uri().maddr_param.as_ref()
    }

    /// Returns the other (non-reserved) uri parameters.
    pub fn params(&self) -> Option<&Params<'a>> {
        self.uri().params.as_ref()
    }

    /// Returns the header parameters of the uri.
    pub fn hdr_params(&self) -> Option<&Params<'a>> {
        self.uri().hdr_params.as_ref()
    }

    /// Converts this `SipUri` into an owned, `'static` version of itself.
    pub fn into_owned(self) -> SipUri<'static> {
        match self {
            SipUri::Uri(uri) => SipUri::Uri(uri.into_owned()),
            SipUri::NameAddr(addr) => SipUri::NameAddr(addr.into_owned()),
        }
    }
}

impl FromStr for SipUri<'static> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parsed: SipUri<'_> = ParseCtx::new(s.as_bytes()).parse_sip_uri(true)?;
        Ok(parsed.into_owned())
    }
}

impl fmt::Display for SipUri<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SipUri::Uri(uri) => write!(f, "{}", uri),
            SipUri::NameAddr(addr) => write!(f, "{}", addr),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Default, Copy)]
/// A SIP URI scheme, either `sip` or `sips`.
pub enum Scheme {
    #[default]
    /// A `sip` uri scheme.
    Sip,
    /// A `sips` uri scheme.
    Sips,
}

/// A SIP URI.
///
/// Holds borrowed slices into the buffer it was parsed from; call
/// [`Uri::into_owned`] to detach it when it needs to outlive that buffer
/// (e.g. when stashed on a transaction for retransmissions).
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Uri<'a> {
    /// The uri scheme.
    pub scheme: Scheme,
    /// Optional user part of uri.
    pub user: Option<UriUser<'a>>,
    /// The uri host.
    pub host_port: HostPort,
    /// The user parameter.
    pub user_param: Option<Cow<'a, str>>,
    /// The method parameter.
    pub method_param: Option<SipMethod>,
    /// The transport parameter.
    pub transport_param: Option<TransportProtocol>,
    /// The ttl parameter.
    pub ttl_param: Option<u8>,
    /// The lr parameter.
    pub lr_param: bool,
    /// The maddr parameter.
    pub maddr_param: Option<Host>,
    /// Other uri parameters.
    pub params: Option<Params<'a>>,
    /// Header parameters (the `?name=value&...` part of the uri).
    pub hdr_params: Option<Params<'a>>,
}

impl<'a> Uri<'a> {
    /// Returns a builder to create a `Uri`.
    pub fn builder() -> UriBuilder<'a> {
        UriBuilder::new()
    }

    /// Creates a `Uri` with no parameters set.
    pub fn new(scheme: Scheme, user: Option<UriUser<'a>>, host_port: HostPort) -> Self {
        Uri {
            scheme,
            user,
            host_port,
            ..Default::default()
        }
    }

    /// Creates a `Uri` with no parameters set. Used by the parser once the
    /// scheme, user and host-port have been read but params were not
    /// requested.
    pub fn without_params(scheme: Scheme, user: Option<UriUser<'a>>, host_port: HostPort) -> Self {
        Self::new(scheme, user, host_port)
    }

    /// Parses a `Uri` out of a `'static` string.
    pub fn from_static(s: &'static str) -> Result<Self> {
        ParseCtx::new(s.as_bytes()).parse_uri(true)
    }

    /// Converts this `Uri` into an owned, `'static` version of itself.
    ///
    /// Uri parameters (`params`/`hdr_params`) are not retained: they borrow
    /// from the original buffer and the transaction layer only needs the
    /// scheme/user/host-port identity to rebuild a CANCEL or ACK request-uri.
    pub fn into_owned(self) -> Uri<'static> {
        Uri {
            scheme: self.scheme,
            user: self.user.map(UriUser::into_owned),
            host_port: self.host_port,
            user_param: self.user_param.map(|p| Cow::Owned(p.into_owned())),
            method_param: self.method_param,
            transport_param: self.transport_param,
            ttl_param: self.ttl_param,
            lr_param: self.lr_param,
            maddr_param: self.maddr_param,
            params: None,
            hdr_params: None,
        }
    }
}

impl FromStr for Uri<'static> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let uri = ParseCtx::new(s.as_bytes()).parse_uri(true)?;
        Ok(uri.into_owned())
    }
}

impl fmt::Display for Uri<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            Scheme::Sip => write!(f, "sip")?,
            Scheme::Sips => write!(f, "sips")?,
        }
        write!(f, ":")?;

        if let Some(user) = &self.user {
            write!(f, "{}", user.user)?;
            if let Some(pass) = &user.pass {
                write!(f, ":{}", pass)?;
            }
            write!(f, "@")?;
        }
        write!(f, "{}", self.host_port)?;

        if let Some(user) = &self.user_param {
            write!(f, ";user={}", user)?;
        }
        if let Some(method) = &self.method_param {
            write!(f, ";method={}", method)?;
        }
        if let Some(maddr) = &self.maddr_param {
            write!(f, ";maddr={}", maddr)?;
        }
        if let Some(transport) = &self.transport_param {
            write!(f, ";transport={}", transport)?;
        }
        if let Some(ttl) = self.ttl_param {
            write!(f, ";ttl={}", ttl)?;
        }
        if self.lr_param {
            write!(f, ";lr")?;
        }
        if let Some(params) = &self.params {
            for Param { name, value } in params.iter() {
                write!(f, ";{}", name)?;
                if let Some(value) = value {
                    write!(f, "={}", value)?;
                }
            }
        }
        if let Some(hdr_params) = &self.hdr_params {
            let formater = Itertools::format_with(hdr_params.iter(), "&", |it, f| {
                f(&format_args!("{}={}", it.name, it.value.unwrap_or("")))
            });
            write!(f, "?{}", formater)?;
        }

        Ok(())
    }
}

#[derive(Default)]
/// Builder for creating a new SIP URI.
pub struct UriBuilder<'a> {
    uri: Uri<'a>,
}

impl<'a> UriBuilder<'a> {
    /// Returns a new, empty `UriBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the uri scheme.
    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.uri.scheme = scheme;
        self
    }

    /// Sets the user part of the uri.
    pub fn user(mut self, user: UriUser<'a>) -> Self {
        self.uri.user = Some(user);
        self
    }

    /// Sets the host of the uri.
    pub fn host(mut self, host_port: HostPort) -> Self {
        self.uri.host_port = host_port;
        self
    }

    /// Sets the user parameter of the uri.
    pub fn user_param(mut self, param: &'a str) -> Self {
        self.uri.user_param = Some(Cow::Borrowed(param));
        self
    }

    /// Sets the method parameter of the uri.
    pub fn method_param(mut self, param: SipMethod) -> Self {
        self.uri.method_param = Some(param);
        self
    }

    /// Sets the transport parameter of the uri.
    pub fn transport_param(mut self, param: TransportProtocol) -> Self {
        self.uri.transport_param = Some(param);
        self
    }

    /// Sets the ttl parameter of the uri.
    pub fn ttl_param(mut self, param: &str) -> Self {
        self.uri.ttl_param = Some(param.parse().unwrap());
        self
    }

    /// Sets the lr parameter of the uri.
    pub fn lr_param(mut self, param: bool) -> Self {
        self.uri.lr_param = param;
        self
    }

    /// Sets the maddr parameter of the uri.
    pub fn maddr_param(mut self, param: &str) -> Self {
        self.uri.maddr_param = Some(param.parse().unwrap());
        self
    }

    /// Sets other parameters of the uri.
    pub fn params(mut self, params: Params<'a>) -> Self {
        self.uri.params = Some(params);
        self
    }

    /// Adds a generic uri parameter.
    pub fn param(mut self, name: &'a str, value: Option<&'a str>) -> Self {
        self.uri.params.get_or_insert_with(Params::new).push(Param { name, value });
        self
    }

    /// Adds a header parameter (the `?name=value` part of the uri).
    pub fn header(mut self, name: &'a str, value: Option<&'a str>) -> Self {
        self.uri.hdr_params.get_or_insert_with(Params::new).push(Param { name, value });
        self
    }

    /// Finalizes the builder into a `Uri`.
    pub fn get(self) -> Uri<'a> {
        self.uri
    }
}

/// A SIP `name-addr`.
///
/// Typically appears in the `From`, `To`, and `Contact` headers: a sip uri
/// with an optional display name.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NameAddr<'a> {
    /// The optional display part.
    pub display: Option<Cow<'a, str>>,
    /// The uri of the `name-addr`.
    pub uri: Uri<'a>,
}

impl<'a> NameAddr<'a> {
    /// Returns the display part if present.
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Converts this `NameAddr` into an owned, `'static` version of itself.
    pub fn into_owned(self) -> NameAddr<'static> {
        NameAddr {
            display: self.display.map(|d| Cow::Owned(d.into_owned())),
            uri: self.uri.into_owned(),
        }
    }
}

impl FromStr for NameAddr<'static> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let addr = ParseCtx::new(s.as_bytes()).parse_name_addr()?;
        Ok(addr.into_owned())
    }
}

impl fmt::Display for NameAddr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(display) = &self.display {
            write!(f, "{} ", display)?;
        }
        write!(f, "<{}>", self.uri)?;

        Ok(())
    }
}

/// The user-info component of a URI (`user[:password]@`).
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UriUser<'a> {
    /// The username part of the URI.
    pub user: Cow<'a, str>,
    /// The optional password associated with the user.
    pub pass: Option<Cow<'a, str>>,
}

impl<'a> UriUser<'a> {
    /// Creates a new `UriUser` with the given `user` and optional `pass`.
    pub fn new(user: &'a str, pass: Option<&'a str>) -> Self {
        Self {
            user: Cow::Borrowed(user),
            pass: pass.map(Cow::Borrowed),
        }
    }

    /// Returns the user.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the pass.
    pub fn pass(&self) -> Option<&str> {
        self.pass.as_deref()
    }

    /// Converts this `UriUser` into an owned, `'static` version of itself.
    pub fn into_owned(self) -> UriUser<'static> {
        UriUser {
            user: Cow::Owned(self.user.into_owned()),
            pass: self.pass.map(|p| Cow::Owned(p.into_owned())),
        }
    }
}

/// A domain name in a SIP URI.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct DomainName(pub(crate) Arc<str>);

impl From<&str> for DomainName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl DomainName {
    /// Creates a new `DomainName` from a string slice.
    pub fn new(name: &str) -> Self {
        DomainName(name.into())
    }

    /// Returns the string representation of the domain name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The host part of a URI: either a domain name or an IP address.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Host {
    /// A domain name, such as `example.com`.
    DomainName(DomainName),
    /// An IP address, either IPv4 or IPv6.
    IpAddr(IpAddr),
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::DomainName(domain) => write!(f, "{domain}"),
            Host::IpAddr(ip_addr) => write!(f, "{ip_addr}"),
        }
    }
}

impl Host {
    /// Returns `true` if the host is an IP address (IPv4 or IPv6).
    pub fn is_ip_addr(&self) -> bool {
        match self {
            Host::DomainName(_) => false,
            Host::IpAddr(_) => true,
        }
    }

    /// Returns the string representation of the host as a `Cow<str>`.
    ///
    /// If the host is a domain name, this returns a borrowed string. If the
    /// host is an IP address, this returns an owned string created via
    /// formatting.
    pub fn as_str(&self) -> Cow<'_, str> {
        match self {
            Host::DomainName(host) => Cow::Borrowed(&host.0),
            Host::IpAddr(host) => Cow::Owned(host.to_string()),
        }
    }
}

impl FromStr for Host {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(ip_addr) = s.parse::<IpAddr>() {
            Ok(Host::IpAddr(ip_addr))
        } else {
            Ok(Host::DomainName(DomainName(s.into())))
        }
    }
}

impl From<&str> for Host {
    fn from(s: &str) -> Self {
        // Infallible: an unparsable IP address is just treated as a domain name.
        s.parse().unwrap()
    }
}

/// A combination of a host (domain or IP address) and an optional port.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct HostPort {
    /// The host part, which may be a domain name or an IP address.
    pub host: Host,
    /// The optional port number.
    pub port: Option<u16>,
}

impl FromStr for HostPort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut p = ParseCtx::new(s.as_bytes());

        p.parse_host_port()
    }
}

impl HostPort {
    /// Returns the IP address if the host is an IP address, otherwise `None`.
    pub fn ip_addr(&self) -> Option<IpAddr> {
        match self.host {
            Host::DomainName(_) => None,
            Host::IpAddr(ip_addr) => Some(ip_addr),
        }
    }

    /// Returns `true` if the host is an IP address.
    pub fn is_ip_addr(&self) -> bool {
        self.ip_addr().is_some()
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Host::DomainName(domain) => f.write_str(&domain.0)?,
            Host::IpAddr(ip_addr) => write!(f, "{}", ip_addr)?,
        }
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}

impl From<Host> for HostPort {
    fn from(host: Host) -> Self {
        Self { host, port: None }
    }
}

impl HostPort {
    /// Creates a new `HostPort` from a host and optional port.
    pub fn new(host: Host, port: Option<u16>) -> Self {
        Self { host, port }
    }

    /// Returns `true` if the host is a domain name.
    pub fn is_domain(&self) -> bool {
        matches!(self.host, Host::DomainName(_))
    }

    /// Returns the string representation of the host.
    pub fn host_as_str(&self) -> Cow<'_, str> {
        self.host.as_str()
    }
}

impl Default for HostPort {
    fn default() -> Self {
        Self {
            host: Host::IpAddr(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: Some(5060),
        }
    }
}
