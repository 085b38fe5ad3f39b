use crate::{error::Result, headers::SipHeaderParse, macros::hdr_list, message::SipMethod, parser::ParseCtx};
use itertools::Itertools;
use std::fmt;

/// The `Allow` SIP header.
///
/// Indicates what methods is supported by the `UA`.
///
/// # Examples
///
/// ```
/// # use sipstack::headers::Allow;
/// # use sipstack::message::SipMethod;
/// let mut allow = Allow::new();
///
/// allow.push(SipMethod::Invite);
/// allow.push(SipMethod::Register);
///
/// assert_eq!("Allow: INVITE, REGISTER", allow.to_string());
/// ```
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct Allow(Vec<SipMethod>);

impl Allow {
    /// Creates a empty `Allow` header.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an new `SipMethod`.
    pub fn push(&mut self, method: SipMethod) {
        self.0.push(method);
    }

    /// Gets the `SipMethod` at the specified index.
    pub fn get(&self, index: usize) -> Option<&SipMethod> {
        self.0.get(index)
    }

    /// Returns the number of `SipMethods` in the header.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the header carries no methods.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the methods listed in the header.
    pub fn iter(&self) -> impl Iterator<Item = &SipMethod> {
        self.0.iter()
    }

    /// Builds an `Allow` header from the given methods.
    pub fn from_methods(methods: impl IntoIterator<Item = SipMethod>) -> Self {
        Self(methods.into_iter().collect())
    }
}

impl<'a> SipHeaderParse<'a> for Allow {
    const NAME: &'static str = "Allow";
    /*
     * Allow  =  "Allow" HCOLON [SipMethod *(COMMA SipMethod)]
     */
    fn parse(parser: &mut ParseCtx) -> Result<Self> {
        let allow = hdr_list!(parser => {
            let b_method = parser.alpha();

            SipMethod::from(b_method)
        });

        Ok(Allow(allow))
    }
}

impl fmt::Display for Allow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", Allow::NAME, self.0.iter().format(", "))
    }
}
