use std::fmt;

use crate::{
    error::Result,
    macros::parse_header_param,
    message::{NameAddr, Params},
    parser::ParseCtx,
};

use crate::headers::SipHeaderParse;

/// The `Record-Route` SIP header.
///
/// Keeps proxies in the signaling path for consistent
/// routing and session control.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RecordRoute<'a> {
    /// The address of the record route.
    pub addr: NameAddr<'a>,
    /// Optional parameters associated with the record route.
    pub params: Option<Params<'a>>,
}

impl<'a> SipHeaderParse<'a> for RecordRoute<'a> {
    const NAME: &'static str = "Record-Route";
    /*
     * Record-Route  =  "Record-Route" HCOLON rec-route *(COMMA rec-route)
     * rec-route     =  name-addr *( SEMI rr-param )
     * rr-param      =  generic-param
     */
    fn parse(parser: &mut ParseCtx<'a>) -> Result<Self> {
        let addr = parser.parse_name_addr()?;
        let params = parse_header_param!(parser);
        Ok(RecordRoute { addr, params })
    }
}

impl fmt::Display for RecordRoute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", RecordRoute::NAME, self.addr)?;
        if let Some(param) = &self.params {
            write!(f, ";{}", param)?;
        }

        Ok(())
    }
}
