use std::fmt;

use crate::{
    error::Result,
    macros::parse_header_param,
    message::{NameAddr, Params},
    parser::ParseCtx,
};

use crate::headers::SipHeaderParse;

/// The `Route` SIP header.
///
/// Specify the sequence of proxy servers and other
/// intermediaries that a SIP message should pass through on
/// its way to the final destination.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Route<'a> {
    pub(crate) addr: NameAddr<'a>,
    pub(crate) param: Option<Params<'a>>,
}

impl<'a> SipHeaderParse<'a> for Route<'a> {
    const NAME: &'static str = "Route";
    /*
     * Route        =  "Route" HCOLON route-param *(COMMA route-param)
     * route-param  =  name-addr *( SEMI rr-param )
     */
    fn parse(parser: &mut ParseCtx<'a>) -> Result<Self> {
        let addr = parser.parse_name_addr()?;
        let param = parse_header_param!(parser);
        Ok(Route { addr, param })
    }
}

impl fmt::Display for Route<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr)?;

        if let Some(param) = &self.param {
            write!(f, ";{}", param)?;
        }

        Ok(())
    }
}
