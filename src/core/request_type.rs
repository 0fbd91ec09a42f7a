//! Request types observed by the network layer

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::MatrixError;

/// Kind of a network request.
///
/// `All` is both the per-hostname total bucket and the type wildcard used in
/// rule lookups. Its wire name is `"*"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RequestType {
    #[serde(rename = "*")]
    All,
    #[serde(rename = "main_frame")]
    MainFrame,
    #[serde(rename = "stylesheet")]
    Stylesheet,
    #[serde(rename = "cookie")]
    Cookie,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "script")]
    Script,
    #[serde(rename = "xmlhttprequest")]
    XmlHttpRequest,
    #[serde(rename = "sub_frame")]
    SubFrame,
    #[serde(rename = "other")]
    Other,
}

impl RequestType {
    /// Every type, wildcard first. Index order matches `index()`.
    pub const ALL: [RequestType; 10] = [
        RequestType::All,
        RequestType::MainFrame,
        RequestType::Stylesheet,
        RequestType::Cookie,
        RequestType::Image,
        RequestType::Object,
        RequestType::Script,
        RequestType::XmlHttpRequest,
        RequestType::SubFrame,
        RequestType::Other,
    ];

    /// Concrete types only (no wildcard)
    pub const CONCRETE: [RequestType; 9] = [
        RequestType::MainFrame,
        RequestType::Stylesheet,
        RequestType::Cookie,
        RequestType::Image,
        RequestType::Object,
        RequestType::Script,
        RequestType::XmlHttpRequest,
        RequestType::SubFrame,
        RequestType::Other,
    ];

    /// Position of this type in `RequestType::ALL`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this is the `"*"` wildcard
    pub fn is_wildcard(self) -> bool {
        self == RequestType::All
    }

    /// Wire name, as used by the network layer and in rule storage
    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::All => "*",
            RequestType::MainFrame => "main_frame",
            RequestType::Stylesheet => "stylesheet",
            RequestType::Cookie => "cookie",
            RequestType::Image => "image",
            RequestType::Object => "object",
            RequestType::Script => "script",
            RequestType::XmlHttpRequest => "xmlhttprequest",
            RequestType::SubFrame => "sub_frame",
            RequestType::Other => "other",
        }
    }

    /// Human-readable plural, used in action previews
    pub fn pretty_name(self) -> &'static str {
        match self {
            RequestType::All => "everything",
            RequestType::MainFrame => "pages",
            RequestType::Stylesheet => "stylesheets",
            RequestType::Cookie => "cookies",
            RequestType::Image => "images",
            RequestType::Object => "plugins",
            RequestType::Script => "scripts",
            RequestType::XmlHttpRequest => "XHR",
            RequestType::SubFrame => "frames",
            RequestType::Other => "other requests",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" | "all" => Ok(RequestType::All),
            "main_frame" => Ok(RequestType::MainFrame),
            "stylesheet" => Ok(RequestType::Stylesheet),
            "cookie" => Ok(RequestType::Cookie),
            "image" => Ok(RequestType::Image),
            "object" => Ok(RequestType::Object),
            "script" => Ok(RequestType::Script),
            "xmlhttprequest" => Ok(RequestType::XmlHttpRequest),
            "sub_frame" => Ok(RequestType::SubFrame),
            "other" => Ok(RequestType::Other),
            _ => Err(MatrixError::InvalidRequestType(s.to_string())),
        }
    }
}
