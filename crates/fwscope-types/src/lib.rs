//! Shared types for fwscope
//!
//! This crate contains the firewall log record and filter shapes exchanged
//! between the viewer and the log worker.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// ============================================================================
// Log Types
// ============================================================================

/// A single firewall log record
///
/// Every field is optional because upstream sources omit fields freely.
/// A typed field is only filled from a JSON string under exactly its wire
/// key; every other key, and any non-string value, stays in `extra`
/// untouched. Encoding writes the typed fields back over `extra`, so a
/// decoded record comes out of the worker exactly as it went in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FirewallLog {
    /// Rule number that matched
    pub rulenr: Option<String>,
    pub subrulenr: Option<String>,

    /// Interface name (e.g. "wan", "lan", "igb0")
    pub interface: Option<String>,
    pub reason: Option<String>,

    /// Action taken ("pass", "block", ...)
    pub action: Option<String>,

    /// Raw packet direction as reported by the firewall
    pub dir: Option<String>,
    pub ipversion: Option<String>,
    pub protonum: Option<String>,

    /// Protocol name ("tcp", "udp", "icmp", ...)
    pub protoname: Option<String>,
    pub length: Option<String>,

    /// Source address
    pub src: Option<String>,

    /// Destination address
    pub dst: Option<String>,
    pub srcport: Option<String>,
    pub dstport: Option<String>,
    pub tcpflags: Option<String>,

    /// ISO-8601 timestamp string, unparsed (`__timestamp__`)
    pub timestamp: Option<String>,

    /// Reporting host (`__host__`)
    pub host: Option<String>,

    /// Opaque identity used by callers for deduplication (`__digest__`)
    ///
    /// A plain `digest` key is left in `extra`; see [`FirewallLog::identity`].
    pub digest: Option<String>,

    /// Rule label, usually encodes the direction ("let out anything", "allow-in")
    pub label: Option<String>,

    /// Any other keys sent by the source, verbatim
    pub extra: Map<String, Value>,
}

impl FirewallLog {
    /// Wire key and value of every typed field
    fn typed_fields(&self) -> [(&'static str, &Option<String>); 19] {
        [
            ("rulenr", &self.rulenr),
            ("subrulenr", &self.subrulenr),
            ("interface", &self.interface),
            ("reason", &self.reason),
            ("action", &self.action),
            ("dir", &self.dir),
            ("ipversion", &self.ipversion),
            ("protonum", &self.protonum),
            ("protoname", &self.protoname),
            ("length", &self.length),
            ("src", &self.src),
            ("dst", &self.dst),
            ("srcport", &self.srcport),
            ("dstport", &self.dstport),
            ("tcpflags", &self.tcpflags),
            ("__timestamp__", &self.timestamp),
            ("__host__", &self.host),
            ("__digest__", &self.digest),
            ("label", &self.label),
        ]
    }

    /// Build a record from a decoded JSON object
    pub fn from_map(mut extra: Map<String, Value>) -> Self {
        let mut take = |key: &str| take_string(&mut extra, key);

        let rulenr = take("rulenr");
        let subrulenr = take("subrulenr");
        let interface = take("interface");
        let reason = take("reason");
        let action = take("action");
        let dir = take("dir");
        let ipversion = take("ipversion");
        let protonum = take("protonum");
        let protoname = take("protoname");
        let length = take("length");
        let src = take("src");
        let dst = take("dst");
        let srcport = take("srcport");
        let dstport = take("dstport");
        let tcpflags = take("tcpflags");
        let timestamp = take("__timestamp__");
        let host = take("__host__");
        let digest = take("__digest__");
        let label = take("label");

        Self {
            rulenr,
            subrulenr,
            interface,
            reason,
            action,
            dir,
            ipversion,
            protonum,
            protoname,
            length,
            src,
            dst,
            srcport,
            dstport,
            tcpflags,
            timestamp,
            host,
            digest,
            label,
            extra,
        }
    }

    /// Encode back into a JSON object
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        for (key, value) in self.typed_fields() {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        map
    }

    /// Identity for deduplication: `__digest__`, else a plain string `digest`
    pub fn identity(&self) -> Option<&str> {
        self.digest.as_deref().or_else(|| self.extra_text("digest"))
    }

    /// String value of an untyped key
    pub fn extra_text(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Source endpoint as "addr:port" (or just the address)
    pub fn source(&self) -> String {
        endpoint(self.src.as_deref(), self.port("srcport", self.srcport.as_deref()).as_deref())
    }

    /// Destination endpoint as "addr:port" (or just the address)
    pub fn destination(&self) -> String {
        endpoint(self.dst.as_deref(), self.port("dstport", self.dstport.as_deref()).as_deref())
    }

    /// Port as text, including ports sent as JSON numbers
    fn port(&self, key: &str, typed: Option<&str>) -> Option<String> {
        typed.map(str::to_string).or_else(|| match self.extra.get(key) {
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    if !matches!(map.get(key), Some(Value::String(_))) {
        return None;
    }
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

impl Serialize for FirewallLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FirewallLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::from_map)
    }
}

fn endpoint(addr: Option<&str>, port: Option<&str>) -> String {
    match (addr, port) {
        (Some(addr), Some(port)) if addr.contains(':') => format!("[{}]:{}", addr, port),
        (Some(addr), Some(port)) => format!("{}:{}", addr, port),
        (Some(addr), None) => addr.to_string(),
        (None, _) => "-".to_string(),
    }
}

/// User-selected filter criteria
///
/// An empty criterion matches everything. `direction` is matched as a
/// substring of the record's label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilters {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub action: String,

    #[serde(default, deserialize_with = "string_or_empty")]
    pub interface: String,

    #[serde(default, deserialize_with = "string_or_empty")]
    pub direction: String,
}

impl LogFilters {
    pub fn new(
        action: impl Into<String>,
        interface: impl Into<String>,
        direction: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            interface: interface.into(),
            direction: direction.into(),
        }
    }

    /// Check if no criterion is set
    pub fn is_empty(&self) -> bool {
        self.action.is_empty() && self.interface.is_empty() && self.direction.is_empty()
    }

    /// Check if a record satisfies every criterion
    pub fn matches(&self, log: &FirewallLog) -> bool {
        equals_or_unset(&self.action, log.action.as_deref())
            && equals_or_unset(&self.interface, log.interface.as_deref())
            && (self.direction.is_empty()
                || log
                    .label
                    .as_deref()
                    .is_some_and(|label| label.contains(self.direction.as_str())))
    }
}

fn equals_or_unset(criterion: &str, value: Option<&str>) -> bool {
    criterion.is_empty() || value == Some(criterion)
}

/// Accept strings, numbers and booleans as text; anything else is empty
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}
