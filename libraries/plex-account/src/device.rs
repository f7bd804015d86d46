//! Devices registered on a Plex.tv account.

use crate::xml::{XmlDocument, XmlElement};
use serde::{Deserialize, Serialize};

/// Capability tag of media servers.
pub const SERVER_CAPABILITY: &str = "server";
/// Capability tag of playback clients.
pub const CLIENT_CAPABILITY: &str = "client";

/// A way of reaching a device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Connection {
    pub protocol: Option<String>,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub uri: Option<String>,
    /// Reachable on the local network
    pub local: bool,
    /// Routed through the Plex relay
    pub relay: bool,
}

/// A device as listed by the resources endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Device {
    pub client_identifier: String,
    /// Capability tags in the order Plex.tv lists them
    pub provides: Vec<String>,
    pub name: Option<String>,
    pub product: Option<String>,
    pub product_version: Option<String>,
    pub platform: Option<String>,
    pub platform_version: Option<String>,
    pub device: Option<String>,
    pub created_at: Option<String>,
    pub last_seen_at: Option<String>,
    pub access_token: Option<String>,
    pub public_address: Option<String>,
    pub owned: bool,
    pub https_required: bool,
    pub synced: bool,
    pub relay: bool,
    pub presence: bool,
    pub public_address_matches: bool,
    pub connections: Vec<Connection>,
}

impl Device {
    /// Build a device from a `<Device>` element.
    ///
    /// Missing attributes become `None`/`false`; a missing identifier
    /// becomes an empty string.
    pub fn from_element(element: &XmlElement) -> Self {
        let text = |name: &str| element.attribute(name).map(str::to_string);
        let flag = |name: &str| parse_flag(element.attribute(name));

        Self {
            client_identifier: text("clientIdentifier").unwrap_or_default(),
            provides: split_capabilities(element.attribute("provides").unwrap_or("")),
            name: text("name"),
            product: text("product"),
            product_version: text("productVersion"),
            platform: text("platform"),
            platform_version: text("platformVersion"),
            device: text("device"),
            created_at: text("createdAt"),
            last_seen_at: text("lastSeenAt"),
            access_token: text("accessToken"),
            public_address: text("publicAddress"),
            owned: flag("owned"),
            https_required: flag("httpsRequired"),
            synced: flag("synced"),
            relay: flag("relay"),
            presence: flag("presence"),
            public_address_matches: flag("publicAddressMatches"),
            connections: element
                .child_elements("Connection")
                .map(Connection::from_element)
                .collect(),
        }
    }

    pub fn provides(&self, capability: &str) -> bool {
        self.provides.iter().any(|tag| tag == capability)
    }

    pub fn is_server(&self) -> bool {
        self.provides(SERVER_CAPABILITY)
    }
}

impl Connection {
    fn from_element(element: &XmlElement) -> Self {
        let text = |name: &str| element.attribute(name).map(str::to_string);

        Self {
            protocol: text("protocol"),
            address: text("address"),
            port: element.attribute("port").and_then(|p| p.parse().ok()),
            uri: text("uri"),
            local: parse_flag(element.attribute("local")),
            relay: parse_flag(element.attribute("relay")),
        }
    }
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true"))
}

fn split_capabilities(provides: &str) -> Vec<String> {
    provides
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Devices in the order the API returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DeviceCollection(Vec<Device>);

impl DeviceCollection {
    pub fn new(devices: Vec<Device>) -> Self {
        Self(devices)
    }

    /// Collect every `<Device>` child of the document root.
    pub fn from_document(document: &XmlDocument) -> Self {
        document
            .root_element()
            .map(|root| {
                root.child_elements("Device")
                    .map(Device::from_element)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Device> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Device> {
        self.0.iter()
    }

    /// Keep devices providing `capability`, preserving order.
    pub fn with_capability(self, capability: &str) -> Self {
        self.0
            .into_iter()
            .filter(|device| device.provides(capability))
            .collect()
    }

    pub fn into_inner(self) -> Vec<Device> {
        self.0
    }
}

impl FromIterator<Device> for DeviceCollection {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for DeviceCollection {
    type Item = Device;
    type IntoIter = std::vec::IntoIter<Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DeviceCollection {
    type Item = &'a Device;
    type IntoIter = std::slice::Iter<'a, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
