//! Protocol port set of a connection endpoint
//!
//! The API reports ports as a list of `{protocol, port}` entries keyed by
//! verbose wire names. State exposes one attribute per known protocol
//! instead, each either null (disabled) or `{port = n}`.

use std::collections::HashMap;
use tfplug::types::Dynamic;

use super::{as_object, field, Attr, ConversionError, ObjectWriter, StateValue};
use crate::api::models::EndpointPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Smf,
    SmfCompressed,
    SmfTls,
    Web,
    WebTls,
    Amqp,
    AmqpTls,
    Mqtt,
    MqttWebSocket,
    MqttTls,
    MqttWebSocketTls,
    RestIncoming,
    RestIncomingTls,
    ManagementTls,
    SshTls,
}

impl Protocol {
    pub const ALL: [Protocol; 15] = [
        Protocol::Smf,
        Protocol::SmfCompressed,
        Protocol::SmfTls,
        Protocol::Web,
        Protocol::WebTls,
        Protocol::Amqp,
        Protocol::AmqpTls,
        Protocol::Mqtt,
        Protocol::MqttWebSocket,
        Protocol::MqttTls,
        Protocol::MqttWebSocketTls,
        Protocol::RestIncoming,
        Protocol::RestIncomingTls,
        Protocol::ManagementTls,
        Protocol::SshTls,
    ];

    /// Attribute name in state
    pub fn attribute_name(self) -> &'static str {
        match self {
            Protocol::Smf => "smf",
            Protocol::SmfCompressed => "smf_compressed",
            Protocol::SmfTls => "smf_tls",
            Protocol::Web => "web",
            Protocol::WebTls => "web_tls",
            Protocol::Amqp => "amqp",
            Protocol::AmqpTls => "amqp_tls",
            Protocol::Mqtt => "mqtt",
            Protocol::MqttWebSocket => "mqtt_websocket",
            Protocol::MqttTls => "mqtt_tls",
            Protocol::MqttWebSocketTls => "mqtt_websocket_tls",
            Protocol::RestIncoming => "rest_incoming",
            Protocol::RestIncomingTls => "rest_incoming_tls",
            Protocol::ManagementTls => "management_tls",
            Protocol::SshTls => "ssh_tls",
        }
    }

    /// Protocol name used by the API
    pub fn wire_name(self) -> &'static str {
        match self {
            Protocol::Smf => "serviceSmfPlainTextListenPort",
            Protocol::SmfCompressed => "serviceSmfCompressedListenPort",
            Protocol::SmfTls => "serviceSmfTlsListenPort",
            Protocol::Web => "serviceWebPlainTextListenPort",
            Protocol::WebTls => "serviceWebTlsListenPort",
            Protocol::Amqp => "serviceAmqpPlainTextListenPort",
            Protocol::AmqpTls => "serviceAmqpTlsListenPort",
            Protocol::Mqtt => "serviceMqttPlainTextListenPort",
            Protocol::MqttWebSocket => "serviceMqttWebSocketListenPort",
            Protocol::MqttTls => "serviceMqttTlsListenPort",
            Protocol::MqttWebSocketTls => "serviceMqttTlsWebSocketListenPort",
            Protocol::RestIncoming => "serviceRestIncomingPlainTextListenPort",
            Protocol::RestIncomingTls => "serviceRestIncomingTlsListenPort",
            Protocol::ManagementTls => "serviceManagementTlsListenPort",
            Protocol::SshTls => "managementSshTlsListenPort",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.wire_name() == name)
    }
}

/// Enabled protocols and their ports. Absent protocols are disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolPorts {
    ports: HashMap<Protocol, i64>,
}

impl ProtocolPorts {
    /// Build the port set from API entries. Port `0` means disabled and
    /// protocols missing from [`Protocol::ALL`] are dropped.
    pub fn from_wire(entries: &[EndpointPort]) -> Self {
        let mut ports = HashMap::new();

        for entry in entries {
            let port = match entry.port {
                Some(port) if port != 0 => port,
                _ => continue,
            };
            match Protocol::from_wire_name(&entry.protocol) {
                Some(protocol) => {
                    ports.insert(protocol, port);
                }
                None => {
                    tracing::debug!(protocol = %entry.protocol, "Ignoring unrecognized protocol");
                }
            }
        }

        Self { ports }
    }

    pub fn port(&self, protocol: Protocol) -> Option<i64> {
        self.ports.get(&protocol).copied()
    }

    pub fn enable(&mut self, protocol: Protocol, port: i64) {
        self.ports.insert(protocol, port);
    }

    pub fn enabled(&self) -> usize {
        self.ports.len()
    }
}

impl StateValue for ProtocolPorts {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        let mut writer = ObjectWriter::new();
        for protocol in Protocol::ALL {
            let slot = match self.port(protocol) {
                Some(port) => Attr::Known(EndpointProtocol { port }),
                None => Attr::Null,
            };
            writer = writer.field(protocol.attribute_name(), &slot)?;
        }
        Ok(writer.finish())
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        let object = as_object(value)?;
        let mut ports = ProtocolPorts::default();

        for protocol in Protocol::ALL {
            let slot: Attr<EndpointProtocol> = field(object, protocol.attribute_name())?;
            if let Attr::Known(EndpointProtocol { port }) = slot {
                ports.enable(protocol, port);
            }
        }

        Ok(ports)
    }
}

/// The `{port = n}` object of one enabled protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EndpointProtocol {
    port: i64,
}

impl StateValue for EndpointProtocol {
    fn to_dynamic(&self) -> Result<Dynamic, ConversionError> {
        Ok(ObjectWriter::new()
            .field("port", &Attr::Known(self.port))?
            .finish())
    }

    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        let object = as_object(value)?;
        match field::<i64>(object, "port")? {
            Attr::Known(port) => Ok(EndpointProtocol { port }),
            _ => Err(ConversionError::TypeMismatch {
                expected: "number",
                actual: "null",
            }),
        }
    }
}
