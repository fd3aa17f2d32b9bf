use serde::{Deserialize, Serialize};

use crate::validator::{SemanticValidationError, Validator};

/// Options handed over to the swarm engine.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct Engine {
    /// Use the DHT for peer discovery.
    #[serde(default = "Engine::default_dht")]
    pub dht: bool,

    /// First port the engine tries to listen on for incoming peers.
    #[serde(default = "Engine::default_listen_port_start")]
    pub listen_port_start: u16,

    /// End of the listening port range, excluded.
    #[serde(default = "Engine::default_listen_port_end")]
    pub listen_port_end: u16,

    /// Ask the router to forward the listening port with UPnP.
    #[serde(default = "Engine::default_upnp_port_forwarding")]
    pub upnp_port_forwarding: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            dht: Self::default_dht(),
            listen_port_start: Self::default_listen_port_start(),
            listen_port_end: Self::default_listen_port_end(),
            upnp_port_forwarding: Self::default_upnp_port_forwarding(),
        }
    }
}

impl Engine {
    fn default_dht() -> bool {
        true
    }

    fn default_listen_port_start() -> u16 {
        4240
    }

    fn default_listen_port_end() -> u16 {
        4260
    }

    fn default_upnp_port_forwarding() -> bool {
        false
    }

    /// The ports the engine may listen on.
    #[must_use]
    pub fn listen_ports(&self) -> std::ops::Range<u16> {
        self.listen_port_start..self.listen_port_end
    }
}

impl Validator for Engine {
    fn validate(&self) -> Result<(), SemanticValidationError> {
        if self.listen_ports().is_empty() {
            return Err(SemanticValidationError::EmptyPortRange {
                start: self.listen_port_start,
                end: self.listen_port_end,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::validator::{SemanticValidationError, Validator};

    #[test]
    fn the_default_listening_ports_should_be_valid() {
        let engine = Engine::default();

        assert_eq!(engine.listen_ports(), 4240..4260);
        assert!(engine.validate().is_ok());
    }

    #[test]
    fn an_empty_listening_port_range_should_be_rejected() {
        let engine = Engine {
            listen_port_start: 6881,
            listen_port_end: 6881,
            ..Engine::default()
        };

        assert_eq!(
            engine.validate(),
            Err(SemanticValidationError::EmptyPortRange { start: 6881, end: 6881 })
        );
    }
}
