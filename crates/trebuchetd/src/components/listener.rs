//! Listening TCP socket configured from the `Net.Listener` fragment.
//!
//! ```yaml
//! - type: Net.Listener
//!   settings:
//!     - Binding: { IP: 0.0.0.0, Port: 9000 }
//!     - Listening: { Backlog: 128 }
//! ```
//!
//! The component only opens the socket. Accepting connections is left to
//! whoever clones the listener through [`NetworkListener::try_clone_listener`].

use std::io;
use std::net::{IpAddr, SocketAddr, TcpListener};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::info;

use trebuchet_config::{ComponentIdentity, ConfigurationFragment, FragmentError};

use crate::component::{Component, ComponentError, ComponentKind};

/// Identity of the listening-socket component.
pub const LISTENER_IDENTITY: ComponentIdentity = ComponentIdentity::new("Net.Listener");

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::listener");

/// Endpoint and queue length read from the listener fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerSettings {
    /// Address to bind.
    pub address: SocketAddr,
    /// Pending connection queue length passed to `listen`.
    pub backlog: i32,
}

impl ListenerSettings {
    /// Reads the `Binding` and `Listening` elements.
    ///
    /// Each element must appear exactly once and carry its attributes.
    /// Malformed attribute values degrade to their fallbacks.
    pub fn from_fragment(fragment: &ConfigurationFragment) -> Result<Self, FragmentError> {
        let binding = fragment.single("Binding")?;
        let ip: IpAddr = binding.require("IP")?.coerce();
        let port: u16 = binding.require("Port")?.coerce();

        let listening = fragment.single("Listening")?;
        let backlog: i32 = listening.require("Backlog")?.coerce();

        Ok(Self {
            address: SocketAddr::new(ip, port),
            backlog,
        })
    }
}

#[derive(Debug)]
struct ListeningSocket {
    socket: Socket,
    local_addr: SocketAddr,
    backlog: i32,
}

/// Component owning a non-blocking listening TCP socket.
#[derive(Debug, Default)]
pub struct NetworkListener {
    socket: Option<ListeningSocket>,
}

impl NetworkListener {
    /// Address the socket is bound to, once listening.
    ///
    /// Reports the port the operating system picked when `Port` was `0`.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().map(|socket| socket.local_addr)
    }

    /// Backlog the socket was put into listening mode with.
    #[must_use]
    pub fn backlog(&self) -> Option<i32> {
        self.socket.as_ref().map(|socket| socket.backlog)
    }

    /// Returns `true` once construction opened the socket.
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.socket.is_some()
    }

    /// Duplicates the listening socket as a standard library listener.
    pub fn try_clone_listener(&self) -> io::Result<TcpListener> {
        let Some(listening) = self.socket.as_ref() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "listener has not been constructed",
            ));
        };
        listening.socket.try_clone().map(TcpListener::from)
    }

    fn open(settings: ListenerSettings) -> Result<ListeningSocket, ComponentError> {
        let io_error = |action: &'static str| {
            move |source: io::Error| ComponentError::Io {
                identity: LISTENER_IDENTITY,
                action,
                source,
            }
        };

        let socket = Socket::new(
            Domain::for_address(settings.address),
            Type::STREAM,
            Some(Protocol::TCP),
        )
        .map_err(io_error("create socket"))?;
        #[cfg(unix)]
        socket
            .set_reuse_address(true)
            .map_err(io_error("enable address reuse"))?;
        socket
            .bind(&settings.address.into())
            .map_err(io_error("bind socket"))?;
        socket
            .set_nonblocking(true)
            .map_err(io_error("set non-blocking mode"))?;
        socket
            .listen(settings.backlog)
            .map_err(io_error("listen"))?;

        let local_addr = socket
            .local_addr()
            .map_err(io_error("read local address"))?
            .as_socket()
            .unwrap_or(settings.address);

        Ok(ListeningSocket {
            socket,
            local_addr,
            backlog: settings.backlog,
        })
    }
}

impl Component for NetworkListener {
    fn construct(&mut self, fragment: &ConfigurationFragment) -> Result<(), ComponentError> {
        if self.socket.is_some() {
            return Err(ComponentError::AlreadyConstructed {
                identity: LISTENER_IDENTITY,
            });
        }

        let settings = ListenerSettings::from_fragment(fragment).map_err(|source| {
            ComponentError::InvalidConfiguration {
                identity: LISTENER_IDENTITY,
                source,
            }
        })?;
        let listening = Self::open(settings)?;
        info!(
            target: LISTENER_TARGET,
            address = %listening.local_addr,
            backlog = listening.backlog,
            "listening on {}",
            listening.local_addr
        );
        self.socket = Some(listening);
        Ok(())
    }
}

impl ComponentKind for NetworkListener {
    const IDENTITY: ComponentIdentity = LISTENER_IDENTITY;

    fn create() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, TcpStream};

    use rstest::{fixture, rstest};
    use trebuchet_config::{Element, FragmentScope};

    use super::*;

    fn fragment(elements: Vec<Element>) -> ConfigurationFragment {
        ConfigurationFragment::new(FragmentScope::Component(LISTENER_IDENTITY), elements)
    }

    #[fixture]
    fn loopback() -> ConfigurationFragment {
        fragment(vec![
            Element::new("Binding", [("IP", "127.0.0.1"), ("Port", "0")]),
            Element::new("Listening", [("Backlog", "16")]),
        ])
    }

    #[rstest]
    fn reads_settings_from_fragment(loopback: ConfigurationFragment) {
        let settings = ListenerSettings::from_fragment(&loopback).expect("valid fragment");
        assert_eq!(
            settings.address,
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
        );
        assert_eq!(settings.backlog, 16);
    }

    #[rstest]
    fn malformed_values_degrade_to_fallbacks() {
        let fragment = fragment(vec![
            Element::new("Binding", [("IP", "localhost:80"), ("Port", "ninety")]),
            Element::new("Listening", [("Backlog", "128")]),
        ]);
        let settings = ListenerSettings::from_fragment(&fragment).expect("structure is valid");
        assert_eq!(
            settings.address,
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
        );
    }

    #[rstest]
    fn listens_on_the_configured_endpoint(loopback: ConfigurationFragment) {
        let mut listener = NetworkListener::create();
        listener.construct(&loopback).expect("listener opens");

        assert!(listener.is_listening());
        assert_eq!(listener.backlog(), Some(16));
        let address = listener.local_addr().expect("bound address");
        assert!(address.ip().is_loopback());
        assert_ne!(address.port(), 0);

        TcpStream::connect(address).expect("connection is queued");
        let cloned = listener.try_clone_listener().expect("listener clones");
        assert_eq!(cloned.local_addr().expect("cloned address"), address);
    }

    #[rstest]
    #[case::no_listening(vec![Element::new("Binding", [("IP", "127.0.0.1"), ("Port", "0")])])]
    #[case::no_binding(vec![Element::new("Listening", [("Backlog", "8")])])]
    #[case::no_port(vec![
        Element::new("Binding", [("IP", "127.0.0.1")]),
        Element::new("Listening", [("Backlog", "8")]),
    ])]
    #[case::two_bindings(vec![
        Element::new("Binding", [("IP", "127.0.0.1"), ("Port", "0")]),
        Element::new("Binding", [("IP", "127.0.0.1"), ("Port", "0")]),
        Element::new("Listening", [("Backlog", "8")]),
    ])]
    fn structural_problems_are_invalid_configuration(#[case] elements: Vec<Element>) {
        let mut listener = NetworkListener::create();
        let error = listener
            .construct(&fragment(elements))
            .expect_err("fragment is incomplete");

        assert!(matches!(
            error,
            ComponentError::InvalidConfiguration { identity, .. } if identity == LISTENER_IDENTITY
        ));
        assert!(!listener.is_listening());
        assert!(listener.local_addr().is_none());
        assert!(listener.try_clone_listener().is_err());
    }

    #[rstest]
    fn occupied_port_is_an_io_failure() {
        let occupant = TcpListener::bind("127.0.0.1:0").expect("bind occupant");
        let port = occupant.local_addr().expect("occupant address").port().to_string();
        let fragment = fragment(vec![
            Element::new("Binding", [("IP", "127.0.0.1"), ("Port", port.as_str())]),
            Element::new("Listening", [("Backlog", "8")]),
        ]);

        let mut listener = NetworkListener::create();
        let error = listener
            .construct(&fragment)
            .expect_err("port is taken");
        assert!(matches!(error, ComponentError::Io { .. }));
        assert!(!listener.is_listening());
    }

    #[rstest]
    fn second_construction_is_rejected(loopback: ConfigurationFragment) {
        let mut listener = NetworkListener::create();
        listener.construct(&loopback).expect("listener opens");
        let address = listener.local_addr();

        let error = listener
            .construct(&loopback)
            .expect_err("already listening");
        assert!(matches!(error, ComponentError::AlreadyConstructed { .. }));
        assert_eq!(listener.local_addr(), address);
    }
}
