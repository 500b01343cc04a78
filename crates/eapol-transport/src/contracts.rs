//! The external collaborators this transport core talks to but does not
//! implement: the EAP method state machine ("supplicant"), the wireless
//! driver adapter, and the controller RPC client. Only the operations the
//! transport calls on them are modeled here.

use std::collections::HashMap;

use eapol_wire::{EthernetAddress, KeyDescriptorType};

/// Closed set of EAP state-machine states the transport reacts to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SupplicantState {
    Inactive,
    Connecting,
    Acquired,
    Authenticating,
    Authenticated,
    Held,
    Logoff,
    Disconnected,
}

impl Default for SupplicantState {
    fn default() -> SupplicantState {
        SupplicantState::Inactive
    }
}

/// A client status code carried alongside `SupplicantState` when a
/// supplicant reports itself, mirroring the pair `get_state` returns.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClientStatus {
    Ok,
    UserInputRequired,
    Other(u32),
}

impl Default for ClientStatus {
    fn default() -> ClientStatus {
        ClientStatus::Ok
    }
}

/// A value in a control/status dictionary exchanged with the controller or
/// carried in a `control()` call. Not every field a real EAP method needs,
/// just enough shape to route `command` numbers and status reports.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Int(i64),
    Text(String),
    Flag(bool),
}

pub type ControlDict = HashMap<String, ControlValue>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ControlMode {
    None,
    User,
    LoginWindow,
    System,
}

/// A borrowed view onto one inbound EAPOL frame (header + body), handed to
/// an endpoint's receive callback as a slice instead of a raw pointer and
/// length pair.
#[derive(Debug, Copy, Clone)]
pub struct RxView<'a> {
    frame: &'a [u8],
}

impl<'a> RxView<'a> {
    #[inline]
    pub fn new(frame: &'a [u8]) -> RxView<'a> {
        RxView { frame }
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.frame
    }

    #[inline]
    pub fn body(&self) -> &'a [u8] {
        &self.frame[eapol_wire::EAPOL_HEADER_SIZE..]
    }
}

/// What a supplicant can do to its own endpoint during a single call. Handed
/// in by reference for the duration of that call only, never stored: this
/// is how the endpoint↔supplicant cycle is broken in Rust — instead of a
/// non-owning back-pointer held across calls, the capability is borrowed and
/// returns to the source when the call unwinds.
pub trait EndpointHandle {
    fn transmit(&mut self, packet_type: eapol_wire::EapolPacketType, body: &[u8]) -> bool;
    fn set_key(&mut self, key_type: KeyDescriptorType, index: u8, key: &[u8]) -> bool;
    fn set_pmk(&mut self, pmk: &[u8]);
    fn report_status(&mut self, state: SupplicantState, status: ClientStatus, dict: ControlDict);
    fn is_link_active(&self) -> bool;
    fn is_wireless(&self) -> bool;
    fn ssid(&self) -> Option<&str>;
    fn mtu(&self) -> usize;
    fn mode(&self) -> ControlMode;
    fn name(&self) -> String;
}

/// The EAP method state machine. An external collaborator this crate does
/// not implement; only the calls the transport makes on it are declared.
pub trait Supplicant {
    fn start(&mut self, endpoint: &mut dyn EndpointHandle);
    fn stop(&mut self, endpoint: &mut dyn EndpointHandle);
    fn get_state(&self) -> (SupplicantState, ClientStatus);
    /// Returns `true` when the supplicant wants the endpoint stopped.
    fn control(&mut self, endpoint: &mut dyn EndpointHandle, command: i64, dict: &ControlDict) -> bool;
    fn update_configuration(&mut self, dict: &ControlDict);
    fn link_status_changed(&mut self, endpoint: &mut dyn EndpointHandle, active: bool);
    fn set_no_ui(&mut self, no_ui: bool);
    fn receive(&mut self, endpoint: &mut dyn EndpointHandle, view: RxView<'_>);
    /// Clones whatever immutable authentication context (credentials,
    /// method state) the main supplicant holds onto a fresh instance bound
    /// to a pre-auth endpoint.
    fn derive_for_preauth(&self) -> Box<dyn Supplicant>;
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    ServerDied,
    Command(ControlDict),
}

/// The system-wide EAPOL controller RPC client.
pub trait ControllerClient {
    fn report_status(&mut self, dict: &ControlDict);
    fn force_renew(&mut self);
    /// Polled once per run-loop iteration rather than delivered through a
    /// stored callback, matching the mio poll-and-dispatch style the rest
    /// of this crate uses.
    fn poll_event(&mut self) -> Option<ControllerEvent>;
    fn detach(&mut self);
}

#[derive(Debug, Clone)]
pub enum ScanEvent {
    Results(Vec<EthernetAddress>),
}

/// The wireless driver adapter: association/SSID queries, key/PMK
/// installation, scan initiation.
pub trait WirelessAdapter {
    fn ap_mac(&self) -> Option<EthernetAddress>;
    fn copy_ssid(&self) -> Option<String>;
    fn is_wpa_enterprise(&self) -> bool;
    fn set_key(&mut self, key_type: KeyDescriptorType, index: u8, key: &[u8]) -> bool;
    fn set_wpa_pmk(&mut self, bssid: Option<EthernetAddress>, pmk: &[u8]) -> bool;
    fn scan(&mut self, ssid: &str, count: u32);
    fn scan_cancel(&mut self);
    /// Polled once per run-loop iteration; see `ControllerClient::poll_event`.
    fn poll_scan_event(&mut self) -> Option<ScanEvent>;
    /// Non-blocking notification subscription for 4-way-handshake
    /// completion.
    fn subscribe_handshake(&mut self);
    fn unsubscribe_handshake(&mut self);
    fn poll_handshake_complete(&mut self) -> bool;
}
