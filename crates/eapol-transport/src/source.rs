//! The central object: owns the raw link socket, the main and pre-auth
//! endpoints, the controller client handle, the wireless adapter, and the
//! scan scheduler. Demultiplexes inbound frames, serializes outbound
//! frames, and drives lifecycle.

use std::time::Duration;

use indexmap::IndexMap;

use eapol_support::logging::{self as log_macros, Logger};
use eapol_wire::{
    eapol_body_valid, DefaultEapValidator, EapolHeader, EapolPacketType, EthernetAddress,
    EthernetHeader, EtherType, EAPOL_HEADER_SIZE, EAPOL_MULTICAST, ETHER_HEADER_SIZE,
};

use crate::config::PreauthConfig;
use crate::contracts::{
    ClientStatus, ControlDict, ControlMode, ControlValue, ControllerClient, ControllerEvent,
    EndpointHandle, RxView, ScanEvent, Supplicant, SupplicantState, WirelessAdapter,
};
use crate::endpoint::{Endpoint, EndpointKind};
use crate::error::{ErrorKind, TransportError, TransportResult};
use crate::rawsocket::{LinkSocket, RawLinkSocket, MAX_FRAME_SIZE, TOKEN_EAPOL, TOKEN_PREAUTH};

/// Fixed transport MTU, used as-is rather than consulting the real
/// interface MTU.
pub const MTU: usize = 1400;

pub struct SocketSource {
    pub(crate) if_name: String,
    pub(crate) ether: EthernetAddress,
    mtu: usize,

    pub(crate) is_wireless: bool,
    pub(crate) is_wpa_enterprise: bool,
    pub(crate) link_active: bool,
    pub(crate) authenticated: bool,
    /// Tracks the main endpoint's 4-way-handshake subscription. Lives here
    /// rather than on `Endpoint` because every caller that needs it
    /// (`subscribe_handshake`/`unsubscribe_handshake`) runs while the main
    /// endpoint may be checked out of `self.main` (inside `with_main`, or
    /// during `create_supplicant` before it's attached at all).
    pub(crate) handshake_subscribed: bool,

    pub(crate) ssid: Option<String>,
    pub(crate) bssid: Option<EthernetAddress>,

    pub(crate) main: Option<Endpoint>,
    pub(crate) preauth: IndexMap<EthernetAddress, Endpoint>,
    pub(crate) process_removals: bool,

    pub(crate) mode: ControlMode,
    pub(crate) config: PreauthConfig,

    socket: Box<dyn LinkSocket>,
    poll: mio::Poll,

    pub(crate) controller: Box<dyn ControllerClient>,
    pub(crate) wireless: Option<Box<dyn WirelessAdapter>>,

    pub(crate) scan_deadline: Option<eapol_support::time::Deadline>,
    pub(crate) scan_period: Option<Duration>,
    pub(crate) scan_in_flight: bool,

    pub(crate) log: Logger,
}

/// Borrowed for the lifetime of a single `Supplicant` call, never stored.
/// Breaks the endpoint↔source cycle: the "handle back" exists only on the
/// stack of the call that needs it.
pub(crate) struct SourceEndpointHandle<'a> {
    pub(crate) kind: EndpointKind,
    pub(crate) source: &'a mut SocketSource,
}

impl<'a> EndpointHandle for SourceEndpointHandle<'a> {
    fn transmit(&mut self, packet_type: EapolPacketType, body: &[u8]) -> bool {
        self.source.transmit(self.kind, packet_type, body).is_ok()
    }

    fn set_key(&mut self, key_type: eapol_wire::KeyDescriptorType, index: u8, key: &[u8]) -> bool {
        if !self.source.is_wireless {
            return false;
        }
        match &mut self.source.wireless {
            Some(w) => w.set_key(key_type, index, key),
            None => false,
        }
    }

    fn set_pmk(&mut self, pmk: &[u8]) {
        self.source.set_pmk(self.kind, pmk);
    }

    fn report_status(&mut self, state: SupplicantState, status: ClientStatus, dict: ControlDict) {
        self.source.handle_status_report(self.kind, state, status, dict);
    }

    fn is_link_active(&self) -> bool {
        self.source.link_active
    }

    fn is_wireless(&self) -> bool {
        self.source.is_wireless
    }

    fn ssid(&self) -> Option<&str> {
        self.source.ssid.as_deref()
    }

    fn mtu(&self) -> usize {
        self.source.mtu
    }

    fn mode(&self) -> ControlMode {
        self.source.mode
    }

    fn name(&self) -> String {
        self.kind.name()
    }
}

impl SocketSource {
    /// Opens the raw link socket for `if_name` and assembles a source ready
    /// to accept a main supplicant. The controller client and wireless
    /// adapter are external collaborators this crate does not implement, so
    /// they are handed in already constructed rather than attached
    /// internally.
    pub fn create(
        if_name: &str,
        ether: EthernetAddress,
        mode: ControlMode,
        config: PreauthConfig,
        controller: Box<dyn ControllerClient>,
        wireless: Option<Box<dyn WirelessAdapter>>,
        log: Logger,
    ) -> TransportResult<SocketSource> {
        let is_wireless = wireless.is_some();
        let socket = RawLinkSocket::open(if_name, is_wireless)?;
        let poll = mio::Poll::new().map_err(|e| TransportError::Fatal(ErrorKind::SocketSetup("mio::Poll::new", e)))?;
        socket
            .register(&poll)
            .map_err(|e| TransportError::Fatal(ErrorKind::SocketSetup("register", e)))?;

        Ok(Self::assemble(
            if_name,
            ether,
            is_wireless,
            mode,
            config,
            controller,
            wireless,
            Box::new(socket),
            poll,
            log,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        if_name: &str,
        ether: EthernetAddress,
        is_wireless: bool,
        mode: ControlMode,
        config: PreauthConfig,
        controller: Box<dyn ControllerClient>,
        wireless: Option<Box<dyn WirelessAdapter>>,
        socket: Box<dyn LinkSocket>,
        poll: mio::Poll,
        log: Logger,
    ) -> SocketSource {
        SocketSource {
            if_name: if_name.to_owned(),
            ether,
            mtu: MTU,
            is_wireless,
            is_wpa_enterprise: false,
            link_active: false,
            authenticated: false,
            handshake_subscribed: false,
            ssid: None,
            bssid: None,
            main: None,
            preauth: IndexMap::new(),
            process_removals: false,
            mode,
            config,
            socket,
            poll,
            controller,
            wireless,
            scan_deadline: None,
            scan_period: None,
            scan_in_flight: false,
            log,
        }
    }

    /// Builds a source over a scripted `LinkSocket` instead of a real raw
    /// socket, so `eapol-transport`'s own dispatch/status-reporting tests
    /// can run without root or a live interface.
    #[cfg(test)]
    pub(crate) fn for_test(
        is_wireless: bool,
        mode: ControlMode,
        config: PreauthConfig,
        controller: Box<dyn ControllerClient>,
        wireless: Option<Box<dyn WirelessAdapter>>,
        socket: Box<dyn LinkSocket>,
    ) -> SocketSource {
        let poll = mio::Poll::new().expect("mio::Poll::new");
        Self::assemble(
            "test0",
            EthernetAddress([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]),
            is_wireless,
            mode,
            config,
            controller,
            wireless,
            socket,
            poll,
            eapol_support::logging::discard(),
        )
    }

    /// A dict with no `Configuration` key fails creation and logs; the
    /// source keeps running without a main supplicant attached.
    pub fn create_supplicant(
        &mut self,
        dict: &ControlDict,
        make: impl FnOnce() -> Box<dyn Supplicant>,
    ) -> bool {
        if !dict.contains_key("Configuration") {
            log_macros::debug!(self.log, "configuration empty"; "context" => "create_supplicant");
            return false;
        }

        let mut supplicant = make();
        supplicant.update_configuration(dict);
        {
            let mut handle = SourceEndpointHandle {
                kind: EndpointKind::Main,
                source: self,
            };
            supplicant.start(&mut handle);
        }
        let log = self.log.new(eapol_support::logging::o!("endpoint" => "(main)"));
        self.main = Some(Endpoint::new_main(supplicant, log));
        true
    }

    /// Stops all supplicants and closes the socket. The socket closes via
    /// `Drop` on `RawLinkSocket`; this method's job is stopping the main
    /// supplicant before any pre-auth ones.
    pub fn free(&mut self) {
        if let Some(mut endpoint) = self.main.take() {
            let mut handle = SourceEndpointHandle {
                kind: EndpointKind::Main,
                source: self,
            };
            endpoint.supplicant.stop(&mut handle);
        }
        let bssids: Vec<EthernetAddress> = self.preauth.keys().copied().collect();
        for bssid in bssids {
            self.drop_preauth(bssid);
        }
    }

    pub(crate) fn drop_preauth(&mut self, bssid: EthernetAddress) {
        if let Some(mut endpoint) = self.preauth.shift_remove(&bssid) {
            let mut handle = SourceEndpointHandle {
                kind: endpoint.kind,
                source: self,
            };
            endpoint.supplicant.stop(&mut handle);
        }
    }

    fn with_main<R>(&mut self, f: impl FnOnce(&mut dyn Supplicant, &mut dyn EndpointHandle) -> R) -> Option<R> {
        let mut endpoint = self.main.take()?;
        let result = {
            let mut handle = SourceEndpointHandle {
                kind: EndpointKind::Main,
                source: self,
            };
            f(endpoint.supplicant.as_mut(), &mut handle)
        };
        self.main = Some(endpoint);
        Some(result)
    }

    /// Reinserts at the end of the sequence: `IndexMap` has no in-place
    /// mutable-borrow-split, so the entry is removed and pushed back after
    /// the call. Harmless — the ordering invariant this crate relies on is
    /// BSSID uniqueness, not positional stability.
    fn with_preauth<R>(
        &mut self,
        bssid: EthernetAddress,
        f: impl FnOnce(&mut dyn Supplicant, &mut dyn EndpointHandle) -> R,
    ) -> Option<R> {
        let mut endpoint = self.preauth.shift_remove(&bssid)?;
        let result = {
            let mut handle = SourceEndpointHandle {
                kind: endpoint.kind,
                source: self,
            };
            f(endpoint.supplicant.as_mut(), &mut handle)
        };
        self.preauth.insert(bssid, endpoint);
        Some(result)
    }

    // ---- inbound demultiplexing ----

    fn on_readable(&mut self, which: EtherType) {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        loop {
            match self.socket.receive(which, &mut buf) {
                Ok(0) => break,
                Ok(n) => self.handle_frame(&buf[..n]),
                Err(TransportError::Wait) => break,
                Err(err) => {
                    log_macros::debug!(self.log, "raw socket read error"; "context" => "receive", "error" => %err);
                    break;
                }
            }
        }
    }

    fn handle_frame(&mut self, frame: &[u8]) {
        let eth = match EthernetHeader::parse(frame) {
            Ok(h) => h,
            Err(err) => {
                log_macros::debug!(self.log, "dropping short frame"; "context" => "demux", "error" => %err);
                return;
            }
        };

        if eth.ether_type != EtherType::Eapol && eth.ether_type != EtherType::PreAuth {
            log_macros::trace!(self.log, "dropping unrecognized ethertype"; "context" => "demux");
            return;
        }

        let body = &frame[ETHER_HEADER_SIZE..];
        let header = match EapolHeader::parse(body) {
            Ok(h) => h,
            Err(err) => {
                log_macros::debug!(self.log, "dropping invalid eapol header"; "context" => "demux", "error" => %err);
                return;
            }
        };

        if eapol_body_valid(&header, &body[EAPOL_HEADER_SIZE..], &DefaultEapValidator).is_err() {
            log_macros::debug!(self.log, "dropping invalid eapol body"; "context" => "demux");
            return;
        }

        if self.is_wireless
            && eth.ether_type == EtherType::Eapol
            && (self.bssid.is_none() || self.bssid != Some(eth.source))
        {
            self.refresh_wireless();
        }

        let eapol_frame = &body[..EAPOL_HEADER_SIZE + header.body_length as usize];
        match eth.ether_type {
            EtherType::Eapol => self.dispatch_main(eapol_frame),
            EtherType::PreAuth => self.dispatch_preauth(eth.source, eapol_frame),
            EtherType::Other(_) => unreachable!("filtered above"),
        }
    }

    fn dispatch_main(&mut self, eapol_frame: &[u8]) {
        let enabled = self.main.as_ref().map(|e| e.receive_enabled).unwrap_or(false);
        if !enabled {
            return;
        }
        self.with_main(|supp, handle| supp.receive(handle, RxView::new(eapol_frame)));
    }

    fn dispatch_preauth(&mut self, source_mac: EthernetAddress, eapol_frame: &[u8]) {
        let enabled = self
            .preauth
            .get(&source_mac)
            .map(|e| e.receive_enabled)
            .unwrap_or(false);
        if !enabled {
            log_macros::trace!(self.log, "no pre-auth endpoint for bssid"; "context" => "demux", "bssid" => %source_mac);
            return;
        }
        self.with_preauth(source_mac, |supp, handle| supp.receive(handle, RxView::new(eapol_frame)));
    }

    // ---- outbound framing ----

    pub(crate) fn transmit(
        &mut self,
        kind: EndpointKind,
        packet_type: EapolPacketType,
        body: &[u8],
    ) -> TransportResult<()> {
        let (destination, which) = match kind {
            EndpointKind::Main if self.is_wireless => {
                if self.bssid.is_none() {
                    self.refresh_wireless();
                }
                match self.bssid {
                    Some(bssid) => (bssid, EtherType::Eapol),
                    None => {
                        log_macros::debug!(self.log, "transmit with unknown bssid"; "context" => "transmit");
                        return Err(TransportError::Fatal(ErrorKind::UnknownBssid));
                    }
                }
            }
            EndpointKind::Main => (EAPOL_MULTICAST, EtherType::Eapol),
            EndpointKind::Preauth(bssid) => (bssid, EtherType::PreAuth),
        };

        let mut frame = [0u8; MAX_FRAME_SIZE];
        EthernetHeader {
            destination,
            source: self.ether,
            ether_type: which,
        }
        .write(&mut frame[..ETHER_HEADER_SIZE]);

        let header = EapolHeader::new(packet_type, body.len() as u16);
        header.write(&mut frame[ETHER_HEADER_SIZE..ETHER_HEADER_SIZE + EAPOL_HEADER_SIZE]);

        let payload_start = ETHER_HEADER_SIZE + EAPOL_HEADER_SIZE;
        let total = payload_start + body.len();
        frame[payload_start..total].copy_from_slice(body);

        self.socket.send(which, &frame[..total])
    }

    fn set_pmk(&mut self, kind: EndpointKind, pmk: &[u8]) {
        match kind {
            EndpointKind::Main => {
                if !self.is_wireless || !self.is_wpa_enterprise {
                    return;
                }
                let bssid = self.bssid;
                if let Some(w) = &mut self.wireless {
                    w.set_wpa_pmk(bssid, pmk);
                }
                if !pmk.is_empty() && !self.authenticated {
                    self.subscribe_handshake();
                } else {
                    self.unsubscribe_handshake();
                }
            }
            EndpointKind::Preauth(bssid) => {
                if let Some(w) = &mut self.wireless {
                    w.set_wpa_pmk(Some(bssid), pmk);
                }
            }
        }
    }

    fn subscribe_handshake(&mut self) {
        if self.handshake_subscribed {
            // Idempotent re-subscription: release first.
            if let Some(w) = &mut self.wireless {
                w.unsubscribe_handshake();
            }
        }
        self.handshake_subscribed = true;
        if let Some(w) = &mut self.wireless {
            w.subscribe_handshake();
        }
    }

    pub(crate) fn unsubscribe_handshake(&mut self) {
        if !self.handshake_subscribed {
            return;
        }
        self.handshake_subscribed = false;
        if let Some(w) = &mut self.wireless {
            w.unsubscribe_handshake();
        }
    }

    // ---- status reporting ----

    fn handle_status_report(
        &mut self,
        kind: EndpointKind,
        state: SupplicantState,
        status: ClientStatus,
        dict: ControlDict,
    ) {
        match kind {
            EndpointKind::Main => self.handle_main_status(state, dict),
            EndpointKind::Preauth(bssid) => self.handle_preauth_status(bssid, state, status),
        }
    }

    fn handle_main_status(&mut self, state: SupplicantState, dict: ControlDict) {
        match state {
            SupplicantState::Inactive => {
                self.unsubscribe_handshake();
                self.authenticated = false;
            }
            SupplicantState::Authenticated => {
                if !self.authenticated {
                    self.unsubscribe_handshake();
                    self.controller.force_renew();
                    self.authenticated = true;
                }
            }
            SupplicantState::Held => {
                self.unsubscribe_handshake();
                self.authenticated = false;
                self.controller.force_renew();
            }
            SupplicantState::Logoff => {
                if !self.is_wireless {
                    // Works around a DHCP-renew timing race. Do not replace
                    // with a delayed callback without reproducing that race
                    // first.
                    std::thread::sleep(Duration::from_millis(500));
                }
                self.controller.force_renew();
            }
            _ => {}
        }

        self.controller.report_status(&dict);

        if self.config.enable_preauthentication && self.is_wireless {
            match state {
                SupplicantState::Authenticated => {
                    if let Some(delay) = eapol_support::time::delay_secs(self.config.scan_delay_authenticated_secs) {
                        self.schedule_scan(delay);
                    }
                }
                _ => {
                    self.cancel_scan();
                    for endpoint in self.preauth.values_mut() {
                        endpoint.flag_for_removal();
                    }
                    if !self.preauth.is_empty() {
                        self.process_removals = true;
                    }
                }
            }
        }
    }

    fn handle_preauth_status(&mut self, bssid: EthernetAddress, state: SupplicantState, status: ClientStatus) {
        let should_remove = match state {
            SupplicantState::Held => true,
            SupplicantState::Authenticated => true,
            SupplicantState::Authenticating if status == ClientStatus::UserInputRequired => true,
            _ => false,
        };
        if !should_remove {
            return;
        }
        if let Some(endpoint) = self.preauth.get_mut(&bssid) {
            log_macros::debug!(self.log, "pre-auth endpoint flagged for removal"; "context" => "status", "bssid" => %bssid, "state" => ?state);
            endpoint.flag_for_removal();
            self.process_removals = true;
        }
    }

    // ---- deferred removal ----

    /// Run between event deliveries, i.e. from the run-loop idle observer.
    /// Never called from inside a receive/transmit callback on the endpoint
    /// being swept.
    pub fn sweep_removals(&mut self) {
        if !self.process_removals {
            return;
        }
        let doomed: Vec<EthernetAddress> = self
            .preauth
            .iter()
            .filter(|(_, e)| e.remove)
            .map(|(bssid, _)| *bssid)
            .collect();
        for bssid in doomed {
            self.drop_preauth(bssid);
        }
        self.process_removals = false;
    }

    // ---- link-state watcher ----

    /// Called by the run-loop substrate's interface-interest notification.
    pub fn on_link_state_changed(&mut self, active: bool) {
        self.link_active = active;
        if self.is_wireless {
            self.refresh_wireless();
        }
        self.with_main(|supp, handle| supp.link_status_changed(handle, active));
    }

    // ---- controller notifications ----

    fn poll_controller(&mut self) {
        let event = match self.controller.poll_event() {
            Some(event) => event,
            None => return,
        };
        match event {
            ControllerEvent::ServerDied => {
                if self.mode == ControlMode::User {
                    self.stop_normally();
                } else {
                    // rdar://6418520: no Logoff when the controller died
                    // outside a user session.
                    std::process::exit(0);
                }
            }
            ControllerEvent::Command(dict) => {
                let command = match dict.get("command") {
                    Some(ControlValue::Int(n)) => *n,
                    _ => {
                        log_macros::debug!(self.log, "controller command missing 'command' key"; "context" => "control");
                        return;
                    }
                };
                let stop = self
                    .with_main(|supp, handle| supp.control(handle, command, &dict))
                    .unwrap_or(false);
                if stop {
                    self.stop_normally();
                }
            }
        }
    }

    fn stop_normally(&mut self) {
        self.with_main(|supp, handle| supp.stop(handle));
        std::process::exit(0);
    }

    // ---- run loop ----

    /// One iteration: poll the raw socket, drain controller/wireless/scan
    /// events, then run the idle-observer sweep. The caller (`eapolclient`)
    /// owns the surrounding loop and picks the poll timeout.
    pub fn run_once(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        let mut events = mio::Events::with_capacity(16);
        self.poll.poll(&mut events, timeout)?;

        for event in &events {
            match event.token() {
                TOKEN_EAPOL => self.on_readable(EtherType::Eapol),
                TOKEN_PREAUTH => self.on_readable(EtherType::PreAuth),
                _ => {}
            }
        }

        self.poll_controller();
        self.poll_scan();
        self.poll_handshake();

        self.sweep_removals();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use eapol_wire::EthernetAddress;

    use super::*;
    use crate::contracts::{ControlDict, ControlValue};

    #[derive(Default)]
    struct Calls {
        force_renew: u32,
        started: u32,
        stopped: u32,
    }

    struct RecordingSupplicant {
        calls: Rc<RefCell<Calls>>,
    }

    impl Supplicant for RecordingSupplicant {
        fn start(&mut self, _endpoint: &mut dyn EndpointHandle) {
            self.calls.borrow_mut().started += 1;
        }
        fn stop(&mut self, _endpoint: &mut dyn EndpointHandle) {
            self.calls.borrow_mut().stopped += 1;
        }
        fn get_state(&self) -> (SupplicantState, ClientStatus) {
            (SupplicantState::Inactive, ClientStatus::Ok)
        }
        fn control(&mut self, _endpoint: &mut dyn EndpointHandle, _command: i64, _dict: &ControlDict) -> bool {
            false
        }
        fn update_configuration(&mut self, _dict: &ControlDict) {}
        fn link_status_changed(&mut self, _endpoint: &mut dyn EndpointHandle, _active: bool) {}
        fn set_no_ui(&mut self, _no_ui: bool) {}
        fn receive(&mut self, _endpoint: &mut dyn EndpointHandle, _view: RxView<'_>) {}
        fn derive_for_preauth(&self) -> Box<dyn Supplicant> {
            Box::new(RecordingSupplicant { calls: self.calls.clone() })
        }
    }

    struct NullController {
        calls: Rc<RefCell<Calls>>,
    }

    impl ControllerClient for NullController {
        fn report_status(&mut self, _dict: &ControlDict) {}
        fn force_renew(&mut self) {
            self.calls.borrow_mut().force_renew += 1;
        }
        fn poll_event(&mut self) -> Option<ControllerEvent> {
            None
        }
        fn detach(&mut self) {}
    }

    struct NullWireless;

    impl WirelessAdapter for NullWireless {
        fn ap_mac(&self) -> Option<EthernetAddress> {
            None
        }
        fn copy_ssid(&self) -> Option<String> {
            None
        }
        fn is_wpa_enterprise(&self) -> bool {
            false
        }
        fn set_key(&mut self, _key_type: eapol_wire::KeyDescriptorType, _index: u8, _key: &[u8]) -> bool {
            false
        }
        fn set_wpa_pmk(&mut self, _bssid: Option<EthernetAddress>, _pmk: &[u8]) -> bool {
            false
        }
        fn scan(&mut self, _ssid: &str, _count: u32) {}
        fn scan_cancel(&mut self) {}
        fn poll_scan_event(&mut self) -> Option<ScanEvent> {
            None
        }
        fn subscribe_handshake(&mut self) {}
        fn unsubscribe_handshake(&mut self) {}
        fn poll_handshake_complete(&mut self) -> bool {
            false
        }
    }

    struct NullSocket;

    impl LinkSocket for NullSocket {
        fn receive(&self, _which: EtherType, _buf: &mut [u8]) -> TransportResult<usize> {
            Err(TransportError::Wait)
        }
        fn send(&self, _which: EtherType, _frame: &[u8]) -> TransportResult<()> {
            Ok(())
        }
        fn register(&self, _poll: &mio::Poll) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn bssid(last: u8) -> EthernetAddress {
        EthernetAddress([0x02, 0x00, 0x00, 0x00, 0x00, last])
    }

    fn new_source(calls: Rc<RefCell<Calls>>) -> SocketSource {
        SocketSource::for_test(
            true,
            ControlMode::User,
            PreauthConfig {
                enable_preauthentication: true,
                scan_delay_authenticated_secs: 0,
                scan_delay_roam_secs: 0,
                scan_period_secs: -1,
                number_of_scans: 1,
            },
            Box::new(NullController { calls: calls.clone() }),
            Some(Box::new(NullWireless)),
            Box::new(NullSocket),
        )
    }

    fn attach_main(source: &mut SocketSource, calls: Rc<RefCell<Calls>>) {
        let mut dict: ControlDict = ControlDict::new();
        dict.insert("Configuration".to_owned(), ControlValue::Flag(true));
        let ok = source.create_supplicant(&dict, || Box::new(RecordingSupplicant { calls }));
        assert!(ok);
    }

    #[test]
    fn create_supplicant_rejects_dict_without_configuration_key() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut source = new_source(calls.clone());
        let empty: ControlDict = ControlDict::new();
        let ok = source.create_supplicant(&empty, || Box::new(RecordingSupplicant { calls: calls.clone() }));
        assert!(!ok);
        assert!(source.main.is_none());
    }

    #[test]
    fn main_authenticated_force_renews_once_and_schedules_scan() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut source = new_source(calls.clone());
        attach_main(&mut source, calls.clone());

        let dict: ControlDict = ControlDict::new();
        source.handle_main_status(SupplicantState::Authenticated, dict.clone());
        assert_eq!(calls.borrow().force_renew, 1);
        assert!(source.scan_deadline.is_some());

        // A second report while already authenticated does not re-renew.
        source.handle_main_status(SupplicantState::Authenticated, dict);
        assert_eq!(calls.borrow().force_renew, 1);
    }

    #[test]
    fn main_held_cancels_scan_and_flags_preauth_for_removal() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut source = new_source(calls.clone());
        attach_main(&mut source, calls.clone());

        let preauth_bssid = bssid(0xaa);
        let log = eapol_support::logging::discard();
        let endpoint = Endpoint::new_preauth(preauth_bssid, Box::new(RecordingSupplicant { calls: calls.clone() }), log);
        source.preauth.insert(preauth_bssid, endpoint);

        source.handle_main_status(SupplicantState::Held, ControlDict::new());
        assert_eq!(calls.borrow().force_renew, 1);
        assert!(source.preauth.get(&preauth_bssid).unwrap().remove);
        assert!(source.process_removals);
    }

    #[test]
    fn sweep_removals_stops_flagged_preauth_endpoints() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut source = new_source(calls.clone());
        attach_main(&mut source, calls.clone());

        let doomed = bssid(0xbb);
        let keeper = bssid(0xcc);
        let log = eapol_support::logging::discard();
        let mut doomed_endpoint =
            Endpoint::new_preauth(doomed, Box::new(RecordingSupplicant { calls: calls.clone() }), log.clone());
        doomed_endpoint.flag_for_removal();
        source.preauth.insert(doomed, doomed_endpoint);
        source.preauth.insert(
            keeper,
            Endpoint::new_preauth(keeper, Box::new(RecordingSupplicant { calls: calls.clone() }), log),
        );
        source.process_removals = true;

        source.sweep_removals();

        assert!(!source.preauth.contains_key(&doomed));
        assert!(source.preauth.contains_key(&keeper));
        assert_eq!(calls.borrow().stopped, 1);
        assert!(!source.process_removals);
    }

}
