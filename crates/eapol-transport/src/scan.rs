//! Wireless association tracking and 802.11i pre-authentication
//! orchestration.

use std::time::Duration;

use eapol_support::logging as log_macros;
use eapol_support::time::Deadline;
use eapol_wire::EthernetAddress;

use crate::contracts::ScanEvent;
use crate::endpoint::Endpoint;
use crate::source::SocketSource;

impl SocketSource {
    /// Query AP MAC, SSID and WPA-enterprise capability and update
    /// association state accordingly.
    pub(crate) fn refresh_wireless(&mut self) {
        let (ap_mac, ssid, wpa_enterprise) = match &mut self.wireless {
            Some(adapter) => (adapter.ap_mac(), adapter.copy_ssid(), adapter.is_wpa_enterprise()),
            None => return,
        };

        match ap_mac {
            None => {
                let was_associated = self.bssid.is_some();
                self.bssid = None;
                self.is_wpa_enterprise = false;
                self.ssid = None;
                self.cancel_scan();
                self.unsubscribe_handshake();
                self.authenticated = false;
                if was_associated {
                    log_macros::info!(self.log, "disassociated"; "context" => "wireless_refresh");
                }
            }
            Some(bssid) => {
                let roamed_or_fresh = self.bssid.is_none() || self.bssid != Some(bssid);
                if roamed_or_fresh {
                    let was_associated = self.bssid.is_some();
                    if self.config.enable_preauthentication {
                        // The BSSID we just associated to is about to become
                        // `main`; any pre-auth endpoint bound to it is now
                        // redundant.
                        self.drop_preauth(bssid);
                        if was_associated {
                            if let Some(delay) = eapol_support::time::delay_secs(self.config.scan_delay_roam_secs) {
                                self.schedule_scan(delay);
                            }
                        }
                    }
                }

                let old_ssid = self.ssid.clone();
                self.bssid = Some(bssid);
                self.ssid = ssid;
                self.is_wpa_enterprise = wpa_enterprise;

                if old_ssid.is_some() && old_ssid != self.ssid {
                    self.cancel_scan();
                }
            }
        }
    }

    /// Arms a one-shot timer `d` seconds out; `d < 0` is a no-op. A second
    /// call before the first fires cancels the earlier pending scan.
    pub(crate) fn schedule_scan(&mut self, delay: Duration) {
        self.scan_deadline = Some(Deadline::after(delay));
    }

    pub(crate) fn cancel_scan(&mut self) {
        self.scan_deadline = None;
        self.scan_period = None;
        if self.scan_in_flight {
            if let Some(adapter) = &mut self.wireless {
                adapter.scan_cancel();
            }
            self.scan_in_flight = false;
        }
    }

    /// Called once per run-loop iteration: fires the scan timer if it has
    /// elapsed, and drains any scan result the wireless adapter produced.
    pub(crate) fn poll_scan(&mut self) {
        if let Some(deadline) = self.scan_deadline {
            if !self.scan_in_flight && deadline.has_elapsed(std::time::Instant::now()) {
                self.scan_deadline = None;
                self.start_scan();
            }
        }

        let event = match &mut self.wireless {
            Some(adapter) => adapter.poll_scan_event(),
            None => None,
        };
        if let Some(ScanEvent::Results(bssids)) = event {
            self.scan_in_flight = false;
            self.handle_scan_results(bssids);
        }
    }

    fn start_scan(&mut self) {
        let ssid = match &self.ssid {
            Some(ssid) => ssid.clone(),
            None => return,
        };
        if let Some(adapter) = &mut self.wireless {
            adapter.scan(&ssid, self.config.number_of_scans);
            self.scan_in_flight = true;
        }
    }

    /// The wireless driver returned a list of neighboring BSSIDs from a scan.
    fn handle_scan_results(&mut self, bssids: Vec<EthernetAddress>) {
        let main_bssid = match self.bssid {
            Some(bssid) => bssid,
            None => {
                log_macros::debug!(self.log, "scan result with no main bssid"; "context" => "scan");
                return;
            }
        };
        if bssids.is_empty() {
            log_macros::debug!(self.log, "scan returned no neighbors"; "context" => "scan");
        }

        for bssid in bssids {
            if bssid == main_bssid || self.preauth.contains_key(&bssid) {
                continue;
            }
            self.spawn_preauth(bssid);
        }

        if self.config.scan_period_secs > 0 {
            self.schedule_scan(Duration::from_secs(self.config.scan_period_secs as u64));
        }
    }

    fn spawn_preauth(&mut self, bssid: EthernetAddress) {
        let derived = match &self.main {
            Some(main) => main.supplicant.derive_for_preauth(),
            None => return,
        };
        let log = self.log.new(eapol_support::logging::o!("endpoint" => bssid.to_string()));
        let mut endpoint = Endpoint::new_preauth(bssid, derived, log);
        {
            let mut handle = crate::source::SourceEndpointHandle {
                kind: endpoint.kind,
                source: self,
            };
            endpoint.supplicant.start(&mut handle);
        }
        self.preauth.insert(bssid, endpoint);
    }

    /// On handshake-complete notification: if the main supplicant has
    /// reached `Authenticated`, force-renew and release the subscription.
    pub(crate) fn poll_handshake(&mut self) {
        let fired = match &mut self.wireless {
            Some(adapter) => adapter.poll_handshake_complete(),
            None => false,
        };
        if !fired {
            return;
        }
        let authenticated = self
            .main
            .as_ref()
            .map(|e| matches!(e.supplicant.get_state().0, crate::contracts::SupplicantState::Authenticated))
            .unwrap_or(false);
        if authenticated {
            self.controller.force_renew();
        }
        self.unsubscribe_handshake();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::contracts::{ClientStatus, ControlDict, ControlMode, ControllerClient, ControllerEvent, SupplicantState};
    use crate::rawsocket::LinkSocket;
    use crate::source::SocketSource;

    struct CountingSupplicant {
        starts: Rc<Cell<u32>>,
    }

    impl crate::contracts::Supplicant for CountingSupplicant {
        fn start(&mut self, _endpoint: &mut dyn crate::contracts::EndpointHandle) {
            self.starts.set(self.starts.get() + 1);
        }
        fn stop(&mut self, _endpoint: &mut dyn crate::contracts::EndpointHandle) {}
        fn get_state(&self) -> (SupplicantState, ClientStatus) {
            (SupplicantState::Inactive, ClientStatus::Ok)
        }
        fn control(&mut self, _endpoint: &mut dyn crate::contracts::EndpointHandle, _command: i64, _dict: &ControlDict) -> bool {
            false
        }
        fn update_configuration(&mut self, _dict: &ControlDict) {}
        fn link_status_changed(&mut self, _endpoint: &mut dyn crate::contracts::EndpointHandle, _active: bool) {}
        fn set_no_ui(&mut self, _no_ui: bool) {}
        fn receive(&mut self, _endpoint: &mut dyn crate::contracts::EndpointHandle, _view: crate::contracts::RxView<'_>) {}
        fn derive_for_preauth(&self) -> Box<dyn crate::contracts::Supplicant> {
            Box::new(CountingSupplicant { starts: self.starts.clone() })
        }
    }

    struct NullController;
    impl ControllerClient for NullController {
        fn report_status(&mut self, _dict: &ControlDict) {}
        fn force_renew(&mut self) {}
        fn poll_event(&mut self) -> Option<ControllerEvent> {
            None
        }
        fn detach(&mut self) {}
    }

    struct NullWireless;
    impl crate::contracts::WirelessAdapter for NullWireless {
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
        fn receive(&self, _which: eapol_wire::EtherType, _buf: &mut [u8]) -> crate::error::TransportResult<usize> {
            Err(crate::error::TransportError::Wait)
        }
        fn send(&self, _which: eapol_wire::EtherType, _frame: &[u8]) -> crate::error::TransportResult<()> {
            Ok(())
        }
        fn register(&self, _poll: &mio::Poll) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn bssid(last: u8) -> EthernetAddress {
        EthernetAddress([0x02, 0x00, 0x00, 0x00, 0x00, last])
    }

    fn new_source(starts: Rc<Cell<u32>>) -> SocketSource {
        let mut source = SocketSource::for_test(
            true,
            ControlMode::User,
            crate::config::PreauthConfig {
                enable_preauthentication: true,
                scan_delay_authenticated_secs: 0,
                scan_delay_roam_secs: 0,
                scan_period_secs: -1,
                number_of_scans: 1,
            },
            Box::new(NullController),
            Some(Box::new(NullWireless)),
            Box::new(NullSocket),
        );
        let mut dict: ControlDict = ControlDict::new();
        dict.insert("Configuration".to_owned(), crate::contracts::ControlValue::Flag(true));
        assert!(source.create_supplicant(&dict, || Box::new(CountingSupplicant { starts: starts.clone() })));
        source
    }

    #[test]
    fn scan_results_create_preauth_for_unseen_bssids_only() {
        let starts = Rc::new(Cell::new(0u32));
        let mut source = new_source(starts.clone());

        let main_bssid = bssid(0x01);
        let existing = bssid(0x02);
        let fresh = bssid(0x03);
        source.bssid = Some(main_bssid);
        source.ssid = Some("network".to_owned());
        let log = eapol_support::logging::discard();
        source.preauth.insert(
            existing,
            Endpoint::new_preauth(existing, Box::new(CountingSupplicant { starts: starts.clone() }), log),
        );
        assert_eq!(starts.get(), 1); // main supplicant's start() only; the existing endpoint was inserted directly

        source.handle_scan_results(vec![main_bssid, existing, fresh]);

        assert_eq!(source.preauth.len(), 2);
        assert!(source.preauth.contains_key(&fresh));
        assert_eq!(starts.get(), 2);

        // A second identical callback creates no additional endpoints.
        source.handle_scan_results(vec![main_bssid, existing, fresh]);
        assert_eq!(source.preauth.len(), 2);
        assert_eq!(starts.get(), 2);
    }

    #[test]
    fn scan_results_with_unknown_main_bssid_is_a_noop() {
        let starts = Rc::new(Cell::new(0u32));
        let mut source = new_source(starts.clone());
        source.bssid = None;

        source.handle_scan_results(vec![bssid(0x09)]);

        assert!(source.preauth.is_empty());
    }
}
