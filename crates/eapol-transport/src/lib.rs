//! EAPOL transport and multiplexing core: the raw link socket, the socket
//! endpoint/source architecture, and scan-driven pre-authentication, sitting
//! between a raw link-layer socket and one or more external EAP state
//! machines ("supplicants").

mod config;
mod contracts;
mod endpoint;
mod error;
mod rawsocket;
mod scan;
mod source;

pub use config::PreauthConfig;
pub use contracts::{
    ClientStatus, ControlDict, ControlMode, ControlValue, ControllerClient, ControllerEvent,
    EndpointHandle, RxView, ScanEvent, Supplicant, SupplicantState, WirelessAdapter,
};
pub use endpoint::{Endpoint, EndpointKind};
pub use error::{ErrorKind, TransportError, TransportResult};
pub use rawsocket::{RawLinkSocket, MAX_FRAME_SIZE};
pub use source::{SocketSource, MTU};

#[cfg(test)]
mod tests {
    use super::*;
    use eapol_wire::{EapolPacketType, EthernetAddress, KeyDescriptorType};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// A supplicant that records every call it receives, for asserting
    /// dispatch/lifecycle behavior without a real EAP method implementation.
    struct MockSupplicant {
        log: Rc<RefCell<Vec<String>>>,
        state: SupplicantState,
        status: ClientStatus,
    }

    impl MockSupplicant {
        fn new(log: Rc<RefCell<Vec<String>>>) -> MockSupplicant {
            MockSupplicant {
                log,
                state: SupplicantState::Inactive,
                status: ClientStatus::Ok,
            }
        }
    }

    impl Supplicant for MockSupplicant {
        fn start(&mut self, _endpoint: &mut dyn EndpointHandle) {
            self.log.borrow_mut().push("start".to_owned());
        }

        fn stop(&mut self, _endpoint: &mut dyn EndpointHandle) {
            self.log.borrow_mut().push("stop".to_owned());
        }

        fn get_state(&self) -> (SupplicantState, ClientStatus) {
            (self.state, self.status)
        }

        fn control(&mut self, _endpoint: &mut dyn EndpointHandle, _command: i64, _dict: &ControlDict) -> bool {
            false
        }

        fn update_configuration(&mut self, _dict: &ControlDict) {}

        fn link_status_changed(&mut self, _endpoint: &mut dyn EndpointHandle, active: bool) {
            self.log.borrow_mut().push(format!("link_status_changed({})", active));
        }

        fn set_no_ui(&mut self, _no_ui: bool) {}

        fn receive(&mut self, _endpoint: &mut dyn EndpointHandle, view: RxView<'_>) {
            self.log
                .borrow_mut()
                .push(format!("receive({} bytes)", view.as_bytes().len()));
        }

        fn derive_for_preauth(&self) -> Box<dyn Supplicant> {
            Box::new(MockSupplicant::new(self.log.clone()))
        }
    }

    fn mock_endpoint_handle() -> impl EndpointHandle {
        struct Stub;
        impl EndpointHandle for Stub {
            fn transmit(&mut self, _packet_type: EapolPacketType, _body: &[u8]) -> bool {
                true
            }
            fn set_key(&mut self, _key_type: KeyDescriptorType, _index: u8, _key: &[u8]) -> bool {
                false
            }
            fn set_pmk(&mut self, _pmk: &[u8]) {}
            fn report_status(&mut self, _state: SupplicantState, _status: ClientStatus, _dict: ControlDict) {}
            fn is_link_active(&self) -> bool {
                true
            }
            fn is_wireless(&self) -> bool {
                false
            }
            fn ssid(&self) -> Option<&str> {
                None
            }
            fn mtu(&self) -> usize {
                MTU
            }
            fn mode(&self) -> ControlMode {
                ControlMode::User
            }
            fn name(&self) -> String {
                "(main)".to_owned()
            }
        }
        Stub
    }

    #[test]
    fn endpoint_name_distinguishes_main_and_preauth() {
        let bssid = EthernetAddress([0, 1, 2, 3, 4, 5]);
        assert_eq!(EndpointKind::Main.name(), "(main)");
        assert_eq!(EndpointKind::Preauth(bssid).name(), bssid.to_string());
    }

    #[test]
    fn mock_supplicant_derive_shares_log() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let supplicant = MockSupplicant::new(log.clone());
        let mut handle = mock_endpoint_handle();
        let mut derived = supplicant.derive_for_preauth();
        derived.start(&mut handle);
        assert_eq!(log.borrow().as_slice(), &["start".to_owned()]);
    }

    #[test]
    fn rx_view_exposes_body_after_header() {
        let frame = [0x01u8, EapolPacketType::Start.into(), 0x00, 0x00];
        let view = RxView::new(&frame);
        assert_eq!(view.body().len(), 0);
        assert_eq!(view.as_bytes().len(), 4);
    }
}
