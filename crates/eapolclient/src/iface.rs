//! Local interface queries needed to actually stand the process up: the
//! station's own MAC address and whether the interface is wireless.

use std::ffi::CString;
use std::{io, mem};

use eapol_wire::EthernetAddress;

pub fn local_ether_address(if_name: &str) -> io::Result<EthernetAddress> {
    let name = CString::new(if_name).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;

    let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }

    let mut req: libc::ifreq = unsafe { mem::zeroed() };
    for (dst, src) in req.ifr_name.iter_mut().zip(name.as_bytes_with_nul()) {
        *dst = *src as libc::c_char;
    }

    let result = unsafe { libc::ioctl(fd, libc::SIOCGIFHWADDR, &mut req) };
    unsafe {
        libc::close(fd);
    }
    if result < 0 {
        return Err(io::Error::last_os_error());
    }

    let hwaddr = unsafe { req.ifr_ifru.ifru_hwaddr };
    let mut bytes = [0u8; 6];
    for (dst, src) in bytes.iter_mut().zip(hwaddr.sa_data.iter()) {
        *dst = *src as u8;
    }
    Ok(EthernetAddress(bytes))
}

/// Wireless interfaces carry a `wireless` extension entry under
/// `/proc/net/wireless`; wired interfaces never appear there.
pub fn is_wireless_interface(if_name: &str) -> bool {
    let contents = match std::fs::read_to_string("/proc/net/wireless") {
        Ok(contents) => contents,
        Err(_) => return false,
    };
    contents
        .lines()
        .any(|line| line.trim_start().starts_with(if_name) && line.contains(':'))
}
