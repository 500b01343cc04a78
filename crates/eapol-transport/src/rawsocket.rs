//! Non-blocking `AF_PACKET` datagram socket bound to an interface. A wired
//! socket binds one `EtherType`; a wireless socket opens a second underlying
//! file descriptor for the pre-auth `EtherType` so both can be registered on
//! the same `mio::Poll` under distinct tokens, rather than relying on
//! `ETH_P_ALL` plus userspace filtering.

use std::ffi::CString;
use std::os::unix::io::RawFd;
use std::{io, mem};

use eapol_wire::{EtherType, EAPOL_MULTICAST};
use mio::unix::EventedFd;
use mio::{Evented, Poll, PollOpt, Ready, Token};

use crate::error::{ErrorKind, TransportError, TransportResult};

pub const MAX_FRAME_SIZE: usize = 1600;

fn htons(v: u16) -> u16 {
    v.to_be()
}

fn raw_open(ether_type: u16) -> io::Result<RawFd> {
    let fd = unsafe { libc::socket(libc::AF_PACKET, libc::SOCK_RAW, htons(ether_type) as i32) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(fd)
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL, 0) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    let result = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn if_index(if_name: &str) -> io::Result<i32> {
    let name = CString::new(if_name).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
    let index = unsafe { libc::if_nametoindex(name.as_ptr()) };
    if index == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(index as i32)
}

fn bind_to_interface(fd: RawFd, ifindex: i32, ether_type: u16) -> io::Result<()> {
    let mut addr: libc::sockaddr_ll = unsafe { mem::zeroed() };
    addr.sll_family = libc::AF_PACKET as u16;
    addr.sll_protocol = htons(ether_type);
    addr.sll_ifindex = ifindex;

    let result = unsafe {
        libc::bind(
            fd,
            &addr as *const libc::sockaddr_ll as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_ll>() as u32,
        )
    };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn join_eapol_multicast(fd: RawFd, ifindex: i32) -> io::Result<()> {
    let mut mreq: libc::packet_mreq = unsafe { mem::zeroed() };
    mreq.mr_ifindex = ifindex;
    mreq.mr_type = libc::PACKET_MR_MULTICAST as u16;
    mreq.mr_alen = 6;
    mreq.mr_address[..6].copy_from_slice(EAPOL_MULTICAST.as_bytes());

    let result = unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_PACKET,
            libc::PACKET_ADD_MEMBERSHIP,
            &mreq as *const libc::packet_mreq as *const libc::c_void,
            mem::size_of::<libc::packet_mreq>() as u32,
        )
    };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

struct Leg {
    fd: RawFd,
    ether_type: u16,
}

impl Drop for Leg {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

impl Evented for Leg {
    fn register(&self, poll: &Poll, token: Token, interest: Ready, opts: PollOpt) -> io::Result<()> {
        EventedFd(&self.fd).register(poll, token, interest, opts)
    }

    fn reregister(&self, poll: &Poll, token: Token, interest: Ready, opts: PollOpt) -> io::Result<()> {
        EventedFd(&self.fd).reregister(poll, token, interest, opts)
    }

    fn deregister(&self, poll: &Poll) -> io::Result<()> {
        EventedFd(&self.fd).deregister(poll)
    }
}

pub const TOKEN_EAPOL: Token = Token(0);
pub const TOKEN_PREAUTH: Token = Token(1);

/// Seam between `SocketSource` and the raw socket, so tests can drive the
/// demux/transmit/status-reporting logic against a scripted in-memory
/// socket instead of a real `AF_PACKET` fd (which needs root and a live
/// interface).
pub trait LinkSocket {
    fn receive(&self, which: EtherType, buf: &mut [u8]) -> TransportResult<usize>;
    fn send(&self, which: EtherType, frame: &[u8]) -> TransportResult<()>;
    fn register(&self, poll: &Poll) -> io::Result<()>;
}

/// The raw link socket. `eapol` is always present; `preauth` exists only on
/// a wireless interface, since wired interfaces never bind the pre-auth
/// `EtherType`.
pub struct RawLinkSocket {
    eapol: Leg,
    preauth: Option<Leg>,
}

impl RawLinkSocket {
    /// Opens and binds the socket(s) for `if_name`. On any sub-step
    /// failure the partially-opened socket(s) are closed (via `Drop`) and
    /// the OS error is returned.
    pub fn open(if_name: &str, is_wireless: bool) -> TransportResult<RawLinkSocket> {
        let ifindex = if_index(if_name)
            .map_err(|e| TransportError::Fatal(ErrorKind::SocketSetup("if_nametoindex", e)))?;

        let eapol = Self::open_leg(ifindex, EtherType::EAPOL)?;
        if !is_wireless {
            join_eapol_multicast(eapol.fd, ifindex)
                .map_err(|e| TransportError::Fatal(ErrorKind::SocketSetup("join_multicast", e)))?;
        }

        let preauth = if is_wireless {
            Some(Self::open_leg(ifindex, EtherType::PRE_AUTH)?)
        } else {
            None
        };

        Ok(RawLinkSocket { eapol, preauth })
    }

    fn open_leg(ifindex: i32, ether_type: u16) -> TransportResult<Leg> {
        let fd = raw_open(ether_type)
            .map_err(|e| TransportError::Fatal(ErrorKind::SocketSetup("socket", e)))?;
        if let Err(e) = set_nonblocking(fd) {
            unsafe { libc::close(fd) };
            return Err(TransportError::Fatal(ErrorKind::SocketSetup("nonblocking", e)));
        }
        if let Err(e) = bind_to_interface(fd, ifindex, ether_type) {
            unsafe { libc::close(fd) };
            return Err(TransportError::Fatal(ErrorKind::SocketSetup("bind", e)));
        }
        Ok(Leg { fd, ether_type })
    }

    fn leg(&self, which: EtherType) -> Option<&Leg> {
        match which {
            EtherType::Eapol => Some(&self.eapol),
            EtherType::PreAuth => self.preauth.as_ref(),
            EtherType::Other(_) => None,
        }
    }

    /// Non-blocking read of one Ethernet frame. EOF (`0` bytes) is folded
    /// into `Ok(0)`; the caller silently drops it.
    pub fn receive(&self, which: EtherType, buf: &mut [u8]) -> TransportResult<usize> {
        let leg = self.leg(which).ok_or(TransportError::Wait)?;
        let n = unsafe { libc::recv(leg.fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len(), 0) };
        if n < 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(n as usize)
    }

    /// `send(fd, frame)`: the destination sockaddr's contents are ignored
    /// by the kernel for `AF_PACKET`/`SOCK_RAW` — only `sll_ifindex` and
    /// `sll_family` matter for routing the write to the right device.
    pub fn send(&self, which: EtherType, frame: &[u8]) -> TransportResult<()> {
        let leg = self.leg(which).ok_or(TransportError::Fatal(ErrorKind::UnknownBssid))?;
        let n = unsafe {
            libc::send(
                leg.fd,
                frame.as_ptr() as *const libc::c_void,
                frame.len(),
                0,
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error().into());
        }
        if (n as usize) != frame.len() {
            return Err(TransportError::Fatal(ErrorKind::ShortSend {
                wrote: n as usize,
                needed: frame.len(),
            }));
        }
        Ok(())
    }

    pub fn register(&self, poll: &Poll) -> io::Result<()> {
        poll.register(&self.eapol, TOKEN_EAPOL, Ready::readable(), PollOpt::edge())?;
        if let Some(preauth) = &self.preauth {
            poll.register(preauth, TOKEN_PREAUTH, Ready::readable(), PollOpt::edge())?;
        }
        Ok(())
    }
}

impl LinkSocket for RawLinkSocket {
    fn receive(&self, which: EtherType, buf: &mut [u8]) -> TransportResult<usize> {
        RawLinkSocket::receive(self, which, buf)
    }

    fn send(&self, which: EtherType, frame: &[u8]) -> TransportResult<()> {
        RawLinkSocket::send(self, which, frame)
    }

    fn register(&self, poll: &Poll) -> io::Result<()> {
        RawLinkSocket::register(self, poll)
    }
}

