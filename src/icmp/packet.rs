use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};

use crate::checksum::{internet_checksum, verify_checksum};

pub const ICMP_ECHO_REQUEST: u8 = 8;
pub const ICMP_ECHO_REPLY: u8 = 0;
pub const ICMP_HEADER_LEN: usize = 8;

const IPV4_MIN_HEADER_LEN: usize = 20;
const IPV4_TTL_OFFSET: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcmpPacket {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
    pub payload: Vec<u8>,
}

impl IcmpPacket {
    /// Echo Request with a zero-filled payload and the checksum computed over
    /// header and payload together.
    pub fn new_echo_request(identifier: u16, sequence: u16, payload_size: usize) -> Self {
        let mut packet = Self {
            icmp_type: ICMP_ECHO_REQUEST,
            code: 0,
            checksum: 0,
            identifier,
            sequence,
            payload: vec![0u8; payload_size],
        };

        packet.calculate_checksum();
        packet
    }

    pub fn from_bytes(data: &[u8]) -> anyhow::Result<Self> {
        if data.len() < ICMP_HEADER_LEN {
            return Err(anyhow::anyhow!("ICMP packet too short: {} bytes", data.len()));
        }

        let mut cursor = Cursor::new(data);
        let icmp_type = cursor.read_u8()?;
        let code = cursor.read_u8()?;
        let checksum = cursor.read_u16::<BigEndian>()?;
        let identifier = cursor.read_u16::<BigEndian>()?;
        let sequence = cursor.read_u16::<BigEndian>()?;

        let mut payload = Vec::new();
        cursor.read_to_end(&mut payload)?;

        Ok(Self {
            icmp_type,
            code,
            checksum,
            identifier,
            sequence,
            payload,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ICMP_HEADER_LEN + self.payload.len());
        // Writes into a Vec cannot fail
        let _ = bytes.write_u8(self.icmp_type);
        let _ = bytes.write_u8(self.code);
        let _ = bytes.write_u16::<BigEndian>(self.checksum);
        let _ = bytes.write_u16::<BigEndian>(self.identifier);
        let _ = bytes.write_u16::<BigEndian>(self.sequence);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn calculate_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = internet_checksum(&self.to_bytes());
    }

    pub fn verify_checksum(&self) -> bool {
        verify_checksum(&self.to_bytes())
    }

    pub fn is_echo_reply(&self) -> bool {
        self.icmp_type == ICMP_ECHO_REPLY && self.code == 0
    }

    pub fn matches(&self, identifier: u16, sequence: u16) -> bool {
        self.is_echo_reply() && self.identifier == identifier && self.sequence == sequence
    }
}

/// An ICMP message read off a raw socket, with the TTL of the carrying IPv4
/// header when the platform delivered one.
#[derive(Debug, Clone)]
pub struct ReceivedDatagram {
    pub packet: IcmpPacket,
    pub ttl: Option<u8>,
}

/// Parses a datagram as delivered by a raw ICMP socket. Linux hands over the
/// IPv4 header in front of the ICMP message; other stacks may not.
pub fn parse_datagram(data: &[u8]) -> Option<ReceivedDatagram> {
    let first = *data.first()?;

    if first >> 4 == 4 && data.len() >= IPV4_MIN_HEADER_LEN {
        let header_len = ((first & 0x0F) as usize) * 4;
        if header_len < IPV4_MIN_HEADER_LEN || data.len() < header_len + ICMP_HEADER_LEN {
            log::debug!("Datagram too short for its IPv4 header: {} bytes", data.len());
            return None;
        }

        let packet = IcmpPacket::from_bytes(&data[header_len..]).ok()?;
        return Some(ReceivedDatagram {
            packet,
            ttl: Some(data[IPV4_TTL_OFFSET]),
        });
    }

    let packet = IcmpPacket::from_bytes(data).ok()?;
    Some(ReceivedDatagram { packet, ttl: None })
}
