use core::fmt;
use core::str::FromStr;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use md5::{Digest, Md5};

use crate::error::BsonError;

/// A 12-byte globally-unique-enough identifier.
///
/// Layout: 4 big-endian bytes of Unix-seconds timestamp, 3 bytes of
/// machine identifier, 2 little-endian bytes of thread identifier, and a
/// 3-byte big-endian counter initialized from a random seed and
/// incremented modulo 2^24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

/// First three bytes of the MD5 digest of `input`.
fn digest3(input: &[u8]) -> [u8; 3] {
    let digest = Md5::digest(input);
    [digest[0], digest[1], digest[2]]
}

/// A stable numeric view of the current thread's id.
fn thread_id_bits() -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}

/// MAC address of the first non-loopback interface, when resolvable.
#[cfg(target_os = "linux")]
fn mac_address() -> Option<String> {
    let interfaces = std::fs::read_dir("/sys/class/net").ok()?;
    for entry in interfaces.flatten() {
        if entry.file_name().to_str() == Some("lo") {
            continue;
        }
        let raw = std::fs::read_to_string(entry.path().join("address")).ok()?;
        let address = raw.trim();
        if !address.is_empty() && address.bytes().any(|b| b != b'0' && b != b':') {
            return Some(address.to_owned());
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn mac_address() -> Option<String> {
    None
}

fn hostname() -> Option<String> {
    if let Ok(name) = std::fs::read_to_string("/proc/sys/kernel/hostname") {
        let name = name.trim();
        if !name.is_empty() {
            return Some(name.to_owned());
        }
    }
    std::env::var("HOSTNAME").ok().filter(|n| !n.is_empty())
}

/// Process-wide machine identifier, derived once: MD5 of the MAC address
/// when resolvable, else MD5 of the hostname, else the thread id.
fn machine_id() -> [u8; 3] {
    static MACHINE_ID: OnceLock<[u8; 3]> = OnceLock::new();
    *MACHINE_ID.get_or_init(|| {
        if let Some(mac) = mac_address() {
            return digest3(mac.as_bytes());
        }
        if let Some(host) = hostname() {
            return digest3(host.as_bytes());
        }
        let bits = thread_id_bits().to_be_bytes();
        [bits[5], bits[6], bits[7]]
    })
}

/// Next counter value, masked to 24 bits. Seeded randomly at first use.
fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU32::new(rand::random::<u32>() & 0x00FF_FFFF));
    counter.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF
}

fn unix_seconds() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
}

impl ObjectId {
    /// Generate a fresh identifier for the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timestamp(unix_seconds(), false)
    }

    /// Build an identifier whose timestamp is `seconds`. With
    /// `timestamp_only` the trailing 8 bytes are zero, which is the form
    /// used as a range-query boundary; otherwise machine, thread, and
    /// counter bytes are filled as for [`ObjectId::new`].
    #[must_use]
    pub fn from_time(seconds: u32, timestamp_only: bool) -> Self {
        Self::with_timestamp(seconds, timestamp_only)
    }

    fn with_timestamp(seconds: u32, timestamp_only: bool) -> Self {
        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        if !timestamp_only {
            bytes[4..7].copy_from_slice(&machine_id());
            let thread = thread_id_bits() as u16;
            bytes[7..9].copy_from_slice(&thread.to_le_bytes());
            let count = next_counter();
            bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        }
        Self(bytes)
    }

    /// Wrap raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    #[must_use]
    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Parse a 24-character hex representation.
    ///
    /// # Errors
    ///
    /// Returns [`BsonError::Decode`] when the input is not exactly 24
    /// hex characters.
    pub fn parse_str(hex_str: &str) -> Result<Self, BsonError> {
        if hex_str.len() != 24 {
            return Err(BsonError::decode(format!(
                "invalid ObjectId '{hex_str}': expected 24 hex characters"
            )));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(hex_str, &mut bytes)
            .map_err(|_| BsonError::decode(format!("invalid ObjectId hex '{hex_str}'")))?;
        Ok(Self(bytes))
    }

    /// The 24-character lowercase hex representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The embedded creation time as Unix seconds.
    #[must_use]
    pub const fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = BsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
