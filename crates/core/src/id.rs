//! Type-tagged public identifiers.
//!
//! The external form is `prefix_<payload>`: a short kind tag, an underscore,
//! and a UUIDv7 payload encoded as 26 lowercase Crockford base32 characters.
//! The storage form is the raw UUID, so the database never stores the tag
//! redundantly. Both forms round-trip losslessly, and parsing a string with
//! the wrong prefix for its declared kind fails instead of coercing.
//!
//! UUIDv7 payloads are time-ordered with random low bits, so identifiers of
//! the same kind sort roughly by creation time in both representations.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use uuid::Uuid;

/// Length of the encoded payload in the string form.
const PAYLOAD_LEN: usize = 26;

/// Lowercase Crockford base32 alphabet (no `i`, `l`, `o`, `u`).
const ALPHABET: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";

/// Marker types naming each identifier kind and its string prefix.
pub mod kind {
    /// A kind of public identifier, carrying the `acc` in `acc_...`.
    pub trait IdKind: Send + Sync + 'static {
        /// String tag prepended to the encoded payload.
        const PREFIX: &'static str;
    }

    /// Account identifiers (`acc_...`).
    pub struct Account;

    impl IdKind for Account {
        const PREFIX: &'static str = "acc";
    }

    /// Session identifiers (`as_...`).
    pub struct Session;

    impl IdKind for Session {
        const PREFIX: &'static str = "as";
    }

    /// Request identifiers (`req_...`), used to validate client-supplied
    /// request-id headers before trusting them.
    pub struct Request;

    impl IdKind for Request {
        const PREFIX: &'static str = "req";
    }
}

use kind::IdKind;

/// Error produced when parsing an identifier from untrusted input.
///
/// Callers must treat any of these as equivalent to "absent" -- none of them
/// should escape past the validation boundary as a server failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input did not start with `<prefix>_` for the expected kind.
    #[error("identifier must start with '{expected}_'")]
    WrongPrefix {
        /// Prefix the caller declared it was parsing.
        expected: &'static str,
    },
    /// The payload was not exactly 26 characters.
    #[error("identifier payload must be {PAYLOAD_LEN} characters")]
    BadLength,
    /// The payload contained a character outside the base32 alphabet.
    #[error("identifier payload contains an invalid character")]
    BadCharacter,
    /// The payload decoded to more than 128 bits.
    #[error("identifier payload overflows 128 bits")]
    Overflow,
}

/// A globally unique, type-tagged, sortable identifier.
///
/// The kind is a zero-sized marker, so an `AccountId` and a [`SessionId`]
/// are different types and cannot be confused at compile time, while the
/// in-memory representation stays a bare UUID.
pub struct PublicId<K> {
    uuid: Uuid,
    _kind: PhantomData<K>,
}

/// Public identifier of an account (`acc_...`).
pub type AccountId = PublicId<kind::Account>;
/// Public identifier of a session (`as_...`).
pub type SessionId = PublicId<kind::Session>;
/// Public identifier of a request (`req_...`).
pub type RequestId = PublicId<kind::Request>;

impl<K: IdKind> PublicId<K> {
    /// Generate a fresh identifier with a UUIDv7 payload.
    ///
    /// Collision probability across concurrent calls is negligible (74 random
    /// bits per millisecond on top of the timestamp).
    pub fn generate() -> Self {
        Self::from_uuid(Uuid::now_v7())
    }

    /// Parse the external string form, rejecting wrong prefixes and
    /// malformed payloads.
    pub fn parse(input: &str) -> Result<Self, IdError> {
        let payload = input
            .strip_prefix(K::PREFIX)
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or(IdError::WrongPrefix { expected: K::PREFIX })?;
        decode_payload(payload).map(Self::from_uuid)
    }

    /// Reconstruct an identifier from its compact storage form.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            _kind: PhantomData,
        }
    }

    /// The compact storage form persisted in `uuid` columns.
    pub const fn as_uuid(&self) -> Uuid {
        self.uuid
    }

    /// String prefix for this identifier's kind.
    pub const fn prefix() -> &'static str {
        K::PREFIX
    }
}

fn encode_payload(uuid: Uuid) -> String {
    let n = uuid.as_u128();
    let mut out = String::with_capacity(PAYLOAD_LEN);
    for i in 0..PAYLOAD_LEN {
        // 26 chars hold 130 bits; the top character carries only 3 bits.
        let shift = 5 * (PAYLOAD_LEN - 1 - i);
        let index = ((n >> shift) & 0x1f) as usize;
        out.push(ALPHABET[index] as char);
    }
    out
}

fn decode_payload(payload: &str) -> Result<Uuid, IdError> {
    let bytes = payload.as_bytes();
    if bytes.len() != PAYLOAD_LEN {
        return Err(IdError::BadLength);
    }
    let first = decode_char(bytes[0])?;
    if first > 7 {
        // Two pad bits, so the first character must decode below 8.
        return Err(IdError::Overflow);
    }
    let mut value = u128::from(first);
    for &b in &bytes[1..] {
        value = (value << 5) | u128::from(decode_char(b)?);
    }
    Ok(Uuid::from_u128(value))
}

fn decode_char(b: u8) -> Result<u8, IdError> {
    ALPHABET
        .iter()
        .position(|&a| a == b)
        .map(|i| i as u8)
        .ok_or(IdError::BadCharacter)
}

// PhantomData would force derive bounds on `K`, so the std impls are manual.

impl<K> Clone for PublicId<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for PublicId<K> {}

impl<K> PartialEq for PublicId<K> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<K> Eq for PublicId<K> {}

impl<K> PartialOrd for PublicId<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for PublicId<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uuid.cmp(&other.uuid)
    }
}

impl<K> Hash for PublicId<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<K: IdKind> fmt::Display for PublicId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", K::PREFIX, encode_payload(self.uuid))
    }
}

impl<K: IdKind> fmt::Debug for PublicId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicId({self})")
    }
}

impl<K: IdKind> FromStr for PublicId<K> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K: IdKind> serde::Serialize for PublicId<K> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, K: IdKind> serde::Deserialize<'de> for PublicId<K> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
