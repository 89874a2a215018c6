use crate::error::{AuthError, Result};

/// Length of an ES256K-R signature: 32 byte R, 32 byte S, 1 byte V
pub const SIGNATURE_LEN: usize = 65;

/// Offset added to the recovery id in the compact form
pub const COMPACT_RECOVERY_BASE: u8 = 27;

/// A 65-byte recoverable signature in wire order (R || S || V)
///
/// # Example
/// ```rust
/// use filjwt::crypto::signature::Signature;
///
/// let sig = Signature::try_from(&[0u8; 65][..]).unwrap();
/// assert_eq!(sig.r().len(), 32);
/// assert_eq!(sig.v(), 0);
///
/// assert!(Signature::try_from(&[0u8; 64][..]).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// R component, big-endian
    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    /// S component, big-endian
    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    /// Recovery id
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = AuthError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_LEN] = bytes
            .try_into()
            .map_err(|_| AuthError::InvalidSignatureLength { len: bytes.len() })?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

/// Convert a compact recoverable signature (`27 + recid || R || S`) to
/// wire form (`R || S || recid`)
///
/// # Arguments
/// * `compact` - 65 bytes, recovery code first
///
/// # Returns
/// * `Ok(Signature)` - wire-order signature
/// * `Err(AuthError::InvalidSignatureLength)` - input is not 65 bytes
pub fn to_wire(compact: &[u8]) -> Result<Signature> {
    let compact: &[u8; SIGNATURE_LEN] = compact
        .try_into()
        .map_err(|_| AuthError::InvalidSignatureLength { len: compact.len() })?;

    let mut wire = [0u8; SIGNATURE_LEN];
    wire[..64].copy_from_slice(&compact[1..]);
    wire[64] = compact[0].wrapping_sub(COMPACT_RECOVERY_BASE);
    Ok(Signature(wire))
}

/// Convert a wire signature (`R || S || recid`) back to compact form
/// (`27 + recid || R || S`)
///
/// The recovery byte is not range checked here; an out-of-range value
/// simply fails public key recovery.
pub fn to_compact(wire: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
    let wire: &[u8; SIGNATURE_LEN] = wire
        .try_into()
        .map_err(|_| AuthError::InvalidSignatureLength { len: wire.len() })?;

    let mut compact = [0u8; SIGNATURE_LEN];
    compact[0] = wire[64].wrapping_add(COMPACT_RECOVERY_BASE);
    compact[1..].copy_from_slice(&wire[..64]);
    Ok(compact)
}
