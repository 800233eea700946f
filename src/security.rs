//! Secret-handling helpers for long-term signing keys
//!
//! - [`SensitiveScalar`]: zeroize-on-drop wrapper with redacted `Debug`
//! - constant-time comparison of serialized group and pairing elements

use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ff::Field;
use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Compress, Read, SerializationError, Valid, Validate,
    Write,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Scalar that is wiped when dropped. Used for long-term private keys.
///
/// # Security
/// - Overwritten with zero on drop
/// - `Debug` never prints the value
/// - Serialization writes the raw scalar, so encoded bytes must be protected
///   like the key itself
#[derive(Clone)]
pub struct SensitiveScalar<F: Field> {
    value: F,
}

impl<F: Field> SensitiveScalar<F> {
    pub fn new(value: F) -> Self {
        Self { value }
    }

    /// Borrow the secret value
    ///
    /// # Security Warning
    /// The reference must not be copied somewhere that outlives the wrapper.
    /// A copy of the field element is not zeroized when the wrapper drops.
    pub fn expose_secret(&self) -> &F {
        &self.value
    }
}

impl<F: Field> Zeroize for SensitiveScalar<F> {
    fn zeroize(&mut self) {
        // arkworks fields do not expose their limbs, so overwrite the value.
        self.value = F::zero();
    }
}

impl<F: Field> ZeroizeOnDrop for SensitiveScalar<F> {}

impl<F: Field> Drop for SensitiveScalar<F> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<F: Field> std::fmt::Debug for SensitiveScalar<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SensitiveScalar([REDACTED])")
    }
}

impl<F> CanonicalSerialize for SensitiveScalar<F>
where
    F: Field + CanonicalSerialize,
{
    fn serialize_with_mode<W: Write>(
        &self,
        mut writer: W,
        compress: Compress,
    ) -> Result<(), SerializationError> {
        self.value.serialize_with_mode(&mut writer, compress)
    }

    fn serialized_size(&self, compress: Compress) -> usize {
        self.value.serialized_size(compress)
    }
}

impl<F> CanonicalDeserialize for SensitiveScalar<F>
where
    F: Field + CanonicalDeserialize,
{
    fn deserialize_with_mode<R: Read>(
        mut reader: R,
        compress: Compress,
        validate: Validate,
    ) -> Result<Self, SerializationError> {
        let value = F::deserialize_with_mode(&mut reader, compress, validate)?;
        Ok(SensitiveScalar::new(value))
    }
}

impl<F> Valid for SensitiveScalar<F>
where
    F: Field + Valid,
{
    fn check(&self) -> Result<(), SerializationError> {
        self.value.check()
    }
}

/// Byte comparison whose running time depends only on the length
///
/// # Security Note
/// Slices of different lengths return early, so only the length leaks.
pub fn constant_time_bytes_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Compare two serializable elements through their compressed encodings.
/// A failed serialization compares unequal.
pub fn constant_time_eq<T: CanonicalSerialize>(a: &T, b: &T) -> bool {
    let mut a_bytes = Vec::new();
    let mut b_bytes = Vec::new();

    if a.serialize_compressed(&mut a_bytes).is_err() {
        return false;
    }
    if b.serialize_compressed(&mut b_bytes).is_err() {
        return false;
    }

    constant_time_bytes_eq(&a_bytes, &b_bytes)
}

/// Check a BLS signature with public keys in G1 and signatures in G2:
/// `e(g1, signature) == e(public_key, message)`.
///
/// # Arguments
/// * `signature` - The signature, a point in G2
/// * `public_key` - The signer's long-term public key in G1
/// * `message` - The message already hashed onto G2
///
/// # Returns
/// `true` if the pairing equation holds
///
/// # Security Note
/// The pairings themselves are not constant time; only the final comparison
/// of the pairing outputs is.
pub fn verify_bls_signature_ct<E: Pairing>(
    signature: &E::G2,
    public_key: &E::G1,
    message: &E::G2,
) -> bool {
    use ark_ec::PrimeGroup;

    let lhs: PairingOutput<E> = E::pairing(E::G1::generator(), *signature);
    let rhs: PairingOutput<E> = E::pairing(*public_key, *message);
    constant_time_eq(&lhs, &rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{Bls12_381, Fr};
    use ark_ec::PrimeGroup;
    use ark_std::UniformRand;

    type G1 = <Bls12_381 as Pairing>::G1;
    type G2 = <Bls12_381 as Pairing>::G2;

    #[test]
    fn test_constant_time_bytes_eq() {
        assert!(constant_time_bytes_eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(!constant_time_bytes_eq(&[1, 2, 3], &[1, 2, 4]));
        assert!(!constant_time_bytes_eq(&[1, 2, 3], &[1, 2]));
    }

    #[test]
    fn test_zeroize_clears_value() {
        let mut rng = ark_std::test_rng();
        let mut secret = SensitiveScalar::new(Fr::rand(&mut rng));
        secret.zeroize();
        assert_eq!(*secret.expose_secret(), Fr::from(0u64));
    }

    #[test]
    fn test_debug_is_redacted() {
        let mut rng = ark_std::test_rng();
        let value = Fr::rand(&mut rng);
        let secret = SensitiveScalar::new(value);
        let debug_str = format!("{:?}", secret);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains(&format!("{:?}", value)));
    }

    #[test]
    fn test_bls_relation() {
        let mut rng = ark_std::test_rng();
        let sk = Fr::rand(&mut rng);
        let pk = G1::generator() * sk;
        let message = G2::rand(&mut rng);

        let signature = message * sk;
        let forged = message * Fr::rand(&mut rng);

        assert!(verify_bls_signature_ct::<Bls12_381>(&signature, &pk, &message));
        assert!(!verify_bls_signature_ct::<Bls12_381>(&forged, &pk, &message));
    }
}
