//! BLS signatures over BLS12-381
//!
//! Public keys live in G1 and signatures in G2. Messages are hashed onto G2
//! with the Wahby-Boneh map and a Blake2b-based field hasher, under a
//! domain-separation tag.

use ark_bls12_381::{g2, Bls12_381, Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::hashing::curve_maps::wb::WBMap;
use ark_ec::hashing::map_to_curve_hasher::MapToCurveBasedHasher;
use ark_ec::hashing::HashToCurve;
use ark_ec::{CurveGroup, PrimeGroup};
use ark_ff::field_hashers::DefaultFieldHasher;
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::Rng;
use ark_std::UniformRand;
use blake2::{Blake2b512, Digest};

use super::Scheme;
use crate::error::AuthError;
use crate::security::{verify_bls_signature_ct, SensitiveScalar};

/// Domain-separation tag used by [`BlsScheme::default`]
pub const DEFAULT_DST: &[u8] = b"DKG-PROTOCOL-BLS-SIG-V1";

/// Compressed G2 point
pub const SIGNATURE_SIZE: usize = 96;

/// Compressed G1 point
pub const PUBLIC_KEY_SIZE: usize = 48;

type G2Hasher =
    MapToCurveBasedHasher<G2Projective, DefaultFieldHasher<Blake2b512, 128>, WBMap<g2::Config>>;

/// Long-term signing key. Zeroized on drop.
#[derive(Debug, Clone, CanonicalSerialize, CanonicalDeserialize)]
pub struct BlsPrivateKey(SensitiveScalar<Fr>);

/// Long-term verification key
#[derive(Debug, Clone, Copy, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct BlsPublicKey(G1Affine);

impl BlsPrivateKey {
    pub fn public_key(&self) -> BlsPublicKey {
        BlsPublicKey((G1Projective::generator() * self.0.expose_secret()).into_affine())
    }
}

impl BlsPublicKey {
    pub fn to_bytes(&self) -> Result<Vec<u8>, AuthError> {
        let mut bytes = Vec::with_capacity(PUBLIC_KEY_SIZE);
        self.0
            .serialize_compressed(&mut bytes)
            .map_err(|e| AuthError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AuthError> {
        G1Affine::deserialize_compressed(bytes)
            .map(BlsPublicKey)
            .map_err(|e| AuthError::Serialization(e.to_string()))
    }
}

/// BLS signature scheme with a configurable domain-separation tag
#[derive(Debug, Clone)]
pub struct BlsScheme {
    dst: Vec<u8>,
}

impl Default for BlsScheme {
    fn default() -> Self {
        Self::with_domain(DEFAULT_DST)
    }
}

impl BlsScheme {
    pub fn with_domain(dst: impl Into<Vec<u8>>) -> Self {
        Self { dst: dst.into() }
    }

    /// Fresh random key pair
    ///
    /// # Arguments
    /// * `rng` - Source of randomness for the private scalar
    pub fn keypair<R: Rng + ?Sized>(rng: &mut R) -> (BlsPrivateKey, BlsPublicKey) {
        let sk = BlsPrivateKey(SensitiveScalar::new(Fr::rand(rng)));
        let pk = sk.public_key();
        (sk, pk)
    }

    /// Key pair derived deterministically from `seed`
    ///
    /// # Security Warning
    /// Anyone who knows the seed knows the private key. Seeds must carry at
    /// least 128 bits of entropy outside of tests.
    pub fn keypair_from_seed(seed: &[u8]) -> (BlsPrivateKey, BlsPublicKey) {
        let mut hasher = Blake2b512::new();
        hasher.update(b"dkg-protocol-bls-keygen:");
        hasher.update(seed);
        let wide = hasher.finalize();

        let sk = BlsPrivateKey(SensitiveScalar::new(Fr::from_le_bytes_mod_order(&wide)));
        let pk = sk.public_key();
        (sk, pk)
    }

    fn hash_to_g2(&self, message: &[u8]) -> Result<G2Projective, AuthError> {
        let hasher =
            G2Hasher::new(&self.dst).map_err(|e| AuthError::HashToCurve(format!("{:?}", e)))?;
        let point: G2Affine = hasher
            .hash(message)
            .map_err(|e| AuthError::HashToCurve(format!("{:?}", e)))?;
        Ok(point.into())
    }
}

impl Scheme for BlsScheme {
    type PrivateKey = BlsPrivateKey;
    type PublicKey = BlsPublicKey;

    /// Sign `message` as `H(message) * sk` in G2
    ///
    /// # Returns
    /// The compressed signature, [`SIGNATURE_SIZE`] bytes
    fn sign(&self, private: &BlsPrivateKey, message: &[u8]) -> Result<Vec<u8>, AuthError> {
        let h = self.hash_to_g2(message)?;
        let signature = (h * private.0.expose_secret()).into_affine();

        let mut bytes = Vec::with_capacity(SIGNATURE_SIZE);
        signature
            .serialize_compressed(&mut bytes)
            .map_err(|e| AuthError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Check `signature` over `message` against `public`
    ///
    /// # Arguments
    /// * `public` - The claimed signer's public key
    /// * `message` - The signed bytes, hashed onto G2 under this scheme's tag
    /// * `signature` - A compressed G2 point
    ///
    /// # Errors
    /// - [`AuthError::MalformedSignature`] if the bytes are not a valid
    ///   subgroup point
    /// - [`AuthError::InvalidSignature`] if the pairing check fails
    ///
    /// # Security Note
    /// The final pairing comparison is constant time, see
    /// [`verify_bls_signature_ct`].
    fn verify(
        &self,
        public: &BlsPublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), AuthError> {
        // Validated deserialization rejects points outside the prime-order subgroup.
        let signature = G2Affine::deserialize_compressed(signature)
            .map_err(|e| AuthError::MalformedSignature(e.to_string()))?;
        let h = self.hash_to_g2(message)?;

        if verify_bls_signature_ct::<Bls12_381>(&signature.into(), &public.0.into(), &h) {
            Ok(())
        } else {
            Err(AuthError::InvalidSignature)
        }
    }
}
