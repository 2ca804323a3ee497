//! Diffie-Hellman and ECDH key agreement over the domain parameter sets
//! standardized for PACE and Chip Authentication (ICAO 9303-11 §9.5.1, BSI
//! TR-03110-3 appendix A.2). Wraps [`super::groups::ModPGroup`] and
//! [`super::groups::EllipticCurve`] with byte-in/byte-out operations so
//! callers never touch the underlying `Uint` types, and folds in the PACE
//! Generic Mapping step (remapping the generator from a shared nonce).

use {
    super::{
        codec::{BsiTr031111Codec, BufCodecParent},
        groups::{named, EllipticCurve, EllipticCurvePoint, ModPGroup},
        mod_ring::{ModRingElementRef, RingRefExt, UintExp, UintMont},
        Codec, CryptoCoreRng,
    },
    crate::asn1::public_key_info::{
        DhAlgoParameters, ECAlgoParameters, FieldId, PubkeyAlgorithmIdentifier,
    },
    anyhow::{anyhow, bail, ensure, Result},
    ruint::{
        aliases::{U1024, U160, U192, U2048, U256, U384},
        Uint,
    },
    subtle::ConditionallySelectable,
};

type U224 = Uint<224, 4>;
type U320 = Uint<320, 5>;
type U512 = Uint<512, 8>;
type U521 = Uint<521, 9>;

/// Uncompressed-point, full-width encoding throughout: ICAO 9303 never
/// sends compressed points on the wire, and every group's `Uint` width
/// already matches its field/order size exactly, so the codec's defaults
/// (`uint_bytes: None`) are always the right byte length.
const CODEC: BsiTr031111Codec = BsiTr031111Codec {
    uint_bytes:        None,
    compressed_points: false,
};

/// A domain parameter set named by one of the `standardizedDomainParameters`
/// ids from ICAO 9303-11 §9.5.1 / BSI TR-03110-3 table 6, holding either a
/// Mod-P group (Diffie-Hellman) or an elliptic curve (ECDH).
///
/// Only the 14 standardized sets are supported: Rust's const generics fix a
/// `Uint`'s bit width at compile time, so arbitrary domain parameters can't
/// be represented without an unbounded set of monomorphizations. Explicit
/// domain parameters embedded in a certificate are still accepted, provided
/// they byte-match one of these 14 moduli; see [`Self::from_algorithm`].
#[derive(Clone, Copy)]
pub enum StandardizedDomainParameters {
    Group1(ModPGroup<U1024, U160>),
    Group2(ModPGroup<U2048, U224>),
    Group3(ModPGroup<U2048, U256>),
    BrainpoolP192r1(EllipticCurve<U192, U192>),
    Secp192r1(EllipticCurve<U192, U192>),
    Secp224r1(EllipticCurve<U224, U224>),
    BrainpoolP224r1(EllipticCurve<U224, U224>),
    Secp256r1(EllipticCurve<U256, U256>),
    BrainpoolP256r1(EllipticCurve<U256, U256>),
    BrainpoolP320r1(EllipticCurve<U320, U320>),
    Secp384r1(EllipticCurve<U384, U384>),
    BrainpoolP384r1(EllipticCurve<U384, U384>),
    Secp521r1(EllipticCurve<U521, U521>),
    BrainpoolP512r1(EllipticCurve<U512, U512>),
}

impl std::fmt::Debug for StandardizedDomainParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Group1(_) => "Group1",
            Self::Group2(_) => "Group2",
            Self::Group3(_) => "Group3",
            Self::BrainpoolP192r1(_) => "BrainpoolP192r1",
            Self::Secp192r1(_) => "Secp192r1",
            Self::Secp224r1(_) => "Secp224r1",
            Self::BrainpoolP224r1(_) => "BrainpoolP224r1",
            Self::Secp256r1(_) => "Secp256r1",
            Self::BrainpoolP256r1(_) => "BrainpoolP256r1",
            Self::BrainpoolP320r1(_) => "BrainpoolP320r1",
            Self::Secp384r1(_) => "Secp384r1",
            Self::BrainpoolP384r1(_) => "BrainpoolP384r1",
            Self::Secp521r1(_) => "Secp521r1",
            Self::BrainpoolP512r1(_) => "BrainpoolP512r1",
        };
        f.write_str(name)
    }
}

/// Parameter ids a chip may advertise or a terminal may ask for; matches
/// the constructors in [`super::groups::named`].
const KNOWN_PARAMETER_IDS: &[u64] = &[0, 1, 2, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18];

impl StandardizedDomainParameters {
    /// Resolves a `standardizedDomainParameters` id (ICAO 9303-11 §9.5.1) to
    /// its domain parameters.
    pub fn from_parameter_id(id: u64) -> Result<Self> {
        Ok(match id {
            0 => Self::Group1(ModPGroup::from(named::GROUP_1)),
            1 => Self::Group2(ModPGroup::from(named::GROUP_2)),
            2 => Self::Group3(ModPGroup::from(named::GROUP_3)),
            8 => Self::BrainpoolP192r1(named::brainpool_p192r1()),
            9 => Self::Secp192r1(named::secp192r1()),
            10 => Self::Secp224r1(named::secp224r1()),
            11 => Self::BrainpoolP224r1(named::brainpool_p224r1()),
            12 => Self::Secp256r1(named::secp256r1()),
            13 => Self::BrainpoolP256r1(named::brainpool_p256r1()),
            14 => Self::BrainpoolP320r1(named::brainpool_p320r1()),
            15 => Self::Secp384r1(named::secp384r1()),
            16 => Self::Secp521r1(named::secp521r1()),
            17 => Self::BrainpoolP384r1(named::brainpool_p384r1()),
            18 => Self::BrainpoolP512r1(named::brainpool_p512r1()),
            _ => bail!("Unknown standardized domain parameter id {id}"),
        })
    }

    /// Recovers domain parameters from a key-agreement `AlgorithmIdentifier`
    /// (a static Chip Authentication public key's own algorithm, which may
    /// name a curve instead of, or in addition to, a `ChipAuthenticationInfo`
    /// parameter id). Named curves and Mod-P groups are resolved directly;
    /// explicit parameters are matched against the 14 standardized sets by
    /// modulus, since only those are representable here (see the type's
    /// documentation).
    pub fn from_algorithm(algorithm: &PubkeyAlgorithmIdentifier) -> Result<Self> {
        match algorithm {
            PubkeyAlgorithmIdentifier::Dh(params) => Self::from_dh_params(params),
            PubkeyAlgorithmIdentifier::Ec(params) => Self::from_ec_params(params),
            PubkeyAlgorithmIdentifier::Rsa => bail!("RSA is not a key agreement algorithm"),
            PubkeyAlgorithmIdentifier::Unknown(any) => {
                bail!("Unrecognized key agreement algorithm {:?}", any.algorithm)
            }
        }
    }

    fn from_dh_params(params: &DhAlgoParameters) -> Result<Self> {
        Self::from_modulus_bytes(params.prime.as_bytes())
    }

    fn from_ec_params(params: &ECAlgoParameters) -> Result<Self> {
        match params {
            ECAlgoParameters::NamedCurve(oid) => Self::from_named_curve_oid(oid),
            ECAlgoParameters::EcParameters(ec) => match &ec.field_id {
                FieldId::Prime(prime) => Self::from_modulus_bytes(prime.as_bytes()),
                FieldId::Unknown { .. } => bail!("Only prime-field elliptic curves are supported"),
            },
            ECAlgoParameters::ImplicitlyCA(_) => {
                bail!("Implicitly-CA domain parameters are not supported")
            }
        }
    }

    fn from_named_curve_oid(oid: &der::asn1::ObjectIdentifier) -> Result<Self> {
        use der::asn1::ObjectIdentifier as Oid;

        const SECP192R1: Oid = Oid::new_unwrap("1.2.840.10045.3.1.1");
        const SECP224R1: Oid = Oid::new_unwrap("1.3.132.0.33");
        const SECP256R1: Oid = Oid::new_unwrap("1.2.840.10045.3.1.7");
        const SECP384R1: Oid = Oid::new_unwrap("1.3.132.0.34");
        const SECP521R1: Oid = Oid::new_unwrap("1.3.132.0.35");
        const BRAINPOOL_P192R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.3");
        const BRAINPOOL_P224R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.5");
        const BRAINPOOL_P256R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.7");
        const BRAINPOOL_P320R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.9");
        const BRAINPOOL_P384R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.11");
        const BRAINPOOL_P512R1: Oid = Oid::new_unwrap("1.3.36.3.3.2.8.1.1.13");

        Ok(match *oid {
            SECP192R1 => Self::Secp192r1(named::secp192r1()),
            SECP224R1 => Self::Secp224r1(named::secp224r1()),
            SECP256R1 => Self::Secp256r1(named::secp256r1()),
            SECP384R1 => Self::Secp384r1(named::secp384r1()),
            SECP521R1 => Self::Secp521r1(named::secp521r1()),
            BRAINPOOL_P192R1 => Self::BrainpoolP192r1(named::brainpool_p192r1()),
            BRAINPOOL_P224R1 => Self::BrainpoolP224r1(named::brainpool_p224r1()),
            BRAINPOOL_P256R1 => Self::BrainpoolP256r1(named::brainpool_p256r1()),
            BRAINPOOL_P320R1 => Self::BrainpoolP320r1(named::brainpool_p320r1()),
            BRAINPOOL_P384R1 => Self::BrainpoolP384r1(named::brainpool_p384r1()),
            BRAINPOOL_P512R1 => Self::BrainpoolP512r1(named::brainpool_p512r1()),
            _ => bail!("Unrecognized named curve {oid}"),
        })
    }

    fn from_modulus_bytes(modulus: &[u8]) -> Result<Self> {
        let modulus = trim_leading_zeros(modulus);
        for id in KNOWN_PARAMETER_IDS {
            let candidate = Self::from_parameter_id(*id)?;
            if trim_leading_zeros(&candidate.base_modulus_bytes()) == modulus {
                return Ok(candidate);
            }
        }
        bail!("Domain parameters do not match any standardized set")
    }

    fn base_modulus_bytes(&self) -> Vec<u8> {
        match self {
            Self::Group1(g) => g.base_field().modulus().to_be_bytes(),
            Self::Group2(g) => g.base_field().modulus().to_be_bytes(),
            Self::Group3(g) => g.base_field().modulus().to_be_bytes(),
            Self::BrainpoolP192r1(c) => c.base_field().modulus().to_be_bytes(),
            Self::Secp192r1(c) => c.base_field().modulus().to_be_bytes(),
            Self::Secp224r1(c) => c.base_field().modulus().to_be_bytes(),
            Self::BrainpoolP224r1(c) => c.base_field().modulus().to_be_bytes(),
            Self::Secp256r1(c) => c.base_field().modulus().to_be_bytes(),
            Self::BrainpoolP256r1(c) => c.base_field().modulus().to_be_bytes(),
            Self::BrainpoolP320r1(c) => c.base_field().modulus().to_be_bytes(),
            Self::Secp384r1(c) => c.base_field().modulus().to_be_bytes(),
            Self::BrainpoolP384r1(c) => c.base_field().modulus().to_be_bytes(),
            Self::Secp521r1(c) => c.base_field().modulus().to_be_bytes(),
            Self::BrainpoolP512r1(c) => c.base_field().modulus().to_be_bytes(),
        }
    }

    /// Generates an ephemeral key pair against this context's standard
    /// generator: PACE's unmapped first pass, and Chip Authentication's
    /// ephemeral half.
    pub fn generate_keypair(&self, rng: &mut dyn CryptoCoreRng) -> (Vec<u8>, Vec<u8>) {
        match self {
            Self::Group1(g) => dh_keypair(g, g.generator(), rng),
            Self::Group2(g) => dh_keypair(g, g.generator(), rng),
            Self::Group3(g) => dh_keypair(g, g.generator(), rng),
            Self::BrainpoolP192r1(c) => ec_keypair(c, c.generator(), rng),
            Self::Secp192r1(c) => ec_keypair(c, c.generator(), rng),
            Self::Secp224r1(c) => ec_keypair(c, c.generator(), rng),
            Self::BrainpoolP224r1(c) => ec_keypair(c, c.generator(), rng),
            Self::Secp256r1(c) => ec_keypair(c, c.generator(), rng),
            Self::BrainpoolP256r1(c) => ec_keypair(c, c.generator(), rng),
            Self::BrainpoolP320r1(c) => ec_keypair(c, c.generator(), rng),
            Self::Secp384r1(c) => ec_keypair(c, c.generator(), rng),
            Self::BrainpoolP384r1(c) => ec_keypair(c, c.generator(), rng),
            Self::Secp521r1(c) => ec_keypair(c, c.generator(), rng),
            Self::BrainpoolP512r1(c) => ec_keypair(c, c.generator(), rng),
        }
    }

    /// Computes the raw shared secret from our private key and the peer's
    /// public value. For a Mod-P group this is the full field element; for
    /// an elliptic curve it is the x-coordinate of the shared point (BSI
    /// TR-03111 §4.3.1). Callers feed the result through a KDF before use.
    pub fn agree(&self, private: &[u8], peer_public: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Group1(g) => dh_agree(g, private, peer_public),
            Self::Group2(g) => dh_agree(g, private, peer_public),
            Self::Group3(g) => dh_agree(g, private, peer_public),
            Self::BrainpoolP192r1(c) => ec_agree(c, private, peer_public),
            Self::Secp192r1(c) => ec_agree(c, private, peer_public),
            Self::Secp224r1(c) => ec_agree(c, private, peer_public),
            Self::BrainpoolP224r1(c) => ec_agree(c, private, peer_public),
            Self::Secp256r1(c) => ec_agree(c, private, peer_public),
            Self::BrainpoolP256r1(c) => ec_agree(c, private, peer_public),
            Self::BrainpoolP320r1(c) => ec_agree(c, private, peer_public),
            Self::Secp384r1(c) => ec_agree(c, private, peer_public),
            Self::BrainpoolP384r1(c) => ec_agree(c, private, peer_public),
            Self::Secp521r1(c) => ec_agree(c, private, peer_public),
            Self::BrainpoolP512r1(c) => ec_agree(c, private, peer_public),
        }
    }

    /// PACE Generic Mapping (BSI TR-03110-3 §4.3.3.3.2): remaps the
    /// standard generator using the decrypted nonce `s` and the first-pass
    /// shared secret `H`, giving `g~ = g^s * H` (Mod-P) or `G~ = s*G + H`
    /// (EC). The returned [`MappedGenerator`] is then used as the base for
    /// a second ephemeral key agreement.
    pub fn map_generator<'g>(
        &'g self,
        nonce: &[u8],
        shared_secret: &[u8],
    ) -> Result<MappedGenerator<'g>> {
        Ok(match self {
            Self::Group1(g) => MappedGenerator::Group1(g, dh_map_generator(g, nonce, shared_secret)?),
            Self::Group2(g) => MappedGenerator::Group2(g, dh_map_generator(g, nonce, shared_secret)?),
            Self::Group3(g) => MappedGenerator::Group3(g, dh_map_generator(g, nonce, shared_secret)?),
            Self::BrainpoolP192r1(c) => {
                MappedGenerator::BrainpoolP192r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
            Self::Secp192r1(c) => {
                MappedGenerator::Secp192r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
            Self::Secp224r1(c) => {
                MappedGenerator::Secp224r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
            Self::BrainpoolP224r1(c) => {
                MappedGenerator::BrainpoolP224r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
            Self::Secp256r1(c) => {
                MappedGenerator::Secp256r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
            Self::BrainpoolP256r1(c) => {
                MappedGenerator::BrainpoolP256r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
            Self::BrainpoolP320r1(c) => {
                MappedGenerator::BrainpoolP320r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
            Self::Secp384r1(c) => {
                MappedGenerator::Secp384r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
            Self::BrainpoolP384r1(c) => {
                MappedGenerator::BrainpoolP384r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
            Self::Secp521r1(c) => {
                MappedGenerator::Secp521r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
            Self::BrainpoolP512r1(c) => {
                MappedGenerator::BrainpoolP512r1(c, ec_map_generator(c, nonce, shared_secret)?)
            }
        })
    }
}

/// The remapped generator produced by [`StandardizedDomainParameters::map_generator`],
/// paired with the group it was remapped within so a second ephemeral key
/// pair can be generated against it.
#[derive(Clone, Copy)]
pub enum MappedGenerator<'g> {
    Group1(&'g ModPGroup<U1024, U160>, ModRingElementRef<'g, U1024>),
    Group2(&'g ModPGroup<U2048, U224>, ModRingElementRef<'g, U2048>),
    Group3(&'g ModPGroup<U2048, U256>, ModRingElementRef<'g, U2048>),
    BrainpoolP192r1(&'g EllipticCurve<U192, U192>, EllipticCurvePoint<'g, U192, U192>),
    Secp192r1(&'g EllipticCurve<U192, U192>, EllipticCurvePoint<'g, U192, U192>),
    Secp224r1(&'g EllipticCurve<U224, U224>, EllipticCurvePoint<'g, U224, U224>),
    BrainpoolP224r1(&'g EllipticCurve<U224, U224>, EllipticCurvePoint<'g, U224, U224>),
    Secp256r1(&'g EllipticCurve<U256, U256>, EllipticCurvePoint<'g, U256, U256>),
    BrainpoolP256r1(&'g EllipticCurve<U256, U256>, EllipticCurvePoint<'g, U256, U256>),
    BrainpoolP320r1(&'g EllipticCurve<U320, U320>, EllipticCurvePoint<'g, U320, U320>),
    Secp384r1(&'g EllipticCurve<U384, U384>, EllipticCurvePoint<'g, U384, U384>),
    BrainpoolP384r1(&'g EllipticCurve<U384, U384>, EllipticCurvePoint<'g, U384, U384>),
    Secp521r1(&'g EllipticCurve<U521, U521>, EllipticCurvePoint<'g, U521, U521>),
    BrainpoolP512r1(&'g EllipticCurve<U512, U512>, EllipticCurvePoint<'g, U512, U512>),
}

impl MappedGenerator<'_> {
    /// Generates PACE's second-pass ephemeral key pair against the mapped
    /// generator.
    pub fn generate_keypair(&self, rng: &mut dyn CryptoCoreRng) -> (Vec<u8>, Vec<u8>) {
        match self {
            Self::Group1(g, base) => dh_keypair(g, *base, rng),
            Self::Group2(g, base) => dh_keypair(g, *base, rng),
            Self::Group3(g, base) => dh_keypair(g, *base, rng),
            Self::BrainpoolP192r1(_, base) => ec_keypair(base.curve(), *base, rng),
            Self::Secp192r1(_, base) => ec_keypair(base.curve(), *base, rng),
            Self::Secp224r1(_, base) => ec_keypair(base.curve(), *base, rng),
            Self::BrainpoolP224r1(_, base) => ec_keypair(base.curve(), *base, rng),
            Self::Secp256r1(_, base) => ec_keypair(base.curve(), *base, rng),
            Self::BrainpoolP256r1(_, base) => ec_keypair(base.curve(), *base, rng),
            Self::BrainpoolP320r1(_, base) => ec_keypair(base.curve(), *base, rng),
            Self::Secp384r1(_, base) => ec_keypair(base.curve(), *base, rng),
            Self::BrainpoolP384r1(_, base) => ec_keypair(base.curve(), *base, rng),
            Self::Secp521r1(_, base) => ec_keypair(base.curve(), *base, rng),
            Self::BrainpoolP512r1(_, base) => ec_keypair(base.curve(), *base, rng),
        }
    }

    /// Completes PACE's second-pass agreement. The shared secret does not
    /// depend on which base the peer's public key was exponentiated from,
    /// so this reuses the same `dh_agree`/`ec_agree` as the unmapped case.
    pub fn agree(&self, private: &[u8], peer_public: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Group1(g, _) => dh_agree(g, private, peer_public),
            Self::Group2(g, _) => dh_agree(g, private, peer_public),
            Self::Group3(g, _) => dh_agree(g, private, peer_public),
            Self::BrainpoolP192r1(c, _) => ec_agree(c, private, peer_public),
            Self::Secp192r1(c, _) => ec_agree(c, private, peer_public),
            Self::Secp224r1(c, _) => ec_agree(c, private, peer_public),
            Self::BrainpoolP224r1(c, _) => ec_agree(c, private, peer_public),
            Self::Secp256r1(c, _) => ec_agree(c, private, peer_public),
            Self::BrainpoolP256r1(c, _) => ec_agree(c, private, peer_public),
            Self::BrainpoolP320r1(c, _) => ec_agree(c, private, peer_public),
            Self::Secp384r1(c, _) => ec_agree(c, private, peer_public),
            Self::BrainpoolP384r1(c, _) => ec_agree(c, private, peer_public),
            Self::Secp521r1(c, _) => ec_agree(c, private, peer_public),
            Self::BrainpoolP512r1(c, _) => ec_agree(c, private, peer_public),
        }
    }

    /// The remapped generator's encoded public value, as sent to the peer.
    pub fn encode_public(&self) -> Vec<u8> {
        match self {
            Self::Group1(_, base) => encode(*base),
            Self::Group2(_, base) => encode(*base),
            Self::Group3(_, base) => encode(*base),
            Self::BrainpoolP192r1(_, base) => encode(*base),
            Self::Secp192r1(_, base) => encode(*base),
            Self::Secp224r1(_, base) => encode(*base),
            Self::BrainpoolP224r1(_, base) => encode(*base),
            Self::Secp256r1(_, base) => encode(*base),
            Self::BrainpoolP256r1(_, base) => encode(*base),
            Self::BrainpoolP320r1(_, base) => encode(*base),
            Self::Secp384r1(_, base) => encode(*base),
            Self::BrainpoolP384r1(_, base) => encode(*base),
            Self::Secp521r1(_, base) => encode(*base),
            Self::BrainpoolP512r1(_, base) => encode(*base),
        }
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[first_nonzero..]
}

fn encode<T>(value: T) -> Vec<u8>
where
    BsiTr031111Codec: Codec<T>,
{
    let mut buffer = Vec::new();
    CODEC.encode(&mut buffer, value);
    buffer
}

fn decode<T>(bytes: &[u8], parent: <BsiTr031111Codec as Codec<T>>::Parent) -> Result<T>
where
    BsiTr031111Codec: Codec<T>,
{
    let mut cursor = bytes;
    let value = cursor.get_codec_parent(&CODEC, parent)?;
    ensure!(cursor.is_empty(), "trailing bytes in encoded value");
    Ok(value)
}

fn dh_keypair<U, V>(
    group: &ModPGroup<U, V>,
    base: ModRingElementRef<'_, U>,
    rng: &mut dyn CryptoCoreRng,
) -> (Vec<u8>, Vec<u8>)
where
    U: UintMont + ConditionallySelectable,
    V: UintMont + UintExp,
{
    let scalar = group.scalar_field().random(rng);
    let public = base.pow_ct(scalar.to_uint());
    (encode(scalar), encode(public))
}

fn dh_agree<U, V>(group: &ModPGroup<U, V>, private: &[u8], peer_public: &[u8]) -> Result<Vec<u8>>
where
    U: UintMont + ConditionallySelectable,
    V: UintMont + UintExp,
{
    let scalar: ModRingElementRef<'_, V> = decode(private, group.scalar_field())?;
    let peer: ModRingElementRef<'_, U> = decode(peer_public, group.base_field())?;
    let shared = peer.pow_ct(scalar.to_uint());
    Ok(encode(shared))
}

fn dh_map_generator<'g, U, V>(
    group: &'g ModPGroup<U, V>,
    nonce: &[u8],
    shared_secret: &[u8],
) -> Result<ModRingElementRef<'g, U>>
where
    U: UintMont + ConditionallySelectable,
    V: UintMont + UintExp,
{
    let s = V::from_be_bytes(nonce);
    let h: ModRingElementRef<'_, U> = decode(shared_secret, group.base_field())?;
    Ok(group.generator().pow_ct(s) * h)
}

// Every standardized curve uses the same `Uint` width for its base field
// and scalar field, which is also what `BsiTr031111Codec`'s point encoding
// requires (it's only implemented for `EllipticCurvePoint<U, U>`). So these
// take a single type parameter rather than `EllipticCurve`'s general `<U, V>`.

fn ec_keypair<U: UintMont>(
    curve: &EllipticCurve<U, U>,
    base: EllipticCurvePoint<'_, U, U>,
    rng: &mut dyn CryptoCoreRng,
) -> (Vec<u8>, Vec<u8>) {
    let scalar = curve.scalar_field().random(rng);
    let public = base * scalar;
    (encode(scalar), encode(public))
}

fn ec_agree<U: UintMont>(
    curve: &EllipticCurve<U, U>,
    private: &[u8],
    peer_public: &[u8],
) -> Result<Vec<u8>> {
    let scalar: ModRingElementRef<'_, U> = decode(private, curve.scalar_field())?;
    let peer: EllipticCurvePoint<'_, U, U> = decode(peer_public, curve)?;
    let shared = peer * scalar;
    let x = shared
        .x()
        .ok_or_else(|| anyhow!("shared secret is the point at infinity"))?;
    Ok(encode(x))
}

fn ec_map_generator<'g, U: UintMont>(
    curve: &'g EllipticCurve<U, U>,
    nonce: &[u8],
    shared_secret: &[u8],
) -> Result<EllipticCurvePoint<'g, U, U>> {
    let s = curve.scalar_field().from(U::from_be_bytes(nonce));
    let h: EllipticCurvePoint<'_, U, U> = decode(shared_secret, curve)?;
    Ok(curve.generator() * s + h)
}

#[cfg(test)]
mod tests {
    use {super::*, rand::thread_rng};

    fn test_roundtrip(params: StandardizedDomainParameters) {
        let mut rng = thread_rng();
        let (sk_a, pk_a) = params.generate_keypair(&mut rng);
        let (sk_b, pk_b) = params.generate_keypair(&mut rng);
        let shared_a = params.agree(&sk_a, &pk_b).unwrap();
        let shared_b = params.agree(&sk_b, &pk_a).unwrap();
        assert_eq!(shared_a, shared_b);
    }

    #[test]
    fn dh_group_1_agrees() {
        test_roundtrip(StandardizedDomainParameters::from_parameter_id(0).unwrap());
    }

    #[test]
    fn ec_brainpool_p256r1_agrees() {
        test_roundtrip(StandardizedDomainParameters::from_parameter_id(13).unwrap());
    }

    #[test]
    fn ec_secp521r1_agrees() {
        test_roundtrip(StandardizedDomainParameters::from_parameter_id(16).unwrap());
    }

    #[test]
    fn unknown_parameter_id_rejected() {
        assert!(StandardizedDomainParameters::from_parameter_id(255).is_err());
    }

    #[test]
    fn generic_mapping_changes_the_generator() {
        let mut rng = thread_rng();
        let params = StandardizedDomainParameters::from_parameter_id(12).unwrap();
        let nonce = [0x42u8; 16];
        let (_, pk_h) = params.generate_keypair(&mut rng);
        let mapped = params.map_generator(&nonce, &pk_h).unwrap();
        let (sk_a, pk_a) = mapped.generate_keypair(&mut rng);
        let (sk_b, pk_b) = mapped.generate_keypair(&mut rng);
        assert_eq!(mapped.agree(&sk_a, &pk_b).unwrap(), mapped.agree(&sk_b, &pk_a).unwrap());
    }
}
