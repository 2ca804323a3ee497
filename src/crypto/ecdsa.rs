//! ECDSA signature verification implementation, used by Chip Authentication's
//! optional CA-ECDSA variant and by EC domain parameter validation.

use {
    super::{
        groups::EllipticCurve,
        mod_ring::{ModRingElementRef, RingRefExt, UintExp, UintMont},
    },
    anyhow::{anyhow, ensure, Result},
    num_traits::Inv,
    subtle::ConditionallySelectable,
};

#[derive(Clone, Debug)]
pub struct ECPublicKey<'g, U>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    curve: &'g EllipticCurve<U, U>,
    point: (U, U),
}

#[derive(Debug, Clone)]
pub struct ECSignature<U> {
    r: U,
    s: U,
}

impl<'g, U> ECPublicKey<'g, U>
where
    U: UintMont + ConditionallySelectable + UintExp,
{
    pub fn new(curve: &'g EllipticCurve<U, U>, point: (U, U)) -> Self {
        Self { curve, point }
    }

    pub fn verify(&self, message_hash: U, signature: &ECSignature<U>) -> Result<()> {
        let scalars = self.curve.scalar_field();
        let r = scalars.from(signature.r);
        let s = scalars.from(signature.s);
        let e = scalars.from(message_hash);

        // w = s^(-1) mod n
        let w = s.inv().ok_or_else(|| anyhow!("Invalid s value"))?;

        // u1 = e * w mod n, u2 = r * w mod n
        let u1 = e * w;
        let u2 = r * w;

        let public = self
            .curve
            .from_montgomery(Some(self.point))
            .map_err(|_| anyhow!("Public key point not on curve"))?;

        // Q = u1*G + u2*pubkey
        let q = self.curve.generator() * u1 + public * u2;

        let x: ModRingElementRef<'_, U> = q.x().ok_or_else(|| anyhow!("Point at infinity"))?;
        let x = scalars.from(x.to_uint());

        ensure!(x == r, "Signature verification failed");

        Ok(())
    }
}
