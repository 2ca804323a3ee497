mod bsi_tr03111;
mod buf;
mod icao_9303;

pub use self::{
    bsi_tr03111::BsiTr031111Codec,
    buf::{BufCodec, BufCodecParent, BufMutCodec},
    icao_9303::{BerSize, Icao9303Codec, Leniency, PublicKeyDH, PublicKeyRSA},
};
use {
    anyhow::Result,
    bytes::{Buf, BufMut},
};

pub trait Codec<T> {
    type Parent;
    fn encode<B: BufMut>(&self, buffer: &mut B, value: T);
    fn decode<B: Buf>(&self, buffer: &mut B, parent: Self::Parent) -> Result<T>;

    /// Encoded length of `value` in bytes. The default re-encodes into a
    /// scratch buffer; implementations with cheaper length rules override
    /// this.
    fn encoded_size(&self, value: T) -> usize {
        let mut buffer = Vec::new();
        self.encode(&mut buffer, value);
        buffer.len()
    }
}
