mod dataset;

use {
    anyhow::{anyhow, Result},
    dataset::Dataset,
    der::Decode,
    icao_9303::{asn1::emrtd::EfSod, lds::DataGroup, passive_authentication::verify},
};

fn decode_all(raw: Vec<Vec<u8>>) -> Result<Vec<DataGroup>> {
    raw.into_iter().map(|bytes| DataGroup::decode(bytes).map_err(|e| anyhow!("{e}"))).collect()
}

#[test]
fn verifies_a_genuine_document_security_object() -> Result<()> {
    let dataset = Dataset::load()?;
    let sod = EfSod::from_der(&dataset.sod)?;

    let data_groups = decode_all(vec![dataset.dg1, dataset.dg2, dataset.dg3, dataset.dg4, dataset.dg14])?;

    verify(&sod, &data_groups).map_err(|e| anyhow!("{e}"))?;
    Ok(())
}

#[test]
fn rejects_a_tampered_data_group() -> Result<()> {
    let dataset = Dataset::load()?;
    let sod = EfSod::from_der(&dataset.sod)?;

    let mut tampered_dg1 = dataset.dg1.clone();
    let last = tampered_dg1.len() - 1;
    tampered_dg1[last] ^= 0xFF;

    let data_groups = decode_all(vec![tampered_dg1, dataset.dg2, dataset.dg3, dataset.dg4, dataset.dg14])?;

    assert!(verify(&sod, &data_groups).is_err());
    Ok(())
}
