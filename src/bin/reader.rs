//! A command-line reader driving a Proxmark3 RDV4: runs the full read
//! sequence against a presented passport and dumps what it finds.
//!
//! https://github.com/RfidResearchGroup/proxmark3/issues/1117

use {
    anyhow::{Context, Result},
    icao_9303::{
        mrz::derive_mrz_key,
        nfc::{proxmark3::Proxmark3Transport, NoProgress},
        orchestrator,
    },
    std::env,
};

fn main() -> Result<()> {
    let mut rng = rand::thread_rng();
    let mut progress = NoProgress;

    let mut transport = Proxmark3Transport::connect().context("connecting to Proxmark3")?;

    let document_number = env::var("DOCUMENT_NUMBER").context("set DOCUMENT_NUMBER")?;
    let date_of_birth = env::var("DATE_OF_BIRTH").context("set DATE_OF_BIRTH (YYMMDD)")?;
    let date_of_expiry = env::var("DATE_OF_EXPIRY").context("set DATE_OF_EXPIRY (YYMMDD)")?;
    let mrz_key = derive_mrz_key(&document_number, &date_of_birth, &date_of_expiry)
        .context("deriving MRZ key")?;

    let result = orchestrator::run(&mut transport, &mrz_key, &mut rng, &mut progress)
        .context("reading passport")?;

    eprintln!("PACE: {:?}", result.pace);
    eprintln!("BAC: {:?}", result.bac);
    eprintln!("Chip Authentication: {:?}", result.chip_authentication);
    eprintln!("Passive Authentication: {:?}", result.passive_authentication);

    if let Some(com) = &result.com {
        println!("EF.COM: LDS {} / Unicode {}", com.lds_version, com.unicode_version);
    }
    for dg in &result.data_groups {
        match dg.dg_number() {
            Some(n) => println!("DG{n}: {} bytes", dg.raw().len()),
            None => println!("{:#x}: {} bytes", dg.tag(), dg.raw().len()),
        }
    }

    Ok(())
}
