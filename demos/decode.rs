use std::env;
use std::fs::File;
use std::io::BufReader;

use certkit::Result;
use certkit::formats::certified::{CertifiedFile, Protection};
use certkit::keys::KeySet;

fn main() -> Result<()> {
    let path = env::args().nth(1).unwrap_or_else(|| "EBOOT.BIN".into());

    let mut keys = KeySet::new();
    keys.load_system_keys(File::open("system.keys")?)?;

    let file = BufReader::new(File::open(path)?);
    let cf = CertifiedFile::parse(file, Protection::System { keys: &keys })?;

    println!("{:?} {:?}", cf.header.variant, cf.header.category);
    for seg in &cf.segments {
        println!(
            "  {:?} #{} at {:#x} ({:#x} bytes)",
            seg.segment_type, seg.segment_id, seg.segment_offset, seg.segment_size
        );
    }
    println!("signature: {:?}", cf.signature.algorithm());

    Ok(())
}
