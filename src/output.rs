// Output writers: encoded sample lines and the dictionary report.

use std::io::{self, Write};

use crate::encoder::{DictionaryEncoder, IdDictionary};
use crate::models::EncodedSample;

/// One `timestamp;object;counter;instance;value` line per sample.
pub fn write_samples<W: Write>(out: &mut W, samples: &[EncodedSample]) -> io::Result<()> {
    for sample in samples {
        writeln!(out, "{sample}")?;
    }
    Ok(())
}

/// Objects, counters and instances as `  name = id` lines, in id order.
pub fn write_dictionaries<W: Write>(out: &mut W, encoder: &DictionaryEncoder) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== Dictionary Contents ===")?;
    write_dictionary(out, "Objects", encoder.objects())?;
    write_dictionary(out, "Counters", encoder.counters())?;
    write_dictionary(out, "Instances", encoder.instances())?;
    Ok(())
}

fn write_dictionary<W: Write>(out: &mut W, title: &str, dict: &IdDictionary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title} Dictionary:")?;
    for (name, id) in dict.iter() {
        writeln!(out, "  {name} = {id}")?;
    }
    Ok(())
}
