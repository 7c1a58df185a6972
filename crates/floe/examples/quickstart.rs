//! Build a sliced buffer, write to it, and inspect its layout.
//!
//! Run with `cargo run -p floe --example quickstart`.

use floe::prelude::*;

fn main() -> Result<(), BufferError> {
    // Small slices so the split is visible: 4 KiB holds 512 f64 values.
    let config = BufferConfig::new().with_max_slice_size(4 * 1024);
    let mut samples = SlicedBuffer::<f64>::with_config(10_000, &config)?;

    println!(
        "{} x {} ({} bytes) in {} slices of up to {} elements",
        samples.element_count(),
        samples.element_type_name(),
        samples.binary_size(),
        samples.slice_count(),
        samples.elements_per_full_slice(),
    );

    samples.fill(1.0)?;
    for i in (0..samples.element_count()).step_by(1_000) {
        samples.set(i, i as f64)?;
    }

    let probe = 7_000;
    let coord = samples.to_slice_coordinates(probe)?;
    println!(
        "element {probe} = {} lives in slice {} at offset {}",
        samples.get(probe)?,
        coord.slice,
        coord.offset,
    );

    let last = SliceIndex(samples.slice_count() - 1);
    println!(
        "last slice holds {} elements ({} bytes)",
        samples.slice_size(last)?,
        samples.binary_slice_size(last)?,
    );

    let total: f64 = samples.iter()?.sum();
    println!("sum = {total}");

    let raw: Vec<u8> = (0..=255).collect();
    let bytes = ByteBuffer::from_slice(&raw)?;
    println!("byte buffer: {} bytes, {} slice(s)", bytes.element_count(), bytes.slice_count());

    samples.dispose();
    assert!(matches!(samples.get(0), Err(BufferError::UseAfterDispose)));
    Ok(())
}
