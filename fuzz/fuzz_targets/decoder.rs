#![no_main]

use asfscope::{
    bytecode::{decode_function, DecodeOptions, OpcodeTable, PointerWidth},
    engine::MemoryEngine,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let stream: Vec<u32> = data
        .chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect();

    for width in [PointerWidth::Bits32, PointerWidth::Bits64] {
        let engine = MemoryEngine::new(width);
        let table = OpcodeTable::standard(width);
        let _ = decode_function(&stream, &table, &engine, &DecodeOptions::default());
    }
});
