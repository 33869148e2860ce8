//! Benchmarks for instruction decoding and rendering.
//!
//! Decodes a synthetic function that mixes plain, jump, float and string instructions so every
//! reinterpretation path is exercised.

extern crate asfscope;

use asfscope::{
    bytecode::{decode_function, decode_instruction, DecodeOptions, Opcode, OpcodeTable, PointerWidth},
    engine::MemoryEngine,
};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

fn word0(opcode: Opcode, operand: u16) -> u32 {
    u32::from(opcode.value()) | (u32::from(operand) << 16)
}

/// `blocks` repetitions of a small loop body, terminated by RET.
fn synthetic_function(blocks: usize) -> Vec<u32> {
    let mut stream = Vec::with_capacity(blocks * 12 + 1);
    for _ in 0..blocks {
        stream.extend([word0(Opcode::SetV4, 1), 0x3F80_0000]);
        stream.extend([word0(Opcode::ADDIf, 2), 1, 0x4000_0000]);
        stream.extend([word0(Opcode::STR, 0)]);
        stream.extend([word0(Opcode::CpyVtoR4, 2)]);
        stream.extend([u32::from(Opcode::JZ.value()), 2]);
        stream.extend([u32::from(Opcode::SUSPEND.value())]);
        stream.extend([word0(Opcode::PshC4, 0), 42]);
    }
    stream.push(word0(Opcode::RET, 0));
    stream
}

fn bench_decode_function(c: &mut Criterion) {
    let engine = MemoryEngine::new(PointerWidth::Bits32).with_constant_string(0, b"hello".to_vec());
    let table = OpcodeTable::standard(PointerWidth::Bits32);
    let options = DecodeOptions::default();
    let stream = synthetic_function(1_000);

    let mut group = c.benchmark_group("decoder");
    group.throughput(Throughput::Bytes((stream.len() * 4) as u64));
    group.bench_function("decode_function", |b| {
        b.iter(|| {
            let lines = decode_function(black_box(&stream), &table, &engine, &options).unwrap();
            black_box(lines)
        });
    });
    group.bench_function("decode_instruction", |b| {
        b.iter(|| {
            let mut position = 0;
            while position < stream.len() {
                let instruction = decode_instruction(black_box(&stream), position, &table).unwrap();
                position = instruction.next_position();
            }
            black_box(position)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_decode_function);
criterion_main!(benches);
